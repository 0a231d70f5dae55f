//! Application state - single source of truth

use serde::{Deserialize, Serialize};
use tui_dispatch::DataResource;
use tui_dispatch_debug::debug::{DebugSection, DebugState, ron_string};

/// Fixed window size: entries shown per catalog page.
pub const PAGE_SIZE: usize = 20;

/// Stat bars are always scaled against this maximum, regardless of the
/// largest value actually observed.
pub const STAT_SCALE_MAX: u16 = 255;

/// Language tag used to select flavor text and genus entries.
pub const DISPLAY_LANGUAGE: &str = "en";

/// The one user-facing message for any failed fetch chain. The underlying
/// cause is kept in `AppState::last_fetch_error` for the debug overlay.
pub const FETCH_ERROR_MESSAGE: &str = "Could not load catalog data. Try again later.";

/// One entry of the current page window.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntitySummary {
    pub id: u16,
    pub name: String,
    pub artwork_url: Option<String>,
    pub types: Vec<String>,
}

/// A fully assembled page of the catalog. `page` doubles as the request
/// token: completions carrying a page other than the current one are stale.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PageWindow {
    pub page: usize,
    pub total_pages: usize,
    pub total_count: usize,
    pub items: Vec<EntitySummary>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AbilityEntry {
    pub name: String,
    pub hidden: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatEntry {
    pub name: String,
    pub value: u16,
}

/// Full record for one entity. Height is stored in decimeters and weight in
/// hectograms, as the catalog delivers them; display divides by ten.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PokemonDetail {
    pub id: u16,
    pub name: String,
    pub artwork_url: Option<String>,
    pub types: Vec<String>,
    pub abilities: Vec<AbilityEntry>,
    pub stats: Vec<StatEntry>,
    pub height: u16,
    pub weight: u16,
    pub base_experience: Option<u16>,
    pub moves: Vec<String>,
    pub species_url: String,
}

impl PokemonDetail {
    pub fn height_display(&self) -> String {
        display_tenths(self.height)
    }

    pub fn weight_display(&self) -> String {
        display_tenths(self.weight)
    }
}

/// Convert a value stored in tenths (decimeters, hectograms) to its display
/// form in whole units: 7 -> "0.7", 690 -> "69.0".
pub fn display_tenths(value: u16) -> String {
    format!("{:.1}", value as f64 / 10.0)
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpeciesDetail {
    pub name: String,
    pub flavor_text: Option<String>,
    pub genus: Option<String>,
    pub evolution_chain_url: Option<String>,
}

/// One flattened node of the evolution lineage, in display order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineageStage {
    pub species_name: String,
    pub artwork_url: Option<String>,
}

/// Everything the detail view needs, assembled as a unit. A bundle only
/// exists once the entity, species, lineage and every lineage artwork lookup
/// have all succeeded; a failure anywhere leaves no partial bundle behind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetailBundle {
    pub detail: PokemonDetail,
    pub species: SpeciesDetail,
    pub lineage: Vec<LineageStage>,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Screen {
    Browser,
    Detail,
}

/// Go-to-page input sub-state.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GotoState {
    pub active: bool,
    pub input: String,
    pub error: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppState {
    pub terminal_size: (u16, u16),
    pub screen: Screen,

    /// Current page request token. Navigation is bounded by `total_pages`.
    pub page: usize,
    /// 0 until the first successful page load; forward navigation and jumps
    /// stay disabled while the collection size is unknown.
    pub total_pages: usize,
    pub window: DataResource<PageWindow>,
    pub selected_index: usize,
    pub goto: GotoState,

    /// Current detail request token.
    pub detail_id: Option<u16>,
    pub detail: DataResource<DetailBundle>,

    /// Cause of the most recent fetch failure. Never shown to the user
    /// directly; surfaced through the debug overlay.
    pub last_fetch_error: Option<String>,
    pub tick: u64,
}

impl AppState {
    pub fn new(page: usize) -> Self {
        Self {
            terminal_size: (80, 24),
            screen: Screen::Browser,
            page: page.max(1),
            total_pages: 0,
            window: DataResource::Empty,
            selected_index: 0,
            goto: GotoState::default(),
            detail_id: None,
            detail: DataResource::Empty,
            last_fetch_error: None,
            tick: 0,
        }
    }

    pub fn current_window(&self) -> Option<&PageWindow> {
        self.window.data()
    }

    pub fn selected_entity(&self) -> Option<&EntitySummary> {
        self.current_window()
            .and_then(|window| window.items.get(self.selected_index))
    }

    pub fn set_selected_index(&mut self, index: usize) -> bool {
        let Some(window) = self.current_window() else {
            return false;
        };
        if window.items.is_empty() {
            self.selected_index = 0;
            return false;
        }
        let bounded = index.min(window.items.len() - 1);
        if bounded != self.selected_index {
            self.selected_index = bounded;
            return true;
        }
        false
    }

    pub fn can_go_prev(&self) -> bool {
        self.page > 1
    }

    pub fn can_go_next(&self) -> bool {
        self.total_pages > 0 && self.page < self.total_pages
    }

    pub fn loading_active(&self) -> bool {
        match self.screen {
            Screen::Browser => self.window.is_loading(),
            Screen::Detail => self.detail.is_loading(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(1)
    }
}

fn resource_label<T>(resource: &DataResource<T>) -> &'static str {
    match resource {
        DataResource::Empty => "empty",
        DataResource::Loading => "loading",
        DataResource::Loaded(_) => "loaded",
        DataResource::Failed(_) => "failed",
    }
}

impl DebugState for AppState {
    fn debug_sections(&self) -> Vec<DebugSection> {
        vec![
            DebugSection::new("Page")
                .entry("page", ron_string(&self.page))
                .entry("total_pages", ron_string(&self.total_pages))
                .entry("window", ron_string(&resource_label(&self.window)))
                .entry(
                    "items",
                    ron_string(&self.current_window().map(|window| window.items.len())),
                )
                .entry("selected", ron_string(&self.selected_index)),
            DebugSection::new("Detail")
                .entry("id", ron_string(&self.detail_id))
                .entry("detail", ron_string(&resource_label(&self.detail)))
                .entry(
                    "lineage",
                    ron_string(&self.detail.data().map(|bundle| bundle.lineage.len())),
                ),
            DebugSection::new("Status")
                .entry("screen", ron_string(&self.screen))
                .entry("goto_active", ron_string(&self.goto.active))
                .entry("goto_input", ron_string(&self.goto.input))
                .entry("goto_error", ron_string(&self.goto.error))
                .entry("last_fetch_error", ron_string(&self.last_fetch_error)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window_with(count: usize) -> PageWindow {
        PageWindow {
            page: 1,
            total_pages: 51,
            total_count: 1010,
            items: (0..count)
                .map(|idx| EntitySummary {
                    id: idx as u16 + 1,
                    name: format!("entity-{idx}"),
                    artwork_url: None,
                    types: vec!["normal".to_string()],
                })
                .collect(),
        }
    }

    #[test]
    fn test_display_tenths() {
        assert_eq!(display_tenths(7), "0.7");
        assert_eq!(display_tenths(690), "69.0");
        assert_eq!(display_tenths(0), "0.0");
        assert_eq!(display_tenths(100), "10.0");
    }

    #[test]
    fn test_detail_display_conversions() {
        let detail = PokemonDetail {
            id: 1,
            name: "bulbasaur".to_string(),
            artwork_url: None,
            types: Vec::new(),
            abilities: Vec::new(),
            stats: Vec::new(),
            height: 7,
            weight: 690,
            base_experience: Some(64),
            moves: Vec::new(),
            species_url: "https://pokeapi.co/api/v2/pokemon-species/1/".to_string(),
        };
        assert_eq!(detail.height_display(), "0.7");
        assert_eq!(detail.weight_display(), "69.0");
    }

    #[test]
    fn test_set_selected_index_clamps_to_window() {
        let mut state = AppState::default();
        assert!(!state.set_selected_index(3));

        state.window = DataResource::Loaded(window_with(5));
        assert!(state.set_selected_index(3));
        assert_eq!(state.selected_index, 3);

        assert!(state.set_selected_index(99));
        assert_eq!(state.selected_index, 4);

        assert!(!state.set_selected_index(4));
    }

    #[test]
    fn test_debug_sections_cover_page_detail_and_status() {
        let state = AppState::default();
        assert_eq!(state.debug_sections().len(), 3);
    }

    #[test]
    fn test_navigation_gates() {
        let mut state = AppState::default();
        assert!(!state.can_go_prev());
        assert!(!state.can_go_next());

        state.total_pages = 51;
        assert!(state.can_go_next());

        state.page = 51;
        assert!(state.can_go_prev());
        assert!(!state.can_go_next());
    }
}
