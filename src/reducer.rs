//! Reducer - pure function: (state, action) -> DispatchResult

use tui_dispatch::{DataResource, DispatchResult};

use crate::action::Action;
use crate::effect::Effect;
use crate::state::{AppState, Screen, FETCH_ERROR_MESSAGE};

pub fn reducer(state: &mut AppState, action: Action) -> DispatchResult<Effect> {
    match action {
        Action::Init => load_page(state, state.page),

        Action::PagePrev => {
            if !state.can_go_prev() {
                return DispatchResult::unchanged();
            }
            load_page(state, state.page - 1)
        }

        Action::PageNext => {
            if !state.can_go_next() {
                return DispatchResult::unchanged();
            }
            load_page(state, state.page + 1)
        }

        Action::PageDidLoad(window) => {
            // Stale completion: the user has navigated on since this fetch
            // started. Discard without touching visible state.
            if window.page != state.page {
                return DispatchResult::unchanged();
            }
            state.total_pages = window.total_pages;
            state.selected_index = state
                .selected_index
                .min(window.items.len().saturating_sub(1));
            state.last_fetch_error = None;
            state.window = DataResource::Loaded(window);
            DispatchResult::changed()
        }

        Action::PageDidError { page, error } => {
            if page != state.page {
                return DispatchResult::unchanged();
            }
            state.last_fetch_error = Some(error);
            state.window = DataResource::Failed(FETCH_ERROR_MESSAGE.to_string());
            DispatchResult::changed()
        }

        Action::GotoStart => {
            if state.goto.active {
                return DispatchResult::unchanged();
            }
            state.goto.active = true;
            state.goto.input.clear();
            state.goto.error = None;
            DispatchResult::changed()
        }

        Action::GotoCancel => {
            if !state.goto.active {
                return DispatchResult::unchanged();
            }
            state.goto.active = false;
            state.goto.input.clear();
            state.goto.error = None;
            DispatchResult::changed()
        }

        Action::GotoInput(ch) => {
            if !state.goto.active {
                return DispatchResult::unchanged();
            }
            state.goto.input.push(ch);
            state.goto.error = None;
            DispatchResult::changed()
        }

        Action::GotoBackspace => {
            if !state.goto.active {
                return DispatchResult::unchanged();
            }
            state.goto.input.pop();
            state.goto.error = None;
            DispatchResult::changed()
        }

        Action::GotoSubmit => {
            if !state.goto.active {
                return DispatchResult::unchanged();
            }
            // Validation never reaches the network; a bad page number leaves
            // the current window untouched.
            match state.goto.input.trim().parse::<usize>() {
                Ok(target) if state.total_pages > 0 && (1..=state.total_pages).contains(&target) => {
                    state.goto.active = false;
                    state.goto.input.clear();
                    state.goto.error = None;
                    load_page(state, target)
                }
                _ => {
                    state.goto.error = Some(goto_error_message(state.total_pages));
                    DispatchResult::changed()
                }
            }
        }

        Action::SelectionMove(delta) => {
            let mut index = state.selected_index as i32 + delta as i32;
            if index < 0 {
                index = 0;
            }
            if !state.set_selected_index(index as usize) {
                return DispatchResult::unchanged();
            }
            DispatchResult::changed()
        }

        Action::ListSelect(index) => {
            if !state.set_selected_index(index) {
                return DispatchResult::unchanged();
            }
            DispatchResult::changed()
        }

        Action::EntityOpen(id) => {
            state.screen = Screen::Detail;
            state.detail_id = Some(id);
            state.detail = DataResource::Loading;
            DispatchResult::changed_with(Effect::LoadDetail { id })
        }

        Action::EntityClose => {
            if state.screen != Screen::Detail {
                return DispatchResult::unchanged();
            }
            state.screen = Screen::Browser;
            state.detail_id = None;
            state.detail = DataResource::Empty;
            DispatchResult::changed()
        }

        Action::DetailDidLoad(bundle) => {
            if state.detail_id != Some(bundle.detail.id) {
                return DispatchResult::unchanged();
            }
            state.last_fetch_error = None;
            state.detail = DataResource::Loaded(bundle);
            DispatchResult::changed()
        }

        Action::DetailDidError { id, error } => {
            if state.detail_id != Some(id) {
                return DispatchResult::unchanged();
            }
            state.last_fetch_error = Some(error);
            state.detail = DataResource::Failed(FETCH_ERROR_MESSAGE.to_string());
            DispatchResult::changed()
        }

        Action::UiTerminalResize(width, height) => {
            if state.terminal_size != (width, height) {
                state.terminal_size = (width, height);
                DispatchResult::changed()
            } else {
                DispatchResult::unchanged()
            }
        }

        Action::Tick => {
            if state.loading_active() {
                state.tick = state.tick.wrapping_add(1);
                DispatchResult::changed()
            } else {
                DispatchResult::unchanged()
            }
        }

        Action::Quit => DispatchResult::unchanged(),
    }
}

fn load_page(state: &mut AppState, page: usize) -> DispatchResult<Effect> {
    state.page = page;
    state.selected_index = 0;
    state.window = DataResource::Loading;
    state.goto.error = None;
    state.tick = 0;
    DispatchResult::changed_with(Effect::LoadPage { page })
}

fn goto_error_message(total_pages: usize) -> String {
    if total_pages == 0 {
        "Page count is not known yet".to_string()
    } else {
        format!("Enter a page between 1 and {total_pages}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{DetailBundle, EntitySummary, PageWindow, PokemonDetail, SpeciesDetail};

    fn window(page: usize, total_count: usize, items: usize) -> PageWindow {
        PageWindow {
            page,
            total_pages: crate::api::total_page_count(total_count),
            total_count,
            items: (0..items)
                .map(|idx| EntitySummary {
                    id: ((page - 1) * 20 + idx + 1) as u16,
                    name: format!("entity-{idx}"),
                    artwork_url: None,
                    types: vec!["normal".to_string()],
                })
                .collect(),
        }
    }

    fn bundle(id: u16) -> DetailBundle {
        DetailBundle {
            detail: PokemonDetail {
                id,
                name: format!("entity-{id}"),
                artwork_url: None,
                types: Vec::new(),
                abilities: Vec::new(),
                stats: Vec::new(),
                height: 7,
                weight: 690,
                base_experience: Some(64),
                moves: Vec::new(),
                species_url: format!("https://pokeapi.co/api/v2/pokemon-species/{id}/"),
            },
            species: SpeciesDetail {
                name: format!("entity-{id}"),
                flavor_text: None,
                genus: None,
                evolution_chain_url: None,
            },
            lineage: Vec::new(),
        }
    }

    fn loaded_state(page: usize) -> AppState {
        let mut state = AppState::new(page);
        let result = reducer(&mut state, Action::Init);
        assert!(matches!(result.effects[0], Effect::LoadPage { .. }));
        reducer(&mut state, Action::PageDidLoad(window(page, 1010, 20)));
        state
    }

    #[test]
    fn test_init_loads_current_page() {
        let mut state = AppState::new(3);
        let result = reducer(&mut state, Action::Init);
        assert!(result.changed);
        assert!(state.window.is_loading());
        assert_eq!(result.effects, vec![Effect::LoadPage { page: 3 }]);
    }

    #[test]
    fn test_page_did_load_commits_matching_token() {
        let mut state = AppState::new(1);
        reducer(&mut state, Action::Init);

        let result = reducer(&mut state, Action::PageDidLoad(window(1, 1010, 20)));
        assert!(result.changed);
        assert_eq!(state.total_pages, 51);
        assert!(state.window.is_loaded());
    }

    #[test]
    fn test_stale_page_result_is_discarded() {
        let mut state = loaded_state(1);
        reducer(&mut state, Action::PageNext); // now requesting page 2

        // Page 1's re-fetch resolving late must not clobber the request for
        // page 2.
        let result = reducer(&mut state, Action::PageDidLoad(window(1, 1010, 20)));
        assert!(!result.changed);
        assert!(state.window.is_loading());
        assert_eq!(state.page, 2);

        let result = reducer(&mut state, Action::PageDidLoad(window(2, 1010, 20)));
        assert!(result.changed);
        assert_eq!(state.current_window().unwrap().page, 2);
    }

    #[test]
    fn test_prev_at_first_page_is_noop() {
        let mut state = loaded_state(1);
        let result = reducer(&mut state, Action::PagePrev);
        assert!(!result.changed);
        assert!(result.effects.is_empty());
        assert_eq!(state.page, 1);
    }

    #[test]
    fn test_next_at_last_page_is_noop() {
        let mut state = AppState::new(51);
        reducer(&mut state, Action::Init);
        reducer(&mut state, Action::PageDidLoad(window(51, 1010, 10)));
        assert_eq!(state.total_pages, 51);

        let result = reducer(&mut state, Action::PageNext);
        assert!(!result.changed);
        assert_eq!(state.page, 51);
    }

    #[test]
    fn test_next_disabled_before_total_known() {
        let mut state = AppState::new(1);
        reducer(&mut state, Action::Init);
        // Still loading, total_pages unknown.
        let result = reducer(&mut state, Action::PageNext);
        assert!(!result.changed);
        assert!(result.effects.is_empty());
    }

    #[test]
    fn test_navigation_triggers_refetch() {
        let mut state = loaded_state(1);
        let result = reducer(&mut state, Action::PageNext);
        assert!(result.changed);
        assert_eq!(state.page, 2);
        assert!(state.window.is_loading());
        assert_eq!(result.effects, vec![Effect::LoadPage { page: 2 }]);
    }

    #[test]
    fn test_goto_valid_page_navigates() {
        let mut state = loaded_state(1);
        reducer(&mut state, Action::GotoStart);
        reducer(&mut state, Action::GotoInput('5'));
        reducer(&mut state, Action::GotoInput('1'));

        let result = reducer(&mut state, Action::GotoSubmit);
        assert!(result.changed);
        assert_eq!(state.page, 51);
        assert!(!state.goto.active);
        assert_eq!(result.effects, vec![Effect::LoadPage { page: 51 }]);
    }

    #[test]
    fn test_goto_out_of_range_is_rejected() {
        let mut state = loaded_state(1);
        reducer(&mut state, Action::GotoStart);
        reducer(&mut state, Action::GotoInput('5'));
        reducer(&mut state, Action::GotoInput('2'));

        let result = reducer(&mut state, Action::GotoSubmit);
        assert!(result.changed);
        assert!(result.effects.is_empty(), "validation must not fetch");
        assert_eq!(state.page, 1);
        assert!(state.window.is_loaded(), "current window preserved");
        assert!(state.goto.error.is_some());
    }

    #[test]
    fn test_goto_non_numeric_is_rejected() {
        let mut state = loaded_state(1);
        reducer(&mut state, Action::GotoStart);
        reducer(&mut state, Action::GotoInput('a'));

        let result = reducer(&mut state, Action::GotoSubmit);
        assert!(result.effects.is_empty());
        assert_eq!(state.page, 1);
        assert!(state.goto.error.is_some());
    }

    #[test]
    fn test_goto_zero_is_rejected() {
        let mut state = loaded_state(1);
        reducer(&mut state, Action::GotoStart);
        reducer(&mut state, Action::GotoInput('0'));

        let result = reducer(&mut state, Action::GotoSubmit);
        assert!(result.effects.is_empty());
        assert_eq!(state.page, 1);
    }

    #[test]
    fn test_goto_rejected_while_total_unknown() {
        let mut state = AppState::new(1);
        reducer(&mut state, Action::Init);
        reducer(&mut state, Action::GotoStart);
        reducer(&mut state, Action::GotoInput('2'));

        let result = reducer(&mut state, Action::GotoSubmit);
        assert!(result.effects.is_empty());
        assert!(state.goto.error.is_some());
    }

    #[test]
    fn test_page_error_uses_fixed_message_and_keeps_cause() {
        let mut state = AppState::new(1);
        reducer(&mut state, Action::Init);

        let result = reducer(
            &mut state,
            Action::PageDidError {
                page: 1,
                error: "connection reset by peer".to_string(),
            },
        );
        assert!(result.changed);
        assert!(matches!(
            &state.window,
            DataResource::Failed(msg) if msg == FETCH_ERROR_MESSAGE
        ));
        assert_eq!(
            state.last_fetch_error.as_deref(),
            Some("connection reset by peer")
        );
    }

    #[test]
    fn test_stale_page_error_is_discarded() {
        let mut state = loaded_state(1);
        reducer(&mut state, Action::PageNext);

        let result = reducer(
            &mut state,
            Action::PageDidError {
                page: 1,
                error: "timeout".to_string(),
            },
        );
        assert!(!result.changed);
        assert!(state.window.is_loading());
    }

    #[test]
    fn test_entity_open_starts_detail_load() {
        let mut state = loaded_state(1);
        let result = reducer(&mut state, Action::EntityOpen(25));
        assert!(result.changed);
        assert_eq!(state.screen, Screen::Detail);
        assert_eq!(state.detail_id, Some(25));
        assert!(state.detail.is_loading());
        assert_eq!(result.effects, vec![Effect::LoadDetail { id: 25 }]);
    }

    #[test]
    fn test_detail_commits_matching_token_only() {
        let mut state = loaded_state(1);
        reducer(&mut state, Action::EntityOpen(25));
        reducer(&mut state, Action::EntityClose);
        reducer(&mut state, Action::EntityOpen(26));

        // Entity 25's fetch resolving late is ignored.
        let result = reducer(&mut state, Action::DetailDidLoad(bundle(25)));
        assert!(!result.changed);
        assert!(state.detail.is_loading());

        let result = reducer(&mut state, Action::DetailDidLoad(bundle(26)));
        assert!(result.changed);
        assert_eq!(state.detail.data().unwrap().detail.id, 26);
    }

    #[test]
    fn test_detail_error_leaves_no_partial_bundle() {
        let mut state = loaded_state(1);
        reducer(&mut state, Action::EntityOpen(25));

        let result = reducer(
            &mut state,
            Action::DetailDidError {
                id: 25,
                error: "404 Not Found".to_string(),
            },
        );
        assert!(result.changed);
        assert!(state.detail.data().is_none());
        assert!(matches!(
            &state.detail,
            DataResource::Failed(msg) if msg == FETCH_ERROR_MESSAGE
        ));
        assert_eq!(state.last_fetch_error.as_deref(), Some("404 Not Found"));
    }

    #[test]
    fn test_entity_close_clears_resolver_state() {
        let mut state = loaded_state(1);
        reducer(&mut state, Action::EntityOpen(25));
        reducer(&mut state, Action::DetailDidLoad(bundle(25)));

        let result = reducer(&mut state, Action::EntityClose);
        assert!(result.changed);
        assert_eq!(state.screen, Screen::Browser);
        assert_eq!(state.detail_id, None);
        assert!(state.detail.is_empty());
    }

    #[test]
    fn test_selection_clamped_to_partial_window() {
        let mut state = AppState::new(51);
        reducer(&mut state, Action::Init);
        reducer(&mut state, Action::PageDidLoad(window(51, 1010, 10)));

        let result = reducer(&mut state, Action::SelectionMove(15));
        assert!(result.changed);
        assert_eq!(state.selected_index, 9);

        let result = reducer(&mut state, Action::SelectionMove(-20));
        assert!(result.changed);
        assert_eq!(state.selected_index, 0);
    }

    #[test]
    fn test_tick_only_rerenders_while_loading() {
        let mut state = loaded_state(1);
        let result = reducer(&mut state, Action::Tick);
        assert!(!result.changed);

        reducer(&mut state, Action::PageNext);
        let result = reducer(&mut state, Action::Tick);
        assert!(result.changed);
        assert_eq!(state.tick, 1);
    }
}
