use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use tui_dispatch::{
    Component, EventContext, EventKind, EventRoutingState, HandlerResponse, RenderContext,
};
use tui_dispatch_components::style::BorderStyle;
use tui_dispatch_components::{
    BaseStyle, Padding, SelectList, SelectListBehavior, SelectListProps, SelectListStyle,
    SelectionStyle, StatusBar, StatusBarHint, StatusBarItem, StatusBarProps, StatusBarSection,
    StatusBarStyle,
};

use crate::action::Action;
use crate::state::{AppState, DetailBundle, Screen, StatEntry, STAT_SCALE_MAX};
use crate::types::{type_color, type_icon_url};

const BG_BASE: Color = Color::Rgb(14, 17, 26);
const BG_PANEL: Color = Color::Rgb(22, 30, 44);
const BG_HIGHLIGHT: Color = Color::Rgb(32, 86, 104);
const TEXT_MAIN: Color = Color::Rgb(230, 238, 242);
const TEXT_DIM: Color = Color::Rgb(168, 186, 198);
const ACCENT: Color = Color::Rgb(94, 196, 174);
const ERROR_FG: Color = Color::Rgb(232, 112, 104);

const SPINNER_FRAMES: [char; 4] = ['|', '/', '-', '\\'];
const STAT_BAR_WIDTH: usize = 24;
const MOVES_SHOWN: usize = 12;

#[derive(tui_dispatch::ComponentId, Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum DexComponentId {
    Browser,
    Goto,
    Detail,
}

#[derive(tui_dispatch::BindingContext, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DexContext {
    Browser,
    Goto,
    Detail,
}

impl EventRoutingState<DexComponentId, DexContext> for AppState {
    fn focused(&self) -> Option<DexComponentId> {
        if self.goto.active {
            return Some(DexComponentId::Goto);
        }
        match self.screen {
            Screen::Browser => Some(DexComponentId::Browser),
            Screen::Detail => Some(DexComponentId::Detail),
        }
    }

    fn modal(&self) -> Option<DexComponentId> {
        if self.goto.active {
            Some(DexComponentId::Goto)
        } else {
            None
        }
    }

    fn binding_context(&self, id: DexComponentId) -> DexContext {
        match id {
            DexComponentId::Browser => DexContext::Browser,
            DexComponentId::Goto => DexContext::Goto,
            DexComponentId::Detail => DexContext::Detail,
        }
    }

    fn default_context(&self) -> DexContext {
        DexContext::Browser
    }
}

pub struct DexUi {
    entry_list: SelectList,
    status_bar: StatusBar,
}

impl Default for DexUi {
    fn default() -> Self {
        Self::new()
    }
}

impl DexUi {
    pub fn new() -> Self {
        Self {
            entry_list: SelectList::new(),
            status_bar: StatusBar::new(),
        }
    }

    pub fn render(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        state: &AppState,
        _render_ctx: RenderContext,
        event_ctx: &mut EventContext<DexComponentId>,
    ) {
        let base = Block::default().style(Style::default().bg(BG_BASE));
        frame.render_widget(base, area);
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(8),
                Constraint::Length(3),
            ])
            .split(area);

        render_header(frame, layout[0], state);
        match state.screen {
            Screen::Browser => {
                event_ctx.set_component_area(DexComponentId::Browser, layout[1]);
                self.render_browser(frame, layout[1], state);
            }
            Screen::Detail => {
                event_ctx.set_component_area(DexComponentId::Detail, layout[1]);
                render_detail(frame, layout[1], state);
            }
        }
        if state.goto.active {
            event_ctx.set_component_area(DexComponentId::Goto, layout[2]);
        } else {
            event_ctx.component_areas.remove(&DexComponentId::Goto);
        }
        render_footer(frame, layout[2], state, &mut self.status_bar);
    }

    fn render_browser(&mut self, frame: &mut Frame, area: Rect, state: &AppState) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title("CATALOG")
            .style(Style::default().bg(BG_PANEL).fg(TEXT_MAIN))
            .border_style(Style::default().fg(TEXT_DIM));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        match &state.window {
            tui_dispatch::DataResource::Loaded(window) => {
                let items = entry_items(window);
                let props = SelectListProps {
                    items: &items,
                    count: items.len(),
                    selected: state.selected_index.min(items.len().saturating_sub(1)),
                    is_focused: state.screen == Screen::Browser && !state.goto.active,
                    style: entry_list_style(),
                    behavior: SelectListBehavior {
                        show_scrollbar: true,
                        wrap_navigation: false,
                    },
                    on_select: Action::ListSelect,
                    render_item: &|item| item.clone(),
                };
                self.entry_list.render(frame, inner, props);
            }
            tui_dispatch::DataResource::Loading => {
                render_notice(frame, inner, &loading_label(state), TEXT_DIM);
            }
            tui_dispatch::DataResource::Failed(message) => {
                render_notice(frame, inner, message, ERROR_FG);
            }
            tui_dispatch::DataResource::Empty => {}
        }
    }

    pub fn handle_browser_event(
        &mut self,
        event: &EventKind,
        state: &AppState,
    ) -> HandlerResponse<Action> {
        let actions = match event {
            EventKind::Key(key) => match key.code {
                crossterm::event::KeyCode::Left | crossterm::event::KeyCode::Char('h') => {
                    vec![Action::PagePrev]
                }
                crossterm::event::KeyCode::Right | crossterm::event::KeyCode::Char('l') => {
                    vec![Action::PageNext]
                }
                crossterm::event::KeyCode::Char('g') => vec![Action::GotoStart],
                crossterm::event::KeyCode::Enter => match state.selected_entity() {
                    Some(entity) => vec![Action::EntityOpen(entity.id)],
                    None => vec![],
                },
                _ => {
                    let Some(window) = state.current_window() else {
                        return handler_response(Vec::new());
                    };
                    let items = entry_items(window);
                    let props = SelectListProps {
                        items: &items,
                        count: items.len(),
                        selected: state.selected_index.min(items.len().saturating_sub(1)),
                        is_focused: true,
                        style: entry_list_style(),
                        behavior: SelectListBehavior {
                            show_scrollbar: true,
                            wrap_navigation: false,
                        },
                        on_select: Action::ListSelect,
                        render_item: &|item| item.clone(),
                    };
                    let actions: Vec<_> = self
                        .entry_list
                        .handle_event(event, props)
                        .into_iter()
                        .collect();
                    return handler_response(actions);
                }
            },
            EventKind::Scroll { delta, .. } => vec![Action::SelectionMove((*delta * 3) as i16)],
            _ => vec![],
        };
        handler_response(actions)
    }

    pub fn handle_goto_event(
        &mut self,
        event: &EventKind,
        _state: &AppState,
    ) -> HandlerResponse<Action> {
        let actions = match event {
            EventKind::Key(key) => match key.code {
                crossterm::event::KeyCode::Enter => vec![Action::GotoSubmit],
                crossterm::event::KeyCode::Esc => vec![Action::GotoCancel],
                crossterm::event::KeyCode::Backspace => vec![Action::GotoBackspace],
                crossterm::event::KeyCode::Char(ch) => vec![Action::GotoInput(ch)],
                _ => vec![],
            },
            _ => vec![],
        };
        handler_response(actions)
    }

    pub fn handle_detail_event(
        &mut self,
        event: &EventKind,
        _state: &AppState,
    ) -> HandlerResponse<Action> {
        let actions = match event {
            EventKind::Key(key) => match key.code {
                crossterm::event::KeyCode::Esc
                | crossterm::event::KeyCode::Backspace
                | crossterm::event::KeyCode::Left
                | crossterm::event::KeyCode::Char('b') => vec![Action::EntityClose],
                _ => vec![],
            },
            _ => vec![],
        };
        handler_response(actions)
    }
}

fn handler_response(actions: Vec<Action>) -> HandlerResponse<Action> {
    if actions.is_empty() {
        HandlerResponse::ignored()
    } else {
        HandlerResponse {
            actions,
            consumed: true,
            needs_render: false,
        }
    }
}

fn render_header(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .style(Style::default().bg(BG_PANEL).fg(TEXT_MAIN))
        .border_style(Style::default().fg(TEXT_DIM));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let pages = if state.total_pages == 0 {
        "--".to_string()
    } else {
        state.total_pages.to_string()
    };
    let mut spans = vec![
        Span::styled("DEXVIEW", Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)),
        Span::raw("  "),
        Span::styled(
            format!("Page {} / {}", state.page, pages),
            Style::default().fg(TEXT_MAIN),
        ),
    ];
    if state.loading_active() {
        let frame_char = SPINNER_FRAMES[(state.tick as usize) % SPINNER_FRAMES.len()];
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            frame_char.to_string(),
            Style::default().fg(ACCENT),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), inner);
}

fn render_detail(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("DATA")
        .style(Style::default().bg(BG_PANEL).fg(TEXT_MAIN))
        .border_style(Style::default().fg(TEXT_DIM));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    match &state.detail {
        tui_dispatch::DataResource::Loaded(bundle) => render_detail_bundle(frame, inner, bundle),
        tui_dispatch::DataResource::Loading => {
            render_notice(frame, inner, &loading_label(state), TEXT_DIM);
        }
        tui_dispatch::DataResource::Failed(message) => {
            render_notice(frame, inner, message, ERROR_FG);
        }
        tui_dispatch::DataResource::Empty => {}
    }
}

fn render_detail_bundle(frame: &mut Frame, area: Rect, bundle: &DetailBundle) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(10), Constraint::Min(4)])
        .split(area);
    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(layout[0]);

    frame.render_widget(
        Paragraph::new(identity_lines(bundle)).wrap(Wrap { trim: true }),
        top[0],
    );
    frame.render_widget(
        Paragraph::new(stat_lines(&bundle.detail.stats)).wrap(Wrap { trim: true }),
        top[1],
    );
    frame.render_widget(
        Paragraph::new(lore_lines(bundle)).wrap(Wrap { trim: true }),
        layout[1],
    );
}

fn identity_lines(bundle: &DetailBundle) -> Text<'static> {
    let detail = &bundle.detail;
    let mut lines = vec![Line::from(Span::styled(
        format!("{} (#{:04})", capitalize(&detail.name), detail.id),
        Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
    ))];
    if let Some(genus) = &bundle.species.genus {
        lines.push(Line::from(Span::styled(
            genus.clone(),
            Style::default().fg(TEXT_DIM),
        )));
    }

    let mut type_spans: Vec<Span<'static>> = vec![Span::raw("Types: ")];
    for (idx, type_name) in detail.types.iter().enumerate() {
        if idx > 0 {
            type_spans.push(Span::raw(" "));
        }
        type_spans.push(Span::styled(
            type_name.clone(),
            Style::default()
                .fg(type_color(type_name))
                .add_modifier(Modifier::BOLD),
        ));
    }
    lines.push(Line::from(type_spans));
    for type_name in &detail.types {
        lines.push(Line::from(Span::styled(
            format!("  icon {}", type_icon_url(type_name)),
            Style::default().fg(TEXT_DIM),
        )));
    }

    lines.push(Line::from(format!(
        "Height: {} m   Weight: {} kg",
        detail.height_display(),
        detail.weight_display()
    )));
    if let Some(base_experience) = detail.base_experience {
        lines.push(Line::from(format!("Base EXP: {base_experience}")));
    }

    let abilities = detail
        .abilities
        .iter()
        .map(|ability| {
            if ability.hidden {
                format!("{} (hidden)", ability.name)
            } else {
                ability.name.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(", ");
    lines.push(Line::from(format!("Abilities: {abilities}")));

    if let Some(artwork) = &detail.artwork_url {
        lines.push(Line::from(Span::styled(
            format!("art {artwork}"),
            Style::default().fg(TEXT_DIM),
        )));
    }
    Text::from(lines)
}

fn stat_lines(stats: &[StatEntry]) -> Text<'static> {
    if stats.is_empty() {
        return Text::from("No stats loaded.");
    }
    Text::from(
        stats
            .iter()
            .map(|stat| Line::from(render_stat(stat)))
            .collect::<Vec<_>>(),
    )
}

fn render_stat(stat: &StatEntry) -> String {
    let label = shorten_stat(&stat.name);
    let bar_len = (stat.value as usize * STAT_BAR_WIDTH / STAT_SCALE_MAX as usize).max(1);
    let bar = "#".repeat(bar_len);
    format!("{label:>4} {value:>3} {bar}", value = stat.value)
}

fn shorten_stat(name: &str) -> String {
    match name {
        "hp" => " HP".to_string(),
        "attack" => "ATK".to_string(),
        "defense" => "DEF".to_string(),
        "special-attack" => "SAT".to_string(),
        "special-defense" => "SDF".to_string(),
        "speed" => "SPD".to_string(),
        _ => name.to_ascii_uppercase(),
    }
}

fn lore_lines(bundle: &DetailBundle) -> Text<'static> {
    let mut lines = Vec::new();
    if let Some(flavor) = &bundle.species.flavor_text {
        lines.push(Line::from(flavor.clone()));
        lines.push(Line::from(""));
    }

    if !bundle.lineage.is_empty() {
        let mut spans: Vec<Span<'static>> = vec![Span::styled(
            "Lineage: ",
            Style::default().fg(TEXT_DIM),
        )];
        for (idx, stage) in bundle.lineage.iter().enumerate() {
            if idx > 0 {
                spans.push(Span::styled(" > ", Style::default().fg(TEXT_DIM)));
            }
            spans.push(Span::styled(
                capitalize(&stage.species_name),
                Style::default().fg(TEXT_MAIN),
            ));
        }
        lines.push(Line::from(spans));
        for stage in &bundle.lineage {
            if let Some(artwork) = &stage.artwork_url {
                lines.push(Line::from(Span::styled(
                    format!("  {} {artwork}", stage.species_name),
                    Style::default().fg(TEXT_DIM),
                )));
            }
        }
        lines.push(Line::from(""));
    }

    let detail = &bundle.detail;
    if !detail.moves.is_empty() {
        let shown = detail
            .moves
            .iter()
            .take(MOVES_SHOWN)
            .map(|name| name.replace('-', " "))
            .collect::<Vec<_>>()
            .join(", ");
        let suffix = if detail.moves.len() > MOVES_SHOWN {
            format!(" (+{} more)", detail.moves.len() - MOVES_SHOWN)
        } else {
            String::new()
        };
        lines.push(Line::from(format!("Moves: {shown}{suffix}")));
    }
    Text::from(lines)
}

fn render_footer(frame: &mut Frame, area: Rect, state: &AppState, status_bar: &mut StatusBar) {
    let status = footer_status(state);
    let status_style = if state.goto.error.is_some() {
        Style::default().fg(ERROR_FG)
    } else {
        Style::default().fg(ACCENT)
    };
    let status_span = Span::styled(status, status_style);
    let status_items = [StatusBarItem::span(status_span)];

    let hints = footer_hints(state);
    let style = StatusBarStyle {
        base: BaseStyle {
            border: Some(BorderStyle {
                borders: Borders::ALL,
                style: Style::default().fg(TEXT_DIM),
                focused_style: Some(Style::default().fg(ACCENT)),
            }),
            padding: Padding::xy(1, 0),
            bg: Some(BG_PANEL),
            fg: Some(TEXT_MAIN),
        },
        text: Style::default().fg(TEXT_DIM),
        hint_key: Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        hint_label: Style::default().fg(TEXT_DIM),
        separator: Style::default().fg(TEXT_DIM),
    };
    let props = StatusBarProps {
        left: StatusBarSection::hints(&hints).with_separator("  "),
        center: StatusBarSection::empty(),
        right: StatusBarSection::items(&status_items).with_separator("  "),
        style,
        is_focused: false,
    };
    Component::<Action>::render(status_bar, frame, area, props);
}

fn footer_status(state: &AppState) -> String {
    if state.goto.active {
        if let Some(error) = &state.goto.error {
            return error.clone();
        }
        return format!("Go to page: {}_", state.goto.input);
    }
    if state.loading_active() {
        return loading_label(state);
    }
    String::new()
}

fn footer_hints(state: &AppState) -> Vec<StatusBarHint<'static>> {
    if state.goto.active {
        return vec![
            StatusBarHint::new("Enter", "Jump"),
            StatusBarHint::new("Esc", "Cancel"),
        ];
    }
    match state.screen {
        Screen::Browser => vec![
            StatusBarHint::new("\u{2190}/\u{2192}", "Page"),
            StatusBarHint::new("j/k", "Move"),
            StatusBarHint::new("Enter", "Open"),
            StatusBarHint::new("g", "Go to"),
            StatusBarHint::new("q", "Quit"),
        ],
        Screen::Detail => vec![
            StatusBarHint::new("Esc", "Back"),
            StatusBarHint::new("q", "Quit"),
        ],
    }
}

fn loading_label(state: &AppState) -> String {
    match state.screen {
        Screen::Browser => format!("Loading page {}...", state.page),
        Screen::Detail => match state.detail_id {
            Some(id) => format!("Loading entity #{id}..."),
            None => "Loading...".to_string(),
        },
    }
}

fn render_notice(frame: &mut Frame, area: Rect, message: &str, color: Color) {
    let paragraph = Paragraph::new(message.to_string())
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(color));
    frame.render_widget(paragraph, area);
}

fn entry_items(window: &crate::state::PageWindow) -> Vec<Line<'static>> {
    window
        .items
        .iter()
        .map(|entity| {
            let mut spans = vec![Span::styled(
                format!("#{:04} {:<14}", entity.id, capitalize(&entity.name)),
                Style::default().fg(TEXT_MAIN),
            )];
            for (idx, type_name) in entity.types.iter().enumerate() {
                if idx > 0 {
                    spans.push(Span::raw("/"));
                }
                spans.push(Span::styled(
                    type_name.clone(),
                    Style::default().fg(type_color(type_name)),
                ));
            }
            Line::from(spans)
        })
        .collect()
}

fn entry_list_style() -> SelectListStyle {
    SelectListStyle {
        base: BaseStyle {
            border: None,
            padding: Padding::xy(1, 0),
            bg: Some(BG_PANEL),
            fg: Some(TEXT_MAIN),
        },
        selection: SelectionStyle {
            style: Some(
                Style::default()
                    .bg(BG_HIGHLIGHT)
                    .fg(TEXT_MAIN)
                    .add_modifier(Modifier::BOLD),
            ),
            marker: None,
            disabled: false,
        },
        ..SelectListStyle::default()
    }
}

fn capitalize(name: &str) -> String {
    name.split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => format!("{}{}", first.to_ascii_uppercase(), chars.as_str()),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
