use serde::{Deserialize, Serialize};

use crate::state::{DetailBundle, PageWindow};

#[derive(tui_dispatch::Action, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[action(infer_categories)]
pub enum Action {
    Init,

    PagePrev,
    PageNext,
    PageDidLoad(PageWindow),
    PageDidError { page: usize, error: String },

    GotoStart,
    GotoCancel,
    GotoInput(char),
    GotoBackspace,
    GotoSubmit,

    SelectionMove(i16),
    ListSelect(usize),

    EntityOpen(u16),
    EntityClose,
    DetailDidLoad(DetailBundle),
    DetailDidError { id: u16, error: String },

    UiTerminalResize(u16, u16),
    Tick,
    Quit,
}
