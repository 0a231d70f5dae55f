#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    LoadPage { page: usize },
    LoadDetail { id: u16 },
}
