use serde::{Deserialize, Serialize};

/// Player-visible state of a single cell.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellView {
    #[default]
    Hidden,
    Revealed(u8),
    Flagged,
}

impl CellView {
    /// Single character used by the text rendering of a board.
    pub const fn symbol(self) -> char {
        match self {
            Self::Hidden => '#',
            Self::Flagged => 'F',
            Self::Revealed(0) => '.',
            Self::Revealed(count) if count < 10 => (b'0' + count) as char,
            Self::Revealed(_) => '?',
        }
    }
}
