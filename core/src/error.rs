use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Too many mines")]
    TooManyMines,
    #[error("Game already ended, no new moves are accepted")]
    AlreadyEnded,
    #[error("Cell was already played")]
    AlreadyPlayed,
    #[error("Cell is already known to be a mine")]
    KnownMine,
    #[error("Neighbor count {count} contradicts what is already known")]
    InconsistentClue { count: u8 },
}

pub type Result<T> = core::result::Result<T, GameError>;
