use crate::*;
pub use random::*;

mod random;

pub trait MineGenerator {
    fn generate(self, config: GameConfig) -> MineLayout;
}

/// How much of the first cell's surroundings is kept free of mines.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum StartTile {
    #[default]
    Random,
    SimpleSafe,
    AlwaysZero,
}
