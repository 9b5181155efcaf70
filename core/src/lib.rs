#![no_std]

extern crate alloc;

use alloc::vec::Vec;
use core::fmt;
use core::ops::Index;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

pub use error::*;
pub use game::*;
pub use generator::*;
pub use knowledge::*;
pub use tile::*;
pub use types::*;

mod error;
mod game;
mod generator;
mod knowledge;
mod tile;
mod types;

/// Board dimensions as `(height, width)` plus how many mines to place.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub size: Coord2,
    pub mines: CellCount,
}

impl GameConfig {
    pub const fn new_unchecked(size: Coord2, mines: CellCount) -> Self {
        Self { size, mines }
    }

    /// Checked constructor. A full board is allowed, an empty one or more mines than cells is not.
    pub fn new(size: Coord2, mines: CellCount) -> Result<Self> {
        if size.0 == 0 || size.1 == 0 {
            return Err(GameError::InvalidCoords);
        }
        let config = Self::new_unchecked(size, mines);
        if mines > config.total_cells() {
            return Err(GameError::TooManyMines);
        }
        Ok(config)
    }

    pub const fn beginner() -> Self {
        Self::new_unchecked((9, 9), 10)
    }

    pub const fn intermediate() -> Self {
        Self::new_unchecked((16, 16), 40)
    }

    pub const fn expert() -> Self {
        Self::new_unchecked((16, 30), 99)
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.size.0, self.size.1)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new_unchecked((8, 8), 8)
    }
}

/// Where the mines are. This is the oracle the automated player asks for neighbor counts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MineLayout {
    mine_mask: Array2<bool>,
    mine_count: CellCount,
}

impl MineLayout {
    /// The mask must come from a board size that fits in [`Coord2`].
    pub(crate) fn from_mine_mask(mine_mask: Array2<bool>) -> Self {
        let mine_count = mine_mask.iter().filter(|&&is_mine| is_mine).count();
        let mine_count = mine_count.try_into().unwrap_or(CellCount::MAX);
        Self {
            mine_mask,
            mine_count,
        }
    }

    pub fn from_mine_coords(size: Coord2, mine_coords: &[Coord2]) -> Result<Self> {
        let mut mine_mask: Array2<bool> = Array2::default(size.to_nd_index());

        for &coords in mine_coords {
            if !in_bounds(coords, size) {
                return Err(GameError::InvalidCoords);
            }
            mine_mask[coords.to_nd_index()] = true;
        }

        Ok(Self::from_mine_mask(mine_mask))
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        if in_bounds(coords, self.size()) {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    pub fn size(&self) -> Coord2 {
        let (rows, cols) = self.mine_mask.dim();
        (
            rows.try_into().unwrap_or(Coord::MAX),
            cols.try_into().unwrap_or(Coord::MAX),
        )
    }

    pub fn safe_cell_count(&self) -> CellCount {
        self.total_cells() - self.mine_count
    }

    pub fn total_cells(&self) -> CellCount {
        let (rows, cols) = self.size();
        mult(rows, cols)
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn contains_mine(&self, coords: Coord2) -> bool {
        self[coords]
    }

    /// Mines among the (up to) eight cells around `coords`, not counting `coords` itself.
    pub fn adjacent_mine_count(&self, coords: Coord2) -> u8 {
        NeighborIter::new(coords, self.size())
            .map(|pos| u8::from(self[pos]))
            .sum()
    }

    /// Every mine position, in row-major order.
    pub fn mine_coords(&self) -> Vec<Coord2> {
        iter_cells(self.size())
            .filter(|&coords| self[coords])
            .collect()
    }
}

impl Index<Coord2> for MineLayout {
    type Output = bool;

    fn index(&self, (row, col): Coord2) -> &Self::Output {
        &self.mine_mask[(usize::from(row), usize::from(col))]
    }
}

/// Text grid with `X` for every mine.
impl fmt::Display for MineLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (rows, cols) = self.size();
        for row in 0..rows {
            write_rule(f, cols)?;
            for col in 0..cols {
                f.write_str(if self[(row, col)] { "|X" } else { "| " })?;
            }
            f.write_str("|\n")?;
        }
        write_rule(f, cols)
    }
}

fn write_rule(f: &mut fmt::Formatter<'_>, cols: Coord) -> fmt::Result {
    for _ in 0..cols {
        f.write_str("--")?;
    }
    f.write_str("-\n")
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MarkOutcome {
    NoChange,
    Changed,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RevealOutcome {
    NoChange,
    /// Safe cell opened, carrying how many of its neighbors are mines.
    Revealed(u8),
    HitMine,
    Won,
}
