use core::fmt;
use core::num::Saturating;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    #[default]
    Ready,
    Active,
    Won,
    Lost,
}

impl GameState {
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

/// A game in progress: the hidden mine layout plus what the player has uncovered so far.
///
/// Every reveal opens exactly one cell, so whoever plays decides each move on their own. The game
/// is won once every safe cell is revealed, or once the flags sit exactly on the mines.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Game {
    mine_layout: MineLayout,
    board: Array2<CellView>,
    revealed_count: Saturating<CellCount>,
    flagged_count: Saturating<CellCount>,
    flagged_mines: Saturating<CellCount>,
    state: GameState,
    triggered_mine: Option<Coord2>,
}

impl Game {
    pub fn new(mine_layout: MineLayout) -> Self {
        let size = mine_layout.size();
        Self {
            mine_layout,
            board: Array2::default(size.to_nd_index()),
            revealed_count: Saturating(0),
            flagged_count: Saturating(0),
            flagged_mines: Saturating(0),
            state: Default::default(),
            triggered_mine: None,
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    pub fn is_won(&self) -> bool {
        matches!(self.state, GameState::Won)
    }

    pub fn size(&self) -> Coord2 {
        self.mine_layout.size()
    }

    pub fn mine_layout(&self) -> &MineLayout {
        &self.mine_layout
    }

    pub fn mines_left(&self) -> isize {
        (self.mine_layout.mine_count() as isize) - (self.flagged_count.0 as isize)
    }

    pub fn revealed_count(&self) -> CellCount {
        self.revealed_count.0
    }

    pub fn cell_at(&self, coords: Coord2) -> CellView {
        self.board[coords.to_nd_index()]
    }

    pub fn triggered_mine(&self) -> Option<Coord2> {
        self.triggered_mine
    }

    pub fn toggle_flag(&mut self, coords: Coord2) -> Result<MarkOutcome> {
        use CellView::*;
        use MarkOutcome::*;

        let coords = self.mine_layout.validate_coords(coords)?;
        self.check_not_finished()?;

        let has_mine = self.mine_layout[coords];
        let outcome = match self.board[coords.to_nd_index()] {
            Hidden => {
                self.board[coords.to_nd_index()] = Flagged;
                self.flagged_count += 1;
                if has_mine {
                    self.flagged_mines += 1;
                }
                Changed
            }
            Flagged => {
                self.board[coords.to_nd_index()] = Hidden;
                self.flagged_count -= 1;
                if has_mine {
                    self.flagged_mines -= 1;
                }
                Changed
            }
            Revealed(_) => NoChange,
        };
        self.check_flags_won();
        Ok(outcome)
    }

    /// Flags a hidden cell, leaving already flagged cells alone.
    pub fn flag(&mut self, coords: Coord2) -> Result<MarkOutcome> {
        let coords = self.mine_layout.validate_coords(coords)?;
        self.check_not_finished()?;

        match self.board[coords.to_nd_index()] {
            CellView::Hidden => self.toggle_flag(coords),
            CellView::Revealed(_) | CellView::Flagged => Ok(MarkOutcome::NoChange),
        }
    }

    pub fn reveal(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        let coords = self.mine_layout.validate_coords(coords)?;

        if matches!(self.board[coords.to_nd_index()], CellView::Hidden) {
            self.check_not_finished()?;
            Ok(self.reveal_single_cell(coords))
        } else {
            Ok(RevealOutcome::NoChange)
        }
    }

    fn reveal_single_cell(&mut self, coords: Coord2) -> RevealOutcome {
        if self.mine_layout[coords] {
            log::debug!("hit mine at {:?}", coords);
            self.triggered_mine = Some(coords);
            self.end_game(false);
            return RevealOutcome::HitMine;
        }

        let adjacent_mines = self.mine_layout.adjacent_mine_count(coords);
        self.board[coords.to_nd_index()] = CellView::Revealed(adjacent_mines);
        self.revealed_count += 1;
        log::trace!("revealed {:?}: {}", coords, adjacent_mines);

        if self.revealed_count == Saturating(self.mine_layout.safe_cell_count()) {
            self.end_game(true);
            RevealOutcome::Won
        } else {
            self.mark_started();
            RevealOutcome::Revealed(adjacent_mines)
        }
    }

    fn check_flags_won(&mut self) {
        let mines = self.mine_layout.mine_count();
        if self.flagged_mines.0 == mines && self.flagged_count.0 == mines {
            self.end_game(true);
        }
    }

    fn mark_started(&mut self) {
        if matches!(self.state, GameState::Ready) {
            self.state = GameState::Active;
        }
    }

    fn end_game(&mut self, won: bool) {
        if self.state.is_finished() {
            return;
        }

        self.state = if won { GameState::Won } else { GameState::Lost };
        if won {
            self.triggered_mine = None;
        }
        log::debug!("game over: {:?}", self.state);
    }

    fn check_not_finished(&self) -> Result<()> {
        if self.state.is_finished() {
            Err(GameError::AlreadyEnded)
        } else {
            Ok(())
        }
    }
}

/// Player view: `#` hidden, `F` flagged, `.` or a digit when revealed.
impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (rows, cols) = self.size();
        for row in 0..rows {
            for col in 0..cols {
                write!(f, "{}", self.cell_at((row, col)).symbol())?;
            }
            f.write_str("\n")?;
        }
        Ok(())
    }
}
