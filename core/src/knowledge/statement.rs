use alloc::collections::BTreeSet;
use core::fmt;
use serde::{Deserialize, Serialize};

use crate::*;

/// Assertion that exactly `count` of `cells` are mines.
///
/// Cells are removed in place as their status becomes known, so a statement only ever talks about
/// cells that are still undetermined. Once `cells` is empty the statement carries no information.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Statement {
    cells: BTreeSet<Coord2>,
    count: CellCount,
}

impl Statement {
    pub fn new(cells: impl IntoIterator<Item = Coord2>, count: CellCount) -> Self {
        Self {
            cells: cells.into_iter().collect(),
            count,
        }
    }

    pub fn cells(&self) -> &BTreeSet<Coord2> {
        &self.cells
    }

    pub fn count(&self) -> CellCount {
        self.count
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, cell: Coord2) -> bool {
        self.cells.contains(&cell)
    }

    /// Every cell is a mine when there are exactly as many cells as mines.
    pub fn known_mines(&self) -> BTreeSet<Coord2> {
        if self.count > 0 && self.cells.len() == usize::from(self.count) {
            self.cells.clone()
        } else {
            BTreeSet::new()
        }
    }

    /// Every cell is safe when none of them is a mine.
    pub fn known_safes(&self) -> BTreeSet<Coord2> {
        if self.count == 0 {
            self.cells.clone()
        } else {
            BTreeSet::new()
        }
    }

    pub fn mark_mine(&mut self, cell: Coord2) -> MarkOutcome {
        if !self.cells.remove(&cell) {
            return MarkOutcome::NoChange;
        }
        debug_assert!(self.count > 0, "mine {cell:?} removed from a zero-count statement");
        self.count = self.count.saturating_sub(1);
        MarkOutcome::Changed
    }

    pub fn mark_safe(&mut self, cell: Coord2) -> MarkOutcome {
        if self.cells.remove(&cell) {
            MarkOutcome::Changed
        } else {
            MarkOutcome::NoChange
        }
    }

    pub fn is_subset_of(&self, other: &Statement) -> bool {
        self.cells.is_subset(&other.cells)
    }

    /// Subset elimination: when `subset.cells ⊆ self.cells`, the cells only `self` mentions hold
    /// exactly `self.count - subset.count` mines.
    ///
    /// Returns `None` when `subset` is not actually a subset, or when the counts are inconsistent.
    pub fn resolve(&self, subset: &Statement) -> Option<Statement> {
        if !subset.is_subset_of(self) {
            return None;
        }
        let Some(count) = self.count.checked_sub(subset.count) else {
            debug_assert!(false, "resolving {subset} against {self} underflows the count");
            return None;
        };
        Some(Statement {
            cells: self.cells.difference(&subset.cells).copied().collect(),
            count,
        })
    }

    /// `0 <= count <= len(cells)`
    pub fn is_consistent(&self) -> bool {
        usize::from(self.count) <= self.cells.len()
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (row, col)) in self.cells.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "({row}, {col})")?;
        }
        write!(f, "}} = {}", self.count)
    }
}
