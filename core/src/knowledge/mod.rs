use alloc::collections::BTreeSet;
use alloc::vec::Vec;
use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

use crate::*;
pub use moves::*;
pub use statement::*;

mod moves;
mod statement;

/// Summary of what a propagation run learned.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Propagation {
    /// Full passes over the statements, including the final pass that changed nothing.
    pub passes: usize,
    /// Cells newly proven safe.
    pub safes: usize,
    /// Cells newly proven to be mines.
    pub mines: usize,
    /// Statements added by subset elimination.
    pub derived: usize,
    /// Statements dropped because every one of their cells became known.
    pub discarded: usize,
}

impl Propagation {
    /// Whether the run proved anything new about the board
    pub const fn has_update(&self) -> bool {
        self.safes > 0 || self.mines > 0
    }
}

/// What the automated player knows about a board of a given size.
///
/// The three cell sets only ever grow, and `safe_cells` and `mine_cells` never overlap. Every
/// statement only mentions cells that are neither known safe nor known mines.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeBase {
    size: Coord2,
    moves_made: BTreeSet<Coord2>,
    safe_cells: BTreeSet<Coord2>,
    mine_cells: BTreeSet<Coord2>,
    statements: Vec<Statement>,
}

impl KnowledgeBase {
    /// Empty knowledge for a board of `(height, width)` cells.
    pub fn new(size: Coord2) -> Self {
        Self {
            size,
            moves_made: BTreeSet::new(),
            safe_cells: BTreeSet::new(),
            mine_cells: BTreeSet::new(),
            statements: Vec::new(),
        }
    }

    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(config.size)
    }

    pub fn size(&self) -> Coord2 {
        self.size
    }

    pub fn moves_made(&self) -> &BTreeSet<Coord2> {
        &self.moves_made
    }

    pub fn safe_cells(&self) -> &BTreeSet<Coord2> {
        &self.safe_cells
    }

    pub fn mine_cells(&self) -> &BTreeSet<Coord2> {
        &self.mine_cells
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    pub fn is_known_safe(&self, cell: Coord2) -> bool {
        self.safe_cells.contains(&cell)
    }

    pub fn is_known_mine(&self, cell: Coord2) -> bool {
        self.mine_cells.contains(&cell)
    }

    /// Records that `cell` is a mine, and removes it from every statement.
    pub fn mark_mine(&mut self, cell: Coord2) -> MarkOutcome {
        debug_assert!(
            !self.safe_cells.contains(&cell),
            "{cell:?} is already known to be safe"
        );
        let outcome = if self.mine_cells.insert(cell) {
            MarkOutcome::Changed
        } else {
            MarkOutcome::NoChange
        };
        for statement in &mut self.statements {
            statement.mark_mine(cell);
        }
        outcome
    }

    /// Records that `cell` is safe, and removes it from every statement.
    pub fn mark_safe(&mut self, cell: Coord2) -> MarkOutcome {
        debug_assert!(
            !self.mine_cells.contains(&cell),
            "{cell:?} is already known to be a mine"
        );
        let outcome = if self.safe_cells.insert(cell) {
            MarkOutcome::Changed
        } else {
            MarkOutcome::NoChange
        };
        for statement in &mut self.statements {
            statement.mark_safe(cell);
        }
        outcome
    }

    /// Folds in the board's report that the freshly revealed `cell` has `count` neighboring mines,
    /// then propagates until nothing new can be deduced.
    ///
    /// Nothing is modified when an error is returned.
    pub fn record_observation(&mut self, cell: Coord2, count: u8) -> Result<Propagation> {
        if !in_bounds(cell, self.size) {
            return Err(GameError::InvalidCoords);
        }
        if self.moves_made.contains(&cell) {
            return Err(GameError::AlreadyPlayed);
        }
        if self.mine_cells.contains(&cell) {
            return Err(GameError::KnownMine);
        }

        let neighbors = neighborhood(cell, self.size);
        let known_mines = neighbors
            .iter()
            .filter(|&neighbor| self.mine_cells.contains(neighbor))
            .count();
        let undetermined: Neighborhood = neighbors
            .iter()
            .copied()
            .filter(|neighbor| {
                !self.safe_cells.contains(neighbor) && !self.mine_cells.contains(neighbor)
            })
            .collect();
        let remaining = usize::from(count)
            .checked_sub(known_mines)
            .filter(|&remaining| remaining <= undetermined.len())
            .ok_or(GameError::InconsistentClue { count })?;

        log::trace!(
            "observe {:?} = {}: {} undetermined, {} known mines",
            cell,
            count,
            undetermined.len(),
            known_mines
        );

        self.moves_made.insert(cell);
        self.mark_safe(cell);

        if !undetermined.is_empty() {
            self.statements
                .push(Statement::new(undetermined, remaining as CellCount));
        }

        Ok(self.propagate())
    }

    /// Runs certainty extraction and subset elimination until a full pass changes nothing.
    pub fn propagate(&mut self) -> Propagation {
        let mut stats = Propagation::default();

        loop {
            stats.passes += 1;
            let mut changed = false;

            let mut new_safes = BTreeSet::new();
            let mut new_mines = BTreeSet::new();
            for statement in &self.statements {
                new_safes.extend(statement.known_safes());
                new_mines.extend(statement.known_mines());
            }

            for cell in new_safes {
                if !self.safe_cells.contains(&cell) {
                    self.mark_safe(cell);
                    stats.safes += 1;
                    changed = true;
                }
            }
            for cell in new_mines {
                if !self.mine_cells.contains(&cell) {
                    self.mark_mine(cell);
                    stats.mines += 1;
                    changed = true;
                }
            }

            let before = self.statements.len();
            self.statements.retain(|statement| !statement.is_empty());
            stats.discarded += before - self.statements.len();

            let derived = self.resolve_subsets();
            if !derived.is_empty() {
                log::trace!("pass {}: derived {} statements", stats.passes, derived.len());
                stats.derived += derived.len();
                self.statements.extend(derived);
                changed = true;
            }

            debug_assert!(self.check_invariants(), "knowledge base is inconsistent");

            if !changed {
                break;
            }
        }

        log::debug!(
            "propagated in {} passes: {} safe, {} mines, {} derived, {} active statements",
            stats.passes,
            stats.safes,
            stats.mines,
            stats.derived,
            self.statements.len()
        );
        stats
    }

    /// Derives `A - B` for every ordered pair where `B` is a subset of `A`, keeping only non-empty
    /// statements that are not already known.
    fn resolve_subsets(&self) -> Vec<Statement> {
        let mut seen: HashSet<Statement> = self.statements.iter().cloned().collect();
        let mut derived = Vec::new();

        for (i, superset) in self.statements.iter().enumerate() {
            for (j, subset) in self.statements.iter().enumerate() {
                if i == j || subset.len() > superset.len() {
                    continue;
                }
                let Some(candidate) = superset.resolve(subset) else {
                    continue;
                };
                if candidate.is_empty() || seen.contains(&candidate) {
                    continue;
                }
                seen.insert(candidate.clone());
                derived.push(candidate);
            }
        }

        derived
    }

    /// Checks every invariant the engine maintains:
    /// - known safe and known mine cells are disjoint
    /// - every move made is known safe
    /// - every statement is consistent and only mentions undetermined cells
    pub fn check_invariants(&self) -> bool {
        self.safe_cells.is_disjoint(&self.mine_cells)
            && self.moves_made.is_subset(&self.safe_cells)
            && self.statements.iter().all(|statement| {
                statement.is_consistent()
                    && statement.cells().is_disjoint(&self.safe_cells)
                    && statement.cells().is_disjoint(&self.mine_cells)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn cells(list: &[Coord2]) -> BTreeSet<Coord2> {
        list.iter().copied().collect()
    }

    #[test]
    fn zero_in_center_clears_every_neighbor() {
        let mut kb = KnowledgeBase::new((3, 3));

        let stats = kb.record_observation((1, 1), 0).unwrap();

        let every_cell: BTreeSet<Coord2> = iter_cells((3, 3)).collect();
        assert_eq!(kb.safe_cells(), &every_cell);
        assert_eq!(stats.safes, 8);
        assert!(kb.mine_cells().is_empty());
        assert!(kb.statements().is_empty());
    }

    #[test]
    fn known_mine_is_folded_out_of_new_statement() {
        let mut kb = KnowledgeBase::new((3, 3));
        kb.mark_mine((1, 0));

        kb.record_observation((0, 0), 1).unwrap();

        assert!(kb.is_known_safe((0, 1)));
        assert!(kb.is_known_safe((1, 1)));
        assert!(kb.check_invariants());
    }

    #[test]
    fn subset_elimination_proves_remaining_cell_safe() {
        let mut kb = KnowledgeBase::new((3, 3));
        kb.statements.push(Statement::new([(0, 0), (0, 1), (0, 2)], 1));
        kb.statements.push(Statement::new([(0, 0), (0, 1)], 1));

        let stats = kb.propagate();

        assert!(kb.is_known_safe((0, 2)));
        assert!(stats.derived >= 1);
        assert!(
            kb.statements()
                .iter()
                .all(|statement| !statement.contains((0, 2)))
        );
    }

    #[test]
    fn resolution_adds_difference_statement() {
        let mut kb = KnowledgeBase::new((4, 4));
        kb.statements.push(Statement::new([(0, 0), (0, 1), (0, 2), (0, 3)], 2));
        kb.statements.push(Statement::new([(0, 0), (0, 1)], 1));

        kb.propagate();

        assert!(
            kb.statements()
                .contains(&Statement::new([(0, 2), (0, 3)], 1))
        );
        assert!(kb.safe_cells().is_empty());
        assert!(kb.mine_cells().is_empty());
    }

    #[test]
    fn resolution_does_not_duplicate_existing_statements() {
        let mut kb = KnowledgeBase::new((4, 4));
        kb.statements.push(Statement::new([(0, 0), (0, 1), (0, 2), (0, 3)], 2));
        kb.statements.push(Statement::new([(0, 0), (0, 1)], 1));
        kb.statements.push(Statement::new([(0, 2), (0, 3)], 1));

        let stats = kb.propagate();

        assert_eq!(stats.derived, 0);
        assert_eq!(stats.passes, 1);
        assert_eq!(kb.statements().len(), 3);
    }

    #[test]
    fn resolution_finds_mines() {
        let mut kb = KnowledgeBase::new((3, 3));
        kb.statements.push(Statement::new([(2, 0), (2, 1), (2, 2)], 2));
        kb.statements.push(Statement::new([(2, 0), (2, 1)], 1));

        kb.propagate();

        assert_eq!(kb.mine_cells(), &cells(&[(2, 2)]));
    }

    #[test]
    fn mark_mine_twice_changes_nothing() {
        let mut kb = KnowledgeBase::new((3, 3));
        kb.statements.push(Statement::new([(0, 0), (0, 1)], 1));

        assert_eq!(kb.mark_mine((0, 0)), MarkOutcome::Changed);
        let before = kb.clone();
        assert_eq!(kb.mark_mine((0, 0)), MarkOutcome::NoChange);

        assert_eq!(kb, before);
    }

    #[test]
    fn mark_safe_is_forwarded_to_statements() {
        let mut kb = KnowledgeBase::new((3, 3));
        kb.statements.push(Statement::new([(0, 0), (0, 1)], 1));

        kb.mark_safe((0, 1));

        assert_eq!(kb.statements(), &[Statement::new([(0, 0)], 1)]);
    }

    #[test]
    fn observation_with_all_neighbors_known_adds_no_statement() {
        let mut kb = KnowledgeBase::new((1, 3));
        kb.mark_safe((0, 0));
        kb.mark_mine((0, 2));

        let stats = kb.record_observation((0, 1), 1).unwrap();

        assert!(kb.statements().is_empty());
        assert_eq!(stats, Propagation { passes: 1, ..Default::default() });
    }

    #[test]
    fn chained_observations_resolve_a_corridor() {
        // 1x4 corridor with a single mine at the far end: 0 1 1 *
        let mut kb = KnowledgeBase::new((1, 4));

        kb.record_observation((0, 0), 0).unwrap();
        assert!(kb.is_known_safe((0, 1)));

        kb.record_observation((0, 1), 0).unwrap();
        assert!(kb.is_known_safe((0, 2)));

        kb.record_observation((0, 2), 1).unwrap();
        assert!(kb.is_known_mine((0, 3)));
        assert!(kb.check_invariants());
    }

    #[test]
    fn two_overlapping_clues_split_unknowns() {
        // Row 0 is hidden, row 1 is revealed with clues 1 at (1, 0) and 1 at (1, 1) on a 2x3 board.
        // The mine is at (0, 0) or (0, 1); therefore (0, 2) is safe.
        let mut kb = KnowledgeBase::new((2, 3));
        kb.mark_safe((1, 2));

        kb.record_observation((1, 0), 1).unwrap();
        kb.record_observation((1, 1), 1).unwrap();

        assert!(kb.is_known_safe((0, 2)));
        assert!(!kb.is_known_safe((0, 0)));
        assert!(!kb.is_known_mine((0, 0)));
    }

    #[test]
    fn sets_only_grow() {
        let layout = MineLayout::from_mine_coords((3, 3), &[(2, 0), (2, 2)]).unwrap();
        let mut kb = KnowledgeBase::new(layout.size());
        let mut previous = kb.clone();

        for cell in [(0, 0), (0, 1), (0, 2), (1, 1), (1, 0), (1, 2)] {
            if kb.moves_made().contains(&cell) {
                continue;
            }
            kb.record_observation(cell, layout.adjacent_mine_count(cell))
                .unwrap();
            assert!(previous.moves_made().is_subset(kb.moves_made()));
            assert!(previous.safe_cells().is_subset(kb.safe_cells()));
            assert!(previous.mine_cells().is_subset(kb.mine_cells()));
            assert!(kb.check_invariants());
            previous = kb.clone();
        }

        assert_eq!(kb.mine_cells(), &cells(&[(2, 0), (2, 2)]));
    }

    #[test]
    fn rejects_out_of_bounds_cell() {
        let mut kb = KnowledgeBase::new((3, 3));

        assert_eq!(kb.record_observation((3, 0), 0), Err(GameError::InvalidCoords));
        assert_eq!(kb, KnowledgeBase::new((3, 3)));
    }

    #[test]
    fn rejects_repeated_move() {
        let mut kb = KnowledgeBase::new((3, 3));
        kb.record_observation((0, 0), 1).unwrap();
        let before = kb.clone();

        assert_eq!(kb.record_observation((0, 0), 1), Err(GameError::AlreadyPlayed));
        assert_eq!(kb, before);
    }

    #[test]
    fn rejects_known_mine() {
        let mut kb = KnowledgeBase::new((3, 3));
        kb.mark_mine((2, 2));

        assert_eq!(kb.record_observation((2, 2), 0), Err(GameError::KnownMine));
    }

    #[test]
    fn rejects_count_that_contradicts_known_cells() {
        let mut kb = KnowledgeBase::new((3, 3));
        kb.mark_mine((0, 1));
        kb.mark_mine((1, 0));

        assert_eq!(
            kb.record_observation((0, 0), 1),
            Err(GameError::InconsistentClue { count: 1 })
        );
        assert_eq!(
            kb.record_observation((0, 0), 4),
            Err(GameError::InconsistentClue { count: 4 })
        );
        assert!(kb.moves_made().is_empty());
    }

    #[test]
    fn statements_stay_consistent_across_a_game() {
        let layout = MineLayout::from_mine_coords((4, 4), &[(0, 3), (2, 1), (3, 3)]).unwrap();
        let mut kb = KnowledgeBase::new(layout.size());
        let mut queue = vec![(0, 0)];

        while let Some(cell) = queue.pop() {
            if kb.moves_made().contains(&cell) {
                continue;
            }
            kb.record_observation(cell, layout.adjacent_mine_count(cell))
                .unwrap();
            for statement in kb.statements() {
                assert!(statement.is_consistent());
            }
            queue.extend(
                kb.safe_cells()
                    .iter()
                    .filter(|&&safe| !kb.moves_made().contains(&safe))
                    .copied(),
            );
        }

        assert!(kb.check_invariants());
        for mine in kb.mine_cells() {
            assert!(layout.contains_mine(*mine));
        }
        for safe in kb.safe_cells() {
            assert!(!layout.contains_mine(*safe));
        }
    }
}
