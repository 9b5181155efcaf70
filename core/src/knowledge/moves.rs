use alloc::vec::Vec;
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use super::KnowledgeBase;
use crate::*;

/// Next cell the automated player wants to reveal.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Move {
    /// Proven safe by the knowledge base.
    Safe(Coord2),
    /// Nothing is proven safe, picked at random among cells not known to be mines.
    Guess(Coord2),
}

impl Move {
    pub const fn coords(self) -> Coord2 {
        match self {
            Self::Safe(coords) | Self::Guess(coords) => coords,
        }
    }

    pub const fn is_guess(self) -> bool {
        matches!(self, Self::Guess(_))
    }
}

impl KnowledgeBase {
    /// A cell proven safe that was not played yet, lowest in row-major order.
    pub fn next_safe_move(&self) -> Option<Coord2> {
        self.safe_cells()
            .difference(self.moves_made())
            .next()
            .copied()
    }

    /// A uniformly random cell among those neither played nor known to be mines.
    pub fn next_random_move<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Coord2> {
        let candidates: Vec<Coord2> = iter_cells(self.size())
            .filter(|cell| !self.moves_made().contains(cell) && !self.is_known_mine(*cell))
            .collect();
        candidates.choose(rng).copied()
    }

    /// Safe move when one exists, a guess otherwise, `None` once no legal move remains.
    pub fn next_move<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Move> {
        if let Some(cell) = self.next_safe_move() {
            return Some(Move::Safe(cell));
        }
        self.next_random_move(rng).map(Move::Guess)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::collections::BTreeMap;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn safe_move_skips_played_cells() {
        let mut kb = KnowledgeBase::new((3, 3));
        kb.record_observation((1, 1), 0).unwrap();

        assert_eq!(kb.next_safe_move(), Some((0, 0)));
    }

    #[test]
    fn no_safe_move_without_knowledge() {
        let kb = KnowledgeBase::new((3, 3));

        assert_eq!(kb.next_safe_move(), None);
    }

    #[test]
    fn random_move_avoids_played_and_mined_cells() {
        let mut kb = KnowledgeBase::new((1, 3));
        kb.record_observation((0, 0), 1).unwrap();
        let mut rng = SmallRng::seed_from_u64(7);

        assert!(kb.is_known_mine((0, 1)));
        for _ in 0..20 {
            assert_eq!(kb.next_random_move(&mut rng), Some((0, 2)));
        }
    }

    #[test]
    fn random_move_exhausted_when_last_cell_is_a_mine() {
        let layout = MineLayout::from_mine_coords((3, 3), &[(2, 2)]).unwrap();
        let mut kb = KnowledgeBase::new(layout.size());
        kb.mark_mine((2, 2));
        for cell in iter_cells((3, 3)).filter(|&cell| cell != (2, 2)) {
            kb.record_observation(cell, layout.adjacent_mine_count(cell))
                .unwrap();
        }
        let mut rng = SmallRng::seed_from_u64(1);

        assert_eq!(kb.moves_made().len(), 8);
        assert_eq!(kb.next_random_move(&mut rng), None);
        assert_eq!(kb.next_move(&mut rng), None);
    }

    #[test]
    fn random_move_is_roughly_uniform() {
        let kb = KnowledgeBase::new((2, 2));
        let mut rng = SmallRng::seed_from_u64(42);

        let mut counts: BTreeMap<Coord2, u32> = BTreeMap::new();
        for _ in 0..2000 {
            let cell = kb.next_random_move(&mut rng).unwrap();
            *counts.entry(cell).or_default() += 1;
        }

        assert_eq!(counts.len(), 4);
        for (cell, &count) in &counts {
            assert!((300..=700).contains(&count), "{cell:?} picked {count} times");
        }
    }

    #[test]
    fn next_move_prefers_safe_cells() {
        let mut kb = KnowledgeBase::new((2, 2));
        kb.mark_safe((1, 1));
        let mut rng = SmallRng::seed_from_u64(3);

        assert_eq!(kb.next_move(&mut rng), Some(Move::Safe((1, 1))));

        kb.record_observation((1, 1), 1).unwrap();
        let next = kb.next_move(&mut rng).unwrap();

        assert!(next.is_guess());
        assert_ne!(next.coords(), (1, 1));
    }
}
