use alloc::vec::Vec;
use ndarray::Array2;

use super::*;

/// Generation strategy that can optionally try to make the starting cell zero or at least safe, but other than that is
/// purely random.
#[derive(Clone, Debug, PartialEq)]
pub struct RandomMineGenerator {
    seed: u64,
    start: Coord2,
    start_tile: StartTile,
}

impl RandomMineGenerator {
    pub fn new(seed: u64, start: Coord2, start_tile: StartTile) -> Self {
        Self {
            seed,
            start,
            start_tile,
        }
    }

    /// Plain uniform placement, no cell is kept free.
    pub fn uniform(seed: u64) -> Self {
        Self::new(seed, (0, 0), StartTile::Random)
    }
}

impl MineGenerator for RandomMineGenerator {
    fn generate(self, config: GameConfig) -> MineLayout {
        use StartTile::*;
        use rand::prelude::*;

        let size = config.size;
        let total_cells = config.total_cells();

        // optimize for full boards
        if config.mines >= total_cells {
            if config.mines > total_cells {
                log::warn!(
                    "Board already full, generated anyway, requested {} but only fits {}",
                    config.mines,
                    total_cells
                );
            }
            return MineLayout::from_mine_mask(Array2::from_elem(size.to_nd_index(), true));
        }

        let start_neighbors = neighborhood(self.start, size);
        let actual_start_tile = match self.start_tile {
            Random => Random,
            SimpleSafe | AlwaysZero if !in_bounds(self.start, size) => {
                log::warn!("Start cell {:?} is off the board, fallback to random", self.start);
                Random
            }
            SimpleSafe | AlwaysZero if config.mines + 1 > total_cells => {
                log::warn!("Cannot make start cell safe, fallback to random");
                Random
            }
            SimpleSafe => SimpleSafe,
            AlwaysZero if config.mines + 1 + start_neighbors.len() as CellCount > total_cells => {
                log::warn!("Cannot make start cell zero, fallback to simple safe");
                SimpleSafe
            }
            AlwaysZero => AlwaysZero,
        };

        let is_reserved = |coords: Coord2| match actual_start_tile {
            Random => false,
            SimpleSafe => coords == self.start,
            AlwaysZero => coords == self.start || start_neighbors.contains(&coords),
        };
        let candidates: Vec<Coord2> = iter_cells(size)
            .filter(|&coords| !is_reserved(coords))
            .collect();

        let mut rng = SmallRng::seed_from_u64(self.seed);
        let mut mine_mask: Array2<bool> = Array2::default(size.to_nd_index());
        for &coords in candidates.choose_multiple(&mut rng, config.mines.into()) {
            mine_mask[coords.to_nd_index()] = true;
        }

        let layout = MineLayout::from_mine_mask(mine_mask);

        // double check mine count
        if layout.mine_count() != config.mines {
            log::warn!(
                "Generated layout count mismatch, actual: {}, requested: {}",
                layout.mine_count(),
                config.mines
            );
        }
        layout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn places_requested_number_of_mines() {
        let config = GameConfig::beginner();

        let layout = RandomMineGenerator::uniform(11).generate(config);

        assert_eq!(layout.size(), (9, 9));
        assert_eq!(layout.mine_count(), 10);
    }

    #[test]
    fn same_seed_same_layout() {
        let config = GameConfig::intermediate();

        let first = RandomMineGenerator::uniform(5).generate(config);
        let second = RandomMineGenerator::uniform(5).generate(config);

        assert_eq!(first, second);
    }

    #[test]
    fn simple_safe_keeps_start_free() {
        let config = GameConfig::new_unchecked((3, 3), 8);

        let layout = RandomMineGenerator::new(1, (1, 1), StartTile::SimpleSafe).generate(config);

        assert!(!layout.contains_mine((1, 1)));
        assert_eq!(layout.mine_count(), 8);
    }

    #[test]
    fn always_zero_clears_start_neighborhood() {
        let config = GameConfig::beginner();

        for seed in 0..10 {
            let layout = RandomMineGenerator::new(seed, (4, 4), StartTile::AlwaysZero).generate(config);

            assert!(!layout.contains_mine((4, 4)));
            assert_eq!(layout.adjacent_mine_count((4, 4)), 0);
            assert_eq!(layout.mine_count(), 10);
        }
    }

    #[test]
    fn always_zero_falls_back_when_board_is_crowded() {
        let config = GameConfig::new_unchecked((3, 3), 5);

        let layout = RandomMineGenerator::new(2, (1, 1), StartTile::AlwaysZero).generate(config);

        assert!(!layout.contains_mine((1, 1)));
        assert_eq!(layout.mine_count(), 5);
    }

    #[test]
    fn overfull_board_is_all_mines() {
        let config = GameConfig::new_unchecked((2, 2), 9);

        let layout = RandomMineGenerator::uniform(0).generate(config);

        assert_eq!(layout.mine_count(), 4);
        assert_eq!(layout.safe_cell_count(), 0);
    }
}
