//! Level layout: border, interior, exit and the random population.

use crawl_core::{CellCoord, CountRange, Event, ExitPlacement, GameConfig, PLAYER_START};
use rand::Rng;

use crate::board::Board;

/// Cells chosen for every object of a freshly generated level.
///
/// The cells have left the empty-cell set but nothing occupies them yet.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LevelLayout {
    /// Exit cell, absent only when the board has no free interior cell left.
    pub exit: Option<CellCoord>,
    /// Food pickup cells.
    pub food: Vec<CellCoord>,
    /// Destructible wall cells.
    pub walls: Vec<CellCoord>,
    /// Enemy cells.
    pub enemies: Vec<CellCoord>,
}

impl Board {
    /// Lays out the board and picks cells for the exit, food, walls and enemies.
    ///
    /// Population counts are drawn uniformly from the configured inclusive
    /// ranges for `level`; draws stop early when the empty-cell set runs dry.
    pub fn generate<R: Rng + ?Sized>(
        &mut self,
        config: &GameConfig,
        level: u32,
        rng: &mut R,
        out_events: &mut Vec<Event>,
    ) -> LevelLayout {
        self.lay_out(&[PLAYER_START], out_events);

        let exit = match config.board.exit {
            ExitPlacement::Corner => {
                let corner = CellCoord::new(
                    self.columns().saturating_sub(2),
                    self.rows().saturating_sub(2),
                );
                if self.reserve(corner) {
                    Some(corner)
                } else {
                    self.take_random_empty(rng)
                }
            }
            ExitPlacement::Random => self.take_random_empty(rng),
        };

        let food = self.scatter("food", config.food.count, level, rng);
        let walls = self.scatter("walls", config.walls.count, level, rng);
        let enemies = self.scatter("enemy", config.enemy.count, level, rng);

        tracing::debug!(
            level,
            ?exit,
            food = food.len(),
            walls = walls.len(),
            enemies = enemies.len(),
            "generated level layout"
        );

        LevelLayout {
            exit,
            food,
            walls,
            enemies,
        }
    }

    fn scatter<R: Rng + ?Sized>(
        &mut self,
        section: &'static str,
        range: CountRange,
        level: u32,
        rng: &mut R,
    ) -> Vec<CellCoord> {
        let (min, max) = range.bounds_at(level);
        let count = rng.gen_range(min..=max);
        let cells: Vec<CellCoord> = (0..count)
            .map_while(|_| self.take_random_empty(&mut *rng))
            .collect();
        if cells.len() < usize::try_from(count).unwrap_or(usize::MAX) {
            tracing::warn!(
                section,
                level,
                drawn = count,
                placed = cells.len(),
                "board ran out of empty cells"
            );
        }
        cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn corner_exit_sits_opposite_the_player() {
        let config = GameConfig::default();
        let mut board = Board::new(config.board.columns, config.board.rows);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let layout = board.generate(&config, 1, &mut rng, &mut Vec::new());
        assert_eq!(layout.exit, Some(CellCoord::new(8, 8)));
    }

    #[test]
    fn smallest_board_leaves_no_room_for_population() {
        let mut config = GameConfig::default();
        config.board.columns = 3;
        config.board.rows = 3;
        let mut board = Board::new(3, 3);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let layout = board.generate(&config, 1, &mut rng, &mut Vec::new());
        assert_eq!(layout, LevelLayout::default());
    }

    #[test]
    fn late_levels_fill_the_board_instead_of_overflowing_it() {
        let config = GameConfig::default();
        let mut board = Board::new(config.board.columns, config.board.rows);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let layout = board.generate(&config, 200, &mut rng, &mut Vec::new());

        let placed = usize::from(layout.exit.is_some())
            + layout.food.len()
            + layout.walls.len()
            + layout.enemies.len();
        assert_eq!(placed, 8 * 8 - 1);
        assert!(board.empty_cells().is_empty());
        let (min_enemies, _) = config.enemy.count.bounds_at(200);
        assert!(layout.enemies.len() < min_enemies as usize);
    }

    #[test]
    fn chosen_cells_are_distinct_and_exclude_player_start() {
        let config = GameConfig::default();
        let mut board = Board::new(config.board.columns, config.board.rows);
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let layout = board.generate(&config, 4, &mut rng, &mut Vec::new());

        let mut cells: Vec<_> = layout
            .exit
            .into_iter()
            .chain(layout.food)
            .chain(layout.walls)
            .chain(layout.enemies)
            .collect();
        let total = cells.len();
        cells.sort();
        cells.dedup();
        assert_eq!(cells.len(), total);
        assert!(!cells.contains(&PLAYER_START));
        assert!(cells.iter().all(|cell| !board.empty_cells().contains(cell)));
    }
}
