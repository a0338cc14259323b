//! Hand-built level setups for tests that need exact placements.

use crawl_core::{ActorId, CellCoord, Event, PLAYER_START};

use crate::actor::{self, ObjectKind};
use crate::World;

/// Cell object variants that can be placed by hand.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScaffoldActor {
    /// Food pickup restoring `amount`.
    Food {
        /// Food restored on consumption.
        amount: i32,
    },
    /// Destructible wall seeded from the configured tier count.
    Wall,
    /// Enemy seeded with the configured hit points.
    Enemy,
    /// Level exit.
    Exit,
}

/// Starts level one on a laid-out board with no population besides the player.
pub fn blank_level(world: &mut World, out_events: &mut Vec<Event>) {
    world.food = world.config.player.starting_food;
    world.level = 1;
    world.game_over = false;
    world.clear_level(out_events);
    world.board.lay_out(&[PLAYER_START], out_events);
    world.enter_level(out_events);
}

/// Places an object onto an empty cell, returning its identifier.
pub fn spawn(
    world: &mut World,
    cell: CellCoord,
    actor: ScaffoldActor,
    out_events: &mut Vec<Event>,
) -> Option<ActorId> {
    let kind = match actor {
        ScaffoldActor::Food { amount } => ObjectKind::Food { amount },
        ScaffoldActor::Wall => ObjectKind::Wall(actor::Wall {
            hit_points: world.config.walls.tiers.saturating_sub(1),
        }),
        ScaffoldActor::Enemy => world.fresh_enemy(),
        ScaffoldActor::Exit => ObjectKind::Exit,
    };
    world.spawn_object(cell, kind, out_events)
}

/// Teleports the idle player onto a passable cell.
pub fn place_player(world: &mut World, cell: CellCoord) -> bool {
    if !world.board.is_passable(cell) || world.board.occupant_at(cell).is_some() {
        return false;
    }
    world.player.cell = cell;
    true
}

/// Overrides the food counter.
pub fn set_food(world: &mut World, food: i32) {
    world.food = food;
}
