#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the crawl engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! views such as [`ActivityView`] and [`BoardView`], and respond exclusively
//! with new command batches.

pub mod config;

use std::time::Duration;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub use config::{
    ActionTimings, BoardConfig, ConfigError, CountRange, EnemyConfig, ExitPlacement, FoodConfig,
    GameConfig, PlayerConfig, TimingConfig, WallConfig,
};

/// Cell the player occupies whenever a level starts.
pub const PLAYER_START: CellCoord = CellCoord::new(1, 1);

/// Half of the turn cycle during which only one class of actor may act.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// The player issues exactly one action.
    Player,
    /// Every registered enemy acts once.
    Enemy,
}

/// Cardinal movement directions available to actors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// Every cardinal direction in clockwise order starting at north.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Column and row offsets produced by a single step in this direction.
    #[must_use]
    pub const fn offset(self) -> (i64, i64) {
        match self {
            Self::North => (0, -1),
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
        }
    }
}

/// Location of a single board cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new board cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Returns the neighbouring cell in the provided direction.
    ///
    /// Steps that would leave the unsigned coordinate space yield `None`;
    /// callers treat that exactly like any other out-of-bounds cell.
    #[must_use]
    pub fn step(self, direction: Direction) -> Option<CellCoord> {
        let (column, row) = match direction {
            Direction::North => (Some(self.column), self.row.checked_sub(1)),
            Direction::East => (self.column.checked_add(1), Some(self.row)),
            Direction::South => (Some(self.column), self.row.checked_add(1)),
            Direction::West => (self.column.checked_sub(1), Some(self.row)),
        };
        Some(CellCoord::new(column?, row?))
    }

    /// Signed column and row displacement from this cell to `other`.
    #[must_use]
    pub fn displacement_to(self, other: CellCoord) -> (i64, i64) {
        (
            i64::from(other.column) - i64::from(self.column),
            i64::from(other.row) - i64::from(self.row),
        )
    }

    /// Squared euclidean distance between two cells.
    #[must_use]
    pub fn squared_distance(self, other: CellCoord) -> u64 {
        let (column, row) = self.displacement_to(other);
        column
            .unsigned_abs()
            .pow(2)
            .saturating_add(row.unsigned_abs().pow(2))
    }
}

/// Stable identifier assigned to every actor the world creates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(u32);

impl ActorId {
    /// Identifier reserved for the player.
    pub const PLAYER: ActorId = ActorId(0);

    /// Creates a new actor identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Closed set of actor variants that can exist in a level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActorKind {
    /// The controllable explorer.
    Player,
    /// Hostile actor that acts during the enemy phase.
    Enemy,
    /// Pickup that restores food when entered.
    Food,
    /// Destructible obstacle.
    Wall,
    /// Cell that advances the level when entered.
    Exit,
}

/// Tile painted onto a cell for presentation purposes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    /// Walkable floor.
    Ground,
    /// Impassable outer ring.
    Border,
    /// Level exit marker.
    Exit,
    /// Destructible wall drawn at the provided damage tier.
    Wall {
        /// Remaining hit points, used as the damage tier index.
        tier: u32,
    },
}

/// Timed action slots owned by animated actors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    /// Movement tween between two cells.
    Move,
    /// Attack animation; enemy attacks land when it completes.
    Attack,
    /// Hurt animation; damage is applied when it completes.
    Hurt,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Resets counters, generates the first level and spawns the player.
    NewGame,
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that the player act in the provided direction.
    MovePlayer {
        /// Direction of the attempted move.
        direction: Direction,
    },
    /// Announces entry into a new phase of the turn cycle.
    StartPhase {
        /// Phase being entered.
        phase: Phase,
        /// Turn counter value assigned to the entry.
        turn: u64,
    },
    /// Requests that an enemy step a single cell.
    StepEnemy {
        /// Enemy attempting the move.
        enemy: ActorId,
        /// Direction of travel for the attempted step.
        direction: Direction,
    },
    /// Requests that an enemy attack the adjacent player.
    EnemyAttack {
        /// Enemy performing the attack.
        enemy: ActorId,
    },
}

/// Outcome of an accepted player action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlayerAction {
    /// The player started moving into the target cell.
    Moved {
        /// Cell the player occupied before the move.
        from: CellCoord,
        /// Cell the player moves into.
        to: CellCoord,
    },
    /// The player struck a wall that is still standing.
    StruckWall {
        /// Wall that absorbed the strike.
        wall: ActorId,
        /// Hit points the wall has left.
        remaining: u32,
    },
    /// The player attacked an enemy blocking the target cell.
    StruckEnemy {
        /// Enemy that was attacked.
        enemy: ActorId,
    },
}

/// Reasons a player move may be rejected without consuming the turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlayerRejection {
    /// The game ended and awaits a new game.
    GameOver,
    /// The turn cycle is not in the player phase.
    NotPlayerPhase,
    /// The player already acted during the current phase.
    AlreadyActed,
    /// The player is still animating a previous action.
    Busy,
    /// The target cell is out of bounds or impassable.
    Impassable,
}

/// Reasons an enemy command may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EnemyRejection {
    /// The game ended and awaits a new game.
    GameOver,
    /// The turn cycle is not in the enemy phase.
    NotEnemyPhase,
    /// No live enemy carries the identifier.
    UnknownEnemy,
    /// The destination cell is not empty.
    Blocked,
    /// The player is not adjacent to the attacker.
    OutOfRange,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// A fresh level was generated and the player respawned.
    LevelStarted {
        /// One-based level number.
        level: u32,
        /// Food counter carried into the level.
        food: i32,
    },
    /// Every occupant was destroyed and every cell reset.
    BoardCleared,
    /// A tile was painted onto, or erased from, a cell.
    CellPainted {
        /// Cell being painted.
        cell: CellCoord,
        /// Tile now shown, `None` when the cell was erased.
        tile: Option<TileKind>,
    },
    /// An actor was created and placed on the board.
    ActorSpawned {
        /// Identifier allocated to the actor.
        actor: ActorId,
        /// Variant of the actor.
        kind: ActorKind,
        /// Cell the actor occupies.
        cell: CellCoord,
    },
    /// An actor was removed from the board.
    ActorDestroyed {
        /// Identifier of the removed actor.
        actor: ActorId,
        /// Variant of the actor.
        kind: ActorKind,
        /// Cell the actor occupied.
        cell: CellCoord,
    },
    /// Acknowledges a phase entry; listeners start their phase work here.
    PhaseStarted {
        /// Phase that began.
        phase: Phase,
        /// Turn counter value of the entry.
        turn: u64,
    },
    /// The player's action for the phase was issued.
    PlayerActed {
        /// Direction the player acted in.
        direction: Direction,
        /// How the action resolved.
        action: PlayerAction,
    },
    /// A player move request was refused.
    PlayerMoveRejected {
        /// Direction of the refused move.
        direction: Direction,
        /// Specific reason the move failed.
        reason: PlayerRejection,
    },
    /// An enemy moved between two cells.
    EnemyMoved {
        /// Enemy that moved.
        enemy: ActorId,
        /// Cell the enemy left.
        from: CellCoord,
        /// Cell the enemy entered.
        to: CellCoord,
    },
    /// An enemy command was refused.
    EnemyCommandRejected {
        /// Enemy targeted by the command.
        enemy: ActorId,
        /// Specific reason the command failed.
        reason: EnemyRejection,
    },
    /// A timed action began.
    ActionStarted {
        /// Actor performing the action.
        actor: ActorId,
        /// Slot the action occupies.
        action: ActionKind,
        /// Simulated time until completion.
        duration: Duration,
    },
    /// An in-flight action was cancelled by a newer action in the same slot.
    ActionSuperseded {
        /// Actor whose action was restarted.
        actor: ActorId,
        /// Slot that was restarted.
        action: ActionKind,
    },
    /// A timed action finished.
    ActionCompleted {
        /// Actor that performed the action.
        actor: ActorId,
        /// Slot that completed.
        action: ActionKind,
    },
    /// A wall absorbed a strike.
    WallDamaged {
        /// Wall that was struck.
        wall: ActorId,
        /// Hit points the wall has left.
        hit_points: u32,
    },
    /// Damage landed on an enemy once its hurt action completed.
    EnemyHurt {
        /// Enemy that took damage.
        enemy: ActorId,
        /// Damage applied.
        damage: i32,
        /// Hit points remaining after the damage.
        hit_points: i32,
    },
    /// An enemy attack landed on the player.
    PlayerHurt {
        /// Enemy whose attack landed.
        attacker: ActorId,
        /// Damage converted into food loss.
        damage: i32,
    },
    /// The player consumed a food pickup.
    FoodConsumed {
        /// Identifier of the consumed pickup.
        food: ActorId,
        /// Cell the pickup occupied.
        cell: CellCoord,
        /// Food restored by the pickup.
        amount: i32,
    },
    /// The food counter changed.
    FoodChanged {
        /// Signed change applied to the counter.
        delta: i32,
        /// Counter value after the change.
        food: i32,
    },
    /// The player reached the exit of the current level.
    ExitReached {
        /// Level that was completed.
        level: u32,
    },
    /// Food ran out; only a new game can resume play.
    GameOver {
        /// Level reached before the game ended.
        level: u32,
        /// Last turn counter value observed by the world.
        turn: u64,
    },
}

/// State of a single board cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CellState {
    /// Whether actors may ever stand on the cell.
    pub passable: bool,
    /// Actor currently placed on the cell, resolved through the world.
    pub occupant: Option<ActorId>,
    /// Tile painted onto the cell.
    pub tile: Option<TileKind>,
}

/// Read-only view into the dense board grid.
#[derive(Clone, Copy, Debug)]
pub struct BoardView<'a> {
    cells: &'a [CellState],
    columns: u32,
    rows: u32,
}

impl<'a> BoardView<'a> {
    /// Captures a new board view backed by the provided row-major cell slice.
    #[must_use]
    pub fn new(cells: &'a [CellState], columns: u32, rows: u32) -> Self {
        Self {
            cells,
            columns,
            rows,
        }
    }

    /// Returns the state of the cell, or `None` when it lies out of bounds.
    #[must_use]
    pub fn cell(&self, cell: CellCoord) -> Option<&'a CellState> {
        self.index(cell).and_then(|index| self.cells.get(index))
    }

    /// Reports whether the cell exists and may be stood on.
    #[must_use]
    pub fn is_passable(&self, cell: CellCoord) -> bool {
        self.cell(cell).is_some_and(|state| state.passable)
    }

    /// Reports whether the cell is passable and unoccupied.
    #[must_use]
    pub fn is_empty(&self, cell: CellCoord) -> bool {
        self.cell(cell)
            .is_some_and(|state| state.passable && state.occupant.is_none())
    }

    /// Returns the actor occupying the provided cell, if any.
    #[must_use]
    pub fn occupant(&self, cell: CellCoord) -> Option<ActorId> {
        self.cell(cell).and_then(|state| state.occupant)
    }

    /// Iterates over every cell together with its coordinate in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, &'a CellState)> + 'a {
        let columns = self.columns.max(1);
        self.cells.iter().enumerate().map(move |(index, state)| {
            let index = index as u32;
            (CellCoord::new(index % columns, index / columns), state)
        })
    }

    /// Provides the dimensions of the underlying grid.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.columns && cell.row() < self.rows {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

/// Immutable representation of a single actor used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActorSnapshot {
    /// Unique identifier assigned to the actor.
    pub id: ActorId,
    /// Variant of the actor.
    pub kind: ActorKind,
    /// Cell currently occupied by the actor.
    pub cell: CellCoord,
    /// Whether any timed action is in flight.
    pub busy: bool,
}

/// Read-only snapshot describing every live actor.
#[derive(Clone, Debug, Default)]
pub struct ActorView {
    snapshots: Vec<ActorSnapshot>,
}

impl ActorView {
    /// Creates a new actor view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ActorSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &ActorSnapshot> {
        self.snapshots.iter()
    }

    /// Number of captured actors of the provided kind.
    #[must_use]
    pub fn count(&self, kind: ActorKind) -> usize {
        self.snapshots
            .iter()
            .filter(|snapshot| snapshot.kind == kind)
            .count()
    }
}

/// Busy flag of a single registered enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EnemyActivity {
    /// Registered enemy.
    pub id: ActorId,
    /// Whether the enemy has an action in flight.
    pub busy: bool,
}

/// Busy flags of the player and every enemy registered at capture time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ActivityView {
    player_busy: bool,
    enemies: Vec<EnemyActivity>,
}

impl ActivityView {
    /// Creates a new activity view.
    #[must_use]
    pub fn new(player_busy: bool, enemies: Vec<EnemyActivity>) -> Self {
        Self {
            player_busy,
            enemies,
        }
    }

    /// Whether the player has an action in flight.
    #[must_use]
    pub const fn player_busy(&self) -> bool {
        self.player_busy
    }

    /// First registered enemy that is still busy.
    #[must_use]
    pub fn first_busy_enemy(&self) -> Option<ActorId> {
        self.enemies
            .iter()
            .find(|enemy| enemy.busy)
            .map(|enemy| enemy.id)
    }
}

/// Derives an independent seed for a labelled random stream.
///
/// Streams derived from the same global seed but different labels or indices
/// never share state, so adding a consumer does not perturb the others.
#[must_use]
pub fn derive_seed(global_seed: u64, label: &str, index: u64) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(global_seed.to_le_bytes());
    hasher.update(label.as_bytes());
    hasher.update(index.to_le_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0_u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}
