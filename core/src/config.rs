//! Tunable parameters consumed by the world at generation time.
//!
//! Every section deserialises with defaults so adapters can load partial
//! TOML documents and override only what they need.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Complete configuration for a game session.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    /// Board dimensions and exit placement.
    pub board: BoardConfig,
    /// Player stats and the food clock.
    pub player: PlayerConfig,
    /// Enemy population and stats.
    pub enemy: EnemyConfig,
    /// Food pickup population and values.
    pub food: FoodConfig,
    /// Destructible wall population and durability.
    pub walls: WallConfig,
    /// Durations of timed actions.
    pub timing: TimingConfig,
}

impl GameConfig {
    /// Checks that a level can be generated from the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let BoardConfig { columns, rows, .. } = self.board;
        if columns < 3 || rows < 3 {
            return Err(ConfigError::BoardTooSmall { columns, rows });
        }

        for (name, range) in [
            ("food", self.food.count),
            ("walls", self.walls.count),
            ("enemy", self.enemy.count),
        ] {
            if range.min > range.max {
                return Err(ConfigError::InvertedRange {
                    section: name,
                    min: range.min,
                    max: range.max,
                });
            }
        }

        if self.walls.tiers == 0 {
            return Err(ConfigError::NoWallTiers);
        }

        if self.food.amounts.is_empty() {
            return Err(ConfigError::NoFoodAmounts);
        }

        let interior = u64::from(columns - 2) * u64::from(rows - 2);
        let available = interior.saturating_sub(1);
        let required = 1
            + u64::from(self.food.count.max)
            + u64::from(self.walls.count.max)
            + u64::from(self.enemy.count.max);
        if required > available {
            return Err(ConfigError::Crowded {
                required,
                available,
            });
        }

        Ok(())
    }
}

/// Reasons a configuration cannot drive level generation.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The board leaves no interior once the border ring is laid out.
    #[error("board of {columns}x{rows} cells is smaller than the 3x3 minimum")]
    BoardTooSmall {
        /// Configured column count.
        columns: u32,
        /// Configured row count.
        rows: u32,
    },
    /// A count range has its bounds swapped.
    #[error("{section} count range is inverted ({min} > {max})")]
    InvertedRange {
        /// Configuration section carrying the range.
        section: &'static str,
        /// Configured lower bound.
        min: u32,
        /// Configured upper bound.
        max: u32,
    },
    /// Walls need at least one damage tier.
    #[error("walls need at least one damage tier")]
    NoWallTiers,
    /// Food pickups need at least one amount to draw from.
    #[error("food section lists no pickup amounts")]
    NoFoodAmounts,
    /// The maximum first-level population does not fit inside the board.
    #[error("level needs {required} free cells but the board only offers {available}")]
    Crowded {
        /// Cells needed by the exit and the maximum population.
        required: u64,
        /// Interior cells left after reserving the player start.
        available: u64,
    },
}

/// Board dimensions and exit placement policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BoardConfig {
    /// Number of cell columns, border included.
    pub columns: u32,
    /// Number of cell rows, border included.
    pub rows: u32,
    /// Where the exit is placed on each level.
    pub exit: ExitPlacement,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            columns: 10,
            rows: 10,
            exit: ExitPlacement::Corner,
        }
    }
}

/// Exit placement policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExitPlacement {
    /// Interior corner opposite the player start.
    Corner,
    /// Uniformly sampled from the empty-cell set.
    Random,
}

/// Player stats and the food clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlayerConfig {
    /// Food counter assigned when a new game starts.
    pub starting_food: i32,
    /// Food lost at the start of every player phase after the first.
    pub food_per_turn: i32,
    /// Damage dealt to enemies per strike.
    pub attack_points: i32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            starting_food: 100,
            food_per_turn: 1,
            attack_points: 1,
        }
    }
}

/// Enemy population and stats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnemyConfig {
    /// Number of enemies per level.
    pub count: CountRange,
    /// Hit points of a fresh enemy.
    pub hit_points: i32,
    /// Food removed from the player per landed attack.
    pub attack_points: i32,
    /// Squared distance within which enemies chase the player.
    pub aggro_distance_squared: u64,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            count: CountRange::new(1, 2).with_per_level(1),
            hit_points: 3,
            attack_points: 5,
            aggro_distance_squared: 25,
        }
    }
}

/// Food pickup population and values.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FoodConfig {
    /// Number of pickups per level.
    pub count: CountRange,
    /// Amounts a pickup may restore; each pickup draws one uniformly.
    pub amounts: Vec<i32>,
}

impl Default for FoodConfig {
    fn default() -> Self {
        Self {
            count: CountRange::new(2, 5),
            amounts: vec![10, 20],
        }
    }
}

/// Destructible wall population and durability.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WallConfig {
    /// Number of walls per level.
    pub count: CountRange,
    /// Number of damage tiers; a wall falls after exactly this many bumps.
    pub tiers: u32,
}

impl Default for WallConfig {
    fn default() -> Self {
        Self {
            count: CountRange::new(6, 10),
            tiers: 3,
        }
    }
}

/// Inclusive population range, optionally growing with the level number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CountRange {
    /// Smallest count on the first level.
    pub min: u32,
    /// Largest count on the first level.
    pub max: u32,
    /// Amount added to both bounds for every level past the first.
    pub per_level: u32,
}

impl CountRange {
    /// Creates a range that does not grow with the level.
    #[must_use]
    pub const fn new(min: u32, max: u32) -> Self {
        Self {
            min,
            max,
            per_level: 0,
        }
    }

    /// Returns the range with the provided per-level growth.
    #[must_use]
    pub const fn with_per_level(self, per_level: u32) -> Self {
        Self { per_level, ..self }
    }

    /// Inclusive bounds that apply to the one-based `level`.
    #[must_use]
    pub fn bounds_at(&self, level: u32) -> (u32, u32) {
        let shift = self.per_level.saturating_mul(level.saturating_sub(1));
        (
            self.min.saturating_add(shift),
            self.max.saturating_add(shift),
        )
    }
}

impl Default for CountRange {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

/// Durations of timed actions for both animated actor kinds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimingConfig {
    /// Player action durations.
    pub player: ActionTimings,
    /// Enemy action durations.
    pub enemy: ActionTimings,
}

/// Durations, in milliseconds, of the three timed action slots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ActionTimings {
    /// Movement tween length.
    pub move_ms: u64,
    /// Attack animation length.
    pub attack_ms: u64,
    /// Hurt animation length.
    pub hurt_ms: u64,
}

impl ActionTimings {
    /// Timings where every action completes on the next tick.
    pub const INSTANT: ActionTimings = ActionTimings {
        move_ms: 0,
        attack_ms: 0,
        hurt_ms: 0,
    };

    /// Movement tween length.
    #[must_use]
    pub const fn movement(&self) -> Duration {
        Duration::from_millis(self.move_ms)
    }

    /// Attack animation length.
    #[must_use]
    pub const fn attack(&self) -> Duration {
        Duration::from_millis(self.attack_ms)
    }

    /// Hurt animation length.
    #[must_use]
    pub const fn hurt(&self) -> Duration {
        Duration::from_millis(self.hurt_ms)
    }
}

impl Default for ActionTimings {
    fn default() -> Self {
        Self {
            move_ms: 200,
            attack_ms: 300,
            hurt_ms: 250,
        }
    }
}
