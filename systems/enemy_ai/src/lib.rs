#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Enemy decision system for the enemy phase.
//!
//! On every enemy phase acknowledgement the system queues the registered
//! enemies. The host then pulls one decision at a time and applies it before
//! asking for the next, so later enemies observe the moves of earlier ones.

use std::collections::VecDeque;

use crawl_core::{
    derive_seed, ActorId, ActorKind, ActorView, BoardView, CellCoord, Command, Direction, Event,
    Phase,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const DECISION_STREAM: &str = "enemy-ai";

/// Configuration parameters required to construct the enemy AI.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    seed: u64,
    aggro_distance_squared: u64,
}

impl Config {
    /// Creates a configuration from the global seed and the chase threshold.
    #[must_use]
    pub const fn new(seed: u64, aggro_distance_squared: u64) -> Self {
        Self {
            seed,
            aggro_distance_squared,
        }
    }
}

/// What a single enemy does with its turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    /// Attack the adjacent player.
    Attack,
    /// Step one cell in the provided direction.
    Step(Direction),
    /// Stand still.
    Hold,
}

impl Decision {
    /// Converts the decision into the world command it requires, if any.
    #[must_use]
    pub const fn to_command(self, enemy: ActorId) -> Option<Command> {
        match self {
            Self::Attack => Some(Command::EnemyAttack { enemy }),
            Self::Step(direction) => Some(Command::StepEnemy { enemy, direction }),
            Self::Hold => None,
        }
    }
}

/// Pure system that decides enemy actions one enemy at a time.
#[derive(Debug)]
pub struct EnemyAi {
    rng: ChaCha8Rng,
    aggro_distance_squared: u64,
    pending: VecDeque<ActorId>,
}

impl EnemyAi {
    /// Creates the system with a decision stream derived from the global seed.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(derive_seed(config.seed, DECISION_STREAM, 0)),
            aggro_distance_squared: config.aggro_distance_squared,
            pending: VecDeque::new(),
        }
    }

    /// Queues the registered enemies whenever the enemy phase is acknowledged.
    ///
    /// `registered` is a snapshot of the registry taken by the host.
    pub fn handle(&mut self, events: &[Event], registered: &[ActorId]) {
        for event in events {
            match event {
                Event::PhaseStarted {
                    phase: Phase::Enemy,
                    turn,
                } => {
                    tracing::trace!(turn, enemies = registered.len(), "queueing enemies");
                    self.pending.clear();
                    self.pending.extend(registered.iter().copied());
                }
                Event::LevelStarted { .. } | Event::GameOver { .. } => self.pending.clear(),
                _ => {}
            }
        }
    }

    /// Number of enemies still waiting for a decision this phase.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Pops the next live enemy and decides its action.
    ///
    /// Enemies missing from `actors` were destroyed after being queued and
    /// are skipped.
    pub fn next_decision(
        &mut self,
        actors: &ActorView,
        board: BoardView<'_>,
    ) -> Option<(ActorId, Decision)> {
        let player = actors
            .iter()
            .find(|actor| actor.kind == ActorKind::Player)
            .map(|actor| actor.cell)?;

        while let Some(enemy) = self.pending.pop_front() {
            let Some(cell) = actors
                .iter()
                .find(|actor| actor.id == enemy && actor.kind == ActorKind::Enemy)
                .map(|actor| actor.cell)
            else {
                tracing::trace!(?enemy, "skipping destroyed enemy");
                continue;
            };
            let decision = self.decide(cell, player, board);
            tracing::debug!(?enemy, ?decision, "enemy decided");
            return Some((enemy, decision));
        }
        None
    }

    /// Decides the action of an enemy standing on `enemy` given the player's cell.
    pub fn decide(
        &mut self,
        enemy: CellCoord,
        player: CellCoord,
        board: BoardView<'_>,
    ) -> Decision {
        let distance = enemy.squared_distance(player);
        if distance <= 1 {
            return Decision::Attack;
        }

        let can_enter = |direction: Direction| {
            enemy
                .step(direction)
                .is_some_and(|cell| cell != player && board.is_empty(cell))
        };

        if distance <= self.aggro_distance_squared {
            let (column, row) = enemy.displacement_to(player);
            let horizontal = axis_direction(column, Direction::West, Direction::East);
            let vertical = axis_direction(row, Direction::North, Direction::South);
            let (primary, secondary) = if column.abs() > row.abs() {
                (horizontal, vertical)
            } else {
                (vertical, horizontal)
            };
            return [primary, secondary]
                .into_iter()
                .flatten()
                .find(|direction| can_enter(*direction))
                .map_or(Decision::Hold, Decision::Step);
        }

        let choice = self.rng.gen_range(0..=Direction::ALL.len());
        match Direction::ALL.get(choice) {
            Some(direction) if can_enter(*direction) => Decision::Step(*direction),
            _ => Decision::Hold,
        }
    }
}

fn axis_direction(delta: i64, negative: Direction, positive: Direction) -> Option<Direction> {
    match delta.signum() {
        -1 => Some(negative),
        1 => Some(positive),
        _ => None,
    }
}
