#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Turn coordinator that alternates the player and enemy phases.
//!
//! The coordinator never touches the world. It watches the event stream for
//! level starts, phase acknowledgements and player actions, polls the
//! [`ActivityView`] for busy actors, and emits [`Command::StartPhase`] once
//! every actor involved in the current phase has gone idle.

use crawl_core::{ActivityView, Command, Event, Phase};

/// Pure system that sequences the turn cycle.
#[derive(Debug)]
pub struct TurnCoordinator {
    stage: Stage,
    phase: Option<Phase>,
    turn: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Stage {
    /// No level has started yet.
    Dormant,
    /// `StartPhase` was issued and the world has not acknowledged it.
    Entering(Phase),
    AwaitingPlayerAction,
    ResolvingPlayer,
    ResolvingEnemies,
    /// Food ran out; only a new level restarts the cycle.
    Halted,
}

impl TurnCoordinator {
    /// Creates a coordinator that waits for the first level to start.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            stage: Stage::Dormant,
            phase: None,
            turn: 0,
        }
    }

    /// Consumes world events and the activity view to emit phase commands.
    pub fn handle(&mut self, events: &[Event], activity: &ActivityView, out: &mut Vec<Command>) {
        let mut acknowledged_enemy_phase = false;
        for event in events {
            match event {
                Event::LevelStarted { level, .. } => {
                    tracing::debug!(level, "turn cycle restarted");
                    self.turn = 0;
                    self.enter(Phase::Player, out);
                }
                Event::GameOver { .. } => {
                    tracing::debug!(turn = self.turn, "turn cycle halted");
                    self.stage = Stage::Halted;
                }
                Event::PhaseStarted { phase, turn } => {
                    if self.stage != Stage::Entering(*phase) || *turn != self.turn {
                        continue;
                    }
                    self.stage = match phase {
                        Phase::Player => Stage::AwaitingPlayerAction,
                        Phase::Enemy => {
                            acknowledged_enemy_phase = true;
                            Stage::ResolvingEnemies
                        }
                    };
                }
                Event::PlayerActed { .. } if self.stage == Stage::AwaitingPlayerAction => {
                    self.stage = Stage::ResolvingPlayer;
                }
                _ => {}
            }
        }

        // Enemies act in response to the acknowledgement, so their busy flags
        // are only meaningful from the next batch onward.
        if !acknowledged_enemy_phase {
            self.poll(activity, out);
        }
    }

    /// Phase most recently entered, `None` before the first level.
    #[must_use]
    pub const fn phase(&self) -> Option<Phase> {
        self.phase
    }

    /// Turn counter value of the most recent phase entry.
    #[must_use]
    pub const fn turn(&self) -> u64 {
        self.turn
    }

    /// Whether the player phase is acknowledged and the player has not acted yet.
    #[must_use]
    pub fn is_awaiting_player(&self) -> bool {
        self.stage == Stage::AwaitingPlayerAction
    }

    /// Whether the cycle stopped because the game ended.
    #[must_use]
    pub fn is_halted(&self) -> bool {
        self.stage == Stage::Halted
    }

    fn poll(&mut self, activity: &ActivityView, out: &mut Vec<Command>) {
        let busy_enemy = activity.first_busy_enemy();
        match self.stage {
            Stage::ResolvingPlayer => {
                if activity.player_busy() || busy_enemy.is_some() {
                    tracing::trace!(?busy_enemy, "player phase still resolving");
                    return;
                }
                self.enter(Phase::Enemy, out);
            }
            Stage::ResolvingEnemies => {
                if let Some(enemy) = busy_enemy {
                    tracing::trace!(?enemy, "waiting on enemy");
                    return;
                }
                if activity.player_busy() {
                    tracing::trace!("waiting on player after enemy phase");
                    return;
                }
                self.enter(Phase::Player, out);
            }
            Stage::Dormant
            | Stage::Entering(_)
            | Stage::AwaitingPlayerAction
            | Stage::Halted => {}
        }
    }

    fn enter(&mut self, phase: Phase, out: &mut Vec<Command>) {
        self.turn = self.turn.saturating_add(1);
        self.phase = Some(phase);
        self.stage = Stage::Entering(phase);
        tracing::debug!(?phase, turn = self.turn, "entering phase");
        out.push(Command::StartPhase {
            phase,
            turn: self.turn,
        });
    }
}

impl Default for TurnCoordinator {
    fn default() -> Self {
        Self::new()
    }
}
