//! Frame loop gluing the world, the turn coordinator and the enemy AI.

use std::{collections::VecDeque, time::Duration};

use anyhow::{Context, Result};
use crawl_core::{ActorKind, Command, Event, GameConfig};
use crawl_rendering::{FrameControl, Scene, Sprite};
use crawl_system_enemy_ai::{self as enemy_ai, EnemyAi};
use crawl_system_turns::TurnCoordinator;
use crawl_world::{self as world, query, World};

use crate::input::Intent;

/// Owns every simulation participant and steps them one frame at a time.
#[derive(Debug)]
pub(crate) struct Simulation {
    world: World,
    coordinator: TurnCoordinator,
    enemy_ai: EnemyAi,
    intents: VecDeque<Intent>,
    pending: Vec<Event>,
}

impl Simulation {
    /// Builds the participants and starts the first game.
    pub(crate) fn new(config: GameConfig, seed: u64, intents: Vec<Intent>) -> Result<Self> {
        let ai_config = enemy_ai::Config::new(seed, config.enemy.aggro_distance_squared);
        let mut world = World::new(config, seed).context("failed to create world")?;
        let mut pending = Vec::new();
        world::apply(&mut world, Command::NewGame, &mut pending);

        Ok(Self {
            world,
            coordinator: TurnCoordinator::new(),
            enemy_ai: EnemyAi::new(ai_config),
            intents: intents.into(),
            pending,
        })
    }

    /// Advances the simulation by one frame and mirrors the result into `scene`.
    pub(crate) fn step(&mut self, dt: Duration, scene: &mut Scene) -> FrameControl {
        let mut events = std::mem::take(&mut self.pending);
        if self.ready_for_input() {
            if let Some(intent) = self.intents.pop_front() {
                tracing::debug!(?intent, "consuming intent");
                match intent {
                    Intent::Move(direction) => world::apply(
                        &mut self.world,
                        Command::MovePlayer { direction },
                        &mut events,
                    ),
                    Intent::NewGame => {
                        world::apply(&mut self.world, Command::NewGame, &mut events);
                    }
                    Intent::Idle => {}
                }
            }
        }
        world::apply(&mut self.world, Command::Tick { dt }, &mut events);
        self.dispatch(events, scene);
        self.sync_scene(scene);

        if self.intents.is_empty() && self.ready_for_input() {
            FrameControl::Exit
        } else {
            FrameControl::Continue
        }
    }

    /// Read-only access to the world for inspection.
    #[cfg(test)]
    pub(crate) fn world(&self) -> &World {
        &self.world
    }

    fn ready_for_input(&self) -> bool {
        let waiting = self.coordinator.is_awaiting_player() || self.coordinator.is_halted();
        waiting && !query::activity(&self.world).player_busy()
    }

    /// Feeds event batches to the systems until no system has anything left to say.
    fn dispatch(&mut self, mut events: Vec<Event>, scene: &mut Scene) {
        while !events.is_empty() {
            scene.canvas.apply(&events);
            for event in &events {
                tracing::trace!(?event, "world event");
            }

            let mut generated = Vec::new();

            self.enemy_ai
                .handle(&events, &query::enemy_ids(&self.world));
            loop {
                let actors = query::actor_view(&self.world);
                let Some((enemy, decision)) = self
                    .enemy_ai
                    .next_decision(&actors, query::board_view(&self.world))
                else {
                    break;
                };
                if let Some(command) = decision.to_command(enemy) {
                    world::apply(&mut self.world, command, &mut generated);
                }
            }

            let mut commands = Vec::new();
            self.coordinator
                .handle(&events, &query::activity(&self.world), &mut commands);
            for command in commands {
                world::apply(&mut self.world, command, &mut generated);
            }

            events = generated;
        }
    }

    fn sync_scene(&self, scene: &mut Scene) {
        let projection = scene.projection;
        scene.sprites = query::actor_view(&self.world)
            .iter()
            .filter(|actor| {
                matches!(
                    actor.kind,
                    ActorKind::Food | ActorKind::Enemy | ActorKind::Player
                )
            })
            .map(|actor| Sprite {
                actor: actor.id,
                kind: actor.kind,
                cell: actor.cell,
                position: projection.coord_to_world(actor.cell),
                busy: actor.busy,
            })
            .collect();
        // Draw the player last so it stays visible while stepping onto food.
        scene.sprites.sort_by_key(|sprite| sprite.kind == ActorKind::Player);

        scene.hud.level = query::level(&self.world);
        scene.hud.food = query::food(&self.world);
        scene.hud.turn = query::turn(&self.world);
        scene.hud.phase = query::phase(&self.world);
        scene.hud.game_over = query::is_game_over(&self.world);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::parse_script;
    use crawl_core::{ActionTimings, Phase};
    use crawl_rendering::GridProjection;

    const FRAME: Duration = Duration::from_millis(50);

    fn scene_for(config: &GameConfig) -> Scene {
        Scene::new(
            GridProjection::new(config.board.columns, config.board.rows, 32.0)
                .expect("valid projection"),
        )
    }

    fn run(config: GameConfig, seed: u64, script: &str, frames: usize) -> (Simulation, Scene) {
        let intents = parse_script(script).expect("valid script");
        let mut scene = scene_for(&config);
        let mut simulation = Simulation::new(config, seed, intents).expect("valid config");
        for _ in 0..frames {
            if simulation.step(FRAME, &mut scene) == FrameControl::Exit {
                break;
            }
        }
        (simulation, scene)
    }

    #[test]
    fn first_frame_paints_the_board_and_enters_the_player_phase() {
        let config = GameConfig::default();
        let (simulation, scene) = run(config, 3, "", 1);

        assert_eq!(query::phase(simulation.world()), Some(Phase::Player));
        assert_eq!(scene.hud.turn, 1);
        assert_eq!(scene.hud.level, 1);
        assert!(scene
            .sprites
            .last()
            .is_some_and(|sprite| sprite.kind == ActorKind::Player));
        assert_eq!(
            scene.canvas.tile(crawl_core::CellCoord::new(0, 0)),
            Some(crawl_core::TileKind::Border)
        );
    }

    #[test]
    fn every_scripted_intent_consumes_one_player_turn() {
        let mut config = GameConfig::default();
        config.timing.player = ActionTimings::INSTANT;
        config.timing.enemy = ActionTimings::INSTANT;
        config.enemy.count = crawl_core::CountRange::new(0, 0);
        let (simulation, scene) = run(config, 8, "d . d . .", 200);

        // Idle intents leave the turn untouched; moves and bumps each cost two.
        assert_eq!(query::turn(simulation.world()), 5);
        assert_eq!(scene.hud.turn, 5);
        assert!(!scene.hud.game_over);
    }

    #[test]
    fn replay_is_deterministic_for_a_seed() {
        let script = "ddssddsswd";
        let (_, first) = run(GameConfig::default(), 21, script, 400);
        let (_, second) = run(GameConfig::default(), 21, script, 400);
        let (_, other) = run(GameConfig::default(), 22, script, 400);

        assert_eq!(first, second);
        assert_ne!(first.canvas, other.canvas);
    }

    #[test]
    fn new_game_intent_restarts_after_starvation() {
        let mut config = GameConfig::default();
        config.player.starting_food = 2;
        config.enemy.count = crawl_core::CountRange::new(0, 0);
        config.food.count = crawl_core::CountRange::new(0, 0);
        let (simulation, scene) = run(config, 5, "d d d n", 400);

        assert!(!query::is_game_over(simulation.world()));
        assert_eq!(scene.hud.food, 2);
        assert_eq!(scene.hud.turn, 1);
    }
}
