#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state for the crawl engine.
//!
//! The world owns the board, the player, every cell object and the enemy
//! registry. It mutates exclusively through [`apply`] and reports every
//! observable change as an [`Event`]; read access goes through [`query`].

mod action;
mod actor;
mod board;
mod generation;
mod registry;

#[cfg(any(test, feature = "scaffolding"))]
pub mod scaffold;

#[cfg(test)]
mod interactions;

use std::collections::BTreeMap;

use crawl_core::{
    derive_seed, ActionKind, ActorId, ActorKind, CellCoord, Command, ConfigError, Direction,
    EnemyRejection, Event, GameConfig, Phase, PlayerAction, PlayerRejection, TileKind,
    PLAYER_START,
};
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;

use actor::{CellObject, Completion, Enemy, EnteredOutcome, EntryOutcome, ObjectKind, Player};

pub use action::ActionSlot;
pub use board::{Board, MoveError, PlacementError};
pub use generation::LevelLayout;
pub use registry::ActorRegistry;

const LEVEL_STREAM: &str = "level";

/// Represents the authoritative crawl world state.
#[derive(Debug)]
pub struct World {
    config: GameConfig,
    seed: u64,
    board: Board,
    player: Player,
    objects: BTreeMap<ActorId, CellObject>,
    registry: ActorRegistry,
    next_actor: u32,
    food: i32,
    level: u32,
    phase: Option<Phase>,
    turn: u64,
    player_acted: bool,
    game_over: bool,
}

impl World {
    /// Creates a world that waits for [`Command::NewGame`] before generating a level.
    pub fn new(config: GameConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        let board = Board::new(config.board.columns, config.board.rows);
        let food = config.player.starting_food;
        Ok(Self {
            config,
            seed,
            board,
            player: Player::new(PLAYER_START),
            objects: BTreeMap::new(),
            registry: ActorRegistry::new(),
            next_actor: ActorId::PLAYER.get() + 1,
            food,
            level: 0,
            phase: None,
            turn: 0,
            player_acted: false,
            game_over: false,
        })
    }

    fn next_id(&self) -> ActorId {
        ActorId::new(self.next_actor)
    }

    fn start_level(&mut self, out_events: &mut Vec<Event>) {
        self.clear_level(out_events);

        let mut rng = ChaCha8Rng::seed_from_u64(derive_seed(
            self.seed,
            LEVEL_STREAM,
            u64::from(self.level),
        ));
        let layout = self
            .board
            .generate(&self.config, self.level, &mut rng, out_events);

        if let Some(cell) = layout.exit {
            let _ = self.spawn_object(cell, ObjectKind::Exit, out_events);
        }
        for cell in layout.food {
            let amount = self
                .config
                .food
                .amounts
                .choose(&mut rng)
                .copied()
                .unwrap_or_default();
            let _ = self.spawn_object(cell, ObjectKind::Food { amount }, out_events);
        }
        let wall_hit_points = self.config.walls.tiers.saturating_sub(1);
        for cell in layout.walls {
            let wall = actor::Wall {
                hit_points: wall_hit_points,
            };
            let _ = self.spawn_object(cell, ObjectKind::Wall(wall), out_events);
        }
        for cell in layout.enemies {
            let _ = self.spawn_object(cell, self.fresh_enemy(), out_events);
        }

        self.enter_level(out_events);
    }

    fn clear_level(&mut self, out_events: &mut Vec<Event>) {
        let mut doomed = self.board.clear(out_events);
        doomed.extend(self.objects.keys().copied());
        doomed.sort();
        doomed.dedup();
        for id in doomed {
            self.destroy_object(id, out_events);
        }
        self.registry.clear();
        self.player.actions.cancel_all();
        out_events.push(Event::BoardCleared);
    }

    fn enter_level(&mut self, out_events: &mut Vec<Event>) {
        self.player = Player::new(PLAYER_START);
        self.phase = None;
        self.turn = 0;
        self.player_acted = false;
        out_events.push(Event::ActorSpawned {
            actor: ActorId::PLAYER,
            kind: ActorKind::Player,
            cell: PLAYER_START,
        });

        tracing::info!(level = self.level, food = self.food, "level started");
        out_events.push(Event::LevelStarted {
            level: self.level,
            food: self.food,
        });
    }

    fn fresh_enemy(&self) -> ObjectKind {
        ObjectKind::Enemy(Enemy {
            hit_points: self.config.enemy.hit_points,
            actions: actor::ActionSet::new(),
        })
    }

    fn spawn_object(
        &mut self,
        cell: CellCoord,
        kind: ObjectKind,
        out_events: &mut Vec<Event>,
    ) -> Option<ActorId> {
        let id = self.next_id();
        if let Err(error) = self.board.place(cell, id) {
            tracing::warn!(%error, ?cell, "skipping object placement");
            return None;
        }
        self.next_actor = self.next_actor.saturating_add(1);

        let object = CellObject::new(id, cell, kind);
        let actor_kind = object.actor_kind();
        match &object.kind {
            ObjectKind::Exit => self.board.paint(cell, Some(TileKind::Exit), out_events),
            ObjectKind::Wall(wall) => self.board.paint(cell, Some(wall.tile()), out_events),
            ObjectKind::Enemy(_) => {
                let _ = self.registry.register(id);
            }
            ObjectKind::Food { .. } => {}
        }
        let _ = self.objects.insert(id, object);

        out_events.push(Event::ActorSpawned {
            actor: id,
            kind: actor_kind,
            cell,
        });
        Some(id)
    }

    fn destroy_object(&mut self, id: ActorId, out_events: &mut Vec<Event>) {
        let _ = self.registry.deregister(id);
        let Some(mut object) = self.objects.remove(&id) else {
            return;
        };
        if let Some(enemy) = object.enemy_mut() {
            enemy.actions.cancel_all();
        }
        if self.board.occupant_at(object.cell) == Some(id) {
            let _ = self.board.remove_occupant(object.cell);
        }
        out_events.push(Event::ActorDestroyed {
            actor: id,
            kind: object.actor_kind(),
            cell: object.cell,
        });
    }

    fn change_food(&mut self, delta: i32, out_events: &mut Vec<Event>) {
        if self.game_over {
            return;
        }
        self.food = self.food.saturating_add(delta).max(0);
        out_events.push(Event::FoodChanged {
            delta,
            food: self.food,
        });

        if self.food <= 0 {
            self.game_over = true;
            tracing::info!(level = self.level, turn = self.turn, "food ran out");
            out_events.push(Event::GameOver {
                level: self.level,
                turn: self.turn,
            });
        }
    }

    fn move_player(&mut self, direction: Direction, out_events: &mut Vec<Event>) {
        if let Err(reason) = self.player_may_act() {
            out_events.push(Event::PlayerMoveRejected { direction, reason });
            return;
        }
        let from = self.player.cell;
        let Some(to) = from
            .step(direction)
            .filter(|cell| self.board.is_passable(*cell))
        else {
            out_events.push(Event::PlayerMoveRejected {
                direction,
                reason: PlayerRejection::Impassable,
            });
            return;
        };

        self.player_acted = true;
        let attack_points = self.config.player.attack_points;
        let enemy_hurt = self.config.timing.enemy.hurt();
        let occupant = self.board.occupant_at(to);
        let outcome = occupant
            .and_then(|id| self.objects.get_mut(&id))
            .map_or(EntryOutcome::Permit, |object| {
                object.on_player_try_enter(attack_points, enemy_hurt)
            });

        let action = match (outcome, occupant) {
            (EntryOutcome::Strike { remaining }, Some(wall)) => {
                self.board
                    .paint(to, Some(TileKind::Wall { tier: remaining }), out_events);
                out_events.push(Event::WallDamaged {
                    wall,
                    hit_points: remaining,
                });
                self.start_player_attack(out_events);
                PlayerAction::StruckWall { wall, remaining }
            }
            (EntryOutcome::Engage { superseded }, Some(enemy)) => {
                self.start_player_attack(out_events);
                if superseded {
                    out_events.push(Event::ActionSuperseded {
                        actor: enemy,
                        action: ActionKind::Hurt,
                    });
                }
                out_events.push(Event::ActionStarted {
                    actor: enemy,
                    action: ActionKind::Hurt,
                    duration: enemy_hurt,
                });
                PlayerAction::StruckEnemy { enemy }
            }
            (EntryOutcome::Demolish, Some(wall)) => {
                self.destroy_object(wall, out_events);
                self.board.paint(to, Some(TileKind::Ground), out_events);
                self.start_player_move(to, out_events);
                PlayerAction::Moved { from, to }
            }
            _ => {
                self.start_player_move(to, out_events);
                PlayerAction::Moved { from, to }
            }
        };

        tracing::debug!(?direction, ?action, "player acted");
        out_events.push(Event::PlayerActed { direction, action });
    }

    fn player_may_act(&self) -> Result<(), PlayerRejection> {
        if self.game_over {
            Err(PlayerRejection::GameOver)
        } else if self.phase != Some(Phase::Player) {
            Err(PlayerRejection::NotPlayerPhase)
        } else if self.player_acted {
            Err(PlayerRejection::AlreadyActed)
        } else if self.player.actions.is_busy() {
            Err(PlayerRejection::Busy)
        } else {
            Ok(())
        }
    }

    fn start_player_move(&mut self, to: CellCoord, out_events: &mut Vec<Event>) {
        self.player.cell = to;
        let duration = self.config.timing.player.movement();
        let _ = self.player.actions.start_move(duration, to);
        out_events.push(Event::ActionStarted {
            actor: ActorId::PLAYER,
            action: ActionKind::Move,
            duration,
        });
    }

    fn start_player_attack(&mut self, out_events: &mut Vec<Event>) {
        let duration = self.config.timing.player.attack();
        let _ = self.player.actions.start_attack(duration);
        out_events.push(Event::ActionStarted {
            actor: ActorId::PLAYER,
            action: ActionKind::Attack,
            duration,
        });
    }

    fn enemy_may_act(&self, enemy: ActorId) -> Result<CellCoord, EnemyRejection> {
        if self.game_over {
            return Err(EnemyRejection::GameOver);
        }
        if self.phase != Some(Phase::Enemy) {
            return Err(EnemyRejection::NotEnemyPhase);
        }
        self.objects
            .get(&enemy)
            .filter(|object| object.enemy().is_some() && self.registry.contains(enemy))
            .map(|object| object.cell)
            .ok_or(EnemyRejection::UnknownEnemy)
    }

    fn step_enemy(&mut self, enemy: ActorId, direction: Direction, out_events: &mut Vec<Event>) {
        let from = match self.enemy_may_act(enemy) {
            Ok(cell) => cell,
            Err(reason) => {
                out_events.push(Event::EnemyCommandRejected { enemy, reason });
                return;
            }
        };
        let Some(to) = from
            .step(direction)
            .filter(|cell| self.board.is_empty(*cell) && *cell != self.player.cell)
        else {
            out_events.push(Event::EnemyCommandRejected {
                enemy,
                reason: EnemyRejection::Blocked,
            });
            return;
        };

        if let Err(error) = self.board.move_occupant(from, to) {
            tracing::warn!(%error, ?enemy, "enemy step ignored");
            out_events.push(Event::EnemyCommandRejected {
                enemy,
                reason: EnemyRejection::Blocked,
            });
            return;
        }

        let duration = self.config.timing.enemy.movement();
        if let Some(object) = self.objects.get_mut(&enemy) {
            object.cell = to;
            if let Some(state) = object.enemy_mut() {
                let _ = state.actions.start_move(duration, ());
            }
        }
        out_events.push(Event::EnemyMoved { enemy, from, to });
        out_events.push(Event::ActionStarted {
            actor: enemy,
            action: ActionKind::Move,
            duration,
        });
    }

    fn enemy_attack(&mut self, enemy: ActorId, out_events: &mut Vec<Event>) {
        let cell = match self.enemy_may_act(enemy) {
            Ok(cell) => cell,
            Err(reason) => {
                out_events.push(Event::EnemyCommandRejected { enemy, reason });
                return;
            }
        };
        if cell.squared_distance(self.player.cell) > 1 {
            out_events.push(Event::EnemyCommandRejected {
                enemy,
                reason: EnemyRejection::OutOfRange,
            });
            return;
        }

        let duration = self.config.timing.enemy.attack();
        if let Some(state) = self
            .objects
            .get_mut(&enemy)
            .and_then(CellObject::enemy_mut)
        {
            let _ = state.actions.start_attack(duration);
        }
        out_events.push(Event::ActionStarted {
            actor: enemy,
            action: ActionKind::Attack,
            duration,
        });
    }

    fn start_phase(&mut self, phase: Phase, turn: u64, out_events: &mut Vec<Event>) {
        if self.game_over {
            tracing::trace!(?phase, turn, "phase entry ignored after game over");
            return;
        }
        self.phase = Some(phase);
        self.turn = turn;
        out_events.push(Event::PhaseStarted { phase, turn });

        if phase == Phase::Player {
            self.player_acted = false;
            if turn > 1 {
                self.change_food(-self.config.player.food_per_turn, out_events);
            }
        }
    }

    fn tick(&mut self, dt: std::time::Duration, out_events: &mut Vec<Event>) {
        out_events.push(Event::TimeAdvanced { dt });

        let player_completions = self.player.actions.advance(dt);
        let mut enemy_completions = Vec::new();
        for id in self.registry.snapshot() {
            if let Some(enemy) = self.objects.get_mut(&id).and_then(CellObject::enemy_mut) {
                for completion in enemy.actions.advance(dt) {
                    enemy_completions.push((id, completion));
                }
            }
        }

        let level = self.level;
        for completion in player_completions {
            if self.level != level {
                break;
            }
            tracing::trace!(action = ?completion.kind(), "player action completed");
            out_events.push(Event::ActionCompleted {
                actor: ActorId::PLAYER,
                action: completion.kind(),
            });
            if let Completion::Moved(destination) = completion {
                self.player_entered(destination, out_events);
            }
        }

        for (enemy, completion) in enemy_completions {
            if !self.registry.contains(enemy) {
                continue;
            }
            tracing::trace!(?enemy, action = ?completion.kind(), "enemy action completed");
            out_events.push(Event::ActionCompleted {
                actor: enemy,
                action: completion.kind(),
            });
            match completion {
                Completion::Moved(()) => {}
                Completion::Attacked => self.land_enemy_attack(enemy, out_events),
                Completion::Hurt(damage) => self.hurt_enemy(enemy, damage, out_events),
            }
        }
    }

    fn player_entered(&mut self, destination: CellCoord, out_events: &mut Vec<Event>) {
        if self.player.cell != destination {
            return;
        }
        let Some(id) = self.board.occupant_at(destination) else {
            return;
        };
        let Some(outcome) = self.objects.get(&id).map(CellObject::on_player_entered) else {
            return;
        };

        match outcome {
            EnteredOutcome::Nothing => {}
            EnteredOutcome::Consume { amount } => {
                self.destroy_object(id, out_events);
                out_events.push(Event::FoodConsumed {
                    food: id,
                    cell: destination,
                    amount,
                });
                self.change_food(amount, out_events);
            }
            EnteredOutcome::AdvanceLevel => {
                if self.game_over {
                    return;
                }
                out_events.push(Event::ExitReached { level: self.level });
                self.level = self.level.saturating_add(1);
                self.start_level(out_events);
            }
        }
    }

    fn land_enemy_attack(&mut self, attacker: ActorId, out_events: &mut Vec<Event>) {
        if self.game_over {
            return;
        }
        let damage = self.config.enemy.attack_points;
        out_events.push(Event::PlayerHurt { attacker, damage });
        self.change_food(-damage, out_events);

        let duration = self.config.timing.player.hurt();
        if self.player.actions.start_hurt(duration, ()) {
            out_events.push(Event::ActionSuperseded {
                actor: ActorId::PLAYER,
                action: ActionKind::Hurt,
            });
        }
        out_events.push(Event::ActionStarted {
            actor: ActorId::PLAYER,
            action: ActionKind::Hurt,
            duration,
        });
    }

    fn hurt_enemy(&mut self, enemy: ActorId, damage: i32, out_events: &mut Vec<Event>) {
        let Some(state) = self.objects.get_mut(&enemy).and_then(CellObject::enemy_mut) else {
            return;
        };
        state.hit_points = state.hit_points.saturating_sub(damage);
        let hit_points = state.hit_points;
        out_events.push(Event::EnemyHurt {
            enemy,
            damage,
            hit_points,
        });
        if hit_points <= 0 {
            tracing::debug!(?enemy, "enemy destroyed");
            self.destroy_object(enemy, out_events);
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::NewGame => {
            world.food = world.config.player.starting_food;
            world.level = 1;
            world.game_over = false;
            world.start_level(out_events);
        }
        Command::Tick { dt } => world.tick(dt, out_events),
        Command::MovePlayer { direction } => world.move_player(direction, out_events),
        Command::StartPhase { phase, turn } => world.start_phase(phase, turn, out_events),
        Command::StepEnemy { enemy, direction } => world.step_enemy(enemy, direction, out_events),
        Command::EnemyAttack { enemy } => world.enemy_attack(enemy, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use crawl_core::{
        ActivityView, ActorId, ActorKind, ActorSnapshot, ActorView, BoardView, CellCoord,
        EnemyActivity, Phase,
    };

    use super::{Board, World};

    /// Provides read-only access to the board.
    #[must_use]
    pub fn board(world: &World) -> &Board {
        &world.board
    }

    /// Captures a read-only view of every board cell.
    #[must_use]
    pub fn board_view(world: &World) -> BoardView<'_> {
        world.board.view()
    }

    /// Busy flags of the player and every currently registered enemy.
    #[must_use]
    pub fn activity(world: &World) -> ActivityView {
        let enemies = world
            .registry
            .snapshot()
            .into_iter()
            .map(|id| EnemyActivity {
                id,
                busy: is_busy(world, id),
            })
            .collect();
        ActivityView::new(world.player.actions.is_busy(), enemies)
    }

    /// Identifiers of the registered enemies in ascending order.
    #[must_use]
    pub fn enemy_ids(world: &World) -> Vec<ActorId> {
        world.registry.snapshot()
    }

    /// Cell occupied by the actor, including the player.
    #[must_use]
    pub fn actor_cell(world: &World, actor: ActorId) -> Option<CellCoord> {
        if actor == ActorId::PLAYER {
            return (world.level > 0).then_some(world.player.cell);
        }
        world.objects.get(&actor).map(|object| object.cell)
    }

    /// Cell the player occupies or is moving into.
    #[must_use]
    pub fn player_cell(world: &World) -> CellCoord {
        world.player.cell
    }

    /// Kind of a live actor.
    #[must_use]
    pub fn actor_kind(world: &World, actor: ActorId) -> Option<ActorKind> {
        if actor == ActorId::PLAYER {
            return Some(ActorKind::Player);
        }
        world.objects.get(&actor).map(|object| object.actor_kind())
    }

    /// Whether the actor has any timed action in flight. Unknown actors are idle.
    #[must_use]
    pub fn is_busy(world: &World, actor: ActorId) -> bool {
        if actor == ActorId::PLAYER {
            return world.player.actions.is_busy();
        }
        world
            .objects
            .get(&actor)
            .is_some_and(|object| object.is_busy())
    }

    /// Remaining hit points of a live enemy.
    #[must_use]
    pub fn hit_points(world: &World, enemy: ActorId) -> Option<i32> {
        world
            .objects
            .get(&enemy)
            .and_then(|object| object.enemy())
            .map(|enemy| enemy.hit_points)
    }

    /// Snapshot of the player and every live cell object.
    #[must_use]
    pub fn actor_view(world: &World) -> ActorView {
        let mut snapshots: Vec<ActorSnapshot> = world
            .objects
            .values()
            .map(|object| ActorSnapshot {
                id: object.id,
                kind: object.actor_kind(),
                cell: object.cell,
                busy: object.is_busy(),
            })
            .collect();
        if world.level > 0 {
            snapshots.push(ActorSnapshot {
                id: ActorId::PLAYER,
                kind: ActorKind::Player,
                cell: world.player.cell,
                busy: world.player.actions.is_busy(),
            });
        }
        ActorView::from_snapshots(snapshots)
    }

    /// Current food counter.
    #[must_use]
    pub fn food(world: &World) -> i32 {
        world.food
    }

    /// One-based level number, zero before the first game starts.
    #[must_use]
    pub fn level(world: &World) -> u32 {
        world.level
    }

    /// Phase most recently started, if any since the level began.
    #[must_use]
    pub fn phase(world: &World) -> Option<Phase> {
        world.phase
    }

    /// Turn counter value of the most recent phase entry.
    #[must_use]
    pub fn turn(world: &World) -> u64 {
        world.turn
    }

    /// Whether the player has already acted in the current player phase.
    #[must_use]
    pub fn player_has_acted(world: &World) -> bool {
        world.player_acted
    }

    /// Whether food ran out.
    #[must_use]
    pub fn is_game_over(world: &World) -> bool {
        world.game_over
    }
}
