use std::time::Duration;

use crawl_core::{
    ActionKind, ActionTimings, ActorId, CellCoord, Command, Direction, EnemyRejection, Event,
    GameConfig, Phase, PlayerAction, PlayerRejection, TileKind,
};

use crate::scaffold::{self, ScaffoldActor};
use crate::{apply, query, World};

const EAST_OF_START: CellCoord = CellCoord::new(2, 1);

fn instant_config() -> GameConfig {
    let mut config = GameConfig::default();
    config.timing.player = ActionTimings::INSTANT;
    config.timing.enemy = ActionTimings::INSTANT;
    config
}

fn blank_world(config: GameConfig) -> World {
    let mut world = World::new(config, 17).expect("valid config");
    scaffold::blank_level(&mut world, &mut Vec::new());
    world
}

fn run(world: &mut World, command: Command) -> Vec<Event> {
    let mut events = Vec::new();
    apply(world, command, &mut events);
    events
}

fn spawn(world: &mut World, cell: CellCoord, actor: ScaffoldActor) -> ActorId {
    scaffold::spawn(world, cell, actor, &mut Vec::new()).expect("cell is free")
}

fn player_phase(world: &mut World, turn: u64) {
    let _ = run(world, Command::StartPhase { phase: Phase::Player, turn });
}

fn move_east(world: &mut World) -> Vec<Event> {
    run(
        world,
        Command::MovePlayer {
            direction: Direction::East,
        },
    )
}

fn tick(world: &mut World, millis: u64) -> Vec<Event> {
    run(
        world,
        Command::Tick {
            dt: Duration::from_millis(millis),
        },
    )
}

#[test]
fn wall_falls_after_exactly_one_bump_per_tier() {
    let mut world = blank_world(instant_config());
    let wall = spawn(&mut world, EAST_OF_START, ScaffoldActor::Wall);
    assert_eq!(
        query::board(&world).tile_at(EAST_OF_START),
        Some(TileKind::Wall { tier: 2 })
    );

    for (bump, remaining) in [(1, 1), (2, 0)] {
        player_phase(&mut world, bump * 2 - 1);
        let events = move_east(&mut world);
        assert!(events.contains(&Event::PlayerActed {
            direction: Direction::East,
            action: PlayerAction::StruckWall { wall, remaining },
        }));
        assert_eq!(query::player_cell(&world), CellCoord::new(1, 1));
        let _ = tick(&mut world, 0);
    }

    player_phase(&mut world, 5);
    let events = move_east(&mut world);
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::ActorDestroyed { actor, .. } if *actor == wall)));
    assert_eq!(
        query::board(&world).tile_at(EAST_OF_START),
        Some(TileKind::Ground)
    );
    assert_eq!(query::player_cell(&world), EAST_OF_START);
    assert!(query::board(&world).is_passable(EAST_OF_START));
    assert!(query::board(&world).is_empty(EAST_OF_START));
}

#[test]
fn food_is_consumed_exactly_once() {
    let mut world = blank_world(instant_config());
    let food = spawn(&mut world, EAST_OF_START, ScaffoldActor::Food { amount: 10 });

    player_phase(&mut world, 1);
    let mut events = move_east(&mut world);
    for _ in 0..3 {
        events.extend(tick(&mut world, 16));
    }

    let consumed = events
        .iter()
        .filter(|event| matches!(event, Event::FoodConsumed { .. }))
        .count();
    assert_eq!(consumed, 1);
    assert!(events.contains(&Event::FoodConsumed {
        food,
        cell: EAST_OF_START,
        amount: 10,
    }));
    assert_eq!(query::food(&world), 110);
    assert_eq!(query::actor_kind(&world, food), None);
    assert!(query::board(&world).is_empty(EAST_OF_START));
}

#[test]
fn reentering_an_eaten_food_cell_only_costs_the_turn_decay() {
    let mut world = blank_world(instant_config());
    let _ = spawn(&mut world, EAST_OF_START, ScaffoldActor::Food { amount: 10 });

    let mut foods = Vec::new();
    let mut consumed = 0;
    for (turn, direction) in [(1, Direction::East), (3, Direction::West), (5, Direction::East)] {
        player_phase(&mut world, turn);
        let mut events = run(&mut world, Command::MovePlayer { direction });
        events.extend(tick(&mut world, 0));
        consumed += events
            .iter()
            .filter(|event| matches!(event, Event::FoodConsumed { .. }))
            .count();
        foods.push(query::food(&world));
    }

    assert_eq!(consumed, 1);
    assert_eq!(foods, vec![110, 109, 108]);
    assert_eq!(query::player_cell(&world), EAST_OF_START);

    player_phase(&mut world, 7);
    assert_eq!(query::food(&world), 107);
}

#[test]
fn failed_placement_does_not_consume_an_identifier() {
    let mut world = blank_world(instant_config());
    let first = spawn(&mut world, EAST_OF_START, ScaffoldActor::Exit);
    assert_eq!(
        scaffold::spawn(
            &mut world,
            EAST_OF_START,
            ScaffoldActor::Enemy,
            &mut Vec::new()
        ),
        None
    );
    assert_eq!(
        scaffold::spawn(
            &mut world,
            CellCoord::new(0, 0),
            ScaffoldActor::Wall,
            &mut Vec::new()
        ),
        None
    );

    let second = spawn(&mut world, CellCoord::new(3, 1), ScaffoldActor::Enemy);
    assert_eq!(second.get(), first.get() + 1);
    assert_eq!(query::enemy_ids(&world), vec![second]);
}

#[test]
fn second_strike_supersedes_pending_enemy_damage() {
    let mut config = instant_config();
    config.timing.enemy.hurt_ms = 100;
    let mut world = blank_world(config);
    let enemy = spawn(&mut world, EAST_OF_START, ScaffoldActor::Enemy);

    player_phase(&mut world, 1);
    let _ = move_east(&mut world);
    let _ = tick(&mut world, 50);
    assert_eq!(query::hit_points(&world, enemy), Some(3));

    player_phase(&mut world, 3);
    let events = move_east(&mut world);
    assert!(events.contains(&Event::ActionSuperseded {
        actor: enemy,
        action: ActionKind::Hurt,
    }));

    let _ = tick(&mut world, 60);
    assert_eq!(query::hit_points(&world, enemy), Some(3));
    let events = tick(&mut world, 40);
    assert!(events.contains(&Event::EnemyHurt {
        enemy,
        damage: 1,
        hit_points: 2,
    }));
    assert_eq!(query::hit_points(&world, enemy), Some(2));
    assert!(!query::is_busy(&world, enemy));
}

#[test]
fn destroyed_enemy_leaves_registry_and_board() {
    let mut config = instant_config();
    config.enemy.hit_points = 1;
    let mut world = blank_world(config);
    let enemy = spawn(&mut world, EAST_OF_START, ScaffoldActor::Enemy);
    assert_eq!(query::enemy_ids(&world), vec![enemy]);

    player_phase(&mut world, 1);
    let _ = move_east(&mut world);
    let events = tick(&mut world, 0);
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::ActorDestroyed { actor, .. } if *actor == enemy)));
    assert!(query::enemy_ids(&world).is_empty());
    assert!(query::board(&world).is_empty(EAST_OF_START));

    let _ = run(
        &mut world,
        Command::StartPhase {
            phase: Phase::Enemy,
            turn: 2,
        },
    );
    let events = run(
        &mut world,
        Command::StepEnemy {
            enemy,
            direction: Direction::South,
        },
    );
    assert_eq!(
        events,
        vec![Event::EnemyCommandRejected {
            enemy,
            reason: EnemyRejection::UnknownEnemy,
        }]
    );
}

#[test]
fn enemies_cannot_step_onto_the_player_or_other_occupants() {
    let mut world = blank_world(instant_config());
    let enemy = spawn(&mut world, EAST_OF_START, ScaffoldActor::Enemy);
    let _ = spawn(&mut world, CellCoord::new(3, 1), ScaffoldActor::Food { amount: 10 });
    let _ = run(
        &mut world,
        Command::StartPhase {
            phase: Phase::Enemy,
            turn: 2,
        },
    );

    for direction in [Direction::West, Direction::East, Direction::North] {
        let events = run(&mut world, Command::StepEnemy { enemy, direction });
        assert_eq!(
            events,
            vec![Event::EnemyCommandRejected {
                enemy,
                reason: EnemyRejection::Blocked,
            }]
        );
    }

    let events = run(
        &mut world,
        Command::StepEnemy {
            enemy,
            direction: Direction::South,
        },
    );
    assert!(events.contains(&Event::EnemyMoved {
        enemy,
        from: EAST_OF_START,
        to: CellCoord::new(2, 2),
    }));
    assert_eq!(
        query::board(&world).occupant_at(CellCoord::new(2, 2)),
        Some(enemy)
    );
    assert!(query::board(&world).is_empty(EAST_OF_START));
}

#[test]
fn enemy_attack_lands_on_completion_and_can_end_the_game() {
    let mut config = instant_config();
    config.timing.enemy.attack_ms = 30;
    let mut world = blank_world(config);
    let enemy = spawn(&mut world, EAST_OF_START, ScaffoldActor::Enemy);
    scaffold::set_food(&mut world, 3);
    let _ = run(
        &mut world,
        Command::StartPhase {
            phase: Phase::Enemy,
            turn: 2,
        },
    );

    let _ = run(&mut world, Command::EnemyAttack { enemy });
    assert_eq!(query::food(&world), 3);
    let _ = tick(&mut world, 10);
    assert_eq!(query::food(&world), 3);

    let events = tick(&mut world, 20);
    assert!(events.contains(&Event::PlayerHurt {
        attacker: enemy,
        damage: 5,
    }));
    assert!(events.contains(&Event::GameOver { level: 1, turn: 2 }));
    assert_eq!(query::food(&world), 0);
    assert!(query::is_game_over(&world));

    assert!(run(
        &mut world,
        Command::StartPhase {
            phase: Phase::Player,
            turn: 3,
        },
    )
    .is_empty());
    assert_eq!(
        move_east(&mut world),
        vec![Event::PlayerMoveRejected {
            direction: Direction::East,
            reason: PlayerRejection::GameOver,
        }]
    );

    let events = run(&mut world, Command::NewGame);
    assert!(events.contains(&Event::LevelStarted {
        level: 1,
        food: 100,
    }));
    assert!(!query::is_game_over(&world));
}

#[test]
fn distant_enemy_attack_is_rejected() {
    let mut world = blank_world(instant_config());
    let enemy = spawn(&mut world, CellCoord::new(3, 3), ScaffoldActor::Enemy);
    let _ = run(
        &mut world,
        Command::StartPhase {
            phase: Phase::Enemy,
            turn: 2,
        },
    );
    assert_eq!(
        run(&mut world, Command::EnemyAttack { enemy }),
        vec![Event::EnemyCommandRejected {
            enemy,
            reason: EnemyRejection::OutOfRange,
        }]
    );
}

#[test]
fn reaching_the_exit_starts_the_next_level() {
    let mut world = blank_world(instant_config());
    let _ = spawn(&mut world, EAST_OF_START, ScaffoldActor::Exit);

    player_phase(&mut world, 1);
    let _ = move_east(&mut world);
    let events = tick(&mut world, 0);

    assert!(events.contains(&Event::ExitReached { level: 1 }));
    assert!(events.contains(&Event::BoardCleared));
    assert!(events.contains(&Event::LevelStarted {
        level: 2,
        food: 100,
    }));
    assert_eq!(query::level(&world), 2);
    assert_eq!(query::player_cell(&world), CellCoord::new(1, 1));
    assert_eq!(query::phase(&world), None);
    assert_eq!(query::turn(&world), 0);
    assert!(!query::activity(&world).player_busy());
}

#[test]
fn player_acts_once_per_phase() {
    let mut world = blank_world(instant_config());
    player_phase(&mut world, 1);
    let _ = move_east(&mut world);
    let _ = tick(&mut world, 0);

    let events = run(
        &mut world,
        Command::MovePlayer {
            direction: Direction::South,
        },
    );
    assert_eq!(
        events,
        vec![Event::PlayerMoveRejected {
            direction: Direction::South,
            reason: PlayerRejection::AlreadyActed,
        }]
    );
}
