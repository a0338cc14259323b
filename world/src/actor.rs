//! Player record and the closed set of objects that occupy board cells.

use std::time::Duration;

use crawl_core::{ActionKind, ActorId, ActorKind, CellCoord, TileKind};

use crate::action::ActionSlot;

/// Move, attack and hurt slots owned by an animated actor.
///
/// `M` is carried by movement and `H` by the hurt slot; attacks carry nothing.
#[derive(Clone, Debug)]
pub(crate) struct ActionSet<M, H> {
    movement: ActionSlot<M>,
    attack: ActionSlot<()>,
    hurt: ActionSlot<H>,
}

/// Payload released by a completed slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Completion<M, H> {
    Moved(M),
    Attacked,
    Hurt(H),
}

impl<M, H> Completion<M, H> {
    pub(crate) const fn kind(&self) -> ActionKind {
        match self {
            Self::Moved(_) => ActionKind::Move,
            Self::Attacked => ActionKind::Attack,
            Self::Hurt(_) => ActionKind::Hurt,
        }
    }
}

impl<M, H> ActionSet<M, H> {
    pub(crate) const fn new() -> Self {
        Self {
            movement: ActionSlot::idle(),
            attack: ActionSlot::idle(),
            hurt: ActionSlot::idle(),
        }
    }

    pub(crate) fn is_busy(&self) -> bool {
        self.movement.is_active() || self.attack.is_active() || self.hurt.is_active()
    }

    pub(crate) fn start_move(&mut self, duration: Duration, payload: M) -> bool {
        self.movement.start(duration, payload)
    }

    pub(crate) fn start_attack(&mut self, duration: Duration) -> bool {
        self.attack.start(duration, ())
    }

    pub(crate) fn start_hurt(&mut self, duration: Duration, payload: H) -> bool {
        self.hurt.start(duration, payload)
    }

    /// Advances every slot, yielding completions in move, attack, hurt order.
    pub(crate) fn advance(&mut self, dt: Duration) -> Vec<Completion<M, H>> {
        let mut completions = Vec::new();
        if let Some(payload) = self.movement.advance(dt) {
            completions.push(Completion::Moved(payload));
        }
        if self.attack.advance(dt).is_some() {
            completions.push(Completion::Attacked);
        }
        if let Some(payload) = self.hurt.advance(dt) {
            completions.push(Completion::Hurt(payload));
        }
        completions
    }

    pub(crate) fn cancel_all(&mut self) {
        let _ = self.movement.cancel();
        let _ = self.attack.cancel();
        let _ = self.hurt.cancel();
    }
}

/// The controllable explorer. It is tracked beside the board, never on it.
#[derive(Clone, Debug)]
pub(crate) struct Player {
    pub(crate) cell: CellCoord,
    pub(crate) actions: ActionSet<CellCoord, ()>,
}

impl Player {
    pub(crate) const fn new(cell: CellCoord) -> Self {
        Self {
            cell,
            actions: ActionSet::new(),
        }
    }
}

/// Hostile actor registered for the enemy phase.
#[derive(Clone, Debug)]
pub(crate) struct Enemy {
    pub(crate) hit_points: i32,
    pub(crate) actions: ActionSet<(), i32>,
}

/// Destructible obstacle; its hit points double as the painted damage tier.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Wall {
    pub(crate) hit_points: u32,
}

impl Wall {
    pub(crate) const fn tile(&self) -> TileKind {
        TileKind::Wall {
            tier: self.hit_points,
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) enum ObjectKind {
    Food { amount: i32 },
    Wall(Wall),
    Enemy(Enemy),
    Exit,
}

/// How the occupant of a cell answered the player's attempt to enter it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum EntryOutcome {
    Permit,
    /// The wall fell; the player moves in.
    Demolish,
    Strike {
        remaining: u32,
    },
    Engage {
        superseded: bool,
    },
}

/// Effect of the player finishing a move onto the occupant's cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum EnteredOutcome {
    Nothing,
    Consume { amount: i32 },
    AdvanceLevel,
}

/// Anything other than the player that occupies a board cell.
#[derive(Clone, Debug)]
pub(crate) struct CellObject {
    pub(crate) id: ActorId,
    pub(crate) cell: CellCoord,
    pub(crate) kind: ObjectKind,
}

impl CellObject {
    pub(crate) const fn new(id: ActorId, cell: CellCoord, kind: ObjectKind) -> Self {
        Self { id, cell, kind }
    }

    pub(crate) const fn actor_kind(&self) -> ActorKind {
        match self.kind {
            ObjectKind::Food { .. } => ActorKind::Food,
            ObjectKind::Wall(_) => ActorKind::Wall,
            ObjectKind::Enemy(_) => ActorKind::Enemy,
            ObjectKind::Exit => ActorKind::Exit,
        }
    }

    pub(crate) fn is_busy(&self) -> bool {
        match &self.kind {
            ObjectKind::Enemy(enemy) => enemy.actions.is_busy(),
            _ => false,
        }
    }

    pub(crate) fn enemy(&self) -> Option<&Enemy> {
        match &self.kind {
            ObjectKind::Enemy(enemy) => Some(enemy),
            _ => None,
        }
    }

    pub(crate) fn enemy_mut(&mut self) -> Option<&mut Enemy> {
        match &mut self.kind {
            ObjectKind::Enemy(enemy) => Some(enemy),
            _ => None,
        }
    }

    /// Resolves a bump from the player carrying `attack_points` of damage.
    pub(crate) fn on_player_try_enter(
        &mut self,
        attack_points: i32,
        hurt_duration: Duration,
    ) -> EntryOutcome {
        match &mut self.kind {
            ObjectKind::Food { .. } | ObjectKind::Exit => EntryOutcome::Permit,
            ObjectKind::Wall(wall) => {
                if wall.hit_points > 0 {
                    wall.hit_points -= 1;
                    EntryOutcome::Strike {
                        remaining: wall.hit_points,
                    }
                } else {
                    EntryOutcome::Demolish
                }
            }
            ObjectKind::Enemy(enemy) => EntryOutcome::Engage {
                superseded: enemy.actions.start_hurt(hurt_duration, attack_points),
            },
        }
    }

    pub(crate) const fn on_player_entered(&self) -> EnteredOutcome {
        match self.kind {
            ObjectKind::Food { amount } => EnteredOutcome::Consume { amount },
            ObjectKind::Exit => EnteredOutcome::AdvanceLevel,
            ObjectKind::Wall(_) | ObjectKind::Enemy(_) => EnteredOutcome::Nothing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wall(hit_points: u32) -> CellObject {
        CellObject::new(
            ActorId::new(1),
            CellCoord::new(2, 2),
            ObjectKind::Wall(Wall { hit_points }),
        )
    }

    #[test]
    fn wall_blocks_until_its_tiers_are_spent() {
        let mut object = wall(2);
        let outcomes: Vec<_> = (0..3)
            .map(|_| object.on_player_try_enter(1, Duration::ZERO))
            .collect();
        assert_eq!(
            outcomes,
            vec![
                EntryOutcome::Strike { remaining: 1 },
                EntryOutcome::Strike { remaining: 0 },
                EntryOutcome::Demolish,
            ]
        );
    }

    #[test]
    fn second_bump_supersedes_enemy_hurt() {
        let mut object = CellObject::new(
            ActorId::new(3),
            CellCoord::new(4, 4),
            ObjectKind::Enemy(Enemy {
                hit_points: 3,
                actions: ActionSet::new(),
            }),
        );
        let hurt = Duration::from_millis(100);
        assert_eq!(
            object.on_player_try_enter(1, hurt),
            EntryOutcome::Engage { superseded: false }
        );
        assert!(object.is_busy());
        assert_eq!(
            object.on_player_try_enter(2, hurt),
            EntryOutcome::Engage { superseded: true }
        );

        let Some(enemy) = object.enemy_mut() else {
            panic!("object must remain an enemy");
        };
        assert_eq!(enemy.actions.advance(hurt), vec![Completion::Hurt(2)]);
    }

    #[test]
    fn entering_food_and_exit_reports_effects() {
        let food = CellObject::new(
            ActorId::new(5),
            CellCoord::new(1, 2),
            ObjectKind::Food { amount: 10 },
        );
        let exit = CellObject::new(ActorId::new(6), CellCoord::new(3, 3), ObjectKind::Exit);
        assert_eq!(
            food.on_player_entered(),
            EnteredOutcome::Consume { amount: 10 }
        );
        assert_eq!(exit.on_player_entered(), EnteredOutcome::AdvanceLevel);
        assert_eq!(wall(1).on_player_entered(), EnteredOutcome::Nothing);
    }

    #[test]
    fn action_set_reports_completions_in_slot_order() {
        let mut actions: ActionSet<CellCoord, ()> = ActionSet::new();
        let _ = actions.start_hurt(Duration::ZERO, ());
        let _ = actions.start_move(Duration::ZERO, CellCoord::new(2, 1));
        let _ = actions.start_attack(Duration::from_millis(5));
        assert!(actions.is_busy());

        assert_eq!(
            actions.advance(Duration::ZERO),
            vec![Completion::Moved(CellCoord::new(2, 1)), Completion::Hurt(())]
        );
        actions.cancel_all();
        assert!(!actions.is_busy());
    }
}
