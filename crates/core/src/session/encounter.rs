//! Combat entry and per-turn handling inside a session.
//! This module exists to apply encounter outcomes to the floor and the player.
//! It does not own move selection or damage rules.

use super::*;
use crate::combat::{Encounter, Outcome};
use crate::events::{CombatResult, SessionEvent};
use crate::mapgen::Occupant;
use crate::resources::Resources;
use crate::types::EnemyId;

impl SessionDocument {
    pub(super) fn engage<R: RandomSource>(
        &mut self,
        cell: CellId,
        enemy_id: EnemyId,
        enemy_health: u32,
        ctx: &mut ActionContext<'_, R>,
    ) {
        tracing::info!(cell, %enemy_id, enemy_health, "combat started");
        ctx.events.push(SessionEvent::CombatStarted {
            cell,
            enemy_id: enemy_id.clone(),
            enemy_health,
        });
        self.state.combat = Some(Encounter::start(cell, enemy_id, enemy_health));
    }

    pub fn combat_action<R: RandomSource>(
        &mut self,
        action: CombatAction,
        ctx: &mut ActionContext<'_, R>,
    ) -> Result<(), SessionError> {
        if !self.in_combat() {
            return Err(SessionError::NotInCombat);
        }
        match action {
            CombatAction::Attack { mv } => self.attack(mv, ctx),
            CombatAction::UsePotion => self.drink_potion(ctx),
        }
    }

    fn drink_potion<R: RandomSource>(
        &mut self,
        ctx: &mut ActionContext<'_, R>,
    ) -> Result<(), SessionError> {
        if self.state.user.potions == 0 {
            return Err(SessionError::IncorrectArguments("no potions left".to_string()));
        }
        let catalog = ctx.catalog;
        self.state.user.potions -= 1;
        Resources::new(&mut self.state.user, &catalog.stats, ctx.events)
            .heal(catalog.mode.potion_heal);
        Ok(())
    }

    fn attack<R: RandomSource>(
        &mut self,
        player_move: CombatMove,
        ctx: &mut ActionContext<'_, R>,
    ) -> Result<(), SessionError> {
        let catalog = ctx.catalog;
        let Some(mut combat) = self.state.combat.clone() else {
            return Err(SessionError::NotInCombat);
        };
        let template = catalog.enemy(&combat.enemy_id)?;

        let outcome = {
            let mut resources = Resources::new(&mut self.state.user, &catalog.stats, ctx.events);
            Encounter::new(template, &mut combat).resolve_outcome(
                player_move,
                &mut resources,
                ctx.rng,
            )
        };

        match outcome {
            Outcome::Continuing => {
                self.state.combat = Some(combat);
            }
            Outcome::EnemyWon => {
                self.state.combat = None;
                let remaining =
                    if template.aggressive { template.health } else { combat.enemy_health };
                if let Some(Occupant::Enemy { health, .. }) =
                    self.data.cell_mut(combat.cell).and_then(|cell| cell.occupant.as_mut())
                {
                    *health = remaining;
                }
                let start = self.data.start;
                let mut resources =
                    Resources::new(&mut self.state.user, &catalog.stats, ctx.events);
                resources.move_to(start);
                let max_health = resources.max_health();
                resources.heal(max_health);
                tracing::info!(enemy_id = %combat.enemy_id, remaining, "player defeated");
                ctx.events.push(SessionEvent::CombatEnded {
                    enemy_id: combat.enemy_id,
                    result: CombatResult::EnemyWon,
                });
            }
            Outcome::PlayerWon => {
                self.state.combat = None;
                if let Some(cell) = self.data.cell_mut(combat.cell) {
                    cell.occupant = None;
                }
                tracing::info!(enemy_id = %combat.enemy_id, turns = combat.turn, "enemy defeated");
                ctx.events.push(SessionEvent::CombatEnded {
                    enemy_id: combat.enemy_id,
                    result: CombatResult::PlayerWon,
                });
                let exp = catalog.levels.exp_for_difficulty(template.difficulty);
                Resources::new(&mut self.state.user, &catalog.stats, ctx.events)
                    .grant_experience(exp, &catalog.levels);
                self.advance_floor(ctx)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedRandom;
    use crate::session::test_support::{corridor, enemy, run};

    fn attack(mv: CombatMove) -> SessionAction {
        SessionAction::Combat { action: CombatAction::Attack { mv } }
    }

    fn fighting(occupant: Option<Occupant>) -> SessionDocument {
        let mut document = corridor(vec![None, occupant, enemy("skeleton", 18)]);
        document.state.revealed = vec![1];
        run(&mut document, SessionAction::UseCell { cell: 1 }, &mut ScriptedRandom::always_low())
            .unwrap();
        document
    }

    /// With a zero draw the first move-set whose band holds the enemy's health is played.
    fn first_move(enemy: &str) -> CombatMove {
        GameCatalog::build_default().enemies[&EnemyId::new(enemy)].move_sets[0].moves[0]
    }

    fn winning_move(enemy: &str) -> CombatMove {
        let theirs = first_move(enemy);
        CombatMove::ALL.into_iter().find(|mv| mv.beats(theirs)).unwrap()
    }

    fn losing_move(enemy: &str) -> CombatMove {
        let theirs = first_move(enemy);
        CombatMove::ALL.into_iter().find(|mv| theirs.beats(*mv)).unwrap()
    }

    #[test]
    fn combat_action_outside_combat_is_rejected() {
        let mut document = corridor(vec![None]);
        let err = run(&mut document, attack(CombatMove::Strike), &mut ScriptedRandom::always_low())
            .unwrap_err();
        assert!(matches!(err, SessionError::NotInCombat));
    }

    #[test]
    fn winning_removes_enemy_and_grants_experience() {
        let mut document = fighting(enemy("slime", 1));
        let events =
            run(&mut document, attack(winning_move("slime")), &mut ScriptedRandom::always_low())
                .unwrap();
        assert!(!document.in_combat());
        assert!(document.data.cells[1].occupant.is_none());
        assert_eq!(document.state.user.exp, 10);
        assert!(events.contains(&SessionEvent::CombatEnded {
            enemy_id: "slime".into(),
            result: CombatResult::PlayerWon,
        }));
    }

    #[test]
    fn losing_to_passive_enemy_keeps_its_wounds() {
        let mut document = fighting(enemy("slime", 7));
        document.state.user.health = 1;
        run(&mut document, attack(losing_move("slime")), &mut ScriptedRandom::always_low())
            .unwrap();
        assert!(!document.in_combat());
        assert_eq!(document.state.user.cell, document.data.start);
        assert_eq!(document.state.user.health, 25);
        assert_eq!(document.data.cells[1].enemy().map(|(_, hp)| hp), Some(7));
    }

    #[test]
    fn losing_to_aggressive_enemy_resets_its_health() {
        let mut document = fighting(enemy("ogre", 20));
        document.state.user.health = 1;
        run(&mut document, attack(losing_move("ogre")), &mut ScriptedRandom::always_low())
            .unwrap();
        assert_eq!(document.data.cells[1].enemy().map(|(_, hp)| hp), Some(30));
    }

    #[test]
    fn potion_heals_without_enemy_turn() {
        let mut document = fighting(enemy("slime", 10));
        document.state.user.health = 3;
        document.state.user.potions = 1;
        let action = SessionAction::Combat { action: CombatAction::UsePotion };
        run(&mut document, action, &mut ScriptedRandom::always_low()).unwrap();
        assert_eq!(document.state.user.health, 15);
        assert_eq!(document.state.combat.as_ref().map(|c| c.turn), Some(0));
        assert!(run(&mut document, action, &mut ScriptedRandom::always_low()).is_err());
    }

    #[test]
    fn clearing_last_enemy_descends_to_next_floor() {
        let mut document = corridor(vec![None, enemy("slime", 1)]);
        document.state.revealed = vec![1];
        let mut rng = ScriptedRandom::always_low();
        run(&mut document, SessionAction::UseCell { cell: 1 }, &mut rng).unwrap();
        let events = run(&mut document, attack(winning_move("slime")), &mut rng).unwrap();
        assert_eq!(document.state.floor, 2);
        assert!(document.state.revealed.is_empty());
        assert_eq!(document.state.user.cell, document.data.start);
        assert!(events.iter().any(|e| matches!(e, SessionEvent::FloorGenerated { floor: 2, .. })));
    }
}
