//! Exploration actions: reveal, move and use-cell, plus attribute allocation.
//! This module exists to keep precondition checks next to the mutations they guard.
//! It does not own combat turns or floor replacement.

use super::*;
use crate::events::SessionEvent;
use crate::mapgen::Occupant;
use crate::resources::Resources;
use crate::types::{EnemyId, TrapId};

/// What happens when the player steps onto a cell.
enum Arrival {
    Quiet,
    Ambush { enemy_id: EnemyId, health: u32 },
    Trap { trap_id: TrapId },
}

impl SessionDocument {
    pub fn reveal<R: RandomSource>(
        &mut self,
        cell: CellId,
        ctx: &mut ActionContext<'_, R>,
    ) -> Result<(), SessionError> {
        self.ensure_exploring()?;
        self.ensure_exists(cell)?;
        if self.is_known(cell) {
            return Err(SessionError::bad_cell(cell, "already revealed"));
        }
        if !self.data.is_adjacent(self.state.user.cell, cell) {
            return Err(SessionError::bad_cell(cell, "not adjacent to the player"));
        }
        let cost = ctx.catalog.energy.reveal;
        self.require_energy(cost)?;
        let arrival = self.arrival(cell, ctx.catalog)?;

        self.spend_energy(cost, ctx);
        self.state.revealed.push(cell);
        ctx.events.push(SessionEvent::CellRevealed { cell });
        self.step_onto(cell, arrival, ctx);
        if !self.state.map_revealed && self.all_cells_known() {
            self.state.map_revealed = true;
            tracing::info!(floor = self.state.floor, "map fully revealed");
            ctx.events.push(SessionEvent::MapRevealed);
        }
        Ok(())
    }

    pub fn move_to<R: RandomSource>(
        &mut self,
        cell: CellId,
        ctx: &mut ActionContext<'_, R>,
    ) -> Result<(), SessionError> {
        self.ensure_exploring()?;
        self.ensure_exists(cell)?;
        if !self.is_known(cell) {
            return Err(SessionError::bad_cell(cell, "not revealed"));
        }
        if cell == self.state.user.cell {
            return Err(SessionError::bad_cell(cell, "player is already there"));
        }
        let cost = ctx.catalog.energy.move_to;
        self.require_energy(cost)?;
        let arrival = self.arrival(cell, ctx.catalog)?;

        self.spend_energy(cost, ctx);
        self.step_onto(cell, arrival, ctx);
        Ok(())
    }

    /// Resolves the occupant of a revealed cell: fights an enemy, activates an
    /// altar, forces a trap or picks up loot.
    pub fn use_cell<R: RandomSource>(
        &mut self,
        cell: CellId,
        ctx: &mut ActionContext<'_, R>,
    ) -> Result<(), SessionError> {
        self.ensure_exploring()?;
        self.ensure_exists(cell)?;
        if !self.is_known(cell) {
            return Err(SessionError::bad_cell(cell, "not revealed"));
        }
        let Some(occupant) = self.data.cell(cell).and_then(|c| c.occupant.clone()) else {
            return Err(SessionError::bad_cell(cell, "nothing to use"));
        };

        let catalog = ctx.catalog;
        match occupant {
            Occupant::Enemy { enemy_id, health } => {
                catalog.enemy(&enemy_id)?;
                let cost = catalog.energy.fight;
                self.require_energy(cost)?;
                self.spend_energy(cost, ctx);
                self.engage(cell, enemy_id, health, ctx);
            }
            Occupant::Altar { altar_id } => {
                let altar = catalog.altar(&altar_id)?;
                let cost = catalog.energy.altar;
                self.require_energy(cost)?;
                self.spend_energy(cost, ctx);
                Resources::new(&mut self.state.user, &catalog.stats, ctx.events).apply_altar(
                    &altar_id,
                    altar,
                    &catalog.levels,
                );
                self.clear_occupant(cell);
            }
            Occupant::Trap { trap_id } => {
                let trap = catalog.trap(&trap_id)?;
                let cost = catalog.energy.trap;
                self.require_energy(cost)?;
                self.spend_energy(cost, ctx);
                Resources::new(&mut self.state.user, &catalog.stats, ctx.events)
                    .defuse_trap(&trap_id, trap);
                self.clear_occupant(cell);
            }
            Occupant::Loot { drop } => {
                let cost = catalog.energy.loot;
                self.require_energy(cost)?;
                self.spend_energy(cost, ctx);
                Resources::new(&mut self.state.user, &catalog.stats, ctx.events)
                    .collect(drop, &catalog.levels);
                self.clear_occupant(cell);
            }
        }
        Ok(())
    }

    pub fn allocate<R: RandomSource>(
        &mut self,
        attribute: Attribute,
        ctx: &mut ActionContext<'_, R>,
    ) -> Result<(), SessionError> {
        self.ensure_exploring()?;
        if self.state.user.unspent_points == 0 {
            return Err(SessionError::IncorrectArguments(
                "no unspent attribute points".to_string(),
            ));
        }
        let catalog = ctx.catalog;
        Resources::new(&mut self.state.user, &catalog.stats, ctx.events).allocate(attribute);
        Ok(())
    }

    pub(super) fn ensure_exploring(&self) -> Result<(), SessionError> {
        if self.in_combat() { Err(SessionError::InCombat) } else { Ok(()) }
    }

    fn ensure_exists(&self, cell: CellId) -> Result<(), SessionError> {
        if self.data.contains(cell) {
            Ok(())
        } else {
            Err(SessionError::bad_cell(cell, "does not exist"))
        }
    }

    fn require_energy(&self, required: u32) -> Result<(), SessionError> {
        let available = self.state.user.energy;
        if available < required {
            return Err(SessionError::NoEnergy { required, available });
        }
        Ok(())
    }

    fn spend_energy<R: RandomSource>(&mut self, cost: u32, ctx: &mut ActionContext<'_, R>) {
        if cost == 0 {
            return;
        }
        let catalog = ctx.catalog;
        Resources::new(&mut self.state.user, &catalog.stats, ctx.events)
            .modify_energy(-i64::from(cost));
    }

    fn clear_occupant(&mut self, cell: CellId) {
        if let Some(target) = self.data.cell_mut(cell) {
            target.occupant = None;
        }
    }

    /// Looks up every template the arrival needs so stepping cannot fail halfway.
    fn arrival(&self, cell: CellId, catalog: &GameCatalog) -> Result<Arrival, SessionError> {
        let occupant = self.data.cell(cell).and_then(|c| c.occupant.as_ref());
        Ok(match occupant {
            Some(Occupant::Enemy { enemy_id, health }) => {
                if catalog.enemy(enemy_id)?.aggressive {
                    Arrival::Ambush { enemy_id: enemy_id.clone(), health: *health }
                } else {
                    Arrival::Quiet
                }
            }
            Some(Occupant::Trap { trap_id }) => {
                catalog.trap(trap_id)?;
                Arrival::Trap { trap_id: trap_id.clone() }
            }
            _ => Arrival::Quiet,
        })
    }

    fn step_onto<R: RandomSource>(
        &mut self,
        cell: CellId,
        arrival: Arrival,
        ctx: &mut ActionContext<'_, R>,
    ) {
        let catalog = ctx.catalog;
        Resources::new(&mut self.state.user, &catalog.stats, ctx.events).move_to(cell);
        match arrival {
            Arrival::Quiet => {}
            Arrival::Ambush { enemy_id, health } => self.engage(cell, enemy_id, health, ctx),
            Arrival::Trap { trap_id } => self.pass_trap(cell, trap_id, ctx),
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::rng::{ScriptedRandom, seeded};
    use crate::session::test_support::{altar, corridor, enemy, fresh_document, run, trap};
    use crate::types::{LootDrop, LootKind};

    fn quiet() -> ScriptedRandom {
        ScriptedRandom::always_high()
    }

    #[test]
    fn reveal_moves_player_and_spends_energy() {
        let mut document = corridor(vec![None, None, None]);
        let events = run(&mut document, SessionAction::Reveal { cell: 1 }, &mut quiet()).unwrap();
        assert_eq!(document.state.revealed, vec![1]);
        assert_eq!(document.state.user.cell, 1);
        assert_eq!(document.state.user.energy, 29);
        assert_eq!(events[0], SessionEvent::EnergyChanged { energy: 29, max_energy: 30 });
        assert!(events.contains(&SessionEvent::CellRevealed { cell: 1 }));
        assert!(events.contains(&SessionEvent::PlayerMoved { cell: 1 }));
    }

    #[test]
    fn reveal_rejects_far_known_and_missing_cells() {
        let mut document = corridor(vec![None, None, None]);
        let before = document.clone();
        for cell in [2, 0, 99] {
            let err = run(&mut document, SessionAction::Reveal { cell }, &mut quiet()).unwrap_err();
            assert!(matches!(err, SessionError::IncorrectArguments(_)), "{cell}: {err}");
        }
        assert_eq!(document, before);
    }

    #[test]
    fn reveal_without_energy_fails_before_mutation() {
        let mut document = corridor(vec![None, None]);
        document.state.user.energy = 0;
        let before = document.clone();
        let err = run(&mut document, SessionAction::Reveal { cell: 1 }, &mut quiet()).unwrap_err();
        assert!(matches!(err, SessionError::NoEnergy { required: 1, available: 0 }));
        assert_eq!(document, before);
    }

    #[test]
    fn revealing_last_cell_flags_map() {
        let mut document = corridor(vec![None, None]);
        let events = run(&mut document, SessionAction::Reveal { cell: 1 }, &mut quiet()).unwrap();
        assert!(document.state.map_revealed);
        assert_eq!(events.last(), Some(&SessionEvent::MapRevealed));
    }

    #[test]
    fn aggressive_enemy_ambushes_on_reveal_but_passive_does_not() {
        let mut document = corridor(vec![None, enemy("slime", 10), enemy("bat", 6)]);
        run(&mut document, SessionAction::Reveal { cell: 1 }, &mut quiet()).unwrap();
        assert!(!document.in_combat());

        let events = run(&mut document, SessionAction::Reveal { cell: 2 }, &mut quiet()).unwrap();
        let combat = document.state.combat.as_ref().unwrap();
        assert_eq!((combat.cell, combat.enemy_health), (2, 6));
        assert!(events.iter().any(|e| matches!(e, SessionEvent::CombatStarted { cell: 2, .. })));
    }

    #[test]
    fn move_to_requires_revealed_destination() {
        let mut document = corridor(vec![None, None, None]);
        let err = run(&mut document, SessionAction::MoveTo { cell: 1 }, &mut quiet()).unwrap_err();
        assert!(matches!(err, SessionError::IncorrectArguments(_)));

        document.state.revealed = vec![1, 2];
        document.state.user.cell = 2;
        run(&mut document, SessionAction::MoveTo { cell: 0 }, &mut quiet()).unwrap();
        assert_eq!(document.state.user.cell, 0);
    }

    #[test]
    fn moving_onto_aggressive_enemy_forces_combat() {
        let mut document = corridor(vec![None, enemy("ogre", 30)]);
        document.state.revealed.push(1);
        run(&mut document, SessionAction::MoveTo { cell: 1 }, &mut quiet()).unwrap();
        assert!(document.in_combat());
    }

    #[test]
    fn use_cell_forces_trap_defusal_through_energy() {
        let mut document = corridor(vec![None, trap("pit")]);
        document.state.revealed.push(1);
        let events = run(&mut document, SessionAction::UseCell { cell: 1 }, &mut quiet()).unwrap();
        assert!(document.data.cells[1].occupant.is_none());
        assert_eq!(document.state.user.energy, 30 - 1 - 6);
        assert!(events.contains(&SessionEvent::TrapDefused {
            trap_id: "pit".into(),
            used_key: false,
            energy_lost: 6,
        }));
    }

    #[test]
    fn use_cell_applies_altar_and_collects_loot() {
        let drop = LootDrop { kind: LootKind::Potion, amount: 2 };
        let mut document =
            corridor(vec![None, altar("shrine"), Some(Occupant::Loot { drop })]);
        document.state.revealed = vec![1, 2];
        document.state.user.health = 5;

        run(&mut document, SessionAction::UseCell { cell: 1 }, &mut quiet()).unwrap();
        assert_eq!(document.state.user.health, 20);
        assert!(document.data.cells[1].occupant.is_none());

        let events = run(&mut document, SessionAction::UseCell { cell: 2 }, &mut quiet()).unwrap();
        assert_eq!(document.state.user.potions, 2);
        assert!(events.contains(&SessionEvent::LootCollected { drop }));
    }

    #[test]
    fn use_cell_on_empty_or_hidden_cell_is_rejected() {
        let mut document = corridor(vec![None, altar("spring")]);
        for cell in [0, 1] {
            let err =
                run(&mut document, SessionAction::UseCell { cell }, &mut quiet()).unwrap_err();
            assert!(matches!(err, SessionError::IncorrectArguments(_)));
        }
    }

    #[test]
    fn exploration_is_locked_while_in_combat() {
        let mut document = corridor(vec![None, enemy("slime", 10), None, altar("spring")]);
        document.state.revealed = vec![1, 2, 3];
        run(&mut document, SessionAction::UseCell { cell: 1 }, &mut quiet()).unwrap();
        assert!(document.in_combat());
        assert_eq!(document.state.user.energy, 28);

        let before = document.clone();
        for action in [
            SessionAction::Reveal { cell: 1 },
            SessionAction::MoveTo { cell: 2 },
            SessionAction::UseCell { cell: 3 },
            SessionAction::Allocate { attribute: Attribute::Strength },
        ] {
            let err = run(&mut document, action, &mut quiet()).unwrap_err();
            assert!(matches!(err, SessionError::InCombat), "{action:?}");
        }
        assert_eq!(document, before);
    }

    #[test]
    fn allocation_requires_unspent_points() {
        let mut document = corridor(vec![None]);
        let action = SessionAction::Allocate { attribute: Attribute::Intellect };
        assert!(run(&mut document, action, &mut quiet()).is_err());

        document.state.user.unspent_points = 1;
        run(&mut document, action, &mut quiet()).unwrap();
        assert_eq!(document.state.user.stats.intellect, 1);
        assert_eq!(document.state.user.unspent_points, 0);
    }

    proptest! {
        #[test]
        fn reveal_succeeds_only_on_hidden_connected_neighbors(
            seed in any::<u64>(),
            pick in any::<usize>(),
        ) {
            let mut document = fresh_document(seed);
            let cell = pick % document.data.cells.len();
            let player = document.state.user.cell;
            let valid = document.data.is_adjacent(player, cell) && !document.is_known(cell);
            let result = run(&mut document, SessionAction::Reveal { cell }, &mut seeded(seed));
            if valid {
                prop_assert!(result.is_ok());
                prop_assert_eq!(document.state.revealed.clone(), vec![cell]);
            } else {
                prop_assert!(matches!(result, Err(SessionError::IncorrectArguments(_))));
                prop_assert!(document.state.revealed.is_empty());
            }
        }
    }
}
