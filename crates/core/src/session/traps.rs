//! Jam check for traps the player merely walks onto.
//! Forced defusal through `use_cell` lives with the other cell actions.

use super::*;
use crate::events::SessionEvent;
use crate::types::TrapId;

impl SessionDocument {
    /// Rolls the jam chance for the active counter. A jam clears the trap for
    /// free and resets the counter; a miss leaves the trap armed and bumps the
    /// counter, never past the last table index.
    pub(super) fn pass_trap<R: RandomSource>(
        &mut self,
        cell: CellId,
        trap_id: TrapId,
        ctx: &mut ActionContext<'_, R>,
    ) {
        let catalog = ctx.catalog;
        let max_counter = catalog.max_jam_counter();
        let counter = if self.state.map_revealed {
            &mut self.state.def_revealed
        } else {
            &mut self.state.def_hidden
        };
        let current = (*counter).min(max_counter);
        let jam_chance = catalog.jam_chance(current);

        if ctx.rng.chance(jam_chance) {
            *counter = 0;
            if let Some(target) = self.data.cell_mut(cell) {
                target.occupant = None;
            }
            tracing::debug!(cell, %trap_id, jam_chance, "trap jammed");
            ctx.events.push(SessionEvent::TrapJammed { cell, trap_id });
        } else {
            *counter = (current + 1).min(max_counter);
            tracing::debug!(cell, %trap_id, jam_chance, counter = *counter, "trap stays armed");
            ctx.events.push(SessionEvent::TrapArmed { cell, trap_id, jam_chance });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedRandom;
    use crate::session::test_support::{corridor, run, trap};

    #[test]
    fn jammed_trap_is_cleared_and_counter_reset() {
        let mut document = corridor(vec![None, trap("spikes")]);
        document.state.def_hidden = 2;
        let events =
            run(&mut document, SessionAction::Reveal { cell: 1 }, &mut ScriptedRandom::always_low())
                .unwrap();
        assert_eq!(document.state.def_hidden, 0);
        assert!(document.data.cells[1].occupant.is_none());
        assert!(events.contains(&SessionEvent::TrapJammed { cell: 1, trap_id: "spikes".into() }));
    }

    #[test]
    fn failed_roll_leaves_trap_and_increments_counter() {
        let mut document = corridor(vec![None, trap("spikes"), None]);
        run(&mut document, SessionAction::Reveal { cell: 1 }, &mut ScriptedRandom::always_high())
            .unwrap();
        assert_eq!(document.state.def_hidden, 1);
        assert!(document.data.cells[1].occupant.is_some());
        assert_eq!(document.state.user.energy, 29);
    }

    #[test]
    fn counter_never_exceeds_last_table_index() {
        let catalog = GameCatalog::build_default();
        let last = catalog.max_jam_counter();
        let mut document = corridor(vec![None, trap("spikes")]);
        document.state.revealed.push(1);
        document.state.def_hidden = last;

        let mut rng = ScriptedRandom::always_high();
        run(&mut document, SessionAction::MoveTo { cell: 1 }, &mut rng).unwrap();
        assert_eq!(document.state.def_hidden, last);
        run(&mut document, SessionAction::MoveTo { cell: 0 }, &mut rng).unwrap();
        let events = run(&mut document, SessionAction::MoveTo { cell: 1 }, &mut rng).unwrap();
        assert_eq!(document.state.def_hidden, last);
        let floor_chance = catalog.jam_chances[last as usize];
        assert!(events.iter().any(|event| matches!(
            event,
            SessionEvent::TrapArmed { jam_chance, .. } if *jam_chance == floor_chance
        )));
    }

    #[test]
    fn revealed_map_uses_the_revealed_counter() {
        let mut document = corridor(vec![None, trap("pit")]);
        document.state.revealed.push(1);
        document.state.map_revealed = true;
        run(&mut document, SessionAction::MoveTo { cell: 1 }, &mut ScriptedRandom::always_high())
            .unwrap();
        assert_eq!((document.state.def_hidden, document.state.def_revealed), (0, 1));
    }
}
