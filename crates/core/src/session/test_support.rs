//! Hand-built documents for transition tests.

use super::*;
use crate::events::SessionEvent;
use crate::mapgen::{Cell, FloorData, Occupant};
use crate::resources::PlayerState;
use crate::rng::seeded;
use crate::session::state::SessionState;

pub(crate) const DAY_MS: u64 = 24 * 60 * 60 * 1000;

/// A generated floor-one document created at time zero.
pub(crate) fn fresh_document(seed: u64) -> SessionDocument {
    let catalog = GameCatalog::build_default();
    let mut rng = seeded(seed);
    let mut events = EventBatch::new();
    let mut ctx = ActionContext::new(&catalog, &mut rng, 0, &mut events);
    SessionDocument::create(&mut ctx).unwrap()
}

/// A one-row corridor starting at cell 0 with the given occupants.
pub(crate) fn corridor(occupants: Vec<Option<Occupant>>) -> SessionDocument {
    let catalog = GameCatalog::build_default();
    let len = occupants.len();
    let cells = occupants
        .into_iter()
        .enumerate()
        .map(|(x, occupant)| {
            let mut cell = Cell::new(x, 0);
            if x > 0 {
                cell.connections.push(x - 1);
            }
            if x + 1 < len {
                cell.connections.push(x + 1);
            }
            cell.occupant = occupant;
            cell
        })
        .collect();
    SessionDocument {
        state: SessionState {
            floor: 1,
            cycle: 0,
            map_revealed: false,
            revealed: Vec::new(),
            def_hidden: 0,
            def_revealed: 0,
            combat: None,
            user: PlayerState::fresh(&catalog.stats, 0, 0),
        },
        data: FloorData { width: len, height: 1, start: 0, cells },
    }
}

pub(crate) fn enemy(id: &str, health: u32) -> Option<Occupant> {
    Some(Occupant::Enemy { enemy_id: id.into(), health })
}

pub(crate) fn trap(id: &str) -> Option<Occupant> {
    Some(Occupant::Trap { trap_id: id.into() })
}

pub(crate) fn altar(id: &str) -> Option<Occupant> {
    Some(Occupant::Altar { altar_id: id.into() })
}

/// Applies `action` with a throwaway event batch, returning the events on success.
pub(crate) fn run(
    document: &mut SessionDocument,
    action: SessionAction,
    rng: &mut impl RandomSource,
) -> Result<Vec<SessionEvent>, SessionError> {
    let catalog = GameCatalog::build_default();
    let mut events = EventBatch::new();
    let mut ctx = ActionContext::new(&catalog, rng, 0, &mut events);
    document.apply(action, &mut ctx)?;
    Ok(events.take())
}
