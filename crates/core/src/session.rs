//! Per-player session: the persisted document, its state transitions and the
//! controller that loads, mutates and saves it.
//!
//! Every transition is a function of `(document, action, context)`. It either
//! validates and applies the whole action, pushing events into the context's
//! batch, or returns an error before touching the document.

mod actions;
mod controller;
mod encounter;
mod error;
mod rollover;
mod state;
mod store;
mod traps;

pub use controller::SessionController;
pub use error::SessionError;
pub use state::{CellView, PlayerView, SessionDocument, SessionSnapshot, SessionState};
pub use store::{MemoryStore, SessionStore, StoreError};

use serde::{Deserialize, Serialize};

use crate::catalog::GameCatalog;
use crate::events::EventBatch;
use crate::rng::RandomSource;
use crate::types::{Attribute, CellId, CombatMove};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum CombatAction {
    Attack { mv: CombatMove },
    UsePotion,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionAction {
    Reveal { cell: CellId },
    MoveTo { cell: CellId },
    UseCell { cell: CellId },
    Combat { action: CombatAction },
    Allocate { attribute: Attribute },
}

/// Everything a transition may read or consume besides the document itself.
pub struct ActionContext<'a, R: RandomSource> {
    pub catalog: &'a GameCatalog,
    pub rng: &'a mut R,
    pub now_unix_ms: u64,
    pub events: &'a mut EventBatch,
}

impl<'a, R: RandomSource> ActionContext<'a, R> {
    pub fn new(
        catalog: &'a GameCatalog,
        rng: &'a mut R,
        now_unix_ms: u64,
        events: &'a mut EventBatch,
    ) -> Self {
        Self { catalog, rng, now_unix_ms, events }
    }
}

impl SessionDocument {
    pub fn apply<R: RandomSource>(
        &mut self,
        action: SessionAction,
        ctx: &mut ActionContext<'_, R>,
    ) -> Result<(), SessionError> {
        let stats = &ctx.catalog.stats;
        let user = &self.state.user;
        let health_full = user.health >= user.max_health(stats);
        let energy_full = user.energy >= user.max_energy(stats);

        match action {
            SessionAction::Reveal { cell } => self.reveal(cell, ctx),
            SessionAction::MoveTo { cell } => self.move_to(cell, ctx),
            SessionAction::UseCell { cell } => self.use_cell(cell, ctx),
            SessionAction::Combat { action } => self.combat_action(action, ctx),
            SessionAction::Allocate { attribute } => self.allocate(attribute, ctx),
        }?;

        // Regeneration counts from the moment a full pool is first drawn down.
        if health_full {
            self.state.user.last_hp_regen = ctx.now_unix_ms;
        }
        if energy_full {
            self.state.user.last_energy_regen = ctx.now_unix_ms;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test_support;
