//! Floor lifecycle: first-time creation, daily rollover, floor advancement and
//! time-based regeneration.
//! This module exists to keep wholesale floor replacement in one place.
//! It does not own per-action validation.

use super::*;
use crate::events::SessionEvent;
use crate::mapgen::{FloorData, generate_floor};
use crate::resources::{PlayerState, Resources};
use crate::session::state::SessionState;

impl SessionDocument {
    /// A brand-new session on floor one of the current cycle.
    pub fn create<R: RandomSource>(ctx: &mut ActionContext<'_, R>) -> Result<Self, SessionError> {
        let catalog = ctx.catalog;
        let cycle = catalog.mode.cycle_at(ctx.now_unix_ms);
        let data = generate_floor(catalog, 1, ctx.rng)?;
        let user = PlayerState::fresh(&catalog.stats, data.start, ctx.now_unix_ms);
        tracing::info!(cycle, start = data.start, "created session");
        ctx.events.push(SessionEvent::FloorGenerated { floor: 1, cycle, cells: data.cells.len() });
        Ok(Self {
            state: SessionState {
                floor: 1,
                cycle,
                map_revealed: false,
                revealed: Vec::new(),
                def_hidden: 0,
                def_revealed: 0,
                combat: None,
                user,
            },
            data,
        })
    }

    /// Entry point for a stored document: rolls the day over if the cycle
    /// changed, otherwise applies elapsed regeneration.
    pub fn refresh<R: RandomSource>(
        &mut self,
        ctx: &mut ActionContext<'_, R>,
    ) -> Result<(), SessionError> {
        if !self.roll_over(ctx)? {
            self.regenerate(ctx);
        }
        Ok(())
    }

    /// Returns `true` when the stored cycle was stale and the floor was rebuilt.
    /// Level, experience and allocated attributes survive the rollover.
    pub fn roll_over<R: RandomSource>(
        &mut self,
        ctx: &mut ActionContext<'_, R>,
    ) -> Result<bool, SessionError> {
        let catalog = ctx.catalog;
        let cycle = catalog.mode.cycle_at(ctx.now_unix_ms);
        if cycle == self.state.cycle {
            return Ok(false);
        }
        let data = generate_floor(catalog, 1, ctx.rng)?;
        tracing::info!(from = self.state.cycle, to = cycle, "daily rollover");

        self.state.cycle = cycle;
        self.state.def_hidden = 0;
        self.state.def_revealed = 0;
        self.state.combat = None;
        let user = &mut self.state.user;
        user.keys = 0;
        user.potions = 0;
        user.scrolls = 0;
        user.last_hp_regen = ctx.now_unix_ms;
        user.last_energy_regen = ctx.now_unix_ms;
        self.install_floor(1, cycle, data, ctx);

        let mut resources = Resources::new(&mut self.state.user, &catalog.stats, ctx.events);
        resources.restore_full();
        Ok(true)
    }

    pub fn regenerate<R: RandomSource>(&mut self, ctx: &mut ActionContext<'_, R>) {
        let catalog = ctx.catalog;
        Resources::new(&mut self.state.user, &catalog.stats, ctx.events)
            .regenerate(ctx.now_unix_ms, &catalog.mode);
    }

    /// Moves to the next floor once the current one has no enemies left.
    /// Returns `false` on the final floor.
    pub(super) fn advance_floor<R: RandomSource>(
        &mut self,
        ctx: &mut ActionContext<'_, R>,
    ) -> Result<bool, SessionError> {
        let catalog = ctx.catalog;
        if self.data.enemy_count() > 0 || self.state.floor >= catalog.mode.max_floor {
            return Ok(false);
        }
        let next = self.state.floor + 1;
        let data = generate_floor(catalog, next, ctx.rng)?;
        tracing::info!(floor = next, "floor cleared, descending");
        self.install_floor(next, self.state.cycle, data, ctx);
        Ok(true)
    }

    fn install_floor<R: RandomSource>(
        &mut self,
        floor: u32,
        cycle: u64,
        data: FloorData,
        ctx: &mut ActionContext<'_, R>,
    ) {
        ctx.events.push(SessionEvent::FloorGenerated { floor, cycle, cells: data.cells.len() });
        self.state.floor = floor;
        self.state.map_revealed = false;
        self.state.revealed.clear();
        self.state.user.cell = data.start;
        ctx.events.push(SessionEvent::PlayerMoved { cell: data.start });
        self.data = data;
    }
}
