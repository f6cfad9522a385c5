//! Stateful driver around the transition core: loads the document, applies one
//! action to a working copy, saves it and flushes the event batch.

use super::*;
use crate::catalog::CatalogProvider;
use crate::clock::Clock;
use crate::events::EventSink;
use crate::types::PlayerId;

pub struct SessionController<S, C, K, E, R>
where
    S: SessionStore,
    C: CatalogProvider,
    K: Clock,
    E: EventSink,
    R: RandomSource,
{
    player: PlayerId,
    store: S,
    catalog: C,
    clock: K,
    sink: E,
    rng: R,
    document: Option<SessionDocument>,
}

impl<S, C, K, E, R> SessionController<S, C, K, E, R>
where
    S: SessionStore,
    C: CatalogProvider,
    K: Clock,
    E: EventSink,
    R: RandomSource,
{
    pub fn new(player: PlayerId, store: S, catalog: C, clock: K, sink: E, rng: R) -> Self {
        Self { player, store, catalog, clock, sink, rng, document: None }
    }

    pub fn player(&self) -> &PlayerId {
        &self.player
    }

    pub fn document(&self) -> Option<&SessionDocument> {
        self.document.as_ref()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn sink(&self) -> &E {
        &self.sink
    }

    /// Opens the session from the store, creating it on first use and rolling
    /// it over when the stored cycle is stale.
    pub fn init(&mut self) -> Result<SessionSnapshot, SessionError> {
        let span = tracing::info_span!("session", player = %self.player);
        let _guard = span.enter();
        let stored = self.store.load(&self.player)?;
        self.open(stored)
    }

    /// Re-applies rollover and regeneration to the open session.
    pub fn load(&mut self) -> Result<SessionSnapshot, SessionError> {
        let span = tracing::info_span!("session", player = %self.player);
        let _guard = span.enter();
        let current = self.document.clone().ok_or(SessionError::NotLoaded)?;
        self.open(Some(current))
    }

    pub fn reveal(&mut self, cell: CellId) -> Result<SessionSnapshot, SessionError> {
        self.dispatch(SessionAction::Reveal { cell })
    }

    pub fn move_to(&mut self, cell: CellId) -> Result<SessionSnapshot, SessionError> {
        self.dispatch(SessionAction::MoveTo { cell })
    }

    pub fn use_cell(&mut self, cell: CellId) -> Result<SessionSnapshot, SessionError> {
        self.dispatch(SessionAction::UseCell { cell })
    }

    pub fn combat_action(&mut self, action: CombatAction) -> Result<SessionSnapshot, SessionError> {
        self.dispatch(SessionAction::Combat { action })
    }

    pub fn allocate(&mut self, attribute: Attribute) -> Result<SessionSnapshot, SessionError> {
        self.dispatch(SessionAction::Allocate { attribute })
    }

    /// Persists the open session one last time and releases it.
    pub fn dispose(&mut self) -> Result<SessionSnapshot, SessionError> {
        let document = self.document.take().ok_or(SessionError::NotLoaded)?;
        if let Err(err) = self.store.save(&self.player, &document) {
            self.document = Some(document);
            return Err(err.into());
        }
        tracing::info!(player = %self.player, "session disposed");
        Ok(document.snapshot(self.catalog.get_meta()))
    }

    pub fn dispatch(&mut self, action: SessionAction) -> Result<SessionSnapshot, SessionError> {
        let span = tracing::info_span!("session", player = %self.player);
        let _guard = span.enter();
        let mut next = self.document.clone().ok_or(SessionError::NotLoaded)?;
        let mut events = EventBatch::new();
        let catalog = self.catalog.get_meta();
        let mut ctx =
            ActionContext::new(catalog, &mut self.rng, self.clock.now_unix_ms(), &mut events);
        if let Err(err) = next.apply(action, &mut ctx) {
            tracing::debug!(?action, %err, "action rejected");
            return Err(err);
        }
        self.commit(next, events)
    }

    fn open(&mut self, stored: Option<SessionDocument>) -> Result<SessionSnapshot, SessionError> {
        let mut events = EventBatch::new();
        let catalog = self.catalog.get_meta();
        let mut ctx =
            ActionContext::new(catalog, &mut self.rng, self.clock.now_unix_ms(), &mut events);
        let document = match stored {
            Some(mut document) => {
                document.refresh(&mut ctx)?;
                document
            }
            None => SessionDocument::create(&mut ctx)?,
        };
        self.commit(document, events)
    }

    fn commit(
        &mut self,
        document: SessionDocument,
        mut events: EventBatch,
    ) -> Result<SessionSnapshot, SessionError> {
        self.store.save(&self.player, &document)?;
        let snapshot = document.snapshot(self.catalog.get_meta());
        self.document = Some(document);
        self.sink.flush(events.take());
        Ok(snapshot)
    }
}
