//! Persistence seam for session documents.
//! The core only ships an in-memory store; file-backed stores live with the binaries.

use std::collections::HashMap;
use std::io;

use crate::session::state::SessionDocument;
use crate::types::PlayerId;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("session store backend failed: {0}")]
    Backend(String),
    #[error("session store io failed")]
    Io(#[from] io::Error),
    #[error("malformed session document")]
    Malformed(#[from] serde_json::Error),
}

pub trait SessionStore {
    fn load(&mut self, player: &PlayerId) -> Result<Option<SessionDocument>, StoreError>;
    fn save(&mut self, player: &PlayerId, document: &SessionDocument) -> Result<(), StoreError>;
}

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    documents: HashMap<PlayerId, SessionDocument>,
    saves: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, player: &PlayerId) -> Option<&SessionDocument> {
        self.documents.get(player)
    }

    pub fn insert(&mut self, player: PlayerId, document: SessionDocument) {
        self.documents.insert(player, document);
    }

    /// Number of successful saves, used to check that failed actions persist nothing.
    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl SessionStore for MemoryStore {
    fn load(&mut self, player: &PlayerId) -> Result<Option<SessionDocument>, StoreError> {
        Ok(self.documents.get(player).cloned())
    }

    fn save(&mut self, player: &PlayerId, document: &SessionDocument) -> Result<(), StoreError> {
        self.documents.insert(player.clone(), document.clone());
        self.saves += 1;
        Ok(())
    }
}

impl<S: SessionStore + ?Sized> SessionStore for &mut S {
    fn load(&mut self, player: &PlayerId) -> Result<Option<SessionDocument>, StoreError> {
        (**self).load(player)
    }

    fn save(&mut self, player: &PlayerId, document: &SessionDocument) -> Result<(), StoreError> {
        (**self).save(player, document)
    }
}
