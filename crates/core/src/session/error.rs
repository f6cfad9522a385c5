use crate::catalog::CatalogError;
use crate::session::store::StoreError;

/// Failures surfaced to the caller of a controller method. Every variant is
/// raised before the session document is touched.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("incorrect arguments: {0}")]
    IncorrectArguments(String),
    #[error("not enough energy: {required} required, {available} available")]
    NoEnergy { required: u32, available: u32 },
    #[error("action is not allowed while in combat")]
    InCombat,
    #[error("no combat in progress")]
    NotInCombat,
    #[error("session has not been initialised")]
    NotLoaded,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl SessionError {
    pub(crate) fn bad_cell(cell: usize, reason: &str) -> Self {
        Self::IncorrectArguments(format!("cell {cell}: {reason}"))
    }
}
