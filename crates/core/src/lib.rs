pub mod catalog;
pub mod clock;
pub mod combat;
pub mod events;
pub mod mapgen;
pub mod resources;
pub mod rng;
pub mod session;
pub mod types;

pub use catalog::{CatalogError, CatalogProvider, GameCatalog};
pub use clock::{Clock, FixedClock, SystemClock};
pub use combat::{CombatSession, Encounter, Outcome};
pub use events::{EventBatch, EventSink, RecordingSink, SessionEvent, TracingSink};
pub use mapgen::{FloorData, GenerationReport, MapGenerator, Occupant, generate_floor};
pub use resources::{PlayerState, Resources};
pub use rng::{RandomSource, ScriptedRandom};
pub use session::{
    CombatAction, MemoryStore, SessionAction, SessionController, SessionDocument, SessionError,
    SessionSnapshot, SessionStore, StoreError,
};
pub use types::*;
