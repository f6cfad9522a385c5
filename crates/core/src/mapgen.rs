//! Procedural floor generation split into carving, placement and data models.

pub mod model;

mod generator;
mod grid;
mod layout;
mod spawns;

pub use generator::MapGenerator;
pub use model::{Cell, FloorData, GenerationReport, Occupant};
pub use spawns::EnemyRoster;

use crate::catalog::{CatalogError, GameCatalog};
use crate::rng::RandomSource;

/// Generates the given floor number using the catalog's parameters and enemy roster.
pub fn generate_floor(
    catalog: &GameCatalog,
    floor: u32,
    rng: &mut impl RandomSource,
) -> Result<FloorData, CatalogError> {
    let config = catalog.floor_config(floor)?;
    let roster = EnemyRoster::from_templates(&catalog.enemies);
    Ok(MapGenerator::new(config, &roster).generate(rng))
}
