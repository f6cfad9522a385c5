//! High-level floor generation orchestration that composes carving and placement.

use crate::catalog::FloorConfig;
use crate::rng::RandomSource;

use super::grid::build_cells;
use super::layout::{add_extra_passages, carve_spanning_tree};
use super::model::{FloorData, GenerationReport};
use super::spawns::{
    EnemyRoster, expand_enemy_order, place_enemies, place_loot, resolve_enemies, walk_order,
};

pub struct MapGenerator<'a> {
    config: &'a FloorConfig,
    roster: &'a EnemyRoster,
}

impl<'a> MapGenerator<'a> {
    pub fn new(config: &'a FloorConfig, roster: &'a EnemyRoster) -> Self {
        Self { config, roster }
    }

    pub fn generate(&self, rng: &mut impl RandomSource) -> FloorData {
        self.generate_with_report(rng).0
    }

    pub fn generate_with_report(
        &self,
        rng: &mut impl RandomSource,
    ) -> (FloorData, GenerationReport) {
        let width = self.config.width.max(1);
        let height = self.config.height.max(1);
        let mut cells = build_cells(width, height);
        let start = rng.below(cells.len());

        carve_spanning_tree(&mut cells, width, height, start, rng);
        let passages = add_extra_passages(
            &mut cells,
            width,
            height,
            self.config.passage_base_chance,
            self.config.passage_chance_step,
            rng,
        );

        let order = expand_enemy_order(&self.config.enemies);
        let (enemies, unmatched_difficulties) = resolve_enemies(&order, self.roster, rng);
        let walk = walk_order(&cells, start, rng);
        let placement = place_enemies(&mut cells, &walk, enemies);
        let loot_placed = place_loot(&mut cells, &placement.loot_candidates, &self.config.loot);

        let report = GenerationReport {
            enemies_requested: order.len(),
            enemies_placed: placement.placed.len(),
            loot_requested: self.config.loot.len(),
            loot_placed,
            unmatched_difficulties,
            enemy_cells: placement.placed.iter().map(|&(cell, _)| cell).collect(),
            enemy_distances: placement.placed.iter().map(|&(_, distance)| distance).collect(),
            spacing: placement.spacing,
        };

        if !report.is_fully_populated() {
            tracing::warn!(
                enemies_requested = report.enemies_requested,
                enemies_placed = report.enemies_placed,
                loot_requested = report.loot_requested,
                loot_placed = report.loot_placed,
                unmatched = ?report.unmatched_difficulties,
                "floor quota could not be fully placed"
            );
        }
        tracing::debug!(width, height, start, passages, "generated floor");

        (FloorData { width, height, start, cells }, report)
    }
}
