//! Public data models for generated floors: cells, occupants and the floor graph.

use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::xxh3_64;

use crate::types::{AltarId, CellId, EnemyId, LootDrop, LootKind, TrapId};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Occupant {
    /// `health` is the enemy's remaining health on this floor, which outlives a lost fight.
    Enemy { enemy_id: EnemyId, health: u32 },
    Loot { drop: LootDrop },
    Altar { altar_id: AltarId },
    Trap { trap_id: TrapId },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub x: usize,
    pub y: usize,
    pub connections: Vec<CellId>,
    #[serde(default)]
    pub occupant: Option<Occupant>,
}

impl Cell {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y, connections: Vec::new(), occupant: None }
    }

    pub fn is_connected(&self, other: CellId) -> bool {
        self.connections.contains(&other)
    }

    pub fn enemy(&self) -> Option<(&EnemyId, u32)> {
        match &self.occupant {
            Some(Occupant::Enemy { enemy_id, health }) => Some((enemy_id, *health)),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloorData {
    pub width: usize,
    pub height: usize,
    pub start: CellId,
    pub cells: Vec<Cell>,
}

impl FloorData {
    pub fn cell(&self, id: CellId) -> Option<&Cell> {
        self.cells.get(id)
    }

    pub fn cell_mut(&mut self, id: CellId) -> Option<&mut Cell> {
        self.cells.get_mut(id)
    }

    pub fn contains(&self, id: CellId) -> bool {
        id < self.cells.len()
    }

    pub fn neighbors(&self, id: CellId) -> &[CellId] {
        self.cells.get(id).map_or(&[], |cell| cell.connections.as_slice())
    }

    pub fn is_adjacent(&self, a: CellId, b: CellId) -> bool {
        self.cells.get(a).is_some_and(|cell| cell.is_connected(b))
    }

    pub fn cell_id_at(&self, x: usize, y: usize) -> Option<CellId> {
        (x < self.width && y < self.height).then_some(y * self.width + x)
    }

    pub fn enemy_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.enemy().is_some()).count()
    }

    pub fn edge_count(&self) -> usize {
        self.cells.iter().map(|cell| cell.connections.len()).sum::<usize>() / 2
    }

    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend((self.width as u32).to_le_bytes());
        bytes.extend((self.height as u32).to_le_bytes());
        bytes.extend((self.start as u32).to_le_bytes());
        for cell in &self.cells {
            let mut connections = cell.connections.clone();
            connections.sort_unstable();
            bytes.push(connections.len() as u8);
            for id in connections {
                bytes.extend((id as u32).to_le_bytes());
            }
            match &cell.occupant {
                None => bytes.push(0),
                Some(Occupant::Enemy { enemy_id, health }) => {
                    bytes.push(1);
                    bytes.extend(enemy_id.as_str().as_bytes());
                    bytes.extend(health.to_le_bytes());
                }
                Some(Occupant::Loot { drop }) => {
                    bytes.push(2);
                    bytes.push(match drop.kind {
                        LootKind::Key => 0,
                        LootKind::Potion => 1,
                        LootKind::Scroll => 2,
                        LootKind::Experience => 3,
                    });
                    bytes.extend(drop.amount.to_le_bytes());
                }
                Some(Occupant::Altar { altar_id }) => {
                    bytes.push(3);
                    bytes.extend(altar_id.as_str().as_bytes());
                }
                Some(Occupant::Trap { trap_id }) => {
                    bytes.push(4);
                    bytes.extend(trap_id.as_str().as_bytes());
                }
            }
        }
        bytes
    }

    pub fn fingerprint(&self) -> u64 {
        xxh3_64(&self.canonical_bytes())
    }
}

/// What generation could not place. Quotas larger than the maze are under-populated, not rejected.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GenerationReport {
    pub enemies_requested: usize,
    pub enemies_placed: usize,
    pub loot_requested: usize,
    pub loot_placed: usize,
    /// Enemy slots whose difficulty tier has no template in the roster.
    pub unmatched_difficulties: Vec<u8>,
    /// Cell ids in placement order, nearest to the start first.
    pub enemy_cells: Vec<CellId>,
    /// Walk distance of every placed enemy, parallel to `enemy_cells`.
    pub enemy_distances: Vec<usize>,
    pub spacing: usize,
}

impl GenerationReport {
    pub fn is_fully_populated(&self) -> bool {
        self.enemies_placed == self.enemies_requested
            && self.loot_placed == self.loot_requested
            && self.unmatched_difficulties.is_empty()
    }
}
