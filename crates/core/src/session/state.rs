//! Persisted session document and the read-only snapshot handed back to callers.

use std::iter;

use serde::{Deserialize, Serialize};

use crate::catalog::GameCatalog;
use crate::combat::CombatSession;
use crate::mapgen::{FloorData, Occupant};
use crate::resources::{Attributes, PlayerState};
use crate::types::CellId;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub floor: u32,
    pub cycle: u64,
    pub map_revealed: bool,
    /// Append-only reveal log. The start cell is known without being listed.
    pub revealed: Vec<CellId>,
    pub def_hidden: u32,
    pub def_revealed: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub combat: Option<CombatSession>,
    pub user: PlayerState,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDocument {
    pub state: SessionState,
    pub data: FloorData,
}

impl SessionDocument {
    pub fn in_combat(&self) -> bool {
        self.state.combat.is_some()
    }

    /// The start cell and every revealed cell.
    pub fn is_known(&self, cell: CellId) -> bool {
        cell == self.data.start || self.state.revealed.contains(&cell)
    }

    pub fn known_cells(&self) -> impl Iterator<Item = CellId> + '_ {
        iter::once(self.data.start).chain(self.state.revealed.iter().copied())
    }

    pub fn all_cells_known(&self) -> bool {
        self.state.revealed.len() + 1 >= self.data.cells.len()
    }

    pub fn snapshot(&self, catalog: &GameCatalog) -> SessionSnapshot {
        let user = &self.state.user;
        let stats = &catalog.stats;
        let player = PlayerView {
            cell: user.cell,
            health: user.health,
            max_health: user.max_health(stats),
            energy: user.energy,
            max_energy: user.max_energy(stats),
            attack: user.attack(stats),
            defense: user.defense(stats),
            level: user.level,
            exp: user.exp,
            unspent_points: user.unspent_points,
            stats: user.stats,
            keys: user.keys,
            potions: user.potions,
            scrolls: user.scrolls,
        };
        let cells = self
            .known_cells()
            .filter_map(|id| {
                self.data.cell(id).map(|cell| CellView {
                    id,
                    x: cell.x,
                    y: cell.y,
                    connections: cell.connections.clone(),
                    occupant: cell.occupant.clone(),
                })
            })
            .collect();
        SessionSnapshot {
            floor: self.state.floor,
            cycle: self.state.cycle,
            map_revealed: self.state.map_revealed,
            width: self.data.width,
            height: self.data.height,
            start: self.data.start,
            player,
            combat: self.state.combat.clone(),
            cells,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PlayerView {
    pub cell: CellId,
    pub health: u32,
    pub max_health: u32,
    pub energy: u32,
    pub max_energy: u32,
    pub attack: u32,
    pub defense: u32,
    pub level: u32,
    pub exp: u32,
    pub unspent_points: u32,
    pub stats: Attributes,
    pub keys: u32,
    pub potions: u32,
    pub scrolls: u32,
}

/// A known cell as the player sees it. Hidden cells are never exposed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CellView {
    pub id: CellId,
    pub x: usize,
    pub y: usize,
    pub connections: Vec<CellId>,
    pub occupant: Option<Occupant>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub floor: u32,
    pub cycle: u64,
    pub map_revealed: bool,
    pub width: usize,
    pub height: usize,
    pub start: CellId,
    pub player: PlayerView,
    pub combat: Option<CombatSession>,
    pub cells: Vec<CellView>,
}

impl SessionSnapshot {
    pub fn cell(&self, id: CellId) -> Option<&CellView> {
        self.cells.iter().find(|cell| cell.id == id)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::session::test_support::fresh_document;

    #[test]
    fn document_serializes_in_persisted_shape() {
        let document = fresh_document(7);
        let value = serde_json::to_value(&document).unwrap();
        assert_eq!(value["state"]["floor"], json!(1));
        assert_eq!(value["state"]["mapRevealed"], json!(false));
        assert_eq!(value["state"]["defHidden"], json!(0));
        assert_eq!(value["state"]["user"]["stats"]["str"], json!(2));
        assert!(value["state"]["user"]["lastHpRegen"].is_u64());
        assert!(value["state"].get("combat").is_none());
        assert_eq!(value["data"]["width"], json!(document.data.width));

        let back: SessionDocument = serde_json::from_value(value).unwrap();
        assert_eq!(back, document);
    }

    #[test]
    fn snapshot_only_exposes_known_cells() {
        let document = fresh_document(7);
        let snapshot = document.snapshot(&GameCatalog::build_default());
        assert_eq!(snapshot.cells.len(), 1);
        assert_eq!(snapshot.cells[0].id, document.data.start);
        assert_eq!(snapshot.player.health, snapshot.player.max_health);
    }
}
