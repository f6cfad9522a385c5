//! Externally supplied meta catalog: energy prices, mode settings, stat formulas,
//! per-floor generation knobs and the enemy/altar/trap template tables.
//!
//! The catalog is read-only once loaded. Sessions reference templates by id and
//! only snapshot enemy health, which can diverge per player.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{AltarId, CombatMove, EnemyId, LootDrop, LootKind, TrapId};

mod defaults;

/// Source of the meta catalog, injected once at controller construction.
pub trait CatalogProvider {
    fn get_meta(&self) -> &GameCatalog;
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog could not be parsed: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("no generation parameters for floor {0}")]
    UnknownFloor(u32),
    #[error("unknown enemy template '{0}'")]
    UnknownEnemy(EnemyId),
    #[error("unknown altar template '{0}'")]
    UnknownAltar(AltarId),
    #[error("unknown trap template '{0}'")]
    UnknownTrap(TrapId),
    #[error("trap jam table must contain at least one entry")]
    EmptyJamTable,
    #[error("invalid catalog entry: {0}")]
    Invalid(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnergyCosts {
    pub reveal: u32,
    pub move_to: u32,
    pub fight: u32,
    pub altar: u32,
    pub trap: u32,
    pub loot: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegenRule {
    pub interval_ms: u64,
    pub amount: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeSettings {
    pub max_floor: u32,
    /// Length of one reward cycle; the cycle id is `now / cycle_length_ms`.
    pub cycle_length_ms: u64,
    pub health_regen: RegenRule,
    pub energy_regen: RegenRule,
    pub potion_heal: u32,
}

impl ModeSettings {
    pub fn cycle_at(&self, now_unix_ms: u64) -> u64 {
        now_unix_ms / self.cycle_length_ms.max(1)
    }
}

/// Linear coefficients turning allocated attributes into derived stats.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatFormulas {
    pub base_health: u32,
    pub health_per_stamina: u32,
    pub health_per_level: u32,
    pub base_energy: u32,
    pub energy_per_intellect: u32,
    pub base_attack: u32,
    pub attack_per_strength: u32,
    pub base_defense: u32,
    pub defense_per_dexterity: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelTable {
    /// Experience granted for a kill, indexed by difficulty tier (clamped).
    pub exp_by_difficulty: Vec<u32>,
    pub exp_per_level: u32,
    pub points_per_level: u32,
}

impl LevelTable {
    pub fn exp_for_difficulty(&self, difficulty: u8) -> u32 {
        if self.exp_by_difficulty.is_empty() {
            return 0;
        }
        let index = usize::from(difficulty).min(self.exp_by_difficulty.len() - 1);
        self.exp_by_difficulty[index]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemyQuota {
    pub difficulty: u8,
    pub count: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LootEntry {
    Item { kind: LootKind, amount: u32 },
    Altar { id: AltarId },
    Trap { id: TrapId },
}

impl LootEntry {
    pub fn item(kind: LootKind, amount: u32) -> Self {
        Self::Item { kind, amount }
    }

    pub fn as_drop(&self) -> Option<LootDrop> {
        match *self {
            Self::Item { kind, amount } => Some(LootDrop { kind, amount }),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FloorConfig {
    pub width: usize,
    pub height: usize,
    pub passage_base_chance: f64,
    pub passage_chance_step: f64,
    #[serde(default)]
    pub enemies: Vec<EnemyQuota>,
    #[serde(default)]
    pub loot: Vec<LootEntry>,
}

impl FloorConfig {
    pub fn cell_count(&self) -> usize {
        self.width * self.height
    }

    pub fn enemy_total(&self) -> usize {
        self.enemies.iter().map(|quota| quota.count as usize).sum()
    }
}

/// Weighted enemy move pattern, valid while relative health is inside `[min_health, max_health)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MoveSet {
    pub id: u32,
    pub weight: u32,
    pub min_health: f64,
    pub max_health: f64,
    pub moves: Vec<CombatMove>,
}

impl MoveSet {
    pub fn accepts(&self, relative_health: f64) -> bool {
        if relative_health < self.min_health {
            return false;
        }
        relative_health < self.max_health || (self.max_health >= 1.0 && relative_health >= 1.0)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemyTemplate {
    pub health: u32,
    pub attack: u32,
    pub defense: u32,
    pub difficulty: u8,
    #[serde(default)]
    pub aggressive: bool,
    pub move_sets: Vec<MoveSet>,
}

impl EnemyTemplate {
    pub fn move_set(&self, id: u32) -> Option<&MoveSet> {
        self.move_sets.iter().find(|set| set.id == id)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AltarEffect {
    RestoreHealth { amount: u32 },
    RestoreEnergy { amount: u32 },
    RestoreAll,
    GrantExperience { amount: u32 },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AltarTemplate {
    pub effect: AltarEffect,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrapTemplate {
    /// Energy lost when the trap is defused without a key.
    pub damage: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameCatalog {
    pub energy: EnergyCosts,
    pub mode: ModeSettings,
    pub stats: StatFormulas,
    pub levels: LevelTable,
    /// Generation parameters, `floors[0]` is floor 1.
    pub floors: Vec<FloorConfig>,
    #[serde(default)]
    pub enemies: BTreeMap<EnemyId, EnemyTemplate>,
    #[serde(default)]
    pub altars: BTreeMap<AltarId, AltarTemplate>,
    #[serde(default)]
    pub traps: BTreeMap<TrapId, TrapTemplate>,
    /// Chance that a trap jams when walked over, indexed by the clamped jam counter.
    pub jam_chances: Vec<f64>,
}

impl GameCatalog {
    pub fn from_toml_str(source: &str) -> Result<Self, CatalogError> {
        let catalog: Self = toml::from_str(source)?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.jam_chances.is_empty() {
            return Err(CatalogError::EmptyJamTable);
        }
        if let Some(bad) = self.jam_chances.iter().find(|c| !(0.0..=1.0).contains(*c)) {
            return Err(CatalogError::Invalid(format!("jam chance {bad} outside [0, 1]")));
        }
        if self.mode.max_floor == 0 || self.floors.is_empty() {
            return Err(CatalogError::Invalid("mode needs at least one floor".to_string()));
        }
        if self.mode.cycle_length_ms == 0 {
            return Err(CatalogError::Invalid("cycle length must be positive".to_string()));
        }
        for (index, floor) in self.floors.iter().enumerate() {
            if floor.width == 0 || floor.height == 0 {
                return Err(CatalogError::Invalid(format!("floor {} has no cells", index + 1)));
            }
            for entry in &floor.loot {
                match entry {
                    LootEntry::Altar { id } if !self.altars.contains_key(id) => {
                        return Err(CatalogError::UnknownAltar(id.clone()));
                    }
                    LootEntry::Trap { id } if !self.traps.contains_key(id) => {
                        return Err(CatalogError::UnknownTrap(id.clone()));
                    }
                    _ => {}
                }
            }
        }
        for (id, enemy) in &self.enemies {
            if enemy.health == 0 {
                return Err(CatalogError::Invalid(format!("enemy '{id}' has no health")));
            }
            if enemy.move_sets.is_empty() {
                return Err(CatalogError::Invalid(format!("enemy '{id}' has no move-sets")));
            }
            for set in &enemy.move_sets {
                if set.id == 0 {
                    return Err(CatalogError::Invalid(format!(
                        "enemy '{id}' uses reserved move-set id 0"
                    )));
                }
                if set.moves.is_empty() || set.min_health >= set.max_health {
                    return Err(CatalogError::Invalid(format!(
                        "enemy '{id}' move-set {} is empty or has an inverted band",
                        set.id
                    )));
                }
                if enemy.move_sets.iter().filter(|other| other.id == set.id).count() > 1 {
                    return Err(CatalogError::Invalid(format!(
                        "enemy '{id}' repeats move-set id {}",
                        set.id
                    )));
                }
            }
        }
        Ok(())
    }

    /// Floors past the configured list reuse the last entry.
    pub fn floor_config(&self, floor: u32) -> Result<&FloorConfig, CatalogError> {
        if floor == 0 || floor > self.mode.max_floor {
            return Err(CatalogError::UnknownFloor(floor));
        }
        let index = (floor as usize - 1).min(self.floors.len().saturating_sub(1));
        self.floors.get(index).ok_or(CatalogError::UnknownFloor(floor))
    }

    pub fn enemy(&self, id: &EnemyId) -> Result<&EnemyTemplate, CatalogError> {
        self.enemies.get(id).ok_or_else(|| CatalogError::UnknownEnemy(id.clone()))
    }

    pub fn altar(&self, id: &AltarId) -> Result<&AltarTemplate, CatalogError> {
        self.altars.get(id).ok_or_else(|| CatalogError::UnknownAltar(id.clone()))
    }

    pub fn trap(&self, id: &TrapId) -> Result<&TrapTemplate, CatalogError> {
        self.traps.get(id).ok_or_else(|| CatalogError::UnknownTrap(id.clone()))
    }

    pub fn jam_chance(&self, counter: u32) -> f64 {
        let index = (counter as usize).min(self.jam_chances.len().saturating_sub(1));
        self.jam_chances.get(index).copied().unwrap_or(0.0)
    }

    pub fn max_jam_counter(&self) -> u32 {
        self.jam_chances.len().saturating_sub(1) as u32
    }
}

impl Default for GameCatalog {
    fn default() -> Self {
        Self::build_default()
    }
}

impl CatalogProvider for GameCatalog {
    fn get_meta(&self) -> &GameCatalog {
        self
    }
}

impl<C: CatalogProvider + ?Sized> CatalogProvider for &C {
    fn get_meta(&self) -> &GameCatalog {
        (**self).get_meta()
    }
}
