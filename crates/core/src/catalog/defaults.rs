//! Built-in catalog used by tools and tests when no external catalog is supplied.

use std::collections::BTreeMap;

use super::*;

const DAY_MS: u64 = 24 * 60 * 60 * 1000;
const MINUTE_MS: u64 = 60 * 1000;

fn move_set(id: u32, weight: u32, band: (f64, f64), moves: &[CombatMove]) -> MoveSet {
    MoveSet { id, weight, min_health: band.0, max_health: band.1, moves: moves.to_vec() }
}

fn default_enemies() -> BTreeMap<EnemyId, EnemyTemplate> {
    use CombatMove::{Feint, Guard, Strike};

    let mut enemies = BTreeMap::new();
    enemies.insert(
        EnemyId::new("slime"),
        EnemyTemplate {
            health: 10,
            attack: 5,
            defense: 0,
            difficulty: 1,
            aggressive: false,
            move_sets: vec![
                move_set(1, 3, (0.0, 1.0), &[Strike, Strike, Guard]),
                move_set(2, 1, (0.0, 1.0), &[Feint, Guard]),
            ],
        },
    );
    enemies.insert(
        EnemyId::new("bat"),
        EnemyTemplate {
            health: 6,
            attack: 3,
            defense: 0,
            difficulty: 1,
            aggressive: true,
            move_sets: vec![move_set(1, 1, (0.0, 1.0), &[Feint, Strike, Feint])],
        },
    );
    enemies.insert(
        EnemyId::new("skeleton"),
        EnemyTemplate {
            health: 18,
            attack: 6,
            defense: 10,
            difficulty: 2,
            aggressive: false,
            move_sets: vec![
                move_set(1, 2, (0.5, 1.0), &[Strike, Guard, Strike]),
                move_set(2, 1, (0.5, 1.0), &[Guard, Guard, Feint]),
                move_set(3, 1, (0.0, 0.5), &[Feint, Strike]),
            ],
        },
    );
    enemies.insert(
        EnemyId::new("ogre"),
        EnemyTemplate {
            health: 30,
            attack: 8,
            defense: 20,
            difficulty: 3,
            aggressive: true,
            move_sets: vec![
                move_set(1, 1, (0.3, 1.0), &[Strike, Strike, Feint, Guard]),
                move_set(2, 1, (0.0, 0.3), &[Guard, Strike, Strike]),
            ],
        },
    );
    enemies
}

fn floor(width: usize, height: usize, enemies: &[(u8, u32)], loot: Vec<LootEntry>) -> FloorConfig {
    FloorConfig {
        width,
        height,
        passage_base_chance: 0.05,
        passage_chance_step: 0.02,
        enemies: enemies
            .iter()
            .map(|&(difficulty, count)| EnemyQuota { difficulty, count })
            .collect(),
        loot,
    }
}

impl GameCatalog {
    pub fn build_default() -> Self {
        let altar = || LootEntry::Altar { id: AltarId::new("spring") };
        let shrine = || LootEntry::Altar { id: AltarId::new("shrine") };
        let spikes = || LootEntry::Trap { id: TrapId::new("spikes") };
        let pit = || LootEntry::Trap { id: TrapId::new("pit") };

        let mut altars = BTreeMap::new();
        altars.insert(
            AltarId::new("spring"),
            AltarTemplate { effect: AltarEffect::RestoreEnergy { amount: 10 } },
        );
        altars.insert(
            AltarId::new("shrine"),
            AltarTemplate { effect: AltarEffect::RestoreHealth { amount: 15 } },
        );
        altars.insert(AltarId::new("sanctum"), AltarTemplate { effect: AltarEffect::RestoreAll });

        let mut traps = BTreeMap::new();
        traps.insert(TrapId::new("spikes"), TrapTemplate { damage: 3 });
        traps.insert(TrapId::new("pit"), TrapTemplate { damage: 6 });

        Self {
            energy: EnergyCosts { reveal: 1, move_to: 1, fight: 2, altar: 1, trap: 1, loot: 0 },
            mode: ModeSettings {
                max_floor: 3,
                cycle_length_ms: DAY_MS,
                health_regen: RegenRule { interval_ms: 5 * MINUTE_MS, amount: 1 },
                energy_regen: RegenRule { interval_ms: 10 * MINUTE_MS, amount: 1 },
                potion_heal: 12,
            },
            stats: StatFormulas {
                base_health: 20,
                health_per_stamina: 5,
                health_per_level: 2,
                base_energy: 30,
                energy_per_intellect: 2,
                base_attack: 4,
                attack_per_strength: 1,
                base_defense: 0,
                defense_per_dexterity: 1,
            },
            levels: LevelTable {
                exp_by_difficulty: vec![0, 10, 25, 60],
                exp_per_level: 50,
                points_per_level: 1,
            },
            floors: vec![
                floor(
                    6,
                    9,
                    &[(2, 1), (1, 4)],
                    vec![
                        LootEntry::item(LootKind::Key, 1),
                        spikes(),
                        LootEntry::item(LootKind::Potion, 1),
                        altar(),
                        pit(),
                        LootEntry::item(LootKind::Scroll, 1),
                    ],
                ),
                floor(
                    7,
                    10,
                    &[(3, 1), (2, 2), (1, 3)],
                    vec![
                        spikes(),
                        LootEntry::item(LootKind::Potion, 2),
                        shrine(),
                        pit(),
                        LootEntry::item(LootKind::Key, 1),
                        LootEntry::item(LootKind::Experience, 20),
                        spikes(),
                    ],
                ),
                floor(
                    8,
                    10,
                    &[(3, 2), (2, 3), (1, 2)],
                    vec![
                        pit(),
                        LootEntry::item(LootKind::Potion, 2),
                        LootEntry::Altar { id: AltarId::new("sanctum") },
                        spikes(),
                        LootEntry::item(LootKind::Key, 2),
                        pit(),
                        shrine(),
                    ],
                ),
            ],
            enemies: default_enemies(),
            altars,
            traps,
            jam_chances: vec![0.75, 0.5, 0.3, 0.15, 0.05],
        }
    }
}
