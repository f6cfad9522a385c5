//! Enemy and loot placement along a randomized walk from the start cell.
//!
//! Enemies are attached every `spacing` cells of walk distance so that the gap
//! between two consecutive enemies is bounded no matter how the maze was carved.
//! Cells walked past after the first enemy become loot candidates.

use std::collections::BTreeMap;
use std::iter;

use crate::catalog::{EnemyQuota, EnemyTemplate, LootEntry};
use crate::rng::RandomSource;
use crate::types::{CellId, EnemyId, LootDrop};

use super::model::{Cell, Occupant};

/// Enemy templates grouped by difficulty tier.
#[derive(Clone, Debug, Default)]
pub struct EnemyRoster {
    by_difficulty: BTreeMap<u8, Vec<(EnemyId, u32)>>,
}

impl EnemyRoster {
    pub fn from_templates<'a>(
        templates: impl IntoIterator<Item = (&'a EnemyId, &'a EnemyTemplate)>,
    ) -> Self {
        let mut by_difficulty: BTreeMap<u8, Vec<(EnemyId, u32)>> = BTreeMap::new();
        for (id, template) in templates {
            by_difficulty
                .entry(template.difficulty)
                .or_default()
                .push((id.clone(), template.health));
        }
        Self { by_difficulty }
    }

    fn pick(&self, difficulty: u8, rng: &mut impl RandomSource) -> Option<(EnemyId, u32)> {
        let pool = self.by_difficulty.get(&difficulty)?;
        if pool.is_empty() {
            return None;
        }
        Some(pool[rng.below(pool.len())].clone())
    }
}

/// Expands `{difficulty, count}` groups into one slot per enemy, hardest first.
pub(super) fn expand_enemy_order(quotas: &[EnemyQuota]) -> Vec<u8> {
    let mut sorted = quotas.to_vec();
    sorted.sort_by(|a, b| b.difficulty.cmp(&a.difficulty));
    sorted
        .iter()
        .flat_map(|quota| iter::repeat_n(quota.difficulty, quota.count as usize))
        .collect()
}

pub(super) fn resolve_enemies(
    order: &[u8],
    roster: &EnemyRoster,
    rng: &mut impl RandomSource,
) -> (Vec<(EnemyId, u32)>, Vec<u8>) {
    let mut resolved = Vec::with_capacity(order.len());
    let mut unmatched = Vec::new();
    for &difficulty in order {
        match roster.pick(difficulty, rng) {
            Some(enemy) => resolved.push(enemy),
            None => unmatched.push(difficulty),
        }
    }
    (resolved, unmatched)
}

/// Visit order of a randomized depth-first walk over the carved connections.
/// A cell's walk distance is its position in this list.
pub(super) fn walk_order(
    cells: &[Cell],
    start: CellId,
    rng: &mut impl RandomSource,
) -> Vec<CellId> {
    let mut visited = vec![false; cells.len()];
    let mut order = vec![start];
    let mut stack = vec![start];
    visited[start] = true;

    while let Some(&current) = stack.last() {
        let mut candidates: Vec<CellId> =
            cells[current].connections.iter().copied().filter(|&next| !visited[next]).collect();
        if candidates.is_empty() {
            stack.pop();
            continue;
        }
        rng.shuffle(&mut candidates);
        let next = candidates[0];
        visited[next] = true;
        order.push(next);
        stack.push(next);
    }
    order
}

pub(super) fn spacing(total_cells: usize, enemy_count: usize) -> usize {
    if enemy_count == 0 {
        return 0;
    }
    (total_cells.saturating_sub(1) / enemy_count).max(1)
}

pub(super) struct EnemyPlacement {
    pub(super) placed: Vec<(CellId, usize)>,
    pub(super) loot_candidates: Vec<CellId>,
    pub(super) spacing: usize,
}

pub(super) fn place_enemies(
    cells: &mut [Cell],
    order: &[CellId],
    enemies: Vec<(EnemyId, u32)>,
) -> EnemyPlacement {
    let spacing = spacing(cells.len(), enemies.len());
    let mut pending = enemies.into_iter();
    let mut next_enemy = pending.next();
    let mut placed = Vec::new();
    let mut loot_candidates = Vec::new();

    for (distance, &cell_id) in order.iter().enumerate().skip(1) {
        if spacing > 0
            && distance % spacing == 0
            && cells[cell_id].occupant.is_none()
            && let Some((enemy_id, health)) = next_enemy.take()
        {
            cells[cell_id].occupant = Some(Occupant::Enemy { enemy_id, health });
            placed.push((cell_id, distance));
            next_enemy = pending.next();
            continue;
        }
        if !placed.is_empty() && cells[cell_id].occupant.is_none() {
            loot_candidates.push(cell_id);
        }
    }

    EnemyPlacement { placed, loot_candidates, spacing }
}

/// Spreads loot entries evenly over the candidate list. Returns how many were placed.
pub(super) fn place_loot(cells: &mut [Cell], candidates: &[CellId], loot: &[LootEntry]) -> usize {
    if loot.is_empty() || candidates.is_empty() {
        return 0;
    }
    let stride = ((candidates.len() - 1) / loot.len()).max(1);
    let mut placed = 0;
    for (index, entry) in loot.iter().enumerate() {
        let Some(&cell_id) = candidates.get(index * stride) else {
            break;
        };
        if cells[cell_id].occupant.is_some() {
            continue;
        }
        cells[cell_id].occupant = Some(match entry {
            LootEntry::Item { kind, amount } => {
                Occupant::Loot { drop: LootDrop { kind: *kind, amount: *amount } }
            }
            LootEntry::Altar { id } => Occupant::Altar { altar_id: id.clone() },
            LootEntry::Trap { id } => Occupant::Trap { trap_id: id.clone() },
        });
        placed += 1;
    }
    placed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapgen::grid::{build_cells, connect};
    use crate::rng::seeded;
    use crate::types::{LootKind, TrapId};

    fn corridor(length: usize) -> Vec<Cell> {
        let mut cells = build_cells(length, 1);
        for id in 1..length {
            connect(&mut cells, id - 1, id);
        }
        cells
    }

    #[test]
    fn enemy_order_lists_hardest_groups_first() {
        let order = expand_enemy_order(&[
            EnemyQuota { difficulty: 1, count: 2 },
            EnemyQuota { difficulty: 3, count: 1 },
            EnemyQuota { difficulty: 2, count: 2 },
        ]);
        assert_eq!(order, vec![3, 2, 2, 1, 1]);
    }

    #[test]
    fn corridor_walk_places_enemies_at_fixed_spacing() {
        let mut cells = corridor(10);
        let order = walk_order(&cells, 0, &mut seeded(1));
        assert_eq!(order, (0..10).collect::<Vec<_>>());

        let enemies = vec![(EnemyId::new("a"), 5), (EnemyId::new("b"), 5), (EnemyId::new("c"), 5)];
        let placement = place_enemies(&mut cells, &order, enemies);
        assert_eq!(placement.spacing, 3);
        assert_eq!(placement.placed, vec![(3, 3), (6, 6), (9, 9)]);
        assert_eq!(placement.loot_candidates, vec![4, 5, 7, 8]);
        assert!(cells[0].occupant.is_none(), "start cell never hosts an enemy");
    }

    #[test]
    fn oversized_enemy_quota_is_under_populated() {
        let mut cells = corridor(3);
        let order = walk_order(&cells, 0, &mut seeded(1));
        let enemies: Vec<(EnemyId, u32)> =
            (0..5).map(|i| (EnemyId::new(format!("e{i}")), 1)).collect();
        let placement = place_enemies(&mut cells, &order, enemies);
        assert_eq!(placement.placed.len(), 2);
    }

    #[test]
    fn loot_is_spread_evenly_over_candidates() {
        let mut cells = corridor(12);
        let candidates: Vec<CellId> = (2..12).collect();
        let loot = vec![
            LootEntry::item(LootKind::Key, 1),
            LootEntry::Trap { id: TrapId::new("spikes") },
            LootEntry::item(LootKind::Potion, 1),
        ];
        let placed = place_loot(&mut cells, &candidates, &loot);
        assert_eq!(placed, 3);
        assert!(matches!(cells[2].occupant, Some(Occupant::Loot { .. })));
        assert!(matches!(cells[5].occupant, Some(Occupant::Trap { .. })));
        assert!(matches!(cells[8].occupant, Some(Occupant::Loot { .. })));
    }

    #[test]
    fn missing_difficulty_tier_is_reported_not_placed() {
        let roster = EnemyRoster::default();
        let (resolved, unmatched) = resolve_enemies(&[2, 1], &roster, &mut seeded(4));
        assert!(resolved.is_empty());
        assert_eq!(unmatched, vec![2, 1]);
    }
}
