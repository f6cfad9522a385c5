//! Maze carving: a randomized depth-first spanning tree followed by extra passages.

use crate::rng::RandomSource;
use crate::types::CellId;

use super::grid::{connect, orthogonal_neighbors};
use super::model::Cell;

/// Carves a spanning tree rooted at `start`. Every cell becomes reachable using
/// exactly `cells - 1` edges.
pub(super) fn carve_spanning_tree(
    cells: &mut [Cell],
    width: usize,
    height: usize,
    start: CellId,
    rng: &mut impl RandomSource,
) {
    let mut visited = vec![false; cells.len()];
    let mut stack = vec![start];
    visited[start] = true;

    while let Some(&current) = stack.last() {
        let mut candidates: Vec<CellId> = orthogonal_neighbors(width, height, current)
            .into_iter()
            .filter(|&next| !visited[next])
            .collect();
        if candidates.is_empty() {
            stack.pop();
            continue;
        }
        rng.shuffle(&mut candidates);
        let next = candidates[0];
        connect(cells, current, next);
        visited[next] = true;
        stack.push(next);
    }
}

/// Adds loops on top of the spanning tree. The chance of taking an opportunity
/// grows by `step` each time one is declined and falls back to `base` after a success.
pub(super) fn add_extra_passages(
    cells: &mut [Cell],
    width: usize,
    height: usize,
    base: f64,
    step: f64,
    rng: &mut impl RandomSource,
) -> usize {
    let mut chance = base;
    let mut added = 0;
    for id in 0..cells.len() {
        if cells[id].connections.len() >= 4 {
            continue;
        }
        for next in orthogonal_neighbors(width, height, id) {
            if cells[id].is_connected(next) {
                continue;
            }
            if rng.chance(chance) {
                connect(cells, id, next);
                added += 1;
                chance = base;
            } else {
                chance = (chance + step).min(1.0);
            }
        }
    }
    added
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapgen::grid::build_cells;
    use crate::rng::{ScriptedRandom, seeded};

    #[test]
    fn spanning_tree_uses_cells_minus_one_edges() {
        let (width, height) = (6, 9);
        let mut cells = build_cells(width, height);
        carve_spanning_tree(&mut cells, width, height, 13, &mut seeded(5));
        let edges: usize = cells.iter().map(|cell| cell.connections.len()).sum::<usize>() / 2;
        assert_eq!(edges, width * height - 1);
    }

    #[test]
    fn zero_chance_adds_no_passages() {
        let (width, height) = (5, 5);
        let mut cells = build_cells(width, height);
        carve_spanning_tree(&mut cells, width, height, 0, &mut seeded(1));
        let added = add_extra_passages(&mut cells, width, height, 0.0, 0.0, &mut seeded(1));
        assert_eq!(added, 0);
    }

    #[test]
    fn guaranteed_chance_connects_every_orthogonal_pair() {
        let (width, height) = (3, 3);
        let mut cells = build_cells(width, height);
        carve_spanning_tree(&mut cells, width, height, 4, &mut seeded(2));
        add_extra_passages(&mut cells, width, height, 1.0, 0.0, &mut ScriptedRandom::always_high());
        for id in 0..cells.len() {
            assert_eq!(cells[id].connections.len(), orthogonal_neighbors(width, height, id).len());
        }
    }

    #[test]
    fn declined_opportunities_raise_the_chance_until_one_succeeds() {
        let (width, height) = (4, 4);
        let mut cells = build_cells(width, height);
        carve_spanning_tree(&mut cells, width, height, 0, &mut seeded(8));
        // unit() of this value is just under 0.5: fails at 0.1, 0.3, succeeds at 0.5.
        let roll = (1_u64 << 63) - (1 << 12);
        let mut rng = ScriptedRandom::new(vec![roll]);
        let added = add_extra_passages(&mut cells, width, height, 0.1, 0.2, &mut rng);
        assert!(added > 0, "the escalating chance should eventually add a passage");
    }
}
