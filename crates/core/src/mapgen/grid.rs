//! Grid-space primitives shared by carving and placement.

use crate::types::CellId;

use super::model::Cell;

pub(super) fn build_cells(width: usize, height: usize) -> Vec<Cell> {
    let mut cells = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            cells.push(Cell::new(x, y));
        }
    }
    cells
}

/// In-bounds orthogonal neighbors in up, right, down, left order.
pub(super) fn orthogonal_neighbors(width: usize, height: usize, id: CellId) -> Vec<CellId> {
    let x = id % width;
    let y = id / width;
    let mut neighbors = Vec::with_capacity(4);
    if y > 0 {
        neighbors.push(id - width);
    }
    if x + 1 < width {
        neighbors.push(id + 1);
    }
    if y + 1 < height {
        neighbors.push(id + width);
    }
    if x > 0 {
        neighbors.push(id - 1);
    }
    neighbors
}

pub(super) fn connect(cells: &mut [Cell], a: CellId, b: CellId) {
    if a == b || cells[a].is_connected(b) {
        return;
    }
    cells[a].connections.push(b);
    cells[b].connections.push(a);
}
