//! ASCII rendering of a floor for terminal inspection.

use dungeon_core::types::CellId;
use dungeon_core::{FloorData, Occupant};

fn glyph(floor: &FloorData, id: CellId) -> char {
    if id == floor.start {
        return 'S';
    }
    match floor.cells.get(id).and_then(|cell| cell.occupant.as_ref()) {
        None => '.',
        Some(Occupant::Enemy { .. }) => 'E',
        Some(Occupant::Loot { .. }) => '$',
        Some(Occupant::Altar { .. }) => 'A',
        Some(Occupant::Trap { .. }) => 'T',
    }
}

/// Draws walls between unconnected cells. Cells for which `visible` is false show as `?`.
pub fn render_floor(floor: &FloorData, visible: impl Fn(CellId) -> bool) -> String {
    let mut out = String::new();
    for y in 0..floor.height {
        out.push('+');
        for x in 0..floor.width {
            let id = y * floor.width + x;
            let open = y > 0 && floor.is_adjacent(id, id - floor.width);
            out.push_str(if open { "   +" } else { "---+" });
        }
        out.push('\n');

        out.push('|');
        for x in 0..floor.width {
            let id = y * floor.width + x;
            let shown = if visible(id) { glyph(floor, id) } else { '?' };
            out.push(' ');
            out.push(shown);
            out.push(' ');
            let open = x + 1 < floor.width && floor.is_adjacent(id, id + 1);
            out.push(if open { ' ' } else { '|' });
        }
        out.push('\n');
    }
    out.push('+');
    for _ in 0..floor.width {
        out.push_str("---+");
    }
    out.push('\n');
    out
}
