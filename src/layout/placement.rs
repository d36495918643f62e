//! Pure placement rules over a grid position and its floor.

use crate::ir::{FloorSpec, Position};

use super::types::SeatMeta;

/// Structural role of a grid cell in a generated layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellRole {
    Aisle,
    Stairs,
    /// Outer cell of the front row beside the stairwell.
    StairCorner,
    Bathroom,
    /// Cell left free next to the bathroom.
    BathroomClearance,
    Seat,
}

/// Outermost columns of the floor. `position.x` is the physical column, aisle included.
pub fn is_window(position: Position, floor: &FloorSpec) -> bool {
    position.x == 0 || position.x == floor.max_column()
}

pub fn is_legroom(position: Position) -> bool {
    position.y == 1
}

pub fn is_legroom_row(row_index: u32) -> bool {
    row_index == 0
}

pub fn seat_meta(position: Position, floor: &FloorSpec) -> SeatMeta {
    SeatMeta {
        is_window: is_window(position, floor),
        is_legroom: is_legroom(position),
    }
}

/// Decides what the generator places at `(row_index, col_index)`.
///
/// Earlier rules win: aisle, stair corners, bathroom, bathroom clearance, seat.
pub fn classify(
    row_index: u32,
    col_index: u32,
    floor: &FloorSpec,
    double_decker_first_floor: bool,
) -> CellRole {
    let last_column = floor.total_columns() - 1;
    let first_row = row_index == 0;
    let last_row = row_index + 1 == floor.num_rows;
    let stairwell_row = first_row && double_decker_first_floor;

    if col_index == floor.aisle_column() {
        if stairwell_row {
            CellRole::Stairs
        } else {
            CellRole::Aisle
        }
    } else if stairwell_row && (col_index == 0 || col_index == last_column) {
        CellRole::StairCorner
    } else if last_row && col_index == last_column {
        CellRole::Bathroom
    } else if last_row && col_index + 1 == last_column {
        CellRole::BathroomClearance
    } else {
        CellRole::Seat
    }
}
