use std::collections::BTreeSet;

use crate::config::GeneratorConfig;
use crate::error::ConfigurationError;
use crate::ir::{FloorSpec, LayoutSpec, Position};

use super::placement::{self, CellRole};
use super::types::{Seat, SeatMeta, Space, SpaceKind};

/// Hands out sequential seat numbers. Consumed by value; each allocation returns the successor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeatAllocator {
    next: u32,
}

impl SeatAllocator {
    pub fn starting_at(first: u32) -> Self {
        Self { next: first }
    }

    pub fn peek(self) -> u32 {
        self.next
    }

    /// Fails once the successor of the number handed out would not fit in `u32`.
    pub fn allocate(self) -> Result<(String, Self), ConfigurationError> {
        let next = self
            .next
            .checked_add(1)
            .ok_or(ConfigurationError::SeatNumbersExhausted { last: self.next })?;
        Ok((self.next.to_string(), Self { next }))
    }
}

pub(super) fn generate_spaces(
    spec: &LayoutSpec,
    is_double_decker: bool,
    config: &GeneratorConfig,
) -> Result<Vec<Space>, ConfigurationError> {
    let start = SeatAllocator::starting_at(config.first_seat_number);
    let (spaces, _) = (1..=spec.num_floors).try_fold(
        (Vec::new(), start),
        |(mut spaces, allocator), floor_number| {
            let floor = spec.require_floor(floor_number)?;
            if floor.checked_cell_count().is_none() {
                return Err(ConfigurationError::FloorTooLarge {
                    floor: floor_number,
                });
            }
            let first_floor_stairs =
                is_double_decker && spec.num_floors > 1 && floor_number == 1;
            let (floor_spaces, allocator) =
                generate_floor(floor, first_floor_stairs, allocator, config)?;
            tracing::debug!(
                floor = floor_number,
                spaces = floor_spaces.len(),
                next_seat = allocator.peek(),
                "generated floor"
            );
            spaces.extend(floor_spaces);
            Ok::<_, ConfigurationError>((spaces, allocator))
        },
    )?;
    Ok(spaces)
}

fn generate_floor(
    floor: &FloorSpec,
    first_floor_stairs: bool,
    allocator: SeatAllocator,
    config: &GeneratorConfig,
) -> Result<(Vec<Space>, SeatAllocator), ConfigurationError> {
    (0..floor.num_rows).try_fold(
        (Vec::with_capacity(floor.cell_count() as usize), allocator),
        |(mut spaces, allocator), row_index| {
            let (row, allocator) =
                generate_row(floor, row_index, first_floor_stairs, allocator, config)?;
            spaces.extend(row);
            Ok((spaces, allocator))
        },
    )
}

fn generate_row(
    floor: &FloorSpec,
    row_index: u32,
    first_floor_stairs: bool,
    allocator: SeatAllocator,
    config: &GeneratorConfig,
) -> Result<(Vec<Space>, SeatAllocator), ConfigurationError> {
    (0..floor.total_columns()).try_fold(
        (Vec::with_capacity(floor.total_columns() as usize), allocator),
        |(mut row, allocator), col_index| {
            let position = Position::from_indices(row_index, col_index);
            let role = placement::classify(row_index, col_index, floor, first_floor_stairs);
            let (kind, allocator) = match role {
                CellRole::Aisle => (SpaceKind::Hallway, allocator),
                CellRole::Stairs => (SpaceKind::Stairs, allocator),
                CellRole::Bathroom => (SpaceKind::Bathroom, allocator),
                CellRole::StairCorner | CellRole::BathroomClearance => {
                    (SpaceKind::Empty, allocator)
                }
                CellRole::Seat => {
                    let (seat_number, allocator) = allocator.allocate()?;
                    let seat = generated_seat(seat_number, position, floor, config);
                    (SpaceKind::Seat(seat), allocator)
                }
            };
            row.push(Space::new(floor.floor_number, position, kind));
            Ok::<_, ConfigurationError>((row, allocator))
        },
    )
}

fn generated_seat(
    seat_number: String,
    position: Position,
    floor: &FloorSpec,
    config: &GeneratorConfig,
) -> Seat {
    let is_window = placement::is_window(position, floor);
    let mut amenities = BTreeSet::new();
    if is_window {
        amenities.insert(config.window_amenity.clone());
    }
    Seat {
        seat_number,
        seat_type: config.seat_type,
        amenities,
        reclinement_angle: config.reclinement_angle,
        meta: SeatMeta {
            is_window,
            is_legroom: placement::is_legroom_row(position.row_index()),
        },
    }
}
