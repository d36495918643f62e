use std::collections::{BTreeSet, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpaceType {
    Seat,
    Hallway,
    Stairs,
    Bathroom,
    Empty,
}

impl SpaceType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Seat => "seat",
            Self::Hallway => "hallway",
            Self::Stairs => "stairs",
            Self::Bathroom => "bathroom",
            Self::Empty => "empty",
        }
    }

    pub fn is_seat(self) -> bool {
        self == Self::Seat
    }
}

impl fmt::Display for SpaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeatType {
    #[default]
    Regular,
    Premium,
    Business,
    Sleeper,
}

/// Grid coordinate of a space. `x` is the 0-based column, `y` the 1-based row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: u32,
    pub y: u32,
}

impl Position {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Builds a position from 0-based grid indices.
    pub fn from_indices(row_index: u32, col_index: u32) -> Self {
        Self {
            x: col_index,
            y: row_index + 1,
        }
    }

    pub fn row_index(self) -> u32 {
        self.y.saturating_sub(1)
    }

    pub fn col_index(self) -> u32 {
        self.x
    }
}

/// One physical deck: seat columns either side of a single central aisle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FloorSpec {
    pub floor_number: u32,
    pub num_rows: u32,
    pub seats_left: u32,
    pub seats_right: u32,
}

impl FloorSpec {
    pub fn total_columns(&self) -> u32 {
        self.seats_left
            .saturating_add(1)
            .saturating_add(self.seats_right)
    }

    pub fn aisle_column(&self) -> u32 {
        self.seats_left
    }

    /// Largest column index accepted for any space on this floor.
    pub fn max_column(&self) -> u32 {
        self.seats_left.saturating_add(self.seats_right)
    }

    pub fn cell_count(&self) -> u32 {
        self.num_rows.saturating_mul(self.total_columns())
    }

    /// `None` when the column count or the cell count does not fit in `u32`.
    pub fn checked_cell_count(&self) -> Option<u32> {
        self.seats_left
            .checked_add(1)?
            .checked_add(self.seats_right)?
            .checked_mul(self.num_rows)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutSpec {
    pub num_floors: u32,
    pub floors: Vec<FloorSpec>,
    /// Declared passenger-seat count. Advisory only.
    #[serde(default)]
    pub total_seats: u32,
}

impl LayoutSpec {
    pub fn floor(&self, floor_number: u32) -> Option<&FloorSpec> {
        self.floors
            .iter()
            .find(|floor| floor.floor_number == floor_number)
    }

    pub fn require_floor(&self, floor_number: u32) -> Result<&FloorSpec, ConfigurationError> {
        self.floor(floor_number)
            .ok_or(ConfigurationError::FloorNotFound {
                floor: floor_number,
            })
    }

    pub fn is_double_decker(&self) -> bool {
        self.num_floors > 1
    }

    /// Checks that `floors` holds exactly one non-empty entry per floor in `1..=num_floors`,
    /// each small enough for its cells to be addressed with `u32`.
    pub fn verify(&self) -> Result<(), ConfigurationError> {
        if self.num_floors == 0 {
            return Err(ConfigurationError::NoFloors);
        }
        let mut seen = HashSet::new();
        for floor in &self.floors {
            if floor.floor_number == 0 || floor.floor_number > self.num_floors {
                return Err(ConfigurationError::FloorOutOfRange {
                    floor: floor.floor_number,
                    num_floors: self.num_floors,
                });
            }
            if !seen.insert(floor.floor_number) {
                return Err(ConfigurationError::DuplicateFloor {
                    floor: floor.floor_number,
                });
            }
            if floor.num_rows == 0 {
                return Err(ConfigurationError::EmptyFloor {
                    floor: floor.floor_number,
                });
            }
            if floor.checked_cell_count().is_none() {
                return Err(ConfigurationError::FloorTooLarge {
                    floor: floor.floor_number,
                });
            }
        }
        for floor in 1..=self.num_floors {
            if !seen.contains(&floor) {
                return Err(ConfigurationError::MissingFloor {
                    floor,
                    num_floors: self.num_floors,
                });
            }
        }
        Ok(())
    }
}

/// Identity of a space within one layout: `(floor, x, y)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpaceKey {
    pub floor_number: u32,
    pub x: u32,
    pub y: u32,
}

impl SpaceKey {
    pub fn new(floor_number: u32, position: Position) -> Self {
        Self {
            floor_number,
            x: position.x,
            y: position.y,
        }
    }

    pub fn position(self) -> Position {
        Position::new(self.x, self.y)
    }
}

impl fmt::Display for SpaceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.floor_number, self.x, self.y)
    }
}

/// A caller-supplied layout item, as submitted when editing a diagram.
///
/// Every field is optional on the wire; the validator decides what is missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpaceConfigInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floor_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_type: Option<SpaceType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seat_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seat_type: Option<SeatType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amenities: Option<BTreeSet<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reclinement_angle: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

impl SpaceConfigInput {
    pub fn seat(floor_number: u32, position: Position, seat_number: &str) -> Self {
        Self {
            floor_number: Some(floor_number),
            position: Some(position),
            space_type: Some(SpaceType::Seat),
            seat_number: Some(seat_number.to_string()),
            ..Self::default()
        }
    }

    pub fn structural(floor_number: u32, position: Position, space_type: SpaceType) -> Self {
        Self {
            floor_number: Some(floor_number),
            position: Some(position),
            space_type: Some(space_type),
            ..Self::default()
        }
    }

    /// Omitted `spaceType` means a seat.
    pub fn effective_type(&self) -> SpaceType {
        self.space_type.unwrap_or(SpaceType::Seat)
    }

    pub fn key(&self) -> Option<SpaceKey> {
        match (self.floor_number, self.position) {
            (Some(floor), Some(position)) => Some(SpaceKey::new(floor, position)),
            _ => None,
        }
    }

    /// Seat number with surrounding whitespace removed, `None` when blank.
    pub fn trimmed_seat_number(&self) -> Option<&str> {
        self.seat_number
            .as_deref()
            .map(str::trim)
            .filter(|number| !number.is_empty())
    }
}
