use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::RecordError;
use crate::ir::{Position, SeatType, SpaceConfigInput, SpaceKey, SpaceType};

/// Reclinement angle assumed for seats that do not state one.
pub const DEFAULT_RECLINEMENT_ANGLE: u32 = 120;

/// Structural metadata carried by every space: a 0-based mirror of its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridMeta {
    pub row_index: u32,
    pub col_index: u32,
}

impl GridMeta {
    pub fn from_position(position: Position) -> Self {
        Self {
            row_index: position.row_index(),
            col_index: position.col_index(),
        }
    }
}

/// Derived placement flags, only meaningful for seats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SeatMeta {
    pub is_window: bool,
    pub is_legroom: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seat {
    pub seat_number: String,
    pub seat_type: SeatType,
    pub amenities: BTreeSet<String>,
    pub reclinement_angle: u32,
    pub meta: SeatMeta,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpaceKind {
    Seat(Seat),
    Hallway,
    Stairs,
    Bathroom,
    Empty,
}

impl SpaceKind {
    pub fn space_type(&self) -> SpaceType {
        match self {
            Self::Seat(_) => SpaceType::Seat,
            Self::Hallway => SpaceType::Hallway,
            Self::Stairs => SpaceType::Stairs,
            Self::Bathroom => SpaceType::Bathroom,
            Self::Empty => SpaceType::Empty,
        }
    }

    /// The variant for a non-seat type. Seats need their fields and return `None`.
    pub fn structural(space_type: SpaceType) -> Option<Self> {
        match space_type {
            SpaceType::Seat => None,
            SpaceType::Hallway => Some(Self::Hallway),
            SpaceType::Stairs => Some(Self::Stairs),
            SpaceType::Bathroom => Some(Self::Bathroom),
            SpaceType::Empty => Some(Self::Empty),
        }
    }
}

/// One cell of a seating grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "SpaceRecord", try_from = "SpaceRecord")]
pub struct Space {
    pub floor_number: u32,
    pub position: Position,
    pub meta: GridMeta,
    pub kind: SpaceKind,
    pub active: bool,
}

impl Space {
    pub fn new(floor_number: u32, position: Position, kind: SpaceKind) -> Self {
        Self {
            floor_number,
            position,
            meta: GridMeta::from_position(position),
            kind,
            active: true,
        }
    }

    pub fn key(&self) -> SpaceKey {
        SpaceKey::new(self.floor_number, self.position)
    }

    pub fn space_type(&self) -> SpaceType {
        self.kind.space_type()
    }

    pub fn seat(&self) -> Option<&Seat> {
        match &self.kind {
            SpaceKind::Seat(seat) => Some(seat),
            _ => None,
        }
    }

    pub fn seat_number(&self) -> Option<&str> {
        self.seat().map(|seat| seat.seat_number.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaRecord {
    pub row_index: u32,
    pub col_index: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_window: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_legroom: Option<bool>,
}

impl MetaRecord {
    pub fn structural(meta: GridMeta) -> Self {
        Self {
            row_index: meta.row_index,
            col_index: meta.col_index,
            is_window: None,
            is_legroom: None,
        }
    }

    pub fn seat(meta: GridMeta, seat: SeatMeta) -> Self {
        Self {
            is_window: Some(seat.is_window),
            is_legroom: Some(seat.is_legroom),
            ..Self::structural(meta)
        }
    }
}

/// Flat wire shape of a [`Space`], as handed to the persistence layer.
///
/// Seat-only fields are `null` and `amenities` is empty for every other type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpaceRecord {
    pub space_type: SpaceType,
    pub floor_number: u32,
    pub position: Position,
    #[serde(default)]
    pub seat_number: Option<String>,
    #[serde(default)]
    pub seat_type: Option<SeatType>,
    #[serde(default)]
    pub reclinement_angle: Option<u32>,
    #[serde(default)]
    pub amenities: BTreeSet<String>,
    #[serde(default)]
    pub meta: MetaRecord,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl From<Space> for SpaceRecord {
    fn from(space: Space) -> Self {
        let space_type = space.space_type();
        let mut record = SpaceRecord {
            space_type,
            floor_number: space.floor_number,
            position: space.position,
            seat_number: None,
            seat_type: None,
            reclinement_angle: None,
            amenities: BTreeSet::new(),
            meta: MetaRecord::structural(space.meta),
            active: space.active,
        };
        if let SpaceKind::Seat(seat) = space.kind {
            record.seat_number = Some(seat.seat_number);
            record.seat_type = Some(seat.seat_type);
            record.reclinement_angle = Some(seat.reclinement_angle);
            record.amenities = seat.amenities;
            record.meta = MetaRecord::seat(space.meta, seat.meta);
        }
        record
    }
}

impl From<&Space> for SpaceRecord {
    fn from(space: &Space) -> Self {
        SpaceRecord::from(space.clone())
    }
}

impl TryFrom<SpaceRecord> for Space {
    type Error = RecordError;

    fn try_from(record: SpaceRecord) -> Result<Self, Self::Error> {
        let key = SpaceKey::new(record.floor_number, record.position).to_string();
        if record.position.y == 0 {
            return Err(RecordError::RowOutOfRange { key });
        }
        let kind = match SpaceKind::structural(record.space_type) {
            Some(kind) => {
                let stray = if record.seat_number.is_some() {
                    Some("seatNumber")
                } else if record.seat_type.is_some() {
                    Some("seatType")
                } else if record.reclinement_angle.is_some() {
                    Some("reclinementAngle")
                } else if !record.amenities.is_empty() {
                    Some("amenities")
                } else {
                    None
                };
                if let Some(field) = stray {
                    return Err(RecordError::SeatFieldOnNonSeat {
                        key,
                        space_type: record.space_type,
                        field,
                    });
                }
                kind
            }
            None => {
                let seat_number = record
                    .seat_number
                    .filter(|number| !number.trim().is_empty())
                    .ok_or(RecordError::MissingSeatNumber { key })?;
                SpaceKind::Seat(Seat {
                    seat_number,
                    seat_type: record.seat_type.unwrap_or_default(),
                    amenities: record.amenities,
                    reclinement_angle: record
                        .reclinement_angle
                        .unwrap_or(DEFAULT_RECLINEMENT_ANGLE),
                    meta: SeatMeta {
                        is_window: record.meta.is_window.unwrap_or(false),
                        is_legroom: record.meta.is_legroom.unwrap_or(false),
                    },
                })
            }
        };
        let mut space = Space::new(record.floor_number, record.position, kind);
        space.active = record.active;
        Ok(space)
    }
}

impl From<&Space> for SpaceConfigInput {
    fn from(space: &Space) -> Self {
        let mut input = SpaceConfigInput::structural(
            space.floor_number,
            space.position,
            space.space_type(),
        );
        input.active = Some(space.active);
        if let SpaceKind::Seat(seat) = &space.kind {
            input.seat_number = Some(seat.seat_number.clone());
            input.seat_type = Some(seat.seat_type);
            input.amenities = Some(seat.amenities.clone());
            input.reclinement_angle = Some(seat.reclinement_angle);
        }
        input
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window_seat() -> Space {
        Space::new(
            1,
            Position::new(0, 1),
            SpaceKind::Seat(Seat {
                seat_number: "1".to_string(),
                seat_type: SeatType::Regular,
                amenities: BTreeSet::from(["window".to_string()]),
                reclinement_angle: 15,
                meta: SeatMeta {
                    is_window: true,
                    is_legroom: true,
                },
            }),
        )
    }

    #[test]
    fn seat_serializes_flat_with_seat_meta() {
        let value = serde_json::to_value(window_seat()).unwrap();
        assert_eq!(value["spaceType"], "seat");
        assert_eq!(value["seatNumber"], "1");
        assert_eq!(value["seatType"], "regular");
        assert_eq!(value["amenities"], serde_json::json!(["window"]));
        assert_eq!(value["meta"]["rowIndex"], 0);
        assert_eq!(value["meta"]["isWindow"], true);
        assert_eq!(value["meta"]["isLegroom"], true);
    }

    #[test]
    fn structural_space_has_null_seat_fields() {
        let space = Space::new(1, Position::new(2, 3), SpaceKind::Hallway);
        let value = serde_json::to_value(&space).unwrap();
        assert_eq!(value["spaceType"], "hallway");
        assert!(value["seatNumber"].is_null());
        assert!(value["reclinementAngle"].is_null());
        assert_eq!(value["amenities"], serde_json::json!([]));
        assert_eq!(value["meta"], serde_json::json!({"rowIndex": 2, "colIndex": 2}));
    }

    #[test]
    fn record_round_trip_keeps_seat() {
        let seat = window_seat();
        let json = serde_json::to_string(&seat).unwrap();
        let back: Space = serde_json::from_str(&json).unwrap();
        assert_eq!(back, seat);
    }

    #[test]
    fn rejects_seat_fields_on_structural_record() {
        let json = r#"{"spaceType":"bathroom","floorNumber":1,"position":{"x":4,"y":2},"seatNumber":"9"}"#;
        let err = serde_json::from_str::<Space>(json).unwrap_err();
        assert!(err.to_string().contains("seatNumber"), "{err}");
    }

    #[test]
    fn rejects_seat_without_number() {
        let record = SpaceRecord {
            space_type: SpaceType::Seat,
            floor_number: 1,
            position: Position::new(0, 1),
            seat_number: Some("  ".to_string()),
            seat_type: None,
            reclinement_angle: None,
            amenities: BTreeSet::new(),
            meta: MetaRecord::default(),
            active: true,
        };
        assert_eq!(
            Space::try_from(record),
            Err(RecordError::MissingSeatNumber {
                key: "1:0:1".to_string()
            })
        );
    }

    #[test]
    fn rejects_row_zero() {
        let json = r#"{"spaceType":"hallway","floorNumber":1,"position":{"x":2,"y":0}}"#;
        let err = serde_json::from_str::<Space>(json).unwrap_err();
        assert!(err.to_string().contains("row 0"), "{err}");
    }

    #[test]
    fn seat_record_fills_defaults() {
        let json = r#"{"spaceType":"seat","floorNumber":1,"position":{"x":1,"y":2},"seatNumber":"7"}"#;
        let space: Space = serde_json::from_str(json).unwrap();
        let seat = space.seat().unwrap();
        assert_eq!(seat.seat_type, SeatType::Regular);
        assert_eq!(seat.reclinement_angle, DEFAULT_RECLINEMENT_ANGLE);
        assert_eq!(space.meta, GridMeta { row_index: 1, col_index: 1 });
        assert!(space.active);
    }
}
