use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::ir::SpaceType;

/// The supplied [`LayoutSpec`](crate::ir::LayoutSpec) is internally inconsistent.
///
/// These indicate a caller or programming bug rather than bad user input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("floor configuration not found for floor {floor}")]
    FloorNotFound { floor: u32 },
    #[error("floor {floor} is configured more than once")]
    DuplicateFloor { floor: u32 },
    #[error("floor {floor} is outside the declared range 1..={num_floors}")]
    FloorOutOfRange { floor: u32, num_floors: u32 },
    #[error("layout declares {num_floors} floors but has no configuration for floor {floor}")]
    MissingFloor { floor: u32, num_floors: u32 },
    #[error("floor {floor} has no rows")]
    EmptyFloor { floor: u32 },
    #[error("layout must declare at least one floor")]
    NoFloors,
    #[error("floor {floor} has more cells than a layout can address")]
    FloorTooLarge { floor: u32 },
    #[error("seat numbers run out after {last}")]
    SeatNumbersExhausted { last: u32 },
}

/// Reason codes reported by the validator and the reconciliation engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationCode {
    MissingRequiredFields,
    SeatNumberRequired,
    DuplicatePositions,
    DuplicateSeatNumbers,
    InvalidFloorNumber,
    InvalidRowNumber,
    InvalidColumnNumber,
    FloorConfigNotFound,
}

impl ValidationCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MissingRequiredFields => "MISSING_REQUIRED_FIELDS",
            Self::SeatNumberRequired => "SEAT_NUMBER_REQUIRED",
            Self::DuplicatePositions => "DUPLICATE_POSITIONS",
            Self::DuplicateSeatNumbers => "DUPLICATE_SEAT_NUMBERS",
            Self::InvalidFloorNumber => "INVALID_FLOOR_NUMBER",
            Self::InvalidRowNumber => "INVALID_ROW_NUMBER",
            Self::InvalidColumnNumber => "INVALID_COLUMN_NUMBER",
            Self::FloorConfigNotFound => "FLOOR_CONFIG_NOT_FOUND",
        }
    }
}

impl fmt::Display for ValidationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single failed check, pointing at the offending input item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub code: ValidationCode,
    /// Index of the offending item in the submitted list.
    pub index: usize,
    pub message: String,
}

impl Violation {
    pub fn new(code: ValidationCode, index: usize, message: impl Into<String>) -> Self {
        Self {
            code,
            index,
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at item {}: {}", self.code, self.index, self.message)
    }
}

/// User-supplied layout data fails a structural or uniqueness invariant.
///
/// Always holds at least one violation. In fail-fast mode it holds exactly one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    violations: Vec<Violation>,
}

impl ValidationError {
    pub fn single(violation: Violation) -> Self {
        Self {
            violations: vec![violation],
        }
    }

    /// Returns `None` when there is nothing to report.
    pub fn from_violations(violations: Vec<Violation>) -> Option<Self> {
        if violations.is_empty() {
            None
        } else {
            Some(Self { violations })
        }
    }

    pub fn first(&self) -> &Violation {
        &self.violations[0]
    }

    pub fn code(&self) -> ValidationCode {
        self.first().code
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn into_violations(self) -> Vec<Violation> {
        self.violations
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.first())?;
        let rest = self.violations.len() - 1;
        if rest > 0 {
            write!(f, " (and {rest} more)")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// A wire record that cannot be represented as a [`Space`](crate::layout::Space).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("seat at {key} has no seat number")]
    MissingSeatNumber { key: String },
    #[error("{space_type} space at {key} carries seat-only field `{field}`")]
    SeatFieldOnNonSeat {
        key: String,
        space_type: SpaceType,
        field: &'static str,
    },
    #[error("space at {key} has row 0; rows start at 1")]
    RowOutOfRange { key: String },
    #[error("no stored space at {key}")]
    UnknownSpace { key: String },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Record(#[from] RecordError),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floor_not_found_message_names_floor() {
        let err = ConfigurationError::FloorNotFound { floor: 3 };
        assert_eq!(err.to_string(), "floor configuration not found for floor 3");
    }

    #[test]
    fn validation_error_display_counts_extra_violations() {
        let err = ValidationError::from_violations(vec![
            Violation::new(ValidationCode::DuplicatePositions, 1, "position 1:0:1 repeated"),
            Violation::new(ValidationCode::InvalidRowNumber, 4, "row 9 outside 1..=8"),
        ])
        .unwrap();
        assert_eq!(err.code(), ValidationCode::DuplicatePositions);
        assert_eq!(
            err.to_string(),
            "DUPLICATE_POSITIONS at item 1: position 1:0:1 repeated (and 1 more)"
        );
    }

    #[test]
    fn empty_violation_list_is_not_an_error() {
        assert!(ValidationError::from_violations(Vec::new()).is_none());
    }

    #[test]
    fn codes_serialize_screaming_snake_case() {
        let json = serde_json::to_string(&ValidationCode::InvalidColumnNumber).unwrap();
        assert_eq!(json, "\"INVALID_COLUMN_NUMBER\"");
    }
}
