//! Structural validation of submitted layouts.
//!
//! Runs in two passes. The first checks each item on its own and against
//! the items before it (required fields, duplicates). The second, run only
//! when a [`LayoutSpec`] is known, checks floor, row and column bounds.

use std::collections::HashSet;

use crate::config::ValidationMode;
use crate::error::{ValidationCode, ValidationError, Violation};
use crate::ir::{LayoutSpec, SpaceConfigInput, SpaceKey};
use crate::layout::Space;

struct Violations {
    mode: ValidationMode,
    found: Vec<Violation>,
}

impl Violations {
    fn new(mode: ValidationMode) -> Self {
        Self {
            mode,
            found: Vec::new(),
        }
    }

    fn record(&mut self, violation: Violation) -> Result<(), ValidationError> {
        match self.mode {
            ValidationMode::FailFast => Err(ValidationError::single(violation)),
            ValidationMode::CollectAll => {
                self.found.push(violation);
                Ok(())
            }
        }
    }

    fn finish(self) -> Result<(), ValidationError> {
        match ValidationError::from_violations(self.found) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Checks `inputs` against the layout invariants.
///
/// Bounds are only checked when `spec` is given, since some callers validate
/// a layout before its diagram exists. Any column up to
/// `seatsLeft + seatsRight` is accepted for any space type, aisle included.
pub fn validate(
    inputs: &[SpaceConfigInput],
    spec: Option<&LayoutSpec>,
    mode: ValidationMode,
) -> Result<(), ValidationError> {
    let mut violations = Violations::new(mode);
    let result = check_structure(inputs, &mut violations).and_then(|()| match spec {
        Some(spec) => check_bounds(inputs, spec, &mut violations),
        None => Ok(()),
    });
    let result = result.and_then(|()| violations.finish());
    if let Err(err) = &result {
        tracing::debug!(
            code = %err.code(),
            violations = err.violations().len(),
            items = inputs.len(),
            "layout rejected"
        );
    }
    result
}

/// Validates an already materialized layout, such as generator output.
pub fn validate_spaces(
    spaces: &[Space],
    spec: Option<&LayoutSpec>,
    mode: ValidationMode,
) -> Result<(), ValidationError> {
    let inputs: Vec<SpaceConfigInput> = spaces.iter().map(SpaceConfigInput::from).collect();
    validate(&inputs, spec, mode)
}

fn check_structure(
    inputs: &[SpaceConfigInput],
    violations: &mut Violations,
) -> Result<(), ValidationError> {
    let mut positions: HashSet<SpaceKey> = HashSet::with_capacity(inputs.len());
    let mut seat_numbers: HashSet<&str> = HashSet::new();

    for (index, input) in inputs.iter().enumerate() {
        let Some(key) = input.key() else {
            violations.record(Violation::new(
                ValidationCode::MissingRequiredFields,
                index,
                format!(
                    "floorNumber and position are required (floorNumber: {}, position: {})",
                    describe(input.floor_number),
                    describe(input.position.map(|p| format!("{{x: {}, y: {}}}", p.x, p.y))),
                ),
            ))?;
            continue;
        };

        let is_seat = input.effective_type().is_seat();
        let seat_number = input.trimmed_seat_number();
        if is_seat && seat_number.is_none() {
            violations.record(Violation::new(
                ValidationCode::SeatNumberRequired,
                index,
                format!("seat at {key} has no seat number"),
            ))?;
        }

        if !positions.insert(key) {
            violations.record(Violation::new(
                ValidationCode::DuplicatePositions,
                index,
                format!("position {key} is used more than once"),
            ))?;
        }

        if let (true, Some(number)) = (is_seat, seat_number) {
            if !seat_numbers.insert(number) {
                violations.record(Violation::new(
                    ValidationCode::DuplicateSeatNumbers,
                    index,
                    format!("seat number {number:?} at {key} is used more than once"),
                ))?;
            }
        }
    }
    Ok(())
}

fn check_bounds(
    inputs: &[SpaceConfigInput],
    spec: &LayoutSpec,
    violations: &mut Violations,
) -> Result<(), ValidationError> {
    for (index, input) in inputs.iter().enumerate() {
        let Some(key) = input.key() else {
            continue;
        };

        if key.floor_number == 0 || key.floor_number > spec.num_floors {
            violations.record(Violation::new(
                ValidationCode::InvalidFloorNumber,
                index,
                format!(
                    "floor {} at {key} is outside 1..={}",
                    key.floor_number, spec.num_floors
                ),
            ))?;
            continue;
        }

        let Some(floor) = spec.floor(key.floor_number) else {
            violations.record(Violation::new(
                ValidationCode::FloorConfigNotFound,
                index,
                format!("floor configuration not found for floor {}", key.floor_number),
            ))?;
            continue;
        };

        if key.y == 0 || key.y > floor.num_rows {
            violations.record(Violation::new(
                ValidationCode::InvalidRowNumber,
                index,
                format!(
                    "row {} at {key} is outside 1..={}",
                    key.y, floor.num_rows
                ),
            ))?;
        }

        if key.x > floor.max_column() {
            violations.record(Violation::new(
                ValidationCode::InvalidColumnNumber,
                index,
                format!(
                    "column {} at {key} is outside 0..={}",
                    key.x,
                    floor.max_column()
                ),
            ))?;
        }
    }
    Ok(())
}

fn describe<T: ToString>(value: Option<T>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| "missing".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;
    use crate::ir::{FloorSpec, Position, SpaceType};
    use crate::layout::generate_layout;

    fn coach() -> LayoutSpec {
        LayoutSpec {
            num_floors: 1,
            floors: vec![FloorSpec {
                floor_number: 1,
                num_rows: 10,
                seats_left: 2,
                seats_right: 2,
            }],
            total_seats: 36,
        }
    }

    fn fail_fast(inputs: &[SpaceConfigInput], spec: Option<&LayoutSpec>) -> ValidationCode {
        validate(inputs, spec, ValidationMode::FailFast)
            .unwrap_err()
            .code()
    }

    #[test]
    fn duplicate_positions_rejected() {
        let inputs = vec![
            SpaceConfigInput::seat(1, Position::new(0, 1), "1"),
            SpaceConfigInput::seat(1, Position::new(0, 1), "2"),
        ];
        assert_eq!(fail_fast(&inputs, None), ValidationCode::DuplicatePositions);
    }

    #[test]
    fn column_past_right_edge_rejected() {
        let inputs = vec![SpaceConfigInput::seat(1, Position::new(5, 1), "1")];
        let err = validate(&inputs, Some(&coach()), ValidationMode::FailFast).unwrap_err();
        assert_eq!(err.code(), ValidationCode::InvalidColumnNumber);
        assert!(err.first().message.contains("column 5"), "{}", err);
        // Without a spec only structure is checked.
        assert!(validate(&inputs, None, ValidationMode::FailFast).is_ok());
    }

    #[test]
    fn oversized_floor_bounds_do_not_overflow() {
        let spec = LayoutSpec {
            num_floors: 1,
            floors: vec![FloorSpec {
                floor_number: 1,
                num_rows: 2,
                seats_left: u32::MAX,
                seats_right: 1,
            }],
            total_seats: 0,
        };
        let inputs = vec![SpaceConfigInput::seat(1, Position::new(7, 3), "1")];
        let err = validate(&inputs, Some(&spec), ValidationMode::FailFast).unwrap_err();
        assert_eq!(err.code(), ValidationCode::InvalidRowNumber);
    }

    #[test]
    fn aisle_column_accepts_any_type() {
        let inputs = vec![
            SpaceConfigInput::seat(1, Position::new(2, 3), "fold-1"),
            SpaceConfigInput::structural(1, Position::new(2, 4), SpaceType::Hallway),
            SpaceConfigInput::structural(1, Position::new(4, 10), SpaceType::Bathroom),
        ];
        assert!(validate(&inputs, Some(&coach()), ValidationMode::FailFast).is_ok());
    }

    #[test]
    fn missing_fields_rejected() {
        let inputs = vec![SpaceConfigInput {
            floor_number: Some(1),
            seat_number: Some("1".to_string()),
            ..SpaceConfigInput::default()
        }];
        assert_eq!(fail_fast(&inputs, None), ValidationCode::MissingRequiredFields);
    }

    #[test]
    fn implicit_seat_needs_number() {
        let inputs = vec![SpaceConfigInput {
            floor_number: Some(1),
            position: Some(Position::new(0, 1)),
            seat_number: Some("   ".to_string()),
            ..SpaceConfigInput::default()
        }];
        assert_eq!(fail_fast(&inputs, None), ValidationCode::SeatNumberRequired);
    }

    #[test]
    fn duplicate_seat_numbers_rejected() {
        let inputs = vec![
            SpaceConfigInput::seat(1, Position::new(0, 1), "7"),
            SpaceConfigInput::seat(1, Position::new(1, 1), "7"),
        ];
        assert_eq!(fail_fast(&inputs, None), ValidationCode::DuplicateSeatNumbers);
    }

    #[test]
    fn non_seat_seat_numbers_are_ignored() {
        let mut hallway = SpaceConfigInput::structural(1, Position::new(2, 1), SpaceType::Hallway);
        hallway.seat_number = Some("7".to_string());
        let inputs = vec![SpaceConfigInput::seat(1, Position::new(0, 1), "7"), hallway];
        assert!(validate(&inputs, None, ValidationMode::FailFast).is_ok());
    }

    #[test]
    fn bounds_checks() {
        let spec = coach();
        let floor = vec![SpaceConfigInput::seat(2, Position::new(0, 1), "1")];
        assert_eq!(fail_fast(&floor, Some(&spec)), ValidationCode::InvalidFloorNumber);

        let row = vec![SpaceConfigInput::seat(1, Position::new(0, 11), "1")];
        assert_eq!(fail_fast(&row, Some(&spec)), ValidationCode::InvalidRowNumber);

        let zero_row = vec![SpaceConfigInput::seat(1, Position::new(0, 0), "1")];
        assert_eq!(fail_fast(&zero_row, Some(&spec)), ValidationCode::InvalidRowNumber);
    }

    #[test]
    fn floor_in_range_without_config() {
        let spec = LayoutSpec {
            num_floors: 2,
            ..coach()
        };
        let inputs = vec![SpaceConfigInput::seat(2, Position::new(0, 1), "1")];
        assert_eq!(fail_fast(&inputs, Some(&spec)), ValidationCode::FloorConfigNotFound);
    }

    #[test]
    fn structure_is_reported_before_bounds() {
        let inputs = vec![
            SpaceConfigInput::seat(1, Position::new(9, 1), "1"),
            SpaceConfigInput::seat(1, Position::new(0, 1), "1"),
        ];
        assert_eq!(
            fail_fast(&inputs, Some(&coach())),
            ValidationCode::DuplicateSeatNumbers
        );
    }

    #[test]
    fn collect_all_reports_every_violation_in_pass_order() {
        let inputs = vec![
            SpaceConfigInput::seat(1, Position::new(9, 0), "1"),
            SpaceConfigInput::seat(1, Position::new(0, 1), "1"),
            SpaceConfigInput::default(),
            SpaceConfigInput::seat(1, Position::new(0, 1), "2"),
        ];
        let err = validate(&inputs, Some(&coach()), ValidationMode::CollectAll).unwrap_err();
        let found: Vec<(ValidationCode, usize)> = err
            .violations()
            .iter()
            .map(|v| (v.code, v.index))
            .collect();
        assert_eq!(
            found,
            vec![
                (ValidationCode::DuplicateSeatNumbers, 1),
                (ValidationCode::MissingRequiredFields, 2),
                (ValidationCode::DuplicatePositions, 3),
                (ValidationCode::InvalidRowNumber, 0),
                (ValidationCode::InvalidColumnNumber, 0),
            ]
        );
    }

    #[test]
    fn does_not_mutate_input() {
        let inputs = vec![SpaceConfigInput::seat(1, Position::new(0, 1), " 1 ")];
        let before = inputs.clone();
        validate(&inputs, Some(&coach()), ValidationMode::FailFast).unwrap();
        assert_eq!(inputs, before);
    }

    #[test]
    fn generated_layouts_validate() {
        let spec = coach();
        let spaces = generate_layout(&spec, false, &GeneratorConfig::default()).unwrap();
        assert!(validate_spaces(&spaces, Some(&spec), ValidationMode::CollectAll).is_ok());
    }
}
