mod generator;
pub mod placement;
pub(crate) mod types;
pub use generator::SeatAllocator;
pub use types::*;

use crate::config::GeneratorConfig;
use crate::error::ConfigurationError;
use crate::ir::{LayoutSpec, SpaceType};
use serde::Serialize;
use std::collections::BTreeMap;

/// Builds the default layout for `spec`.
///
/// Floors are emitted in ascending order, each row-major and left to right.
/// Seat numbers run continuously across floors. The output depends only on
/// the arguments.
pub fn generate_layout(
    spec: &LayoutSpec,
    is_double_decker: bool,
    config: &GeneratorConfig,
) -> Result<Vec<Space>, ConfigurationError> {
    generator::generate_spaces(spec, is_double_decker, config)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FloorSummary {
    pub floor_number: u32,
    pub seats: u32,
    pub hallways: u32,
    pub stairs: u32,
    pub bathrooms: u32,
    pub empty: u32,
}

impl FloorSummary {
    pub fn total(&self) -> u32 {
        self.seats + self.hallways + self.stairs + self.bathrooms + self.empty
    }

    fn count(&mut self, space_type: SpaceType) {
        match space_type {
            SpaceType::Seat => self.seats += 1,
            SpaceType::Hallway => self.hallways += 1,
            SpaceType::Stairs => self.stairs += 1,
            SpaceType::Bathroom => self.bathrooms += 1,
            SpaceType::Empty => self.empty += 1,
        }
    }
}

/// Per-floor tally of a layout, alongside the seat count the spec declares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutSummary {
    pub floors: Vec<FloorSummary>,
    pub total_seats: u32,
    pub declared_seats: u32,
}

impl LayoutSummary {
    pub fn from_spaces(spec: &LayoutSpec, spaces: &[Space]) -> Self {
        let mut floors: BTreeMap<u32, FloorSummary> = BTreeMap::new();
        for space in spaces {
            floors
                .entry(space.floor_number)
                .or_insert_with(|| FloorSummary {
                    floor_number: space.floor_number,
                    ..FloorSummary::default()
                })
                .count(space.space_type());
        }
        let total_seats = floors.values().map(|floor| floor.seats).sum();
        if spec.total_seats != 0 && spec.total_seats != total_seats {
            tracing::warn!(
                declared = spec.total_seats,
                generated = total_seats,
                "declared seat count differs from layout"
            );
        }
        Self {
            floors: floors.into_values().collect(),
            total_seats,
            declared_seats: spec.total_seats,
        }
    }

    pub fn matches_declared(&self) -> bool {
        self.declared_seats == self.total_seats
    }
}
