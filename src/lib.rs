#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod reconcile;
pub mod validate;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, GeneratorConfig, ReconcileConfig, ValidationConfig, ValidationMode};
pub use error::{ConfigurationError, Error, RecordError, Result, ValidationCode, ValidationError};
pub use ir::{FloorSpec, LayoutSpec, Position, SeatType, SpaceConfigInput, SpaceKey, SpaceType};
pub use layout::{LayoutSummary, Space, SpaceKind, SpaceRecord, generate_layout};
pub use reconcile::{Reconciliation, UpdatePayload, reconcile};
pub use validate::validate;
