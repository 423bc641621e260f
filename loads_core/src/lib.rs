//! # loads_core - Aerospace Load Data Engine
//!
//! `loads_core` ingests customer load data (LoadSets), normalizes units,
//! scales to limit or ultimate levels, finds per-point extremes, reduces a
//! LoadSet to its bounding envelope, compares two revisions, and exports
//! per-case solver command files. It can also generate synthetic load
//! cases balanced over a set of interface points. All inputs and outputs are
//! JSON-serializable so the engine can sit behind a CLI, a service or an
//! assistant tool layer.
//!
//! ## Design Philosophy
//!
//! - **Immutable values**: every transform returns a new LoadSet
//! - **JSON-First**: all types implement Serialize/Deserialize
//! - **Rich Errors**: structured error types with stable codes
//! - **Deterministic**: same input, same output, byte for byte
//!
//! ## Quick Start
//!
//! ```rust
//! use loads_core::units::{ForceUnit, Units};
//! use loads_core::LoadSet;
//!
//! let json = r#"{
//!     "name": "Wing Loads",
//!     "version": 1,
//!     "units": {"forces": "N", "moments": "Nm"},
//!     "load_cases": [
//!         {"name": "Gust", "point_loads": [
//!             {"name": "Root", "force_moment": {"fz": 1500.0, "mx": 320.0}}
//!         ]}
//!     ]
//! }"#;
//!
//! let loadset = LoadSet::from_json(json)?;
//! let kn = loadset.convert_to(Units::paired(ForceUnit::KN));
//! let ultimate = kn.scale(1.5)?;
//! assert!((ultimate.load_cases[0].point_loads[0].force_moment.fz - 2.25).abs() < 1e-12);
//! # Ok::<(), loads_core::errors::LoadError>(())
//! ```
//!
//! ## Modules
//!
//! - [`loads`] - LoadSet data model and JSON ingestion
//! - [`units`] - Force and moment units with conversion factors
//! - [`transform`] - Unit conversion, scaling and ultimate factoring
//! - [`extremes`] - Per-point, per-component min/max tables
//! - [`envelope`] - Reduction to the extreme-bearing load cases
//! - [`balance`] - Balanced load case generation
//! - [`comparison`] - Revision-to-revision comparison with percent changes
//! - [`export`] - Solver command file generation
//! - [`settings`] - TOML configuration for export formatting
//! - [`file_io`] - JSON file reading and atomic writes
//! - [`errors`] - Structured error types

pub mod balance;
pub mod comparison;
pub mod envelope;
pub mod errors;
pub mod export;
pub mod extremes;
pub mod file_io;
pub mod loads;
pub mod settings;
pub mod transform;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use balance::{generate_balanced_loadset, BalanceRequest};
pub use comparison::{compare, ComparisonRow, ComparisonSummary, LoadSetCompare, PercentChange};
pub use envelope::envelope;
pub use errors::{LoadError, LoadResult};
pub use export::{export, export_with_settings, ExportedFile};
pub use extremes::ExtremesTable;
pub use file_io::{read_loadset, to_json, write_json};
pub use loads::{Component, ForceMoment, LoadCase, LoadSet, LoadsType, PointLoad};
pub use settings::{ExportSettings, Settings};
pub use units::{ForceUnit, MomentUnit, Units};

/// Parse and validate a LoadSet from JSON text. See [`LoadSet::from_json`].
pub fn load(json: &str) -> LoadResult<LoadSet> {
    LoadSet::from_json(json)
}
