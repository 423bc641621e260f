//! LoadSet data model
//!
//! This module provides the value types that describe customer load data:
//!
//! - [`ForceMoment`] / [`Component`] - six-component load vector at a point
//! - [`PointLoad`] - a vector attached to a named point
//! - [`LoadCase`] - one loading condition made of point loads
//! - [`LoadsType`] - limit vs ultimate classification
//! - [`LoadSet`] - the aggregate root: named, versioned cases in one unit system
//!
//! A LoadSet is never mutated by the engine. Every transform (see
//! [`crate::transform`]) returns a new value.
//!
//! # Example
//!
//! ```
//! use loads_core::loads::LoadSet;
//!
//! let json = r#"{
//!     "name": "Customer Loads",
//!     "version": 1,
//!     "units": {"forces": "N", "moments": "Nm"},
//!     "load_cases": [
//!         {"name": "Cruise", "point_loads": [
//!             {"name": "Point A", "force_moment": {"fx": 100.0}}
//!         ]}
//!     ]
//! }"#;
//!
//! let loadset = LoadSet::from_json(json).unwrap();
//! assert_eq!(loadset.load_cases.len(), 1);
//! assert!(loadset.loads_type.is_none());
//! ```

pub mod force_moment;
pub mod load_case;
pub mod load_types;

pub use force_moment::{Component, ForceMoment};
pub use load_case::{LoadCase, PointLoad, UNNAMED_POINT};
pub use load_types::LoadsType;

use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::{LoadError, LoadResult};
use crate::units::Units;

/// A named, versioned collection of load cases sharing one unit system
///
/// # JSON Format
/// ```json
/// {
///   "name": "Customer Loads",
///   "version": 2,
///   "description": "Rev B delivery",
///   "units": { "forces": "kN", "moments": "kNm" },
///   "loads_type": "limit",
///   "load_cases": [ ... ]
/// }
/// ```
///
/// `name` must be present but may be `null`. `loads_type` may be absent,
/// meaning unspecified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadSet {
    #[serde(deserialize_with = "required_nullable")]
    pub name: Option<String>,

    pub version: i64,

    pub units: Units,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loads_type: Option<LoadsType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Load cases in customer order
    pub load_cases: Vec<LoadCase>,
}

/// Accepts `null` but still fails when the key is missing
fn required_nullable<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)
}

impl LoadSet {
    /// Create an empty LoadSet
    pub fn new(name: impl Into<String>, version: i64, units: Units) -> Self {
        LoadSet {
            name: Some(name.into()),
            version,
            units,
            loads_type: None,
            description: None,
            load_cases: Vec::new(),
        }
    }

    /// Set the description (builder pattern)
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the load level (builder pattern)
    pub fn with_loads_type(mut self, loads_type: LoadsType) -> Self {
        self.loads_type = Some(loads_type);
        self
    }

    /// Append a load case (builder pattern)
    pub fn with_load_case(mut self, load_case: LoadCase) -> Self {
        self.load_cases.push(load_case);
        self
    }

    /// Parse and validate a LoadSet from a JSON document.
    ///
    /// Fails with `Validation` on malformed JSON, a missing required field,
    /// an unknown unit or loads_type, or a non-finite value. Nothing is
    /// partially constructed.
    pub fn from_json(json: &str) -> LoadResult<Self> {
        let loadset: LoadSet =
            serde_json::from_str(json).map_err(|e| LoadError::from_json_input(&e))?;
        loadset.validate()?;
        tracing::debug!(
            name = loadset.label(),
            cases = loadset.load_cases.len(),
            units = %loadset.units,
            "loaded LoadSet"
        );
        Ok(loadset)
    }

    /// Parse and validate a LoadSet from an already-decoded JSON value
    pub fn from_value(value: serde_json::Value) -> LoadResult<Self> {
        let loadset: LoadSet =
            serde_json::from_value(value).map_err(|e| LoadError::from_json_input(&e))?;
        loadset.validate()?;
        Ok(loadset)
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> LoadResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| LoadError::serialization(e.to_string()))
    }

    /// Check the invariants serde cannot express.
    ///
    /// Every force/moment component must be finite; the error names the
    /// exact location of the first offending value.
    pub fn validate(&self) -> LoadResult<()> {
        for (case_index, case) in self.load_cases.iter().enumerate() {
            for (point_index, point) in case.point_loads.iter().enumerate() {
                if let Some((component, value)) = point.force_moment.first_non_finite() {
                    return Err(LoadError::validation(
                        format!(
                            "load_cases[{}].point_loads[{}].force_moment.{}",
                            case_index, point_index, component
                        ),
                        value.to_string(),
                        "Force and moment values must be finite",
                    ));
                }
            }
        }
        Ok(())
    }

    /// Display label, falling back to "Unnamed"
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("Unnamed")
    }

    /// Whether the set contains no load cases
    pub fn is_empty(&self) -> bool {
        self.load_cases.is_empty()
    }

    /// Distinct point keys across all load cases, sorted
    pub fn point_names(&self) -> BTreeSet<String> {
        self.load_cases
            .iter()
            .flat_map(|case| case.point_loads.iter().map(|p| p.key().to_string()))
            .collect()
    }

    /// Total number of point loads across all cases
    pub fn total_point_loads(&self) -> usize {
        self.load_cases.iter().map(|c| c.point_loads.len()).sum()
    }

    /// Same set metadata with the given cases
    pub(crate) fn with_cases(&self, units: Units, load_cases: Vec<LoadCase>) -> Self {
        LoadSet {
            name: self.name.clone(),
            version: self.version,
            units,
            loads_type: self.loads_type,
            description: self.description.clone(),
            load_cases,
        }
    }

    /// Overview of the set for reporting
    pub fn summary(&self) -> LoadSetSummary {
        LoadSetSummary {
            name: self.name.clone(),
            description: self.description.clone(),
            version: self.version,
            units: self.units,
            loads_type: self.loads_type,
            num_load_cases: self.load_cases.len(),
            total_point_loads: self.total_point_loads(),
            load_cases: self.list_load_cases(),
        }
    }

    /// Per-case overview, in case order
    pub fn list_load_cases(&self) -> Vec<LoadCaseSummary> {
        self.load_cases
            .iter()
            .map(|case| LoadCaseSummary {
                name: case.name.clone(),
                description: case.description.clone(),
                num_point_loads: case.point_loads.len(),
                point_load_names: case.point_names(),
            })
            .collect()
    }
}

/// Reporting overview of a LoadSet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadSetSummary {
    pub name: Option<String>,
    pub description: Option<String>,
    pub version: i64,
    pub units: Units,
    pub loads_type: Option<LoadsType>,
    pub num_load_cases: usize,
    pub total_point_loads: usize,
    pub load_cases: Vec<LoadCaseSummary>,
}

/// Reporting overview of one load case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadCaseSummary {
    pub name: Option<String>,
    pub description: Option<String>,
    pub num_point_loads: usize,
    pub point_load_names: Vec<Option<String>>,
}
