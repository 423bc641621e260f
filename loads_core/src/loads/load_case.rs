//! Point loads and load cases
//!
//! A [`LoadCase`] is one physical loading condition (one flight phase, one
//! gust, one landing) made of [`PointLoad`]s at named structural points.

use serde::{Deserialize, Serialize};

use super::force_moment::ForceMoment;

/// Join key used for point loads that carry no name
pub const UNNAMED_POINT: &str = "Unnamed";

/// Force/moment vector applied at a named structural point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointLoad {
    /// Point identifier; the join key for comparison and the export label
    #[serde(default)]
    pub name: Option<String>,

    /// Applied loads, in the owning LoadSet's units
    pub force_moment: ForceMoment,
}

impl PointLoad {
    /// Create a named point load
    pub fn new(name: impl Into<String>, force_moment: ForceMoment) -> Self {
        PointLoad {
            name: Some(name.into()),
            force_moment,
        }
    }

    /// Create a point load without a name
    pub fn unnamed(force_moment: ForceMoment) -> Self {
        PointLoad {
            name: None,
            force_moment,
        }
    }

    /// Name used to group this point across load cases
    pub fn key(&self) -> &str {
        self.name.as_deref().unwrap_or(UNNAMED_POINT)
    }

    /// Same point with its vector replaced
    pub(crate) fn with_force_moment(&self, force_moment: ForceMoment) -> Self {
        PointLoad {
            name: self.name.clone(),
            force_moment,
        }
    }
}

/// A named collection of point loads for one loading condition
///
/// # Example
/// ```
/// use loads_core::loads::{ForceMoment, LoadCase, PointLoad};
///
/// let case = LoadCase::new("Takeoff")
///     .with_description("Max thrust at rotation")
///     .with_point_load(PointLoad::new("Point A", ForceMoment::new(100.0, 0.0, 0.0, 0.0, 0.0, 0.0)));
///
/// assert_eq!(case.point_loads.len(), 1);
/// assert_eq!(case.label(), "Takeoff");
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LoadCase {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    /// Point loads in insertion order
    #[serde(default)]
    pub point_loads: Vec<PointLoad>,
}

impl LoadCase {
    /// Create an empty named load case
    pub fn new(name: impl Into<String>) -> Self {
        LoadCase {
            name: Some(name.into()),
            description: None,
            point_loads: Vec::new(),
        }
    }

    /// Set the description (builder pattern)
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Append a point load (builder pattern)
    pub fn with_point_load(mut self, point_load: PointLoad) -> Self {
        self.point_loads.push(point_load);
        self
    }

    /// Display label, falling back to "Unnamed"
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("Unnamed")
    }

    /// Names of the point loads, in insertion order
    pub fn point_names(&self) -> Vec<Option<String>> {
        self.point_loads.iter().map(|p| p.name.clone()).collect()
    }

    /// Same case with every vector passed through `f`
    pub(crate) fn map_force_moments(&self, f: impl Fn(&ForceMoment) -> ForceMoment) -> Self {
        LoadCase {
            name: self.name.clone(),
            description: self.description.clone(),
            point_loads: self
                .point_loads
                .iter()
                .map(|p| p.with_force_moment(f(&p.force_moment)))
                .collect(),
        }
    }
}
