//! Force/moment vectors and their six components
//!
//! A [`ForceMoment`] is the atomic load record: three force components and
//! three moment components applied at one point, in the units of the owning
//! LoadSet.

use serde::{Deserialize, Serialize};

/// One of the six scalar components of a [`ForceMoment`]
///
/// # Example
/// ```
/// use loads_core::loads::Component;
///
/// assert_eq!(Component::Mx.code(), "mx");
/// assert!(Component::Fz.is_force());
/// assert!(!Component::Mz.is_force());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Component {
    Fx,
    Fy,
    Fz,
    Mx,
    My,
    Mz,
}

impl Component {
    /// All components in canonical order (forces first, then moments)
    pub const ALL: [Component; 6] = [
        Component::Fx,
        Component::Fy,
        Component::Fz,
        Component::Mx,
        Component::My,
        Component::Mz,
    ];

    /// Lowercase label used in JSON and solver commands
    pub fn code(&self) -> &'static str {
        match self {
            Component::Fx => "fx",
            Component::Fy => "fy",
            Component::Fz => "fz",
            Component::Mx => "mx",
            Component::My => "my",
            Component::Mz => "mz",
        }
    }

    /// Whether this is a force component (as opposed to a moment)
    pub fn is_force(&self) -> bool {
        matches!(self, Component::Fx | Component::Fy | Component::Fz)
    }

    /// Position in [`Component::ALL`]
    pub fn index(&self) -> usize {
        match self {
            Component::Fx => 0,
            Component::Fy => 1,
            Component::Fz => 2,
            Component::Mx => 3,
            Component::My => 4,
            Component::Mz => 5,
        }
    }
}

impl std::fmt::Display for Component {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Force and moment vector at a point
///
/// Absent components default to 0.0 when deserialized.
///
/// # JSON Format
/// ```json
/// { "fx": 100.0, "fy": 0.0, "fz": -25.0, "mx": 0.0, "my": 12.5, "mz": 0.0 }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ForceMoment {
    #[serde(default)]
    pub fx: f64,
    #[serde(default)]
    pub fy: f64,
    #[serde(default)]
    pub fz: f64,
    #[serde(default)]
    pub mx: f64,
    #[serde(default)]
    pub my: f64,
    #[serde(default)]
    pub mz: f64,
}

impl ForceMoment {
    /// Create a vector from all six components
    pub fn new(fx: f64, fy: f64, fz: f64, mx: f64, my: f64, mz: f64) -> Self {
        ForceMoment { fx, fy, fz, mx, my, mz }
    }

    /// Set a single component (builder pattern)
    pub fn with(mut self, component: Component, value: f64) -> Self {
        match component {
            Component::Fx => self.fx = value,
            Component::Fy => self.fy = value,
            Component::Fz => self.fz = value,
            Component::Mx => self.mx = value,
            Component::My => self.my = value,
            Component::Mz => self.mz = value,
        }
        self
    }

    /// Read a single component
    pub fn get(&self, component: Component) -> f64 {
        match component {
            Component::Fx => self.fx,
            Component::Fy => self.fy,
            Component::Fz => self.fz,
            Component::Mx => self.mx,
            Component::My => self.my,
            Component::Mz => self.mz,
        }
    }

    /// All components paired with their values, in canonical order
    pub fn components(&self) -> [(Component, f64); 6] {
        Component::ALL.map(|c| (c, self.get(c)))
    }

    /// Multiply forces by `force_factor` and moments by `moment_factor`
    pub fn scaled(&self, force_factor: f64, moment_factor: f64) -> Self {
        ForceMoment {
            fx: self.fx * force_factor,
            fy: self.fy * force_factor,
            fz: self.fz * force_factor,
            mx: self.mx * moment_factor,
            my: self.my * moment_factor,
            mz: self.mz * moment_factor,
        }
    }

    /// First component that is NaN or infinite, if any
    pub fn first_non_finite(&self) -> Option<(Component, f64)> {
        self.components().into_iter().find(|(_, v)| !v.is_finite())
    }

    /// Whether every component is exactly zero
    pub fn is_zero(&self) -> bool {
        self.components().iter().all(|(_, v)| *v == 0.0)
    }
}
