//! # Transform Engine
//!
//! Pure functions that return a new [`LoadSet`] with every value converted
//! or scaled. The input is never modified.
//!
//! Both operations are linear, so they commute:
//! `scale(convert_to(l, u), k) == convert_to(scale(l, k), u)` up to rounding.
//!
//! ## Example
//!
//! ```rust
//! use loads_core::loads::{ForceMoment, LoadCase, LoadSet, PointLoad};
//! use loads_core::transform::{convert_to, scale};
//! use loads_core::units::{ForceUnit, Units};
//!
//! let loadset = LoadSet::new("Demo", 1, Units::paired(ForceUnit::N)).with_load_case(
//!     LoadCase::new("C1").with_point_load(PointLoad::new(
//!         "Point A",
//!         ForceMoment::new(100.0, 0.0, 0.0, 0.0, 0.0, 0.0),
//!     )),
//! );
//!
//! let kilo = convert_to(&loadset, Units::paired(ForceUnit::KN));
//! assert_eq!(kilo.load_cases[0].point_loads[0].force_moment.fx, 0.1);
//!
//! let factored = scale(&loadset, 1.5)?;
//! assert_eq!(factored.load_cases[0].point_loads[0].force_moment.fx, 150.0);
//! # Ok::<(), loads_core::errors::LoadError>(())
//! ```

use crate::errors::{LoadError, LoadResult};
use crate::loads::{LoadSet, LoadsType};
use crate::units::{ForceUnit, Units};

/// Convert every value of `loadset` into `target` units.
///
/// Force components use the force factor, moment components the moment
/// factor. Converting to the current units returns an equal LoadSet.
pub fn convert_to(loadset: &LoadSet, target: Units) -> LoadSet {
    let (force_factor, moment_factor) = loadset.units.conversion_factors(&target);
    tracing::debug!(
        from = %loadset.units,
        to = %target,
        force_factor,
        moment_factor,
        "converting LoadSet units"
    );
    map_values(loadset, target, force_factor, moment_factor)
}

/// Convert to a force unit and its conventional moment unit
pub fn convert_forces_to(loadset: &LoadSet, forces: ForceUnit) -> LoadSet {
    convert_to(loadset, Units::paired(forces))
}

/// Multiply every force and moment component by `factor`.
///
/// Negative and zero factors are valid engineering scalings. A NaN or
/// infinite factor is rejected, as is a factor that overflows a value.
pub fn scale(loadset: &LoadSet, factor: f64) -> LoadResult<LoadSet> {
    check_factor("factor", factor)?;
    tracing::debug!(factor, name = loadset.label(), "scaling LoadSet");
    let scaled = map_values(loadset, loadset.units, factor, factor);
    scaled.validate()?;
    Ok(scaled)
}

/// Scale limit loads by a safety factor and mark the result as ultimate.
///
/// A LoadSet with unspecified `loads_type` is treated as limit. A set that
/// is already ultimate is rejected, since factoring it again would double
/// count the safety factor.
pub fn to_ultimate(loadset: &LoadSet, safety_factor: f64) -> LoadResult<LoadSet> {
    check_factor("safety_factor", safety_factor)?;
    if loadset.loads_type == Some(LoadsType::Ultimate) {
        return Err(LoadError::validation(
            "loads_type",
            LoadsType::Ultimate.code(),
            format!("LoadSet already holds {}", LoadsType::Ultimate.description().to_lowercase()),
        ));
    }
    let mut ultimate = map_values(loadset, loadset.units, safety_factor, safety_factor);
    ultimate.validate()?;
    ultimate.loads_type = Some(LoadsType::Ultimate);
    Ok(ultimate)
}

fn check_factor(field: &str, factor: f64) -> LoadResult<()> {
    if !factor.is_finite() {
        return Err(LoadError::validation(field, factor.to_string(), "Factor must be a finite number"));
    }
    Ok(())
}

fn map_values(loadset: &LoadSet, units: Units, force_factor: f64, moment_factor: f64) -> LoadSet {
    let load_cases = loadset
        .load_cases
        .iter()
        .map(|case| case.map_force_moments(|fm| fm.scaled(force_factor, moment_factor)))
        .collect();
    loadset.with_cases(units, load_cases)
}

impl LoadSet {
    /// See [`convert_to`]
    pub fn convert_to(&self, target: Units) -> LoadSet {
        convert_to(self, target)
    }

    /// See [`convert_forces_to`]
    pub fn convert_forces_to(&self, forces: ForceUnit) -> LoadSet {
        convert_forces_to(self, forces)
    }

    /// See [`scale`]
    pub fn scale(&self, factor: f64) -> LoadResult<LoadSet> {
        scale(self, factor)
    }

    /// See [`to_ultimate`]
    pub fn to_ultimate(&self, safety_factor: f64) -> LoadResult<LoadSet> {
        to_ultimate(self, safety_factor)
    }
}
