//! # Comparison Engine
//!
//! Compares the per-point envelopes of two LoadSets: typically a
//! previously qualified baseline (`old`) against newly delivered customer
//! loads (`new`).
//!
//! For every point occurring in either set and each of the six components,
//! one [`ComparisonRow`] reports the old and new min/max and the percentage
//! change of the range, the max and the min. The engine reports these facts
//! only; deciding whether the new loads exceed the qualified envelope is up
//! to the caller.
//!
//! ## Percentage Policy
//!
//! | Change     | Formula                                      |
//! |------------|----------------------------------------------|
//! | `pct_range`| `(new_range - old_range) / old_range × 100`  |
//! | `pct_max`  | `(new_max - old_max) / |old_max| × 100`      |
//! | `pct_min`  | `(new_min - old_min) / |old_min| × 100`      |
//!
//! When the old base is exactly zero the change is
//! [`PercentChange::PositiveInfinite`] / [`PercentChange::NegativeInfinite`]
//! (or a finite 0 when the new value is zero too). When either side is
//! missing the change is [`PercentChange::Undefined`]. The raw values are
//! always present so the caller can decide for itself.
//!
//! ## Example
//!
//! ```rust
//! use loads_core::comparison::{compare, PercentChange};
//! use loads_core::loads::{Component, ForceMoment, LoadCase, LoadSet, PointLoad};
//! use loads_core::units::Units;
//!
//! let fx = |v: f64| ForceMoment::default().with(Component::Fx, v);
//! let old = LoadSet::new("Qualified", 1, Units::default())
//!     .with_load_case(LoadCase::new("C1").with_point_load(PointLoad::new("A", fx(0.0))))
//!     .with_load_case(LoadCase::new("C2").with_point_load(PointLoad::new("A", fx(10.0))));
//! let new = LoadSet::new("Delivered", 2, Units::default())
//!     .with_load_case(LoadCase::new("C1").with_point_load(PointLoad::new("A", fx(0.0))))
//!     .with_load_case(LoadCase::new("C2").with_point_load(PointLoad::new("A", fx(20.0))));
//!
//! let result = compare(&old, &new)?;
//! let row = result.row("A", Component::Fx).unwrap();
//! assert_eq!(row.pct_range, PercentChange::Finite(100.0));
//! assert_eq!(row.pct_max, PercentChange::Finite(100.0));
//! # Ok::<(), loads_core::errors::LoadError>(())
//! ```

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::errors::{LoadError, LoadResult};
use crate::extremes::{ComponentExtremes, ExtremesTable};
use crate::loads::{Component, LoadSet, LoadsType};
use crate::units::Units;

// ============================================================================
// Percentage Change
// ============================================================================

/// Percentage change of one quantity between the old and new set
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum PercentChange {
    /// Ordinary percentage (100.0 means doubled)
    Finite(f64),
    /// Old base was zero and the new value is larger
    PositiveInfinite,
    /// Old base was zero and the new value is smaller
    NegativeInfinite,
    /// One side has no value for this point
    Undefined,
}

impl PercentChange {
    /// Change from `old` to `new` relative to `|old|`
    pub fn between(old: f64, new: f64) -> Self {
        if old == 0.0 {
            if new > 0.0 {
                PercentChange::PositiveInfinite
            } else if new < 0.0 {
                PercentChange::NegativeInfinite
            } else {
                PercentChange::Finite(0.0)
            }
        } else {
            PercentChange::Finite((new - old) / old.abs() * 100.0)
        }
    }

    /// Change between two optional values; `Undefined` if either is absent
    pub fn between_optional(old: Option<f64>, new: Option<f64>) -> Self {
        match (old, new) {
            (Some(old), Some(new)) => PercentChange::between(old, new),
            _ => PercentChange::Undefined,
        }
    }

    /// The percentage when it is finite
    pub fn as_finite(&self) -> Option<f64> {
        match self {
            PercentChange::Finite(pct) => Some(*pct),
            _ => None,
        }
    }

    /// Whether the old base was zero and the new value is not
    pub fn is_unbounded(&self) -> bool {
        matches!(self, PercentChange::PositiveInfinite | PercentChange::NegativeInfinite)
    }
}

impl std::fmt::Display for PercentChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PercentChange::Finite(pct) => write!(f, "{:+.2}%", pct),
            PercentChange::PositiveInfinite => write!(f, "+inf%"),
            PercentChange::NegativeInfinite => write!(f, "-inf%"),
            PercentChange::Undefined => write!(f, "n/a"),
        }
    }
}

// ============================================================================
// Rows
// ============================================================================

/// Min/max of one component at one point within one LoadSet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SideExtremes {
    pub min: f64,
    pub max: f64,
    /// Load case attaining the minimum
    pub min_load_case: Option<String>,
    /// Load case attaining the maximum
    pub max_load_case: Option<String>,
}

impl SideExtremes {
    /// `max - min`
    pub fn range(&self) -> f64 {
        self.max - self.min
    }
}

impl From<&ComponentExtremes> for SideExtremes {
    fn from(extremes: &ComponentExtremes) -> Self {
        SideExtremes {
            min: extremes.min.value,
            max: extremes.max.value,
            min_load_case: extremes.min.load_case.clone(),
            max_load_case: extremes.max.load_case.clone(),
        }
    }
}

/// One (point, component) line of a comparison
///
/// `old` / `new` are `None` when the point does not occur in that set,
/// which is distinct from a point whose values are all zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub point_name: String,
    pub component: Component,
    pub old: Option<SideExtremes>,
    pub new: Option<SideExtremes>,
    pub pct_range: PercentChange,
    pub pct_max: PercentChange,
    pub pct_min: PercentChange,
}

impl ComparisonRow {
    /// Build a row and derive its percentage changes
    pub fn new(
        point_name: impl Into<String>,
        component: Component,
        old: Option<SideExtremes>,
        new: Option<SideExtremes>,
    ) -> Self {
        let pct_range = PercentChange::between_optional(
            old.as_ref().map(SideExtremes::range),
            new.as_ref().map(SideExtremes::range),
        );
        let pct_max = PercentChange::between_optional(
            old.as_ref().map(|s| s.max),
            new.as_ref().map(|s| s.max),
        );
        let pct_min = PercentChange::between_optional(
            old.as_ref().map(|s| s.min),
            new.as_ref().map(|s| s.min),
        );
        ComparisonRow {
            point_name: point_name.into(),
            component,
            old,
            new,
            pct_range,
            pct_max,
            pct_min,
        }
    }

    pub fn old_min(&self) -> Option<f64> {
        self.old.as_ref().map(|s| s.min)
    }

    pub fn old_max(&self) -> Option<f64> {
        self.old.as_ref().map(|s| s.max)
    }

    pub fn new_min(&self) -> Option<f64> {
        self.new.as_ref().map(|s| s.min)
    }

    pub fn new_max(&self) -> Option<f64> {
        self.new.as_ref().map(|s| s.max)
    }
}

// ============================================================================
// Comparison Result
// ============================================================================

/// Identifying data of a compared LoadSet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadSetMetadata {
    pub name: Option<String>,
    pub version: i64,
    pub description: Option<String>,
    pub units: Units,
    pub loads_type: Option<LoadsType>,
}

impl From<&LoadSet> for LoadSetMetadata {
    fn from(loadset: &LoadSet) -> Self {
        LoadSetMetadata {
            name: loadset.name.clone(),
            version: loadset.version,
            description: loadset.description.clone(),
            units: loadset.units,
            loads_type: loadset.loads_type,
        }
    }
}

/// Result of comparing two LoadSets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadSetCompare {
    pub old_loadset: LoadSetMetadata,
    pub new_loadset: LoadSetMetadata,
    /// Rows sorted by point name, components in canonical order
    pub comparison_rows: Vec<ComparisonRow>,
}

impl LoadSetCompare {
    /// Row for a point and component
    pub fn row(&self, point: &str, component: Component) -> Option<&ComparisonRow> {
        self.comparison_rows
            .iter()
            .find(|r| r.point_name == point && r.component == component)
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> LoadResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| LoadError::serialization(e.to_string()))
    }

    /// Headline statistics for reporting
    pub fn summary(&self) -> ComparisonSummary {
        let point_names: BTreeSet<String> = self.comparison_rows.iter().map(|r| r.point_name.clone()).collect();
        let components: BTreeSet<Component> = self.comparison_rows.iter().map(|r| r.component).collect();

        let only_in = |pick: fn(&ComparisonRow) -> bool| -> Vec<String> {
            point_names
                .iter()
                .filter(|p| {
                    self.comparison_rows
                        .iter()
                        .filter(|r| &r.point_name == *p)
                        .all(pick)
                })
                .cloned()
                .collect()
        };
        let points_only_in_old = only_in(|r| r.new.is_none());
        let points_only_in_new = only_in(|r| r.old.is_none());

        let mut largest_change: Option<LargestChange> = None;
        let mut unbounded_changes = 0;
        for row in &self.comparison_rows {
            for (measure, change) in [
                (ChangeMeasure::Range, row.pct_range),
                (ChangeMeasure::Max, row.pct_max),
                (ChangeMeasure::Min, row.pct_min),
            ] {
                if change.is_unbounded() {
                    unbounded_changes += 1;
                }
                let Some(pct) = change.as_finite() else { continue };
                let larger = largest_change
                    .as_ref()
                    .map_or(true, |current| pct.abs() > current.percent.abs());
                if larger {
                    largest_change = Some(LargestChange {
                        point_name: row.point_name.clone(),
                        component: row.component,
                        measure,
                        percent: pct,
                    });
                }
            }
        }

        ComparisonSummary {
            total_rows: self.comparison_rows.len(),
            unique_points: point_names.len(),
            components: components.into_iter().collect(),
            point_names: point_names.into_iter().collect(),
            points_only_in_old,
            points_only_in_new,
            unbounded_changes,
            largest_change,
        }
    }
}

/// Which quantity of a row a change refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeMeasure {
    Range,
    Max,
    Min,
}

/// The finite percentage change with the largest magnitude
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LargestChange {
    pub point_name: String,
    pub component: Component,
    pub measure: ChangeMeasure,
    pub percent: f64,
}

/// Headline statistics of a comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonSummary {
    pub total_rows: usize,
    pub unique_points: usize,
    pub point_names: Vec<String>,
    pub components: Vec<Component>,
    pub points_only_in_old: Vec<String>,
    pub points_only_in_new: Vec<String>,
    /// Changes from an exactly-zero old base to a nonzero new value
    pub unbounded_changes: usize,
    pub largest_change: Option<LargestChange>,
}

// ============================================================================
// Engine
// ============================================================================

/// Compare `new` against the `old` baseline.
///
/// Both sets must declare the same units; convert one of them first
/// otherwise. Fails with `UnitMismatch`.
pub fn compare(old: &LoadSet, new: &LoadSet) -> LoadResult<LoadSetCompare> {
    if old.units != new.units {
        return Err(LoadError::UnitMismatch {
            left: old.units,
            right: new.units,
        });
    }

    let old_table = ExtremesTable::scan(old);
    let new_table = ExtremesTable::scan(new);

    let points: BTreeSet<&str> = old_table.point_names().chain(new_table.point_names()).collect();

    let mut comparison_rows = Vec::with_capacity(points.len() * Component::ALL.len());
    for point in points {
        for component in Component::ALL {
            comparison_rows.push(ComparisonRow::new(
                point,
                component,
                old_table.get(point, component).map(SideExtremes::from),
                new_table.get(point, component).map(SideExtremes::from),
            ));
        }
    }

    tracing::debug!(
        old = old.label(),
        new = new.label(),
        rows = comparison_rows.len(),
        "compared LoadSets"
    );

    Ok(LoadSetCompare {
        old_loadset: LoadSetMetadata::from(old),
        new_loadset: LoadSetMetadata::from(new),
        comparison_rows,
    })
}

impl LoadSet {
    /// Compare `other` against `self` as the baseline. See [`compare`].
    pub fn compare_to(&self, other: &LoadSet) -> LoadResult<LoadSetCompare> {
        compare(self, other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loads::{ForceMoment, LoadCase, PointLoad};
    use crate::units::ForceUnit;
    use approx::assert_relative_eq;

    fn fx(value: f64) -> ForceMoment {
        ForceMoment::default().with(Component::Fx, value)
    }

    fn two_case_set(name: &str, point: &str, a: f64, b: f64) -> LoadSet {
        LoadSet::new(name, 1, Units::default())
            .with_load_case(LoadCase::new("C1").with_point_load(PointLoad::new(point, fx(a))))
            .with_load_case(LoadCase::new("C2").with_point_load(PointLoad::new(point, fx(b))))
    }

    #[test]
    fn test_percent_change_policy() {
        assert_eq!(PercentChange::between(10.0, 20.0), PercentChange::Finite(100.0));
        assert_eq!(PercentChange::between(-10.0, -20.0), PercentChange::Finite(-100.0));
        assert_eq!(PercentChange::between(0.0, 0.0), PercentChange::Finite(0.0));
        assert_eq!(PercentChange::between(0.0, 5.0), PercentChange::PositiveInfinite);
        assert_eq!(PercentChange::between(0.0, -5.0), PercentChange::NegativeInfinite);
        assert_eq!(PercentChange::between_optional(None, Some(1.0)), PercentChange::Undefined);
    }

    #[test]
    fn test_range_doubling() {
        let old = two_case_set("old", "A", 0.0, 10.0);
        let new = two_case_set("new", "A", 0.0, 20.0);
        let result = compare(&old, &new).unwrap();

        let row = result.row("A", Component::Fx).unwrap();
        assert_eq!(row.old_min(), Some(0.0));
        assert_eq!(row.old_max(), Some(10.0));
        assert_eq!(row.new_max(), Some(20.0));
        assert_eq!(row.pct_range, PercentChange::Finite(100.0));
        assert_eq!(row.pct_max, PercentChange::Finite(100.0));
        assert_eq!(row.pct_min, PercentChange::Finite(0.0));
        assert_eq!(row.new.as_ref().unwrap().max_load_case.as_deref(), Some("C2"));
    }

    #[test]
    fn test_point_only_in_new() {
        let old = two_case_set("old", "A", 0.0, 10.0);
        let new = old
            .clone()
            .with_load_case(LoadCase::new("C3").with_point_load(PointLoad::new("B", fx(7.0))));
        let result = compare(&old, &new).unwrap();

        let row = result.row("B", Component::Fx).unwrap();
        assert!(row.old.is_none());
        assert_eq!(row.new_min(), Some(7.0));
        assert_eq!(row.new_max(), Some(7.0));
        assert_eq!(row.pct_max, PercentChange::Undefined);

        // A zero-valued component is present, not missing
        let fy = result.row("B", Component::Fy).unwrap();
        assert_eq!(fy.new_max(), Some(0.0));
    }

    #[test]
    fn test_one_row_per_point_and_component() {
        let old = two_case_set("old", "A", 1.0, 2.0);
        let new = two_case_set("new", "B", 1.0, 2.0);
        let result = compare(&old, &new).unwrap();
        assert_eq!(result.comparison_rows.len(), 12);
        assert_eq!(result.comparison_rows[0].point_name, "A");
        assert_eq!(result.comparison_rows[0].component, Component::Fx);
        assert_eq!(result.comparison_rows[6].point_name, "B");
        assert_eq!(result.comparison_rows[11].component, Component::Mz);
    }

    #[test]
    fn test_unit_mismatch() {
        let old = two_case_set("old", "A", 1.0, 2.0);
        let new = old.convert_forces_to(ForceUnit::Lbf);
        let err = compare(&old, &new).unwrap_err();
        assert_eq!(err.error_code(), "UNIT_MISMATCH");
    }

    #[test]
    fn test_swapped_inputs() {
        let a = two_case_set("a", "A", 2.0, 10.0);
        let b = two_case_set("b", "A", 4.0, 20.0);
        let ab = compare(&a, &b).unwrap();
        let ba = compare(&b, &a).unwrap();

        let r_ab = ab.row("A", Component::Fx).unwrap();
        let r_ba = ba.row("A", Component::Fx).unwrap();
        assert_eq!(r_ab.old, r_ba.new);
        assert_eq!(r_ab.new, r_ba.old);

        let up = r_ab.pct_range.as_finite().unwrap();
        let down = r_ba.pct_range.as_finite().unwrap();
        assert_relative_eq!((1.0 + up / 100.0) * (1.0 + down / 100.0), 1.0, max_relative = 1e-12);
    }

    #[test]
    fn test_metadata() {
        let old = two_case_set("old", "A", 1.0, 2.0).with_loads_type(LoadsType::Limit);
        let new = two_case_set("new", "A", 1.0, 2.0);
        let result = old.compare_to(&new).unwrap();
        assert_eq!(result.old_loadset.name.as_deref(), Some("old"));
        assert_eq!(result.old_loadset.loads_type, Some(LoadsType::Limit));
        assert_eq!(result.new_loadset.units, Units::default());
    }

    #[test]
    fn test_json_shape() {
        let old = two_case_set("old", "A", 0.0, 10.0);
        let new = old.clone().with_load_case(LoadCase::new("C3").with_point_load(PointLoad::new("B", fx(1.0))));
        let json = compare(&old, &new).unwrap().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        let first = &value["comparison_rows"][0];
        assert_eq!(first["point_name"], "A");
        assert_eq!(first["component"], "fx");
        assert_eq!(first["pct_max"]["kind"], "finite");

        let b_row = &value["comparison_rows"][6];
        assert!(b_row["old"].is_null());
        assert_eq!(b_row["pct_max"]["kind"], "undefined");
    }

    #[test]
    fn test_summary() {
        let old = two_case_set("old", "A", 0.0, 10.0);
        let new = two_case_set("new", "A", 0.0, 30.0)
            .with_load_case(LoadCase::new("C3").with_point_load(PointLoad::new("B", fx(1.0))));
        let summary = compare(&old, &new).unwrap().summary();

        assert_eq!(summary.total_rows, 12);
        assert_eq!(summary.unique_points, 2);
        assert_eq!(summary.points_only_in_new, vec!["B".to_string()]);
        assert!(summary.points_only_in_old.is_empty());

        let largest = summary.largest_change.unwrap();
        assert_eq!(largest.point_name, "A");
        assert_eq!(largest.component, Component::Fx);
        assert_eq!(largest.measure, ChangeMeasure::Range);
        assert_eq!(largest.percent, 200.0);
    }

    #[test]
    fn test_display() {
        assert_eq!(PercentChange::Finite(12.5).to_string(), "+12.50%");
        assert_eq!(PercentChange::Undefined.to_string(), "n/a");
    }
}
