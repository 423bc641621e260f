//! Per-point extreme value scan
//!
//! Groups every point load of a LoadSet by point key and records, for each
//! of the six components, the minimum and maximum value together with the
//! load case that attains it. Both the comparison and the envelope engines
//! are built on this table.
//!
//! Ties keep the first load case in original order: a later case only
//! replaces an extreme when it is strictly greater (max) or strictly
//! smaller (min).

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::loads::{Component, LoadSet};

/// A value and the load case that attains it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extreme {
    pub value: f64,
    /// Position of the load case in the scanned LoadSet
    pub load_case_index: usize,
    pub load_case: Option<String>,
}

/// Minimum and maximum of one component at one point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentExtremes {
    pub min: Extreme,
    pub max: Extreme,
}

impl ComponentExtremes {
    fn seed(extreme: Extreme) -> Self {
        ComponentExtremes {
            min: extreme.clone(),
            max: extreme,
        }
    }

    fn update(&mut self, candidate: &Extreme) {
        if candidate.value > self.max.value {
            self.max = candidate.clone();
        }
        if candidate.value < self.min.value {
            self.min = candidate.clone();
        }
    }

    /// `max - min`, never negative
    pub fn range(&self) -> f64 {
        self.max.value - self.min.value
    }
}

/// Extremes of every component at every point, keyed by point name
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtremesTable {
    points: BTreeMap<String, BTreeMap<Component, ComponentExtremes>>,
}

impl ExtremesTable {
    /// Scan all load cases of `loadset`
    pub fn scan(loadset: &LoadSet) -> Self {
        let mut points: BTreeMap<String, BTreeMap<Component, ComponentExtremes>> = BTreeMap::new();

        for (case_index, case) in loadset.load_cases.iter().enumerate() {
            for point in &case.point_loads {
                let components = points.entry(point.key().to_string()).or_default();
                for (component, value) in point.force_moment.components() {
                    let candidate = Extreme {
                        value,
                        load_case_index: case_index,
                        load_case: case.name.clone(),
                    };
                    match components.get_mut(&component) {
                        Some(existing) => existing.update(&candidate),
                        None => {
                            components.insert(component, ComponentExtremes::seed(candidate));
                        }
                    }
                }
            }
        }

        ExtremesTable { points }
    }

    /// Extremes for one point and component, if the point occurs
    pub fn get(&self, point: &str, component: Component) -> Option<&ComponentExtremes> {
        self.points.get(point).and_then(|c| c.get(&component))
    }

    /// Point names in sorted order
    pub fn point_names(&self) -> impl Iterator<Item = &str> {
        self.points.keys().map(String::as_str)
    }

    /// Every (point, component, extremes) entry in sorted order
    pub fn iter(&self) -> impl Iterator<Item = (&str, Component, &ComponentExtremes)> {
        self.points.iter().flat_map(|(point, components)| {
            components
                .iter()
                .map(move |(component, extremes)| (point.as_str(), *component, extremes))
        })
    }

    /// Indices of all load cases that hold at least one extreme
    pub fn extreme_case_indices(&self) -> BTreeSet<usize> {
        self.iter()
            .flat_map(|(_, _, e)| [e.min.load_case_index, e.max.load_case_index])
            .collect()
    }

    /// Drop components whose min and max are both exactly zero, and points
    /// left with no components. The envelope chooses holders from this view.
    pub fn without_zero_components(&self) -> Self {
        let points = self
            .points
            .iter()
            .filter_map(|(point, components)| {
                let kept: BTreeMap<Component, ComponentExtremes> = components
                    .iter()
                    .filter(|(_, e)| !(e.min.value == 0.0 && e.max.value == 0.0))
                    .map(|(c, e)| (*c, e.clone()))
                    .collect();
                (!kept.is_empty()).then(|| (point.clone(), kept))
            })
            .collect();
        ExtremesTable { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl LoadSet {
    /// Per-point, per-component extremes across all load cases
    pub fn point_extremes(&self) -> ExtremesTable {
        ExtremesTable::scan(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loads::{ForceMoment, LoadCase, PointLoad};
    use crate::units::Units;

    fn fx(value: f64) -> ForceMoment {
        ForceMoment::default().with(Component::Fx, value)
    }

    fn three_cases() -> LoadSet {
        LoadSet::new("T", 1, Units::default())
            .with_load_case(LoadCase::new("C1").with_point_load(PointLoad::new("A", fx(10.0))))
            .with_load_case(
                LoadCase::new("C2")
                    .with_point_load(PointLoad::new("A", fx(-5.0)))
                    .with_point_load(PointLoad::new("B", fx(3.0))),
            )
            .with_load_case(LoadCase::new("C3").with_point_load(PointLoad::new("A", fx(10.0))))
    }

    #[test]
    fn test_scan_records_values_and_cases() {
        let table = three_cases().point_extremes();
        let a = table.get("A", Component::Fx).unwrap();
        assert_eq!(a.max.value, 10.0);
        assert_eq!(a.min.value, -5.0);
        assert_eq!(a.min.load_case.as_deref(), Some("C2"));
        assert_eq!(a.range(), 15.0);
    }

    #[test]
    fn test_ties_keep_first_case() {
        let table = three_cases().point_extremes();
        let a = table.get("A", Component::Fx).unwrap();
        assert_eq!(a.max.load_case_index, 0);

        // All-zero components: both extremes sit on the first case
        let fy = table.get("A", Component::Fy).unwrap();
        assert_eq!(fy.max.load_case_index, 0);
        assert_eq!(fy.min.load_case_index, 0);
    }

    #[test]
    fn test_point_only_in_some_cases() {
        let table = three_cases().point_extremes();
        let b = table.get("B", Component::Fx).unwrap();
        assert_eq!(b.min.value, 3.0);
        assert_eq!(b.max.value, 3.0);
        assert_eq!(b.max.load_case_index, 1);
        assert!(table.get("C", Component::Fx).is_none());
    }

    #[test]
    fn test_case_indices() {
        let table = three_cases().point_extremes();
        let indices: Vec<usize> = table.extreme_case_indices().into_iter().collect();
        assert_eq!(indices, vec![0, 1]);
    }

    #[test]
    fn test_without_zero_components() {
        let table = three_cases().point_extremes().without_zero_components();
        assert!(table.get("A", Component::Fx).is_some());
        assert!(table.get("A", Component::Mz).is_none());
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_empty_loadset() {
        let table = LoadSet::new("Empty", 1, Units::default()).point_extremes();
        assert!(table.is_empty());
        assert!(table.extreme_case_indices().is_empty());
    }

    #[test]
    fn test_json_shape() {
        let table = three_cases().point_extremes();
        let value = serde_json::to_value(&table).unwrap();
        assert_eq!(value["A"]["fx"]["max"]["value"], 10.0);
        assert_eq!(value["A"]["fx"]["min"]["load_case"], "C2");
    }
}
