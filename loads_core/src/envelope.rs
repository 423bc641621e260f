//! # Envelope Engine
//!
//! Reduces a LoadSet to the load cases that bound the structural analysis.
//! A case is kept if and only if it attains the global maximum or minimum
//! of at least one component at at least one point. When several cases
//! attain the same extreme, the first one in original order holds it.
//!
//! Components that are zero in every case carry no load and hold no
//! extreme; otherwise the first case mentioning a point would always be
//! kept for its unloaded components.
//!
//! The result:
//! - contains only cases from the input, in their original relative order
//! - is non-empty whenever the input is non-empty
//! - has exactly the same per-(point, component) min and max as the input
//!   for every component that is nonzero somewhere
//!
//! ## Example
//!
//! ```rust
//! use loads_core::envelope::envelope;
//! use loads_core::loads::{Component, ForceMoment, LoadCase, LoadSet, PointLoad};
//! use loads_core::units::Units;
//!
//! let fx = |v: f64| ForceMoment::default().with(Component::Fx, v);
//! let loadset = LoadSet::new("Flight", 1, Units::default())
//!     .with_load_case(LoadCase::new("Climb").with_point_load(PointLoad::new("A", fx(10.0))))
//!     .with_load_case(LoadCase::new("Cruise").with_point_load(PointLoad::new("A", fx(4.0))))
//!     .with_load_case(LoadCase::new("Descent").with_point_load(PointLoad::new("A", fx(-5.0))));
//!
//! let reduced = envelope(&loadset);
//! let names: Vec<_> = reduced.load_cases.iter().map(|c| c.label()).collect();
//! assert_eq!(names, ["Climb", "Descent"]);
//! ```

use std::collections::BTreeSet;

use crate::extremes::ExtremesTable;
use crate::loads::LoadSet;

/// Indices of the load cases that hold at least one global extreme of a
/// loaded component, ascending
pub fn envelope_case_indices(loadset: &LoadSet) -> BTreeSet<usize> {
    ExtremesTable::scan(loadset)
        .without_zero_components()
        .extreme_case_indices()
}

/// Reduce `loadset` to the cases holding a global extreme.
pub fn envelope(loadset: &LoadSet) -> LoadSet {
    if loadset.load_cases.len() <= 1 {
        return loadset.clone();
    }

    let keep = envelope_case_indices(loadset);
    let load_cases = loadset
        .load_cases
        .iter()
        .enumerate()
        .filter(|(index, _)| keep.contains(index))
        .map(|(_, case)| case.clone())
        .collect::<Vec<_>>();

    // Without point loads or with only zero loads there are no extremes to
    // hold; keep the first case so the result stays non-empty.
    let load_cases = if load_cases.is_empty() {
        vec![loadset.load_cases[0].clone()]
    } else {
        load_cases
    };

    tracing::debug!(
        name = loadset.label(),
        original = loadset.load_cases.len(),
        retained = load_cases.len(),
        "enveloped LoadSet"
    );

    loadset.with_cases(loadset.units, load_cases)
}

impl LoadSet {
    /// See [`envelope`]
    pub fn envelope(&self) -> LoadSet {
        envelope(self)
    }
}
