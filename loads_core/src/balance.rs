//! Balanced load case generation
//!
//! Builds synthetic LoadSets whose cases are in static equilibrium over a
//! set of interface points. Each constrained component is drawn uniformly
//! from its range; the remaining (free) components are solved so that the
//! sums of forces and of moments about the origin vanish, taking the
//! minimum-norm solution when the free components are under-determined.
//!
//! Positions are in the length unit that turns `position x force` into the
//! LoadSet's moment unit: metres for N/Nm or kN/kNm, feet for lbf/lbf-ft.
//!
//! ```rust
//! use loads_core::balance::{generate_balanced_loadset, BalanceRequest, Interface};
//! use loads_core::loads::Component;
//!
//! let request = BalanceRequest::new(vec![
//!     Interface::new("Fwd", [0.0, 0.0, 0.0]),
//!     Interface::new("Aft", [2.0, 0.0, 0.0]),
//! ])
//! .with_range("Fwd", Component::Fz, -500.0, 500.0)
//! .with_cases(10)
//! .with_seed(7);
//!
//! let loadset = generate_balanced_loadset(&request)?;
//! assert_eq!(loadset.load_cases.len(), 10);
//! # Ok::<(), loads_core::errors::LoadError>(())
//! ```

use std::collections::{BTreeMap, HashMap};

use nalgebra::{DMatrix, DVector, Vector3};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::errors::{LoadError, LoadResult};
use crate::loads::{Component, ForceMoment, LoadCase, LoadSet, PointLoad};
use crate::units::Units;

/// Relative residual below which a case counts as balanced
pub const EQUILIBRIUM_TOLERANCE: f64 = 1e-9;

/// Load cases generated when the request does not say
pub const DEFAULT_CASE_COUNT: usize = 50;

/// A named interface point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interface {
    pub name: String,
    /// x, y, z
    pub position: [f64; 3],
}

impl Interface {
    pub fn new(name: impl Into<String>, position: [f64; 3]) -> Self {
        Interface {
            name: name.into(),
            position,
        }
    }

    fn position_vector(&self) -> Vector3<f64> {
        Vector3::new(self.position[0], self.position[1], self.position[2])
    }
}

/// Inclusive sampling range for one component
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComponentRange {
    pub min: f64,
    pub max: f64,
}

impl ComponentRange {
    pub fn new(min: f64, max: f64) -> Self {
        ComponentRange { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Everything needed to generate a balanced LoadSet
///
/// # JSON Format
/// ```json
/// {
///   "interfaces": [
///     {"name": "Fwd", "position": [0.0, 0.0, 0.0]},
///     {"name": "Aft", "position": [2.0, 0.0, 0.0]}
///   ],
///   "load_ranges": {"Fwd": {"fz": {"min": -500.0, "max": 500.0}}},
///   "num_cases": 10,
///   "seed": 7
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceRequest {
    /// Interface points in output order
    pub interfaces: Vec<Interface>,

    /// Sampling ranges keyed by interface name, then component
    #[serde(default)]
    pub load_ranges: BTreeMap<String, BTreeMap<Component, ComponentRange>>,

    #[serde(default = "default_case_count")]
    pub num_cases: usize,

    /// Fixed seed for reproducible output; drawn at random when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    #[serde(default)]
    pub units: Units,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn default_case_count() -> usize {
    DEFAULT_CASE_COUNT
}

impl BalanceRequest {
    pub fn new(interfaces: Vec<Interface>) -> Self {
        BalanceRequest {
            interfaces,
            load_ranges: BTreeMap::new(),
            num_cases: DEFAULT_CASE_COUNT,
            seed: None,
            units: Units::default(),
            name: None,
            description: None,
        }
    }

    /// Constrain one component of one interface (builder pattern)
    pub fn with_range(mut self, interface: impl Into<String>, component: Component, min: f64, max: f64) -> Self {
        self.load_ranges
            .entry(interface.into())
            .or_default()
            .insert(component, ComponentRange::new(min, max));
        self
    }

    pub fn with_cases(mut self, num_cases: usize) -> Self {
        self.num_cases = num_cases;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_units(mut self, units: Units) -> Self {
        self.units = units;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Check interfaces and ranges before any sampling
    pub fn validate(&self) -> LoadResult<()> {
        if self.interfaces.is_empty() {
            return Err(LoadError::validation("interfaces", "[]", "At least one interface is required"));
        }

        let mut seen = HashMap::new();
        for (i, interface) in self.interfaces.iter().enumerate() {
            if let Some(first) = seen.insert(interface.name.as_str(), i) {
                return Err(LoadError::validation(
                    format!("interfaces[{i}].name"),
                    &interface.name,
                    format!("Duplicate of interfaces[{first}]"),
                ));
            }
            if let Some(value) = interface.position.iter().find(|v| !v.is_finite()) {
                return Err(LoadError::validation(
                    format!("interfaces[{i}].position"),
                    value.to_string(),
                    "Position must be finite",
                ));
            }
        }

        for (name, ranges) in &self.load_ranges {
            if !seen.contains_key(name.as_str()) {
                return Err(LoadError::validation(
                    format!("load_ranges.{name}"),
                    name,
                    "Range given for an unknown interface",
                ));
            }
            for (component, range) in ranges {
                let field = format!("load_ranges.{name}.{component}");
                if !range.min.is_finite() || !range.max.is_finite() {
                    return Err(LoadError::validation(
                        field,
                        format!("{}..{}", range.min, range.max),
                        "Range bounds must be finite",
                    ));
                }
                if range.min > range.max {
                    return Err(LoadError::validation(
                        field,
                        format!("{}..{}", range.min, range.max),
                        "Range minimum exceeds maximum",
                    ));
                }
            }
        }
        Ok(())
    }

    /// Range for a variable index in [`equilibrium_matrix`] column order
    fn range_at(&self, variable: usize) -> Option<ComponentRange> {
        let interface = &self.interfaces[variable / 6];
        let component = Component::ALL[variable % 6];
        self.load_ranges
            .get(&interface.name)
            .and_then(|ranges| ranges.get(&component))
            .copied()
    }
}

/// Equilibrium matrix `A` (6 x 6N) with `A x = [sum F; sum M]`
///
/// Columns hold each interface's components in canonical order
/// (fx, fy, fz, mx, my, mz). Moments are taken about the origin, so row
/// 3..6 carries `M + r x F`.
pub fn equilibrium_matrix(interfaces: &[Interface]) -> DMatrix<f64> {
    let mut a = DMatrix::zeros(6, 6 * interfaces.len());
    for (i, interface) in interfaces.iter().enumerate() {
        let b = 6 * i;
        let [x, y, z] = interface.position;

        a[(0, b)] = 1.0;
        a[(1, b + 1)] = 1.0;
        a[(2, b + 2)] = 1.0;

        a[(3, b + 1)] = -z;
        a[(3, b + 2)] = y;
        a[(3, b + 3)] = 1.0;

        a[(4, b)] = z;
        a[(4, b + 2)] = -x;
        a[(4, b + 4)] = 1.0;

        a[(5, b)] = -y;
        a[(5, b + 1)] = x;
        a[(5, b + 5)] = 1.0;
    }
    a
}

/// Net force and moment about the origin for one load case
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Equilibrium {
    pub sum_fx: f64,
    pub sum_fy: f64,
    pub sum_fz: f64,
    pub sum_mx: f64,
    pub sum_my: f64,
    pub sum_mz: f64,
    /// Sum of the magnitudes that went into the totals
    pub scale: f64,
}

impl Equilibrium {
    /// Whether every residual is within `tolerance` relative to [`Equilibrium::scale`]
    pub fn is_balanced(&self, tolerance: f64) -> bool {
        let limit = tolerance * self.scale.max(1.0);
        [self.sum_fx, self.sum_fy, self.sum_fz, self.sum_mx, self.sum_my, self.sum_mz]
            .iter()
            .all(|r| r.abs() <= limit)
    }
}

/// Sum forces and moments of `case` over the given interfaces
///
/// Every point load must name one of `interfaces`.
pub fn check_equilibrium(case: &LoadCase, interfaces: &[Interface]) -> LoadResult<Equilibrium> {
    let positions: HashMap<&str, Vector3<f64>> = interfaces
        .iter()
        .map(|interface| (interface.name.as_str(), interface.position_vector()))
        .collect();

    let mut force = Vector3::zeros();
    let mut moment = Vector3::zeros();
    let mut scale = 0.0;

    for (j, point) in case.point_loads.iter().enumerate() {
        let r = positions.get(point.key()).ok_or_else(|| {
            LoadError::validation(
                format!("point_loads[{j}].name"),
                point.key(),
                "Point is not a known interface",
            )
        })?;
        let fm = &point.force_moment;
        let f = Vector3::new(fm.fx, fm.fy, fm.fz);
        let m = Vector3::new(fm.mx, fm.my, fm.mz);
        let arm = r.cross(&f);

        force += f;
        moment += m + arm;
        scale += f.norm() + m.norm() + arm.norm();
    }

    Ok(Equilibrium {
        sum_fx: force.x,
        sum_fy: force.y,
        sum_fz: force.z,
        sum_mx: moment.x,
        sum_my: moment.y,
        sum_mz: moment.z,
        scale,
    })
}

/// Generate `request.num_cases` load cases in static equilibrium
///
/// Cases are named `Case_001`, `Case_002`, ... The same request with the
/// same seed yields the same LoadSet. Fails with a validation error when
/// the free components cannot cancel the sampled ones.
pub fn generate_balanced_loadset(request: &BalanceRequest) -> LoadResult<LoadSet> {
    request.validate()?;

    let seed = request.seed.unwrap_or_else(|| rand::thread_rng().gen());
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let a = equilibrium_matrix(&request.interfaces);
    let ranges: Vec<(usize, ComponentRange)> =
        (0..a.ncols()).filter_map(|v| request.range_at(v).map(|range| (v, range))).collect();
    let constrained: Vec<usize> = ranges.iter().map(|&(v, _)| v).collect();
    let free: Vec<usize> = (0..a.ncols()).filter(|v| !constrained.contains(v)).collect();

    let a_constrained = a.select_columns(&constrained);
    let a_free = a.select_columns(&free);

    tracing::info!(
        cases = request.num_cases,
        interfaces = request.interfaces.len(),
        constrained = constrained.len(),
        seed,
        "generating balanced load cases"
    );

    let name = request.name.clone().unwrap_or_else(|| "Balanced LoadSet".to_string());
    let description = request
        .description
        .clone()
        .unwrap_or_else(|| format!("Generated {} balanced load cases (seed {seed})", request.num_cases));
    let mut loadset = LoadSet::new(name, 1, request.units).with_description(description);

    for n in 1..=request.num_cases {
        let mut x = DVector::zeros(a.ncols());

        let sampled: Vec<f64> = ranges.iter().map(|(_, range)| rng.gen_range(range.min..=range.max)).collect();
        for (&v, &value) in constrained.iter().zip(&sampled) {
            x[v] = value;
        }

        if !constrained.is_empty() && !free.is_empty() {
            let rhs = -(&a_constrained * DVector::from_vec(sampled));
            let solved = min_norm_solve(&a_free, &rhs)?;
            for (&v, &value) in free.iter().zip(solved.iter()) {
                x[v] = value;
            }
        }

        let case = request
            .interfaces
            .iter()
            .enumerate()
            .fold(
                LoadCase::new(format!("Case_{n:03}")).with_description(format!("Balanced load case {n}")),
                |case, (i, interface)| {
                    let fm = Component::ALL
                        .iter()
                        .fold(ForceMoment::default(), |fm, &c| fm.with(c, x[6 * i + c.index()]));
                    case.with_point_load(PointLoad::new(&interface.name, fm))
                },
            );

        let equilibrium = check_equilibrium(&case, &request.interfaces)?;
        if !equilibrium.is_balanced(EQUILIBRIUM_TOLERANCE) {
            return Err(LoadError::validation(
                "load_ranges",
                format!("{} constrained components", constrained.len()),
                format!(
                    "Free components cannot balance the sampled loads (residual force [{:.3e}, {:.3e}, {:.3e}], moment [{:.3e}, {:.3e}, {:.3e}])",
                    equilibrium.sum_fx,
                    equilibrium.sum_fy,
                    equilibrium.sum_fz,
                    equilibrium.sum_mx,
                    equilibrium.sum_my,
                    equilibrium.sum_mz
                ),
            ));
        }

        loadset = loadset.with_load_case(case);
    }

    loadset.validate()?;
    Ok(loadset)
}

/// Minimum-norm least-squares solution of `a x = b`
fn min_norm_solve(a: &DMatrix<f64>, b: &DVector<f64>) -> LoadResult<DVector<f64>> {
    let svd = a.clone().svd(true, true);
    let largest = svd.singular_values.iter().copied().fold(0.0, f64::max);
    let eps = largest * 1e-12 * a.nrows().max(a.ncols()) as f64;
    svd.solve(b, eps)
        .map_err(|reason| LoadError::validation("load_ranges", "free components", reason))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::ForceUnit;
    use approx::assert_relative_eq;

    fn mounts() -> Vec<Interface> {
        vec![
            Interface::new("Fwd_Left", [1.2, -0.8, 0.3]),
            Interface::new("Fwd_Right", [1.2, 0.8, 0.3]),
            Interface::new("Aft", [-2.5, 0.0, 0.6]),
            Interface::new("Thrust", [0.0, 0.0, -0.4]),
        ]
    }

    fn mount_request() -> BalanceRequest {
        BalanceRequest::new(mounts())
            .with_range("Fwd_Left", Component::Fx, -5000.0, 5000.0)
            .with_range("Fwd_Left", Component::Fz, -10000.0, -2000.0)
            .with_range("Fwd_Right", Component::Fz, -10000.0, -2000.0)
            .with_range("Fwd_Right", Component::My, -300.0, 300.0)
            .with_range("Thrust", Component::Fx, 20000.0, 30000.0)
            .with_cases(25)
            .with_seed(42)
    }

    #[test]
    fn test_equilibrium_matrix_layout() {
        let a = equilibrium_matrix(&[Interface::new("P", [2.0, 3.0, 5.0])]);
        assert_eq!(a.shape(), (6, 6));

        // A unit fz at (2, 3, 5) gives M = r x F = (3, -2, 0)
        let fz = a.column(2);
        assert_eq!([fz[0], fz[1], fz[2], fz[3], fz[4], fz[5]], [0.0, 0.0, 1.0, 3.0, -2.0, 0.0]);

        // Moments pass straight through
        for c in 3..6 {
            assert_eq!(a[(c, c)], 1.0);
        }
    }

    #[test]
    fn test_matrix_agrees_with_check() {
        let interfaces = mounts();
        let fm = ForceMoment::new(10.0, -4.0, 7.0, 1.0, 2.0, -3.0);
        let case = LoadCase::new("one").with_point_load(PointLoad::new("Aft", fm));

        let mut x = DVector::zeros(24);
        for (c, value) in fm.components() {
            x[12 + c.index()] = value;
        }
        let sums = equilibrium_matrix(&interfaces) * x;
        let check = check_equilibrium(&case, &interfaces).unwrap();

        let expected = [check.sum_fx, check.sum_fy, check.sum_fz, check.sum_mx, check.sum_my, check.sum_mz];
        for (row, value) in expected.iter().enumerate() {
            assert_relative_eq!(sums[row], *value, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_generated_cases_balance() {
        let loadset = generate_balanced_loadset(&mount_request()).unwrap();
        assert_eq!(loadset.load_cases.len(), 25);

        for case in &loadset.load_cases {
            let check = check_equilibrium(case, &mounts()).unwrap();
            assert!(check.is_balanced(EQUILIBRIUM_TOLERANCE), "{} unbalanced: {check:?}", case.label());
            assert!(check.scale > 0.0);
        }
    }

    #[test]
    fn test_sampled_values_within_ranges() {
        let request = mount_request();
        let loadset = generate_balanced_loadset(&request).unwrap();

        for case in &loadset.load_cases {
            for point in &case.point_loads {
                let Some(ranges) = request.load_ranges.get(point.key()) else {
                    continue;
                };
                for (component, range) in ranges {
                    let value = point.force_moment.get(*component);
                    assert!(range.contains(value), "{} {} = {value}", point.key(), component);
                }
            }
        }
    }

    #[test]
    fn test_case_layout_and_metadata() {
        let loadset = generate_balanced_loadset(&mount_request().with_cases(3)).unwrap();

        assert_eq!(loadset.label(), "Balanced LoadSet");
        assert_eq!(loadset.version, 1);
        assert_eq!(loadset.units, Units::default());
        assert_eq!(loadset.description.as_deref(), Some("Generated 3 balanced load cases (seed 42)"));

        let names: Vec<_> = loadset.load_cases.iter().map(|c| c.label()).collect();
        assert_eq!(names, vec!["Case_001", "Case_002", "Case_003"]);
        assert_eq!(loadset.load_cases[1].description.as_deref(), Some("Balanced load case 2"));

        let points: Vec<_> = loadset.load_cases[0].point_loads.iter().map(|p| p.key()).collect();
        assert_eq!(points, vec!["Fwd_Left", "Fwd_Right", "Aft", "Thrust"]);

        let named = generate_balanced_loadset(
            &mount_request().with_cases(1).with_name("Mounts").with_units(Units::paired(ForceUnit::KN)),
        )
        .unwrap();
        assert_eq!(named.label(), "Mounts");
        assert_eq!(named.units, Units::paired(ForceUnit::KN));
    }

    #[test]
    fn test_seed_reproducible() {
        let first = generate_balanced_loadset(&mount_request()).unwrap();
        let second = generate_balanced_loadset(&mount_request()).unwrap();
        let other = generate_balanced_loadset(&mount_request().with_seed(43)).unwrap();

        assert_eq!(first, second);
        assert_ne!(first.load_cases, other.load_cases);
    }

    #[test]
    fn test_unconstrained_cases_are_zero() {
        let loadset = generate_balanced_loadset(&BalanceRequest::new(mounts()).with_cases(2).with_seed(1)).unwrap();
        assert!(loadset
            .load_cases
            .iter()
            .flat_map(|c| &c.point_loads)
            .all(|p| p.force_moment.is_zero()));
    }

    #[test]
    fn test_free_components_take_minimum_norm() {
        // Two mounts on the x axis; the aft vertical load is fixed at 100,
        // so the forward mount and the aft moment share the reaction.
        let request = BalanceRequest::new(vec![Interface::new("Fwd", [0.0, 0.0, 0.0]), Interface::new("Aft", [1.0, 0.0, 0.0])])
            .with_range("Aft", Component::Fz, 100.0, 100.0)
            .with_cases(1)
            .with_seed(0);
        let loadset = generate_balanced_loadset(&request).unwrap();
        let case = &loadset.load_cases[0];

        let fwd = case.point_loads[0].force_moment;
        let aft = case.point_loads[1].force_moment;
        assert_eq!(aft.fz, 100.0);
        assert_relative_eq!(fwd.fz, -100.0, epsilon = 1e-9);
        // sum My = My_fwd + My_aft - 1.0 * 100 = 0, split evenly at minimum norm
        assert_relative_eq!(fwd.my, 50.0, epsilon = 1e-9);
        assert_relative_eq!(aft.my, 50.0, epsilon = 1e-9);
        assert_relative_eq!(fwd.fx, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_unbalanceable_ranges_rejected() {
        // Only one interface and every component fixed: nothing can react
        let request = BalanceRequest::new(vec![Interface::new("Solo", [0.0, 0.0, 0.0])])
            .with_range("Solo", Component::Fx, 10.0, 20.0)
            .with_range("Solo", Component::Fy, 0.0, 0.0)
            .with_range("Solo", Component::Fz, 0.0, 0.0)
            .with_range("Solo", Component::Mx, 0.0, 0.0)
            .with_range("Solo", Component::My, 0.0, 0.0)
            .with_range("Solo", Component::Mz, 0.0, 0.0)
            .with_seed(5);

        let err = generate_balanced_loadset(&request).unwrap_err();
        assert!(matches!(err, LoadError::Validation { ref field, .. } if field == "load_ranges"));
    }

    #[test]
    fn test_invalid_requests_rejected() {
        let unknown = BalanceRequest::new(mounts()).with_range("Nacelle", Component::Fx, 0.0, 1.0);
        let inverted = BalanceRequest::new(mounts()).with_range("Aft", Component::Fy, 5.0, -5.0);
        let infinite = BalanceRequest::new(mounts()).with_range("Aft", Component::Fy, 0.0, f64::INFINITY);
        let duplicate = BalanceRequest::new(vec![Interface::new("A", [0.0; 3]), Interface::new("A", [1.0, 0.0, 0.0])]);
        let empty = BalanceRequest::new(Vec::new());

        let fields: Vec<String> = [unknown, inverted, infinite, duplicate, empty]
            .iter()
            .map(|r| match generate_balanced_loadset(r).unwrap_err() {
                LoadError::Validation { field, .. } => field,
                other => panic!("unexpected error: {other:?}"),
            })
            .collect();

        assert_eq!(
            fields,
            vec!["load_ranges.Nacelle", "load_ranges.Aft.fy", "load_ranges.Aft.fy", "interfaces[1].name", "interfaces"]
        );
    }

    #[test]
    fn test_check_rejects_unknown_point() {
        let case = LoadCase::new("stray").with_point_load(PointLoad::new("Elsewhere", ForceMoment::default()));
        let err = check_equilibrium(&case, &mounts()).unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_request_from_json() {
        let request: BalanceRequest = serde_json::from_str(
            r#"{
                "interfaces": [{"name": "Fwd", "position": [0, 0, 0]}, {"name": "Aft", "position": [2, 0, 0]}],
                "load_ranges": {"Fwd": {"fz": {"min": -500, "max": 500}}},
                "seed": 7
            }"#,
        )
        .unwrap();

        assert_eq!(request.num_cases, DEFAULT_CASE_COUNT);
        assert_eq!(request.seed, Some(7));
        assert_eq!(request.load_ranges["Fwd"][&Component::Fz], ComponentRange::new(-500.0, 500.0));
    }
}
