//! # Unit Registry
//!
//! Force and moment units recognized by a LoadSet, and the fixed conversion
//! table between them.
//!
//! ## Canonical Units
//!
//! Every unit is defined by its multiplier to the canonical SI unit
//! (newton for forces, newton-metre for moments):
//!
//! | Unit    | Factor to canonical    | Definition                      |
//! |---------|------------------------|---------------------------------|
//! | N       | 1                      |                                 |
//! | kN      | 1000                   |                                 |
//! | lbf     | 4.4482216152605        | international avoirdupois pound |
//! | klbf    | 4448.2216152605        | 1000 lbf                        |
//! | Nm      | 1                      |                                 |
//! | kNm     | 1000                   |                                 |
//! | lbf-ft  | 1.3558179483314004     | lbf × 0.3048 m                  |
//!
//! Converting from unit `a` to unit `b` multiplies by
//! `factor(a) / factor(b)`, so a round trip reproduces the original value
//! up to floating-point rounding.
//!
//! ## Example
//!
//! ```rust
//! use loads_core::units::{ForceUnit, MomentUnit, Units};
//!
//! let si = Units::new(ForceUnit::N, MomentUnit::Nm);
//! let kilo = Units::new(ForceUnit::KN, MomentUnit::KNm);
//! let (force, moment) = si.conversion_factors(&kilo);
//! assert_eq!(force, 0.001);
//! assert_eq!(moment, 0.001);
//!
//! let parsed: ForceUnit = "lbf".parse().unwrap();
//! assert_eq!(parsed, ForceUnit::Lbf);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::LoadError;

/// Newtons per pound-force (exact by definition)
pub const N_PER_LBF: f64 = 4.4482216152605;

/// Newton-metres per pound-force foot (N_PER_LBF × 0.3048)
pub const NM_PER_LBF_FT: f64 = 1.3558179483314004;

/// Multiplier for the SI kilo prefix and for kilo-pound-force
pub const KILO: f64 = 1000.0;

// ============================================================================
// Force Units
// ============================================================================

/// Unit of the force components (fx, fy, fz)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ForceUnit {
    /// Newton (canonical)
    #[default]
    #[serde(rename = "N")]
    N,
    /// Kilonewton
    #[serde(rename = "kN")]
    KN,
    /// Pound-force
    #[serde(rename = "lbf")]
    Lbf,
    /// Kilo-pound-force (kip)
    #[serde(rename = "klbf")]
    Klbf,
}

impl ForceUnit {
    /// All force units in table order
    pub const ALL: [ForceUnit; 4] = [ForceUnit::N, ForceUnit::KN, ForceUnit::Lbf, ForceUnit::Klbf];

    /// Identifier as it appears in LoadSet JSON
    pub fn code(&self) -> &'static str {
        match self {
            ForceUnit::N => "N",
            ForceUnit::KN => "kN",
            ForceUnit::Lbf => "lbf",
            ForceUnit::Klbf => "klbf",
        }
    }

    /// Multiplier from this unit to newtons
    pub fn to_canonical(&self) -> f64 {
        match self {
            ForceUnit::N => 1.0,
            ForceUnit::KN => KILO,
            ForceUnit::Lbf => N_PER_LBF,
            ForceUnit::Klbf => KILO * N_PER_LBF,
        }
    }

    /// Conventional moment unit paired with this force unit
    ///
    /// Kip-based data is still reported in lbf-ft, the only imperial moment
    /// unit in the registry.
    pub fn paired_moment(&self) -> MomentUnit {
        match self {
            ForceUnit::N => MomentUnit::Nm,
            ForceUnit::KN => MomentUnit::KNm,
            ForceUnit::Lbf | ForceUnit::Klbf => MomentUnit::LbfFt,
        }
    }
}

impl fmt::Display for ForceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for ForceUnit {
    type Err = LoadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ForceUnit::ALL
            .iter()
            .copied()
            .find(|unit| unit.code() == s.trim())
            .ok_or_else(|| LoadError::invalid_unit("forces", s, expected_list(&ForceUnit::ALL.map(|u| u.code()))))
    }
}

// ============================================================================
// Moment Units
// ============================================================================

/// Unit of the moment components (mx, my, mz)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MomentUnit {
    /// Newton-metre (canonical)
    #[default]
    #[serde(rename = "Nm")]
    Nm,
    /// Kilonewton-metre
    #[serde(rename = "kNm")]
    KNm,
    /// Pound-force foot
    #[serde(rename = "lbf-ft")]
    LbfFt,
}

impl MomentUnit {
    /// All moment units in table order
    pub const ALL: [MomentUnit; 3] = [MomentUnit::Nm, MomentUnit::KNm, MomentUnit::LbfFt];

    /// Identifier as it appears in LoadSet JSON
    pub fn code(&self) -> &'static str {
        match self {
            MomentUnit::Nm => "Nm",
            MomentUnit::KNm => "kNm",
            MomentUnit::LbfFt => "lbf-ft",
        }
    }

    /// Multiplier from this unit to newton-metres
    pub fn to_canonical(&self) -> f64 {
        match self {
            MomentUnit::Nm => 1.0,
            MomentUnit::KNm => KILO,
            MomentUnit::LbfFt => NM_PER_LBF_FT,
        }
    }
}

impl fmt::Display for MomentUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for MomentUnit {
    type Err = LoadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MomentUnit::ALL
            .iter()
            .copied()
            .find(|unit| unit.code() == s.trim())
            .ok_or_else(|| LoadError::invalid_unit("moments", s, expected_list(&MomentUnit::ALL.map(|u| u.code()))))
    }
}

fn expected_list(codes: &[&str]) -> String {
    codes.join(", ")
}

// ============================================================================
// Unit Pair
// ============================================================================

/// The force/moment unit pair active on a LoadSet
///
/// # JSON Format
/// ```json
/// { "forces": "kN", "moments": "kNm" }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Units {
    /// Unit of fx, fy, fz
    #[serde(default)]
    pub forces: ForceUnit,

    /// Unit of mx, my, mz
    #[serde(default)]
    pub moments: MomentUnit,
}

impl Units {
    /// Create a unit pair
    pub fn new(forces: ForceUnit, moments: MomentUnit) -> Self {
        Units { forces, moments }
    }

    /// Unit pair built from a force unit and its conventional moment unit
    pub fn paired(forces: ForceUnit) -> Self {
        Units::new(forces, forces.paired_moment())
    }

    /// Parse a unit pair from textual identifiers.
    ///
    /// Fails with `InvalidUnit` naming the offending field.
    pub fn parse(forces: &str, moments: &str) -> Result<Self, LoadError> {
        Ok(Units::new(forces.parse()?, moments.parse()?))
    }

    /// Multipliers `(force, moment)` that convert values in `self` to `target`
    pub fn conversion_factors(&self, target: &Units) -> (f64, f64) {
        (
            self.forces.to_canonical() / target.forces.to_canonical(),
            self.moments.to_canonical() / target.moments.to_canonical(),
        )
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.forces, self.moments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_constants_to_six_significant_figures() {
        assert_relative_eq!(N_PER_LBF, 4.448222, max_relative = 1e-6);
        assert_relative_eq!(NM_PER_LBF_FT, 1.355818, max_relative = 1e-6);
        assert_relative_eq!(NM_PER_LBF_FT, N_PER_LBF * 0.3048, max_relative = 1e-12);
        assert_relative_eq!(ForceUnit::Klbf.to_canonical(), 4448.2216152605, max_relative = 1e-12);
    }

    #[test]
    fn test_kilo_factors() {
        let si = Units::new(ForceUnit::N, MomentUnit::Nm);
        let kilo = Units::new(ForceUnit::KN, MomentUnit::KNm);
        assert_eq!(si.conversion_factors(&kilo), (0.001, 0.001));
        assert_eq!(kilo.conversion_factors(&si), (1000.0, 1000.0));
    }

    #[test]
    fn test_identity_factors() {
        for forces in ForceUnit::ALL {
            for moments in MomentUnit::ALL {
                let units = Units::new(forces, moments);
                assert_eq!(units.conversion_factors(&units), (1.0, 1.0));
            }
        }
    }

    #[test]
    fn test_klbf_is_thousand_lbf() {
        let lbf = Units::paired(ForceUnit::Lbf);
        let klbf = Units::paired(ForceUnit::Klbf);
        let (force, moment) = klbf.conversion_factors(&lbf);
        assert_relative_eq!(force, 1000.0, max_relative = 1e-12);
        assert_eq!(moment, 1.0);
    }

    #[test]
    fn test_paired_moments() {
        assert_eq!(ForceUnit::N.paired_moment(), MomentUnit::Nm);
        assert_eq!(ForceUnit::KN.paired_moment(), MomentUnit::KNm);
        assert_eq!(ForceUnit::Lbf.paired_moment(), MomentUnit::LbfFt);
        assert_eq!(ForceUnit::Klbf.paired_moment(), MomentUnit::LbfFt);
    }

    #[test]
    fn test_parse_valid_and_invalid() {
        assert_eq!(Units::parse("kN", "kNm").unwrap(), Units::paired(ForceUnit::KN));
        assert_eq!(" lbf ".parse::<ForceUnit>().unwrap(), ForceUnit::Lbf);

        let err = Units::parse("kip", "Nm").unwrap_err();
        match err {
            LoadError::InvalidUnit { field, value, .. } => {
                assert_eq!(field, "forces");
                assert_eq!(value, "kip");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let err = "ft-lb".parse::<MomentUnit>().unwrap_err();
        assert_eq!(err.error_code(), "INVALID_UNIT");
    }

    #[test]
    fn test_serialization() {
        let units = Units::new(ForceUnit::Klbf, MomentUnit::LbfFt);
        let json = serde_json::to_string(&units).unwrap();
        assert_eq!(json, r#"{"forces":"klbf","moments":"lbf-ft"}"#);

        let parsed: Units = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, units);
    }

    #[test]
    fn test_missing_fields_default_to_si() {
        let parsed: Units = serde_json::from_str(r#"{"forces":"kN"}"#).unwrap();
        assert_eq!(parsed, Units::new(ForceUnit::KN, MomentUnit::Nm));
    }

    #[test]
    fn test_unknown_unit_rejected_by_serde() {
        let parsed: Result<Units, _> = serde_json::from_str(r#"{"forces":"kip","moments":"Nm"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Units::paired(ForceUnit::Lbf).to_string(), "lbf/lbf-ft");
    }
}
