//! Load level classification
//!
//! Customer load data is declared either at limit level (the maximum
//! expected in service) or at ultimate level (limit multiplied by the
//! safety factor). A LoadSet may also leave the level unspecified.

use serde::{Deserialize, Serialize};

/// Whether the loads in a LoadSet are limit or ultimate loads
///
/// There is deliberately no `Default`: an absent `loads_type` is carried
/// as `None` and the calling policy decides how to treat it.
///
/// # Example
/// ```
/// use loads_core::loads::LoadsType;
///
/// let parsed: LoadsType = serde_json::from_str("\"ultimate\"").unwrap();
/// assert_eq!(parsed, LoadsType::Ultimate);
/// assert_eq!(parsed.code(), "ultimate");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadsType {
    /// Maximum load expected in service
    Limit,
    /// Limit load multiplied by the safety factor
    Ultimate,
}

impl LoadsType {
    /// Identifier as it appears in LoadSet JSON
    pub fn code(&self) -> &'static str {
        match self {
            LoadsType::Limit => "limit",
            LoadsType::Ultimate => "ultimate",
        }
    }

    /// Human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            LoadsType::Limit => "Limit loads (maximum expected in service)",
            LoadsType::Ultimate => "Ultimate loads (limit x safety factor)",
        }
    }
}

impl std::fmt::Display for LoadsType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(LoadsType::Limit.code(), "limit");
        assert_eq!(LoadsType::Ultimate.to_string(), "ultimate");
    }

    #[test]
    fn test_descriptions_distinct() {
        assert!(LoadsType::Limit.description().starts_with("Limit"));
        assert!(LoadsType::Ultimate.description().contains("safety factor"));
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_string(&LoadsType::Limit).unwrap();
        assert_eq!(json, "\"limit\"");

        let bad: Result<LoadsType, _> = serde_json::from_str("\"design\"");
        assert!(bad.is_err());
    }
}
