//! # Settings
//!
//! Configuration for the parts of the engine that have a choice to make,
//! currently the solver export format. Every field has a default, so an
//! empty or partial TOML file is valid.
//!
//! ## TOML Format
//!
//! ```toml
//! [export]
//! extension = "inp"
//! precision = 6
//! selector_prefix = "pilot_"
//! command_style = "compact"
//! ```
//!
//! ## Example
//!
//! ```rust
//! use loads_core::settings::{CommandStyle, Settings};
//!
//! let settings = Settings::from_toml_str("[export]\nprecision = 3\n")?;
//! assert_eq!(settings.export.precision, 3);
//! assert_eq!(settings.export.command_style, CommandStyle::Compact);
//! # Ok::<(), loads_core::errors::LoadError>(())
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{LoadError, LoadResult};

/// Largest mantissa precision that still adds information to an f64
pub const MAX_PRECISION: usize = 16;

/// Root settings container
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Solver export formatting
    pub export: ExportSettings,
}

impl Settings {
    /// Parse settings from TOML text and validate them
    pub fn from_toml_str(text: &str) -> LoadResult<Self> {
        let settings: Settings = toml::from_str(text).map_err(|e| {
            LoadError::validation("settings", "toml", e.to_string())
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read settings from a TOML file
    pub fn load(path: &Path) -> LoadResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            LoadError::io_failure("read settings", path.display().to_string(), e.to_string())
        })?;
        Settings::from_toml_str(&text)
    }

    /// Serialize to TOML text
    pub fn to_toml_string(&self) -> LoadResult<String> {
        toml::to_string_pretty(self).map_err(|e| LoadError::serialization(e.to_string()))
    }

    /// Check value ranges serde cannot express
    pub fn validate(&self) -> LoadResult<()> {
        self.export.validate()
    }
}

/// How load commands are written for each point component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandStyle {
    /// One line per component: `f,<selector>,<component>,<value>`
    #[default]
    Compact,
    /// Select the point component, apply to all, unselect:
    /// `cmsel,s,<selector>` / `f,all,<component>,<value>` / `nsel,u,,,all`
    Selection,
}

/// Solver export formatting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// File extension without the leading dot
    pub extension: String,

    /// Digits after the decimal point of the scientific mantissa
    pub precision: usize,

    /// Prefix turning a point name into the solver component name
    pub selector_prefix: String,

    /// Command layout
    pub command_style: CommandStyle,
}

impl Default for ExportSettings {
    fn default() -> Self {
        ExportSettings {
            extension: "inp".to_string(),
            precision: 6,
            selector_prefix: "pilot_".to_string(),
            command_style: CommandStyle::Compact,
        }
    }
}

impl ExportSettings {
    pub fn validate(&self) -> LoadResult<()> {
        if self.precision > MAX_PRECISION {
            return Err(LoadError::validation(
                "export.precision",
                self.precision.to_string(),
                format!("Precision must be at most {}", MAX_PRECISION),
            ));
        }
        if self.selector_prefix.chars().any(|c| c == ',' || c.is_control()) {
            return Err(LoadError::validation(
                "export.selector_prefix",
                self.selector_prefix.clone(),
                "Selector prefix may not contain commas or control characters",
            ));
        }
        if self.extension.is_empty() || !self.extension.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(LoadError::validation(
                "export.extension",
                self.extension.clone(),
                "Extension must be non-empty ASCII letters and digits",
            ));
        }
        Ok(())
    }
}
