//! # Solver Export
//!
//! Writes one solver load-command file per load case. Each nonzero
//! component of each point load becomes a force command against the
//! point's solver component (`pilot_<point>` by default).
//!
//! ## File Layout (compact style)
//!
//! ```text
//! /TITLE,Takeoff
//! f,pilot_Point A,fx,1.000000e+02
//! f,pilot_Point A,mz,-2.500000e+01
//!
//! alls
//! ```
//!
//! Names are written verbatim into the comma-separated commands, so a
//! point name may not contain `,` and no name may contain a line break or
//! other control character. Such a LoadSet is rejected before anything is
//! written.
//!
//! ## File Naming
//!
//! `sanitize(prefix + "_" + case name) + "." + extension`, where sanitizing
//! replaces every character other than letters, digits, `_` and `-` with
//! `_`, collapses runs of `_` and trims `_` from both ends. Cases without a
//! name use `unnamed`. Two cases mapping to the same file name are rejected
//! before anything is written.
//!
//! ## Write Safety
//!
//! Each file is written to a temporary sibling, synced, then renamed into
//! place, so a file is either complete or absent. Files written before a
//! later failure are left in place.
//!
//! ## Example
//!
//! ```rust,no_run
//! use loads_core::export::export;
//! use std::path::Path;
//!
//! let loadset = loads_core::file_io::read_loadset(Path::new("new_loads.json"))?;
//! let written = export(&loadset.envelope(), Path::new("solver_input"), "wing")?;
//! println!("wrote {} files", written.len());
//! # Ok::<(), loads_core::errors::LoadError>(())
//! ```

use std::collections::HashMap;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{LoadError, LoadResult};
use crate::file_io::write_atomic;
use crate::loads::{LoadCase, LoadSet};
use crate::settings::{CommandStyle, ExportSettings};

/// Name used for load cases without a name
const UNNAMED_CASE: &str = "unnamed";

/// Description of one written solver file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedFile {
    /// Position of the load case in the exported LoadSet
    pub load_case_index: usize,
    pub load_case_name: Option<String>,
    pub file_name: String,
    pub path: PathBuf,
    /// Number of force/moment commands in the file
    pub command_count: usize,
}

/// Make a string safe to use as a file name stem
///
/// # Example
/// ```
/// use loads_core::export::sanitize_file_stem;
///
/// assert_eq!(sanitize_file_stem("wing_Gust +2.5g (up)"), "wing_Gust_2_5g_up");
/// ```
pub fn sanitize_file_stem(name: &str) -> String {
    let mut sanitized = String::with_capacity(name.len());
    for c in name.chars() {
        let c = if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' };
        if c == '_' && sanitized.ends_with('_') {
            continue;
        }
        sanitized.push(c);
    }
    sanitized.trim_matches('_').to_string()
}

/// File name for a load case under `prefix`
pub fn export_file_name(prefix: &str, case: &LoadCase, settings: &ExportSettings) -> String {
    let case_name = case.name.as_deref().unwrap_or(UNNAMED_CASE);
    let stem = sanitize_file_stem(&format!("{}_{}", prefix, case_name));
    let stem = if stem.is_empty() { UNNAMED_CASE.to_string() } else { stem };
    format!("{}.{}", stem, settings.extension)
}

/// Format a value in scientific notation with a signed two-digit exponent
///
/// # Example
/// ```
/// use loads_core::export::format_scientific;
///
/// assert_eq!(format_scientific(150.0, 3), "1.500e+02");
/// assert_eq!(format_scientific(-0.00042, 2), "-4.20e-04");
/// ```
pub fn format_scientific(value: f64, precision: usize) -> String {
    let formatted = format!("{:.*e}", precision, value);
    match formatted.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => formatted,
    }
}

/// Render the command file body for one load case.
///
/// Names are not checked here; [`export_with_settings`] rejects names that
/// would corrupt the commands.
pub fn render_load_case(case: &LoadCase, settings: &ExportSettings) -> (String, usize) {
    let mut body = String::new();
    let mut commands = 0;

    let _ = writeln!(body, "/TITLE,{}", case.label());
    if settings.command_style == CommandStyle::Selection {
        let _ = writeln!(body, "nsel,u,,,all");
        let _ = writeln!(body);
    }

    for point in &case.point_loads {
        let selector = format!("{}{}", settings.selector_prefix, point.key());
        for (component, value) in point.force_moment.components() {
            if value == 0.0 {
                continue;
            }
            let value = format_scientific(value, settings.precision);
            match settings.command_style {
                CommandStyle::Compact => {
                    let _ = writeln!(body, "f,{},{},{}", selector, component, value);
                }
                CommandStyle::Selection => {
                    let _ = writeln!(body, "cmsel,s,{}", selector);
                    let _ = writeln!(body, "f,all,{},{}", component, value);
                    let _ = writeln!(body, "nsel,u,,,all");
                    let _ = writeln!(body);
                }
            }
            commands += 1;
        }
    }

    let _ = writeln!(body);
    let _ = writeln!(body, "alls");

    (body, commands)
}

/// Reject case and point names that would break the command line layout
fn check_command_names(loadset: &LoadSet) -> LoadResult<()> {
    for (case_index, case) in loadset.load_cases.iter().enumerate() {
        if let Some(name) = &case.name {
            if name.chars().any(char::is_control) {
                return Err(LoadError::validation(
                    format!("load_cases[{}].name", case_index),
                    name.clone(),
                    "Load case names may not contain line breaks or control characters",
                ));
            }
        }
        for (point_index, point) in case.point_loads.iter().enumerate() {
            if let Some(name) = &point.name {
                if name.chars().any(|c| c == ',' || c.is_control()) {
                    return Err(LoadError::validation(
                        format!("load_cases[{}].point_loads[{}].name", case_index, point_index),
                        name.clone(),
                        "Point names may not contain commas, line breaks or control characters",
                    ));
                }
            }
        }
    }
    Ok(())
}

/// Export every load case with default settings. See [`export_with_settings`].
pub fn export(loadset: &LoadSet, destination: &Path, name_prefix: &str) -> LoadResult<Vec<ExportedFile>> {
    export_with_settings(loadset, destination, name_prefix, &ExportSettings::default())
}

/// Write one command file per load case under `destination`.
///
/// Creates `destination` if needed. Fails before writing anything with
/// `Validation` when a case or point name cannot be written into a command
/// and with `DuplicateExportName` when two cases share a file name. Fails
/// with `IoFailure` when the directory or a file cannot be written.
pub fn export_with_settings(
    loadset: &LoadSet,
    destination: &Path,
    name_prefix: &str,
    settings: &ExportSettings,
) -> LoadResult<Vec<ExportedFile>> {
    settings.validate()?;
    check_command_names(loadset)?;

    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut planned = Vec::with_capacity(loadset.load_cases.len());
    for (index, case) in loadset.load_cases.iter().enumerate() {
        let file_name = export_file_name(name_prefix, case, settings);
        if let Some(&first_index) = seen.get(&file_name) {
            return Err(LoadError::DuplicateExportName {
                file_name,
                first_index,
                second_index: index,
            });
        }
        seen.insert(file_name.clone(), index);
        planned.push((index, case, file_name));
    }

    prepare_destination(destination)?;

    let mut written = Vec::with_capacity(planned.len());
    for (index, case, file_name) in planned {
        let path = destination.join(&file_name);
        let (body, command_count) = render_load_case(case, settings);
        write_atomic(&path, body.as_bytes())?;
        tracing::debug!(file = %path.display(), command_count, "wrote load case");
        written.push(ExportedFile {
            load_case_index: index,
            load_case_name: case.name.clone(),
            file_name,
            path,
            command_count,
        });
    }

    tracing::info!(
        name = loadset.label(),
        files = written.len(),
        destination = %destination.display(),
        "exported LoadSet"
    );
    Ok(written)
}

fn prepare_destination(destination: &Path) -> LoadResult<()> {
    if destination.exists() && !destination.is_dir() {
        return Err(LoadError::io_failure(
            "create directory",
            destination.display().to_string(),
            "path exists and is not a directory",
        ));
    }
    fs::create_dir_all(destination).map_err(|e| {
        LoadError::io_failure("create directory", destination.display().to_string(), e.to_string())
    })
}

impl LoadSet {
    /// See [`export`]
    pub fn export(&self, destination: &Path, name_prefix: &str) -> LoadResult<Vec<ExportedFile>> {
        export(self, destination, name_prefix)
    }
}
