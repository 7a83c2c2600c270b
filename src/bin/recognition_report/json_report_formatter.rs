use std::fs;
use std::path::Path;

use asl_recognizer::Report;

/// Serialize `report` as pretty JSON and write it to `path`.
///
/// The document is fully rendered before the file is touched, so a
/// serialization failure never leaves a truncated report behind.
pub fn write_report(path: &Path, report: &Report) -> Result<(), String> {
    let mut json = serde_json::to_string_pretty(report)
        .map_err(|err| format!("Could not render recognition report as JSON: {err}"))?;
    json.push('\n');

    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .map_err(|err| format!("Could not create report directory {}: {err}", dir.display()))?;
    }
    fs::write(path, json).map_err(|err| format!("Could not write report {}: {err}", path.display()))
}
