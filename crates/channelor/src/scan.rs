//! Recorded scan input: JSON / YAML files and newline-delimited snapshots.

use std::path::Path;

use channelor_core::NetworkObservation;

use crate::error::CliError;

/// Load a scan snapshot. `.yaml` / `.yml` files are parsed as YAML,
/// anything else as JSON.
pub fn load_scan_file(path: &Path) -> Result<Vec<NetworkObservation>, CliError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(CliError::ScanNotFound {
                path: path.display().to_string(),
            });
        }
        Err(e) => return Err(e.into()),
    };

    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

    let origin = path.display().to_string();
    let observations: Vec<NetworkObservation> = if is_yaml {
        serde_yaml::from_str(&contents).map_err(|e| CliError::ScanFormat {
            origin,
            reason: e.to_string(),
        })?
    } else {
        serde_json::from_str(&contents).map_err(|e| CliError::ScanFormat {
            origin,
            reason: e.to_string(),
        })?
    };

    tracing::debug!(path = %path.display(), count = observations.len(), "loaded scan file");
    Ok(observations)
}

/// Parse one line of a snapshot stream. Blank lines yield `None`.
pub fn parse_snapshot_line(
    line: &str,
    line_number: usize,
) -> Result<Option<Vec<NetworkObservation>>, CliError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(trimmed)
        .map(Some)
        .map_err(|e| CliError::ScanFormat {
            origin: format!("line {line_number}"),
            reason: e.to_string(),
        })
}
