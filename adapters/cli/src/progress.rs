//! Progress record persistence for the command-line adapter.
//!
//! The record is a two-field TOML document so players can read and edit it by
//! hand. Loading tolerates a missing file; a corrupt one surfaces as an error
//! rather than silently restarting the campaign.

use anyhow::{Context, Result};
use std::path::Path;
use tilepush_system_session::ProgressRecord;

/// Loads the persisted progress record, if one exists.
pub(crate) fn load(path: &Path) -> Result<Option<ProgressRecord>> {
    let document = match std::fs::read_to_string(path) {
        Ok(document) => document,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(error) => {
            return Err(error).with_context(|| format!("failed to read {}", path.display()))
        }
    };

    let record = toml::from_str(&document)
        .with_context(|| format!("failed to parse progress record {}", path.display()))?;
    Ok(Some(record))
}

/// Persists the progress record, replacing any previous one.
pub(crate) fn save(path: &Path, record: &ProgressRecord) -> Result<()> {
    let document = toml::to_string(record).context("failed to serialise progress record")?;
    std::fs::write(path, document)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
