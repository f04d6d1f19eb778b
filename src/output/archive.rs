//! Filesystem archiving of rendered digests.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::info;

use crate::errors::Result;

/// Write a rendered digest to `dir/digest_YYYY-MM-DD.md`, creating the
/// directory if needed. Returns the written path.
pub fn archive_digest(markdown: &str, dir: &Path, date: DateTime<Utc>) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("digest_{}.md", date.format("%Y-%m-%d")));
    fs::write(&path, markdown)?;
    info!(path = %path.display(), "archived digest");
    Ok(path)
}
