//! Connection definitions stored in a JSON file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use uuid::Uuid;

use super::ConnectionParams;

/// A JSON file holding an array of connection definitions.
///
/// Entries without an `id` get a fresh one when loaded.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

#[derive(serde::Deserialize)]
struct RawConnection {
    #[serde(default)]
    id: Option<String>,
    name: String,
    #[serde(rename = "type")]
    kind: String,
    url: String,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load every connection. A missing file is an empty source.
    pub fn load(&self) -> Result<Vec<ConnectionParams>> {
        if !self.path.exists() {
            log::info!("connection source {} does not exist yet", self.path.display());
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read connections file: {}", self.path.display()))?;
        let raw: Vec<RawConnection> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse connections file: {}", self.path.display()))?;

        Ok(raw
            .into_iter()
            .map(|entry| ConnectionParams {
                id: entry.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
                name: entry.name,
                kind: entry.kind,
                url: entry.url,
            })
            .collect())
    }

    /// Overwrite the file with `connections`.
    pub fn save(&self, connections: &[ConnectionParams]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(connections).context("Failed to serialize connections")?;
        fs::write(&self.path, content)
            .with_context(|| format!("Failed to write connections file: {}", self.path.display()))?;
        Ok(())
    }
}
