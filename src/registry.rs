//! Durable model registry
//!
//! One JSON file per model name under a base directory, each holding the
//! artifact envelope and its metadata together. Writes go to a same-directory
//! temporary file and commit with a single `rename`, so a reader sees either
//! the old record or the new one in full, never a mixture. Two concurrent
//! writers to the same name race and the last rename wins in full.
//!
//! The registry is the only shared mutable resource in the crate and needs
//! no lock: the atomic commit per write is the whole concurrency story.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;
use uuid::Uuid;

use crate::dataset::Holiday;
use crate::error::{ForesightError, Result};
use crate::model::ArtifactEnvelope;

const RECORD_EXT: &str = "json";
const MAX_NAME_LEN: usize = 64;

/// Metadata stored with every artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub trained_at: DateTime<Utc>,
    pub params: Map<String, Value>,
    pub row_count: usize,
    pub holidays: Option<Vec<Holiday>>,
}

/// Metadata annotated with its registry key, as returned by `list`
#[derive(Debug, Clone, Serialize)]
pub struct ModelSummary {
    pub model_name: String,
    #[serde(flatten)]
    pub metadata: ModelMetadata,
}

/// The unit of persistence: artifact + metadata from the same training run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelRecord {
    pub metadata: ModelMetadata,
    pub artifact: ArtifactEnvelope,
}

/// Durable keyed store of model records
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    base_dir: PathBuf,
}

impl ModelRegistry {
    /// Open (creating if needed) a registry rooted at `base_dir`
    pub fn open(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.into();
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Write or fully replace the record for `name`.
    ///
    /// Serializes to a temporary file in the registry directory, then
    /// renames over the final path. The rename is the commit point.
    pub fn put(&self, name: &str, record: &ModelRecord) -> Result<()> {
        validate_name(name)?;

        let bytes = serde_json::to_vec_pretty(record)?;
        let final_path = self.record_path(name);
        let tmp_path = self
            .base_dir
            .join(format!(".{}.{}.tmp", name, Uuid::new_v4().simple()));

        fs::write(&tmp_path, &bytes)?;
        if let Err(e) = fs::rename(&tmp_path, &final_path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }

        debug!(model = name, bytes = bytes.len(), "committed model record");
        Ok(())
    }

    /// Read the record for `name`. The caller gets its own copy.
    pub fn get(&self, name: &str) -> Result<ModelRecord> {
        validate_name(name)?;

        let path = self.record_path(name);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(not_found(name));
            }
            Err(e) => return Err(e.into()),
        };

        serde_json::from_slice(&bytes).map_err(|e| {
            ForesightError::Storage(format!("corrupt record for model '{}': {}", name, e))
        })
    }

    /// Snapshot of all stored metadata, annotated with model names.
    ///
    /// An empty registry yields an empty list; a corrupt record propagates
    /// as a storage error rather than being skipped. A record deleted
    /// between the directory scan and the read is simply absent from the
    /// snapshot, so concurrent deletes never fail an unrelated listing.
    pub fn list(&self) -> Result<Vec<ModelSummary>> {
        let mut summaries = Vec::new();

        for entry in fs::read_dir(&self.base_dir)? {
            let path = entry?.path();
            let Some(name) = record_name(&path) else {
                continue;
            };
            let record = match self.get(&name) {
                Ok(record) => record,
                Err(ForesightError::NotFound(_)) => continue, // deleted mid-scan
                Err(e) => return Err(e),
            };
            summaries.push(ModelSummary {
                model_name: name,
                metadata: record.metadata,
            });
        }

        Ok(summaries)
    }

    /// Remove the record for `name`; artifact and metadata go together
    pub fn delete(&self, name: &str) -> Result<()> {
        validate_name(name)?;

        match fs::remove_file(self.record_path(name)) {
            Ok(()) => {
                debug!(model = name, "deleted model record");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(not_found(name)),
            Err(e) => Err(e.into()),
        }
    }

    pub fn exists(&self, name: &str) -> bool {
        validate_name(name).is_ok() && self.record_path(name).exists()
    }

    /// Name of the most recently trained model, if any.
    ///
    /// Ties on `trained_at` break by name so the choice is deterministic.
    pub fn latest_model_name(&self) -> Result<Option<String>> {
        let latest = self
            .list()?
            .into_iter()
            .max_by(|a, b| {
                a.metadata
                    .trained_at
                    .cmp(&b.metadata.trained_at)
                    .then_with(|| a.model_name.cmp(&b.model_name))
            })
            .map(|summary| summary.model_name);
        Ok(latest)
    }

    fn record_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(format!("{}.{}", name, RECORD_EXT))
    }
}

/// Model names double as file names, so they are restricted to a safe
/// character set before any path is built.
pub fn validate_name(name: &str) -> Result<()> {
    let ok = !name.is_empty()
        && name.len() <= MAX_NAME_LEN
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if ok {
        Ok(())
    } else {
        Err(ForesightError::Validation(format!(
            "invalid model name '{}': use up to {} characters from [A-Za-z0-9_-]",
            name, MAX_NAME_LEN
        )))
    }
}

/// Extract the model name from a record path, ignoring temp and foreign files
fn record_name(path: &Path) -> Option<String> {
    if path.extension()?.to_str()? != RECORD_EXT {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    if stem.starts_with('.') || validate_name(stem).is_err() {
        return None;
    }
    Some(stem.to_string())
}

fn not_found(name: &str) -> ForesightError {
    ForesightError::NotFound(format!("model '{}' not found", name))
}
