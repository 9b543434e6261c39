//! Versioned artifact envelope
//!
//! The registry stores artifacts wrapped in a self-describing envelope so it
//! can reject payloads written by an incompatible version without having to
//! understand the payload itself.

use serde::{Deserialize, Serialize};

use crate::error::{ForesightError, Result};

use super::forecaster::Forecaster;

pub const ARTIFACT_FORMAT: &str = "foresight.forecaster";
pub const ARTIFACT_SCHEMA_VERSION: u32 = 1;

/// Envelope persisted alongside metadata. The payload is opaque to the
/// registry; only `wrap`/`open` interpret it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactEnvelope {
    pub schema_version: u32,
    pub format: String,
    pub payload: serde_json::Value,
}

impl ArtifactEnvelope {
    /// Wrap a fitted model for persistence
    pub fn wrap(model: &Forecaster) -> Result<Self> {
        Ok(Self {
            schema_version: ARTIFACT_SCHEMA_VERSION,
            format: ARTIFACT_FORMAT.to_string(),
            payload: serde_json::to_value(model)?,
        })
    }

    /// Decode the payload, rejecting unknown formats and versions.
    ///
    /// A mismatch means the stored record was written by something this
    /// build cannot interpret, which read paths surface as a storage error.
    pub fn open(&self) -> Result<Forecaster> {
        if self.format != ARTIFACT_FORMAT {
            return Err(ForesightError::Storage(format!(
                "unsupported artifact format '{}'",
                self.format
            )));
        }
        if self.schema_version != ARTIFACT_SCHEMA_VERSION {
            return Err(ForesightError::Storage(format!(
                "unsupported artifact schema version {} (expected {})",
                self.schema_version, ARTIFACT_SCHEMA_VERSION
            )));
        }
        serde_json::from_value(self.payload.clone())
            .map_err(|e| ForesightError::Storage(format!("corrupt artifact payload: {}", e)))
    }
}
