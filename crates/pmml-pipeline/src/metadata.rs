//! Read model handed to exporters.
//!
//! [`PipelineMetadata`] bundles the captured field names and the latest
//! verification snapshot. Its [`digest`](PipelineMetadata::digest) covers
//! everything except the generation timestamp, so two metadata values built
//! from the same fitted state share a digest.

use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::data::fields::FieldNames;
use crate::error::Result;
use crate::verification::Verification;

/// Version of the metadata layout produced by this crate.
pub const METADATA_SCHEMA_VERSION: &str = "1.0";

#[derive(Debug, Clone, Serialize)]
pub struct PipelineMetadata {
    pub schema_version: String,
    pub generated_at: DateTime<Utc>,
    pub steps: Vec<String>,
    pub active_fields: Option<FieldNames>,
    pub target_fields: Option<FieldNames>,
    pub verification: Option<Verification>,
}

impl PipelineMetadata {
    pub fn new(
        steps: Vec<String>,
        active_fields: Option<FieldNames>,
        target_fields: Option<FieldNames>,
        verification: Option<Verification>,
    ) -> Self {
        Self {
            schema_version: METADATA_SCHEMA_VERSION.to_string(),
            generated_at: Utc::now(),
            steps,
            active_fields,
            target_fields,
            verification,
        }
    }

    /// SHA-256 hex digest over the sorted-key JSON form, timestamp excluded.
    pub fn digest(&self) -> Result<String> {
        let mut value = serde_json::to_value(self)?;
        if let Some(object) = value.as_object_mut() {
            object.remove("generated_at");
        }
        let bytes = serde_json::to_vec(&value)?;
        Ok(hex::encode(Sha256::digest(&bytes)))
    }
}

/// Write metadata as pretty-printed JSON.
pub fn write_metadata_json(path: &Path, metadata: &PipelineMetadata) -> anyhow::Result<()> {
    let content = serde_json::to_string_pretty(metadata).context("serialize pipeline metadata")?;
    std::fs::write(path, content).with_context(|| format!("write {:?}", path))?;
    Ok(())
}
