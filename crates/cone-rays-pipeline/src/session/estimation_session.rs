//! Persistent side of an estimator.
//!
//! Holds configuration, the samples of the last finished collection, the
//! generated asset with its saved copies and an operation log. Can be
//! checkpointed to JSON and restored.

use anyhow::{Result, anyhow, bail, ensure};
use cone_rays_core::{AngleSample, ConeRayAngles};
use serde::{Deserialize, Serialize};

use super::types::{LogEntry, SavedAsset, SessionMetadata};
use super::{SCHEMA_VERSION, SESSION_KIND};
use crate::EstimatorConfig;

/// Mutable record of one estimator's data.
///
/// Only the latest generated asset is kept. Storing new samples drops it,
/// changing the configuration does not. Saving marks it saved until the
/// next estimation replaces it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimationSession {
    pub metadata: SessionMetadata,

    pub config: EstimatorConfig,

    samples: Option<Vec<AngleSample>>,

    output: Option<ConeRayAngles>,

    #[serde(default)]
    output_saved: bool,

    /// Every save of a generated asset, oldest first.
    #[serde(default)]
    pub saved: Vec<SavedAsset>,

    #[serde(default)]
    pub log: Vec<LogEntry>,
}

impl EstimationSession {
    /// Empty session with the default configuration.
    pub fn new() -> Self {
        Self {
            metadata: SessionMetadata::new(SESSION_KIND, SCHEMA_VERSION),
            config: EstimatorConfig::default(),
            samples: None,
            output: None,
            output_saved: false,
            saved: Vec::new(),
            log: Vec::new(),
        }
    }

    /// Empty session with a free-text description.
    pub fn with_description(description: impl Into<String>) -> Self {
        let mut session = Self::new();
        session.metadata.description = Some(description.into());
        session
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Samples
    // ─────────────────────────────────────────────────────────────────────────

    /// Store the samples of a finished collection. Drops the current output.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first sample with a non-finite value;
    /// the session is left untouched.
    pub fn set_samples(&mut self, samples: Vec<AngleSample>) -> Result<()> {
        if let Some((i, s)) = samples.iter().enumerate().find(|(_, s)| !s.is_finite()) {
            bail!("sample {} ({} {}) has a non-finite value", i, s.joint, s.side);
        }
        self.drop_output();
        self.samples = Some(samples);
        self.metadata.touch();
        Ok(())
    }

    /// Samples of the last finished collection.
    pub fn samples(&self) -> Option<&[AngleSample]> {
        self.samples.as_deref()
    }

    /// # Errors
    ///
    /// Returns an error if no samples are stored.
    pub fn require_samples(&self) -> Result<&[AngleSample]> {
        self.samples()
            .ok_or_else(|| anyhow!("no collected samples stored"))
    }

    pub fn has_samples(&self) -> bool {
        self.samples.is_some()
    }

    /// Drop the stored samples together with the output estimated from them.
    pub fn clear_samples(&mut self) {
        self.samples = None;
        self.drop_output();
        self.metadata.touch();
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Configuration
    // ─────────────────────────────────────────────────────────────────────────

    /// # Errors
    ///
    /// Returns an error if [`EstimatorConfig::validate`] fails.
    pub fn set_config(&mut self, config: EstimatorConfig) -> Result<()> {
        config.validate()?;
        self.config = config;
        self.metadata.touch();
        Ok(())
    }

    /// Edit a copy of the configuration and store it if it validates.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails; the previous configuration is
    /// kept.
    pub fn update_config<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(&mut EstimatorConfig),
    {
        let mut config = self.config.clone();
        f(&mut config);
        self.set_config(config)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Output
    // ─────────────────────────────────────────────────────────────────────────

    /// The latest generated asset.
    pub fn output(&self) -> Option<&ConeRayAngles> {
        self.output.as_ref()
    }

    /// # Errors
    ///
    /// Returns an error if no asset has been generated.
    pub fn require_output(&self) -> Result<&ConeRayAngles> {
        self.output().ok_or_else(|| anyhow!("no generated asset"))
    }

    /// Store a freshly generated asset; it starts out unsaved.
    pub fn set_output(&mut self, output: ConeRayAngles) {
        self.output = Some(output);
        self.output_saved = false;
        self.metadata.touch();
    }

    pub fn has_output(&self) -> bool {
        self.output.is_some()
    }

    /// Whether the current asset was generated after the last save.
    pub fn has_unsaved_output(&self) -> bool {
        self.has_output() && !self.output_saved
    }

    /// Record a save of the current asset and return a copy for the host.
    ///
    /// # Errors
    ///
    /// Returns an error if no asset has been generated.
    pub fn save_output(&mut self, notes: Option<String>) -> Result<ConeRayAngles> {
        let asset = self.require_output()?.clone();
        self.saved.push(SavedAsset::new(asset.clone(), notes));
        self.output_saved = true;
        self.metadata.touch();
        Ok(asset)
    }

    fn drop_output(&mut self) {
        self.output = None;
        self.output_saved = false;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Operation log
    // ─────────────────────────────────────────────────────────────────────────

    /// Append a success entry to the operation log.
    pub fn log_success(&mut self, operation: impl Into<String>) {
        self.push_log(LogEntry::success(operation));
    }

    pub fn log_success_with_notes(
        &mut self,
        operation: impl Into<String>,
        notes: impl Into<String>,
    ) {
        self.push_log(LogEntry::success_with_notes(operation, notes));
    }

    /// Append a failure entry to the operation log.
    pub fn log_failure(&mut self, operation: impl Into<String>, error: impl Into<String>) {
        self.push_log(LogEntry::failure(operation, error));
    }

    fn push_log(&mut self, entry: LogEntry) {
        self.log.push(entry);
        self.metadata.touch();
    }

    /// Forget samples, output, saves and log. Configuration, interactor and
    /// description survive.
    pub fn reset(&mut self) {
        self.samples = None;
        self.drop_output();
        self.saved.clear();
        self.log.clear();
        self.metadata.touch();
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Checkpointing
    // ─────────────────────────────────────────────────────────────────────────

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Restore a checkpoint. The restored asset is ready for lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed, is not an estimation
    /// session or was written by a newer schema version.
    pub fn from_json(json: &str) -> Result<Self> {
        let session: Self = serde_json::from_str(json)?;
        let kind = &session.metadata.kind;
        ensure!(
            kind == SESSION_KIND,
            "expected a {} session, got {}",
            SESSION_KIND,
            kind
        );
        let version = session.metadata.schema_version;
        ensure!(
            version <= SCHEMA_VERSION,
            "session schema version {} is newer than supported version {}",
            version,
            SCHEMA_VERSION
        );
        Ok(session)
    }
}

impl Default for EstimationSession {
    fn default() -> Self {
        Self::new()
    }
}
