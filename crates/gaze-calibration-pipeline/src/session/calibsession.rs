//! Calibration session container with mutable state.

use std::sync::Arc;

use anyhow::{Result, bail};
use gaze_calibration_core::{EyeSelection, SampleHub};
use serde::{Deserialize, Serialize};

use super::types::{LogEntry, SessionMetadata};
use crate::repository::{CalibrationRepository, RepositorySet};
use crate::workflow::{WorkflowConfig, WorkflowSessionState};

/// Schema version written into [`SessionMetadata`].
pub const SCHEMA_VERSION: u32 = 1;

/// Everything a workflow run reads and writes.
///
/// The sample hub is runtime-only: it is rebuilt from
/// [`WorkflowConfig::buffer_capacity`] when a session is created, reconfigured
/// or loaded.
#[derive(Debug, Serialize, Deserialize)]
pub struct CalibrationSession {
    /// Session metadata (schema version, timestamps, description).
    pub metadata: SessionMetadata,

    config: WorkflowConfig,

    /// Attempts per eye selection.
    pub repositories: RepositorySet,

    /// Workflow intermediate state.
    pub state: WorkflowSessionState,

    /// Operation log (lightweight audit trail).
    pub log: Vec<LogEntry>,

    #[serde(skip)]
    hub: Arc<SampleHub>,
}

impl CalibrationSession {
    // ─────────────────────────────────────────────────────────────────────────
    // Construction
    // ─────────────────────────────────────────────────────────────────────────

    /// Create a new empty session with default configuration.
    pub fn new() -> Self {
        Self::from_parts(SessionMetadata::new(SCHEMA_VERSION), WorkflowConfig::default())
    }

    pub fn with_description(description: impl Into<String>) -> Self {
        Self::from_parts(
            SessionMetadata::with_description(SCHEMA_VERSION, description),
            WorkflowConfig::default(),
        )
    }

    /// # Errors
    ///
    /// Returns an error if [`WorkflowConfig::validate`] fails.
    pub fn with_config(config: WorkflowConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_parts(SessionMetadata::new(SCHEMA_VERSION), config))
    }

    fn from_parts(metadata: SessionMetadata, config: WorkflowConfig) -> Self {
        let hub = Arc::new(SampleHub::new(config.buffer_capacity));
        Self {
            metadata,
            config,
            repositories: RepositorySet::default(),
            state: WorkflowSessionState::default(),
            log: Vec::new(),
            hub,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Configuration
    // ─────────────────────────────────────────────────────────────────────────

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    /// Replace the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails, or if the tracker is streaming
    /// into the current hub.
    pub fn set_config(&mut self, config: WorkflowConfig) -> Result<()> {
        config.validate()?;
        if config.buffer_capacity != self.hub.window().capacity() {
            if self.state.streaming {
                bail!("cannot resize the sample buffer while the tracker is streaming");
            }
            self.hub = Arc::new(SampleHub::new(config.buffer_capacity));
        }
        self.config = config;
        self.metadata.touch();
        Ok(())
    }

    /// Update configuration with a closure, then validate.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails after the update.
    pub fn update_config<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(&mut WorkflowConfig),
    {
        let mut new_config = self.config.clone();
        f(&mut new_config);
        self.set_config(new_config)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Runtime
    // ─────────────────────────────────────────────────────────────────────────

    /// Hub the tracker publishes into.
    pub fn hub(&self) -> &Arc<SampleHub> {
        &self.hub
    }

    pub fn repository(&self, eyes: EyeSelection) -> &CalibrationRepository {
        self.repositories.get(eyes)
    }

    pub fn repository_mut(&mut self, eyes: EyeSelection) -> &mut CalibrationRepository {
        self.repositories.get_mut(eyes)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Logging
    // ─────────────────────────────────────────────────────────────────────────

    pub fn log_success(&mut self, operation: impl Into<String>) {
        self.log.push(LogEntry::success(operation));
        self.metadata.touch();
    }

    pub fn log_success_with_notes(
        &mut self,
        operation: impl Into<String>,
        notes: impl Into<String>,
    ) {
        self.log.push(LogEntry::success_with_notes(operation, notes));
        self.metadata.touch();
    }

    pub fn log_failure(&mut self, operation: impl Into<String>, error: impl Into<String>) {
        self.log.push(LogEntry::failure(operation, error));
        self.metadata.touch();
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Serialization
    // ─────────────────────────────────────────────────────────────────────────

    /// Serialize session to JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(Into::into)
    }

    /// Deserialize session from JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Deserialization fails
    /// - Schema version is newer than supported
    /// - The stored configuration is invalid
    pub fn from_json(json: &str) -> Result<Self> {
        let mut session: Self = serde_json::from_str(json)?;

        if session.metadata.schema_version > SCHEMA_VERSION {
            bail!(
                "session schema version {} is newer than supported version {}",
                session.metadata.schema_version,
                SCHEMA_VERSION
            );
        }
        session.config.validate()?;
        session.hub = Arc::new(SampleHub::new(session.config.buffer_capacity));

        Ok(session)
    }
}

impl Default for CalibrationSession {
    fn default() -> Self {
        Self::new()
    }
}
