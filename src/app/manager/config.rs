//! Configuration for the download manager
//!
//! This module defines where assets land, how files are named, and how the
//! manager paces itself against the remote origin.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{jobs, limits};

/// Configuration for one download run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagerConfig {
    /// Directory assets are written to, created on demand
    pub output_dir: PathBuf,
    /// Fixed pause after each fetch attempt
    pub inter_item_delay: Duration,
    /// Extension appended to identifiers that have none
    pub default_extension: Option<String>,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(jobs::DEFAULT_OUTPUT_ROOT),
            inter_item_delay: Duration::from_millis(limits::DEFAULT_INTER_ITEM_DELAY_MS),
            default_extension: None,
        }
    }
}

impl ManagerConfig {
    /// Create a configuration writing into `output_dir`
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            ..Default::default()
        }
    }

    /// Set the pause after each fetch attempt
    pub fn with_inter_item_delay(mut self, delay: Duration) -> Self {
        self.inter_item_delay = delay;
        self
    }

    /// Set the extension for extension-less identifiers
    pub fn with_default_extension(mut self, extension: impl Into<String>) -> Self {
        self.default_extension = Some(extension.into());
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.output_dir.as_os_str().is_empty() {
            return Err("Output directory cannot be empty".to_string());
        }

        if let Some(extension) = &self.default_extension {
            if extension.contains(['/', '\\']) {
                return Err(format!("Invalid default extension: {}", extension));
            }
        }

        Ok(())
    }
}
