//! World configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::WorldError;

/// Configuration for a [`World`](crate::World) and its frame driver.
///
/// Every field has a default, so `{}` is a valid config document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Maximum frames per second (0 = unlimited).
    pub frame_rate_limit: u32,
    /// Stop after this many frames (0 = run until stopped).
    pub max_frames: u64,
    /// Report this delta every frame instead of the measured one.
    pub fixed_delta: Option<f32>,
}

impl WorldConfig {
    #[must_use]
    pub fn new() -> Self {
        Self {
            frame_rate_limit: 0,
            max_frames: 0,
            fixed_delta: None,
        }
    }

    #[must_use]
    pub fn with_frame_rate_limit(mut self, fps: u32) -> Self {
        self.frame_rate_limit = fps;
        self
    }

    #[must_use]
    pub fn with_max_frames(mut self, frames: u64) -> Self {
        self.max_frames = frames;
        self
    }

    #[must_use]
    pub fn with_fixed_delta(mut self, delta_time: f32) -> Self {
        self.fixed_delta = Some(delta_time);
        self
    }

    /// Minimum wall-clock duration of one frame, if the rate is limited.
    #[must_use]
    pub fn frame_budget(&self) -> Option<Duration> {
        (self.frame_rate_limit > 0).then(|| Duration::from_secs_f64(1.0 / f64::from(self.frame_rate_limit)))
    }

    /// Parses a JSON config document.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::ConfigParse`] if `json` is malformed.
    pub fn from_json_str(json: &str) -> Result<Self, WorldError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON config file.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::ConfigIo`] if the file cannot be read and
    /// [`WorldError::ConfigParse`] if its contents are malformed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, WorldError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| WorldError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self::new()
    }
}
