//! World-level error types.

use std::path::PathBuf;

use engine_component::ObjectError;
use engine_connect::PortError;

/// Errors surfaced by [`World`](crate::World) operations and config loading.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    #[error(transparent)]
    Port(#[from] PortError),

    #[error(transparent)]
    Object(#[from] ObjectError),

    /// The config file could not be read.
    #[error("failed to read world config {}: {source}", .path.display())]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config text is not valid JSON for [`WorldConfig`](crate::WorldConfig).
    #[error("invalid world config: {0}")]
    ConfigParse(#[from] serde_json::Error),
}
