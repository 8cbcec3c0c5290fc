use std::path::PathBuf;

use crate::api::types::EntityId;

/// Errors surfaced by the fallible edges of the engine: stepping, level files
/// and save games. Per-tick gameplay code never returns these.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("physics step requires a positive, finite dt (got {dt})")]
    InvalidTimestep { dt: f32 },

    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("entity {id} is already registered")]
    DuplicateEntity { id: EntityId },

    #[error("entity {id} was not allocated by this scene or is stale")]
    StaleEntity { id: EntityId },
}

impl EngineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
