//! Error types
//!
//! Caller-contract violations inside a tick are logged and turned into
//! no-ops; only lookups through the non-fallible accessors surface a
//! [`WorldError`]. Level and settings loading fail with their own errors.

use std::path::PathBuf;

use thiserror::Error;

use crate::ecs::{ComponentKind, EntityId};

/// Registry lookup failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorldError {
    #[error("{entity} has no {kind:?} component")]
    ComponentNotFound {
        entity: EntityId,
        kind: ComponentKind,
    },

    #[error("{0} is not alive")]
    DeadEntity(EntityId),
}

/// Level loading failures. Nothing is committed to the world when one is returned.
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("failed to read level file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed level description: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("entity #{index} ({kind}) is missing required field `{field}`")]
    MissingField {
        index: usize,
        kind: String,
        field: &'static str,
    },

    #[error("level must contain a player")]
    NoPlayer,

    #[error("no levels to play")]
    NoLevels,
}

/// Settings file failures
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed settings: {0}")]
    Parse(#[from] serde_json::Error),
}
