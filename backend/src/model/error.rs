//! Model loading and evaluation errors

use std::path::PathBuf;

use shared::{FeatureError, SchemaError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to read model artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed model artifact: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unsupported artifact format version {0}")]
    UnsupportedFormat(u32),

    #[error("feature arity mismatch: model expects {expected} inputs, got {actual}")]
    FeatureArityMismatch { expected: usize, actual: usize },

    #[error("output arity mismatch: model produces {model} values, schema names {schema}")]
    OutputArityMismatch { model: usize, schema: usize },

    #[error("schema version mismatch: expected {expected}, artifact has {actual}")]
    SchemaVersionMismatch { expected: String, actual: String },

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("invalid feature list: {0}")]
    Features(#[from] FeatureError),

    #[error("invalid tree {tree}: {reason}")]
    InvalidTree { tree: usize, reason: String },

    #[error("invalid {which} scaler: {reason}")]
    InvalidScaler { which: &'static str, reason: String },

    #[error("model reads coordinates but the artifact does not require a location")]
    LocationPolicy,

    #[error("forecast horizon of {days} days exceeds the {max}-day limit")]
    HorizonTooLong { days: u32, max: u32 },
}
