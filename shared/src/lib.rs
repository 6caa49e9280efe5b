//! Shared types and domain logic for the Weather Prediction Service
//!
//! This crate contains everything that is pure computation: request and
//! response types, input validation, the feature encoder, the output schema
//! and the weather derivations. It is used by the backend and, through WASM,
//! by the browser dashboard.

pub mod features;
pub mod models;
pub mod schema;
pub mod types;
pub mod validation;

pub use features::*;
pub use models::*;
pub use schema::*;
pub use types::*;
pub use validation::*;
