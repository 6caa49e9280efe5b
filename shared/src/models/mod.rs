//! Domain models for the Weather Prediction Service

mod prediction;
mod weather;

pub use prediction::*;
pub use weather::*;
