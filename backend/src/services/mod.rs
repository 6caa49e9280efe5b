//! Prediction pipeline services

pub mod interpreter;
pub mod prediction;

pub use interpreter::{heuristic_confidence, Interpretation, OutputInterpreter};
pub use prediction::{Prediction, PredictionService, PredictionStage};
