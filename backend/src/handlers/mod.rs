//! HTTP request handlers

pub mod health;
pub mod prediction;
pub mod variables;

pub use health::*;
pub use prediction::*;
pub use variables::*;
