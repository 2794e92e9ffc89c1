//! # PageLens Config
//!
//! Configuration management for the PageLens engine: size caps, relevance
//! weights, capture capacities, replacement behavior, and logging.

mod error;
mod loader;
mod schema;
mod validator;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::*;
pub use validator::{ConfigValidator, ValidationError, ValidationResult, ValidationWarning};
