//! Wire and data types shared across the engine.

mod capture;
mod context;
mod message;
mod selection;

pub use capture::*;
pub use context::*;
pub use message::*;
pub use selection::*;

#[cfg(test)]
#[path = "types_tests.rs"]
mod tests;
