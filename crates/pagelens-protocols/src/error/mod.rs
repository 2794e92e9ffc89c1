//! Error types for the PageLens protocol layer.

mod extraction;
mod page;
mod replace;

pub use extraction::*;
pub use page::*;
pub use replace::*;
