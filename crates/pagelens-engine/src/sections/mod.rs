//! Structured reads of the page: ranked sections, on-page errors and the
//! smaller structural extractors.

mod errors;
mod extractor;
mod scorer;
mod structure;

pub use extractor::SectionExtractor;
pub use scorer::RelevanceScorer;
