//! # PageLens Engine
//!
//! Turns a live page into a bounded, privacy-masked context payload and
//! writes generated text back over the user's selection.
//!
//! ## Components
//!
//! - [`ContextAggregator`] - One extraction pass over every extractor
//! - [`SectionExtractor`] - Scored sections, errors, headings, tables, forms
//! - [`PassiveCaptureService`] - Console, runtime and network capture
//! - [`SelectionTracker`] / [`TextReplacer`] - Selection capture and replacement
//! - [`MessageRouter`] - Request dispatch and the quick-action lifecycle
//!
//! ## Privacy
//!
//! Every string leaving the engine passes through [`Redactor`]; the
//! [`PayloadLedger`] records which fields were masked or truncated.

mod aggregator;
pub mod capture;
mod ledger;
pub mod platform;
mod redactor;
mod replacer;
mod router;
pub mod sections;
pub mod selection;
mod ui_state;
mod util;

pub use aggregator::{ContextAggregator, ENGINE_VERSION};
pub use capture::{Collector, PassiveCaptureService, RingBuffer};
pub use ledger::PayloadLedger;
pub use platform::PlatformDetector;
pub use redactor::{REDACTED, Redaction, Redactor};
pub use replacer::TextReplacer;
pub use router::MessageRouter;
pub use sections::{RelevanceScorer, SectionExtractor};
pub use selection::{SelectionTracker, TextMap};
pub use ui_state::UiStateAnalyzer;
