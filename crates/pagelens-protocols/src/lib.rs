//! # PageLens Protocols
//!
//! Page abstraction and wire types shared by the PageLens crates.
//! Contains interface definitions and plain data only.
//!
//! ## Core Traits
//!
//! - [`PageInspector`] - Read access to a live (or fabricated) document
//! - [`PageMutator`] - The bounded set of mutations the engine may perform
//! - [`Clipboard`] - Asynchronous-clipboard style text writes
//!
//! ## Runtime Surface
//!
//! - [`GlobalScope`] - The page's hookable globals (error handlers, console,
//!   fetch, XHR) that passive capture wraps and restores.

pub mod error;
pub mod page;
pub mod runtime;
pub mod types;

pub use error::{ExtractionError, PageError, ReplaceError, StaleSelection};
pub use page::{
    BoundaryPoint, Clipboard, DomEvent, DomRange, LiveSelection, NodeId, PageInspector,
    PageLocation, PageMutator, ReadyState, ResourceTiming,
};
pub use runtime::GlobalScope;
pub use types::*;
