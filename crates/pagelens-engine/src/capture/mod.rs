//! Passive diagnostics capture into bounded ring buffers.

mod ring_buffer;
mod service;

pub use ring_buffer::RingBuffer;
pub use service::{Collector, PassiveCaptureService};
