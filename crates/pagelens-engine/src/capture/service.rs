//! Passive runtime-error, console and network capture.
//!
//! Installing a collector wraps the scope's current function references in
//! recording closures that always call through to the wrapped function.
//! Stopping a collector puts the exact references it saw back.

use std::sync::Arc;
use std::time::Instant;

use chrono::{Duration, Utc};
use pagelens_config::CaptureConfig;
use pagelens_protocols::runtime::{
    ConsoleLevel, ConsoleSlots, ErrorEvent, ErrorHandler, NetworkFn, NetworkOutcome,
    NetworkRequest, RejectionEvent, RejectionHandler,
};
use pagelens_protocols::{
    CaptureSnapshot, CapturedConsoleLog, CapturedNetworkError, CapturedRuntimeError, GlobalScope,
    NetworkSource, PageInspector, RuntimeErrorKind,
};
use parking_lot::Mutex;
use tracing::{debug, info};

use super::ring_buffer::RingBuffer;
use crate::util::cap;

/// One independently startable collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collector {
    RuntimeErrors,
    Console,
    Network,
}

impl Collector {
    pub const ALL: [Collector; 3] = [Collector::RuntimeErrors, Collector::Console, Collector::Network];
}

struct Buffers {
    runtime_errors: RingBuffer<CapturedRuntimeError>,
    console_logs: RingBuffer<CapturedConsoleLog>,
    network_errors: RingBuffer<CapturedNetworkError>,
}

/// References that were installed before a collector started.
#[derive(Default)]
struct SavedHooks {
    runtime: Option<(Option<ErrorHandler>, Option<RejectionHandler>)>,
    console: Option<ConsoleSlots>,
    network: Option<(NetworkFn, NetworkFn)>,
}

/// Field bounds applied to every record.
#[derive(Clone, Copy)]
struct Bounds {
    message: usize,
    stack: usize,
}

/// Owns the capture buffers and the hooks saved at start.
pub struct PassiveCaptureService {
    config: CaptureConfig,
    buffers: Arc<Mutex<Buffers>>,
    saved: SavedHooks,
}

impl PassiveCaptureService {
    pub fn new(config: CaptureConfig) -> Self {
        let buffers = Buffers {
            runtime_errors: RingBuffer::new(config.runtime_error_capacity),
            console_logs: RingBuffer::new(config.console_log_capacity),
            network_errors: RingBuffer::new(config.network_error_capacity),
        };
        Self {
            config,
            buffers: Arc::new(Mutex::new(buffers)),
            saved: SavedHooks::default(),
        }
    }

    /// Start every collector. Collectors already running are left alone.
    pub fn start(&mut self, scope: &mut GlobalScope) {
        for collector in Collector::ALL {
            self.start_collector(scope, collector);
        }
        info!("Passive capture started");
    }

    /// Stop every collector and restore the original references.
    pub fn stop(&mut self, scope: &mut GlobalScope) {
        for collector in Collector::ALL {
            self.stop_collector(scope, collector);
        }
        info!("Passive capture stopped");
    }

    pub fn is_running(&self, collector: Collector) -> bool {
        match collector {
            Collector::RuntimeErrors => self.saved.runtime.is_some(),
            Collector::Console => self.saved.console.is_some(),
            Collector::Network => self.saved.network.is_some(),
        }
    }

    /// Returns `false` when the collector was already running.
    pub fn start_collector(&mut self, scope: &mut GlobalScope, collector: Collector) -> bool {
        if self.is_running(collector) {
            debug!(?collector, "Collector already running");
            return false;
        }
        match collector {
            Collector::RuntimeErrors => self.install_runtime(scope),
            Collector::Console => self.install_console(scope),
            Collector::Network => self.install_network(scope),
        }
        debug!(?collector, "Collector installed");
        true
    }

    /// Returns `false` when the collector was not running.
    pub fn stop_collector(&mut self, scope: &mut GlobalScope, collector: Collector) -> bool {
        let restored = match collector {
            Collector::RuntimeErrors => self.saved.runtime.take().map(|(on_error, on_rejection)| {
                scope.on_error = on_error;
                scope.on_unhandled_rejection = on_rejection;
            }),
            Collector::Console => self.saved.console.take().map(|console| {
                scope.console = console;
            }),
            Collector::Network => self.saved.network.take().map(|(fetch, xhr)| {
                scope.fetch = fetch;
                scope.xhr_send = xhr;
            }),
        };
        if restored.is_some() {
            debug!(?collector, "Collector restored");
        }
        restored.is_some()
    }

    /// Copies of every buffer, oldest first.
    pub fn snapshot(&self) -> CaptureSnapshot {
        let buffers = self.buffers.lock();
        CaptureSnapshot {
            runtime_errors: buffers.runtime_errors.to_vec(),
            console_logs: buffers.console_logs.to_vec(),
            network_errors: buffers.network_errors.to_vec(),
        }
    }

    pub fn clear(&self) {
        let mut buffers = self.buffers.lock();
        buffers.runtime_errors.clear();
        buffers.console_logs.clear();
        buffers.network_errors.clear();
    }

    /// Failed loads inferred from the page's resource-timing entries.
    ///
    /// Only entries that started within the configured window count. An
    /// entry is failed when it reports a status of 400 or more, or when it
    /// transferred nothing yet took long enough not to be a cache hit.
    pub fn scan_resource_timings(&self, page: &dyn PageInspector) -> Vec<CapturedNetworkError> {
        let now_ms = page.performance_now();
        let now = Utc::now();
        let bounds = self.bounds();

        let found: Vec<CapturedNetworkError> = page
            .resource_timings()
            .into_iter()
            .filter(|entry| now_ms - entry.start_time_ms <= self.config.resource_timing_window_ms)
            .filter_map(|entry| {
                let message = match entry.response_status {
                    Some(status) if status >= 400 => format!("HTTP {status}"),
                    _ if entry.transfer_size == 0
                        && entry.duration_ms >= self.config.resource_timing_min_duration_ms =>
                    {
                        "No bytes transferred; request failed or was blocked".to_string()
                    }
                    _ => return None,
                };
                let age_ms = (now_ms - entry.start_time_ms).max(0.0);
                Some(CapturedNetworkError {
                    timestamp: now - Duration::milliseconds(age_ms as i64),
                    source: NetworkSource::ResourceTiming,
                    url: cap(&entry.name, bounds.message),
                    method: None,
                    status: entry.response_status,
                    status_text: None,
                    message: Some(message),
                    duration_ms: Some(entry.duration_ms),
                })
            })
            .take(self.config.network_error_capacity)
            .collect();

        debug!(count = found.len(), "Resource timing scan complete");
        found
    }

    fn bounds(&self) -> Bounds {
        Bounds {
            message: self.config.max_message_chars,
            stack: self.config.max_stack_chars,
        }
    }

    fn install_runtime(&mut self, scope: &mut GlobalScope) {
        let bounds = self.bounds();
        let previous_error = scope.on_error.clone();
        let previous_rejection = scope.on_unhandled_rejection.clone();

        let buffers = self.buffers.clone();
        let chained = previous_error.clone();
        scope.on_error = Some(Arc::new(move |event: &ErrorEvent| {
            buffers.lock().runtime_errors.push(CapturedRuntimeError {
                timestamp: Utc::now(),
                kind: RuntimeErrorKind::Error,
                message: cap(&event.message, bounds.message),
                source: event.source.clone(),
                line: event.line,
                column: event.column,
                stack: event.stack.as_deref().map(|s| cap(s, bounds.stack)),
            });
            chained.as_ref().is_some_and(|handler| handler(event))
        }));

        let buffers = self.buffers.clone();
        let chained = previous_rejection.clone();
        scope.on_unhandled_rejection = Some(Arc::new(move |event: &RejectionEvent| {
            buffers.lock().runtime_errors.push(CapturedRuntimeError {
                timestamp: Utc::now(),
                kind: RuntimeErrorKind::UnhandledRejection,
                message: cap(&event.reason, bounds.message),
                source: None,
                line: None,
                column: None,
                stack: event.stack.as_deref().map(|s| cap(s, bounds.stack)),
            });
            if let Some(handler) = &chained {
                handler(event);
            }
        }));

        self.saved.runtime = Some((previous_error, previous_rejection));
    }

    fn install_console(&mut self, scope: &mut GlobalScope) {
        let bounds = self.bounds();
        let previous = scope.console.clone();
        for level in ConsoleLevel::ALL {
            let buffers = self.buffers.clone();
            let chained = previous.get(level).clone();
            scope.console.set(
                level,
                Arc::new(move |args: &[String]| {
                    buffers.lock().console_logs.push(CapturedConsoleLog {
                        timestamp: Utc::now(),
                        level,
                        message: cap(&args.join(" "), bounds.message),
                    });
                    chained(args)
                }),
            );
        }
        self.saved.console = Some(previous);
    }

    fn install_network(&mut self, scope: &mut GlobalScope) {
        let previous_fetch = scope.fetch.clone();
        let previous_xhr = scope.xhr_send.clone();
        scope.fetch = self.wrap_network(previous_fetch.clone(), NetworkSource::Fetch);
        scope.xhr_send = self.wrap_network(previous_xhr.clone(), NetworkSource::Xhr);
        self.saved.network = Some((previous_fetch, previous_xhr));
    }

    fn wrap_network(&self, chained: NetworkFn, source: NetworkSource) -> NetworkFn {
        let buffers = self.buffers.clone();
        let bounds = self.bounds();
        Arc::new(move |request: &NetworkRequest| {
            let started = Instant::now();
            let outcome = chained(request);
            let duration_ms = Some(started.elapsed().as_secs_f64() * 1000.0);

            let record = match &outcome {
                NetworkOutcome::Response { status, status_text } if *status >= 400 => {
                    Some(CapturedNetworkError {
                        timestamp: Utc::now(),
                        source,
                        url: cap(&request.url, bounds.message),
                        method: Some(request.method.clone()),
                        status: Some(*status),
                        status_text: Some(status_text.clone()),
                        message: None,
                        duration_ms,
                    })
                }
                NetworkOutcome::Response { .. } => None,
                NetworkOutcome::Failed { message } => Some(CapturedNetworkError {
                    timestamp: Utc::now(),
                    source,
                    url: cap(&request.url, bounds.message),
                    method: Some(request.method.clone()),
                    status: None,
                    status_text: None,
                    message: Some(cap(message, bounds.message)),
                    duration_ms,
                }),
            };
            if let Some(record) = record {
                buffers.lock().network_errors.push(record);
            }
            outcome
        })
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
