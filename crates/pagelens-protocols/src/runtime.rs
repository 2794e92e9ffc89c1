//! The page's hookable globals.
//!
//! Every slot holds a shared function reference so an observer can wrap the
//! current value, chain to it, and later put the exact same reference back.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Payload of a global error event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEvent {
    pub message: String,
    pub source: Option<String>,
    pub line: Option<u32>,
    pub column: Option<u32>,
    pub stack: Option<String>,
}

/// Payload of an unhandled promise rejection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectionEvent {
    pub reason: String,
    pub stack: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleLevel {
    Log,
    Info,
    Warn,
    Error,
    Debug,
}

impl ConsoleLevel {
    pub const ALL: [ConsoleLevel; 5] = [
        ConsoleLevel::Log,
        ConsoleLevel::Info,
        ConsoleLevel::Warn,
        ConsoleLevel::Error,
        ConsoleLevel::Debug,
    ];
}

/// Outgoing request seen by fetch or XHR.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkRequest {
    pub method: String,
    pub url: String,
}

impl NetworkRequest {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
        }
    }
}

/// What a fetch or XHR call produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NetworkOutcome {
    Response { status: u16, status_text: String },
    Failed { message: String },
}

/// Returns `true` to suppress the default error reporting.
pub type ErrorHandler = Arc<dyn Fn(&ErrorEvent) -> bool + Send + Sync>;
pub type RejectionHandler = Arc<dyn Fn(&RejectionEvent) + Send + Sync>;
pub type ConsoleFn = Arc<dyn Fn(&[String]) + Send + Sync>;
pub type NetworkFn = Arc<dyn Fn(&NetworkRequest) -> NetworkOutcome + Send + Sync>;

/// The console functions, one slot per level.
#[derive(Clone)]
pub struct ConsoleSlots {
    pub log: ConsoleFn,
    pub info: ConsoleFn,
    pub warn: ConsoleFn,
    pub error: ConsoleFn,
    pub debug: ConsoleFn,
}

impl ConsoleSlots {
    pub fn get(&self, level: ConsoleLevel) -> &ConsoleFn {
        match level {
            ConsoleLevel::Log => &self.log,
            ConsoleLevel::Info => &self.info,
            ConsoleLevel::Warn => &self.warn,
            ConsoleLevel::Error => &self.error,
            ConsoleLevel::Debug => &self.debug,
        }
    }

    pub fn set(&mut self, level: ConsoleLevel, f: ConsoleFn) {
        match level {
            ConsoleLevel::Log => self.log = f,
            ConsoleLevel::Info => self.info = f,
            ConsoleLevel::Warn => self.warn = f,
            ConsoleLevel::Error => self.error = f,
            ConsoleLevel::Debug => self.debug = f,
        }
    }
}

impl Default for ConsoleSlots {
    fn default() -> Self {
        let noop: ConsoleFn = Arc::new(|_: &[String]| {});
        Self {
            log: noop.clone(),
            info: noop.clone(),
            warn: noop.clone(),
            error: noop.clone(),
            debug: noop,
        }
    }
}

/// Hookable global state of one page.
#[derive(Clone)]
pub struct GlobalScope {
    pub on_error: Option<ErrorHandler>,
    pub on_unhandled_rejection: Option<RejectionHandler>,
    pub console: ConsoleSlots,
    pub fetch: NetworkFn,
    pub xhr_send: NetworkFn,
}

impl GlobalScope {
    /// Scope whose network entry points all resolve through `network`.
    pub fn with_network(network: NetworkFn) -> Self {
        Self {
            on_error: None,
            on_unhandled_rejection: None,
            console: ConsoleSlots::default(),
            fetch: network.clone(),
            xhr_send: network,
        }
    }

    /// Deliver an uncaught error the way the runtime would.
    pub fn report_error(&self, event: &ErrorEvent) -> bool {
        self.on_error.as_ref().is_some_and(|handler| handler(event))
    }

    pub fn report_rejection(&self, event: &RejectionEvent) {
        if let Some(handler) = &self.on_unhandled_rejection {
            handler(event);
        }
    }

    pub fn console_call(&self, level: ConsoleLevel, args: &[String]) {
        (self.console.get(level))(args)
    }

    pub fn fetch(&self, request: &NetworkRequest) -> NetworkOutcome {
        (self.fetch)(request)
    }

    pub fn xhr(&self, request: &NetworkRequest) -> NetworkOutcome {
        (self.xhr_send)(request)
    }
}

impl Default for GlobalScope {
    fn default() -> Self {
        Self::with_network(Arc::new(|_: &NetworkRequest| NetworkOutcome::Failed {
            message: "network unavailable".to_string(),
        }))
    }
}

impl fmt::Debug for GlobalScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlobalScope")
            .field("on_error", &self.on_error.is_some())
            .field("on_unhandled_rejection", &self.on_unhandled_rejection.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_report_error_without_handler() {
        let scope = GlobalScope::default();
        assert!(!scope.report_error(&ErrorEvent::default()));
    }

    #[test]
    fn test_console_call_reaches_slot() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        let mut scope = GlobalScope::default();
        scope.console.set(
            ConsoleLevel::Warn,
            Arc::new(move |_: &[String]| {
                seen.fetch_add(1, Ordering::SeqCst);
            }),
        );
        scope.console_call(ConsoleLevel::Warn, &["careful".to_string()]);
        scope.console_call(ConsoleLevel::Log, &["ignored".to_string()]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_default_network_fails() {
        let scope = GlobalScope::default();
        let outcome = scope.fetch(&NetworkRequest::new("GET", "/api"));
        assert!(matches!(outcome, NetworkOutcome::Failed { .. }));
    }

    #[test]
    fn test_network_outcome_serialization() {
        let outcome = NetworkOutcome::Response {
            status: 404,
            status_text: "Not Found".to_string(),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["kind"], "response");
        assert_eq!(json["status"], 404);
    }
}
