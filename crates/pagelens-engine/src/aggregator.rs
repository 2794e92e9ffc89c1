//! One extraction pass: every extractor in order, assembled into a single
//! masked and bounded payload.

use std::collections::HashSet;
use std::time::Instant;

use chrono::Utc;
use pagelens_config::{CaptureConfig, Config, LimitsConfig};
use pagelens_protocols::{
    CaptureSnapshot, CapturedConsoleLog, CapturedNetworkError, CapturedRuntimeError,
    ContextPayload, ExtractionError, ExtractionOptions, ExtractionResponse, PageInfo,
    PageInspector, PayloadMetadata, StructureContext, TextContext,
};
use tracing::{debug, info, warn};
use url::Url;

use crate::capture::PassiveCaptureService;
use crate::ledger::PayloadLedger;
use crate::platform::PlatformDetector;
use crate::sections::SectionExtractor;
use crate::selection::SelectionTracker;
use crate::ui_state::UiStateAnalyzer;

/// Version stamped into every payload.
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Builds a [`ContextPayload`] from a page and, optionally, the passive
/// capture buffers.
#[derive(Debug, Clone)]
pub struct ContextAggregator {
    limits: LimitsConfig,
    capture: CaptureConfig,
    extractor: SectionExtractor,
    tracker: SelectionTracker,
}

impl ContextAggregator {
    pub fn new(config: &Config) -> Self {
        Self {
            limits: config.limits.clone(),
            capture: config.capture.clone(),
            extractor: SectionExtractor::new(config.limits.clone(), config.scoring.clone()),
            tracker: SelectionTracker::new(&config.replacement),
        }
    }

    pub fn extractor(&self) -> &SectionExtractor {
        &self.extractor
    }

    /// Run a pass and wrap the outcome with its duration. A failed pass
    /// returns no context at all.
    pub fn extract(
        &self,
        page: &dyn PageInspector,
        capture: Option<&PassiveCaptureService>,
        options: &ExtractionOptions,
    ) -> ExtractionResponse {
        let started = Instant::now();
        let result = self.build(page, capture, options);
        let extraction_time_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        match result {
            Ok(payload) => {
                info!(
                    url = %payload.page.url,
                    sections = payload.structure.sections.len(),
                    errors = payload.text.errors.len(),
                    elapsed_ms = extraction_time_ms,
                    "Context extracted"
                );
                ExtractionResponse {
                    success: true,
                    context: Some(payload),
                    error: None,
                    extraction_time_ms,
                }
            }
            Err(e) => {
                warn!(error = %e, elapsed_ms = extraction_time_ms, "Context extraction failed");
                ExtractionResponse {
                    success: false,
                    context: None,
                    error: Some(e.to_string()),
                    extraction_time_ms,
                }
            }
        }
    }

    /// Assemble the payload. Nothing is returned unless every step succeeds.
    pub fn build(
        &self,
        page: &dyn PageInspector,
        capture: Option<&PassiveCaptureService>,
        options: &ExtractionOptions,
    ) -> Result<ContextPayload, ExtractionError> {
        let body = page.body().ok_or(ExtractionError::MissingBody)?;
        let limits = &self.limits;
        let mut ledger = PayloadLedger::new(options.apply_privacy_masking);

        let location = page.location();
        let hostname = Url::parse(&location.href)
            .ok()
            .and_then(|url| url.host_str().map(str::to_string))
            .unwrap_or_default();
        let mut page_info = PageInfo {
            url: ledger.mask("page.url", &location.href),
            title: ledger.mask("page.title", &location.title),
            hostname,
            platform: None,
            ui_state: None,
        };

        let selected_text = self
            .tracker
            .selected_text(page)
            .map(|text| ledger.mask_capped("text.selectedText", &text, limits.max_selected_text));

        if options.selected_text_only {
            debug!("Selected-text-only extraction");
            return Ok(ContextPayload {
                metadata: metadata(true, &ledger),
                page: page_info,
                text: TextContext {
                    selected_text,
                    ..TextContext::default()
                },
                structure: StructureContext::default(),
                privacy: ledger.privacy(),
            });
        }

        if options.include_platform_specific {
            page_info.platform = Some(PlatformDetector::detect(page));
        }
        if options.include_ui_state {
            page_info.ui_state = Some(UiStateAnalyzer::analyze(page)?);
        }

        let visible_text =
            ledger.mask_capped("text.visibleText", &page.inner_text(body), limits.max_visible_text);

        let extractor = &self.extractor;
        let headings = extractor.extract_headings(page, &mut ledger)?;
        let errors = extractor.extract_errors(page, &mut ledger)?;
        let sections = extractor.extract_sections(page, &mut ledger)?;
        let code_blocks = if options.include_code_blocks {
            extractor.extract_code_blocks(page, &mut ledger)?
        } else {
            Vec::new()
        };
        let tables = if options.include_tables {
            extractor.extract_tables(page, &mut ledger)?
        } else {
            Vec::new()
        };
        let forms = if options.include_form_context {
            extractor.extract_form_context(page, &mut ledger)?
        } else {
            Vec::new()
        };
        let modal = extractor.extract_modal(page, &mut ledger)?;
        let focused_element = extractor.extract_focused_element(page, &mut ledger)?;

        let snapshot = capture.map(PassiveCaptureService::snapshot).unwrap_or_default();
        let CaptureSnapshot {
            runtime_errors,
            console_logs,
            network_errors,
        } = snapshot;

        let console_logs = if options.include_console_logs {
            self.console_logs(console_logs, &mut ledger)
        } else {
            Vec::new()
        };
        let runtime_errors = if options.include_runtime_errors {
            self.runtime_errors(runtime_errors, &mut ledger)
        } else {
            Vec::new()
        };
        let network_errors = {
            let mut merged = if options.include_network_errors {
                network_errors
            } else {
                Vec::new()
            };
            if options.include_performance_network_errors {
                let scanned = match capture {
                    Some(service) => service.scan_resource_timings(page),
                    None => PassiveCaptureService::new(self.capture.clone()).scan_resource_timings(page),
                };
                let known: HashSet<String> = merged.iter().map(|e| e.url.clone()).collect();
                merged.extend(scanned.into_iter().filter(|e| !known.contains(&e.url)));
            }
            self.network_errors(merged, &mut ledger)
        };

        Ok(ContextPayload {
            metadata: metadata(false, &ledger),
            page: page_info,
            text: TextContext {
                selected_text,
                visible_text,
                headings,
                errors,
                console_logs,
                network_errors,
                runtime_errors,
            },
            structure: StructureContext {
                sections,
                code_blocks,
                tables,
                forms,
                modal,
                focused_element,
            },
            privacy: ledger.privacy(),
        })
    }

    /// Most recent entries only, masked.
    fn console_logs(
        &self,
        logs: Vec<CapturedConsoleLog>,
        ledger: &mut PayloadLedger,
    ) -> Vec<CapturedConsoleLog> {
        let logs = keep_latest(logs, self.limits.max_console_logs, "text.consoleLogs", ledger);
        logs.into_iter()
            .enumerate()
            .map(|(i, mut log)| {
                log.message = ledger.mask(&format!("text.consoleLogs[{i}].message"), &log.message);
                log
            })
            .collect()
    }

    fn runtime_errors(
        &self,
        errors: Vec<CapturedRuntimeError>,
        ledger: &mut PayloadLedger,
    ) -> Vec<CapturedRuntimeError> {
        let errors = keep_latest(errors, self.limits.max_runtime_errors, "text.runtimeErrors", ledger);
        errors
            .into_iter()
            .enumerate()
            .map(|(i, mut error)| {
                let field = format!("text.runtimeErrors[{i}]");
                error.message = ledger.mask(&format!("{field}.message"), &error.message);
                error.source = error
                    .source
                    .map(|source| ledger.mask(&format!("{field}.source"), &source));
                error.stack = error
                    .stack
                    .map(|stack| ledger.mask(&format!("{field}.stack"), &stack));
                error
            })
            .collect()
    }

    fn network_errors(
        &self,
        errors: Vec<CapturedNetworkError>,
        ledger: &mut PayloadLedger,
    ) -> Vec<CapturedNetworkError> {
        let errors = keep_latest(errors, self.limits.max_network_errors, "text.networkErrors", ledger);
        errors
            .into_iter()
            .enumerate()
            .map(|(i, mut error)| {
                let field = format!("text.networkErrors[{i}]");
                error.url = ledger.mask(&format!("{field}.url"), &error.url);
                error.status_text = error
                    .status_text
                    .map(|text| ledger.mask(&format!("{field}.statusText"), &text));
                error.message = error
                    .message
                    .map(|message| ledger.mask(&format!("{field}.message"), &message));
                error
            })
            .collect()
    }
}

fn metadata(selected_text_only: bool, ledger: &PayloadLedger) -> PayloadMetadata {
    PayloadMetadata {
        extracted_at: Utc::now(),
        engine_version: ENGINE_VERSION.to_string(),
        selected_text_only,
        truncated_fields: ledger.truncated_fields().to_vec(),
    }
}

/// The last `max` items, noting `field` when older ones were dropped.
fn keep_latest<T>(mut items: Vec<T>, max: usize, field: &str, ledger: &mut PayloadLedger) -> Vec<T> {
    if items.len() > max {
        ledger.note_truncated(field);
        items.drain(..items.len() - max);
    }
    items
}

#[cfg(test)]
#[path = "aggregator_tests.rs"]
mod tests;
