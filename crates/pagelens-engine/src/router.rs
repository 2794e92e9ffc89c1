//! Request dispatch and the streamed quick-action state machine.

use pagelens_config::{Config, QuickActionBehavior};
use pagelens_protocols::{
    Clipboard, ErrorsResponse, FailureResponse, PageMutator, PlatformResponse,
    QuickActionEvent, QuickActionStatus, Request, Response, SelectionContext, SelectionResponse,
    SelectionTrigger,
};
use tracing::{debug, info, warn};

use crate::aggregator::ContextAggregator;
use crate::capture::PassiveCaptureService;
use crate::ledger::PayloadLedger;
use crate::platform::PlatformDetector;
use crate::replacer::TextReplacer;
use crate::selection::SelectionTracker;
use crate::util::char_len;

/// Quick action progress between `START` and its terminal event.
#[derive(Debug, Clone, Default)]
enum QuickAction {
    #[default]
    Idle,
    Running {
        action_id: Option<String>,
        /// Selection captured at `START`; the replacement target.
        selection: Option<SelectionContext>,
        content: String,
    },
}

/// Per-page engine entry point: answers requests and remembers the last
/// captured selection and the quick action in flight.
#[derive(Debug, Clone)]
pub struct MessageRouter {
    aggregator: ContextAggregator,
    replacer: TextReplacer,
    behavior: QuickActionBehavior,
    last_selection: Option<SelectionContext>,
    quick_action: QuickAction,
}

impl MessageRouter {
    pub fn new(config: &Config) -> Self {
        Self {
            aggregator: ContextAggregator::new(config),
            replacer: TextReplacer::new(SelectionTracker::new(&config.replacement)),
            behavior: config.replacement.quick_action_behavior,
            last_selection: None,
            quick_action: QuickAction::Idle,
        }
    }

    pub fn last_selection(&self) -> Option<&SelectionContext> {
        self.last_selection.as_ref()
    }

    pub fn handle<P, C>(
        &mut self,
        page: &mut P,
        clipboard: &mut C,
        capture: Option<&PassiveCaptureService>,
        request: Request,
    ) -> Response
    where
        P: PageMutator,
        C: Clipboard + ?Sized,
    {
        match request {
            Request::ExtractContext { options } => {
                Response::Extraction(self.aggregator.extract(&*page, capture, &options))
            }
            Request::GetPlatform => Response::Platform(PlatformResponse {
                platform: PlatformDetector::detect(&*page),
            }),
            Request::GetErrors => {
                let mut ledger = PayloadLedger::new(true);
                match self.aggregator.extractor().extract_errors(&*page, &mut ledger) {
                    Ok(errors) => Response::Errors(ErrorsResponse { errors }),
                    Err(e) => Response::Failure(FailureResponse::new(e.to_string())),
                }
            }
            Request::GetSelection => match self.capture_selection(page) {
                Ok(()) => Response::Selection(self.selection_response()),
                Err(e) => Response::Failure(FailureResponse::new(e)),
            },
            Request::SelectionEvent { trigger } => self.on_selection_event(page, trigger),
            Request::ReplaceSelection { new_text } => {
                let result = match self.last_selection.clone() {
                    Some(context) => self.replacer.replace(page, clipboard, &context, &new_text),
                    None => self.replacer.copy_instead(
                        page,
                        clipboard,
                        "No selection has been captured",
                        &new_text,
                    ),
                };
                Response::Replacement(result)
            }
            Request::QuickAction { event } => {
                Response::QuickAction(self.on_quick_action(page, clipboard, event))
            }
        }
    }

    /// Remove every target stamp this engine placed on the page.
    pub fn cleanup<P: PageMutator>(&mut self, page: &mut P) -> usize {
        self.last_selection = None;
        match self.replacer.tracker().cleanup(page) {
            Ok(removed) => removed,
            Err(e) => {
                warn!(error = %e, "Target cleanup failed");
                0
            }
        }
    }

    fn capture_selection<P: PageMutator>(&mut self, page: &mut P) -> Result<(), String> {
        self.last_selection = self
            .replacer
            .tracker()
            .detect(page)
            .map_err(|e| e.to_string())?;
        debug!(captured = self.last_selection.is_some(), "Selection captured");
        Ok(())
    }

    fn selection_response(&self) -> SelectionResponse {
        SelectionResponse {
            selected_text: self.last_selection.as_ref().map(|c| c.selected_text.clone()),
            selection_context: self.last_selection.clone(),
        }
    }

    fn on_selection_event<P: PageMutator>(
        &mut self,
        page: &mut P,
        trigger: SelectionTrigger,
    ) -> Response {
        if !trigger.should_capture() {
            debug!(?trigger, "Selection event ignored");
            return Response::Selection(self.selection_response());
        }
        match self.capture_selection(page) {
            Ok(()) => Response::Selection(self.selection_response()),
            Err(e) => Response::Failure(FailureResponse::new(e)),
        }
    }

    fn on_quick_action<P, C>(
        &mut self,
        page: &mut P,
        clipboard: &mut C,
        event: QuickActionEvent,
    ) -> QuickActionStatus
    where
        P: PageMutator,
        C: Clipboard + ?Sized,
    {
        match event {
            QuickActionEvent::Start { action_id } => {
                if let QuickAction::Running { action_id: previous, .. } = &self.quick_action {
                    warn!(?previous, "Quick action restarted before it finished");
                }
                // A toolbar click may already have cleared the live selection;
                // only a fresh capture replaces the one taken earlier.
                match self.replacer.tracker().detect(page) {
                    Ok(Some(context)) => self.last_selection = Some(context),
                    Ok(None) => debug!("No live selection at start, keeping the last capture"),
                    Err(e) => warn!(error = %e, "Selection capture failed at quick action start"),
                }
                let has_selection = self.last_selection.is_some();
                info!(?action_id, has_selection, "Quick action started");
                self.quick_action = QuickAction::Running {
                    action_id,
                    selection: self.last_selection.clone(),
                    content: String::new(),
                };
                QuickActionStatus::Pending { has_selection }
            }
            QuickActionEvent::Delta { full_content } => match &mut self.quick_action {
                QuickAction::Running { content, .. } => {
                    *content = full_content;
                    QuickActionStatus::Streaming {
                        content_length: char_len(content),
                    }
                }
                QuickAction::Idle => ignored("DELTA"),
            },
            QuickActionEvent::Complete { final_content } => {
                let QuickAction::Running {
                    action_id,
                    selection,
                    ..
                } = std::mem::take(&mut self.quick_action)
                else {
                    return ignored("COMPLETE");
                };
                info!(?action_id, behavior = ?self.behavior, "Quick action complete");
                match self.behavior {
                    QuickActionBehavior::Preview => QuickActionStatus::Previewed {
                        content: final_content,
                    },
                    QuickActionBehavior::AutoReplace => {
                        let result = match selection {
                            Some(context) => {
                                self.replacer.replace(page, clipboard, &context, &final_content)
                            }
                            None => self.replacer.copy_instead(
                                page,
                                clipboard,
                                "No selection was captured when the action started",
                                &final_content,
                            ),
                        };
                        QuickActionStatus::Replaced { result }
                    }
                }
            }
            QuickActionEvent::Error { error } => {
                let QuickAction::Running { action_id, .. } = std::mem::take(&mut self.quick_action)
                else {
                    return ignored("ERROR");
                };
                warn!(?action_id, error = %error, "Quick action failed");
                QuickActionStatus::Failed { error }
            }
        }
    }
}

fn ignored(event: &str) -> QuickActionStatus {
    debug!(event, "Quick action event out of order");
    QuickActionStatus::Ignored {
        reason: format!("{event} received with no quick action in progress"),
    }
}

#[cfg(test)]
#[path = "router_tests.rs"]
mod tests;
