//! A full page session: passive capture running, a context extraction, and
//! a streamed quick action rewriting a comment box.

use std::sync::Arc;

use pagelens_config::{Config, QuickActionBehavior};
use pagelens_dom::{MemoryClipboard, PageDocument};
use pagelens_engine::{MessageRouter, PassiveCaptureService};
use pagelens_protocols::runtime::{NetworkFn, NetworkOutcome, NetworkRequest};
use pagelens_protocols::{
    ExtractionOptions, GlobalScope, PageInspector, PageMutator, PlatformType, QuickActionEvent,
    QuickActionStatus, Request, Response, TextReplacementResult,
};

const ISSUE_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Login loop · Issue #42 · acme/web</title></head>
<body>
  <header><h1>Login loop after password reset</h1></header>
  <main>
    <div role="alert" class="flash flash-error">Could not load timeline: 502 Bad Gateway</div>
    <div class="comment-body">
      <p>Reported by ops@acme.example from 10.1.2.3</p>
      <pre><code class="language-js">await login(user)</code></pre>
    </div>
    <form id="new_comment" action="/comments" method="post">
      <label for="comment">Comment</label>
      <textarea id="comment" name="comment">Thanks, will look soon</textarea>
      <input type="password" name="token" value="hunter2">
      <button type="submit">Comment</button>
    </form>
  </main>
</body>
</html>"#;

fn failing_api() -> NetworkFn {
    Arc::new(|request: &NetworkRequest| NetworkOutcome::Response {
        status: if request.url.ends_with("/timeline") { 502 } else { 200 },
        status_text: "Bad Gateway".to_string(),
    })
}

fn quick_action(event: QuickActionEvent) -> Request {
    Request::QuickAction { event }
}

#[test]
fn test_extraction_with_capture_running() {
    let mut doc = PageDocument::from_html(ISSUE_PAGE, "https://github.com/acme/web/issues/42");
    doc.globals = GlobalScope::with_network(failing_api());
    let mut capture = PassiveCaptureService::new(Config::default().capture);
    capture.start(&mut doc.globals);

    doc.globals
        .fetch(&NetworkRequest::new("GET", "https://github.com/acme/web/issues/42/timeline"));

    let mut router = MessageRouter::new(&Config::default());
    let mut clipboard = MemoryClipboard::new();
    let request = Request::ExtractContext {
        options: ExtractionOptions::default(),
    };
    let response = router.handle(&mut doc, &mut clipboard, Some(&capture), request);

    let Response::Extraction(extraction) = &response else {
        panic!("expected an extraction response");
    };
    let context = extraction.context.as_ref().unwrap();
    assert_eq!(context.page.platform.as_ref().unwrap().platform, PlatformType::Github);
    assert_eq!(context.text.errors.len(), 1);
    assert_eq!(context.text.network_errors.len(), 1);
    assert_eq!(context.text.network_errors[0].status, Some(502));
    assert_eq!(context.structure.code_blocks[0].language.as_deref(), Some("js"));
    assert!(!context.text.visible_text.contains("ops@acme.example"));

    let json = serde_json::to_string(&response).unwrap();
    assert!(json.contains("\"extractionTimeMs\""));
    assert!(json.contains("\"visibleText\""));
    assert!(!json.contains("hunter2"));
    assert!(!json.contains("10.1.2.3"));

    capture.stop(&mut doc.globals);
}

#[test]
fn test_quick_action_rewrites_comment() {
    let mut doc = PageDocument::from_html(ISSUE_PAGE, "https://github.com/acme/web/issues/42");
    let comment = doc.query_first("#comment").unwrap().unwrap();
    doc.focus(comment).unwrap();
    doc.set_selection_range(comment, 0, 6).unwrap();

    let mut config = Config::default();
    config.replacement.quick_action_behavior = QuickActionBehavior::AutoReplace;
    let mut router = MessageRouter::new(&config);
    let mut clipboard = MemoryClipboard::new();

    let events = [
        QuickActionEvent::Start { action_id: None },
        QuickActionEvent::Delta {
            full_content: "Thank".to_string(),
        },
        QuickActionEvent::Delta {
            full_content: "Thank you".to_string(),
        },
    ];
    for event in events {
        router.handle(&mut doc, &mut clipboard, None, quick_action(event));
    }
    let status = router.handle(
        &mut doc,
        &mut clipboard,
        None,
        quick_action(QuickActionEvent::Complete {
            final_content: "Thank you".to_string(),
        }),
    );

    assert_eq!(
        status,
        Response::QuickAction(QuickActionStatus::Replaced {
            result: TextReplacementResult::replaced()
        })
    );
    assert_eq!(doc.value(comment).as_deref(), Some("Thank you, will look soon"));
    assert!(clipboard.writes().is_empty());

    assert_eq!(router.cleanup(&mut doc), 1);
    assert!(doc.query_all("[data-pagelens-target]").unwrap().is_empty());
}
