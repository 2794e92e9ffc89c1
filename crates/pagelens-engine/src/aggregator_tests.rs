use super::*;
use pagelens_dom::PageDocument;
use std::sync::Arc;

use pagelens_protocols::runtime::{
    ConsoleLevel, ErrorEvent, NetworkFn, NetworkOutcome, NetworkRequest,
};
use pagelens_protocols::{
    GlobalScope, NetworkSource, PageMutator, PageState, PlatformType, ResourceTiming, SensitiveCategory,
};

fn aggregator() -> ContextAggregator {
    ContextAggregator::new(&Config::default())
}

fn options() -> ExtractionOptions {
    ExtractionOptions::default()
}

#[test]
fn test_hidden_duplicate_error_and_error_state() {
    let doc = PageDocument::from_html(
        r#"<body>
            <h1>Checkout</h1>
            <div role="alert">Connection failed, error code 500</div>
            <div role="alert" hidden>Connection failed, error code 500</div>
        </body>"#,
        "https://shop.example.com/checkout",
    );

    let response = aggregator().extract(&doc, None, &options());

    assert!(response.success);
    let context = response.context.unwrap();
    assert_eq!(context.text.errors.len(), 1);
    assert_eq!(context.text.errors[0].message, "Connection failed, error code 500");
    let ui = context.page.ui_state.unwrap();
    assert_eq!(ui.page_state, PageState::Error);
    assert_eq!(context.page.hostname, "shop.example.com");
    assert_eq!(context.text.headings[0].text, "Checkout");
    assert_eq!(context.structure.sections.len(), 1);
    assert!(!context.metadata.selected_text_only);
    assert_eq!(context.metadata.engine_version, ENGINE_VERSION);
}

#[test]
fn test_selected_text_only_payload() {
    let mut doc = PageDocument::from_html(
        r#"<body><h1>Title</h1><p id="p">Pick these words please</p>
            <div role="alert">Something failed</div></body>"#,
        "https://github.com/org/repo",
    );
    let p = doc.find("#p").unwrap();
    let text = doc.children(p)[0];
    doc.select_text(text, 5, 16).unwrap();

    let opts = ExtractionOptions {
        selected_text_only: true,
        ..options()
    };
    let context = aggregator().extract(&doc, None, &opts).context.unwrap();

    assert!(context.metadata.selected_text_only);
    assert_eq!(context.text.selected_text.as_deref(), Some("these words"));
    assert!(context.text.visible_text.is_empty());
    assert!(context.text.errors.is_empty());
    assert!(context.page.platform.is_none());
    assert!(context.page.ui_state.is_none());
    assert_eq!(context.structure, StructureContext::default());
}

#[test]
fn test_masking_applied_and_reported() {
    let doc = PageDocument::from_html(
        r#"<body><p>Contact ops@example.com from 10.0.0.12</p></body>"#,
        "https://example.com/",
    );

    let context = aggregator().extract(&doc, None, &options()).context.unwrap();

    assert!(!context.text.visible_text.contains("ops@example.com"));
    assert!(context.text.visible_text.contains("[EMAIL_REDACTED]"));
    assert!(context.text.visible_text.contains("[INTERNAL_IP]"));
    assert!(context.privacy.masking_applied);
    assert!(context.privacy.redacted_fields.contains(&"text.visibleText".to_string()));
    assert!(context
        .privacy
        .sensitive_data_types
        .contains(&SensitiveCategory::Email));
}

#[test]
fn test_masking_can_be_disabled() {
    let doc = PageDocument::from_html(
        r#"<body><p>Contact ops@example.com</p></body>"#,
        "https://example.com/",
    );
    let opts = ExtractionOptions {
        apply_privacy_masking: false,
        ..options()
    };
    let context = aggregator().extract(&doc, None, &opts).context.unwrap();
    assert!(context.text.visible_text.contains("ops@example.com"));
    assert!(!context.privacy.masking_applied);
    assert!(context.privacy.redacted_fields.is_empty());
}

#[test]
fn test_visible_text_truncation_recorded() {
    let words = "lorem ipsum ".repeat(2000);
    let doc = PageDocument::from_html(&format!("<body><p>{words}</p></body>"), "https://example.com/");

    let context = aggregator().extract(&doc, None, &options()).context.unwrap();

    assert_eq!(context.text.visible_text.chars().count(), 10_000);
    assert!(context.text.visible_text.ends_with("..."));
    assert!(context
        .metadata
        .truncated_fields
        .contains(&"text.visibleText".to_string()));
}

#[test]
fn test_disabled_sections_are_empty() {
    let doc = PageDocument::from_html(
        r#"<body>
            <table><tr><th>A</th></tr><tr><td>1</td></tr></table>
            <pre>echo hi</pre>
            <form><input name="q"></form>
        </body>"#,
        "https://example.com/",
    );
    let all = aggregator().extract(&doc, None, &options()).context.unwrap();
    assert_eq!(all.structure.tables.len(), 1);
    assert_eq!(all.structure.code_blocks.len(), 1);
    assert_eq!(all.structure.forms.len(), 1);

    let opts = ExtractionOptions {
        include_tables: false,
        include_code_blocks: false,
        include_form_context: false,
        include_platform_specific: false,
        include_ui_state: false,
        ..options()
    };
    let none = aggregator().extract(&doc, None, &opts).context.unwrap();
    assert!(none.structure.tables.is_empty());
    assert!(none.structure.code_blocks.is_empty());
    assert!(none.structure.forms.is_empty());
    assert!(none.page.platform.is_none());
    assert!(none.page.ui_state.is_none());
}

#[test]
fn test_platform_detected() {
    let doc = PageDocument::from_html("<body><p>Pull request</p></body>", "https://github.com/o/r/pull/1");
    let context = aggregator().extract(&doc, None, &options()).context.unwrap();
    assert_eq!(context.page.platform.unwrap().platform, PlatformType::Github);
}

#[test]
fn test_capture_buffers_included_and_masked() {
    let mut doc = PageDocument::from_html("<body><p>App</p></body>", "https://example.com/");
    let mut service = PassiveCaptureService::new(Config::default().capture);
    service.start(&mut doc.globals);

    doc.globals
        .console_call(ConsoleLevel::Error, &["login failed for ops@example.com".to_string()]);
    doc.globals.report_error(&ErrorEvent {
        message: "TypeError: x is undefined".to_string(),
        ..ErrorEvent::default()
    });

    let context = aggregator()
        .extract(&doc, Some(&service), &options())
        .context
        .unwrap();

    assert_eq!(context.text.console_logs.len(), 1);
    assert_eq!(
        context.text.console_logs[0].message,
        "login failed for [EMAIL_REDACTED]"
    );
    assert_eq!(context.text.runtime_errors.len(), 1);
    assert!(context
        .privacy
        .redacted_fields
        .contains(&"text.consoleLogs[0].message".to_string()));

    let opts = ExtractionOptions {
        include_console_logs: false,
        include_runtime_errors: false,
        ..options()
    };
    let context = aggregator().extract(&doc, Some(&service), &opts).context.unwrap();
    assert!(context.text.console_logs.is_empty());
    assert!(context.text.runtime_errors.is_empty());

    service.stop(&mut doc.globals);
}

#[test]
fn test_error_source_and_status_text_masked() {
    let network: NetworkFn = Arc::new(|_: &NetworkRequest| NetworkOutcome::Response {
        status: 403,
        status_text: "Forbidden for ops@example.com".to_string(),
    });
    let mut doc = PageDocument::from_html("<body><p>App</p></body>", "https://example.com/");
    doc.globals = GlobalScope::with_network(network);
    let mut service = PassiveCaptureService::new(Config::default().capture);
    service.start(&mut doc.globals);

    doc.globals.report_error(&ErrorEvent {
        message: "Script error".to_string(),
        source: Some("https://cdn.example.com/app.js?token=s3cr3t".to_string()),
        ..ErrorEvent::default()
    });
    doc.globals.fetch(&NetworkRequest::new("GET", "https://api.example.com/me"));

    let context = aggregator()
        .extract(&doc, Some(&service), &options())
        .context
        .unwrap();

    assert_eq!(
        context.text.runtime_errors[0].source.as_deref(),
        Some("https://cdn.example.com/app.js?token=[REDACTED]")
    );
    assert_eq!(
        context.text.network_errors[0].status_text.as_deref(),
        Some("Forbidden for [EMAIL_REDACTED]")
    );
    let redacted = &context.privacy.redacted_fields;
    assert!(redacted.contains(&"text.runtimeErrors[0].source".to_string()));
    assert!(redacted.contains(&"text.networkErrors[0].statusText".to_string()));

    service.stop(&mut doc.globals);
}

#[test]
fn test_resource_timing_fallback_without_capture() {
    let mut doc = PageDocument::from_html("<body><p>App</p></body>", "https://example.com/");
    doc.set_performance_now(5_000.0);
    doc.push_resource_timing(ResourceTiming {
        name: "https://api.example.com/items".to_string(),
        initiator_type: "fetch".to_string(),
        start_time_ms: 4_000.0,
        duration_ms: 120.0,
        transfer_size: 300,
        response_status: Some(503),
    });

    let context = aggregator().extract(&doc, None, &options()).context.unwrap();
    assert_eq!(context.text.network_errors.len(), 1);
    assert_eq!(context.text.network_errors[0].source, NetworkSource::ResourceTiming);
    assert_eq!(context.text.network_errors[0].status, Some(503));

    let opts = ExtractionOptions {
        include_performance_network_errors: false,
        ..options()
    };
    let context = aggregator().extract(&doc, None, &opts).context.unwrap();
    assert!(context.text.network_errors.is_empty());
}

#[test]
fn test_focused_element_reported_without_value() {
    let mut doc = PageDocument::from_html(
        r#"<body><input id="search" name="q" value="needle"></body>"#,
        "https://example.com/",
    );
    let input = doc.find("#search").unwrap();
    doc.focus(input).unwrap();

    let context = aggregator().extract(&doc, None, &options()).context.unwrap();
    let focused = context.structure.focused_element.unwrap();
    assert_eq!(focused.id.as_deref(), Some("search"));
    assert!(focused.is_editable);
    let json = serde_json::to_string(&focused).unwrap();
    assert!(!json.contains("needle"));
}

#[test]
fn test_keep_latest_drops_oldest() {
    let mut ledger = PayloadLedger::new(false);
    let kept = keep_latest(vec![1, 2, 3, 4, 5], 3, "text.consoleLogs", &mut ledger);
    assert_eq!(kept, vec![3, 4, 5]);
    assert_eq!(ledger.truncated_fields(), ["text.consoleLogs"]);
}
