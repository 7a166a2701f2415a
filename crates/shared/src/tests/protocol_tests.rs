use super::*;

#[test]
fn generated_quote_accepts_source_variant() {
    let raw = r#"{"quote":"Keep going","tag":"motivation","source":"engine-A"}"#;
    let parsed: GeneratedQuote = serde_json::from_str(raw).expect("parse");
    let quote = parsed.into_quote("motivation").expect("quote");

    assert_eq!(quote.text, "Keep going");
    assert_eq!(quote.tag, "motivation");
    assert_eq!(quote.author, "engine-A");
    assert_eq!(quote.source.as_deref(), Some("engine-A"));
    assert_eq!(quote.latency_ms, None);
}

#[test]
fn generated_quote_accepts_author_variant_with_latency() {
    let raw = r#"{"quote_text":"Ship it","tag":"tech","author":"model-x","latency_ms":842}"#;
    let parsed: GeneratedQuote = serde_json::from_str(raw).expect("parse");
    let quote = parsed.into_quote("tech").expect("quote");

    assert_eq!(quote.text, "Ship it");
    assert_eq!(quote.author, "model-x");
    assert_eq!(quote.source, None);
    assert_eq!(quote.source_label(), "model-x");
    assert_eq!(quote.latency_ms, Some(842));
}

#[test]
fn generated_quote_accepts_both_spellings_in_one_reply() {
    let raw = r#"{"quote":"Keep going","quote_text":"Keep going","tag":"motivation","source":"engine-A","author":"AI","latency_ms":12}"#;
    let parsed: GeneratedQuote = serde_json::from_str(raw).expect("parse");
    let quote = parsed.into_quote("motivation").expect("quote");

    assert_eq!(quote.text, "Keep going");
    assert_eq!(quote.author, "AI");
    assert_eq!(quote.source.as_deref(), Some("engine-A"));
    assert_eq!(quote.source_label(), "engine-A");
    assert_eq!(quote.latency_ms, Some(12));
}

#[test]
fn generated_quote_prefers_quote_text_and_skips_blank_spellings() {
    let raw = r#"{"quote":"old","quote_text":"new","source":"engine-A","author":"  "}"#;
    let quote = serde_json::from_str::<GeneratedQuote>(raw)
        .expect("parse")
        .into_quote("tech")
        .expect("quote");
    assert_eq!(quote.text, "new");
    assert_eq!(quote.author, "engine-A");

    let raw = r#"{"quote":"fallback","quote_text":""}"#;
    let quote = serde_json::from_str::<GeneratedQuote>(raw)
        .expect("parse")
        .into_quote("tech")
        .expect("quote");
    assert_eq!(quote.text, "fallback");
}

#[test]
fn generated_quote_reads_timestamp_when_created_at_is_absent() {
    let raw = r#"{"quote":"Hi","timestamp":"2026-02-03T04:05:06Z"}"#;
    let quote = serde_json::from_str::<GeneratedQuote>(raw)
        .expect("parse")
        .into_quote("tech")
        .expect("quote");
    assert_eq!(quote.created_at.to_rfc3339(), "2026-02-03T04:05:06+00:00");
}

#[test]
fn generated_quote_without_text_is_malformed() {
    let raw = r#"{"tag":"tech","source":"engine-A"}"#;
    let parsed: GeneratedQuote = serde_json::from_str(raw).expect("parse");
    let err = parsed.into_quote("tech").expect_err("missing text");

    assert_eq!(err.status, None);
    assert!(err.message.contains("malformed"));
}

#[test]
fn generated_quote_falls_back_to_requested_tag() {
    let parsed: GeneratedQuote = serde_json::from_str(r#"{"quote":"Hi"}"#).expect("parse");
    let quote = parsed.into_quote("greetings").expect("quote");
    assert_eq!(quote.tag, "greetings");
    assert_eq!(quote.author, "unknown");
}

#[test]
fn generate_request_omits_absent_requestor() {
    let body = serde_json::to_value(GenerateQuoteRequest {
        tag: "tech".into(),
        requestor: None,
    })
    .expect("serialize");
    assert_eq!(body, serde_json::json!({ "tag": "tech" }));
}

#[test]
fn transport_error_user_message_prefers_server_text() {
    assert_eq!(
        TransportError::http(500, "overloaded").user_message(),
        "overloaded"
    );
    assert_eq!(
        TransportError::http(502, "").user_message(),
        crate::error::GENERATE_FAILED_MESSAGE
    );
}
