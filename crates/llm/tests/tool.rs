//! Tests for tool-call argument decoding and streaming reconstruction.

use orca_llm::{ToolCall, ToolCallBuilder, ToolCallDelta};
use serde_json::json;

#[test]
fn arguments_round_trip() {
    let original = json!({ "city": "Reykjavik", "days": 3 });
    let encoded = serde_json::to_string(&original).unwrap();
    let call = ToolCall::from_raw_arguments("call_1", "get_weather", &encoded);
    assert_eq!(call.arguments, original);
}

#[test]
fn corrupted_arguments_degrade_to_raw() {
    let call = ToolCall::from_raw_arguments("call_1", "get_weather", r#"{"city": "Reyk"#);
    assert_eq!(call.arguments, json!({ "raw": r#"{"city": "Reyk"# }));
}

#[test]
fn empty_arguments_decode_to_empty_object() {
    let call = ToolCall::from_raw_arguments("call_1", "noop", "");
    assert_eq!(call.arguments, json!({}));
}

#[test]
fn builder_merges_fragments_by_index() {
    let mut builder = ToolCallBuilder::new();
    builder.accept(&ToolCallDelta {
        index: 0,
        id: "call_a".into(),
        name: "lookup".into(),
        arguments: r#"{"qu"#.into(),
    });
    builder.accept(&ToolCallDelta {
        index: 1,
        id: "call_b".into(),
        name: "fetch".into(),
        arguments: r#"{"url":"https://x"}"#.into(),
    });
    builder.accept(&ToolCallDelta {
        index: 0,
        arguments: r#"ery":"rust"}"#.into(),
        ..Default::default()
    });

    let calls = builder.build();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].id, "call_a");
    assert_eq!(calls[0].arguments, json!({ "query": "rust" }));
    assert_eq!(calls[1].name, "fetch");
    assert_eq!(calls[1].arguments, json!({ "url": "https://x" }));
}

#[test]
fn builder_keeps_unparsable_accumulation_raw() {
    let mut builder = ToolCallBuilder::new();
    builder.accept(&ToolCallDelta {
        index: 0,
        id: "call_a".into(),
        name: "lookup".into(),
        arguments: "not json at all".into(),
    });
    let calls = builder.build();
    assert_eq!(calls[0].arguments, json!({ "raw": "not json at all" }));
}
