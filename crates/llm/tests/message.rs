//! Tests for message construction and validation.

use orca_llm::{Content, ContentPart, Error, Message, Role, estimate_tokens, validate_messages};

#[test]
fn empty_list_is_invalid() {
    let result = validate_messages(&[]);
    assert!(matches!(result, Err(Error::Validation(_))));
}

#[test]
fn empty_content_is_invalid() {
    let messages = vec![Message::user("")];
    let result = validate_messages(&messages);
    assert!(matches!(result, Err(Error::Validation(_))));
    assert!(result.unwrap_err().to_string().contains("user"));
}

#[test]
fn empty_parts_list_is_invalid() {
    let messages = vec![Message::user_parts(Vec::new())];
    assert!(validate_messages(&messages).is_err());
}

#[test]
fn plain_and_multimodal_messages_are_valid() {
    let messages = vec![
        Message::system("be brief"),
        Message::user_parts(vec![
            ContentPart::text("what is this?"),
            ContentPart::image_bytes(b"\x89PNG", "image/png"),
        ]),
        Message::assistant("a PNG header"),
    ];
    assert!(validate_messages(&messages).is_ok());
}

#[test]
fn roles_serialize_lowercase() {
    let json = serde_json::to_string(&Message::system("x")).unwrap();
    assert!(json.contains(r#""role":"system""#));
    assert_eq!(Role::Assistant.as_str(), "assistant");
}

#[test]
fn plain_content_serializes_as_string() {
    let json = serde_json::to_value(Message::user("hi")).unwrap();
    assert_eq!(json["content"], "hi");
}

#[test]
fn image_bytes_are_base64_encoded() {
    let part = ContentPart::image_bytes(b"abc", "image/png");
    let ContentPart::Image { data, media_type } = part else {
        panic!("expected inline image");
    };
    assert_eq!(data, "YWJj");
    assert_eq!(media_type, "image/png");
}

#[test]
fn content_text_joins_textual_parts() {
    let content = Content::Parts(vec![
        ContentPart::text("one"),
        ContentPart::image_url("https://example.com/a.png"),
        ContentPart::text("two"),
    ]);
    assert_eq!(content.text(), "one\ntwo");
}

#[test]
fn token_estimate_scales_with_length() {
    let short = vec![Message::user("hi")];
    let long = vec![Message::user("a".repeat(400))];
    assert_eq!(estimate_tokens(&short), 1);
    assert_eq!(estimate_tokens(&long), 100);
}
