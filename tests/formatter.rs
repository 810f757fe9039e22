use hyperlocal::formatter::{format_agent_response, UNRECOGNIZED_FORMAT};
use serde_json::json;

#[test]
fn test_string_data_returned_directly() {
    let response = json!({ "data": "Road closed on Main Street." });
    assert_eq!(
        format_agent_response(&response),
        "Road closed on Main Street."
    );
}

#[test]
fn test_nested_result_extracted() {
    let response = json!({ "data": { "result": "No disruptions reported today." } });
    assert_eq!(
        format_agent_response(&response),
        "No disruptions reported today."
    );
}

#[test]
fn test_unexpected_data_stringified() {
    let response = json!({ "data": { "items": [1, 2, 3] } });
    assert_eq!(format_agent_response(&response), r#"{"items":[1,2,3]}"#);
}

#[test]
fn test_bare_string_passes_through() {
    let response = json!("plain answer");
    assert_eq!(format_agent_response(&response), "plain answer");
}

#[test]
fn test_unknown_shapes_fall_back() {
    assert_eq!(format_agent_response(&json!(null)), UNRECOGNIZED_FORMAT);
    assert_eq!(format_agent_response(&json!(42)), UNRECOGNIZED_FORMAT);
    assert_eq!(
        format_agent_response(&json!({ "other": true })),
        UNRECOGNIZED_FORMAT
    );
}

#[test]
fn test_non_string_result_field_stringifies_data() {
    // `result` present but not a string: falls through to the stringify arm.
    let response = json!({ "data": { "result": 7 } });
    assert_eq!(format_agent_response(&response), r#"{"result":7}"#);
}
