use axum::{body::Body, response::Response};

#[track_caller]
pub(crate) fn assert_content_type(response: &Response<Body>, content_type: &str) {
    let content_type_header = response
        .headers()
        .get("content-type")
        .expect("content-type header missing");
    assert_eq!(content_type_header, content_type);
}

/// Read the body of `response` as JSON, checking it is a JSON response.
pub(crate) async fn parse_json_body(response: Response<Body>) -> serde_json::Value {
    assert_content_type(&response, "application/json");

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Could not read response body");

    serde_json::from_slice(&body).expect("Response body is not valid JSON")
}

#[track_caller]
pub(crate) fn assert_error_envelope(body: &serde_json::Value) {
    assert_eq!(body["success"], false, "got body {body}");
    assert!(body["error"].is_string(), "got body {body}");
    assert!(body.get("data").is_none(), "got body {body}");
}
