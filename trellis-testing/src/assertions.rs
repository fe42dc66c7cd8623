// Test assertions for HTTP responses

use crate::TestResponse;
use serde_json::Value;
use trellis_core::HttpStatus;

/// Assert that a response has a specific status code
#[track_caller]
pub fn assert_status(response: &TestResponse, expected: u16) {
    let actual = response.status();
    assert_eq!(
        actual,
        expected,
        "Expected status {}, got {}. Body: {}",
        expected,
        actual,
        response.body_string()
    );
}

/// Assert that a response has a specific HTTP status
#[track_caller]
pub fn assert_http_status(response: &TestResponse, expected: HttpStatus) {
    assert_status(response, expected.code());
}

/// Assert that the JSON body equals `expected`
#[track_caller]
pub fn assert_json(response: &TestResponse, expected: &Value) {
    let actual: Value = response.json();
    assert_eq!(&actual, expected, "JSON bodies do not match");
}

/// Assert that a response has a specific header
#[track_caller]
pub fn assert_header(response: &TestResponse, key: &str, expected: &str) {
    let actual = response.header(key).map(|s| s.as_str());
    assert_eq!(
        actual,
        Some(expected),
        "Expected header '{}' to be '{}', got {:?}",
        key,
        expected,
        actual
    );
}

/// Assert that a response body contains a string
#[track_caller]
pub fn assert_body_contains(response: &TestResponse, expected: &str) {
    let body = response.body_string();
    assert!(
        body.contains(expected),
        "Expected body to contain '{}', but it didn't. Body: {}",
        expected,
        body
    );
}

/// Assert that a response is successful (2xx status)
#[track_caller]
pub fn assert_success(response: &TestResponse) {
    let status = response.status();
    assert!(
        (200..300).contains(&status),
        "Expected successful status (2xx), got {}. Body: {}",
        status,
        response.body_string()
    );
}

/// Assert that a response is a client error (4xx status)
#[track_caller]
pub fn assert_client_error(response: &TestResponse) {
    let status = response.status();
    assert!(
        (400..500).contains(&status),
        "Expected client error status (4xx), got {}",
        status
    );
}

/// Assert that a response is a server error (5xx status)
#[track_caller]
pub fn assert_server_error(response: &TestResponse) {
    let status = response.status();
    assert!(
        (500..600).contains(&status),
        "Expected server error status (5xx), got {}",
        status
    );
}

/// Assert that a response has JSON content type
#[track_caller]
pub fn assert_json_content_type(response: &TestResponse) {
    let content_type = response.header("Content-Type");
    assert!(
        content_type.is_some_and(|ct| ct.contains("application/json")),
        "Expected JSON content type, got {:?}",
        content_type
    );
}

/// Assert that an error response carries `message`
#[track_caller]
pub fn assert_error_message(response: &TestResponse, expected: &str) {
    let body: Value = response.json();
    assert_eq!(
        body["message"].as_str(),
        Some(expected),
        "Expected error message '{}', got body {}",
        expected,
        body
    );
}
