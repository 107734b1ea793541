//! Test response wrapper.

use crate::error::TestError;
use bytes::Bytes;
use http::{header, HeaderMap, HeaderValue, StatusCode};
use http_body_util::BodyExt;
use serde::de::DeserializeOwned;
use serde_json::Value;
use stages_server::{HttpResponse, REQUEST_ID_HEADER};

/// A collected response with helper methods for assertions.
#[derive(Debug, Clone)]
pub struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl TestResponse {
    /// Collects the body of an app response.
    pub async fn from_http(response: HttpResponse) -> Result<Self, TestError> {
        let (parts, body) = response.into_parts();
        let body = body
            .collect()
            .await
            .map_err(|e| TestError::BodyRead(e.to_string()))?
            .to_bytes();

        Ok(Self {
            status: parts.status,
            headers: parts.headers,
            body,
        })
    }

    /// Creates a test response from raw parts.
    pub fn new(status: StatusCode, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Returns the status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the status code as a u16.
    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// Returns true if the status is 2xx.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Returns a reference to the headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Gets a header value by name.
    pub fn header(&self, name: impl AsRef<str>) -> Option<&HeaderValue> {
        self.headers.get(name.as_ref())
    }

    /// Gets a header value as a string.
    pub fn header_str(&self, name: impl AsRef<str>) -> Option<&str> {
        self.header(name).and_then(|v| v.to_str().ok())
    }

    /// Returns the Content-Type header value.
    pub fn content_type(&self) -> Option<&str> {
        self.header_str(header::CONTENT_TYPE.as_str())
    }

    /// Returns the request id the app assigned.
    pub fn request_id(&self) -> Option<&str> {
        self.header_str(REQUEST_ID_HEADER)
    }

    /// Returns the raw body bytes.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns the body as a string.
    pub fn text(&self) -> Result<String, TestError> {
        String::from_utf8(self.body.to_vec())
            .map_err(|e| TestError::BodyRead(format!("Invalid UTF-8: {e}")))
    }

    /// Deserializes the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, TestError> {
        serde_json::from_slice(&self.body).map_err(TestError::Json)
    }

    /// Deserializes the body as a JSON value.
    pub fn json_value(&self) -> Result<Value, TestError> {
        self.json()
    }

    // Assertion methods

    /// Asserts that the status code equals `expected`.
    ///
    /// # Panics
    ///
    /// Panics if the status code doesn't match.
    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status,
            expected,
            "Expected status {}, got {} with body {}",
            expected,
            self.status,
            String::from_utf8_lossy(&self.body)
        );
        self
    }

    /// Asserts that a header exists with the expected value.
    ///
    /// # Panics
    ///
    /// Panics if the header is missing or differs.
    pub fn assert_header(&self, name: impl AsRef<str>, expected: impl AsRef<str>) -> &Self {
        let name = name.as_ref();
        let expected = expected.as_ref();
        match self.header_str(name) {
            Some(actual) => assert_eq!(
                actual, expected,
                "Header '{name}' expected '{expected}', got '{actual}'"
            ),
            None => panic!("Header '{name}' not found"),
        }
        self
    }

    /// Asserts an error envelope with the given status and message.
    ///
    /// # Panics
    ///
    /// Panics if the status, `error.code` or `error.message` differ.
    pub fn assert_error(&self, status: StatusCode, message: &str) -> &Self {
        self.assert_status(status);
        let body = self.envelope_body();
        assert_eq!(body["error"]["code"], status.as_u16(), "error.code mismatch");
        assert_eq!(body["error"]["message"], message, "error.message mismatch");
        self
    }

    /// Asserts a 422 envelope whose `errors` list contains every message in
    /// `expected`.
    ///
    /// # Panics
    ///
    /// Panics if the response is not a validation error or a message is
    /// missing.
    pub fn assert_validation_errors(&self, expected: &[&str]) -> &Self {
        self.assert_error(StatusCode::UNPROCESSABLE_ENTITY, "Validation failed");
        let errors = self.validation_errors();
        for message in expected {
            assert!(
                errors.iter().any(|e| e == message),
                "Missing validation error '{message}' in {errors:?}"
            );
        }
        self
    }

    /// The `error.errors` list of a validation envelope, empty otherwise.
    pub fn validation_errors(&self) -> Vec<String> {
        self.json_value()
            .ok()
            .and_then(|body| body["error"]["errors"].as_array().cloned())
            .unwrap_or_default()
            .into_iter()
            .filter_map(|e| e.as_str().map(str::to_string))
            .collect()
    }

    fn envelope_body(&self) -> Value {
        match self.json_value() {
            Ok(body) => body,
            Err(e) => panic!("Response body is not JSON: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(status: StatusCode, body: &Value) -> TestResponse {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json; charset=utf-8"),
        );
        TestResponse::new(status, headers, Bytes::from(body.to_string()))
    }

    #[test]
    fn test_accessors() {
        let resp = response(StatusCode::CREATED, &json!({"id": 1}));
        assert_eq!(resp.status_code(), 201);
        assert!(resp.is_success());
        assert_eq!(resp.content_type(), Some("application/json; charset=utf-8"));
        assert!(resp.request_id().is_none());
        assert_eq!(resp.json_value().unwrap()["id"], 1);
    }

    #[test]
    fn test_assert_error() {
        let resp = response(
            StatusCode::NOT_FOUND,
            &json!({"error": {"code": 404, "message": "Construction stage not found"}}),
        );
        resp.assert_error(StatusCode::NOT_FOUND, "Construction stage not found");
        assert!(resp.validation_errors().is_empty());
    }

    #[test]
    fn test_assert_validation_errors() {
        let resp = response(
            StatusCode::UNPROCESSABLE_ENTITY,
            &json!({"error": {
                "code": 422,
                "message": "Validation failed",
                "errors": ["Name is required", "Start date is required"]
            }}),
        );
        resp.assert_validation_errors(&["Start date is required"]);
        assert_eq!(resp.validation_errors().len(), 2);
    }

    #[test]
    #[should_panic(expected = "Missing validation error")]
    fn test_assert_validation_errors_missing() {
        let resp = response(
            StatusCode::UNPROCESSABLE_ENTITY,
            &json!({"error": {"code": 422, "message": "Validation failed", "errors": []}}),
        );
        resp.assert_validation_errors(&["Name is required"]);
    }

    #[test]
    #[should_panic(expected = "Header 'x-missing' not found")]
    fn test_assert_header_missing() {
        response(StatusCode::OK, &json!({})).assert_header("x-missing", "1");
    }
}
