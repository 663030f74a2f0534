//! Response decoding.
//!
//! Azkaban answers HTTP 200 for success and failure alike, with no single
//! envelope across endpoints. A body is interpreted in this order:
//!
//! 1. Not JSON: an empty body is [`Error::EmptyResponse`]; anything else is
//!    captured verbatim as [`Decoded::RawString`].
//! 2. JSON carrying a status envelope that signals failure (a non-empty
//!    `error`, or `status == "error"` with a `message`) is
//!    [`Decoded::ServiceError`], whatever else the body holds.
//! 3. Otherwise the typed decode result stands: [`Decoded::Typed`], or the
//!    shape mismatch as [`Error::Json`].
//!
//! The ordering mirrors the server's observed behaviour. A change in how the
//! server signals errors will silently change which branch a body takes.

use serde::de::{DeserializeOwned, IgnoredAny};
use serde_json::error::Category;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::types::StatusDetail;

/// A shape a response body can be decoded into.
pub trait Destination: DeserializeOwned {
    /// Accept a non-JSON body verbatim.
    ///
    /// Only text destinations accept one; everything else hands the body back.
    fn from_raw(text: String) -> std::result::Result<Self, String> {
        Err(text)
    }
}

impl Destination for String {
    fn from_raw(text: String) -> std::result::Result<Self, String> {
        Ok(text)
    }
}

impl Destination for serde_json::Map<String, Value> {}

impl Destination for Value {}

/// Interpretation of a response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded<T> {
    /// Body matched the expected shape and signalled no error.
    Typed(T),
    /// Body carried a service-level error message.
    ServiceError(String),
    /// Body was not JSON.
    RawString(String),
}

impl<T> Decoded<T> {
    /// Short label for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Decoded::Typed(_) => "typed",
            Decoded::ServiceError(_) => "service_error",
            Decoded::RawString(_) => "raw_string",
        }
    }
}

impl<T: Destination> Decoded<T> {
    /// Collapse into the caller's result.
    pub fn into_result(self) -> Result<T> {
        match self {
            Decoded::Typed(value) => Ok(value),
            Decoded::ServiceError(message) => Err(Error::Service(message)),
            Decoded::RawString(text) => T::from_raw(text).map_err(Error::UnexpectedBody),
        }
    }
}

/// Classify a response body.
pub fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<Decoded<T>> {
    // Validate the whole body first: a typed decode stops at the first
    // mismatched token and would report text such as `404 Not Found` as a
    // shape error rather than as non-JSON.
    if let Err(err) = serde_json::from_slice::<IgnoredAny>(body)
        && is_syntax(&err)
    {
        if body.is_empty() {
            return Err(Error::EmptyResponse);
        }
        return Ok(Decoded::RawString(String::from_utf8_lossy(body).into_owned()));
    }

    if let Some(message) = envelope_error(body) {
        return Ok(Decoded::ServiceError(message));
    }

    Ok(Decoded::Typed(serde_json::from_slice(body)?))
}

/// Decode straight into the destination.
pub fn decode_into<T: Destination>(body: &[u8]) -> Result<T> {
    decode::<T>(body)?.into_result()
}

/// The failure a JSON object body signals through the status envelope.
///
/// Arrays and scalars never signal one.
fn envelope_error(body: &[u8]) -> Option<String> {
    let Value::Object(fields) = serde_json::from_slice(body).ok()? else {
        return None;
    };
    serde_json::from_value::<StatusDetail>(Value::Object(fields))
        .ok()?
        .service_error()
}

fn is_syntax(err: &serde_json::Error) -> bool {
    matches!(err.classify(), Category::Syntax | Category::Eof)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ExecuteResponse, Flows, Project};

    #[test]
    fn test_typed_body() {
        let body = br#"{"project": "etl", "projectId": 3, "flows": [{"flowId": "nightly"}]}"#;
        let flows: Flows = decode_into(body).unwrap();
        assert_eq!(flows.project, Project { id: 3, name: "etl".into() });
        assert_eq!(flows.flows[0].id, "nightly");
    }

    #[test]
    fn test_all_empty_structure_is_success() {
        let flows: Flows = decode_into(b"{}").unwrap();
        assert_eq!(flows, Flows::default());
    }

    #[test]
    fn test_success_status_is_not_an_error() {
        let body = br#"{"status": "success", "message": "all good", "execid": 9}"#;
        let response: ExecuteResponse = decode_into(body).unwrap();
        assert_eq!(response.exec_id, 9);
        assert_eq!(response.message, "all good");
    }

    #[test]
    fn test_error_field_wins() {
        let body = br#"{"error": "Incorrect Login.", "project": "etl", "flows": []}"#;
        let decoded = decode::<Flows>(body).unwrap();
        assert_eq!(decoded, Decoded::ServiceError("Incorrect Login.".into()));

        let err = decode_into::<Flows>(body).unwrap_err();
        assert!(err.is_service_error());
        assert_eq!(err.to_string(), "Incorrect Login.");
    }

    #[test]
    fn test_error_field_wins_over_shape_mismatch() {
        let body = br#"{"error": "Flow nightly not found.", "execid": "not-a-number"}"#;
        let err = decode_into::<ExecuteResponse>(body).unwrap_err();
        assert!(matches!(err, Error::Service(msg) if msg == "Flow nightly not found."));
    }

    #[test]
    fn test_error_status_uses_message() {
        let body = br#"{"status": "error", "message": "Permission denied"}"#;
        let err = decode_into::<Project>(body).unwrap_err();
        assert!(matches!(err, Error::Service(msg) if msg == "Permission denied"));
    }

    #[test]
    fn test_empty_error_field_is_ignored() {
        let body = br#"{"error": "", "project": "etl", "projectId": 1}"#;
        let project: Project = decode_into(body).unwrap();
        assert_eq!(project.name, "etl");
    }

    #[test]
    fn test_empty_body() {
        let err = decode::<Flows>(b"").unwrap_err();
        assert!(err.is_empty_response());

        let err = decode::<String>(b"").unwrap_err();
        assert!(err.is_empty_response());
    }

    #[test]
    fn test_whitespace_body_is_not_empty() {
        let text: String = decode_into(b"  \n").unwrap();
        assert_eq!(text, "  \n");
    }

    #[test]
    fn test_html_into_string() {
        let body = b"<html><body>Project deleted</body></html>";
        let decoded = decode::<String>(body).unwrap();
        assert_eq!(decoded.kind(), "raw_string");
        assert_eq!(
            decoded.into_result().unwrap(),
            "<html><body>Project deleted</body></html>"
        );
    }

    #[test]
    fn test_html_into_struct() {
        let err = decode_into::<Flows>(b"<html>login</html>").unwrap_err();
        assert!(matches!(err, Error::UnexpectedBody(body) if body == "<html>login</html>"));
    }

    #[test]
    fn test_text_that_opens_like_json_into_string() {
        for body in [
            "404 Not Found",
            "[INFO] project removed",
            "{ not json }",
            "true story",
        ] {
            let decoded = decode::<String>(body.as_bytes()).unwrap();
            assert_eq!(decoded, Decoded::RawString(body.to_string()));
        }
    }

    #[test]
    fn test_text_that_opens_like_json_into_struct() {
        let err = decode_into::<Flows>(b"500 Internal Server Error").unwrap_err();
        assert!(matches!(err, Error::UnexpectedBody(body) if body == "500 Internal Server Error"));
    }

    #[test]
    fn test_trailing_garbage_is_not_json() {
        let body = br#"{"project": "etl"} <!-- cached -->"#;
        let decoded = decode::<Project>(body).unwrap();
        assert_eq!(decoded.kind(), "raw_string");
    }

    #[test]
    fn test_json_string_into_string() {
        let text: String = decode_into(br#""plain""#).unwrap();
        assert_eq!(text, "plain");
    }

    #[test]
    fn test_shape_mismatch_surfaces() {
        let err = decode_into::<Flows>(br#"{"flows": "nope"}"#).unwrap_err();
        assert!(matches!(err, Error::Json(_)));

        let err = decode_into::<Flows>(br#"["boom"]"#).unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_non_string_error_field_is_not_a_signal() {
        let body = br#"{"error": {"code": 1}, "project": "etl"}"#;
        let project: Project = decode_into(body).unwrap();
        assert_eq!(project.name, "etl");
    }

    #[test]
    fn test_map_destination() {
        let map: serde_json::Map<String, serde_json::Value> = decode_into(b"{}").unwrap();
        assert!(map.is_empty());
    }
}
