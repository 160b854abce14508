use std::collections::BTreeMap;

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The backend answered with a non-2xx status.
    #[error("{message}")]
    Backend {
        status: u16,
        message: String,
        errors: BTreeMap<String, Vec<String>>,
    },

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unexpected response body from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid client configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Builds a [`Error::Backend`] from a failed response.
    ///
    /// Understands the `{statusCode, message, error, errors}` envelope where
    /// `message` is either a string or a list of strings.
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        let envelope = serde_json::from_slice::<ErrorBody>(body).ok();

        let (message, errors) = match envelope {
            Some(ErrorBody {
                message,
                error,
                errors,
            }) => {
                let message = match message {
                    Some(Value::String(m)) => Some(m),
                    Some(Value::Array(items)) => Some(strings(items).join("; ")),
                    _ => None,
                }
                .filter(|m| !m.is_empty())
                .or_else(|| error.as_ref().and_then(Value::as_str).map(str::to_owned));
                (message, field_messages(errors))
            }
            None => (None, BTreeMap::new()),
        };

        let message = message.unwrap_or_else(|| {
            StatusCode::from_u16(status)
                .ok()
                .and_then(|s| s.canonical_reason())
                .unwrap_or("Request failed")
                .to_owned()
        });

        Error::Backend {
            status,
            message,
            errors,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Backend { status, .. } => Some(*status),
            Error::Request { source, .. } => source.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// True when the backend rejected the credentials (401 or 403).
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401) | Some(403))
    }

    /// Field-level messages reported by the backend, if any.
    pub fn field_errors(&self) -> Option<&BTreeMap<String, Vec<String>>> {
        match self {
            Error::Backend { errors, .. } if !errors.is_empty() => Some(errors),
            _ => None,
        }
    }
}

/// Every field is read leniently; unexpected shapes are ignored.
#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<Value>,
    #[serde(default)]
    error: Option<Value>,
    #[serde(default)]
    errors: Option<Value>,
}

/// Keeps `{field: [messages]}` and `{field: message}` entries, drops the rest.
fn field_messages(errors: Option<Value>) -> BTreeMap<String, Vec<String>> {
    let Some(Value::Object(fields)) = errors else {
        return BTreeMap::new();
    };

    fields
        .into_iter()
        .filter_map(|(field, value)| {
            let messages: Vec<String> = match value {
                Value::String(m) => vec![m],
                Value::Array(items) => strings(items),
                _ => Vec::new(),
            };

            (!messages.is_empty()).then_some((field, messages))
        })
        .collect()
}

fn strings(items: Vec<Value>) -> Vec<String> {
    items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(m) => Some(m),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_message() {
        let err = Error::from_response(
            401,
            br#"{"statusCode":401,"message":"Invalid credentials","error":"Unauthorized"}"#,
        );

        assert_eq!(err.to_string(), "Invalid credentials");
        assert_eq!(err.status(), Some(401));
        assert!(err.is_unauthorized());
    }

    #[test]
    fn test_list_message_is_joined() {
        let err = Error::from_response(
            400,
            br#"{"statusCode":400,"message":["email must be an email","name is too short"],"error":"Bad Request"}"#,
        );

        assert_eq!(
            err.to_string(),
            "email must be an email; name is too short"
        );
        assert!(!err.is_unauthorized());
    }

    #[test]
    fn test_field_errors_are_kept() {
        let err = Error::from_response(
            409,
            br#"{"message":"Email already exists","errors":{"email":["Email already exists"]}}"#,
        );

        let errors = err.field_errors().expect("field errors");
        assert_eq!(errors["email"], vec!["Email already exists".to_owned()]);
    }

    #[test]
    fn test_falls_back_to_error_then_reason() {
        let err = Error::from_response(500, br#"{"error":"Internal Server Error"}"#);
        assert_eq!(err.to_string(), "Internal Server Error");

        let err = Error::from_response(502, b"<html>bad gateway</html>");
        assert_eq!(err.to_string(), "Bad Gateway");
        assert!(err.field_errors().is_none());
    }

    #[test]
    fn test_odd_errors_keep_message() {
        let err = Error::from_response(
            400,
            br#"{"message":"Email is required","errors":null}"#,
        );
        assert_eq!(err.to_string(), "Email is required");
        assert!(err.field_errors().is_none());

        let err = Error::from_response(
            400,
            br#"{"message":"Validation failed","errors":["email must be an email"]}"#,
        );
        assert_eq!(err.to_string(), "Validation failed");
        assert!(err.field_errors().is_none());
    }

    #[test]
    fn test_single_string_field_errors() {
        let err = Error::from_response(
            400,
            br#"{"message":"Validation failed","errors":{"email":"is taken","name":[1,"too short"],"major":{}}}"#,
        );

        let errors = err.field_errors().expect("field errors");
        assert_eq!(errors["email"], vec!["is taken".to_owned()]);
        assert_eq!(errors["name"], vec!["too short".to_owned()]);
        assert!(!errors.contains_key("major"));
    }
}
