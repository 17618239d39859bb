use dioxus::prelude::ServerFnError;
use serde_json::{Value, json};

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Everything that can go wrong talking to the backend.
///
/// This is not a `std::error::Error`; any type that is converts into
/// `Error::Other` with `?`.
#[derive(Debug)]
pub enum Error {
    /// The backend rejected our credentials, or we have none.
    Unauthorized,
    /// The backend answered with a non-success status.
    Api {
        status: u16,
        message: Option<String>,
    },
    Other(anyhow::Error),
}

impl Error {
    pub fn api(status: u16, body: &[u8]) -> Self {
        let message = serde_json::from_slice::<Value>(body)
            .ok()
            .and_then(|v| extract_message(&v));

        Self::Api { status, message }
    }

    /// A request we refuse before it reaches the backend.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::Api {
            status: 400,
            message: Some(message.into()),
        }
    }

    pub fn status(&self) -> u16 {
        match self {
            Self::Unauthorized => 401,
            Self::Api { status, .. } => *status,
            Self::Other(_) => 500,
        }
    }

    /// The message the backend gave us, if any.
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            Self::Api { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthorized => write!(f, "not signed in"),
            Self::Api {
                status,
                message: Some(message),
            } => write!(f, "{message} (status {status})"),
            Self::Api {
                status,
                message: None,
            } => write!(f, "request failed with status {status}"),
            Self::Other(error) => write!(f, "{error:#}"),
        }
    }
}

impl<E> From<E> for Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn from(error: E) -> Self {
        Self::Other(anyhow::Error::new(error))
    }
}

impl From<Error> for anyhow::Error {
    fn from(error: Error) -> Self {
        match error {
            Error::Other(error) => error,
            other => anyhow::anyhow!("{other}"),
        }
    }
}

impl From<Error> for ServerFnError {
    fn from(error: Error) -> Self {
        let chain: Vec<String> = match &error {
            Error::Other(e) => e.chain().map(|c| c.to_string()).collect(),
            other => vec![other.to_string()],
        };
        let backtrace = match &error {
            Error::Other(e) => Some(e.backtrace().to_string()),
            _ => None,
        };

        ServerFnError::ServerError {
            message: error.to_string(),
            code: error.status(),
            details: Some(json!({
                "backend_message": error.backend_message(),
                "chain": chain,
                "backtrace": backtrace,
            })),
        }
    }
}

/// Pull a human readable message out of an error body.
///
/// Looks at `error`, then `detail`, then the first field-level validation
/// message (`{"email": ["Enter a valid email address."]}`).
pub fn extract_message(body: &Value) -> Option<String> {
    let object = body.as_object()?;

    for key in ["error", "detail", "message"] {
        if let Some(message) = object.get(key).and_then(first_string) {
            return Some(message);
        }
    }

    if let Some(message) = object.get("non_field_errors").and_then(first_string) {
        return Some(message);
    }

    object.iter().find_map(|(field, value)| {
        first_string(value).map(|message| format!("{field}: {message}"))
    })
}

fn first_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Array(items) => items.iter().find_map(first_string),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_error_field() {
        let body = json!({"error": "Invalid credentials", "detail": "ignored"});
        assert_eq!(extract_message(&body).as_deref(), Some("Invalid credentials"));
    }

    #[test]
    fn falls_back_to_detail() {
        let body = json!({"detail": "Given token not valid for any token type"});
        assert_eq!(
            extract_message(&body).as_deref(),
            Some("Given token not valid for any token type")
        );
    }

    #[test]
    fn uses_first_field_error() {
        let body = json!({"email": ["Enter a valid email address."]});
        assert_eq!(
            extract_message(&body).as_deref(),
            Some("email: Enter a valid email address.")
        );

        let body = json!({"non_field_errors": ["Passwords don't match"]});
        assert_eq!(extract_message(&body).as_deref(), Some("Passwords don't match"));
    }

    #[test]
    fn nothing_to_extract() {
        assert_eq!(extract_message(&json!({})), None);
        assert_eq!(extract_message(&json!(["x"])), None);
        assert_eq!(extract_message(&json!({"count": 3})), None);
    }

    #[test]
    fn api_error_from_body() {
        let error = Error::api(400, br#"{"error": "Company is required"}"#);
        assert_eq!(error.status(), 400);
        assert_eq!(error.backend_message(), Some("Company is required"));

        let error = Error::api(502, b"<html>Bad Gateway</html>");
        assert_eq!(error.backend_message(), None);
    }

    #[test]
    fn server_fn_error_carries_status() {
        let error: ServerFnError = Error::Unauthorized.into();
        match error {
            ServerFnError::ServerError { code, .. } => assert_eq!(code, 401),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
