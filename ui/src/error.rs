use dioxus::prelude::*;

/// Where the browser goes when the backend no longer accepts our session.
const EXPIRED_LOGOUT: &str = "/auth/logout?expired=true";

pub fn is_unauthorized(error: &ServerFnError) -> bool {
    matches!(error, ServerFnError::ServerError { code: 401, .. })
}

/// The backend's own message when it sent one, otherwise `fallback`.
pub fn error_message(error: &ServerFnError, fallback: &str) -> String {
    match error {
        ServerFnError::ServerError {
            details: Some(details),
            ..
        } => details
            .get("backend_message")
            .and_then(|m| m.as_str())
            .filter(|m| !m.is_empty())
            .unwrap_or(fallback)
            .to_string(),
        _ => fallback.to_string(),
    }
}

/// Clear the session cookie server-side and land on the sign-in page.
pub fn force_logout() {
    navigator().push(NavigationTarget::<String>::External(
        EXPIRED_LOGOUT.to_string(),
    ));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server_error(code: u16, details: Option<serde_json::Value>) -> ServerFnError {
        ServerFnError::ServerError {
            message: "boom".to_string(),
            code,
            details,
        }
    }

    #[test]
    fn prefers_backend_message() {
        let error = server_error(
            400,
            Some(serde_json::json!({"backend_message": "Company is required"})),
        );
        assert_eq!(error_message(&error, "Failed to create"), "Company is required");
    }

    #[test]
    fn falls_back_without_message() {
        let error = server_error(500, Some(serde_json::json!({"backend_message": null})));
        assert_eq!(error_message(&error, "Failed to create"), "Failed to create");
        assert_eq!(
            error_message(&server_error(502, None), "Failed to load"),
            "Failed to load"
        );
    }

    #[test]
    fn detects_401() {
        assert!(is_unauthorized(&server_error(401, None)));
        assert!(!is_unauthorized(&server_error(403, None)));
    }

    #[test]
    fn outages_keep_the_session() {
        for code in [500, 502, 503, 504] {
            assert!(!is_unauthorized(&server_error(code, None)));
        }
    }
}
