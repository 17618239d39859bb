use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use types::{Error, Result};

pub(crate) trait ReqwestExt {
    /// Send, mapping 401 and other failures onto [`Error`].
    async fn try_send_raw(self) -> Result<Response>;

    async fn try_send<T: DeserializeOwned>(self) -> Result<T>;
}

impl ReqwestExt for RequestBuilder {
    async fn try_send_raw(self) -> Result<Response> {
        let response = self.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            tracing::debug!(url = %response.url(), "backend rejected credentials");
            return Err(Error::Unauthorized);
        }

        if status.is_client_error() || status.is_server_error() {
            let url = response.url().clone();
            let body = response.bytes().await.unwrap_or_default();
            let error = Error::api(status.as_u16(), &body);
            if status.is_server_error() {
                tracing::error!(%status, %url, "backend request failed");
            } else {
                tracing::info!(%status, %url, message = ?error.backend_message(), "backend refused request");
            }
            return Err(error);
        }

        Ok(response)
    }

    async fn try_send<T: DeserializeOwned>(self) -> Result<T> {
        let response = self.try_send_raw().await?;
        let url = response.url().clone();
        let body = response.bytes().await?;
        // Empty bodies (204 No Content) read as `null`, which suits `()`.
        let body: &[u8] = if body.is_empty() { b"null" } else { &body };

        match serde_json::from_slice(body) {
            Ok(r) => Ok(r),
            Err(error) => {
                tracing::warn!(%url, ?error, "failed to parse backend response");
                Err(error.into())
            }
        }
    }
}

/// A file the backend sent for download.
#[derive(Debug, Clone)]
pub struct Download {
    pub content_type: String,
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
}

impl Download {
    pub fn csv(file_name: impl Into<String>, body: String) -> Self {
        Self {
            content_type: "text/csv; charset=utf-8".to_string(),
            file_name: Some(file_name.into()),
            bytes: body.into_bytes(),
        }
    }

    pub(crate) async fn from_response(response: Response) -> Result<Self> {
        let headers = response.headers();
        let content_type = headers
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();
        let file_name = headers
            .get(reqwest::header::CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(disposition_file_name);
        let bytes = response.bytes().await?.to_vec();

        Ok(Self {
            content_type,
            file_name,
            bytes,
        })
    }
}

/// Pull `filename="..."` out of a `Content-Disposition` header.
fn disposition_file_name(header: &str) -> Option<String> {
    header.split(';').find_map(|part| {
        let value = part.trim().strip_prefix("filename=")?;
        let value = value.trim_matches('"');
        (!value.is_empty()).then(|| value.to_string())
    })
}

/// HTTP client for the backend REST API.
///
/// Paths are relative to the API base URL, e.g. `"companies/"`.
#[derive(Clone)]
pub struct TalentClient {
    client: Client,
    base_url: Url,
    token: Option<SecretString>,
}

impl TalentClient {
    pub fn new(base_url: Url) -> Self {
        Self {
            client: Client::new(),
            base_url,
            token: None,
        }
    }

    /// A client sending `Authorization: Bearer <token>` with every request.
    pub fn authenticated(&self, token: SecretString) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            token: Some(token),
        }
    }

    pub(crate) fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let url = self.base_url.join(path.trim_start_matches('/'))?;
        let request = self.client.request(method, url);

        Ok(match &self.token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        })
    }

    pub(crate) fn get(&self, path: impl AsRef<str>) -> Result<RequestBuilder> {
        self.request(Method::GET, path.as_ref())
    }

    pub(crate) fn post(&self, path: impl AsRef<str>) -> Result<RequestBuilder> {
        self.request(Method::POST, path.as_ref())
    }

    pub(crate) fn put(&self, path: impl AsRef<str>) -> Result<RequestBuilder> {
        self.request(Method::PUT, path.as_ref())
    }

    pub(crate) fn delete(&self, path: impl AsRef<str>) -> Result<RequestBuilder> {
        self.request(Method::DELETE, path.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        Json, Router,
        http::{HeaderMap, StatusCode},
        response::IntoResponse,
        routing::{delete, get, post},
    };
    use secrecy::ExposeSecret;
    use serde_json::json;
    use types::company::CompanyQuery;
    use types::employee::NewEmployee;

    use super::*;

    /// A stand-in for the REST API on a random local port.
    async fn stub_backend() -> Url {
        let app = Router::new()
            .route(
                "/api/companies/",
                get(|headers: HeaderMap| async move {
                    match headers.get("authorization") {
                        Some(value) if value == "Bearer good" => Json(json!({
                            "count": 1,
                            "next": null,
                            "previous": null,
                            "results": [{"id": 1, "name": "Acme", "registration_number": "R-1"}],
                        }))
                        .into_response(),
                        _ => (
                            StatusCode::UNAUTHORIZED,
                            Json(json!({"detail": "Authentication credentials were not provided."})),
                        )
                            .into_response(),
                    }
                }),
            )
            .route(
                "/api/auth/login/",
                post(|| async { Json(json!({"access": "a.b.c", "refresh": "d.e.f"})) }),
            )
            .route(
                "/api/employees/",
                post(|| async {
                    (
                        StatusCode::BAD_REQUEST,
                        Json(json!({"email": ["Enter a valid email address."]})),
                    )
                }),
            )
            .route("/api/employees/7/", delete(|| async { StatusCode::NO_CONTENT }))
            .route(
                "/api/audit-logs/analytics/",
                get(|| async { (StatusCode::BAD_GATEWAY, "<html>Bad Gateway</html>") }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        format!("http://{addr}/api/").parse().unwrap()
    }

    #[tokio::test]
    async fn sends_bearer_token() {
        let client = TalentClient::new(stub_backend().await).authenticated("good".to_string().into());
        let page = client.companies().list(&CompanyQuery::default()).await.unwrap();

        assert_eq!(page.count, 1);
        assert_eq!(page.results[0].name, "Acme");
    }

    #[tokio::test]
    async fn rejected_token_is_unauthorized() {
        let base = stub_backend().await;

        let anonymous = TalentClient::new(base.clone());
        let error = anonymous.companies().list(&CompanyQuery::default()).await.unwrap_err();
        assert!(error.is_unauthorized());

        let stale = anonymous.authenticated("stale".to_string().into());
        let error = stale.companies().list(&CompanyQuery::default()).await.unwrap_err();
        assert_eq!(error.status(), 401);
    }

    #[tokio::test]
    async fn login_returns_token_pair() {
        let client = TalentClient::new(stub_backend().await);
        let tokens = client
            .auth()
            .login("ada", &"hunter2".to_string().into())
            .await
            .unwrap();

        assert_eq!(tokens.access.expose_secret(), "a.b.c");
        assert_eq!(tokens.refresh.expose_secret(), "d.e.f");
    }

    #[tokio::test]
    async fn validation_errors_carry_the_field_message() {
        let client = TalentClient::new(stub_backend().await).authenticated("good".to_string().into());
        let error = client
            .employees()
            .create(&NewEmployee::default())
            .await
            .unwrap_err();

        assert_eq!(error.status(), 400);
        assert_eq!(
            error.backend_message(),
            Some("email: Enter a valid email address.")
        );
    }

    #[tokio::test]
    async fn empty_body_reads_as_unit() {
        let client = TalentClient::new(stub_backend().await).authenticated("good".to_string().into());
        client.employees().delete(7).await.unwrap();
    }

    #[tokio::test]
    async fn html_error_pages_have_no_message() {
        let client = TalentClient::new(stub_backend().await).authenticated("good".to_string().into());
        let error = client.audit_logs().analytics(30).await.unwrap_err();

        assert_eq!(error.status(), 502);
        assert_eq!(error.backend_message(), None);
    }

    #[test]
    fn file_name_from_disposition() {
        assert_eq!(
            disposition_file_name(r#"attachment; filename="employee_import_template.csv""#),
            Some("employee_import_template.csv".to_string())
        );
        assert_eq!(disposition_file_name("attachment"), None);
    }

    #[test]
    fn paths_join_onto_the_base() {
        let client = TalentClient::new("http://backend.test/api/".parse().unwrap());
        let request = client.get("/companies/").unwrap().build().unwrap();
        assert_eq!(request.url().as_str(), "http://backend.test/api/companies/");
        assert!(request.headers().get("authorization").is_none());

        let client = client.authenticated("abc".to_string().into());
        let request = client.get("employees/3/history/").unwrap().build().unwrap();
        assert_eq!(
            request.url().as_str(),
            "http://backend.test/api/employees/3/history/"
        );
        assert_eq!(request.headers()["authorization"], "Bearer abc");
    }
}
