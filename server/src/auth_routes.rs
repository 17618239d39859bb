use axum::{
    Form, Router,
    extract::Query,
    http::{HeaderMap, HeaderValue, header},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use cookie::Cookie;
use jiff::{SignedDuration, Timestamp};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use types::{LoginNotice, Result, SESSION_COOKIE_NAME};

use sqlx::SqlitePool;

use crate::storage::Session;
use crate::{CONFIG, TalentClient, public_client, session_token, storage};

pub fn auth_router() -> Router {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/logout", get(logout))
}

#[derive(Deserialize)]
struct LoginForm {
    username: String,
    password: SecretString,
}

async fn login(Form(form): Form<LoginForm>) -> Response {
    let username = form.username.trim();
    if username.is_empty() || form.password.expose_secret().is_empty() {
        return Redirect::to(&LoginNotice::MissingCredentials.login_path()).into_response();
    }

    match sign_in(username, &form.password).await {
        Ok(token) => with_cookie(Redirect::to("/dashboard"), session_cookie(token)),
        Err(error) => {
            tracing::info!(%error, username, "sign in failed");
            let notice = LoginNotice::for_login_status(error.status());
            Redirect::to(&notice.login_path()).into_response()
        }
    }
}

/// Exchange credentials for tokens and store them in a new session.
async fn sign_in(username: &str, password: &SecretString) -> Result<String> {
    let client = public_client();
    let tokens = client.auth().login(username, password).await?;
    let profile = client
        .authenticated(tokens.access.clone())
        .auth()
        .profile()
        .await?;

    let fallback_expiry = Timestamp::now() + SignedDuration::from_hours(CONFIG.session_ttl_hours);
    let session = Session::create(storage::pool(), tokens, profile, fallback_expiry).await?;

    tracing::info!(
        user = %session.profile().user.username,
        role = session.profile().role().label(),
        "signed in"
    );
    session.as_token()
}

#[derive(Deserialize)]
struct LogoutParams {
    #[serde(default)]
    expired: bool,
}

async fn logout(headers: HeaderMap, Query(params): Query<LogoutParams>) -> Response {
    let pool = storage::pool();
    if let Some(token) = session_token(&headers)
        && let Ok(session) = Session::find_token(pool, &token).await
    {
        end_session(pool, public_client(), session).await;
    }

    signed_out(params.expired, CONFIG.secure_cookies)
}

/// Redirect to the sign-in page with the session cookie cleared.
fn signed_out(expired: bool, secure: bool) -> Response {
    let target = if expired {
        LoginNotice::SessionExpired.login_path()
    } else {
        "/login".to_string()
    };

    let cookie = Cookie::build((SESSION_COOKIE_NAME, ""))
        .path("/")
        .http_only(true)
        .secure(secure)
        .max_age(cookie::time::Duration::ZERO)
        .build();

    with_cookie(Redirect::to(&target), cookie)
}

/// Tell the backend we're done (best effort) and forget the session.
async fn end_session(pool: &SqlitePool, backend: &TalentClient, session: Session) {
    let client = backend.authenticated(session.tokens().access.clone());
    if let Err(error) = client.auth().logout().await {
        tracing::debug!(%error, "backend logout failed");
    }

    match session.delete(pool).await {
        Ok(()) => tracing::info!(user = %session.profile().user.username, "signed out"),
        Err(error) => tracing::warn!(%error, "failed to delete session"),
    }
}

fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, token))
        .path("/")
        .http_only(true)
        .secure(CONFIG.secure_cookies)
        .same_site(cookie::SameSite::Lax)
        .build()
}

fn with_cookie(redirect: Redirect, cookie: Cookie<'_>) -> Response {
    let mut response = redirect.into_response();
    match HeaderValue::from_str(&cookie.to_string()) {
        Ok(value) => {
            response.headers_mut().insert(header::SET_COOKIE, value);
        }
        Err(error) => tracing::error!(%error, "unencodable session cookie"),
    }
    response
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::{Json, routing::post};
    use serde_json::json;
    use types::{Profile, TokenPair};

    use super::*;
    use crate::storage::test_pool;

    async fn stored_session(pool: &SqlitePool) -> Session {
        let profile: Profile =
            serde_json::from_value(json!({"id": 1, "user": {"id": 2, "username": "ada"}})).unwrap();
        let tokens = TokenPair {
            access: "access".to_string().into(),
            refresh: "refresh".to_string().into(),
        };
        let expiry = Timestamp::now() + SignedDuration::from_hours(1);
        Session::create(pool, tokens, profile, expiry).await.unwrap()
    }

    async fn counting_backend(hits: Arc<AtomicUsize>) -> TalentClient {
        let app = Router::new().route(
            "/api/auth/logout/",
            post(move || async move {
                hits.fetch_add(1, Ordering::SeqCst);
                Json(json!({"message": "Logged out"}))
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        TalentClient::new(format!("http://{addr}/api/").parse().unwrap())
    }

    #[tokio::test]
    async fn ending_a_session_tells_the_backend_and_forgets_it() {
        let (pool, _dir) = test_pool().await;
        let hits = Arc::new(AtomicUsize::new(0));
        let backend = counting_backend(hits.clone()).await;

        let session = stored_session(&pool).await;
        let id = session.id();
        end_session(&pool, &backend, session).await;

        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(Session::find(&pool, id).await.unwrap_err().is_unauthorized());
    }

    #[tokio::test]
    async fn unreachable_backend_still_ends_the_session() {
        let (pool, _dir) = test_pool().await;
        let backend = TalentClient::new("http://127.0.0.1:9/api/".parse().unwrap());

        let session = stored_session(&pool).await;
        let id = session.id();
        end_session(&pool, &backend, session).await;

        assert!(Session::find(&pool, id).await.unwrap_err().is_unauthorized());
    }

    #[test]
    fn expired_logout_clears_cookie_and_explains() {
        let response = signed_out(true, false);

        assert_eq!(response.headers()[header::LOCATION], "/login?error=session_expired");
        let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(set_cookie.starts_with("talent_verify_session=;"));
        assert!(set_cookie.contains("Max-Age=0"));
        assert!(set_cookie.contains("HttpOnly"));
    }

    #[test]
    fn plain_logout_lands_on_login() {
        let response = signed_out(false, true);

        assert_eq!(response.headers()[header::LOCATION], "/login");
        let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(set_cookie.contains("Max-Age=0"));
        assert!(set_cookie.contains("Secure"));
    }

    #[test]
    fn cookie_lands_on_redirect() {
        let cookie = Cookie::build((SESSION_COOKIE_NAME, "abc.def"))
            .path("/")
            .http_only(true)
            .build();
        let response = with_cookie(Redirect::to("/dashboard"), cookie);

        assert_eq!(response.headers()[header::LOCATION], "/dashboard");
        let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(set_cookie.starts_with("talent_verify_session=abc.def"));
        assert!(set_cookie.contains("HttpOnly"));
    }
}
