mod auth_routes;
mod client;
mod config;
mod downloads;
mod services;
pub mod storage;
mod uuid_v7;

use std::ops::Deref;
use std::sync::LazyLock;

use axum::Router;
use axum::http::{HeaderMap, header};
use cookie::Cookie;
use dioxus::fullstack::FullstackContext;
use jiff::Timestamp;
use tracing_subscriber::EnvFilter;
use types::{Action, Error, Profile, Resource, Result, SESSION_COOKIE_NAME};

pub use crate::client::{Download, TalentClient};
pub use crate::config::{CONFIG, Config};
pub use crate::services::*;
use crate::storage::Session;

static PUBLIC_CLIENT: LazyLock<TalentClient> =
    LazyLock::new(|| TalentClient::new(CONFIG.api_url.clone()));

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Prepare storage and build the routes that live outside the app.
pub async fn init() -> Result<Router> {
    // Surface configuration errors here rather than as a panic on first use.
    let config = Config::load()?;
    std::fs::create_dir_all(&config.data_dir)?;

    let pool = storage::pool();
    storage::migrate(pool).await?;
    storage::purge_expired(pool).await?;

    tracing::info!(api_url = %config.api_url, data_dir = %config.data_dir.display(), "talent verify ready");

    Ok(Router::new()
        .merge(auth_routes::auth_router())
        .merge(downloads::download_router()))
}

/// Client for the unauthenticated endpoints (login, refresh, invitations).
pub fn public_client() -> &'static TalentClient {
    &PUBLIC_CLIENT
}

/// The signed-in user's session and a client carrying their access token.
pub struct Backend {
    session: Session,
    client: TalentClient,
}

impl Deref for Backend {
    type Target = TalentClient;

    fn deref(&self) -> &TalentClient {
        &self.client
    }
}

impl Backend {
    /// The backend for the request being served.
    pub async fn current() -> Result<Self> {
        let headers: HeaderMap = FullstackContext::extract().await?;
        Self::from_headers(&headers).await
    }

    /// Look up the session behind the request cookie, refreshing its access
    /// token first when it has expired.
    pub async fn from_headers(headers: &HeaderMap) -> Result<Self> {
        let token = session_token(headers).ok_or(Error::Unauthorized)?;
        let mut session = Session::find_token(storage::pool(), &token).await?;

        if session.tokens().is_access_expired(Timestamp::now()) {
            refresh(&mut session).await?;
        }

        let client = public_client().authenticated(session.tokens().access.clone());
        Ok(Self { session, client })
    }

    pub fn profile(&self) -> &Profile {
        self.session.profile()
    }

    /// Fail with 403 unless the user may do `action` on `resource`.
    pub fn require(&self, action: Action, resource: Resource) -> Result<()> {
        if self.profile().can(action, resource) {
            return Ok(());
        }

        tracing::info!(
            user = %self.profile().user.username,
            ?action,
            ?resource,
            "refused request"
        );
        Err(forbidden())
    }

    /// Await a backend call; a 401 ends the session.
    pub async fn call<T>(&self, request: impl Future<Output = Result<T>>) -> Result<T> {
        let result = request.await;

        if let Err(error) = &result
            && error.is_unauthorized()
        {
            tracing::info!(user = %self.profile().user.username, "backend ended the session");
            if let Err(error) = self.session.delete(storage::pool()).await {
                tracing::warn!(%error, "failed to delete session");
            }
        }

        result
    }
}

/// Trade the refresh token for a new access token, or end the session.
async fn refresh(session: &mut Session) -> Result<()> {
    let pool = storage::pool();

    if session.tokens().is_refresh_expired(Timestamp::now()) {
        session.delete(pool).await?;
        return Err(Error::Unauthorized);
    }

    match public_client()
        .auth()
        .refresh(&session.tokens().refresh)
        .await
    {
        Ok(access) => {
            let tokens = session.tokens().clone().with_access(access);
            session.update_tokens(pool, tokens).await?;
            tracing::debug!(user = %session.profile().user.username, "refreshed access token");
            Ok(())
        }
        Err(error) if error.is_unauthorized() || (400..500).contains(&error.status()) => {
            tracing::info!(%error, "refresh rejected, ending session");
            session.delete(pool).await?;
            Err(Error::Unauthorized)
        }
        Err(error) => Err(error),
    }
}

/// The signed-in user, or `None` without a valid session.
pub async fn current_profile() -> Result<Option<Profile>> {
    match Backend::current().await {
        Ok(backend) => Ok(Some(backend.profile().clone())),
        Err(error) if error.is_unauthorized() => Ok(None),
        Err(error) => Err(error),
    }
}

pub(crate) fn forbidden() -> Error {
    Error::Api {
        status: 403,
        message: Some("You do not have permission to perform this action.".to_string()),
    }
}

pub(crate) fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(|cookie| cookie.ok())
        .find(|cookie| cookie.name() == SESSION_COOKIE_NAME)
        .map(|cookie| cookie.value().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(cookies: &[&str]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for cookie in cookies {
            headers.append(header::COOKIE, cookie.parse().unwrap());
        }
        headers
    }

    #[test]
    fn finds_session_cookie() {
        let headers = headers(&["theme=dark; talent_verify_session=abc.def"]);
        assert_eq!(session_token(&headers).as_deref(), Some("abc.def"));
    }

    #[test]
    fn finds_session_cookie_in_any_header() {
        let headers = headers(&["theme=dark", "talent_verify_session=abc.def"]);
        assert_eq!(session_token(&headers).as_deref(), Some("abc.def"));
    }

    #[test]
    fn no_session_cookie() {
        assert_eq!(session_token(&headers(&["theme=dark"])), None);
        assert_eq!(session_token(&HeaderMap::new()), None);
    }
}
