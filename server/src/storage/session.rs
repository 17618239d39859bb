use jiff::Timestamp;
use jiff_sqlx::ToSqlx;
use sqlx::SqlitePool;
use types::{Error, Profile, Result, TokenPair};
use uuid::Uuid;

use crate::uuid_v7::UuidV7Ext;

#[derive(sqlx::FromRow)]
struct SessionRow {
    id: Uuid,
    tokens: String,
    profile: String,
    expires_at: i64,
    updated_at: jiff_sqlx::Timestamp,
}

/// A signed-in user: the backend's tokens and who they belong to.
#[derive(Debug)]
pub struct Session {
    id: Uuid,
    tokens: TokenPair,
    profile: Profile,
    expires_at: Timestamp,
    updated_at: Timestamp,
}

impl Session {
    /// The session lives as long as its refresh token, or until
    /// `fallback_expiry` if the token doesn't say.
    pub fn new(tokens: TokenPair, profile: Profile, fallback_expiry: Timestamp) -> Self {
        let expires_at = tokens.refresh_expires_at().unwrap_or(fallback_expiry);

        Self {
            id: Uuid::now_v7(),
            tokens,
            profile,
            expires_at,
            updated_at: Timestamp::now(),
        }
    }

    pub async fn create(
        pool: &SqlitePool,
        tokens: TokenPair,
        profile: Profile,
        fallback_expiry: Timestamp,
    ) -> Result<Self> {
        let session = Self::new(tokens, profile, fallback_expiry);
        session.insert(pool).await?;
        Ok(session)
    }

    /// A missing or expired session reads as [`Error::Unauthorized`].
    pub async fn find(pool: &SqlitePool, id: Uuid) -> Result<Self> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT id, tokens, profile, expires_at, updated_at
            FROM sessions
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(Error::Unauthorized)?;

        let session = Self {
            id: row.id,
            tokens: serde_json::from_str(&row.tokens)?,
            profile: serde_json::from_str(&row.profile)?,
            expires_at: Timestamp::from_second(row.expires_at)?,
            updated_at: row.updated_at.to_jiff(),
        };

        if session.is_expired(Timestamp::now()) {
            session.delete(pool).await?;
            return Err(Error::Unauthorized);
        }

        Ok(session)
    }

    /// Find session by signed token (cookie value).
    pub async fn find_token(pool: &SqlitePool, token: &str) -> Result<Self> {
        let uuid = Uuid::from_token(token).map_err(|error| {
            tracing::debug!(%error, "rejected session cookie");
            Error::Unauthorized
        })?;
        Self::find(pool, uuid).await
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn tokens(&self) -> &TokenPair {
        &self.tokens
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.expires_at <= now
    }

    pub fn as_token(&self) -> Result<String> {
        self.id.as_token()
    }

    pub async fn insert(&self, pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO sessions (id, tokens, profile, expires_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(self.id)
        .bind(serde_json::to_string(&self.tokens)?)
        .bind(serde_json::to_string(&self.profile)?)
        .bind(self.expires_at.as_second())
        .bind(self.updated_at.to_sqlx())
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Store a refreshed token pair.
    pub async fn update_tokens(&mut self, pool: &SqlitePool, tokens: TokenPair) -> Result<()> {
        if let Some(expires_at) = tokens.refresh_expires_at() {
            self.expires_at = expires_at;
        }
        self.tokens = tokens;
        self.updated_at = Timestamp::now();

        sqlx::query(
            r#"
            UPDATE sessions
            SET tokens = ?, expires_at = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(serde_json::to_string(&self.tokens)?)
        .bind(self.expires_at.as_second())
        .bind(self.updated_at.to_sqlx())
        .bind(self.id)
        .execute(pool)
        .await?;

        Ok(())
    }

    pub async fn delete(&self, pool: &SqlitePool) -> Result<()> {
        sqlx::query("DELETE FROM sessions WHERE id = ?")
            .bind(self.id)
            .execute(pool)
            .await?;

        Ok(())
    }

    pub async fn delete_expired(pool: &SqlitePool, now: Timestamp) -> Result<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(now.as_second())
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use base64::prelude::*;
    use jiff::SignedDuration;
    use secrecy::ExposeSecret;
    use types::ProfileUser;

    use super::*;
    use crate::storage::test_pool;

    fn jwt(exp: i64) -> String {
        let claims = BASE64_URL_SAFE_NO_PAD.encode(format!(r#"{{"exp":{exp}}}"#));
        format!("e30.{claims}.sig")
    }

    fn tokens(refresh_exp: Option<i64>) -> TokenPair {
        TokenPair {
            access: jwt(Timestamp::now().as_second() + 300).into(),
            refresh: refresh_exp.map_or_else(|| "opaque".to_string(), jwt).into(),
        }
    }

    fn profile() -> Profile {
        Profile {
            id: 1,
            user: ProfileUser {
                id: 2,
                username: "ada".into(),
                email: "ada@acme.test".into(),
                first_name: "Ada".into(),
                last_name: "Lovelace".into(),
                full_name: String::new(),
            },
            role_name: Some("talent_verify_admin".into()),
            company: None,
            company_name: String::new(),
            phone: String::new(),
            permissions: None,
        }
    }

    fn in_an_hour() -> Timestamp {
        Timestamp::now() + SignedDuration::from_hours(1)
    }

    #[tokio::test]
    async fn round_trips_through_sqlite() {
        let (pool, _dir) = test_pool().await;
        let refresh_exp = Timestamp::now().as_second() + 86_400;

        let session = Session::create(&pool, tokens(Some(refresh_exp)), profile(), in_an_hour())
            .await
            .unwrap();
        let found = Session::find(&pool, session.id()).await.unwrap();

        assert_eq!(found.profile(), session.profile());
        assert_eq!(
            found.tokens().access.expose_secret(),
            session.tokens().access.expose_secret()
        );
        assert_eq!(found.expires_at.as_second(), refresh_exp);
    }

    #[tokio::test]
    async fn missing_session_is_unauthorized() {
        let (pool, _dir) = test_pool().await;
        let error = Session::find(&pool, Uuid::now_v7()).await.unwrap_err();
        assert!(error.is_unauthorized());
    }

    #[tokio::test]
    async fn expired_sessions_are_removed() {
        let (pool, _dir) = test_pool().await;
        let past = Timestamp::now().as_second() - 10;

        let stale = Session::create(&pool, tokens(Some(past)), profile(), in_an_hour())
            .await
            .unwrap();
        let fresh = Session::create(&pool, tokens(None), profile(), in_an_hour())
            .await
            .unwrap();

        assert!(Session::find(&pool, stale.id()).await.unwrap_err().is_unauthorized());
        Session::create(&pool, tokens(Some(past)), profile(), in_an_hour())
            .await
            .unwrap();
        assert_eq!(Session::delete_expired(&pool, Timestamp::now()).await.unwrap(), 1);
        assert!(Session::find(&pool, fresh.id()).await.is_ok());
    }

    #[tokio::test]
    async fn refreshed_tokens_are_persisted() {
        let (pool, _dir) = test_pool().await;
        let mut session = Session::create(&pool, tokens(None), profile(), in_an_hour())
            .await
            .unwrap();

        let refreshed = session.tokens().clone().with_access(types::RefreshedAccess {
            access: "new-access".to_string().into(),
        });
        session.update_tokens(&pool, refreshed).await.unwrap();

        let found = Session::find(&pool, session.id()).await.unwrap();
        assert_eq!(found.tokens().access.expose_secret(), "new-access");
        assert_eq!(found.tokens().refresh.expose_secret(), "opaque");
    }

    #[tokio::test]
    async fn deleted_sessions_are_gone() {
        let (pool, _dir) = test_pool().await;
        let session = Session::create(&pool, tokens(None), profile(), in_an_hour())
            .await
            .unwrap();
        session.delete(&pool).await.unwrap();
        assert!(Session::find(&pool, session.id()).await.is_err());
    }
}
