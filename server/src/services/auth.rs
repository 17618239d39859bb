use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};
use types::{Profile, RefreshedAccess, Result, TokenPair};

use crate::client::{ReqwestExt, TalentClient};

pub struct Auth<'a>(pub(crate) &'a TalentClient);

impl Auth<'_> {
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<TokenPair> {
        self.0
            .post("auth/login/")?
            .json(&json!({
                "username": username,
                "password": password.expose_secret(),
            }))
            .try_send()
            .await
    }

    pub async fn refresh(&self, refresh: &SecretString) -> Result<RefreshedAccess> {
        self.0
            .post("auth/refresh/")?
            .json(&json!({ "refresh": refresh.expose_secret() }))
            .try_send()
            .await
    }

    pub async fn logout(&self) -> Result<()> {
        self.0.post("auth/logout/")?.try_send::<Value>().await?;
        Ok(())
    }

    pub async fn profile(&self) -> Result<Profile> {
        self.0.get("auth/profile/")?.try_send().await
    }

    /// The role's raw permission map.
    pub async fn permissions(&self) -> Result<Value> {
        self.0.get("auth/permissions/")?.try_send().await
    }
}
