use std::path::PathBuf;
use std::sync::LazyLock;

use secrecy::SecretString;
use serde::Deserialize;
use types::Result;
use url::Url;

pub static CONFIG: LazyLock<Config> = LazyLock::new(|| match Config::load() {
    Ok(config) => config,
    Err(error) => panic!("invalid configuration: {error}"),
});

/// Read from `talent-verify.toml` (optional) and `TALENT_VERIFY_*` variables.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Base URL of the backend REST API, e.g. `http://localhost:8000/api/`.
    pub api_url: Url,
    pub data_dir: PathBuf,
    /// Key for signing session cookies.
    pub signing_secret: SecretString,
    pub secure_cookies: bool,
    /// Sessions without a readable refresh expiry are dropped after this long.
    pub session_ttl_hours: i64,
}

impl Config {
    pub fn load() -> Result<Self> {
        let config: Self = config::Config::builder()
            .set_default("data_dir", "data")?
            .set_default("secure_cookies", false)?
            .set_default("session_ttl_hours", 24)?
            .add_source(config::File::with_name("talent-verify").required(false))
            .add_source(config::Environment::with_prefix("TALENT_VERIFY"))
            .build()?
            .try_deserialize()?;

        Ok(config.normalized())
    }

    /// `Url::join` drops the last path segment unless it ends in a slash.
    fn normalized(mut self) -> Self {
        if !self.api_url.path().ends_with('/') {
            let path = format!("{}/", self.api_url.path());
            self.api_url.set_path(&path);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(api_url: &str) -> Config {
        Config {
            api_url: api_url.parse().unwrap(),
            data_dir: "data".into(),
            signing_secret: "secret".to_string().into(),
            secure_cookies: false,
            session_ttl_hours: 24,
        }
    }

    #[test]
    fn api_url_gets_trailing_slash() {
        let config = config("http://localhost:8000/api").normalized();
        assert_eq!(config.api_url.as_str(), "http://localhost:8000/api/");
        assert_eq!(
            config.api_url.join("companies/").unwrap().as_str(),
            "http://localhost:8000/api/companies/"
        );
    }

    #[test]
    fn trailing_slash_is_kept() {
        let config = config("http://localhost:8000/api/").normalized();
        assert_eq!(config.api_url.as_str(), "http://localhost:8000/api/");
    }
}
