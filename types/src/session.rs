use base64::prelude::*;
use jiff::{SignedDuration, Timestamp};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::Result;

pub const SESSION_COOKIE_NAME: &str = "talent_verify_session";

/// Tokens are treated as expired this long before they actually are.
const EXPIRY_SKEW: SignedDuration = SignedDuration::from_secs(30);

/// The backend's JWT pair, as returned by `auth/login/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    #[serde(with = "secret_string")]
    pub access: SecretString,
    #[serde(with = "secret_string")]
    pub refresh: SecretString,
}

/// Response of `auth/refresh/`.
#[derive(Debug, Deserialize)]
pub struct RefreshedAccess {
    #[serde(with = "secret_string")]
    pub access: SecretString,
}

impl TokenPair {
    pub fn with_access(self, refreshed: RefreshedAccess) -> Self {
        Self {
            access: refreshed.access,
            refresh: self.refresh,
        }
    }

    pub fn access_expires_at(&self) -> Option<Timestamp> {
        jwt_expiry(self.access.expose_secret())
    }

    pub fn refresh_expires_at(&self) -> Option<Timestamp> {
        jwt_expiry(self.refresh.expose_secret())
    }

    /// Tokens without a readable `exp` claim are assumed to be valid; the
    /// backend will tell us otherwise.
    pub fn is_access_expired(&self, now: Timestamp) -> bool {
        is_expired(self.access_expires_at(), now)
    }

    pub fn is_refresh_expired(&self, now: Timestamp) -> bool {
        is_expired(self.refresh_expires_at(), now)
    }
}

fn is_expired(expires_at: Option<Timestamp>, now: Timestamp) -> bool {
    match expires_at.and_then(|exp| exp.checked_sub(EXPIRY_SKEW).ok()) {
        Some(exp) => exp <= now,
        None => false,
    }
}

#[derive(Deserialize)]
struct Claims {
    exp: i64,
}

/// Read the `exp` claim of a JWT without verifying its signature.
fn jwt_expiry(token: &str) -> Option<Timestamp> {
    decode_claims(token).ok().and_then(|c| Timestamp::from_second(c.exp).ok())
}

fn decode_claims(token: &str) -> Result<Claims> {
    let payload = token
        .split('.')
        .nth(1)
        .ok_or_else(|| crate::err!("token is not a JWT"))?;
    let bytes = BASE64_URL_SAFE_NO_PAD.decode(payload.trim_end_matches('='))?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Banners the sign-in page shows, passed to it as short query codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginNotice {
    InvalidCredentials,
    CheckCredentials,
    LoginFailed,
    MissingCredentials,
    SessionExpired,
    InvitationAccepted,
}

impl LoginNotice {
    pub const ALL: [Self; 6] = [
        Self::InvalidCredentials,
        Self::CheckCredentials,
        Self::LoginFailed,
        Self::MissingCredentials,
        Self::SessionExpired,
        Self::InvitationAccepted,
    ];

    /// What a failed `auth/login/` call tells the user.
    pub fn for_login_status(status: u16) -> Self {
        match status {
            401 => Self::InvalidCredentials,
            400..=499 => Self::CheckCredentials,
            _ => Self::LoginFailed,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::InvalidCredentials => "invalid_credentials",
            Self::CheckCredentials => "check_credentials",
            Self::LoginFailed => "login_failed",
            Self::MissingCredentials => "missing_credentials",
            Self::SessionExpired => "session_expired",
            Self::InvitationAccepted => "invitation_accepted",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|notice| notice.code() == code)
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::InvalidCredentials => "Invalid username or password",
            Self::CheckCredentials => "Please check your credentials.",
            Self::LoginFailed => "Login failed. Please try again.",
            Self::MissingCredentials => "Please enter your username and password.",
            Self::SessionExpired => "Your session has expired. Please sign in again.",
            Self::InvitationAccepted => "Account created successfully! You can now sign in.",
        }
    }

    pub fn is_error(self) -> bool {
        !matches!(self, Self::InvitationAccepted)
    }

    /// `/login?error=...` or `/login?notice=...`.
    pub fn login_path(self) -> String {
        let key = if self.is_error() { "error" } else { "notice" };
        format!("/login?{key}={}", self.code())
    }
}

mod secret_string {
    use secrecy::SecretString;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use secrecy::ExposeSecret;
        serializer.serialize_str(secret.expose_secret())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(s.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jwt(exp: i64) -> String {
        let header = BASE64_URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let claims = BASE64_URL_SAFE_NO_PAD.encode(format!(r#"{{"exp":{exp},"user_id":7}}"#));
        format!("{header}.{claims}.signature")
    }

    fn pair(access_exp: i64, refresh_exp: i64) -> TokenPair {
        TokenPair {
            access: jwt(access_exp).into(),
            refresh: jwt(refresh_exp).into(),
        }
    }

    #[test]
    fn reads_expiry_claim() {
        let tokens = pair(1_700_000_000, 1_700_086_400);
        assert_eq!(
            tokens.access_expires_at(),
            Some(Timestamp::from_second(1_700_000_000).unwrap())
        );
    }

    #[test]
    fn expiry_includes_skew() {
        let tokens = pair(1_700_000_000, 1_700_086_400);

        let well_before = Timestamp::from_second(1_699_999_000).unwrap();
        assert!(!tokens.is_access_expired(well_before));

        let just_before = Timestamp::from_second(1_699_999_990).unwrap();
        assert!(tokens.is_access_expired(just_before));
        assert!(!tokens.is_refresh_expired(just_before));
    }

    #[test]
    fn opaque_tokens_never_expire() {
        let tokens = TokenPair {
            access: "opaque".to_string().into(),
            refresh: "also-opaque".to_string().into(),
        };
        assert!(!tokens.is_access_expired(Timestamp::now()));
    }

    #[test]
    fn refresh_keeps_refresh_token() {
        let tokens = pair(1, 2).with_access(RefreshedAccess {
            access: jwt(3).into(),
        });
        assert_eq!(tokens.access.expose_secret(), jwt(3));
        assert_eq!(tokens.refresh.expose_secret(), jwt(2));
    }

    #[test]
    fn deserializes_login_response() {
        let tokens: TokenPair =
            serde_json::from_str(r#"{"access": "a.b.c", "refresh": "d.e.f"}"#).unwrap();
        assert_eq!(tokens.access.expose_secret(), "a.b.c");
        assert_eq!(tokens.refresh.expose_secret(), "d.e.f");
    }

    #[test]
    fn login_failures_by_status() {
        assert_eq!(
            LoginNotice::for_login_status(401).message(),
            "Invalid username or password"
        );
        assert_eq!(
            LoginNotice::for_login_status(400).message(),
            "Please check your credentials."
        );
        assert_eq!(
            LoginNotice::for_login_status(502).message(),
            "Login failed. Please try again."
        );
    }

    #[test]
    fn login_paths_round_trip_codes() {
        for notice in LoginNotice::ALL {
            let path = notice.login_path();
            let code = path.split_once('=').unwrap().1;
            assert_eq!(LoginNotice::from_code(code), Some(notice));
        }
        assert_eq!(
            LoginNotice::InvitationAccepted.login_path(),
            "/login?notice=invitation_accepted"
        );
        assert_eq!(LoginNotice::from_code("nope"), None);
    }
}
