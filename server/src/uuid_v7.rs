use base64::{Engine, prelude::BASE64_URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use secrecy::ExposeSecret;
use sha2::Sha256;
use types::{Result, err};
use uuid::Uuid;

use crate::CONFIG;

type HmacSha256 = Hmac<Sha256>;

/// Session ids travel as `<uuid>.<hmac>` so a cookie can't be forged.
pub trait UuidV7Ext: Sized {
    fn from_token(token: &str) -> Result<Self>;
    fn as_token(&self) -> Result<String>;
}

impl UuidV7Ext for Uuid {
    fn from_token(token: &str) -> Result<Self> {
        verify(token, CONFIG.signing_secret.expose_secret().as_bytes())
    }

    fn as_token(&self) -> Result<String> {
        sign(*self, CONFIG.signing_secret.expose_secret().as_bytes())
    }
}

fn mac(key: &[u8], id_str: &str) -> Result<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(key).map_err(|_| err!("invalid signing key"))?;
    mac.update(id_str.as_bytes());
    Ok(mac)
}

pub(crate) fn sign(id: Uuid, key: &[u8]) -> Result<String> {
    let id_str = id.simple().to_string();
    let signature = BASE64_URL_SAFE_NO_PAD.encode(mac(key, &id_str)?.finalize().into_bytes());
    Ok(format!("{id_str}.{signature}"))
}

pub(crate) fn verify(token: &str, key: &[u8]) -> Result<Uuid> {
    let (id_str, signature_b64) = token
        .split_once('.')
        .ok_or_else(|| err!("invalid token format"))?;

    let signature = BASE64_URL_SAFE_NO_PAD.decode(signature_b64)?;
    mac(key, id_str)?
        .verify_slice(&signature)
        .map_err(|_| err!("bad token signature"))?;

    Ok(Uuid::parse_str(id_str)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &[u8] = b"test-signing-key";

    #[test]
    fn signed_tokens_verify() {
        let id = Uuid::now_v7();
        let token = sign(id, KEY).unwrap();
        assert_eq!(verify(&token, KEY).unwrap(), id);
    }

    #[test]
    fn tampering_is_rejected() {
        let token = sign(Uuid::now_v7(), KEY).unwrap();
        let (_, signature) = token.split_once('.').unwrap();

        let forged = format!("{}.{signature}", Uuid::now_v7().simple());
        assert!(verify(&forged, KEY).is_err());
        assert!(verify(&token, b"another-key").is_err());
        assert!(verify("no-dot-here", KEY).is_err());
    }
}
