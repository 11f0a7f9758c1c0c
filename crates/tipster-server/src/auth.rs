//! Admin authentication: HTTP Basic credentials checked against an argon2
//! PHC hash from the server configuration.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::{self, SaltString},
};
use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use rand_core::OsRng;
use tipster_core::store::TipStore;

use crate::{AppState, error::Error};

/// Hash `password` into a PHC string suitable for `admin_password_hash`.
pub fn hash_password(password: &str) -> Result<String, password_hash::Error> {
  let salt = SaltString::generate(&mut OsRng);
  Ok(Argon2::default().hash_password(password.as_bytes(), &salt)?.to_string())
}

// ─── Configuration ───────────────────────────────────────────────────────────

/// The single admin account.
#[derive(Clone)]
pub struct AuthConfig {
  username:      String,
  password_hash: String,
}

impl AuthConfig {
  /// Fails when `password_hash` is not a PHC string, so a typo in the config
  /// stops startup instead of rejecting every admin request.
  pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Result<Self, Error> {
    let password_hash = password_hash.into();
    PasswordHash::new(&password_hash).map_err(|e| Error::InvalidPasswordHash(e.to_string()))?;
    Ok(Self { username: username.into(), password_hash })
  }

  pub fn username(&self) -> &str { &self.username }

  /// Check `credentials` against the configured account.
  pub fn verify(&self, credentials: &BasicCredentials) -> Result<(), Error> {
    if credentials.username != self.username {
      tracing::warn!(username = %credentials.username, "admin login with unknown username");
      return Err(Error::Unauthorized);
    }

    let hash = PasswordHash::new(&self.password_hash).map_err(|_| Error::Unauthorized)?;
    Argon2::default()
      .verify_password(credentials.password.as_bytes(), &hash)
      .map_err(|_| {
        tracing::warn!(username = %credentials.username, "admin login with wrong password");
        Error::Unauthorized
      })
  }
}

// ─── Credentials ─────────────────────────────────────────────────────────────

/// A decoded `Authorization: Basic` header.
#[derive(Debug, PartialEq, Eq)]
pub struct BasicCredentials {
  pub username: String,
  pub password: String,
}

impl BasicCredentials {
  /// `None` when the header is absent, uses another scheme, or is malformed.
  pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, encoded) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
      return None;
    }

    let decoded = String::from_utf8(B64.decode(encoded.trim()).ok()?).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some(Self { username: username.to_owned(), password: password.to_owned() })
  }
}

// ─── Extractor ───────────────────────────────────────────────────────────────

/// Present in a request only after the admin credentials were verified.
pub struct Authenticated;

impl<S> FromRequestParts<AppState<S>> for Authenticated
where
  S: TipStore + Clone + 'static,
{
  type Rejection = Error;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let credentials = BasicCredentials::from_headers(&parts.headers).ok_or(Error::Unauthorized)?;
    state.auth.verify(&credentials)?;
    Ok(Authenticated)
  }
}

#[cfg(test)]
mod tests {
  use axum::http::HeaderValue;

  use super::*;

  fn admin() -> AuthConfig { AuthConfig::new("admin", hash_password("secret").unwrap()).unwrap() }

  fn with_auth(value: &str) -> HeaderMap {
    let mut map = HeaderMap::new();
    map.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
    map
  }

  fn creds(username: &str, password: &str) -> BasicCredentials {
    BasicCredentials { username: username.into(), password: password.into() }
  }

  #[test]
  fn decodes_basic_header() {
    let encoded = B64.encode("admin:pa:ss");
    let parsed = BasicCredentials::from_headers(&with_auth(&format!("basic {encoded}")));
    assert_eq!(parsed, Some(creds("admin", "pa:ss")));
  }

  #[test]
  fn rejects_malformed_headers() {
    assert_eq!(BasicCredentials::from_headers(&HeaderMap::new()), None);
    assert_eq!(BasicCredentials::from_headers(&with_auth("Bearer abc")), None);
    assert_eq!(BasicCredentials::from_headers(&with_auth("Basic !!!not-base64!!!")), None);
    let no_colon = B64.encode("admin");
    assert_eq!(BasicCredentials::from_headers(&with_auth(&format!("Basic {no_colon}"))), None);
  }

  #[test]
  fn verifies_admin_account() {
    let auth = admin();
    assert!(auth.verify(&creds("admin", "secret")).is_ok());
    assert!(matches!(auth.verify(&creds("admin", "wrong")), Err(Error::Unauthorized)));
    assert!(matches!(auth.verify(&creds("root", "secret")), Err(Error::Unauthorized)));
  }

  #[test]
  fn config_rejects_non_phc_hash() {
    assert!(matches!(
      AuthConfig::new("admin", "plaintext"),
      Err(Error::InvalidPasswordHash(_))
    ));
  }
}
