use std::convert::Infallible;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use common::types::{LEGACY_USERNAME_HEADER, USERNAME_HEADER};
use service::{access::AccessClaim, ConfigService};

/// Cookie that may carry the bearer token for browser callers.
pub const AUTH_COOKIE: &str = "auth_token";

#[derive(Clone, Debug)]
pub struct ServerAuthConfig {
    pub jwt_secret: Option<String>,
    pub trust_username_header: bool,
}

impl From<&configs::AuthConfig> for ServerAuthConfig {
    fn from(cfg: &configs::AuthConfig) -> Self {
        Self { jwt_secret: cfg.jwt_secret.clone(), trust_username_header: cfg.trust_username_header }
    }
}

#[derive(Clone)]
pub struct ServerState {
    pub config_service: Arc<ConfigService>,
    pub auth: ServerAuthConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: usize,
}

/// The request's caller identity, if any could be established. Extraction
/// never fails: an anonymous caller is rejected later by the guard.
#[derive(Debug, Clone)]
pub struct Caller(pub Option<AccessClaim>);

impl Caller {
    pub fn claim(&self) -> Option<&AccessClaim> { self.0.as_ref() }
}

#[async_trait]
impl FromRequestParts<ServerState> for Caller {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &ServerState) -> Result<Self, Self::Rejection> {
        Ok(Caller(resolve_claim(&parts.headers, &state.auth)))
    }
}

/// Username headers first (when trusted), then an HS256 bearer token from
/// `Authorization` or the auth cookie (when a secret is configured).
pub fn resolve_claim(headers: &HeaderMap, auth: &ServerAuthConfig) -> Option<AccessClaim> {
    if auth.trust_username_header {
        for name in [USERNAME_HEADER, LEGACY_USERNAME_HEADER] {
            let claim = headers.get(name).and_then(|v| v.to_str().ok()).and_then(|v| AccessClaim::new(v));
            if claim.is_some() {
                return claim;
            }
        }
    }

    let secret = auth.jwt_secret.as_deref()?;
    let token = bearer_token(headers)
        .or_else(|| CookieJar::from_headers(headers).get(AUTH_COOKIE).map(|c| c.value().to_string()))?;
    match decode::<Claims>(&token, &DecodingKey::from_secret(secret.as_bytes()), &Validation::new(Algorithm::HS256)) {
        Ok(data) => AccessClaim::new(&data.claims.sub),
        Err(e) => {
            debug!(error = %e, "bearer token rejected");
            None
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}

/// Sign a token whose subject is `username`, valid for `ttl_secs`.
pub fn issue_token(secret: &str, username: &str, ttl_secs: u64) -> Result<String, jsonwebtoken::errors::Error> {
    let now = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or_default();
    let claims = Claims { sub: username.to_string(), exp: (now + ttl_secs) as usize };
    encode(&Header::new(Algorithm::HS256), &claims, &EncodingKey::from_secret(secret.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn cfg(secret: Option<&str>, trust: bool) -> ServerAuthConfig {
        ServerAuthConfig { jwt_secret: secret.map(str::to_string), trust_username_header: trust }
    }

    fn user(claim: Option<AccessClaim>) -> Option<String> { claim.map(|c| c.username().to_string()) }

    #[test]
    fn username_headers() {
        let mut h = HeaderMap::new();
        h.insert("x-username", HeaderValue::from_static(" alice "));
        assert_eq!(user(resolve_claim(&h, &cfg(None, true))).as_deref(), Some("alice"));
        assert_eq!(resolve_claim(&h, &cfg(None, false)), None);

        let mut legacy = HeaderMap::new();
        legacy.insert("username", HeaderValue::from_static("bob"));
        assert_eq!(user(resolve_claim(&legacy, &cfg(None, true))).as_deref(), Some("bob"));

        let mut blank = HeaderMap::new();
        blank.insert("x-username", HeaderValue::from_static(""));
        assert_eq!(resolve_claim(&blank, &cfg(None, true)), None);
    }

    #[test]
    fn bearer_and_cookie_tokens() {
        let token = issue_token("secret", "carol", 60).unwrap();

        let mut h = HeaderMap::new();
        h.insert(header::AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {token}")).unwrap());
        assert_eq!(user(resolve_claim(&h, &cfg(Some("secret"), false))).as_deref(), Some("carol"));
        // wrong secret or bearer auth disabled
        assert_eq!(resolve_claim(&h, &cfg(Some("other"), false)), None);
        assert_eq!(resolve_claim(&h, &cfg(None, true)), None);

        let mut c = HeaderMap::new();
        c.insert(header::COOKIE, HeaderValue::from_str(&format!("{AUTH_COOKIE}={token}")).unwrap());
        assert_eq!(user(resolve_claim(&c, &cfg(Some("secret"), true))).as_deref(), Some("carol"));
    }

    #[test]
    fn malformed_authorization() {
        let mut h = HeaderMap::new();
        h.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&h), None);
        h.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer   "));
        assert_eq!(bearer_token(&h), None);
        h.insert(header::AUTHORIZATION, HeaderValue::from_static("bearer xyz"));
        assert_eq!(bearer_token(&h).as_deref(), Some("xyz"));
    }
}
