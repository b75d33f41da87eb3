// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session cookie handling and the authentication guard.
//!
//! The cookie is an HS256 JWT signed with our key. It carries the auth
//! provider's tokens plus the role resolved at sign-in, so pages can render
//! without a provider round trip.

use crate::config::Config;
use crate::models::{User, UserRole};
use crate::services::auth::AuthSession;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::Method,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

pub const SESSION_COOKIE: &str = "pushcard_session";

const SESSION_TTL_SECS: usize = 7 * 24 * 60 * 60; // 7 days
const REFRESH_MARGIN_SECS: i64 = 30;

/// JWT claims stored in the session cookie.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionClaims {
    /// Provider user id
    pub sub: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    pub role: UserRole,
    #[serde(default)]
    pub admin: bool,
    /// Provider access token, forwarded as the bearer token
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

/// Authenticated user available to handlers.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: String,
    pub email: String,
    pub name: Option<String>,
    pub role: UserRole,
    pub is_admin: bool,
    pub access_token: String,
}

impl From<&SessionClaims> for Session {
    fn from(claims: &SessionClaims) -> Self {
        Self {
            user_id: claims.sub.clone(),
            email: claims.email.clone(),
            name: claims.name.clone(),
            role: claims.role,
            is_admin: claims.admin,
            access_token: claims.access_token.clone(),
        }
    }
}

impl Session {
    /// Customers are sent to their wallet instead of merchant pages.
    pub fn guard_merchant(&self) -> Option<Redirect> {
        (self.role != UserRole::Merchant).then(|| Redirect::to(UserRole::Customer.home_path()))
    }

    pub fn guard_admin(&self) -> Option<Redirect> {
        (!self.is_admin).then(|| Redirect::to(UserRole::Customer.home_path()))
    }
}

/// Admins are listed in config or flagged in provider metadata.
pub fn is_admin(user: &User, config: &Config) -> bool {
    let listed = user
        .email
        .as_deref()
        .is_some_and(|email| config.is_admin_email(email));
    listed || user.user_metadata.role.as_deref() == Some("admin")
}

fn now_secs() -> anyhow::Result<usize> {
    Ok(SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as usize)
}

/// Build claims for a freshly obtained provider session.
pub fn claims_for(session: &AuthSession, role: UserRole, config: &Config) -> anyhow::Result<SessionClaims> {
    let now = now_secs()?;
    Ok(SessionClaims {
        sub: session.user.id.clone(),
        email: session.user.email.clone().unwrap_or_default(),
        name: session.user.full_name(),
        role,
        admin: is_admin(&session.user, config),
        access_token: session.access_token.clone(),
        refresh_token: session.refresh_token.clone(),
        iat: now,
        exp: now + SESSION_TTL_SECS,
    })
}

/// Sign session claims into a JWT.
pub fn create_session_token(claims: &SessionClaims, signing_key: &[u8]) -> anyhow::Result<String> {
    Ok(encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(signing_key),
    )?)
}

/// Verify and decode a session JWT.
pub fn decode_session_token(token: &str, signing_key: &[u8]) -> Option<SessionClaims> {
    let key = DecodingKey::from_secret(signing_key);
    let validation = Validation::new(Algorithm::HS256);
    decode::<SessionClaims>(token, &key, &validation)
        .map(|data| data.claims)
        .ok()
}

/// Session cookie holding `token`.
pub fn session_cookie(token: String, config: &Config) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.secure_cookies())
        .max_age(time::Duration::seconds(SESSION_TTL_SECS as i64))
        .build()
}

/// Add a signed session cookie for `claims` to `jar`.
pub fn start_session(jar: CookieJar, claims: &SessionClaims, config: &Config) -> anyhow::Result<CookieJar> {
    let token = create_session_token(claims, &config.session_signing_key)?;
    Ok(jar.add(session_cookie(token, config)))
}

/// Remove the session cookie with matching attributes.
pub fn end_session(jar: CookieJar, config: &Config) -> CookieJar {
    jar.remove(
        Cookie::build(SESSION_COOKIE)
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(config.secure_cookies()),
    )
}

/// Decode the session from the cookie jar without refreshing it.
pub fn session_claims(jar: &CookieJar, config: &Config) -> Option<SessionClaims> {
    jar.get(SESSION_COOKIE)
        .and_then(|cookie| decode_session_token(cookie.value(), &config.session_signing_key))
}

/// `exp` of a provider JWT, read without verification.
pub fn token_expiry(token: &str) -> Option<i64> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    let value: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
    value.get("exp")?.as_i64()
}

fn access_token_expired(token: &str) -> bool {
    let now = chrono::Utc::now().timestamp();
    token_expiry(token).is_some_and(|exp| exp <= now + REFRESH_MARGIN_SECS)
}

/// Send the visitor to sign in, returning them here afterwards.
///
/// Only GET requests can be replayed; form posts return to the role's home
/// page when the role is known.
fn login_redirect(request: &Request, role: Option<UserRole>) -> Redirect {
    let next = if request.method() == Method::GET {
        request.uri().path_and_query().map(|pq| pq.as_str())
    } else {
        role.map(UserRole::home_path)
    };
    match next {
        Some(next) => Redirect::to(&format!("/login?next={}", urlencoding::encode(next))),
        None => Redirect::to("/login"),
    }
}

/// Middleware that requires a valid session, refreshing the provider token
/// when it has expired.
pub async fn require_session(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(mut claims) = session_claims(&jar, &state.config) else {
        return login_redirect(&request, None).into_response();
    };

    let mut jar = jar;
    if access_token_expired(&claims.access_token) {
        let Some(refresh_token) = claims.refresh_token.clone() else {
            tracing::debug!(user_id = %claims.sub, "Provider token expired without refresh token");
            let redirect = login_redirect(&request, Some(claims.role));
            return (end_session(jar, &state.config), redirect).into_response();
        };

        match state.auth.refresh(&refresh_token).await {
            Ok(fresh) => {
                claims.access_token = fresh.access_token;
                claims.refresh_token = fresh.refresh_token.or(Some(refresh_token));
                jar = match start_session(jar, &claims, &state.config) {
                    Ok(jar) => jar,
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to re-sign session");
                        return crate::error::AppError::Internal(e).into_response();
                    }
                };
                tracing::debug!(user_id = %claims.sub, "Provider session refreshed");
            }
            Err(e) => {
                tracing::info!(user_id = %claims.sub, error = %e, "Session refresh failed");
                let redirect = login_redirect(&request, Some(claims.role));
                return (end_session(jar, &state.config), redirect).into_response();
            }
        }
    }

    request.extensions_mut().insert(Session::from(&claims));
    let response = next.run(request).await;
    (jar, response).into_response()
}

/// Only allow same-site relative paths as post-login targets.
pub fn safe_next_path(next: Option<&str>) -> Option<&str> {
    next.filter(|p| p.starts_with('/') && !p.starts_with("//") && !p.contains('\\'))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn test_claims(role: UserRole, admin: bool) -> SessionClaims {
        let now = now_secs().unwrap();
        SessionClaims {
            sub: "user-1".to_string(),
            email: "ana@example.com".to_string(),
            name: Some("Ana Cruz".to_string()),
            role,
            admin,
            access_token: "provider-token".to_string(),
            refresh_token: None,
            iat: now,
            exp: now + 3600,
        }
    }

    #[test]
    fn test_session_token_round_trip() {
        let key = b"test_session_key_32_bytes_min!!";
        let claims = test_claims(UserRole::Merchant, false);

        let token = create_session_token(&claims, key).unwrap();
        let decoded = decode_session_token(&token, key).unwrap();

        assert_eq!(decoded.sub, "user-1");
        assert_eq!(decoded.role, UserRole::Merchant);
        assert_eq!(decoded.access_token, "provider-token");
    }

    #[test]
    fn test_session_token_rejects_other_key() {
        let claims = test_claims(UserRole::Customer, false);
        let token = create_session_token(&claims, b"key-one-key-one-key-one-key-one!").unwrap();
        assert!(decode_session_token(&token, b"key-two-key-two-key-two-key-two!").is_none());
    }

    #[test]
    fn test_token_expiry_reads_payload() {
        let payload = URL_SAFE_NO_PAD.encode(r#"{"sub":"u","exp":1700000000}"#);
        let token = format!("header.{payload}.sig");
        assert_eq!(token_expiry(&token), Some(1_700_000_000));
        assert!(access_token_expired(&token));
        assert_eq!(token_expiry("opaque"), None);
        assert!(!access_token_expired("opaque"));
    }

    #[test]
    fn test_safe_next_path() {
        assert_eq!(safe_next_path(Some("/card/abc")), Some("/card/abc"));
        assert_eq!(safe_next_path(Some("//evil.example")), None);
        assert_eq!(safe_next_path(Some("https://evil.example")), None);
        assert_eq!(safe_next_path(None), None);
    }

    #[test]
    fn test_admin_resolution() {
        let config = Config::test_default();
        let mut user = User {
            id: "u".to_string(),
            email: Some("Admin@PushCard.com".to_string()),
            ..Default::default()
        };
        assert!(is_admin(&user, &config));

        user.email = Some("someone@example.com".to_string());
        assert!(!is_admin(&user, &config));

        user.user_metadata.role = Some("admin".to_string());
        assert!(is_admin(&user, &config));
    }
}
