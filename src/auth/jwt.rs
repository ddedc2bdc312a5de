use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{config::JwtConfig, error::ApiError, state::AppState, users::repo::User};

pub const SESSION_COOKIE: &str = "jwt";

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub iat: usize,
    pub exp: usize,
}

#[derive(Debug, PartialEq, Eq)]
pub enum TokenError {
    Expired,
    Invalid,
}

/// Signing and verification keys plus the cookie policy, built once from the
/// startup config.
#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub session_ttl: TimeDuration,
    pub cookie_secure: bool,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        let JwtConfig {
            secret,
            ttl_minutes,
            cookie_secure,
        } = state.config.jwt.clone();
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            session_ttl: TimeDuration::minutes(ttl_minutes),
            cookie_secure,
        }
    }
}

impl JwtKeys {
    pub fn sign_session(&self, user_id: Uuid) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + self.session_ttl;
        let claims = Claims {
            sub: user_id,
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = %user_id, "session token signed");
        Ok(token)
    }

    pub fn verify_session(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })
    }

    /// HTTP-only session cookie whose lifetime mirrors the token expiry.
    pub fn session_cookie(&self, token: &str) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, token.to_owned()))
            .path("/")
            .http_only(true)
            .secure(self.cookie_secure)
            .same_site(SameSite::Lax)
            .max_age(self.session_ttl)
            .build()
    }

    /// Replacement cookie that immediately expires the session on the client.
    pub fn clear_session_cookie(&self) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, ""))
            .path("/")
            .http_only(true)
            .secure(self.cookie_secure)
            .same_site(SameSite::Lax)
            .max_age(TimeDuration::ZERO)
            .build()
    }
}

/// Token-level guard: verifies the session token and yields the subject id
/// without touching the database.
pub struct AuthUser(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);

        // Session cookie first, Authorization header as a fallback.
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar
            .get(SESSION_COOKIE)
            .map(|c| c.value().to_owned())
            .or_else(|| {
                parts
                    .headers
                    .get(axum::http::header::AUTHORIZATION)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.strip_prefix("Bearer "))
                    .map(|v| v.to_owned())
            })
            .ok_or_else(|| {
                ApiError::Auth("You are not logged in. Please log in to get access.".into())
            })?;

        let claims = keys.verify_session(&token).map_err(|e| {
            warn!("session token rejected");
            match e {
                TokenError::Expired => {
                    ApiError::Auth("Your session has expired. Please log in again.".into())
                }
                TokenError::Invalid => {
                    ApiError::Auth("Invalid token. Please log in again.".into())
                }
            }
        })?;

        Ok(AuthUser(claims.sub))
    }
}

/// Full access guard: verifies the token, then resolves the identity so the
/// handler runs with the account attached. Rejects tokens whose subject no
/// longer exists.
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(user_id) = AuthUser::from_request_parts(parts, state).await?;

        let user = User::find_by_id(&state.db, user_id)
            .await?
            .ok_or_else(|| {
                warn!(user_id = %user_id, "token subject no longer exists");
                ApiError::Auth("The user belonging to this token no longer exists.".into())
            })?;

        Ok(CurrentUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_keys() -> JwtKeys {
        let state = AppState::fake();
        JwtKeys::from_ref(&state)
    }

    #[tokio::test]
    async fn sign_and_verify_roundtrip() {
        let keys = make_keys();
        let user_id = Uuid::new_v4();
        let token = keys.sign_session(user_id).expect("sign session");
        let claims = keys.verify_session(&token).expect("verify token");
        assert_eq!(claims.sub, user_id);
    }

    #[tokio::test]
    async fn verify_rejects_an_expired_token() {
        // TTL far enough in the past to clear the decoder's leeway.
        let mut keys = make_keys();
        keys.session_ttl = TimeDuration::minutes(-5);
        let token = keys.sign_session(Uuid::new_v4()).expect("sign session");
        assert_eq!(keys.verify_session(&token).unwrap_err(), TokenError::Expired);
    }

    #[tokio::test]
    async fn verify_rejects_garbage() {
        let keys = make_keys();
        assert_eq!(
            keys.verify_session("not-a-token").unwrap_err(),
            TokenError::Invalid
        );
    }

    #[tokio::test]
    async fn verify_rejects_a_tampered_token() {
        let keys = make_keys();
        let mut token = keys.sign_session(Uuid::new_v4()).expect("sign session");
        token.push('x');
        assert_eq!(keys.verify_session(&token).unwrap_err(), TokenError::Invalid);
    }

    #[tokio::test]
    async fn verify_rejects_a_foreign_signature() {
        let keys = make_keys();
        let other = JwtKeys {
            encoding: EncodingKey::from_secret(b"other-secret"),
            decoding: DecodingKey::from_secret(b"other-secret"),
            session_ttl: TimeDuration::minutes(5),
            cookie_secure: false,
        };
        let token = other.sign_session(Uuid::new_v4()).expect("sign session");
        assert_eq!(keys.verify_session(&token).unwrap_err(), TokenError::Invalid);
    }

    #[tokio::test]
    async fn session_cookie_is_http_only_and_mirrors_the_ttl() {
        let keys = make_keys();
        let cookie = keys.session_cookie("token-value");
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.value(), "token-value");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.max_age(), Some(keys.session_ttl));
    }

    #[tokio::test]
    async fn clear_cookie_empties_the_session() {
        let keys = make_keys();
        let cookie = keys.clear_session_cookie();
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(TimeDuration::ZERO));
    }
}
