use axum::extract::{FromRef, FromRequestParts, MatchedPath};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::{async_trait, RequestPartsExt};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use abi::errors::Error;

use crate::AppState;

const AUTHORIZATION_HEADER: &str = "Authorization";
const BEARER: &str = "Bearer";

const EXPIRES: i64 = 60 * 60 * 4;

/// issued by the session collaborator, `sub` is the user id
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(sub: String) -> Self {
        let now = chrono::Utc::now().timestamp();
        let exp = now + EXPIRES;
        Self { sub, exp, iat: now }
    }

    pub fn encode(&self, secret: &str) -> Result<String, Error> {
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .map_err(|e| Error::internal_with_details(e.to_string()))
    }
}

/// The caller's user id, taken from a bearer token.
pub struct AuthUser(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = (StatusCode, Error);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let path = parts
            .extract::<MatchedPath>()
            .await
            .map(|path| path.as_str().to_owned())
            .unwrap_or_default();
        let app_state = AppState::from_ref(state);

        let unauthorized = |details: String| {
            (
                StatusCode::UNAUTHORIZED,
                Error::unauthorized_with_details(details),
            )
        };

        let Some(header) = parts.headers.get(AUTHORIZATION_HEADER) else {
            return Err(unauthorized(format!("missing token for {}", path)));
        };
        let header = header.to_str().unwrap_or("");
        let Some(token) = header
            .strip_prefix(BEARER)
            .map(str::trim)
            .filter(|t| !t.is_empty())
        else {
            return Err(unauthorized(format!("malformed token for {}", path)));
        };

        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(app_state.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|err| {
            debug!("token rejected on {}: {}", path, err);
            unauthorized(err.to_string())
        })?
        .claims;

        Ok(Self(claims.sub))
    }
}
