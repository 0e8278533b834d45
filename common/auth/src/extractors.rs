use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::{header::AUTHORIZATION, request::Parts, HeaderValue};

use crate::claims::ClaimSet;
use crate::error::{AuthError, AuthResult};
use crate::service::TokenService;

/// Validated bearer token pulled from the `Authorization` header.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub claims: ClaimSet,
    pub token: String,
}

impl AuthContext {
    pub fn into_claims(self) -> ClaimSet {
        self.claims
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    Arc<dyn TokenService>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let tokens = Arc::<dyn TokenService>::from_ref(state);

        let header_value = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingAuthorization)?;

        let token = parse_bearer(header_value)?;
        let claims = tokens.validate_token(&token)?;

        Ok(Self { claims, token })
    }
}

// The scheme is matched case-insensitively; the token itself is opaque.
fn parse_bearer(value: &HeaderValue) -> AuthResult<String> {
    let (scheme, token) = value
        .to_str()
        .map_err(|_| AuthError::InvalidAuthorization)?
        .trim()
        .split_once(' ')
        .ok_or(AuthError::InvalidAuthorization)?;

    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(AuthError::InvalidAuthorization);
    }

    Ok(token.to_owned())
}
