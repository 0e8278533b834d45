use crate::claims::{ClaimMap, ClaimSet};
use crate::engine::{IssuedToken, TokenEngine};
use crate::error::AuthResult;
use crate::serializer::TokenSerializer;

/// Object-safe view of a token engine, so callers can hold
/// `Arc<dyn TokenService>` regardless of the token flavour.
pub trait TokenService: Send + Sync {
    fn generate_token(&self, custom_claims: Option<&ClaimMap>) -> AuthResult<IssuedToken>;
    fn refresh_token(&self, token: &str) -> AuthResult<IssuedToken>;
    fn validate_token(&self, token: &str) -> AuthResult<ClaimSet>;
}

impl<S> TokenService for TokenEngine<S>
where
    S: TokenSerializer,
{
    fn generate_token(&self, custom_claims: Option<&ClaimMap>) -> AuthResult<IssuedToken> {
        TokenEngine::generate_token(self, custom_claims)
    }

    fn refresh_token(&self, token: &str) -> AuthResult<IssuedToken> {
        TokenEngine::refresh_token(self, token)
    }

    fn validate_token(&self, token: &str) -> AuthResult<ClaimSet> {
        TokenEngine::validate_token(self, token)
    }
}
