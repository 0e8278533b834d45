use crate::claims::ClaimSet;
use crate::error::AuthResult;

/// Turns a claims set into a compact token string and back.
///
/// `deserialize` must authenticate the token with `key` and reject tokens
/// produced with any algorithm other than `algorithm`. Serialization failures
/// are reported as [`AuthError::Serialization`](crate::AuthError::Serialization);
/// parse and authentication failures as
/// [`AuthError::Verification`](crate::AuthError::Verification).
pub trait TokenSerializer: Send + Sync {
    /// Algorithm identifiers this strategy accepts.
    fn algorithms(&self) -> &'static [&'static str];

    /// Used in configuration errors, e.g. "signing" or "encryption".
    fn family(&self) -> &'static str;

    /// Human name of the key, e.g. "secret key".
    fn key_name(&self) -> &'static str;

    fn serialize(&self, claims: &ClaimSet, key: &[u8], algorithm: &str) -> AuthResult<String>;

    fn deserialize(&self, token: &str, key: &[u8], algorithm: &str) -> AuthResult<ClaimSet>;

    fn supports(&self, algorithm: &str) -> bool {
        self.algorithms().contains(&algorithm)
    }
}
