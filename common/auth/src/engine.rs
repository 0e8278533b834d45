use std::fmt;

use chrono::{DateTime, Duration, Utc};
use jose_crypto::SecretKey;
use tracing::debug;

use crate::claims::{ClaimMap, ClaimSet};
use crate::clock::{system_time, TimeFunc};
use crate::config::TokenConfig;
use crate::error::{AuthError, AuthResult};
use crate::jwe::DirectEncrypter;
use crate::jws::HmacSigner;
use crate::serializer::TokenSerializer;

/// HMAC-signed JWT engine (`HS256`, `HS384`, `HS512`).
pub type JwtEngine = TokenEngine<HmacSigner>;
/// Direct-key JWE engine (`A*GCM`, `A*CBC-HS*`).
pub type JweEngine = TokenEngine<DirectEncrypter>;

/// A freshly issued compact token and the instant it stops being valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues, validates and refreshes bearer tokens.
///
/// The engine is immutable after construction and holds no per-token state,
/// so one instance can be shared freely across threads.
pub struct TokenEngine<S> {
    serializer: S,
    algorithm: String,
    key: SecretKey,
    issuer: String,
    timeout: Duration,
    max_refresh: Duration,
    time_func: TimeFunc,
}

impl<S> TokenEngine<S>
where
    S: TokenSerializer,
{
    /// Build an engine with the default serializer for `S`.
    pub fn new(
        algorithm: &str,
        key: impl Into<SecretKey>,
        issuer: impl Into<String>,
        timeout: Duration,
        max_refresh: Duration,
    ) -> AuthResult<Self>
    where
        S: Default,
    {
        let config = TokenConfig::new(algorithm, key, issuer)
            .with_timeout(timeout)
            .with_max_refresh(max_refresh);
        Self::from_config(S::default(), config)
    }

    /// Validate `config` against the serializer's allow-list and build the engine.
    pub fn from_config(serializer: S, config: TokenConfig) -> AuthResult<Self> {
        if !serializer.supports(&config.algorithm) {
            return Err(AuthError::InvalidAlgorithm {
                family: serializer.family(),
                algorithm: config.algorithm,
            });
        }

        if config.issuer.trim().is_empty() {
            return Err(AuthError::EmptyIssuer);
        }

        if config.max_refresh <= Duration::zero() {
            return Err(AuthError::NonPositiveMaxRefresh);
        }

        if config.key.is_blank() {
            return Err(AuthError::EmptyKey(serializer.key_name()));
        }

        Ok(Self {
            serializer,
            algorithm: config.algorithm,
            key: config.key,
            issuer: config.issuer,
            timeout: config.timeout,
            max_refresh: config.max_refresh,
            time_func: system_time(),
        })
    }

    /// Replace the clock, typically with a frozen one in tests.
    pub fn with_time_func(mut self, time_func: TimeFunc) -> Self {
        self.time_func = time_func;
        self
    }

    /// Issue a token carrying `custom_claims` plus `exp`, `orig_iat` and `iss`.
    /// Same-named custom claims are overwritten.
    pub fn generate_token(&self, custom_claims: Option<&ClaimMap>) -> AuthResult<IssuedToken> {
        let mut claims = ClaimSet::from_custom(custom_claims);
        claims.set_issuer(&self.issuer);
        self.issue(claims)
    }

    /// Check a token and return its full claims set.
    ///
    /// Checks run in a fixed order and stop at the first failure: signature
    /// or decryption, `orig_iat` against the refresh window, `exp`, then `iss`.
    pub fn validate_token(&self, token: &str) -> AuthResult<ClaimSet> {
        let claims = self
            .serializer
            .deserialize(token, self.key.as_bytes(), &self.algorithm)
            .inspect_err(|err| debug!(reason = %err, "token rejected"))?;

        let now = self.now();

        // A window reaching past the representable range never closes.
        let original_issued_at = claims.original_issued_at()?;
        let refresh_floor = now.checked_sub_signed(self.max_refresh);
        if refresh_floor.is_some_and(|floor| original_issued_at < floor.timestamp()) {
            debug!(reason = "refresh window exceeded", "token rejected");
            return Err(AuthError::Expired);
        }

        let expires_at = claims.expires_at()?;
        if expires_at < now.timestamp() {
            debug!(reason = "expired", "token rejected");
            return Err(AuthError::Expired);
        }

        if claims.issuer()? != self.issuer {
            debug!(reason = "issuer mismatch", "token rejected");
            return Err(AuthError::InvalidIssuer);
        }

        debug!(algorithm = %self.algorithm, "validated token successfully");
        Ok(claims)
    }

    /// Issue a new token from a valid one, keeping every claim and
    /// restarting both `exp` and `orig_iat` from now.
    ///
    /// Because `orig_iat` moves forward on each refresh, a chain of tokens can
    /// be extended indefinitely as long as each refresh happens within
    /// `max_refresh` of the previous one.
    pub fn refresh_token(&self, token: &str) -> AuthResult<IssuedToken> {
        let claims = self.validate_token(token)?;
        self.issue(claims)
    }

    fn issue(&self, mut claims: ClaimSet) -> AuthResult<IssuedToken> {
        let now = self.now();
        let expires_at = now.checked_add_signed(self.timeout).ok_or_else(|| {
            AuthError::Serialization(format!(
                "token lifetime of {}s overflows the supported date range",
                self.timeout.num_seconds()
            ))
        })?;
        claims.stamp(expires_at.timestamp(), now.timestamp());

        let token = self
            .serializer
            .serialize(&claims, self.key.as_bytes(), &self.algorithm)?;
        debug!(algorithm = %self.algorithm, %expires_at, "issued token");

        Ok(IssuedToken { token, expires_at })
    }

    fn now(&self) -> DateTime<Utc> {
        (self.time_func)()
    }
}

impl<S> fmt::Debug for TokenEngine<S>
where
    S: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenEngine")
            .field("serializer", &self.serializer)
            .field("algorithm", &self.algorithm)
            .field("key", &self.key)
            .field("issuer", &self.issuer)
            .field("timeout", &self.timeout)
            .field("max_refresh", &self.max_refresh)
            .finish_non_exhaustive()
    }
}
