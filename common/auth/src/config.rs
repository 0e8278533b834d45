use std::env;

use chrono::Duration;
use jose_crypto::SecretKey;

use crate::error::{AuthError, AuthResult};

const DEFAULT_TIMEOUT_HOURS: i64 = 1;
const DEFAULT_MAX_REFRESH_HOURS: i64 = 1;

/// Runtime configuration for a token engine.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// JWS `alg` or JWE `enc` identifier.
    pub algorithm: String,
    /// HMAC secret or direct content encryption key.
    pub key: SecretKey,
    /// Value stamped into and required from the `iss` claim.
    pub issuer: String,
    /// Lifetime of every issued or refreshed token.
    pub timeout: Duration,
    /// Maximum age of `orig_iat` for a token to remain valid.
    pub max_refresh: Duration,
}

impl TokenConfig {
    /// Construct config with one hour lifetime and one hour refresh window.
    pub fn new(
        algorithm: impl Into<String>,
        key: impl Into<SecretKey>,
        issuer: impl Into<String>,
    ) -> Self {
        Self {
            algorithm: algorithm.into(),
            key: key.into(),
            issuer: issuer.into(),
            timeout: Duration::hours(DEFAULT_TIMEOUT_HOURS),
            max_refresh: Duration::hours(DEFAULT_MAX_REFRESH_HOURS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_refresh(mut self, max_refresh: Duration) -> Self {
        self.max_refresh = max_refresh;
        self
    }

    /// Load `<PREFIX>_ALGORITHM`, `<PREFIX>_KEY` (or `<PREFIX>_KEY_BASE64`),
    /// `<PREFIX>_ISSUER`, `<PREFIX>_TIMEOUT_HOURS` and
    /// `<PREFIX>_MAX_REFRESH_HOURS` from the environment.
    ///
    /// Values are only checked for presence and syntax here; the engine
    /// applies the semantic checks when it is constructed.
    pub fn from_env(prefix: &str) -> AuthResult<Self> {
        let algorithm = required_env(&setting(prefix, "ALGORITHM"))?;
        let key = key_from_env(prefix)?;
        let issuer = env::var(setting(prefix, "ISSUER"))
            .map_err(|_| AuthError::MissingSetting(setting(prefix, "ISSUER")))?;
        let timeout = hours_from_env(&setting(prefix, "TIMEOUT_HOURS"), DEFAULT_TIMEOUT_HOURS)?;
        let max_refresh = hours_from_env(
            &setting(prefix, "MAX_REFRESH_HOURS"),
            DEFAULT_MAX_REFRESH_HOURS,
        )?;

        Ok(Self {
            algorithm,
            key,
            issuer,
            timeout,
            max_refresh,
        })
    }
}

/// Read an environment variable, falling back when it is unset or blank.
pub fn env_or(key: &str, fallback: &str) -> String {
    env::var(key)
        .ok()
        .and_then(|value| normalize_optional(&value))
        .unwrap_or_else(|| fallback.to_string())
}

fn setting(prefix: &str, name: &str) -> String {
    format!("{}_{name}", prefix.trim_end_matches('_'))
}

fn required_env(name: &str) -> AuthResult<String> {
    env::var(name)
        .ok()
        .and_then(|value| normalize_optional(&value))
        .ok_or_else(|| AuthError::MissingSetting(name.to_string()))
}

// The raw key is not trimmed so blank keys reach the engine's own check.
fn key_from_env(prefix: &str) -> AuthResult<SecretKey> {
    if let Ok(raw) = env::var(setting(prefix, "KEY")) {
        return Ok(SecretKey::from(raw));
    }

    let name = setting(prefix, "KEY_BASE64");
    match env::var(&name) {
        Ok(encoded) => SecretKey::from_base64(&encoded).map_err(|_| AuthError::InvalidSetting {
            name,
            value: "<redacted>".to_string(),
        }),
        Err(_) => Err(AuthError::MissingSetting(setting(prefix, "KEY"))),
    }
}

fn hours_from_env(name: &str, default: i64) -> AuthResult<Duration> {
    let Some(value) = env::var(name)
        .ok()
        .and_then(|value| normalize_optional(&value))
    else {
        return Ok(Duration::hours(default));
    };

    value
        .parse::<i64>()
        .ok()
        .and_then(Duration::try_hours)
        .ok_or_else(|| AuthError::InvalidSetting {
            name: name.to_string(),
            value,
        })
}

fn normalize_optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
