#![allow(dead_code)]

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use auth_tokens::{
    AuthResult, ClaimMap, JweEngine, JwtEngine, TimeFunc, TokenService, ENCRYPTION_ALGORITHMS,
    SIGNING_ALGORITHMS,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::json;

pub const SECRET_KEY: &str = "s4IIq9lQm2SKBlJoHAWzkRGSNaPCLZw2Ed927XEcBMrvqyU0wpPgTttj2HAvYb9S";
pub const ENCRYPTION_KEY: &str = "s4IIq9lQm2SKBlJoHAWzkRGSNaPCLZw2";
pub const ISSUER: &str = "lelinu";

/// Clock whose time only moves when a test says so.
#[derive(Clone)]
pub struct ManualClock(Arc<AtomicI64>);

impl ManualClock {
    pub fn at(unix_seconds: i64) -> Self {
        Self(Arc::new(AtomicI64::new(unix_seconds)))
    }

    pub fn starting_now() -> Self {
        Self::at(Utc::now().timestamp())
    }

    pub fn advance(&self, by: Duration) {
        self.0.fetch_add(by.num_seconds(), Ordering::SeqCst);
    }

    pub fn now(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.0.load(Ordering::SeqCst), 0)
            .single()
            .expect("valid timestamp")
    }

    pub fn time_func(&self) -> TimeFunc {
        let clock = self.clone();
        Arc::new(move || clock.now())
    }
}

/// The two token flavours; every lifecycle property is checked against both.
#[derive(Debug, Clone, Copy)]
pub enum Flavour {
    Jwt,
    Jwe,
}

impl Flavour {
    pub const ALL: [Flavour; 2] = [Flavour::Jwt, Flavour::Jwe];

    pub fn algorithm(&self) -> &'static str {
        match self {
            Flavour::Jwt => "HS256",
            Flavour::Jwe => "A256GCM",
        }
    }

    pub fn algorithms(&self) -> &'static [&'static str] {
        match self {
            Flavour::Jwt => SIGNING_ALGORITHMS,
            Flavour::Jwe => ENCRYPTION_ALGORITHMS,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Flavour::Jwt => SECRET_KEY,
            Flavour::Jwe => ENCRYPTION_KEY,
        }
    }

    pub fn build(
        &self,
        algorithm: &str,
        key: &str,
        issuer: &str,
        timeout: Duration,
        max_refresh: Duration,
    ) -> AuthResult<Arc<dyn TokenService>> {
        let service: Arc<dyn TokenService> = match self {
            Flavour::Jwt => Arc::new(JwtEngine::new(algorithm, key, issuer, timeout, max_refresh)?),
            Flavour::Jwe => Arc::new(JweEngine::new(algorithm, key, issuer, timeout, max_refresh)?),
        };
        Ok(service)
    }

    pub fn engine_at(
        &self,
        clock: &ManualClock,
        issuer: &str,
        timeout: Duration,
        max_refresh: Duration,
    ) -> Arc<dyn TokenService> {
        match self {
            Flavour::Jwt => Arc::new(
                JwtEngine::new(self.algorithm(), self.key(), issuer, timeout, max_refresh)
                    .expect("jwt engine")
                    .with_time_func(clock.time_func()),
            ),
            Flavour::Jwe => Arc::new(
                JweEngine::new(self.algorithm(), self.key(), issuer, timeout, max_refresh)
                    .expect("jwe engine")
                    .with_time_func(clock.time_func()),
            ),
        }
    }

    /// Engine with one hour lifetime and refresh window.
    pub fn hourly(&self, clock: &ManualClock) -> Arc<dyn TokenService> {
        self.engine_at(clock, ISSUER, Duration::hours(1), Duration::hours(1))
    }
}

pub fn custom_claims() -> ClaimMap {
    json!({"id": 1, "role": "user", "merchantID": "1234546"})
        .as_object()
        .cloned()
        .expect("object")
}
