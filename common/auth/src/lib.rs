pub mod claims;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod extractors;
pub mod jwe;
pub mod jws;
pub mod serializer;
pub mod service;

pub use claims::{ClaimMap, ClaimSet, EXPIRES_AT, ISSUER, ORIGINAL_ISSUED_AT, RESERVED_CLAIMS};
pub use clock::{frozen_at, system_time, TimeFunc};
pub use config::{env_or, TokenConfig};
pub use engine::{IssuedToken, JweEngine, JwtEngine, TokenEngine};
pub use error::{AuthError, AuthResult, ErrorKind};
pub use extractors::AuthContext;
pub use jose_crypto::SecretKey;
pub use jwe::{DirectEncrypter, ENCRYPTION_ALGORITHMS};
pub use jws::{HmacSigner, SIGNING_ALGORITHMS};
pub use serializer::TokenSerializer;
pub use service::TokenService;
