use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use jose_crypto::CryptoError;
use serde::Serialize;
use thiserror::Error;

pub type AuthResult<T> = Result<T, AuthError>;

/// Caller-visible category of an [`AuthError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    BadConfiguration,
    SerializationFailure,
    Unauthorized,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Auth: invalid {family} algorithm '{algorithm}'")]
    InvalidAlgorithm {
        family: &'static str,
        algorithm: String,
    },
    #[error("Auth: issuer cannot be empty")]
    EmptyIssuer,
    #[error("Auth: max refresh should be greater than 0")]
    NonPositiveMaxRefresh,
    #[error("Auth: {0} cannot be empty")]
    EmptyKey(&'static str),
    #[error("Auth: missing configuration value {0}")]
    MissingSetting(String),
    #[error("Auth: invalid configuration value for {name}: '{value}'")]
    InvalidSetting { name: String, value: String },
    #[error("token serialization failed: {0}")]
    Serialization(String),
    #[error("token verification failed: {0}")]
    Verification(String),
    #[error("{0} is missing")]
    MissingClaim(&'static str),
    #[error("{0} must be {1} format")]
    InvalidClaimType(&'static str, &'static str),
    #[error("Token is expired")]
    Expired,
    #[error("Invalid issuer")]
    InvalidIssuer,
    #[error("authorization header missing")]
    MissingAuthorization,
    #[error("authorization header malformed")]
    InvalidAuthorization,
}

impl AuthError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::InvalidAlgorithm { .. }
            | AuthError::EmptyIssuer
            | AuthError::NonPositiveMaxRefresh
            | AuthError::EmptyKey(_)
            | AuthError::MissingSetting(_)
            | AuthError::InvalidSetting { .. } => ErrorKind::BadConfiguration,
            AuthError::Serialization(_) => ErrorKind::SerializationFailure,
            AuthError::Verification(_)
            | AuthError::MissingClaim(_)
            | AuthError::InvalidClaimType(_, _)
            | AuthError::Expired
            | AuthError::InvalidIssuer
            | AuthError::MissingAuthorization
            | AuthError::InvalidAuthorization => ErrorKind::Unauthorized,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.kind() == ErrorKind::Unauthorized
    }

    fn code(&self) -> &'static str {
        match self {
            AuthError::MissingAuthorization | AuthError::InvalidAuthorization => "AUTH_HEADER",
            _ => match self.kind() {
                ErrorKind::BadConfiguration => "AUTH_CONFIG",
                ErrorKind::SerializationFailure => "AUTH_SERIALIZATION",
                ErrorKind::Unauthorized => "AUTH_TOKEN",
            },
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(value: jsonwebtoken::errors::Error) -> Self {
        Self::Verification(value.to_string())
    }
}

impl From<CryptoError> for AuthError {
    fn from(value: CryptoError) -> Self {
        Self::Verification(value.to_string())
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = match self.kind() {
            ErrorKind::BadConfiguration => StatusCode::BAD_REQUEST,
            ErrorKind::SerializationFailure => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
        };
        let code = self.code();

        let body = ErrorBody {
            code,
            message: self.to_string(),
        };
        let mut response = (status, Json(body)).into_response();
        response
            .headers_mut()
            .insert("X-Error-Code", HeaderValue::from_static(code));
        response
    }
}
