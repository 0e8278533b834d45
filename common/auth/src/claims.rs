use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{AuthError, AuthResult};

/// Raw JSON object carried inside a token.
pub type ClaimMap = Map<String, Value>;

pub const EXPIRES_AT: &str = "exp";
pub const ORIGINAL_ISSUED_AT: &str = "orig_iat";
pub const ISSUER: &str = "iss";

/// Keys owned by the token engine. Everything else is a custom claim.
pub const RESERVED_CLAIMS: &[&str] = &[EXPIRES_AT, ORIGINAL_ISSUED_AT, ISSUER];

/// Claims set of a token: engine-managed `exp`, `orig_iat` and `iss` plus
/// any caller-supplied custom claims, which are carried verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClaimSet(ClaimMap);

impl ClaimSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a claims set from optional caller-supplied claims.
    pub fn from_custom(custom: Option<&ClaimMap>) -> Self {
        custom.cloned().map(Self).unwrap_or_default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Claims not managed by the engine.
    pub fn custom_claims(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0
            .iter()
            .filter(|(key, _)| !RESERVED_CLAIMS.contains(&key.as_str()))
    }

    /// `orig_iat` in Unix seconds.
    pub fn original_issued_at(&self) -> AuthResult<i64> {
        self.numeric(ORIGINAL_ISSUED_AT, "Orig Iat")
    }

    /// `exp` in Unix seconds.
    pub fn expires_at(&self) -> AuthResult<i64> {
        self.numeric(EXPIRES_AT, "Exp")
    }

    pub fn issuer(&self) -> AuthResult<&str> {
        match self.0.get(ISSUER) {
            None | Some(Value::Null) => Err(AuthError::MissingClaim("Iss")),
            Some(Value::String(issuer)) => Ok(issuer),
            Some(_) => Err(AuthError::InvalidClaimType("Iss", "string")),
        }
    }

    pub(crate) fn stamp(&mut self, expires_at: i64, issued_at: i64) {
        self.0.insert(EXPIRES_AT.to_string(), expires_at.into());
        self.0.insert(ORIGINAL_ISSUED_AT.to_string(), issued_at.into());
    }

    pub(crate) fn set_issuer(&mut self, issuer: &str) {
        self.0.insert(ISSUER.to_string(), issuer.into());
    }

    // Floats are accepted and truncated; other JOSE libraries emit numeric
    // dates as JSON doubles.
    fn numeric(&self, key: &str, label: &'static str) -> AuthResult<i64> {
        match self.0.get(key) {
            None | Some(Value::Null) => Err(AuthError::MissingClaim(label)),
            Some(Value::Number(number)) => number
                .as_i64()
                .or_else(|| number.as_f64().map(|value| value as i64))
                .ok_or(AuthError::InvalidClaimType(label, "numeric")),
            Some(_) => Err(AuthError::InvalidClaimType(label, "numeric")),
        }
    }
}

impl From<ClaimMap> for ClaimSet {
    fn from(value: ClaimMap) -> Self {
        Self(value)
    }
}

impl From<ClaimSet> for ClaimMap {
    fn from(value: ClaimSet) -> Self {
        value.0
    }
}

impl TryFrom<Value> for ClaimSet {
    type Error = AuthError;

    fn try_from(value: Value) -> AuthResult<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(AuthError::Verification(format!(
                "claims payload must be a JSON object, got {}",
                json_type(&other)
            ))),
        }
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn claims(value: Value) -> ClaimSet {
        ClaimSet::try_from(value).expect("object")
    }

    #[test]
    fn numeric_claims_accept_integers_and_floats() {
        let set = claims(json!({"exp": 1590599944, "orig_iat": 1590599884.7}));
        assert_eq!(set.expires_at().unwrap(), 1590599944);
        assert_eq!(set.original_issued_at().unwrap(), 1590599884);
    }

    #[test]
    fn null_counts_as_missing() {
        let set = claims(json!({"exp": null, "iss": null}));
        assert!(matches!(set.expires_at(), Err(AuthError::MissingClaim("Exp"))));
        assert!(matches!(set.issuer(), Err(AuthError::MissingClaim("Iss"))));
        assert!(matches!(
            set.original_issued_at(),
            Err(AuthError::MissingClaim("Orig Iat"))
        ));
    }

    #[test]
    fn wrong_types_are_reported() {
        let set = claims(json!({"exp": "tomorrow", "orig_iat": [1], "iss": 7}));
        assert_eq!(
            set.expires_at().unwrap_err().to_string(),
            "Exp must be numeric format"
        );
        assert_eq!(
            set.original_issued_at().unwrap_err().to_string(),
            "Orig Iat must be numeric format"
        );
        assert_eq!(set.issuer().unwrap_err().to_string(), "Iss must be string format");
    }

    #[test]
    fn custom_claims_skip_reserved_keys() {
        let set = claims(json!({"exp": 1, "orig_iat": 1, "iss": "lelinu", "role": "user"}));
        let custom: Vec<_> = set.custom_claims().map(|(key, _)| key.as_str()).collect();
        assert_eq!(custom, vec!["role"]);
    }

    #[test]
    fn non_object_payload_is_rejected() {
        let err = ClaimSet::try_from(json!([1, 2])).expect_err("array");
        assert!(err.to_string().contains("got array"));
    }
}
