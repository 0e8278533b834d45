use jose_crypto::{
    decode_segment, encode_segment, open, seal, ContentEncryption, Sealed,
    CONTENT_ENCRYPTION_ALGORITHMS,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::claims::ClaimSet;
use crate::error::{AuthError, AuthResult};
use crate::serializer::TokenSerializer;

pub const ENCRYPTION_ALGORITHMS: &[&str] = CONTENT_ENCRYPTION_ALGORITHMS;

const DIRECT_KEY_AGREEMENT: &str = "dir";
const TOKEN_TYPE: &str = "JWT";

#[derive(Debug, Serialize, Deserialize)]
struct JweHeader {
    alg: String,
    enc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    typ: Option<String>,
}

/// Compact JWE tokens using a shared symmetric key as the content
/// encryption key (`"alg": "dir"`).
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectEncrypter;

impl DirectEncrypter {
    fn content_encryption(name: &str) -> AuthResult<ContentEncryption> {
        name.parse().map_err(|_| AuthError::InvalidAlgorithm {
            family: "encryption",
            algorithm: name.to_string(),
        })
    }
}

impl TokenSerializer for DirectEncrypter {
    fn algorithms(&self) -> &'static [&'static str] {
        ENCRYPTION_ALGORITHMS
    }

    fn family(&self) -> &'static str {
        "encryption"
    }

    fn key_name(&self) -> &'static str {
        "encryption key"
    }

    fn serialize(&self, claims: &ClaimSet, key: &[u8], algorithm: &str) -> AuthResult<String> {
        let enc = Self::content_encryption(algorithm)?;
        let header = JweHeader {
            alg: DIRECT_KEY_AGREEMENT.to_string(),
            enc: enc.as_str().to_string(),
            typ: Some(TOKEN_TYPE.to_string()),
        };

        let header_json =
            serde_json::to_vec(&header).map_err(|err| AuthError::Serialization(err.to_string()))?;
        let payload =
            serde_json::to_vec(claims).map_err(|err| AuthError::Serialization(err.to_string()))?;
        let protected = encode_segment(header_json);

        let sealed = seal(enc, key, protected.as_bytes(), &payload)
            .map_err(|err| AuthError::Serialization(err.to_string()))?;

        Ok(format!(
            "{protected}..{}.{}.{}",
            encode_segment(&sealed.iv),
            encode_segment(&sealed.ciphertext),
            encode_segment(&sealed.tag)
        ))
    }

    fn deserialize(&self, token: &str, key: &[u8], algorithm: &str) -> AuthResult<ClaimSet> {
        let enc = Self::content_encryption(algorithm)?;

        let parts: Vec<&str> = token.split('.').collect();
        let [protected, encrypted_key, iv, ciphertext, tag] = parts.as_slice() else {
            return Err(AuthError::Verification(
                "compact JWE format must have five parts".to_string(),
            ));
        };

        let header: JweHeader = serde_json::from_slice(&decode_segment(protected)?)
            .map_err(|err| AuthError::Verification(format!("invalid JWE header: {err}")))?;
        if header.alg != DIRECT_KEY_AGREEMENT {
            return Err(AuthError::Verification(format!(
                "unexpected key management algorithm '{}'",
                header.alg
            )));
        }
        if header.enc != enc.as_str() {
            return Err(AuthError::Verification(format!(
                "unexpected content encryption algorithm '{}'",
                header.enc
            )));
        }
        if !encrypted_key.is_empty() {
            return Err(AuthError::Verification(
                "direct encryption must not carry an encrypted key".to_string(),
            ));
        }

        let sealed = Sealed {
            iv: decode_segment(iv)?,
            ciphertext: decode_segment(ciphertext)?,
            tag: decode_segment(tag)?,
        };
        let payload = open(enc, key, protected.as_bytes(), &sealed)?;

        let value: Value = serde_json::from_slice(&payload)
            .map_err(|err| AuthError::Verification(format!("invalid claims payload: {err}")))?;
        ClaimSet::try_from(value)
    }
}
