use std::fmt;
use std::str::FromStr;

use aes::{Aes128, Aes192, Aes256};
use aes_gcm::aead::consts::U12;
use aes_gcm::aead::{Aead, AeadCore, Payload};
use aes_gcm::{Aes128Gcm, Aes256Gcm, AesGcm, KeyInit, Nonce};
use base64::engine::general_purpose::{STANDARD as BASE64_STANDARD, URL_SAFE_NO_PAD};
use base64::Engine as _;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockCipher, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use hmac::{Hmac, Mac};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Sha256, Sha384, Sha512};
use thiserror::Error;
use zeroize::Zeroizing;

type Aes192Gcm = AesGcm<Aes192, U12>;
type HmacSha256 = Hmac<Sha256>;
type HmacSha384 = Hmac<Sha384>;
type HmacSha512 = Hmac<Sha512>;

const GCM_TAG_LENGTH: usize = 16;

/// Identifiers accepted for the JWE `enc` header, in RFC 7518 order.
pub const CONTENT_ENCRYPTION_ALGORITHMS: &[&str] = &[
    "A128CBC-HS256",
    "A192CBC-HS384",
    "A256CBC-HS512",
    "A128GCM",
    "A192GCM",
    "A256GCM",
];

/// Errors produced by the jose-crypto helpers.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("unsupported content encryption algorithm '{0}'")]
    UnsupportedAlgorithm(String),
    #[error("invalid key length: expected {expected} bytes, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },
    #[error("invalid initialization vector length: expected {expected} bytes, got {actual}")]
    InvalidIvLength { expected: usize, actual: usize },
    #[error("invalid authentication tag length: expected {expected} bytes, got {actual}")]
    InvalidTagLength { expected: usize, actual: usize },
    #[error("encryption failure")]
    EncryptFailure,
    #[error("decryption failure")]
    DecryptFailure,
    #[error("base64 decode error: {0}")]
    Base64Decode(#[from] base64::DecodeError),
    #[error("invalid HMAC key length")]
    InvalidMacKey,
}

/// JWE content encryption algorithms (RFC 7518 section 5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentEncryption {
    A128CbcHs256,
    A192CbcHs384,
    A256CbcHs512,
    A128Gcm,
    A192Gcm,
    A256Gcm,
}

impl ContentEncryption {
    pub const ALL: [ContentEncryption; 6] = [
        ContentEncryption::A128CbcHs256,
        ContentEncryption::A192CbcHs384,
        ContentEncryption::A256CbcHs512,
        ContentEncryption::A128Gcm,
        ContentEncryption::A192Gcm,
        ContentEncryption::A256Gcm,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentEncryption::A128CbcHs256 => "A128CBC-HS256",
            ContentEncryption::A192CbcHs384 => "A192CBC-HS384",
            ContentEncryption::A256CbcHs512 => "A256CBC-HS512",
            ContentEncryption::A128Gcm => "A128GCM",
            ContentEncryption::A192Gcm => "A192GCM",
            ContentEncryption::A256Gcm => "A256GCM",
        }
    }

    /// Length of the content encryption key. CBC-HS keys carry the MAC key
    /// followed by the AES key, so they are twice the cipher key size.
    pub fn key_len(&self) -> usize {
        match self {
            ContentEncryption::A128CbcHs256 => 32,
            ContentEncryption::A192CbcHs384 => 48,
            ContentEncryption::A256CbcHs512 => 64,
            ContentEncryption::A128Gcm => 16,
            ContentEncryption::A192Gcm => 24,
            ContentEncryption::A256Gcm => 32,
        }
    }

    pub fn iv_len(&self) -> usize {
        if self.is_gcm() {
            12
        } else {
            16
        }
    }

    pub fn tag_len(&self) -> usize {
        match self {
            ContentEncryption::A128CbcHs256 => 16,
            ContentEncryption::A192CbcHs384 => 24,
            ContentEncryption::A256CbcHs512 => 32,
            _ => GCM_TAG_LENGTH,
        }
    }

    fn is_gcm(&self) -> bool {
        matches!(
            self,
            ContentEncryption::A128Gcm | ContentEncryption::A192Gcm | ContentEncryption::A256Gcm
        )
    }
}

impl fmt::Display for ContentEncryption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentEncryption {
    type Err = CryptoError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        ContentEncryption::ALL
            .into_iter()
            .find(|enc| enc.as_str() == value)
            .ok_or_else(|| CryptoError::UnsupportedAlgorithm(value.to_string()))
    }
}

/// Symmetric key material shared by token signers and encrypters.
#[derive(Clone)]
pub struct SecretKey(Zeroizing<Vec<u8>>);

impl SecretKey {
    /// Construct a key from raw bytes.
    pub fn from_bytes<B>(bytes: B) -> Self
    where
        B: AsRef<[u8]>,
    {
        Self(Zeroizing::new(bytes.as_ref().to_vec()))
    }

    /// Construct a key from a standard base64-encoded string.
    pub fn from_base64(value: &str) -> Result<Self, CryptoError> {
        let decoded = Zeroizing::new(BASE64_STANDARD.decode(value.trim())?);
        Ok(Self::from_bytes(decoded.as_slice()))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// True when the key is empty or consists only of ASCII whitespace.
    pub fn is_blank(&self) -> bool {
        self.0.iter().all(u8::is_ascii_whitespace)
    }
}

impl From<&str> for SecretKey {
    fn from(value: &str) -> Self {
        Self::from_bytes(value)
    }
}

impl From<String> for SecretKey {
    fn from(value: String) -> Self {
        let value = Zeroizing::new(value);
        Self::from_bytes(value.as_bytes())
    }
}

impl From<Vec<u8>> for SecretKey {
    fn from(value: Vec<u8>) -> Self {
        Self(Zeroizing::new(value))
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretKey")
            .field("bytes", &"***redacted***")
            .finish()
    }
}

/// Output of an authenticated encryption: IV, ciphertext and tag as they
/// appear in the last three segments of a compact JWE.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sealed {
    pub iv: Vec<u8>,
    pub ciphertext: Vec<u8>,
    pub tag: Vec<u8>,
}

/// Base64url (no padding) encoding used for every JOSE compact segment.
pub fn encode_segment<B: AsRef<[u8]>>(bytes: B) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Strict base64url decoding; non-canonical trailing bits are rejected.
pub fn decode_segment(segment: &str) -> Result<Vec<u8>, CryptoError> {
    Ok(URL_SAFE_NO_PAD.decode(segment)?)
}

/// Encrypt `plaintext` under `key` with a fresh random IV, authenticating `aad`.
pub fn seal(
    enc: ContentEncryption,
    key: &[u8],
    aad: &[u8],
    plaintext: &[u8],
) -> Result<Sealed, CryptoError> {
    let mut iv = vec![0u8; enc.iv_len()];
    OsRng.fill_bytes(&mut iv);
    seal_with_iv(enc, key, iv, aad, plaintext)
}

/// Verify and decrypt a [`Sealed`] payload produced by [`seal`] or any
/// RFC 7516 implementation.
pub fn open(
    enc: ContentEncryption,
    key: &[u8],
    aad: &[u8],
    sealed: &Sealed,
) -> Result<Vec<u8>, CryptoError> {
    check_len(enc.key_len(), key.len(), |expected, actual| {
        CryptoError::InvalidKeyLength { expected, actual }
    })?;
    check_len(enc.iv_len(), sealed.iv.len(), |expected, actual| {
        CryptoError::InvalidIvLength { expected, actual }
    })?;
    check_len(enc.tag_len(), sealed.tag.len(), |expected, actual| {
        CryptoError::InvalidTagLength { expected, actual }
    })?;

    match enc {
        ContentEncryption::A128CbcHs256 => cbc_hmac_open::<Aes128, HmacSha256>(key, aad, sealed),
        ContentEncryption::A192CbcHs384 => cbc_hmac_open::<Aes192, HmacSha384>(key, aad, sealed),
        ContentEncryption::A256CbcHs512 => cbc_hmac_open::<Aes256, HmacSha512>(key, aad, sealed),
        ContentEncryption::A128Gcm => gcm_open::<Aes128Gcm>(key, aad, sealed),
        ContentEncryption::A192Gcm => gcm_open::<Aes192Gcm>(key, aad, sealed),
        ContentEncryption::A256Gcm => gcm_open::<Aes256Gcm>(key, aad, sealed),
    }
}

fn seal_with_iv(
    enc: ContentEncryption,
    key: &[u8],
    iv: Vec<u8>,
    aad: &[u8],
    plaintext: &[u8],
) -> Result<Sealed, CryptoError> {
    check_len(enc.key_len(), key.len(), |expected, actual| {
        CryptoError::InvalidKeyLength { expected, actual }
    })?;

    let (ciphertext, tag) = match enc {
        ContentEncryption::A128CbcHs256 => {
            cbc_hmac_seal::<Aes128, HmacSha256>(key, &iv, aad, plaintext, enc.tag_len())?
        }
        ContentEncryption::A192CbcHs384 => {
            cbc_hmac_seal::<Aes192, HmacSha384>(key, &iv, aad, plaintext, enc.tag_len())?
        }
        ContentEncryption::A256CbcHs512 => {
            cbc_hmac_seal::<Aes256, HmacSha512>(key, &iv, aad, plaintext, enc.tag_len())?
        }
        ContentEncryption::A128Gcm => gcm_seal::<Aes128Gcm>(key, &iv, aad, plaintext)?,
        ContentEncryption::A192Gcm => gcm_seal::<Aes192Gcm>(key, &iv, aad, plaintext)?,
        ContentEncryption::A256Gcm => gcm_seal::<Aes256Gcm>(key, &iv, aad, plaintext)?,
    };

    Ok(Sealed {
        iv,
        ciphertext,
        tag,
    })
}

fn check_len<F>(expected: usize, actual: usize, err: F) -> Result<(), CryptoError>
where
    F: FnOnce(usize, usize) -> CryptoError,
{
    if expected == actual {
        Ok(())
    } else {
        Err(err(expected, actual))
    }
}

fn gcm_seal<C>(
    key: &[u8],
    iv: &[u8],
    aad: &[u8],
    plaintext: &[u8],
) -> Result<(Vec<u8>, Vec<u8>), CryptoError>
where
    C: KeyInit + AeadCore<NonceSize = U12> + Aead,
{
    let cipher = C::new_from_slice(key).map_err(|_| CryptoError::InvalidKeyLength {
        expected: C::key_size(),
        actual: key.len(),
    })?;
    let mut ciphertext = cipher
        .encrypt(Nonce::from_slice(iv), Payload { msg: plaintext, aad })
        .map_err(|_| CryptoError::EncryptFailure)?;
    let tag = ciphertext.split_off(ciphertext.len() - GCM_TAG_LENGTH);
    Ok((ciphertext, tag))
}

fn gcm_open<C>(key: &[u8], aad: &[u8], sealed: &Sealed) -> Result<Vec<u8>, CryptoError>
where
    C: KeyInit + AeadCore<NonceSize = U12> + Aead,
{
    let cipher = C::new_from_slice(key).map_err(|_| CryptoError::InvalidKeyLength {
        expected: C::key_size(),
        actual: key.len(),
    })?;
    let mut combined = Vec::with_capacity(sealed.ciphertext.len() + sealed.tag.len());
    combined.extend_from_slice(&sealed.ciphertext);
    combined.extend_from_slice(&sealed.tag);
    cipher
        .decrypt(
            Nonce::from_slice(&sealed.iv),
            Payload {
                msg: &combined,
                aad,
            },
        )
        .map_err(|_| CryptoError::DecryptFailure)
}

// RFC 7518 5.2.2.1: MAC_KEY is the first half of the key, ENC_KEY the second.
fn cbc_hmac_seal<C, M>(
    key: &[u8],
    iv: &[u8],
    aad: &[u8],
    plaintext: &[u8],
    tag_len: usize,
) -> Result<(Vec<u8>, Vec<u8>), CryptoError>
where
    C: BlockEncryptMut + BlockCipher + KeyInit,
    M: Mac + KeyInit,
{
    let (mac_key, enc_key) = key.split_at(key.len() / 2);
    let ciphertext = cbc::Encryptor::<C>::new_from_slices(enc_key, iv)
        .map_err(|_| CryptoError::EncryptFailure)?
        .encrypt_padded_vec_mut::<Pkcs7>(plaintext);
    let digest = cbc_authenticator::<M>(mac_key, aad, iv, &ciphertext)?
        .finalize()
        .into_bytes();
    Ok((ciphertext, digest[..tag_len].to_vec()))
}

fn cbc_hmac_open<C, M>(key: &[u8], aad: &[u8], sealed: &Sealed) -> Result<Vec<u8>, CryptoError>
where
    C: BlockDecryptMut + BlockCipher + KeyInit,
    M: Mac + KeyInit,
{
    let (mac_key, enc_key) = key.split_at(key.len() / 2);
    cbc_authenticator::<M>(mac_key, aad, &sealed.iv, &sealed.ciphertext)?
        .verify_truncated_left(&sealed.tag)
        .map_err(|_| CryptoError::DecryptFailure)?;
    cbc::Decryptor::<C>::new_from_slices(enc_key, &sealed.iv)
        .map_err(|_| CryptoError::DecryptFailure)?
        .decrypt_padded_vec_mut::<Pkcs7>(&sealed.ciphertext)
        .map_err(|_| CryptoError::DecryptFailure)
}

fn cbc_authenticator<M>(
    mac_key: &[u8],
    aad: &[u8],
    iv: &[u8],
    ciphertext: &[u8],
) -> Result<M, CryptoError>
where
    M: Mac + KeyInit,
{
    let mut mac = <M as Mac>::new_from_slice(mac_key).map_err(|_| CryptoError::InvalidMacKey)?;
    let aad_bits = (aad.len() as u64) * 8;
    mac.update(aad);
    mac.update(iv);
    mac.update(ciphertext);
    mac.update(&aad_bits.to_be_bytes());
    Ok(mac)
}
