//! Cryptographic utilities for the EO Canvas Rust SDK
//!
//! Storage credentials attached to keys never leave the client in plaintext.
//! They are serialized to JSON and encrypted with the service's RSA public key
//! using OAEP padding, SHA-1 for both the digest and MGF1, and no label.

use base64::{Engine as _, engine::general_purpose};
use rsa::pkcs1::DecodeRsaPublicKey;
use rsa::pkcs8::DecodePublicKey;
use rsa::traits::PublicKeyParts;
use rsa::{Oaep, RsaPublicKey};
use serde::Serialize;
use sha1::Sha1;
use crate::error::{Result, SdkError};

/// OAEP overhead in bytes for a SHA-1 digest: `2 * hLen + 2`
const OAEP_SHA1_OVERHEAD: usize = 2 * 20 + 2;

/// Parses a PEM-encoded RSA public key
///
/// Both SubjectPublicKeyInfo (`BEGIN PUBLIC KEY`) and PKCS#1
/// (`BEGIN RSA PUBLIC KEY`) encodings are accepted. Surrounding whitespace,
/// as returned by the key endpoint, is ignored.
///
/// # Arguments
///
/// * `pem` - The raw PEM bytes
///
/// # Returns
///
/// The parsed `RsaPublicKey`
pub fn load_public_key(pem: &[u8]) -> Result<RsaPublicKey> {
    let pem = std::str::from_utf8(pem)
        .map_err(|e| SdkError::Crypto(format!("Public key is not valid UTF-8: {}", e)))?
        .trim();

    if pem.contains("BEGIN RSA PUBLIC KEY") {
        return RsaPublicKey::from_pkcs1_pem(pem)
            .map_err(|e| SdkError::Crypto(format!("Malformed PKCS#1 public key: {}", e)));
    }

    RsaPublicKey::from_public_key_pem(pem)
        .map_err(|e| SdkError::Crypto(format!("Malformed public key: {}", e)))
}

/// Largest plaintext, in bytes, that fits in one OAEP block for this key
pub fn max_plaintext_len(public_key: &RsaPublicKey) -> usize {
    public_key.size().saturating_sub(OAEP_SHA1_OVERHEAD)
}

/// Encrypts raw bytes with RSA-OAEP (SHA-1, MGF1-SHA-1, no label)
///
/// OAEP has a hard size ceiling; a payload that does not fit is rejected
/// rather than truncated.
///
/// # Arguments
///
/// * `data` - The plaintext bytes
/// * `public_key` - The recipient public key
///
/// # Returns
///
/// The ciphertext, exactly `public_key.size()` bytes long
pub fn encrypt_data(data: &[u8], public_key: &RsaPublicKey) -> Result<Vec<u8>> {
    let limit = max_plaintext_len(public_key);
    if data.len() > limit {
        return Err(SdkError::Crypto(format!(
            "Payload of {} bytes exceeds the {} byte limit of the public key",
            data.len(),
            limit
        )));
    }

    let mut rng = rand::thread_rng();
    let ciphertext = public_key.encrypt(&mut rng, Oaep::new::<Sha1>(), data)?;
    Ok(ciphertext)
}

/// Serializes a payload to JSON, encrypts it and base64-encodes the result
///
/// This is the form expected by the key endpoint in the `data` field.
///
/// # Arguments
///
/// * `payload` - Any serializable credential structure
/// * `public_key_pem` - The service public key, as returned by the API
///
/// # Returns
///
/// Base64-encoded ciphertext
pub fn encrypt_payload<T: Serialize>(payload: &T, public_key_pem: &[u8]) -> Result<String> {
    let public_key = load_public_key(public_key_pem)?;
    let data = serde_json::to_vec(payload)?;
    let encrypted = encrypt_data(&data, &public_key)?;
    Ok(general_purpose::STANDARD.encode(encrypted))
}
