//! RSA key generation and encryption over DER keys in text form.
//!
//! Public keys are X.509 SubjectPublicKeyInfo, private keys PKCS#8. Both
//! travel as uppercase hex or base64; PKCS#1 and PEM armour are accepted
//! on import.

use rand::rngs::{OsRng, StdRng};
use rand::SeedableRng;
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey};
use rsa::{Oaep, Pkcs1v15Encrypt, RsaPrivateKey, RsaPublicKey};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::encoding::{base64_decode, base64_encode};
use crate::error::CryptoError;

/// Smallest modulus accepted for generated keys.
pub const MIN_KEY_BITS: usize = 512;
/// Largest modulus accepted for generated keys.
pub const MAX_KEY_BITS: usize = 4096;

/// Text encoding of DER key material and ciphertext.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyEncoding {
    #[default]
    Hex,
    Base64,
}

impl KeyEncoding {
    /// Guess the encoding of a key: hex if every character is a hex digit.
    pub fn detect(text: &str) -> Self {
        let hex = text
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .all(|c| c.is_ascii_hexdigit());
        if hex {
            Self::Hex
        } else {
            Self::Base64
        }
    }

    pub fn encode(&self, bytes: &[u8]) -> String {
        match self {
            Self::Hex => hex::encode_upper(bytes),
            Self::Base64 => base64_encode(bytes),
        }
    }

    pub fn decode(&self, text: &str) -> Result<Vec<u8>, CryptoError> {
        match self {
            Self::Hex => {
                let compact: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
                Ok(hex::decode(compact)?)
            }
            Self::Base64 => base64_decode(text),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPair {
    pub public_key: String,
    pub private_key: String,
}

/// Generate a key pair of `bits` in `MIN_KEY_BITS..=MAX_KEY_BITS`. A seed
/// makes generation deterministic.
pub fn generate_key_pair(
    bits: usize,
    encoding: KeyEncoding,
    seed: Option<&str>,
) -> Result<KeyPair, CryptoError> {
    if !(MIN_KEY_BITS..=MAX_KEY_BITS).contains(&bits) {
        return Err(CryptoError::InvalidKeySize { bits });
    }
    let private = match seed {
        Some(seed) => {
            let mut rng = StdRng::from_seed(Sha256::digest(seed.as_bytes()).into());
            RsaPrivateKey::new(&mut rng, bits)?
        }
        None => RsaPrivateKey::new(&mut OsRng, bits)?,
    };
    let public = RsaPublicKey::from(&private);

    let private_der = private
        .to_pkcs8_der()
        .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
    let public_der = public
        .to_public_key_der()
        .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;

    Ok(KeyPair {
        public_key: encoding.encode(public_der.as_bytes()),
        private_key: encoding.encode(private_der.as_bytes()),
    })
}

/// Encrypt UTF-8 text. The ciphertext uses the same encoding as the key.
pub fn encrypt(public_key: &str, data: &str, oaep: bool) -> Result<String, CryptoError> {
    let (der, encoding) = unarmour(public_key)?;
    let key = RsaPublicKey::from_public_key_der(&der)
        .or_else(|_| RsaPublicKey::from_pkcs1_der(&der))
        .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;

    let ciphertext = if oaep {
        key.encrypt(&mut OsRng, Oaep::new::<sha1::Sha1>(), data.as_bytes())?
    } else {
        key.encrypt(&mut OsRng, Pkcs1v15Encrypt, data.as_bytes())?
    };
    Ok(encoding.encode(&ciphertext))
}

/// Decrypt ciphertext produced by [`encrypt`] back to UTF-8 text.
pub fn decrypt(private_key: &str, ciphertext: &str, oaep: bool) -> Result<String, CryptoError> {
    let (der, encoding) = unarmour(private_key)?;
    let key = RsaPrivateKey::from_pkcs8_der(&der)
        .or_else(|_| RsaPrivateKey::from_pkcs1_der(&der))
        .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;

    let bytes = encoding.decode(ciphertext)?;
    let plaintext = if oaep {
        key.decrypt(Oaep::new::<sha1::Sha1>(), &bytes)?
    } else {
        key.decrypt(Pkcs1v15Encrypt, &bytes)?
    };
    String::from_utf8(plaintext).map_err(|_| CryptoError::InvalidUtf8)
}

/// Strip PEM armour if present and decode the key body to DER.
fn unarmour(key: &str) -> Result<(Vec<u8>, KeyEncoding), CryptoError> {
    let trimmed = key.trim();
    if trimmed.starts_with("-----BEGIN") {
        let body: String = trimmed
            .lines()
            .filter(|line| !line.starts_with("-----"))
            .collect();
        return Ok((base64_decode(&body)?, KeyEncoding::Base64));
    }
    let encoding = KeyEncoding::detect(trimmed);
    Ok((encoding.decode(trimmed)?, encoding))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_encoding() {
        assert_eq!(KeyEncoding::detect("30819F300D06"), KeyEncoding::Hex);
        assert_eq!(KeyEncoding::detect("MIGfMA0GCSqGSIb3DQEB/AQUAA=="), KeyEncoding::Base64);
        assert_eq!(KeyEncoding::detect("MIGfMA0GCSqGSIb3DQEBAQUAA4GN"), KeyEncoding::Base64);
    }

    #[test]
    fn test_seeded_generation_is_deterministic() {
        let a = generate_key_pair(512, KeyEncoding::Hex, Some("fixed seed")).unwrap();
        let b = generate_key_pair(512, KeyEncoding::Hex, Some("fixed seed")).unwrap();
        assert_eq!(a, b);
        assert!(a.public_key.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_key_size_outside_bounds_rejected() {
        for bits in [0, 32, MIN_KEY_BITS - 1, MAX_KEY_BITS + 1] {
            let err = generate_key_pair(bits, KeyEncoding::Hex, Some("size")).unwrap_err();
            assert!(
                matches!(err, CryptoError::InvalidKeySize { bits: b } if b == bits),
                "{}: {:?}",
                bits,
                err
            );
        }
        assert_eq!(
            CryptoError::InvalidKeySize { bits: 32 }.to_string(),
            "Unsupported RSA key size: 32 bits (expected 512..=4096)"
        );
    }

    #[test]
    fn test_round_trip_both_paddings() {
        let pair = generate_key_pair(1024, KeyEncoding::Base64, Some("round trip")).unwrap();
        for oaep in [true, false] {
            let ciphertext = encrypt(&pair.public_key, "这是一条测试消息", oaep).unwrap();
            assert_eq!(KeyEncoding::detect(&ciphertext), KeyEncoding::Base64);
            let plaintext = decrypt(&pair.private_key, &ciphertext, oaep).unwrap();
            assert_eq!(plaintext, "这是一条测试消息");
        }
    }

    #[test]
    fn test_pem_armour_accepted() {
        let pair = generate_key_pair(512, KeyEncoding::Base64, Some("pem")).unwrap();
        let pem = format!(
            "-----BEGIN PUBLIC KEY-----\n{}\n-----END PUBLIC KEY-----\n",
            pair.public_key
        );
        let ciphertext = encrypt(&pem, "hi", false).unwrap();
        assert_eq!(decrypt(&pair.private_key, &ciphertext, false).unwrap(), "hi");
    }

    #[test]
    fn test_garbage_key_rejected() {
        assert!(matches!(
            encrypt("ABCDEF", "hi", true),
            Err(CryptoError::InvalidKey(_))
        ));
        assert!(matches!(encrypt("ABC", "hi", true), Err(CryptoError::Hex(_))));
        assert!(matches!(encrypt("XYZ", "hi", true), Err(CryptoError::Base64(_))));
    }
}
