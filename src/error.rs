//! Error types shared by the capability implementations and the checklist.

use thiserror::Error;

use crate::checklist::Group;

/// Errors raised by the crypto capability.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Unknown cipher mode: {0}")]
    UnknownMode(String),
    #[error("Unknown padding scheme: {0}")]
    UnknownPadding(String),
    #[error("Invalid {cipher} key length: {len} bytes")]
    InvalidKeyLength { cipher: &'static str, len: usize },
    #[error("Invalid {cipher} IV length: expected {expected} bytes, got {actual}")]
    InvalidIvLength {
        cipher: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("Input of {len} bytes is not a multiple of the {block_size}-byte block size")]
    UnalignedInput { len: usize, block_size: usize },
    #[error("Invalid padding in decrypted data")]
    BadPadding,
    #[error("Invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("Invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),
    #[error("Decoded data is not valid UTF-8")]
    InvalidUtf8,
    #[error("Input is not valid GBK")]
    MalformedGbk,
    #[error("Text contains characters GBK cannot represent")]
    UnmappableGbk,
    #[error("Invalid RSA key: {0}")]
    InvalidKey(String),
    #[error("Unsupported RSA key size: {bits} bits (expected 512..=4096)")]
    InvalidKeySize { bits: usize },
    #[error("RSA operation failed: {0}")]
    Rsa(#[from] rsa::Error),
}

/// Errors raised by the json capability.
#[derive(Debug, Error)]
pub enum JsonError {
    #[error("Failed to parse JSON: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("Failed to serialize JSON: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Errors raised by the requests capability.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("Invalid proxy {proxy}: {source}")]
    Proxy {
        proxy: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Invalid header {name}: {reason}")]
    InvalidHeader { name: String, reason: String },
    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Failed to encode request body: {0}")]
    Body(String),
}

/// Any failure observed while probing a capability.
#[derive(Debug, Error)]
pub enum CapabilityError {
    #[error(transparent)]
    Crypto(#[from] CryptoError),
    #[error(transparent)]
    Json(#[from] JsonError),
    #[error(transparent)]
    Request(#[from] RequestError),
    #[error("{operation} mismatch: expected {expected}, got {actual}")]
    Mismatch {
        operation: String,
        expected: String,
        actual: String,
    },
    #[error("Missing field: {0}")]
    MissingField(String),
}

impl CapabilityError {
    pub fn mismatch(
        operation: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::Mismatch {
            operation: operation.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

/// A group failure surfaced by a fail-fast run.
#[derive(Debug, Error)]
#[error("group {group} failed: {source}")]
pub struct ChecklistError {
    pub group: Group,
    #[source]
    pub source: CapabilityError,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mismatch_display_names_operation() {
        let err = CapabilityError::mismatch("crypto.urlDecode", "a b", "a+b");
        let text = err.to_string();
        assert!(text.contains("crypto.urlDecode"));
        assert!(text.contains("a+b"));
    }

    #[test]
    fn test_crypto_error_is_transparent() {
        let err: CapabilityError = CryptoError::UnknownMode("GCM".into()).into();
        assert_eq!(err.to_string(), "Unknown cipher mode: GCM");
    }

    #[test]
    fn test_checklist_error_names_group() {
        let err = ChecklistError {
            group: Group::Json,
            source: CapabilityError::MissingField("data.risk_code".into()),
        };
        assert!(err.to_string().starts_with("group json failed"));
    }
}
