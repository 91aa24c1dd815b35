//! Message digests rendered as uppercase hex.

use serde::{Deserialize, Serialize};
use sha2::Digest;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    Md5,
    Sha1,
    Sha256,
    Sha512,
}

impl DigestAlgorithm {
    pub const ALL: [DigestAlgorithm; 4] = [Self::Md5, Self::Sha1, Self::Sha256, Self::Sha512];

    /// Name of the host call computing this digest.
    pub fn call_name(&self) -> &'static str {
        match self {
            Self::Md5 => "crypto.md5",
            Self::Sha1 => "crypto.sha1",
            Self::Sha256 => "crypto.sha256",
            Self::Sha512 => "crypto.sha512",
        }
    }

    pub fn output_bits(&self) -> usize {
        match self {
            Self::Md5 => 128,
            Self::Sha1 => 160,
            Self::Sha256 => 256,
            Self::Sha512 => 512,
        }
    }

    /// Length of the hex rendering (two characters per byte).
    pub fn hex_len(&self) -> usize {
        self.output_bits() / 4
    }

    pub fn hex_digest(&self, data: &[u8]) -> String {
        match self {
            Self::Md5 => hex_digest::<md5::Md5>(data),
            Self::Sha1 => hex_digest::<sha1::Sha1>(data),
            Self::Sha256 => hex_digest::<sha2::Sha256>(data),
            Self::Sha512 => hex_digest::<sha2::Sha512>(data),
        }
    }
}

fn hex_digest<D: Digest>(data: &[u8]) -> String {
    hex::encode_upper(D::digest(data))
}
