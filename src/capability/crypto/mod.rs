//! Crypto capability: text encodings, digests and ciphers.

pub mod digest;
pub mod encoding;
pub mod rsa_keys;
pub mod symmetric;

pub use digest::DigestAlgorithm;
pub use rsa_keys::{KeyEncoding, KeyPair};
pub use symmetric::{CipherFamily, CipherMode, CipherSpec, PaddingScheme};

use crate::error::CryptoError;

/// Crypto operations a host exposes to scripts.
///
/// Ciphertext crosses the boundary as base64 text and digests as uppercase
/// hex.
pub trait Crypto: Send + Sync {
    fn utf8_to_gbk(&self, text: &str) -> Result<Vec<u8>, CryptoError>;
    /// Decode GBK bytes. Malformed input is an error.
    fn gbk_to_utf8(&self, bytes: &[u8]) -> Result<String, CryptoError>;

    fn url_encode(&self, text: &str) -> String;
    fn url_decode(&self, text: &str) -> Result<String, CryptoError>;

    fn base64_encode(&self, text: &str) -> String;
    fn base64_decode(&self, text: &str) -> Result<String, CryptoError>;

    fn md5(&self, text: &str) -> String;
    fn sha1(&self, text: &str) -> String;
    fn sha256(&self, text: &str) -> String;
    fn sha512(&self, text: &str) -> String;

    fn digest(&self, algorithm: DigestAlgorithm, text: &str) -> String {
        match algorithm {
            DigestAlgorithm::Md5 => self.md5(text),
            DigestAlgorithm::Sha1 => self.sha1(text),
            DigestAlgorithm::Sha256 => self.sha256(text),
            DigestAlgorithm::Sha512 => self.sha512(text),
        }
    }

    /// Encrypt UTF-8 text, returning base64 ciphertext.
    fn aes_encrypt(&self, data: &str, spec: &CipherSpec) -> Result<String, CryptoError>;
    /// Decrypt base64 ciphertext back to UTF-8 text.
    fn aes_decrypt(&self, data: &str, spec: &CipherSpec) -> Result<String, CryptoError>;
    fn des_encrypt(&self, data: &str, spec: &CipherSpec) -> Result<String, CryptoError>;
    fn des_decrypt(&self, data: &str, spec: &CipherSpec) -> Result<String, CryptoError>;

    fn rsa_generate_key_pair(
        &self,
        bits: usize,
        encoding: KeyEncoding,
        seed: Option<&str>,
    ) -> Result<KeyPair, CryptoError>;
    fn rsa_encrypt(&self, public_key: &str, data: &str, oaep: bool)
        -> Result<String, CryptoError>;
    fn rsa_decrypt(&self, private_key: &str, data: &str, oaep: bool)
        -> Result<String, CryptoError>;
}

/// Crypto capability backed by the RustCrypto crates.
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardCrypto;

impl StandardCrypto {
    fn seal(family: CipherFamily, data: &str, spec: &CipherSpec) -> Result<String, CryptoError> {
        let ciphertext = symmetric::encrypt(family, spec, data.as_bytes())?;
        Ok(encoding::base64_encode(&ciphertext))
    }

    fn open(family: CipherFamily, data: &str, spec: &CipherSpec) -> Result<String, CryptoError> {
        let ciphertext = encoding::base64_decode(data)?;
        let plaintext = symmetric::decrypt(family, spec, &ciphertext)?;
        String::from_utf8(plaintext).map_err(|_| CryptoError::InvalidUtf8)
    }
}

impl Crypto for StandardCrypto {
    fn utf8_to_gbk(&self, text: &str) -> Result<Vec<u8>, CryptoError> {
        encoding::utf8_to_gbk(text)
    }

    fn gbk_to_utf8(&self, bytes: &[u8]) -> Result<String, CryptoError> {
        encoding::gbk_to_utf8(bytes)
    }

    fn url_encode(&self, text: &str) -> String {
        encoding::url_encode(text)
    }

    fn url_decode(&self, text: &str) -> Result<String, CryptoError> {
        encoding::url_decode(text)
    }

    fn base64_encode(&self, text: &str) -> String {
        encoding::base64_encode(text.as_bytes())
    }

    fn base64_decode(&self, text: &str) -> Result<String, CryptoError> {
        encoding::base64_decode_utf8(text)
    }

    fn md5(&self, text: &str) -> String {
        DigestAlgorithm::Md5.hex_digest(text.as_bytes())
    }

    fn sha1(&self, text: &str) -> String {
        DigestAlgorithm::Sha1.hex_digest(text.as_bytes())
    }

    fn sha256(&self, text: &str) -> String {
        DigestAlgorithm::Sha256.hex_digest(text.as_bytes())
    }

    fn sha512(&self, text: &str) -> String {
        DigestAlgorithm::Sha512.hex_digest(text.as_bytes())
    }

    fn aes_encrypt(&self, data: &str, spec: &CipherSpec) -> Result<String, CryptoError> {
        Self::seal(CipherFamily::Aes, data, spec)
    }

    fn aes_decrypt(&self, data: &str, spec: &CipherSpec) -> Result<String, CryptoError> {
        Self::open(CipherFamily::Aes, data, spec)
    }

    fn des_encrypt(&self, data: &str, spec: &CipherSpec) -> Result<String, CryptoError> {
        Self::seal(CipherFamily::Des, data, spec)
    }

    fn des_decrypt(&self, data: &str, spec: &CipherSpec) -> Result<String, CryptoError> {
        Self::open(CipherFamily::Des, data, spec)
    }

    fn rsa_generate_key_pair(
        &self,
        bits: usize,
        encoding: KeyEncoding,
        seed: Option<&str>,
    ) -> Result<KeyPair, CryptoError> {
        rsa_keys::generate_key_pair(bits, encoding, seed)
    }

    fn rsa_encrypt(
        &self,
        public_key: &str,
        data: &str,
        oaep: bool,
    ) -> Result<String, CryptoError> {
        rsa_keys::encrypt(public_key, data, oaep)
    }

    fn rsa_decrypt(
        &self,
        private_key: &str,
        data: &str,
        oaep: bool,
    ) -> Result<String, CryptoError> {
        rsa_keys::decrypt(private_key, data, oaep)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gbk_round_trip() {
        let crypto = StandardCrypto;
        let gbk = crypto.utf8_to_gbk("这是一条测试消息").unwrap();
        assert_eq!(hex::encode_upper(&gbk), "D5E2CAC7D2BBCCF5B2E2CAD4CFFBCFA2");
        assert_eq!(crypto.gbk_to_utf8(&gbk).unwrap(), "这是一条测试消息");
    }

    #[test]
    fn test_digest_dispatch() {
        let crypto = StandardCrypto;
        assert_eq!(crypto.digest(DigestAlgorithm::Md5, "abc"), crypto.md5("abc"));
        assert_eq!(crypto.digest(DigestAlgorithm::Sha512, "abc").len(), 128);
    }

    #[test]
    fn test_aes_text_round_trip() {
        let crypto = StandardCrypto;
        let spec = CipherSpec::from_tags("9uFCkzsu3NMtL.jC", "pf7L-yDtb4-KW4Js", "CBC", "PKCS")
            .unwrap();
        let sealed = crypto.aes_encrypt("这是一条测试消息", &spec).unwrap();
        assert_eq!(crypto.aes_decrypt(&sealed, &spec).unwrap(), "这是一条测试消息");
    }

    #[test]
    fn test_des_uses_eight_byte_key() {
        let crypto = StandardCrypto;
        let spec = CipherSpec::from_tags("3NMtL.jC", "b4-KW4Js", "CBC", "PKCS").unwrap();
        let sealed = crypto.des_encrypt("hello", &spec).unwrap();
        assert_eq!(crypto.des_decrypt(&sealed, &spec).unwrap(), "hello");
        let aes_spec = CipherSpec::from_tags("9uFCkzsu3NMtL.jC", "pf7L-yDtb4-KW4Js", "CBC", "")
            .unwrap();
        assert!(crypto.des_encrypt("hello", &aes_spec).is_err());
    }
}
