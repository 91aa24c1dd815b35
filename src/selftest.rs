//! Power-on self-tests for the standard crypto capability.
//!
//! Known Answer Tests (KAT) for the digests and block ciphers, a GBK
//! round trip and an RNG health check. The CLI runs these before a
//! checklist unless told to skip them.

use rand::RngCore;
use thiserror::Error;

use crate::capability::crypto::encoding::{gbk_to_utf8, utf8_to_gbk};
use crate::capability::crypto::symmetric::{
    self, CipherFamily, CipherMode, CipherSpec, PaddingScheme,
};
use crate::capability::crypto::DigestAlgorithm;

/// Self-test error types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelfTestError {
    #[error("{} KAT failed", .0.call_name())]
    DigestFailed(DigestAlgorithm),
    #[error("AES-128 KAT failed")]
    AesFailed,
    #[error("DES KAT failed")]
    DesFailed,
    #[error("GBK round trip failed")]
    GbkFailed,
    #[error("RNG health test failed")]
    RngHealthFailed,
    #[error(
        "KAT output mismatch: expected {}, got {}",
        hex::encode_upper(.expected),
        hex::encode_upper(.actual)
    )]
    KatMismatch { expected: Vec<u8>, actual: Vec<u8> },
}

/// Run every self-test, returning the first failure.
pub fn run_self_tests() -> Result<(), SelfTestError> {
    digest_kat()?;
    aes_kat()?;
    des_kat()?;
    gbk_round_trip()?;
    rng_health_test()
}

/// Digests of `"abc"` (FIPS 180 / RFC 1321 vectors).
pub fn digest_kat() -> Result<(), SelfTestError> {
    const VECTORS: [(DigestAlgorithm, &str); 4] = [
        (DigestAlgorithm::Md5, "900150983CD24FB0D6963F7D28E17F72"),
        (DigestAlgorithm::Sha1, "A9993E364706816ABA3E25717850C26C9CD0D89D"),
        (
            DigestAlgorithm::Sha256,
            "BA7816BF8F01CFEA414140DE5DAE2223B00361A396177A9CB410FF61F20015AD",
        ),
        (
            DigestAlgorithm::Sha512,
            "DDAF35A193617ABACC417349AE20413112E6FA4E89A97EA20A9EEEE64B55D39A\
             2192992A274FC1A836BA3C23A3FEEBBD454D4423643CE80E2A9AC94FA54CA49F",
        ),
    ];

    for (alg, expected) in VECTORS {
        if alg.hex_digest(b"abc") != expected {
            return Err(SelfTestError::DigestFailed(alg));
        }
    }
    Ok(())
}

/// AES-128 single block (FIPS-197 appendix C.1).
pub fn aes_kat() -> Result<(), SelfTestError> {
    let key: [u8; 16] = [
        0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e,
        0x0f,
    ];
    let plaintext: [u8; 16] = [
        0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0xaa, 0xbb, 0xcc, 0xdd, 0xee,
        0xff,
    ];
    let expected: [u8; 16] = [
        0x69, 0xc4, 0xe0, 0xd8, 0x6a, 0x7b, 0x04, 0x30, 0xd8, 0xcd, 0xb7, 0x80, 0x70, 0xb4, 0xc5,
        0x5a,
    ];
    block_kat(CipherFamily::Aes, &key, &plaintext, &expected)
}

/// DES single block (classic worked example).
pub fn des_kat() -> Result<(), SelfTestError> {
    let key: [u8; 8] = [0x13, 0x34, 0x57, 0x79, 0x9B, 0xBC, 0xDF, 0xF1];
    let plaintext: [u8; 8] = [0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD, 0xEF];
    let expected: [u8; 8] = [0x85, 0xE8, 0x13, 0x54, 0x0F, 0x0A, 0xB4, 0x05];
    block_kat(CipherFamily::Des, &key, &plaintext, &expected)
}

fn block_kat(
    family: CipherFamily,
    key: &[u8],
    plaintext: &[u8],
    expected: &[u8],
) -> Result<(), SelfTestError> {
    let failed = match family {
        CipherFamily::Aes => SelfTestError::AesFailed,
        CipherFamily::Des => SelfTestError::DesFailed,
    };
    let spec = CipherSpec::new(key, [0u8; 0], CipherMode::Ecb, PaddingScheme::NoPadding);

    let ciphertext = symmetric::encrypt(family, &spec, plaintext).map_err(|_| failed.clone())?;
    if ciphertext != expected {
        return Err(SelfTestError::KatMismatch {
            expected: expected.to_vec(),
            actual: ciphertext,
        });
    }

    let decrypted = symmetric::decrypt(family, &spec, &ciphertext).map_err(|_| failed)?;
    if decrypted != plaintext {
        return Err(SelfTestError::KatMismatch {
            expected: plaintext.to_vec(),
            actual: decrypted,
        });
    }
    Ok(())
}

/// GBK round trip of a mixed CJK/ASCII sample with a known encoding.
pub fn gbk_round_trip() -> Result<(), SelfTestError> {
    const SAMPLE: &str = "中文abc";
    const EXPECTED: [u8; 7] = [0xD6, 0xD0, 0xCE, 0xC4, b'a', b'b', b'c'];

    let encoded = utf8_to_gbk(SAMPLE).map_err(|_| SelfTestError::GbkFailed)?;
    if encoded != EXPECTED {
        return Err(SelfTestError::KatMismatch {
            expected: EXPECTED.to_vec(),
            actual: encoded,
        });
    }
    match gbk_to_utf8(&encoded) {
        Ok(decoded) if decoded == SAMPLE => Ok(()),
        _ => Err(SelfTestError::GbkFailed),
    }
}

/// RNG Health Test
///
/// Stuck-output detection plus a rough bit-difference check. RSA key
/// generation draws from the same source.
pub fn rng_health_test() -> Result<(), SelfTestError> {
    let mut prev = [0u8; 32];
    let mut curr = [0u8; 32];

    rand::rngs::OsRng.fill_bytes(&mut prev);

    for _ in 0..10 {
        rand::rngs::OsRng.fill_bytes(&mut curr);
        if curr == prev {
            return Err(SelfTestError::RngHealthFailed);
        }
        prev.copy_from_slice(&curr);
    }

    // Average should be ~128 bits different per 256-bit sample
    let mut total_diff_bits = 0u32;
    for _ in 0..10 {
        rand::rngs::OsRng.fill_bytes(&mut curr);
        total_diff_bits += count_differing_bits(&prev, &curr);
        prev.copy_from_slice(&curr);
    }
    if total_diff_bits / 10 < 64 {
        return Err(SelfTestError::RngHealthFailed);
    }

    Ok(())
}

fn count_differing_bits(a: &[u8], b: &[u8]) -> u32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x ^ y).count_ones())
        .sum()
}
