//! Block-cipher encryption for the AES and DES families.
//!
//! Supports the ECB, CBC, CFB, CTR and OFB modes. Padding only applies to
//! the block modes (ECB and CBC); the stream modes never pad.

use std::fmt;
use std::str::FromStr;

use aes::{Aes128, Aes192, Aes256};
use cipher::block_padding::{Iso10126, NoPadding, Pkcs7, ZeroPadding};
use cipher::{
    AsyncStreamCipher, BlockCipher, BlockDecryptMut, BlockEncryptMut, BlockSizeUser, KeyInit,
    KeyIvInit, StreamCipher,
};
use des::Des;
use serde::{Deserialize, Serialize};

use crate::error::CryptoError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CipherMode {
    Ecb,
    Cbc,
    Cfb,
    Ctr,
    Ofb,
}

impl CipherMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ecb => "ECB",
            Self::Cbc => "CBC",
            Self::Cfb => "CFB",
            Self::Ctr => "CTR",
            Self::Ofb => "OFB",
        }
    }

    pub fn uses_iv(&self) -> bool {
        !matches!(self, Self::Ecb)
    }

    pub fn is_block_mode(&self) -> bool {
        matches!(self, Self::Ecb | Self::Cbc)
    }
}

impl FromStr for CipherMode {
    type Err = CryptoError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag {
            "ECB" => Ok(Self::Ecb),
            "CBC" => Ok(Self::Cbc),
            "CFB" => Ok(Self::Cfb),
            "CTR" => Ok(Self::Ctr),
            "OFB" => Ok(Self::Ofb),
            other => Err(CryptoError::UnknownMode(other.to_string())),
        }
    }
}

impl fmt::Display for CipherMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Padding scheme tag. `Default` resolves to PKCS#7 for block modes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaddingScheme {
    #[default]
    Default,
    Pkcs,
    Zeros,
    NoPadding,
    /// Arbitrary filler ending with the pad length (ISO 10126).
    W3c,
}

impl PaddingScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "",
            Self::Pkcs => "PKCS",
            Self::Zeros => "ZEROS",
            Self::NoPadding => "NO",
            Self::W3c => "W3C",
        }
    }

    fn resolve(self) -> Self {
        match self {
            Self::Default => Self::Pkcs,
            other => other,
        }
    }
}

impl FromStr for PaddingScheme {
    type Err = CryptoError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag {
            "" => Ok(Self::Default),
            "PKCS" => Ok(Self::Pkcs),
            "ZEROS" => Ok(Self::Zeros),
            "NO" => Ok(Self::NoPadding),
            "W3C" => Ok(Self::W3c),
            other => Err(CryptoError::UnknownPadding(other.to_string())),
        }
    }
}

/// Key material and parameters for one symmetric operation.
#[derive(Clone, PartialEq, Eq)]
pub struct CipherSpec {
    pub key: Vec<u8>,
    pub iv: Vec<u8>,
    pub mode: CipherMode,
    pub padding: PaddingScheme,
}

impl CipherSpec {
    pub fn new(
        key: impl AsRef<[u8]>,
        iv: impl AsRef<[u8]>,
        mode: CipherMode,
        padding: PaddingScheme,
    ) -> Self {
        Self {
            key: key.as_ref().to_vec(),
            iv: iv.as_ref().to_vec(),
            mode,
            padding,
        }
    }

    /// Build a spec from the textual mode and padding tags used by hosts.
    pub fn from_tags(
        key: impl AsRef<[u8]>,
        iv: impl AsRef<[u8]>,
        mode: &str,
        padding: &str,
    ) -> Result<Self, CryptoError> {
        Ok(Self::new(key, iv, mode.parse()?, padding.parse()?))
    }
}

// Key and IV bytes stay out of logs.
impl fmt::Debug for CipherSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CipherSpec")
            .field("key_len", &self.key.len())
            .field("iv_len", &self.iv.len())
            .field("mode", &self.mode)
            .field("padding", &self.padding)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CipherFamily {
    Aes,
    Des,
}

impl CipherFamily {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Aes => "AES",
            Self::Des => "DES",
        }
    }
}

/// Concrete cipher plus the stream-mode wrappers matching its block size.
trait Suite {
    const NAME: &'static str;
    type Block: BlockCipher + BlockEncryptMut + BlockDecryptMut + KeyInit;
    type Ofb: KeyIvInit + StreamCipher;
    type Ctr: KeyIvInit + StreamCipher;
}

struct Aes128Suite;
struct Aes192Suite;
struct Aes256Suite;
struct DesSuite;

impl Suite for Aes128Suite {
    const NAME: &'static str = "AES";
    type Block = Aes128;
    type Ofb = ofb::Ofb<Aes128>;
    type Ctr = ctr::Ctr128BE<Aes128>;
}

impl Suite for Aes192Suite {
    const NAME: &'static str = "AES";
    type Block = Aes192;
    type Ofb = ofb::Ofb<Aes192>;
    type Ctr = ctr::Ctr128BE<Aes192>;
}

impl Suite for Aes256Suite {
    const NAME: &'static str = "AES";
    type Block = Aes256;
    type Ofb = ofb::Ofb<Aes256>;
    type Ctr = ctr::Ctr128BE<Aes256>;
}

impl Suite for DesSuite {
    const NAME: &'static str = "DES";
    type Block = Des;
    type Ofb = ofb::Ofb<Des>;
    type Ctr = ctr::Ctr64BE<Des>;
}

#[derive(Clone, Copy)]
enum Direction {
    Encrypt,
    Decrypt,
}

/// Encrypt raw bytes.
pub fn encrypt(
    family: CipherFamily,
    spec: &CipherSpec,
    plaintext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    dispatch(family, spec, plaintext, Direction::Encrypt)
}

/// Decrypt raw bytes.
pub fn decrypt(
    family: CipherFamily,
    spec: &CipherSpec,
    ciphertext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    dispatch(family, spec, ciphertext, Direction::Decrypt)
}

fn dispatch(
    family: CipherFamily,
    spec: &CipherSpec,
    data: &[u8],
    direction: Direction,
) -> Result<Vec<u8>, CryptoError> {
    match (family, spec.key.len()) {
        (CipherFamily::Aes, 16) => run::<Aes128Suite>(spec, data, direction),
        (CipherFamily::Aes, 24) => run::<Aes192Suite>(spec, data, direction),
        (CipherFamily::Aes, 32) => run::<Aes256Suite>(spec, data, direction),
        (CipherFamily::Des, 8) => run::<DesSuite>(spec, data, direction),
        (family, len) => Err(CryptoError::InvalidKeyLength {
            cipher: family.name(),
            len,
        }),
    }
}

fn run<S: Suite>(
    spec: &CipherSpec,
    data: &[u8],
    direction: Direction,
) -> Result<Vec<u8>, CryptoError> {
    let block_size = <S::Block as BlockSizeUser>::block_size();
    if spec.mode.uses_iv() && spec.iv.len() != block_size {
        return Err(CryptoError::InvalidIvLength {
            cipher: S::NAME,
            expected: block_size,
            actual: spec.iv.len(),
        });
    }
    let bad_key = || CryptoError::InvalidKeyLength {
        cipher: S::NAME,
        len: spec.key.len(),
    };

    let padding = spec.padding.resolve();
    match (spec.mode, direction) {
        (CipherMode::Ecb, Direction::Encrypt) => {
            let cipher = ecb::Encryptor::<S::Block>::new_from_slice(&spec.key)
                .map_err(|_| bad_key())?;
            pad_encrypt(cipher, padding, data, block_size)
        }
        (CipherMode::Ecb, Direction::Decrypt) => {
            let cipher = ecb::Decryptor::<S::Block>::new_from_slice(&spec.key)
                .map_err(|_| bad_key())?;
            unpad_decrypt(cipher, padding, data, block_size)
        }
        (CipherMode::Cbc, Direction::Encrypt) => {
            let cipher = cbc::Encryptor::<S::Block>::new_from_slices(&spec.key, &spec.iv)
                .map_err(|_| bad_key())?;
            pad_encrypt(cipher, padding, data, block_size)
        }
        (CipherMode::Cbc, Direction::Decrypt) => {
            let cipher = cbc::Decryptor::<S::Block>::new_from_slices(&spec.key, &spec.iv)
                .map_err(|_| bad_key())?;
            unpad_decrypt(cipher, padding, data, block_size)
        }
        (CipherMode::Cfb, Direction::Encrypt) => {
            let mut buf = data.to_vec();
            cfb_mode::Encryptor::<S::Block>::new_from_slices(&spec.key, &spec.iv)
                .map_err(|_| bad_key())?
                .encrypt(&mut buf);
            Ok(buf)
        }
        (CipherMode::Cfb, Direction::Decrypt) => {
            let mut buf = data.to_vec();
            cfb_mode::Decryptor::<S::Block>::new_from_slices(&spec.key, &spec.iv)
                .map_err(|_| bad_key())?
                .decrypt(&mut buf);
            Ok(buf)
        }
        // OFB and CTR are symmetric keystream ciphers.
        (CipherMode::Ofb, _) => {
            let mut buf = data.to_vec();
            S::Ofb::new_from_slices(&spec.key, &spec.iv)
                .map_err(|_| bad_key())?
                .apply_keystream(&mut buf);
            Ok(buf)
        }
        (CipherMode::Ctr, _) => {
            let mut buf = data.to_vec();
            S::Ctr::new_from_slices(&spec.key, &spec.iv)
                .map_err(|_| bad_key())?
                .apply_keystream(&mut buf);
            Ok(buf)
        }
    }
}

fn pad_encrypt<E: BlockEncryptMut>(
    cipher: E,
    padding: PaddingScheme,
    data: &[u8],
    block_size: usize,
) -> Result<Vec<u8>, CryptoError> {
    let out = match padding {
        PaddingScheme::NoPadding => {
            if data.len() % block_size != 0 {
                return Err(CryptoError::UnalignedInput {
                    len: data.len(),
                    block_size,
                });
            }
            cipher.encrypt_padded_vec_mut::<NoPadding>(data)
        }
        PaddingScheme::Zeros => cipher.encrypt_padded_vec_mut::<ZeroPadding>(data),
        PaddingScheme::W3c => cipher.encrypt_padded_vec_mut::<Iso10126>(data),
        PaddingScheme::Pkcs | PaddingScheme::Default => {
            cipher.encrypt_padded_vec_mut::<Pkcs7>(data)
        }
    };
    Ok(out)
}

fn unpad_decrypt<D: BlockDecryptMut>(
    cipher: D,
    padding: PaddingScheme,
    data: &[u8],
    block_size: usize,
) -> Result<Vec<u8>, CryptoError> {
    if data.len() % block_size != 0 {
        return Err(CryptoError::UnalignedInput {
            len: data.len(),
            block_size,
        });
    }
    let out = match padding {
        PaddingScheme::NoPadding => cipher.decrypt_padded_vec_mut::<NoPadding>(data),
        PaddingScheme::Zeros => cipher.decrypt_padded_vec_mut::<ZeroPadding>(data),
        PaddingScheme::W3c => cipher.decrypt_padded_vec_mut::<Iso10126>(data),
        PaddingScheme::Pkcs | PaddingScheme::Default => {
            cipher.decrypt_padded_vec_mut::<Pkcs7>(data)
        }
    };
    out.map_err(|_| CryptoError::BadPadding)
}
