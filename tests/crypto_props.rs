//! Property tests for the reversible crypto operations.

use capprobe::capability::crypto::{CipherMode, CipherSpec, PaddingScheme};
use capprobe::capability::{Crypto, StandardCrypto};
use proptest::prelude::*;

fn mode() -> impl Strategy<Value = CipherMode> {
    prop_oneof![
        Just(CipherMode::Ecb),
        Just(CipherMode::Cbc),
        Just(CipherMode::Cfb),
        Just(CipherMode::Ctr),
        Just(CipherMode::Ofb),
    ]
}

fn padding() -> impl Strategy<Value = PaddingScheme> {
    prop_oneof![
        Just(PaddingScheme::Default),
        Just(PaddingScheme::Pkcs),
        Just(PaddingScheme::W3c),
    ]
}

proptest! {
    #[test]
    fn url_round_trip(text in any::<String>()) {
        let crypto = StandardCrypto;
        prop_assert_eq!(crypto.url_decode(&crypto.url_encode(&text)).unwrap(), text);
    }

    #[test]
    fn url_encoding_is_ascii(text in any::<String>()) {
        let encoded = StandardCrypto.url_encode(&text);
        prop_assert!(encoded.is_ascii());
        prop_assert!(!encoded.contains(' '));
    }

    #[test]
    fn base64_round_trip(text in any::<String>()) {
        let crypto = StandardCrypto;
        let encoded = crypto.base64_encode(&text);
        prop_assert!(!encoded.contains('\n'));
        prop_assert_eq!(crypto.base64_decode(&encoded).unwrap(), text);
    }

    #[test]
    fn gbk_round_trip(text in "[a-zA-Z0-9 \u{4e00}-\u{9fa5}]{0,32}") {
        let crypto = StandardCrypto;
        let bytes = crypto.utf8_to_gbk(&text).unwrap();
        prop_assert_eq!(crypto.gbk_to_utf8(&bytes).unwrap(), text);
    }

    #[test]
    fn aes_round_trip(
        text in any::<String>(),
        key in prop::sample::select(vec![16usize, 24, 32]),
        iv in prop::array::uniform16(any::<u8>()),
        mode in mode(),
        padding in padding(),
    ) {
        let spec = CipherSpec::new(vec![0x5a; key], iv, mode, padding);
        let crypto = StandardCrypto;
        let sealed = crypto.aes_encrypt(&text, &spec).unwrap();
        prop_assert_eq!(crypto.aes_decrypt(&sealed, &spec).unwrap(), text);
    }

    #[test]
    fn des_round_trip(
        text in any::<String>(),
        key in prop::array::uniform8(any::<u8>()),
        iv in prop::array::uniform8(any::<u8>()),
        mode in mode(),
        padding in padding(),
    ) {
        let spec = CipherSpec::new(key, iv, mode, padding);
        let crypto = StandardCrypto;
        let sealed = crypto.des_encrypt(&text, &spec).unwrap();
        prop_assert_eq!(crypto.des_decrypt(&sealed, &spec).unwrap(), text);
    }

    #[test]
    fn digests_are_stable(text in any::<String>()) {
        let crypto = StandardCrypto;
        prop_assert_eq!(crypto.sha256(&text), crypto.sha256(&text));
        prop_assert_eq!(crypto.md5(&text).len(), 32);
    }
}
