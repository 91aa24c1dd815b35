//! Text encodings: GBK code page, URL (form) encoding and base64.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::error::CryptoError;

/// Everything except `A-Z a-z 0-9 - _ . ~` is escaped.
const URL_ESCAPED: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Encode UTF-8 text into the GBK code page.
pub fn utf8_to_gbk(text: &str) -> Result<Vec<u8>, CryptoError> {
    let (bytes, _, unmappable) = encoding_rs::GBK.encode(text);
    if unmappable {
        return Err(CryptoError::UnmappableGbk);
    }
    Ok(bytes.into_owned())
}

/// Decode GBK bytes into UTF-8 text. Malformed sequences are rejected.
pub fn gbk_to_utf8(bytes: &[u8]) -> Result<String, CryptoError> {
    encoding_rs::GBK
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(|text| text.into_owned())
        .ok_or(CryptoError::MalformedGbk)
}

/// URL-encode text. Spaces become `+`, other reserved bytes `%XX`.
pub fn url_encode(text: &str) -> String {
    text.split(' ')
        .map(|part| utf8_percent_encode(part, URL_ESCAPED).to_string())
        .collect::<Vec<_>>()
        .join("+")
}

/// Reverse of [`url_encode`]; also accepts lowercase escapes.
pub fn url_decode(text: &str) -> Result<String, CryptoError> {
    let spaced = text.replace('+', " ");
    percent_decode_str(&spaced)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|_| CryptoError::InvalidUtf8)
}

/// `application/x-www-form-urlencoded` body for key/value pairs.
pub fn form_urlencode<K, V>(pairs: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", url_encode(k.as_ref()), url_encode(v.as_ref())))
        .collect::<Vec<_>>()
        .join("&")
}

pub fn base64_encode(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Decode base64, skipping embedded line breaks and other ASCII whitespace.
pub fn base64_decode(text: &str) -> Result<Vec<u8>, CryptoError> {
    let compact: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    Ok(STANDARD.decode(compact)?)
}

pub fn base64_decode_utf8(text: &str) -> Result<String, CryptoError> {
    String::from_utf8(base64_decode(text)?).map_err(|_| CryptoError::InvalidUtf8)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "这是一条测试消息";
    const SAMPLE_GBK: [u8; 16] = [
        0xD5, 0xE2, 0xCA, 0xC7, 0xD2, 0xBB, 0xCC, 0xF5, 0xB2, 0xE2, 0xCA, 0xD4, 0xCF, 0xFB, 0xCF,
        0xA2,
    ];

    #[test]
    fn test_gbk_known_bytes() {
        assert_eq!(utf8_to_gbk(SAMPLE).unwrap(), SAMPLE_GBK);
        assert_eq!(gbk_to_utf8(&SAMPLE_GBK).unwrap(), SAMPLE);
    }

    #[test]
    fn test_gbk_rejects_truncated_sequence() {
        assert!(matches!(
            gbk_to_utf8(&SAMPLE_GBK[..3]),
            Err(CryptoError::MalformedGbk)
        ));
    }

    #[test]
    fn test_gbk_rejects_unmappable() {
        assert!(matches!(utf8_to_gbk("😀"), Err(CryptoError::UnmappableGbk)));
    }

    #[test]
    fn test_url_encode_reserved_and_space() {
        assert_eq!(url_encode("a b&c=d~e"), "a+b%26c%3Dd~e");
        assert_eq!(url_encode("中"), "%E4%B8%AD");
        assert_eq!(url_encode("+"), "%2B");
    }

    #[test]
    fn test_url_decode_lowercase_escape() {
        assert_eq!(url_decode("%e4%b8%ad+x").unwrap(), "中 x");
        assert_eq!(url_decode("%2B").unwrap(), "+");
    }

    #[test]
    fn test_url_decode_invalid_utf8() {
        assert!(matches!(url_decode("%FF"), Err(CryptoError::InvalidUtf8)));
    }

    #[test]
    fn test_form_urlencode() {
        let body = form_urlencode(&[("a", "123"), ("b", "test value")]);
        assert_eq!(body, "a=123&b=test+value");
    }

    #[test]
    fn test_base64_ignores_line_breaks() {
        let encoded = base64_encode(SAMPLE.as_bytes());
        let (head, tail) = encoded.split_at(10);
        let wrapped = format!("{}\n{}\r\n", head, tail);
        assert_eq!(base64_decode_utf8(&wrapped).unwrap(), SAMPLE);
    }

    #[test]
    fn test_base64_rejects_garbage() {
        assert!(matches!(base64_decode("@@@@"), Err(CryptoError::Base64(_))));
    }
}
