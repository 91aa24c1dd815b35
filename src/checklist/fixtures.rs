use serde_json::{json, Value};

use crate::capability::crypto::{CipherMode, CipherSpec, PaddingScheme};
use crate::config::{RunnerConfig, DEFAULT_DELAY_MS, DEFAULT_ECHO_URL, DEFAULT_RSA_BITS};

const SAMPLE_TEXT: &str = "这是一条测试消息";
const SAMPLE_GBK: [u8; 16] = [
    0xD5, 0xE2, 0xCA, 0xC7, 0xD2, 0xBB, 0xCC, 0xF5, 0xB2, 0xE2, 0xCA, 0xD4, 0xCF, 0xFB, 0xCF, 0xA2,
];
const SYMMETRIC_KEY: &str = "9uFCkzsu3NMtL.jC";
const SYMMETRIC_IV: &str = "pf7L-yDtb4-KW4Js";
const JSON_DOCUMENT: &str = r#"{
    "retcode": 0,
    "message": "OK",
    "data": {
        "code": "Fxq6j",
        "risk_code": 375,
        "success": 1
    }
}"#;

/// Constant inputs for one run.
#[derive(Debug, Clone)]
pub struct Fixtures {
    pub text: String,
    /// `text` in the GBK code page.
    pub gbk_bytes: Vec<u8>,
    pub key: String,
    pub iv: String,
    pub mode: CipherMode,
    pub padding: PaddingScheme,
    pub json_document: String,
    /// Paths into `json_document` and the values they must hold.
    pub json_expectations: Vec<(String, Value)>,
    pub echo_base_url: String,
    pub form: Vec<(String, String)>,
    pub raw_body: String,
    pub rsa_bits: usize,
    pub delay_ms: u64,
}

impl Default for Fixtures {
    fn default() -> Self {
        Self {
            text: SAMPLE_TEXT.to_string(),
            gbk_bytes: SAMPLE_GBK.to_vec(),
            key: SYMMETRIC_KEY.to_string(),
            iv: SYMMETRIC_IV.to_string(),
            mode: CipherMode::Cbc,
            padding: PaddingScheme::Pkcs,
            json_document: JSON_DOCUMENT.to_string(),
            json_expectations: vec![
                ("retcode".to_string(), json!(0)),
                ("message".to_string(), json!("OK")),
                ("data.risk_code".to_string(), json!(375)),
            ],
            echo_base_url: DEFAULT_ECHO_URL.to_string(),
            form: vec![
                ("a".to_string(), "123".to_string()),
                ("b".to_string(), "test".to_string()),
            ],
            raw_body: "a=123&b=test".to_string(),
            rsa_bits: DEFAULT_RSA_BITS,
            delay_ms: DEFAULT_DELAY_MS,
        }
    }
}

impl Fixtures {
    pub fn from_config(config: &RunnerConfig) -> Self {
        Self {
            echo_base_url: config.echo_base_url.clone(),
            rsa_bits: config.rsa_bits,
            delay_ms: config.delay_ms,
            ..Self::default()
        }
    }

    /// AES parameters: the full 16-byte key and IV.
    pub fn aes_spec(&self) -> CipherSpec {
        CipherSpec::new(&self.key, &self.iv, self.mode, self.padding)
    }

    /// DES parameters: the last 8 bytes of the key and IV.
    pub fn des_spec(&self) -> CipherSpec {
        CipherSpec::new(tail(&self.key, 8), tail(&self.iv, 8), self.mode, self.padding)
    }

    pub fn echo_url(&self, path: &str) -> String {
        format!("{}/{}", self.echo_base_url.trim_end_matches('/'), path)
    }
}

fn tail(text: &str, n: usize) -> &[u8] {
    let bytes = text.as_bytes();
    &bytes[bytes.len().saturating_sub(n)..]
}
