//! The checklist runner.
//!
//! Groups run one after another in canonical order. Each group opens with an
//! `operation` banner, logs one line per capability call and closes with a
//! `succeed` banner. The first error inside a group aborts the rest of that
//! group and is reported through `failed`.

use std::time::Instant;

use serde_json::Value;

use super::{Fixtures, Group, GroupOutcome, GroupStatus, RunReport};
use crate::capability::crypto::{DigestAlgorithm, KeyEncoding};
use crate::capability::json::lookup;
use crate::capability::{Body, Capabilities, HttpResponse, RequestOptions};
use crate::error::{CapabilityError, ChecklistError};
use crate::cap_log;
use crate::telemetry::{GroupSpan, SpanExt};

const BANNER_RULE_START: &str = "------------------------------";
const BANNER_RULE_END: &str = "==============================";

pub fn start_banner(group: Group) -> String {
    format!(
        "{}start test module: {}{}",
        BANNER_RULE_START, group, BANNER_RULE_START
    )
}

pub fn end_banner(group: Group) -> String {
    format!(
        "{}end test module: {}{}",
        BANNER_RULE_END, group, BANNER_RULE_END
    )
}

type GroupResult = Result<(), CapabilityError>;

pub struct ChecklistRunner {
    caps: Capabilities,
    fixtures: Fixtures,
    passport: String,
}

impl ChecklistRunner {
    pub fn new(caps: Capabilities, fixtures: Fixtures) -> Self {
        Self {
            caps,
            fixtures,
            passport: String::new(),
        }
    }

    /// Passport handed to the host hook before the groups run.
    pub fn with_passport(mut self, passport: impl Into<String>) -> Self {
        self.passport = passport.into();
        self
    }

    pub fn fixtures(&self) -> &Fixtures {
        &self.fixtures
    }

    /// Run every group, best-effort.
    pub fn run(&self) -> RunReport {
        self.run_groups(&Group::ALL)
    }

    /// Run `groups` in canonical order. A failing group does not stop the
    /// ones after it.
    pub fn run_groups(&self, groups: &[Group]) -> RunReport {
        let (report, _) = self.execute(groups, false);
        report
    }

    /// Run `groups`, stopping at the first failure.
    pub fn run_strict(&self, groups: &[Group]) -> Result<RunReport, ChecklistError> {
        match self.execute(groups, true) {
            (_, Some(err)) => Err(err),
            (report, None) => Ok(report),
        }
    }

    fn execute(
        &self,
        groups: &[Group],
        stop_on_failure: bool,
    ) -> (RunReport, Option<ChecklistError>) {
        let mut report = RunReport::new();
        let run_id = report.run_id.to_string();
        let groups = Group::canonical(groups);
        tracing::info!(run_id = %run_id, groups = groups.len(), "Checklist run started");

        self.caps.passport.set_task_passport(&self.passport);

        for group in groups {
            let span = GroupSpan::new(&run_id, group.as_str());
            let started = Instant::now();
            let result = span.in_scope(|| self.run_group(group));
            let elapsed_ms = started.elapsed().as_millis() as u64;
            span.record_result(&result);
            span.record("latency_ms", elapsed_ms);

            match result {
                Ok(()) => report.outcomes.push(GroupOutcome {
                    group,
                    status: GroupStatus::Passed,
                    elapsed_ms,
                }),
                Err(source) => {
                    tracing::warn!(
                        run_id = %run_id,
                        group = %group,
                        error = %source,
                        "Group failed"
                    );
                    report.outcomes.push(GroupOutcome {
                        group,
                        status: GroupStatus::Failed {
                            error: source.to_string(),
                        },
                        elapsed_ms,
                    });
                    if stop_on_failure {
                        return (report, Some(ChecklistError { group, source }));
                    }
                }
            }
        }

        tracing::info!(run_id = %run_id, passed = report.passed(), "Checklist run finished");
        (report, None)
    }

    /// Run a single group with its banners, logging a failure if one occurs.
    pub fn run_group(&self, group: Group) -> GroupResult {
        let logger = &self.caps.logger;
        cap_log!(logger, operation, start_banner(group));

        let result = match group {
            Group::Crypto => self.check_crypto(),
            Group::Json => self.check_json(),
            Group::Requests => self.check_requests(),
            Group::Tools => self.check_tools(),
            Group::System => self.check_system(),
        };

        match &result {
            Ok(()) => cap_log!(logger, succeed, end_banner(group)),
            Err(e) => cap_log!(logger, failed, group, e),
        }
        result
    }

    fn check_crypto(&self) -> GroupResult {
        let crypto = &self.caps.crypto;
        let logger = &self.caps.logger;
        let f = &self.fixtures;

        let gbk = crypto.utf8_to_gbk(&f.text)?;
        cap_log!(logger, info, "crypto.utf8ToGBK", hex::encode_upper(&gbk));
        if gbk != f.gbk_bytes {
            return Err(CapabilityError::mismatch(
                "crypto.utf8ToGBK",
                hex::encode_upper(&f.gbk_bytes),
                hex::encode_upper(&gbk),
            ));
        }
        let decoded = crypto.gbk_to_utf8(&f.gbk_bytes)?;
        cap_log!(logger, info, "crypto.gbkToUTF8", decoded);
        expect_eq("crypto.gbkToUTF8", &f.text, &decoded)?;

        let encoded = crypto.url_encode(&f.text);
        cap_log!(logger, info, "crypto.urlEncode", encoded);
        let decoded = crypto.url_decode(&encoded)?;
        cap_log!(logger, info, "crypto.urlDecode", decoded);
        expect_eq("crypto.urlDecode", &f.text, &decoded)?;

        let encoded = crypto.base64_encode(&f.text);
        cap_log!(logger, info, "crypto.base64Encode", encoded);
        let decoded = crypto.base64_decode(&encoded)?;
        cap_log!(logger, info, "crypto.base64Decode", decoded);
        expect_eq("crypto.base64Decode", &f.text, &decoded)?;

        for algorithm in DigestAlgorithm::ALL {
            let digest = crypto.digest(algorithm, &f.text);
            cap_log!(logger, info, algorithm.call_name(), digest);
            check_digest(algorithm, &digest)?;
            let again = crypto.digest(algorithm, &f.text);
            expect_eq(algorithm.call_name(), &digest, &again)?;
        }

        let spec = f.aes_spec();
        let sealed = crypto.aes_encrypt(&f.text, &spec)?;
        cap_log!(logger, info, "crypto.aesEncrypt", sealed);
        let opened = crypto.aes_decrypt(&sealed, &spec)?;
        cap_log!(logger, info, "crypto.aesDecrypt", opened);
        expect_eq("crypto.aesDecrypt", &f.text, &opened)?;

        let spec = f.des_spec();
        let sealed = crypto.des_encrypt(&f.text, &spec)?;
        cap_log!(logger, info, "crypto.desEncrypt", sealed);
        let opened = crypto.des_decrypt(&sealed, &spec)?;
        cap_log!(logger, info, "crypto.desDecrypt", opened);
        expect_eq("crypto.desDecrypt", &f.text, &opened)?;

        let pair = crypto.rsa_generate_key_pair(f.rsa_bits, KeyEncoding::Hex, None)?;
        cap_log!(logger, succeed, "crypto.rsaGenerateKeyPair publicKey", pair.public_key);
        cap_log!(logger, succeed, "crypto.rsaGenerateKeyPair privateKey", pair.private_key);
        let sealed = crypto.rsa_encrypt(&pair.public_key, &f.text, true)?;
        cap_log!(logger, info, "crypto.rsaEncrypt", sealed);
        let opened = crypto.rsa_decrypt(&pair.private_key, &sealed, true)?;
        cap_log!(logger, info, "crypto.rsaDecrypt", opened);
        expect_eq("crypto.rsaDecrypt", &f.text, &opened)
    }

    fn check_json(&self) -> GroupResult {
        let json = &self.caps.json;
        let logger = &self.caps.logger;
        let f = &self.fixtures;

        let document = json.loads(&f.json_document)?;
        for (path, expected) in &f.json_expectations {
            let actual = lookup(&document, path)
                .ok_or_else(|| CapabilityError::MissingField(path.clone()))?;
            cap_log!(logger, info, format!("json.loads {}", path), scalar(actual));
            if actual != expected {
                return Err(CapabilityError::mismatch(
                    format!("json.loads {}", path),
                    expected.to_string(),
                    actual.to_string(),
                ));
            }
        }

        let data = lookup(&document, "data")
            .ok_or_else(|| CapabilityError::MissingField("data".to_string()))?;
        let text = json.dumps(data)?;
        cap_log!(logger, info, "json.dumps", text);
        let reparsed = json.loads(&text)?;
        if &reparsed != data {
            return Err(CapabilityError::mismatch(
                "json.dumps",
                data.to_string(),
                reparsed.to_string(),
            ));
        }
        Ok(())
    }

    fn check_requests(&self) -> GroupResult {
        let requests = &self.caps.requests;
        let f = &self.fixtures;
        let options = RequestOptions::default();

        let url = f.echo_url("get");
        self.check_response("requests.get", &url, &requests.get(&url, &options)?)?;

        let url = f.echo_url("post");
        let body = Body::Form(f.form.clone());
        self.check_response("requests.post", &url, &requests.post(&url, &body, &options)?)?;

        let url = f.echo_url("put");
        let body = Body::Raw(f.raw_body.clone());
        self.check_response("requests.put", &url, &requests.put(&url, &body, &options)?)?;

        let url = f.echo_url("delete");
        self.check_response("requests.delete", &url, &requests.delete(&url, &options)?)
    }

    /// Log the response; an empty body fails the call.
    fn check_response(&self, call: &str, url: &str, response: &HttpResponse) -> GroupResult {
        cap_log!(self.caps.logger, info, call, url, response.code, response.content);
        if response.content.is_empty() {
            return Err(CapabilityError::mismatch(
                call,
                "non-empty body",
                format!("status {} with empty body", response.code),
            ));
        }
        Ok(())
    }

    fn check_tools(&self) -> GroupResult {
        let logger = &self.caps.logger;
        let text = &self.fixtures.text;
        cap_log!(logger, operation, "tools.logger.operation", text);
        cap_log!(logger, info, "tools.logger.info", text);
        cap_log!(logger, failed, "tools.logger.failed", text);
        cap_log!(logger, succeed, "tools.logger.succeed", text);
        Ok(())
    }

    fn check_system(&self) -> GroupResult {
        let logger = &self.caps.logger;
        let delay_ms = self.fixtures.delay_ms;

        cap_log!(logger, info, "system.delay", format!("{}ms", delay_ms));
        let started = Instant::now();
        self.caps.system.delay(delay_ms);
        let elapsed_ms = started.elapsed().as_millis() as u64;
        cap_log!(logger, info, "system.delay end", format!("{}ms", elapsed_ms));

        if elapsed_ms < delay_ms {
            return Err(CapabilityError::mismatch(
                "system.delay",
                format!(">= {}ms", delay_ms),
                format!("{}ms", elapsed_ms),
            ));
        }
        Ok(())
    }
}

fn expect_eq(operation: &str, expected: &str, actual: &str) -> GroupResult {
    if expected == actual {
        Ok(())
    } else {
        Err(CapabilityError::mismatch(operation, expected, actual))
    }
}

fn check_digest(algorithm: DigestAlgorithm, digest: &str) -> GroupResult {
    let well_formed =
        digest.len() == algorithm.hex_len() && digest.chars().all(|c| c.is_ascii_hexdigit());
    if well_formed {
        Ok(())
    } else {
        Err(CapabilityError::mismatch(
            algorithm.call_name(),
            format!("{} hex characters", algorithm.hex_len()),
            digest,
        ))
    }
}

/// Strings render bare, everything else as JSON.
fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banners() {
        assert_eq!(
            start_banner(Group::Json),
            "------------------------------start test module: json------------------------------"
        );
        assert_eq!(
            end_banner(Group::Tools),
            "==============================end test module: tools=============================="
        );
    }

    #[test]
    fn test_check_digest_rejects_short_output() {
        assert!(check_digest(DigestAlgorithm::Md5, &"A".repeat(32)).is_ok());
        assert!(check_digest(DigestAlgorithm::Md5, &"A".repeat(31)).is_err());
        assert!(check_digest(DigestAlgorithm::Sha1, &"Z".repeat(40)).is_err());
    }

    #[test]
    fn test_scalar_strips_string_quotes() {
        assert_eq!(scalar(&serde_json::json!("OK")), "OK");
        assert_eq!(scalar(&serde_json::json!(375)), "375");
    }
}
