//! HTTP capability backed by a blocking `reqwest` client.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, SET_COOKIE,
    USER_AGENT,
};
use reqwest::redirect::Policy;
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use super::crypto::encoding::form_urlencode;
use crate::error::RequestError;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const DEFAULT_ACCEPT_LANGUAGE: &str = "zh-cn";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const JSON_CONTENT_TYPE: &str = "application/json";

/// Default connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(100);

/// Request payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// Sent URL-encoded as `application/x-www-form-urlencoded`.
    Form(Vec<(String, String)>),
    /// Sent verbatim, labelled as form data.
    Raw(String),
    Json(Value),
}

impl Body {
    pub fn form<K: Into<String>, V: Into<String>>(pairs: impl IntoIterator<Item = (K, V)>) -> Self {
        Self::Form(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }

    fn encode(&self) -> Result<(String, &'static str), RequestError> {
        match self {
            Self::Form(pairs) => Ok((form_urlencode(pairs), FORM_CONTENT_TYPE)),
            Self::Raw(text) => Ok((text.clone(), FORM_CONTENT_TYPE)),
            Self::Json(value) => serde_json::to_string(value)
                .map(|text| (text, JSON_CONTENT_TYPE))
                .map_err(|e| RequestError::Body(e.to_string())),
        }
    }
}

/// Per-request options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOptions {
    /// Extra headers; these replace defaults with the same name.
    pub headers: Vec<(String, String)>,
    pub proxy: Option<String>,
    pub redirect: bool,
    /// Connect timeout. `None` uses the client's.
    pub timeout: Option<Duration>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            headers: Vec::new(),
            proxy: None,
            redirect: true,
            timeout: None,
        }
    }
}

impl RequestOptions {
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    fn needs_own_client(&self) -> bool {
        self.proxy.is_some() || !self.redirect || self.timeout.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HttpResponse {
    pub code: u16,
    /// Lowercase header names. Repeated `Set-Cookie` values are joined with `; `.
    pub headers: BTreeMap<String, String>,
    pub content: String,
}

impl HttpResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

pub trait Requests: Send + Sync {
    fn get(&self, url: &str, options: &RequestOptions) -> Result<HttpResponse, RequestError>;
    fn post(
        &self,
        url: &str,
        body: &Body,
        options: &RequestOptions,
    ) -> Result<HttpResponse, RequestError>;
    fn put(
        &self,
        url: &str,
        body: &Body,
        options: &RequestOptions,
    ) -> Result<HttpResponse, RequestError>;
    fn delete(&self, url: &str, options: &RequestOptions) -> Result<HttpResponse, RequestError>;
}

/// Client-wide settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientSettings {
    pub connect_timeout: Duration,
    pub accept_invalid_certs: bool,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            accept_invalid_certs: false,
        }
    }
}

/// Requests capability over `reqwest::blocking`.
///
/// Must not be created or dropped inside an async runtime.
#[derive(Debug)]
pub struct StandardRequests {
    client: Client,
    settings: ClientSettings,
}

impl StandardRequests {
    pub fn new(settings: ClientSettings) -> Result<Self, RequestError> {
        let client = build_client(&settings, &RequestOptions::default())?;
        Ok(Self { client, settings })
    }

    fn execute(
        &self,
        method: Method,
        url: &str,
        body: Option<&Body>,
        options: &RequestOptions,
    ) -> Result<HttpResponse, RequestError> {
        let one_off;
        let client = if options.needs_own_client() {
            one_off = build_client(&self.settings, options)?;
            &one_off
        } else {
            &self.client
        };

        let mut headers = default_headers();
        for (name, value) in &options.headers {
            let (name, value) = parse_header(name, value)?;
            headers.insert(name, value);
        }

        let mut request = client.request(method.clone(), url);
        if let Some(body) = body {
            let (payload, content_type) = body.encode()?;
            if !payload.is_empty() {
                if !headers.contains_key(CONTENT_TYPE) {
                    headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
                }
                request = request.body(payload);
            }
        }

        tracing::debug!(method = %method, url, "Sending request");
        let response = request
            .headers(headers)
            .send()
            .map_err(|source| RequestError::Transport {
                url: url.to_string(),
                source,
            })?;
        into_response(url, response)
    }
}

impl Requests for StandardRequests {
    fn get(&self, url: &str, options: &RequestOptions) -> Result<HttpResponse, RequestError> {
        self.execute(Method::GET, url, None, options)
    }

    fn post(
        &self,
        url: &str,
        body: &Body,
        options: &RequestOptions,
    ) -> Result<HttpResponse, RequestError> {
        self.execute(Method::POST, url, Some(body), options)
    }

    fn put(
        &self,
        url: &str,
        body: &Body,
        options: &RequestOptions,
    ) -> Result<HttpResponse, RequestError> {
        self.execute(Method::PUT, url, Some(body), options)
    }

    fn delete(&self, url: &str, options: &RequestOptions) -> Result<HttpResponse, RequestError> {
        self.execute(Method::DELETE, url, None, options)
    }
}

fn build_client(
    settings: &ClientSettings,
    options: &RequestOptions,
) -> Result<Client, RequestError> {
    let mut builder = Client::builder()
        .connect_timeout(options.timeout.unwrap_or(settings.connect_timeout))
        .danger_accept_invalid_certs(settings.accept_invalid_certs)
        .redirect(if options.redirect {
            Policy::default()
        } else {
            Policy::none()
        });
    if let Some(proxy) = &options.proxy {
        let proxy_config =
            reqwest::Proxy::all(proxy.as_str()).map_err(|source| RequestError::Proxy {
                proxy: proxy.clone(),
                source,
            })?;
        builder = builder.proxy(proxy_config);
    }
    builder.build().map_err(RequestError::Client)
}

fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(DEFAULT_ACCEPT_LANGUAGE));
    headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));
    headers
}

fn parse_header(name: &str, value: &str) -> Result<(HeaderName, HeaderValue), RequestError> {
    let invalid = |reason: String| RequestError::InvalidHeader {
        name: name.to_string(),
        reason,
    };
    let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| invalid(e.to_string()))?;
    let header_value = HeaderValue::from_str(value).map_err(|e| invalid(e.to_string()))?;
    Ok((header_name, header_value))
}

fn into_response(url: &str, response: Response) -> Result<HttpResponse, RequestError> {
    let code = response.status().as_u16();
    let headers = collect_headers(response.headers());
    let content = response.text().map_err(|source| RequestError::Transport {
        url: url.to_string(),
        source,
    })?;
    Ok(HttpResponse {
        code,
        headers,
        content,
    })
}

fn collect_headers(map: &HeaderMap) -> BTreeMap<String, String> {
    let mut headers: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in map {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        let separator = if name == SET_COOKIE { "; " } else { ", " };
        headers
            .entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(separator);
                existing.push_str(&value);
            })
            .or_insert(value);
    }
    headers
}
