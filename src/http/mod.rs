use crate::config::Config;
use crate::error::Error;
use base64::Engine; // for URL_SAFE_NO_PAD.encode/decode
use log::warn;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, Method};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How the credential travels on the wire. The Product Search API takes the
/// key as the `callInfo.apiKey` query parameter; the sandbox Order API uses
/// a Bearer token; the auth handshake itself carries nothing.
#[derive(Debug, Clone)]
pub enum Credential {
    ApiKey(String),
    Bearer(String),
    None,
}

/// One outbound call, built per invocation and discarded after.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub fn get(url: String) -> Self {
        Self { method: Method::GET, url, query: Vec::new(), body: None }
    }

    pub fn post(url: String, body: Option<serde_json::Value>) -> Self {
        Self { method: Method::POST, url, query: Vec::new(), body }
    }
}

/// Raw upstream response. The normalizer owns everything past this point,
/// including non-2xx statuses and application-level error bodies.
#[derive(Debug, Clone)]
pub struct Envelope {
    pub status: u16,
    pub body: Option<serde_json::Value>,
    pub text: String,
}

impl Envelope {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

pub fn build_client(cfg: &Config) -> reqwest::Result<Client> {
    let mut default_headers = HeaderMap::new();
    default_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Ok(ua) = HeaderValue::from_str(&cfg.user_agent) {
        default_headers.insert(USER_AGENT, ua);
    }
    Client::builder()
        .default_headers(default_headers)
        .timeout(Duration::from_secs(cfg.timeout_secs))
        .use_rustls_tls()
        .build()
}

// Exponential backoff with jitter: base 200ms * 2^attempt, max 2s.
fn compute_backoff(attempt: u32) -> Duration {
    let base = 200u64.saturating_mul(1u64 << attempt.min(4));
    let capped = base.min(2_000);
    let jitter = fastrand::u64(0..=capped / 2);
    Duration::from_millis(capped / 2 + jitter)
}

/// Perform one authenticated call with the client-level timeout.
///
/// Only transport failures (timeout, connect, reset) are retried, up to
/// `max_retries` additional attempts. Any received HTTP response ends the
/// loop: a non-2xx with a parseable error body is a structured upstream
/// failure, not a transient one, and passes through untouched.
pub async fn execute(
    client: &Client,
    request: &ApiRequest,
    credential: &Credential,
    max_retries: u32,
) -> Result<Envelope, Error> {
    let mut attempt: u32 = 0;
    loop {
        let mut builder = client.request(request.method.clone(), &request.url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        match credential {
            Credential::ApiKey(key) => {
                builder = builder.query(&[("callInfo.apiKey", key.as_str())]);
            }
            Credential::Bearer(token) => {
                builder = builder.bearer_auth(token);
            }
            Credential::None => {}
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let res = match builder.send().await {
            Ok(r) => r,
            Err(e) => {
                if attempt < max_retries {
                    let backoff = compute_backoff(attempt);
                    warn!(
                        "{} {} failed ({}), retrying in {:?}",
                        request.method, request.url, e, backoff
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                    continue;
                }
                return Err(Error::TransientNetwork {
                    attempts: attempt + 1,
                    message: e.to_string(),
                });
            }
        };

        let status = res.status().as_u16();
        let text = res.text().await.unwrap_or_default();
        let body = serde_json::from_str::<serde_json::Value>(&text).ok();
        return Ok(Envelope { status, body, text });
    }
}

// Opaque search continuation cursor: base64(JSON { offset, num_results })
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchCursor {
    pub offset: u32,
    pub num_results: u32,
}

pub fn encode_search_cursor(c: SearchCursor) -> String {
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(serde_json::to_vec(&c).unwrap())
}

pub fn decode_search_cursor(s: &str) -> Option<SearchCursor> {
    let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(s)
        .ok()?;
    serde_json::from_slice(&bytes).ok()
}
