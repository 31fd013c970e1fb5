//! SharedKey request signing for the Azure Storage REST API.
//!
//! Blob, Queue, and File requests use the full SharedKey scheme; the Table
//! service uses its own shorter string-to-sign. Both produce an
//! `Authorization: SharedKey {account}:{signature}` header.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use url::Url;

use crate::error::RelayResult;

type HmacSha256 = Hmac<Sha256>;

/// Storage account credential used to sign outgoing requests.
#[derive(Debug, Clone)]
pub struct SharedKeyCredential {
    account: String,
    key: Vec<u8>,
}

impl SharedKeyCredential {
    /// Creates a credential, decoding the base64 account key up front so a
    /// bad key fails at startup rather than on the first request.
    pub fn new(account: impl Into<String>, base64_key: &str) -> RelayResult<Self> {
        Ok(Self {
            account: account.into(),
            key: BASE64.decode(base64_key)?,
        })
    }

    /// Returns the account name.
    pub fn account(&self) -> &str {
        &self.account
    }

    /// Signs a Blob/Queue/File service request and returns the
    /// Authorization header value.
    ///
    /// `ms_headers` must hold every `x-ms-*` header that will be sent,
    /// including `x-ms-date` and `x-ms-version`.
    pub fn authorize(
        &self,
        method: &str,
        url: &Url,
        content_length: Option<usize>,
        content_type: &str,
        ms_headers: &[(String, String)],
    ) -> String {
        let string_to_sign =
            build_string_to_sign(&self.account, method, url, content_length, content_type, ms_headers);
        format!("SharedKey {}:{}", self.account, self.sign(&string_to_sign))
    }

    /// Signs a Table service request and returns the Authorization header
    /// value. The Table string-to-sign carries only the verb, Content-MD5,
    /// Content-Type, the `x-ms-date` value, and the canonicalized resource.
    pub fn authorize_table(&self, method: &str, url: &Url, date: &str, content_type: &str) -> String {
        let string_to_sign =
            build_table_string_to_sign(&self.account, method, url, date, content_type);
        format!("SharedKey {}:{}", self.account, self.sign(&string_to_sign))
    }

    /// Computes the HMAC-SHA256 signature over a string-to-sign.
    fn sign(&self, string_to_sign: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(&self.key)
            .expect("HMAC accepts keys of any length");
        mac.update(string_to_sign.as_bytes());
        BASE64.encode(mac.finalize().into_bytes())
    }
}

/// Builds the string-to-sign for the full SharedKey scheme.
fn build_string_to_sign(
    account: &str,
    method: &str,
    url: &Url,
    content_length: Option<usize>,
    content_type: &str,
    ms_headers: &[(String, String)],
) -> String {
    let mut parts = Vec::new();

    // VERB
    parts.push(method.to_uppercase());

    // Content headers, in this exact order. Content-Length must be the
    // empty string when 0 or absent.
    parts.push(String::new()); // Content-Encoding
    parts.push(String::new()); // Content-Language
    parts.push(match content_length {
        Some(0) | None => String::new(),
        Some(len) => len.to_string(),
    });
    parts.push(String::new()); // Content-MD5
    parts.push(content_type.to_string());

    // Date stays empty because x-ms-date is always sent, followed by the
    // conditional headers we never use.
    for _ in 0..6 {
        parts.push(String::new());
    }

    let headers_str = parts.join("\n");
    let canonicalized_headers = build_canonicalized_headers(ms_headers);
    let canonicalized_resource = build_canonicalized_resource(account, url);

    format!("{headers_str}\n{canonicalized_headers}{canonicalized_resource}")
}

/// Builds the string-to-sign for the Table service.
fn build_table_string_to_sign(
    account: &str,
    method: &str,
    url: &Url,
    date: &str,
    content_type: &str,
) -> String {
    // VERB, Content-MD5, Content-Type, Date, CanonicalizedResource. Table
    // canonicalization ignores query parameters other than comp.
    let mut resource = format!("/{}{}", account, url.path());
    if let Some(comp) = url.query_pairs().find(|(k, _)| k == "comp") {
        resource.push_str("?comp=");
        resource.push_str(&comp.1);
    }
    format!("{}\n\n{content_type}\n{date}\n{resource}", method.to_uppercase())
}

/// Builds the canonicalized headers string: lowercase `x-ms-*` names sorted
/// alphabetically, each line ending with `\n`.
fn build_canonicalized_headers(ms_headers: &[(String, String)]) -> String {
    let mut headers: Vec<(String, &str)> = ms_headers
        .iter()
        .filter(|(name, _)| name.to_lowercase().starts_with("x-ms-"))
        .map(|(name, value)| (name.to_lowercase(), value.as_str()))
        .collect();
    headers.sort_by(|a, b| a.0.cmp(&b.0));

    let mut result = String::new();
    for (name, value) in headers {
        let normalized_value = value.split_whitespace().collect::<Vec<_>>().join(" ");
        result.push_str(&name);
        result.push(':');
        result.push_str(&normalized_value);
        result.push('\n');
    }
    result
}

/// Builds the canonicalized resource string: `/{account}{path}` plus query
/// parameters sorted by lowercase key as `\nkey:value` lines.
fn build_canonicalized_resource(account: &str, url: &Url) -> String {
    let path = percent_encoding::percent_decode_str(url.path()).decode_utf8_lossy();
    let mut resource = format!("/{account}{path}");

    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.to_lowercase(), v.into_owned()))
        .collect();
    params.sort_by(|a, b| a.0.cmp(&b.0));

    for (key, value) in params {
        resource.push('\n');
        resource.push_str(&key);
        resource.push(':');
        resource.push_str(&value);
    }

    resource
}
