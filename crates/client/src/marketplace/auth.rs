//! Request signing for the upstream marketplace API.
//!
//! Every outgoing request carries an `Authorization` header computed from
//! process-wide credentials. Two schemes are supported behind the
//! [`RequestSigner`] trait so the scheme can change without touching
//! callers:
//!
//! - [`BearerSigner`]: a static bearer-style token.
//! - [`HmacSigner`]: a per-request OAuth-1.0a-style signature, HMAC-SHA1
//!   over method, URL, timestamp, and nonce with the consumer secret.
//!
//! Credentials never appear in the produced header values, in `Debug`
//! output, or in logs.

use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::Utc;
use hmac::{Hmac, Mac};
use rand::Rng;
use rand::distributions::Alphanumeric;
use sha1::Sha1;

use super::UpstreamError;

type HmacSha1 = Hmac<Sha1>;

/// Produces the `Authorization` header value for one outgoing request.
pub trait RequestSigner: Send + Sync {
    fn authorization(&self, method: &str, url: &str) -> Result<String, UpstreamError>;
}

/// Static bearer-token scheme.
#[derive(Clone)]
pub struct BearerSigner {
    token: String,
}

impl BearerSigner {
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }
}

impl RequestSigner for BearerSigner {
    fn authorization(&self, _method: &str, _url: &str) -> Result<String, UpstreamError> {
        if self.token.is_empty() {
            return Err(UpstreamError::MissingCredentials);
        }
        Ok(format!("Bearer {}", self.token))
    }
}

impl fmt::Debug for BearerSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerSigner").field("token", &"<redacted>").finish()
    }
}

/// Per-request HMAC-SHA1 signature scheme.
#[derive(Clone)]
pub struct HmacSigner {
    consumer_key: String,
    consumer_secret: String,
}

impl HmacSigner {
    pub fn new(consumer_key: impl Into<String>, consumer_secret: impl Into<String>) -> Self {
        Self { consumer_key: consumer_key.into(), consumer_secret: consumer_secret.into() }
    }

    /// Compute the base64 HMAC-SHA1 signature for the given request inputs.
    ///
    /// Deterministic for a fixed method/URL/timestamp/nonce combination.
    pub fn signature(&self, method: &str, url: &str, timestamp: i64, nonce: &str) -> Result<String, UpstreamError> {
        let base_string =
            format!("{}&{}&{timestamp}&{nonce}", method.to_ascii_uppercase(), percent_encode(url));
        let signing_key = format!("{}&", percent_encode(&self.consumer_secret));

        let mut mac = HmacSha1::new_from_slice(signing_key.as_bytes())
            .map_err(|e| UpstreamError::Signing(e.to_string()))?;
        mac.update(base_string.as_bytes());

        Ok(BASE64.encode(mac.finalize().into_bytes()))
    }
}

impl RequestSigner for HmacSigner {
    fn authorization(&self, method: &str, url: &str) -> Result<String, UpstreamError> {
        if self.consumer_key.is_empty() || self.consumer_secret.is_empty() {
            return Err(UpstreamError::MissingCredentials);
        }

        let timestamp = Utc::now().timestamp();
        let nonce: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(16)
            .map(char::from)
            .collect();
        let signature = self.signature(method, url, timestamp, &nonce)?;

        Ok(format!(
            "OAuth oauth_consumer_key=\"{}\", oauth_signature_method=\"HMAC-SHA1\", \
             oauth_timestamp=\"{timestamp}\", oauth_nonce=\"{nonce}\", oauth_version=\"1.0\", \
             oauth_signature=\"{}\"",
            percent_encode(&self.consumer_key),
            percent_encode(&signature),
        ))
    }
}

impl fmt::Debug for HmacSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HmacSigner")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"<redacted>")
            .finish()
    }
}

/// RFC 3986 percent-encoding over the unreserved character set.
fn percent_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => out.push(byte as char),
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://api.example.co.nz/v1/Search/Motors/Used.json";

    #[test]
    fn test_bearer_header() {
        let signer = BearerSigner::new("tok-123");
        let header = signer.authorization("GET", URL).unwrap();
        assert_eq!(header, "Bearer tok-123");
    }

    #[test]
    fn test_bearer_empty_token() {
        let signer = BearerSigner::new("");
        assert!(matches!(signer.authorization("GET", URL), Err(UpstreamError::MissingCredentials)));
    }

    #[test]
    fn test_signature_deterministic_for_fixed_inputs() {
        let signer = HmacSigner::new("key", "secret");
        let a = signer.signature("GET", URL, 1_700_000_000, "abcdef0123456789").unwrap();
        let b = signer.signature("GET", URL, 1_700_000_000, "abcdef0123456789").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_signature_varies_with_inputs() {
        let signer = HmacSigner::new("key", "secret");
        let base = signer.signature("GET", URL, 1_700_000_000, "nonce").unwrap();

        assert_ne!(base, signer.signature("POST", URL, 1_700_000_000, "nonce").unwrap());
        assert_ne!(base, signer.signature("GET", URL, 1_700_000_001, "nonce").unwrap());
        assert_ne!(base, signer.signature("GET", URL, 1_700_000_000, "other").unwrap());
    }

    #[test]
    fn test_header_carries_key_but_never_secret() {
        let signer = HmacSigner::new("consumer-key", "super-secret-value");
        let header = signer.authorization("GET", URL).unwrap();

        assert!(header.starts_with("OAuth "));
        assert!(header.contains("oauth_consumer_key=\"consumer-key\""));
        assert!(header.contains("oauth_signature_method=\"HMAC-SHA1\""));
        assert!(!header.contains("super-secret-value"));
    }

    #[test]
    fn test_hmac_missing_credentials() {
        let signer = HmacSigner::new("", "");
        assert!(matches!(signer.authorization("GET", URL), Err(UpstreamError::MissingCredentials)));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let bearer = format!("{:?}", BearerSigner::new("tok-123"));
        assert!(!bearer.contains("tok-123"));

        let hmac = format!("{:?}", HmacSigner::new("key", "super-secret-value"));
        assert!(!hmac.contains("super-secret-value"));
    }

    #[test]
    fn test_percent_encode() {
        assert_eq!(percent_encode("abc-123_~."), "abc-123_~.");
        assert_eq!(percent_encode("a b/c"), "a%20b%2Fc");
        assert_eq!(percent_encode("https://x.nz/v1"), "https%3A%2F%2Fx.nz%2Fv1");
    }
}
