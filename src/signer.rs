//! RSA-PSS request signing for the Kalshi trade API.
//!
//! Signature format: `RSA-PSS(SHA256, timestamp + METHOD + path)` → base64,
//! salt length equal to the digest length. The path never includes the query.

use crate::error::{ExchangeError, SigningError};
use base64::{engine::general_purpose, Engine as _};
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::pss::BlindedSigningKey;
use rsa::signature::{RandomizedSigner, SignatureEncoding};
use rsa::RsaPrivateKey;
use sha2::Sha256;
use std::sync::OnceLock;
use tracing::warn;

pub const ACCESS_KEY_HEADER: &str = "kalshi-access-key";
pub const ACCESS_SIGNATURE_HEADER: &str = "kalshi-access-signature";
pub const ACCESS_TIMESTAMP_HEADER: &str = "kalshi-access-timestamp";

fn pem_begin() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"-----BEGIN ([^-]+)-----").expect("static regex"))
}

fn pem_end() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"-----END ([^-]+)-----").expect("static regex"))
}

/// Repair a PEM that went through an environment variable.
///
/// Literal `\n` escapes and double quotes are removed, then the base64 body is
/// re-wrapped at 64 columns between the original BEGIN/END markers. Input
/// without both markers is returned trimmed but otherwise untouched.
pub fn normalize_pem(raw: &str) -> String {
    let unescaped = raw.replace("\\n", "\n").replace('"', "");
    let normalized = unescaped.trim();

    let label = match (pem_begin().captures(normalized), pem_end().is_match(normalized)) {
        (Some(caps), true) => caps[1].to_string(),
        _ => return normalized.to_string(),
    };

    let without_begin = pem_begin().replace(normalized, "");
    let body = pem_end().replace(&without_begin, "");
    let b64: Vec<char> = body.chars().filter(|c| !c.is_whitespace()).collect();
    let wrapped = b64
        .chunks(64)
        .map(|line| line.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join("\n");

    format!("-----BEGIN {label}-----\n{wrapped}\n-----END {label}-----")
}

/// Output of one signing call. Both fields are empty when signing failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    pub signature: String,
    pub timestamp: String,
}

impl SignedRequest {
    fn empty() -> Self {
        Self {
            signature: String::new(),
            timestamp: String::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.signature.is_empty()
    }
}

/// Holds the API key id and the parsed signing key.
#[derive(Clone)]
pub struct RequestSigner {
    key_id: String,
    configured: bool,
    signing_key: Option<BlindedSigningKey<Sha256>>,
}

impl std::fmt::Debug for RequestSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestSigner")
            .field("key_id", &self.key_id)
            .field("configured", &self.configured)
            .field("signing_key", &self.signing_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl RequestSigner {
    /// A malformed key does not fail construction: every signature produced
    /// afterwards is empty and the exchange rejects the request.
    pub fn new(key_id: impl Into<String>, raw_private_key: &str) -> Self {
        let key_id = key_id.into();
        let pem = normalize_pem(raw_private_key);
        let configured = !key_id.is_empty() && pem.contains("PRIVATE KEY");

        let signing_key = if pem.is_empty() {
            None
        } else {
            match parse_signing_key(&pem) {
                Ok(key) => Some(key),
                Err(e) => {
                    warn!("Kalshi request signing disabled: {}", e);
                    None
                }
            }
        };

        Self {
            key_id,
            configured,
            signing_key,
        }
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Credentials are present. Says nothing about whether the key parses.
    pub fn is_configured(&self) -> bool {
        self.configured
    }

    pub fn sign(&self, method: &str, path: &str) -> SignedRequest {
        self.sign_at(chrono::Utc::now().timestamp_millis(), method, path)
    }

    pub fn sign_at(&self, timestamp_ms: i64, method: &str, path: &str) -> SignedRequest {
        let Some(signing_key) = &self.signing_key else {
            return SignedRequest::empty();
        };

        let timestamp = timestamp_ms.to_string();
        let message = signing_message(&timestamp, method, path);
        let signature = signing_key.sign_with_rng(&mut rand::thread_rng(), message.as_bytes());

        SignedRequest {
            signature: general_purpose::STANDARD.encode(signature.to_bytes()),
            timestamp,
        }
    }

    /// Fresh authentication headers. Call once per request, never reuse.
    pub fn headers(&self, method: &str, path: &str) -> Result<HeaderMap, ExchangeError> {
        let signed = self.sign(method, path);

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            ACCESS_KEY_HEADER,
            HeaderValue::from_str(&self.key_id)
                .map_err(|_| ExchangeError::InvalidHeader(ACCESS_KEY_HEADER))?,
        );
        headers.insert(
            ACCESS_SIGNATURE_HEADER,
            HeaderValue::from_str(&signed.signature)
                .map_err(|_| ExchangeError::InvalidHeader(ACCESS_SIGNATURE_HEADER))?,
        );
        headers.insert(
            ACCESS_TIMESTAMP_HEADER,
            HeaderValue::from_str(&signed.timestamp)
                .map_err(|_| ExchangeError::InvalidHeader(ACCESS_TIMESTAMP_HEADER))?,
        );

        Ok(headers)
    }
}

/// `timestamp + METHOD + path`, with any query string dropped.
pub fn signing_message(timestamp: &str, method: &str, path: &str) -> String {
    let path = path.split('?').next().unwrap_or(path);
    format!("{}{}{}", timestamp, method.to_uppercase(), path)
}

fn parse_signing_key(pem: &str) -> Result<BlindedSigningKey<Sha256>, SigningError> {
    if !pem_begin().is_match(pem) {
        return Err(SigningError::MissingPemMarkers);
    }

    let private_key = RsaPrivateKey::from_pkcs1_pem(pem)
        .or_else(|_| RsaPrivateKey::from_pkcs8_pem(pem))
        .map_err(|e| SigningError::MalformedKey(e.to_string()))?;

    Ok(BlindedSigningKey::<Sha256>::new(private_key))
}
