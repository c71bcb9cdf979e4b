//! GitHub webhook signature verification.
//!
//! GitHub signs each delivery with an HMAC of the raw request body keyed by
//! the shared webhook secret, and sends it as `<algorithm>=<hex digest>` in
//! `X-Hub-Signature` (SHA-1) and `X-Hub-Signature-256` (SHA-256).
//! Reference: https://docs.github.com/en/webhooks/using-webhooks/validating-webhook-deliveries

use axum::http::HeaderMap;
use hmac::{digest::KeyInit, Hmac, Mac};
use sha1::Sha1;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use tracing::warn;

type HmacSha1 = Hmac<Sha1>;
type HmacSha256 = Hmac<Sha256>;

/// Legacy SHA-1 signature header.
pub const SIGNATURE_HEADER: &str = "X-Hub-Signature";

/// SHA-256 signature header.
pub const SIGNATURE_256_HEADER: &str = "X-Hub-Signature-256";

/// Digest algorithm named by a signature prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    Sha1,
    Sha256,
}

impl SignatureAlgorithm {
    /// The `<algo>=` prefix of a signature value.
    pub fn prefix(self) -> &'static str {
        match self {
            SignatureAlgorithm::Sha1 => "sha1=",
            SignatureAlgorithm::Sha256 => "sha256=",
        }
    }

    /// Header GitHub sends this algorithm in.
    pub fn header_name(self) -> &'static str {
        match self {
            SignatureAlgorithm::Sha1 => SIGNATURE_HEADER,
            SignatureAlgorithm::Sha256 => SIGNATURE_256_HEADER,
        }
    }

    /// Pick the algorithm from the prefix of a header value.
    pub fn from_header_value(value: &str) -> Option<Self> {
        [SignatureAlgorithm::Sha256, SignatureAlgorithm::Sha1]
            .into_iter()
            .find(|algorithm| value.starts_with(algorithm.prefix()))
    }
}

/// Compute the signature header value for `body` under `secret`.
///
/// Returns `None` only if the HMAC key is rejected, which does not happen for
/// HMAC constructions in practice.
pub fn signature_tag(algorithm: SignatureAlgorithm, secret: &[u8], body: &[u8]) -> Option<String> {
    let digest = match algorithm {
        SignatureAlgorithm::Sha1 => hex_digest::<HmacSha1>(secret, body)?,
        SignatureAlgorithm::Sha256 => hex_digest::<HmacSha256>(secret, body)?,
    };

    Some(format!("{}{}", algorithm.prefix(), digest))
}

fn hex_digest<M: Mac + KeyInit>(secret: &[u8], body: &[u8]) -> Option<String> {
    let mut mac = <M as KeyInit>::new_from_slice(secret).ok()?;
    mac.update(body);
    Some(hex::encode(mac.finalize().into_bytes()))
}

/// Verify a webhook signature header against the raw request body.
///
/// # Arguments
///
/// * `secret` - The shared webhook secret
/// * `body` - The exact bytes of the request body
/// * `header` - The full signature header value, if one was sent
///
/// # Returns
///
/// `true` only if the header carries a supported algorithm prefix and the
/// digest matches. Every other case fails closed.
pub fn verify_signature(secret: &[u8], body: &[u8], header: Option<&str>) -> bool {
    let header = match header {
        Some(h) if !h.is_empty() => h,
        _ => {
            warn!("webhook_signature_missing");
            return false;
        }
    };

    if secret.is_empty() {
        warn!("webhook_signature_secret_not_configured");
        return false;
    }

    let algorithm = match SignatureAlgorithm::from_header_value(header) {
        Some(a) => a,
        None => {
            warn!(
                header_length = header.len(),
                "webhook_signature_unsupported_algorithm"
            );
            return false;
        }
    };

    let expected = match signature_tag(algorithm, secret, body) {
        Some(tag) => tag,
        None => {
            warn!("webhook_signature_invalid_key");
            return false;
        }
    };

    // Constant-time comparison to prevent timing attacks
    let valid: bool = expected.as_bytes().ct_eq(header.as_bytes()).into();

    if !valid {
        warn!(
            algorithm = ?algorithm,
            expected_length = expected.len(),
            actual_length = header.len(),
            body_length = body.len(),
            "webhook_signature_mismatch"
        );
    }

    valid
}

/// Select the signature header to verify, preferring SHA-256.
pub fn select_signature_header(headers: &HeaderMap) -> Option<&str> {
    [SignatureAlgorithm::Sha256, SignatureAlgorithm::Sha1]
        .into_iter()
        .find_map(|algorithm| {
            headers
                .get(algorithm.header_name())
                .and_then(|v| v.to_str().ok())
        })
}
