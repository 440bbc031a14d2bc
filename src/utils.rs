use tracing::error;

// For signature verification
use hex::decode as hex_decode;
use hmac::{Hmac, Mac};
use sha2::Sha256;
type HmacSha256 = Hmac<Sha256>;

/// Requests older than this are rejected to prevent replays
pub const MAX_REQUEST_AGE_SECS: i64 = 60 * 5;

/// Helper function for verifying a Slack request signature.
///
/// Slack signs `v0:<timestamp>:<body>` with the app's signing secret and
/// sends the result as `v0=<hex digest>` in `X-Slack-Signature`.
pub fn verify_slack_signature(
    secret: &str,
    timestamp: &str,
    payload: &[u8],
    signature_header: &str,
    now: i64,
) -> bool {
    let Ok(ts) = timestamp.parse::<i64>() else {
        error!("Invalid request timestamp: {:?}", timestamp);
        return false;
    };
    if (now - ts).abs() > MAX_REQUEST_AGE_SECS {
        error!("Request timestamp {} is too far from current time {}", ts, now);
        return false;
    }

    // Expected format: "v0=..."
    let Some(slack_signature) = signature_header.strip_prefix("v0=") else {
        return false;
    };

    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return false,
    };
    mac.update(b"v0:");
    mac.update(timestamp.as_bytes());
    mac.update(b":");
    mac.update(payload);

    match hex_decode(slack_signature) {
        // Constant-time comparison
        Ok(signature_bytes) => mac.verify_slice(&signature_bytes).is_ok(),
        Err(_) => {
            error!("Signature verification failed");
            false
        }
    }
}

#[cfg(test)]
pub(crate) fn sign_slack_request(secret: &str, timestamp: &str, payload: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(format!("v0:{}:", timestamp).as_bytes());
    mac.update(payload);
    format!("v0={}", hex::encode(mac.finalize().into_bytes()))
}
