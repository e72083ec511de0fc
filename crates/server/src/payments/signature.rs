//! Webhook signatures in the `t=<unix>,v1=<hex hmac>` header format.
//!
//! The signed message is `"{t}.{payload}"`, HMAC-SHA256 with the endpoint secret.

use super::GatewayError;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Maximum accepted age of a signed timestamp, in seconds
pub const TOLERANCE_SECS: i64 = 300;

pub fn verify(secret: &str, payload: &[u8], header: &str, now: i64) -> Result<(), GatewayError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = value.parse::<i64>().ok(),
            Some(("v1", value)) => signatures.push(value),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(GatewayError::InvalidSignature("missing timestamp"))?;
    if signatures.is_empty() {
        return Err(GatewayError::InvalidSignature("missing v1 signature"));
    }
    if (now - timestamp).abs() > TOLERANCE_SECS {
        return Err(GatewayError::InvalidSignature("timestamp outside tolerance"));
    }

    let mac = signed_mac(secret, payload, timestamp)?;
    let matches = signatures
        .iter()
        .filter_map(|signature| hex::decode(signature).ok())
        .any(|expected| mac.clone().verify_slice(&expected).is_ok());

    if matches {
        Ok(())
    } else {
        Err(GatewayError::InvalidSignature("no matching signature"))
    }
}

/// Builds a header value for `payload`, as the processor would
pub fn sign(secret: &str, payload: &[u8], timestamp: i64) -> Result<String, GatewayError> {
    let digest = signed_mac(secret, payload, timestamp)?.finalize().into_bytes();
    Ok(format!("t={timestamp},v1={}", hex::encode(digest)))
}

fn signed_mac(secret: &str, payload: &[u8], timestamp: i64) -> Result<HmacSha256, GatewayError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| GatewayError::InvalidSignature("unusable secret"))?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(mac)
}

#[cfg(test)]
mod test {
    use super::*;

    const SECRET: &str = "whsec_test";
    const PAYLOAD: &[u8] = br#"{"type":"checkout.session.completed"}"#;

    #[test]
    fn test_accepts_own_signature() {
        let header = sign(SECRET, PAYLOAD, 1_700_000_000).unwrap();
        assert!(verify(SECRET, PAYLOAD, &header, 1_700_000_100).is_ok());
    }

    #[test]
    fn test_rejects_tampered_payload_and_wrong_secret() {
        let header = sign(SECRET, PAYLOAD, 1_700_000_000).unwrap();
        assert!(verify(SECRET, b"{}", &header, 1_700_000_000).is_err());
        assert!(verify("whsec_other", PAYLOAD, &header, 1_700_000_000).is_err());
    }

    #[test]
    fn test_rejects_stale_timestamp() {
        let header = sign(SECRET, PAYLOAD, 1_700_000_000).unwrap();
        let err = verify(SECRET, PAYLOAD, &header, 1_700_000_000 + TOLERANCE_SECS + 1).unwrap_err();
        assert!(matches!(err, GatewayError::InvalidSignature("timestamp outside tolerance")));
    }

    #[test]
    fn test_accepts_any_matching_v1() {
        let good = sign(SECRET, PAYLOAD, 1_700_000_000).unwrap();
        let v1 = good.split_once(",v1=").unwrap().1;
        let header = format!("t=1700000000,v1=deadbeef,v1={v1},v0=ignored");
        assert!(verify(SECRET, PAYLOAD, &header, 1_700_000_000).is_ok());

        assert!(verify(SECRET, PAYLOAD, "v1=abc", 1_700_000_000).is_err());
        assert!(verify(SECRET, PAYLOAD, "t=1700000000", 1_700_000_000).is_err());
    }
}
