//! Webhook signature verification.
//!
//! Vartiq signs every webhook delivery with `HMAC-SHA256(secret, body)` and
//! sends the hex digest in the [`SIGNATURE_HEADER`] header. Receivers verify
//! the raw request body, byte for byte, against that header using the secret
//! configured on the webhook.
//!
//! ```
//! use vartiq_client::signature;
//!
//! let body = br#"{"event":"order.created"}"#;
//! let header = signature::sign(body, b"whsec").unwrap();
//!
//! let verified = signature::verify(body, &header, b"whsec").unwrap();
//! assert_eq!(verified, body);
//! ```

use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the delivery signature on outbound webhook requests.
pub const SIGNATURE_HEADER: &str = "x-vartiq-signature";

/// Reasons a signature check can fail.
///
/// A wrong secret and a tampered payload both yield
/// [`SignatureError::VerificationFailed`]; callers cannot tell them apart.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SignatureError {
    /// No signature was supplied.
    #[error("missing signature")]
    MissingSignature,

    /// The signature is not valid hexadecimal.
    #[error("malformed signature: {0}")]
    MalformedSignature(#[source] hex::FromHexError),

    /// The signature does not match the payload and secret.
    #[error("signature verification failed")]
    VerificationFailed,

    /// The secret could not be used as an HMAC key.
    #[error("invalid signing key: {0}")]
    InvalidKey(String),
}

fn mac(secret: &[u8], payload: &[u8]) -> Result<HmacSha256, SignatureError> {
    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| SignatureError::InvalidKey(e.to_string()))?;
    mac.update(payload);
    Ok(mac)
}

/// Compute the lowercase hex HMAC-SHA256 signature of `payload`.
pub fn sign(payload: &[u8], secret: &[u8]) -> Result<String, SignatureError> {
    let mac = mac(secret, payload)?;
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Verify that `signature` is the HMAC-SHA256 of `payload` under `secret`.
///
/// `payload` must be the body exactly as received. `signature` is hex and
/// may use either case. On success the payload is handed back unchanged.
///
/// The digest comparison runs in constant time over the full 32-byte output;
/// a signature of the wrong length is rejected without inspecting its bytes.
pub fn verify<'a>(
    payload: &'a [u8],
    signature: &str,
    secret: &[u8],
) -> Result<&'a [u8], SignatureError> {
    if signature.is_empty() {
        return Err(SignatureError::MissingSignature);
    }

    let received = hex::decode(signature).map_err(SignatureError::MalformedSignature)?;

    mac(secret, payload)?
        .verify_slice(&received)
        .map_err(|_| SignatureError::VerificationFailed)?;

    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"testsecret";
    const PAYLOAD: &[u8] = b"testpayload";
    const EXPECTED: &str = "94925d5e7695666ec652ec0bf8a4732e20917db4fb90160fb718c21074210316";

    #[test]
    fn sign_matches_known_digest() {
        assert_eq!(sign(PAYLOAD, SECRET).unwrap(), EXPECTED);
    }

    #[test]
    fn verify_returns_original_payload() {
        let verified = verify(PAYLOAD, EXPECTED, SECRET).unwrap();
        assert_eq!(verified, PAYLOAD);
        assert_eq!(verified.as_ptr(), PAYLOAD.as_ptr());
    }

    #[test]
    fn keys_of_any_length_sign_and_verify() {
        let long_key = [7u8; 200];
        let keys: [&[u8]; 3] = [b"", b"k", &long_key];
        for key in keys {
            let sig = sign(PAYLOAD, key).unwrap();
            assert_eq!(sig.len(), 64);
            assert_eq!(verify(PAYLOAD, &sig, key), Ok(PAYLOAD));
        }
    }

    #[test]
    fn malformed_errors_compare_by_decode_error() {
        let a = verify(PAYLOAD, "zz", SECRET).unwrap_err();
        let b = verify(PAYLOAD, "zz", b"other").unwrap_err();
        assert_eq!(a, b);
        assert_ne!(a, SignatureError::VerificationFailed);
    }

    #[test]
    fn verify_accepts_uppercase_hex() {
        let upper = EXPECTED.to_uppercase();
        assert!(verify(PAYLOAD, &upper, SECRET).is_ok());
    }

    #[test]
    fn verify_round_trips_arbitrary_bodies() {
        let bodies: [&[u8]; 4] = [b"", b"{}", &[0u8, 255, 10, 13], br#"{"a":[1,2,3]}"#];
        for body in bodies {
            let sig = sign(body, b"k").unwrap();
            assert_eq!(verify(body, &sig, b"k").unwrap(), body);
        }
    }

    #[test]
    fn empty_signature_is_missing() {
        assert_eq!(
            verify(PAYLOAD, "", SECRET),
            Err(SignatureError::MissingSignature)
        );
        assert_eq!(
            verify(b"", "", b""),
            Err(SignatureError::MissingSignature)
        );
    }

    #[test]
    fn non_hex_signature_is_malformed() {
        let err = verify(PAYLOAD, "not-hex!!", SECRET).unwrap_err();
        assert!(matches!(err, SignatureError::MalformedSignature(_)));
        assert!(err.to_string().starts_with("malformed signature"));
    }

    #[test]
    fn odd_length_hex_is_malformed() {
        let err = verify(PAYLOAD, "abc", SECRET).unwrap_err();
        assert_eq!(
            err,
            SignatureError::MalformedSignature(hex::FromHexError::OddLength)
        );
    }

    #[test]
    fn short_signature_fails_verification() {
        assert_eq!(
            verify(PAYLOAD, "abcdef1234567890", SECRET),
            Err(SignatureError::VerificationFailed)
        );
    }

    #[test]
    fn any_single_bit_flip_fails() {
        for byte in 0..PAYLOAD.len() {
            for bit in 0..8 {
                let mut tampered = PAYLOAD.to_vec();
                tampered[byte] ^= 1 << bit;
                assert_eq!(
                    verify(&tampered, EXPECTED, SECRET),
                    Err(SignatureError::VerificationFailed),
                    "flip of bit {bit} in byte {byte} was accepted"
                );
            }
        }
    }

    #[test]
    fn wrong_secret_and_tampering_are_indistinguishable() {
        let wrong_secret = verify(PAYLOAD, EXPECTED, b"othersecret").unwrap_err();
        let tampered = verify(b"testpayloaD", EXPECTED, SECRET).unwrap_err();
        assert_eq!(wrong_secret, tampered);
        assert_eq!(wrong_secret.to_string(), tampered.to_string());
    }
}
