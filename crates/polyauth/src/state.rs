// Anti-CSRF state tokens: generation and constant-time validation.
//
// The host stores the generated token (session, signed cookie) when issuing
// the redirect and hands it back on the callback; `validate_state` is the
// only comparison path and never short-circuits on content.

use polyauth_core::error::{PolyauthError, Result};
use rand::rngs::OsRng;
use rand::RngCore;
use subtle::ConstantTimeEq;

/// Default entropy for `generate_state`, in bytes (64 hex characters).
pub const DEFAULT_STATE_BYTES: usize = 32;

/// Generate a hex-encoded state token with `byte_length` bytes of entropy
/// from the operating system CSPRNG. The returned string has
/// `2 * byte_length` characters.
pub fn generate_state(byte_length: usize) -> String {
    let mut bytes = vec![0u8; byte_length];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Validate a received state token against the expected one.
///
/// Fails with `StateMissing` when either side is absent, and with
/// `StateMismatch` on any length or content difference. Length is checked
/// over the full strings first; content comparison is constant-time over
/// equal-length inputs.
pub fn validate_state(expected: Option<&str>, received: Option<&str>) -> Result<()> {
    let (expected, received) = match (expected, received) {
        (Some(expected), Some(received)) => (expected, received),
        _ => return Err(PolyauthError::StateMissing { provider: None }),
    };

    if expected.len() != received.len() {
        return Err(PolyauthError::StateMismatch { provider: None });
    }

    let equal: bool = expected.as_bytes().ct_eq(received.as_bytes()).into();
    if equal {
        Ok(())
    } else {
        Err(PolyauthError::StateMismatch { provider: None })
    }
}
