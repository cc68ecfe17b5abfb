//! Small helpers shared by the views.

use rand::Rng;
use rand::distributions::Alphanumeric;

/// Length of the nonces handed to content security policies.
pub const NONCE_LENGTH: usize = 32;

/// A pseudorandom alphanumeric nonce of `len` characters.
///
/// Nonces only scope which inline scripts a content security policy allows
/// for a single panel, so they need not be unpredictable across sessions.
pub fn nonce(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}
