//! Secret key generation.
//!
//! Session signing needs a secret key that survives restarts, so the key is
//! never generated implicitly at startup. This module only produces candidate
//! keys for operators to put into their configuration.
//!
//! # Examples
//!
//! ```
//! use flock_common::crypto::{generate_secret_key, SECRET_KEY_LENGTH};
//!
//! let key = generate_secret_key();
//! assert_eq!(key.len(), SECRET_KEY_LENGTH);
//! ```

use rand::Rng;

/// Length of generated secret keys.
pub const SECRET_KEY_LENGTH: usize = 30;

const SECRET_KEY_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Generate a random secret key of uppercase ASCII letters and digits.
#[must_use]
pub fn generate_secret_key() -> String {
    let mut rng = rand::thread_rng();
    (0..SECRET_KEY_LENGTH)
        .map(|_| char::from(SECRET_KEY_CHARSET[rng.gen_range(0..SECRET_KEY_CHARSET.len())]))
        .collect()
}
