use std::fmt;

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use zeroize::Zeroizing;

use super::{KEY_LEN, SALT_LEN};

/// PBKDF2-HMAC-SHA256 rounds for format version 1.
///
/// The count is not stored in the container, so changing it requires a new
/// format version or old files would derive the wrong key.
pub const PBKDF2_ITERATIONS: u32 = 250_000;

/// A 256-bit AES key derived from a password. Wiped on drop.
pub struct DerivedKey(Zeroizing<[u8; KEY_LEN]>);

impl DerivedKey {
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DerivedKey(..)")
    }
}

/// Derive the container key from a password and the per-file salt.
pub fn derive_key(password: &[u8], salt: &[u8; SALT_LEN]) -> DerivedKey {
    tracing::debug!(iterations = PBKDF2_ITERATIONS, "deriving key");
    derive_with_rounds(password, salt, PBKDF2_ITERATIONS)
}

fn derive_with_rounds(password: &[u8], salt: &[u8], rounds: u32) -> DerivedKey {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2_hmac::<Sha256>(password, salt, rounds, &mut key[..]);
    DerivedKey(key)
}
