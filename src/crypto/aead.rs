use aes_gcm::{
    Aes256Gcm, Key, Nonce,
    aead::{Aead, KeyInit},
};
use zeroize::Zeroizing;

use super::{DerivedKey, IV_LEN};
use crate::error::{Error, Result};

fn cipher(key: &DerivedKey) -> Aes256Gcm {
    Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()))
}

/// Encrypt plaintext, returning ciphertext with the GCM tag appended.
pub fn seal(key: &DerivedKey, iv: &[u8; IV_LEN], plaintext: &[u8]) -> Result<Vec<u8>> {
    let ciphertext = cipher(key)
        .encrypt(Nonce::from_slice(iv), plaintext)
        .map_err(|_| Error::Platform("encryption failed"))?;

    tracing::debug!(plaintext_len = plaintext.len(), "sealed");
    Ok(ciphertext)
}

/// Decrypt ciphertext-with-tag. A tag mismatch is the only integrity check
/// in the system and maps to [`Error::PasswordOrIntegrity`].
pub fn open(
    key: &DerivedKey,
    iv: &[u8; IV_LEN],
    ciphertext: &[u8],
) -> Result<Zeroizing<Vec<u8>>> {
    let plaintext = cipher(key)
        .decrypt(Nonce::from_slice(iv), ciphertext)
        .map_err(|_| Error::PasswordOrIntegrity)?;

    tracing::debug!(ciphertext_len = ciphertext.len(), "opened");
    Ok(Zeroizing::new(plaintext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{TAG_LEN, derive_key};

    fn key(pw: &str) -> DerivedKey {
        derive_key(pw.as_bytes(), &[3u8; 16])
    }

    #[test]
    fn seal_open_roundtrip() {
        let k = key("pw");
        let iv = [9u8; IV_LEN];

        let ct = seal(&k, &iv, b"secret data").unwrap();
        assert_eq!(ct.len(), b"secret data".len() + TAG_LEN);

        let pt = open(&k, &iv, &ct).unwrap();
        assert_eq!(pt.as_slice(), b"secret data");
    }

    #[test]
    fn empty_plaintext_still_carries_tag() {
        let k = key("pw");
        let iv = [1u8; IV_LEN];

        let ct = seal(&k, &iv, b"").unwrap();
        assert_eq!(ct.len(), TAG_LEN);
        assert!(open(&k, &iv, &ct).unwrap().is_empty());
    }

    #[test]
    fn wrong_key_fails_authentication() {
        let iv = [9u8; IV_LEN];
        let ct = seal(&key("right"), &iv, b"data").unwrap();

        let err = open(&key("wrong"), &iv, &ct).unwrap_err();
        assert!(matches!(err, Error::PasswordOrIntegrity));
    }

    #[test]
    fn wrong_iv_fails_authentication() {
        let k = key("pw");
        let ct = seal(&k, &[1u8; IV_LEN], b"data").unwrap();

        assert!(open(&k, &[2u8; IV_LEN], &ct).is_err());
    }

    #[test]
    fn short_ciphertext_fails_authentication() {
        let k = key("pw");
        let err = open(&k, &[0u8; IV_LEN], &[0u8; 5]).unwrap_err();
        assert!(matches!(err, Error::PasswordOrIntegrity));
    }
}
