//! Password-based file encryption into a self-describing container.
//!
//! [`encrypt`] seals a file's bytes and its original name with AES-256-GCM
//! under a key derived from the password with PBKDF2-HMAC-SHA256, and
//! packs salt, IV and both ciphertexts into a versioned binary container.
//! [`decrypt`] reverses it and classifies every failure into one
//! [`ErrorKind`].
//!
//! ```text
//! MAGIC "VK" (2) | VERSION (1) | SALT (16) | IV (12) | NAME_LEN (4, LE) | ENC_NAME | ENC_DATA
//! ```

mod crypto;
mod error;
mod format;
pub mod naming;
pub mod output;
mod size;
pub mod strength;

use std::fmt;

use zeroize::Zeroizing;

pub use crate::crypto::{IV_LEN, PBKDF2_ITERATIONS, SALT_LEN, TAG_LEN};
pub use crate::error::{Corruption, Error, ErrorKind, Result};
pub use crate::format::v1::{HEADER_LEN, MAX_NAME_LEN};
pub use crate::format::{CURRENT_VERSION, ContainerInfo, MAGIC};
pub use crate::size::{MAX_FILE_SIZE, check_file_size, format_file_size, validate_file_size};

/// Longest original filename, in UTF-8 bytes, that fits the container once
/// its authentication tag is added.
pub const MAX_FILENAME_LEN: usize = MAX_NAME_LEN - TAG_LEN;

/// The recovered file: contents and original name, only ever together.
pub struct Decrypted {
    data: Zeroizing<Vec<u8>>,
    filename: Zeroizing<String>,
}

impl Decrypted {
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn into_parts(self) -> (Zeroizing<Vec<u8>>, Zeroizing<String>) {
        (self.data, self.filename)
    }
}

impl fmt::Debug for Decrypted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decrypted")
            .field("filename", &self.filename.as_str())
            .field("len", &self.data.len())
            .finish_non_exhaustive()
    }
}

/// Encrypts `plaintext` and its `filename` under `password`.
///
/// The size gate runs first, so an oversized input fails with
/// [`Error::SizeLimit`] before any randomness or key derivation. Every call
/// draws a fresh salt and IV.
///
/// # Errors
///
/// - [`Error::SizeLimit`] if `plaintext` is longer than `max_size`
/// - [`Error::InvalidInput`] for an empty password, an empty filename, or a
///   filename longer than [`MAX_FILENAME_LEN`] bytes
/// - [`Error::Platform`] if the OS random source is unavailable
pub fn encrypt(plaintext: &[u8], filename: &str, password: &str, max_size: u64) -> Result<Vec<u8>> {
    check_file_size(plaintext.len() as u64, max_size)?;

    if password.is_empty() {
        return Err(Error::InvalidInput("password must not be empty"));
    }
    if filename.is_empty() {
        return Err(Error::InvalidInput("filename must not be empty"));
    }
    if filename.len() > MAX_FILENAME_LEN {
        return Err(Error::InvalidInput("filename is too long"));
    }

    let salt = crypto::generate_salt()?;
    let iv = crypto::generate_iv()?;

    seal_container(plaintext, filename, password, &salt, &iv)
}

fn seal_container(
    plaintext: &[u8],
    filename: &str,
    password: &str,
    salt: &[u8; SALT_LEN],
    iv: &[u8; IV_LEN],
) -> Result<Vec<u8>> {
    let key = crypto::derive_key(password.as_bytes(), salt);

    let encrypted_name = crypto::seal(&key, iv, filename.as_bytes())?;
    let encrypted_data = crypto::seal(&key, iv, plaintext)?;
    drop(key);

    let container = format::encode(salt, iv, &encrypted_name, &encrypted_data)?;
    tracing::debug!(
        plaintext_len = plaintext.len(),
        container_len = container.len(),
        "encrypted file"
    );
    Ok(container)
}

/// Decrypts a container produced by [`encrypt`].
///
/// The filename is opened first; if it fails to authenticate the body is
/// not attempted.
///
/// # Errors
///
/// - [`Error::CorruptedFormat`] for structural damage, reported before any
///   key derivation
/// - [`Error::UnsupportedVersion`] for an unknown version byte
/// - [`Error::PasswordOrIntegrity`] if either ciphertext fails to
///   authenticate, which is a wrong password or modified data
pub fn decrypt(container: &[u8], password: &str) -> Result<Decrypted> {
    open_container(container, password).map_err(|e| match e {
        Error::Platform(msg) | Error::InvalidInput(msg) => {
            Corruption::Internal(format!("failed to decrypt file: {msg}")).into()
        }
        other => other,
    })
}

fn open_container(bytes: &[u8], password: &str) -> Result<Decrypted> {
    let container = format::decode(bytes)?;
    let key = crypto::derive_key(password.as_bytes(), container.salt());

    let name = crypto::open(&key, container.iv(), container.encrypted_name())
        .inspect_err(|_| tracing::warn!("filename failed to authenticate"))?;
    let filename = Zeroizing::new(
        std::str::from_utf8(&name)
            .map_err(|_| Corruption::FilenameEncoding)?
            .to_owned(),
    );

    let data = crypto::open(&key, container.iv(), container.encrypted_data())
        .inspect_err(|_| tracing::warn!("file contents failed to authenticate"))?;

    tracing::debug!(len = data.len(), "decrypted file");
    Ok(Decrypted { data, filename })
}

/// Describes a container's header without a password.
///
/// # Errors
///
/// The same structural errors as [`decrypt`].
pub fn inspect(container: &[u8]) -> Result<ContainerInfo> {
    Ok(format::decode(container)?.info())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PASSWORD: &str = "CorrectHorseBatteryStaple!1";
    const SALT: [u8; SALT_LEN] = [
        0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0xaa, 0xbb, 0xcc, 0xdd, 0xee,
        0xff,
    ];
    const IV: [u8; IV_LEN] = [
        0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c,
    ];

    fn fixed_vector() -> Vec<u8> {
        seal_container(b"abc", "a.txt", PASSWORD, &SALT, &IV).unwrap()
    }

    #[test]
    fn fixed_vector_roundtrips() {
        let container = fixed_vector();
        let out = decrypt(&container, PASSWORD).unwrap();

        assert_eq!(out.data(), b"abc");
        assert_eq!(out.filename(), "a.txt");
    }

    #[test]
    fn fixed_vector_is_deterministic_and_laid_out() {
        let a = fixed_vector();
        let b = fixed_vector();
        assert_eq!(a, b);

        // header + ("a.txt" + tag) + ("abc" + tag)
        assert_eq!(a.len(), HEADER_LEN + 5 + TAG_LEN + 3 + TAG_LEN);
        assert_eq!(&a[..2], MAGIC);
        assert_eq!(a[2], CURRENT_VERSION);
        assert_eq!(&a[3..19], &SALT);
        assert_eq!(&a[19..31], &IV);
        assert_eq!(&a[31..35], &[21, 0, 0, 0]);
    }

    #[test]
    fn fixed_vector_rejects_wrong_password() {
        let err = decrypt(&fixed_vector(), "wrong-password").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PasswordOrIntegrity);
    }

    #[test]
    fn name_and_data_share_key_and_iv() {
        let container = fixed_vector();
        let parsed = format::decode(&container).unwrap();
        let key = crypto::derive_key(PASSWORD.as_bytes(), parsed.salt());

        let name = crypto::open(&key, &IV, parsed.encrypted_name()).unwrap();
        let data = crypto::open(&key, &IV, parsed.encrypted_data()).unwrap();
        assert_eq!(name.as_slice(), b"a.txt");
        assert_eq!(data.as_slice(), b"abc");
    }

    #[test]
    fn non_utf8_filename_is_corrupted_format() {
        let key = crypto::derive_key(PASSWORD.as_bytes(), &SALT);
        let name = crypto::seal(&key, &IV, &[0xff, 0xfe, 0x80]).unwrap();
        let data = crypto::seal(&key, &IV, b"abc").unwrap();
        let container = format::encode(&SALT, &IV, &name, &data).unwrap();

        let err = decrypt(&container, PASSWORD).unwrap_err();
        assert!(matches!(
            err,
            Error::CorruptedFormat(Corruption::FilenameEncoding)
        ));
    }

    #[test]
    fn body_failure_after_good_name_is_password_or_integrity() {
        let mut container = fixed_vector();
        let last = container.len() - 1;
        container[last] ^= 0x01;

        let err = decrypt(&container, PASSWORD).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PasswordOrIntegrity);
    }

    #[test]
    fn every_byte_of_sealed_name_is_authenticated() {
        let valid = fixed_vector();
        let name_len = inspect(&valid).unwrap().encrypted_name_len;

        for (i, idx) in (HEADER_LEN..HEADER_LEN + name_len).enumerate() {
            let mut container = valid.clone();
            container[idx] ^= 1 << (i % 8);

            let err = decrypt(&container, PASSWORD).unwrap_err();
            assert_eq!(
                err.kind(),
                ErrorKind::PasswordOrIntegrity,
                "flip at offset {idx}"
            );
        }
    }

    #[test]
    fn recovered_parts_stay_zeroizing() {
        let out = decrypt(&fixed_vector(), PASSWORD).unwrap();
        let (data, name): (Zeroizing<Vec<u8>>, Zeroizing<String>) = out.into_parts();

        assert_eq!(data.as_slice(), b"abc");
        assert_eq!(name.as_str(), "a.txt");
    }

    #[test]
    fn encrypt_rejects_empty_password_and_filename() {
        assert_eq!(
            encrypt(b"x", "a.txt", "", MAX_FILE_SIZE).unwrap_err().kind(),
            ErrorKind::InvalidInput
        );
        assert_eq!(
            encrypt(b"x", "", PASSWORD, MAX_FILE_SIZE).unwrap_err().kind(),
            ErrorKind::InvalidInput
        );
    }

    #[test]
    fn encrypt_rejects_filename_that_would_not_decode() {
        let name = "n".repeat(MAX_FILENAME_LEN + 1);
        let err = encrypt(b"x", &name, PASSWORD, MAX_FILE_SIZE).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn size_gate_runs_before_input_checks() {
        // an empty password would be InvalidInput; size wins
        let err = encrypt(&[0u8; 9], "a.txt", "", 8).unwrap_err();
        assert!(matches!(err, Error::SizeLimit { size: 9, max: 8 }));
    }

    #[test]
    fn decrypted_debug_hides_contents() {
        let out = decrypt(&fixed_vector(), PASSWORD).unwrap();
        let debug = format!("{out:?}");
        assert!(debug.contains("a.txt"));
        assert!(!debug.contains("abc"));
    }
}
