//! Container format v1.
//!
//! V1 File Format:
//! ```text
//! MAGIC (2) | VERSION (1) | SALT (16) | IV (12) | NAME_LEN (4, LE) | ENC_NAME (NAME_LEN) | ENC_DATA
//! ```
//!
//! `ENC_NAME` and `ENC_DATA` are AES-256-GCM ciphertexts with their 16-byte
//! tags, sealed under the same key and IV. The key comes from
//! PBKDF2-HMAC-SHA256 with [`crate::crypto::PBKDF2_ITERATIONS`] rounds.

use super::{Container, MAGIC, MAGIC_LEN, VER_LEN};
use crate::crypto::{IV_LEN, SALT_LEN};
use crate::error::{Corruption, Error, Result};

/// Format version 1.
pub const VERSION_V1: u8 = 1;

/// Upper bound on the encrypted filename field, tag included.
pub const MAX_NAME_LEN: usize = 1024;

const NAME_LEN_LEN: usize = 4;

/// Fixed part of the v1 layout, everything before the encrypted filename.
pub const HEADER_LEN: usize = MAGIC_LEN + VER_LEN + SALT_LEN + IV_LEN + NAME_LEN_LEN;

fn field<'a>(data: &'a [u8], offset: usize, len: usize) -> Result<&'a [u8]> {
    offset
        .checked_add(len)
        .and_then(|end| data.get(offset..end))
        .ok_or_else(|| Corruption::Truncated.into())
}

/// Parses a v1 container. Magic and version are assumed checked.
///
/// # Errors
///
/// Returns [`Error::CorruptedFormat`] if the name length is out of range or
/// the buffer ends before the encrypted filename does.
pub fn decode(data: &[u8]) -> Result<Container<'_>> {
    if data.len() < HEADER_LEN {
        return Err(Corruption::TooShort.into());
    }

    let mut offset = MAGIC_LEN + VER_LEN;

    let salt: [u8; SALT_LEN] = field(data, offset, SALT_LEN)?
        .try_into()
        .map_err(|_| Corruption::Truncated)?;
    offset += SALT_LEN;

    let iv: [u8; IV_LEN] = field(data, offset, IV_LEN)?
        .try_into()
        .map_err(|_| Corruption::Truncated)?;
    offset += IV_LEN;

    let name_len_bytes: [u8; NAME_LEN_LEN] = field(data, offset, NAME_LEN_LEN)?
        .try_into()
        .map_err(|_| Corruption::Truncated)?;
    let name_len = u32::from_le_bytes(name_len_bytes);
    offset += NAME_LEN_LEN;

    if name_len == 0 || name_len as usize > MAX_NAME_LEN {
        return Err(Corruption::NameLength(name_len).into());
    }

    let encrypted_name = field(data, offset, name_len as usize)?;
    offset += encrypted_name.len();

    let encrypted_data = &data[offset..];

    tracing::debug!(
        version = VERSION_V1,
        name_len,
        data_len = encrypted_data.len(),
        "decoded container"
    );

    Ok(Container {
        version: VERSION_V1,
        salt,
        iv,
        encrypted_name,
        encrypted_data,
    })
}

/// Serializes the sealed parts to v1 bytes.
///
/// # Errors
///
/// Returns an error if the encrypted filename is empty or longer than
/// [`MAX_NAME_LEN`].
pub fn encode(
    salt: &[u8; SALT_LEN],
    iv: &[u8; IV_LEN],
    encrypted_name: &[u8],
    encrypted_data: &[u8],
) -> Result<Vec<u8>> {
    if encrypted_name.is_empty() || encrypted_name.len() > MAX_NAME_LEN {
        return Err(Error::InvalidInput(
            "encrypted filename length out of range for v1",
        ));
    }

    let mut buf =
        Vec::with_capacity(HEADER_LEN + encrypted_name.len() + encrypted_data.len());

    buf.extend_from_slice(MAGIC);
    buf.push(VERSION_V1);

    buf.extend_from_slice(salt);
    buf.extend_from_slice(iv);

    // bounded by MAX_NAME_LEN above
    buf.extend_from_slice(&(encrypted_name.len() as u32).to_le_bytes());
    buf.extend_from_slice(encrypted_name);
    buf.extend_from_slice(encrypted_data);

    Ok(buf)
}
