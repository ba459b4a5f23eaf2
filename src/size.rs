use crate::error::{Error, Result};

/// Default upper bound for a single file: 500 MiB.
pub const MAX_FILE_SIZE: u64 = 500 * 1024 * 1024;

const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Returns `true` if a file of `len` bytes may be encrypted under `max`.
pub fn validate_file_size(len: u64, max: u64) -> bool {
    len <= max
}

/// Like [`validate_file_size`], but as an error the caller can propagate.
pub fn check_file_size(len: u64, max: u64) -> Result<()> {
    if validate_file_size(len, max) {
        Ok(())
    } else {
        Err(Error::SizeLimit { size: len, max })
    }
}

/// Human readable size in 1024-based units, rounded to two decimals.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut unit = 0;
    let mut scale = 1u64;
    while unit < UNITS.len() - 1 && bytes / scale >= 1024 {
        scale *= 1024;
        unit += 1;
    }

    let value = (bytes as f64 / scale as f64 * 100.0).round() / 100.0;
    format!("{value} {}", UNITS[unit])
}
