//! Naming policy for files written by the command-line front end.

use std::path::{Component, Path};

/// Suffix appended to encrypted files in the default mode.
pub const ENCRYPTED_EXTENSION: &str = "enc";
/// Suffix used in stealth mode, where the original extension is dropped.
pub const STEALTH_EXTENSION: &str = "dat";
/// Used when a recovered filename has no usable final component.
pub const FALLBACK_NAME: &str = "decrypted.bin";

/// Name for the encrypted artifact of `original`.
///
/// `report.pdf` becomes `report.pdf.enc`, or `report.dat` in stealth mode.
pub fn encrypted_file_name(original: &str, stealth: bool) -> String {
    if !stealth {
        return format!("{original}.{ENCRYPTED_EXTENSION}");
    }

    let stem = match original.rfind('.') {
        Some(idx) if idx > 0 => &original[..idx],
        _ => original,
    };
    format!("{stem}.{STEALTH_EXTENSION}")
}

/// Reduce a filename recovered from a container to a safe final component.
///
/// Containers can be crafted by anyone who knows the password, so the
/// stored name may contain separators, parent references, or Windows drive
/// and alternate-data-stream syntax (`C:name`, `name:stream`).
pub fn sanitize_file_name(recovered: &str) -> String {
    let last = recovered
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or_default();

    let cleaned: String = last
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| if c == ':' { '_' } else { c })
        .collect();
    let cleaned = cleaned.trim();

    // exactly one plain component, or nothing usable
    let mut components = Path::new(cleaned).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => cleaned.to_string(),
        _ => FALLBACK_NAME.to_string(),
    }
}
