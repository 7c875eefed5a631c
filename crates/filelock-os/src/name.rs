//! Lock name to file name conversion.

use std::path::{Path, PathBuf};

use filelock_core::error::{LockError, LockResult};
use sha2::{Digest, Sha256};

/// Longest sanitized prefix kept from the lock name.
const MAX_BASE_NAME_LENGTH: usize = 48;

/// Bytes of the name digest appended to the file name (hex encoded).
const HASH_BYTES: usize = 8;

const EXTENSION: &str = ".lock";

/// Maps a logical lock name to a file inside `directory`.
///
/// # Rules
///
/// - ASCII alphanumerics, `-` and `_` are kept, anything else becomes `_`
/// - The sanitized name is truncated to a portable length
/// - A hash of the original name is appended, so names that sanitize to the
///   same text still map to different files
pub fn lock_file_name(directory: &Path, name: &str) -> LockResult<PathBuf> {
    if name.is_empty() {
        return Err(LockError::InvalidName(
            "lock name cannot be empty".to_string(),
        ));
    }

    let mut base_name = convert_to_valid_base_name(name);
    base_name.truncate(MAX_BASE_NAME_LENGTH);

    Ok(directory.join(format!("{base_name}-{}{EXTENSION}", name_hash(name))))
}

fn convert_to_valid_base_name(name: &str) -> String {
    name.chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
                ch
            } else {
                '_'
            }
        })
        .collect()
}

fn name_hash(name: &str) -> String {
    let digest = Sha256::digest(name.as_bytes());
    digest[..HASH_BYTES]
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect()
}
