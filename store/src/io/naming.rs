//! Reversible mapping from document names to file names.
//!
//! Bytes in `[A-Za-z0-9_-]` pass through; every other byte is written as `%`
//! followed by two lowercase hex digits. The mapping is injective, so two
//! names never share a file, and no encoded name can contain a path
//! separator or start with a dot.

use crate::error::{StoreError, StoreResult};

/// Extension of every persisted document file.
pub const EXTENSION: &str = "hpg";

/// File name (with extension) for `name`.
pub fn file_name(name: &str) -> StoreResult<String> {
    if name.is_empty() {
        return Err(StoreError::invalid("dataset name must not be empty"));
    }
    let mut out = String::with_capacity(name.len() + EXTENSION.len() + 1);
    for byte in name.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'-' {
            out.push(char::from(byte));
        } else {
            out.push('%');
            out.push_str(&hex::encode([byte]));
        }
    }
    out.push('.');
    out.push_str(EXTENSION);
    Ok(out)
}

/// Inverse of [`file_name`]. Returns `None` for anything that is not a valid
/// encoding (foreign files in the data directory).
pub fn name_from_file(file_name: &str) -> Option<String> {
    let stem = file_name.strip_suffix(EXTENSION)?.strip_suffix('.')?;
    if stem.is_empty() {
        return None;
    }
    let mut bytes = Vec::with_capacity(stem.len());
    let mut rest = stem.as_bytes();
    while let Some((&first, tail)) = rest.split_first() {
        if first == b'%' {
            let digits = tail.get(..2)?;
            let decoded = hex::decode(digits).ok()?;
            let byte = decoded[0];
            // Only bytes that file_name would have escaped are accepted escaped.
            if byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'-' {
                return None;
            }
            if digits.iter().any(u8::is_ascii_uppercase) {
                return None;
            }
            bytes.push(byte);
            rest = &tail[2..];
        } else if first.is_ascii_alphanumeric() || first == b'_' || first == b'-' {
            bytes.push(first);
            rest = tail;
        } else {
            return None;
        }
    }
    String::from_utf8(bytes).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_names_stay_readable() {
        assert_eq!(file_name("hex").unwrap(), "hex.hpg");
        assert_eq!(file_name("Le-7_b").unwrap(), "Le-7_b.hpg");
    }

    #[test]
    fn unsafe_bytes_are_escaped() {
        assert_eq!(file_name("../etc").unwrap(), "%2e%2e%2fetc.hpg");
        assert_eq!(file_name("a b").unwrap(), "a%20b.hpg");
        assert_eq!(file_name("50%").unwrap(), "50%25.hpg");
        assert_eq!(file_name("é").unwrap(), "%c3%a9.hpg");
    }

    #[test]
    fn escaping_is_collision_free() {
        let names = ["a.b", "a%2eb", "a_b", "a-b", "a b", "a/b"];
        let mut files = names
            .iter()
            .map(|name| file_name(name).unwrap())
            .collect::<Vec<_>>();
        files.sort();
        files.dedup();
        assert_eq!(files.len(), names.len());
    }

    #[test]
    fn decoding_inverts_encoding() {
        for name in ["hex", "../etc", "a b", "50%", "é", "x.y.z"] {
            let encoded = file_name(name).unwrap();
            assert_eq!(name_from_file(&encoded).as_deref(), Some(name));
        }
    }

    #[test]
    fn foreign_files_are_not_names() {
        assert_eq!(name_from_file("notes.txt"), None);
        assert_eq!(name_from_file(".hpg"), None);
        assert_eq!(name_from_file("a.b.hpg"), None);
        assert_eq!(name_from_file("%41.hpg"), None);
        assert_eq!(name_from_file("%2E.hpg"), None);
        assert_eq!(name_from_file("%2.hpg"), None);
        assert_eq!(name_from_file("x.hpg.tmp"), None);
    }

    #[test]
    fn empty_name_is_invalid() {
        assert_eq!(file_name("").unwrap_err().kind(), "invalid_request");
    }
}
