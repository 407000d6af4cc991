//! File content comparison
//!
//! Two files are considered identical when their SHA-256 digests match.
//! Timestamps are never consulted: copy tools that preserve mtime, clock skew
//! and coarse timestamp resolution all make them unreliable.

use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io;
use std::path::Path;
use tracing::trace;
use treemirror_types::{Error, Result};

/// SHA-256 digest of a file's content
pub type FileDigest = [u8; 32];

/// Compute the SHA-256 digest of a file's full content
pub fn file_digest<P: AsRef<Path>>(path: P) -> Result<FileDigest> {
    let path = path.as_ref();
    let mut file = File::open(path)
        .map_err(|e| Error::io(format!("Failed to open '{}'", path.display()), &e))?;

    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)
        .map_err(|e| Error::io(format!("Failed to read '{}'", path.display()), &e))?;

    Ok(hasher.finalize().into())
}

/// Check whether two existing regular files have identical content.
///
/// Files of different length are reported unequal without being read.
/// Unreadable files surface as an error; the caller decides what that means.
pub fn files_equal<P: AsRef<Path>, Q: AsRef<Path>>(left: P, right: Q) -> Result<bool> {
    let (left, right) = (left.as_ref(), right.as_ref());

    if file_len(left)? != file_len(right)? {
        return Ok(false);
    }

    let left_digest = file_digest(left)?;
    let right_digest = file_digest(right)?;
    if left_digest != right_digest {
        trace!(
            left = %left.display(),
            right = %right.display(),
            left_digest = %to_hex(&left_digest),
            right_digest = %to_hex(&right_digest),
            "Content differs"
        );
        return Ok(false);
    }

    Ok(true)
}

/// Lowercase hex rendering of a digest
pub fn to_hex(digest: &FileDigest) -> String {
    digest.iter().map(|byte| format!("{:02x}", byte)).collect()
}

fn file_len(path: &Path) -> Result<u64> {
    fs::metadata(path)
        .map(|metadata| metadata.len())
        .map_err(|e| Error::io(format!("Failed to get metadata for '{}'", path.display()), &e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_known_digest() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("abc.txt");
        fs::write(&path, b"abc").unwrap();

        let digest = file_digest(&path).unwrap();
        assert_eq!(
            to_hex(&digest),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_identical_files_are_equal() {
        let temp_dir = TempDir::new().unwrap();
        let a = temp_dir.path().join("a");
        let b = temp_dir.path().join("b");
        fs::write(&a, b"same content").unwrap();
        fs::write(&b, b"same content").unwrap();

        assert!(files_equal(&a, &b).unwrap());
    }

    #[test]
    fn test_same_length_different_content() {
        let temp_dir = TempDir::new().unwrap();
        let a = temp_dir.path().join("a");
        let b = temp_dir.path().join("b");
        fs::write(&a, b"XXXX").unwrap();
        fs::write(&b, b"XXXY").unwrap();

        assert!(!files_equal(&a, &b).unwrap());
    }

    #[test]
    fn test_different_length() {
        let temp_dir = TempDir::new().unwrap();
        let a = temp_dir.path().join("a");
        let b = temp_dir.path().join("b");
        fs::write(&a, b"X").unwrap();
        fs::write(&b, b"XX").unwrap();

        assert!(!files_equal(&a, &b).unwrap());
    }

    #[test]
    fn test_empty_files_are_equal() {
        let temp_dir = TempDir::new().unwrap();
        let a = temp_dir.path().join("a");
        let b = temp_dir.path().join("b");
        fs::write(&a, b"").unwrap();
        fs::write(&b, b"").unwrap();

        assert!(files_equal(&a, &b).unwrap());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let a = temp_dir.path().join("a");
        fs::write(&a, b"X").unwrap();

        let error = files_equal(&a, temp_dir.path().join("missing")).unwrap_err();
        assert!(error.is_io());
        assert!(error.to_string().contains("missing"));
    }
}
