// Hashing module using BLAKE3

use std::fs::File;
use std::io::Read;
use std::path::Path;
use crate::error::{MigrateError, Result};

const HASH_CHUNK_SIZE: usize = 1_048_576; // 1MB

/// Compute full BLAKE3 hash of entire file
pub fn compute_full_hash(path: &Path) -> Result<String> {
    let mut file = File::open(path)
        .map_err(|e| MigrateError::Backup(format!("Failed to open {}: {}", path.display(), e)))?;

    let mut hasher = blake3::Hasher::new();
    let mut buffer = vec![0u8; HASH_CHUNK_SIZE];

    loop {
        let bytes_read = file.read(&mut buffer)
            .map_err(|e| MigrateError::Backup(format!("Failed to read {}: {}", path.display(), e)))?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    let hash = hasher.finalize();
    Ok(format!("blake3:full:{}", hash.to_hex()))
}

/// Verify a file matches its stored hash
pub fn verify_hash(path: &Path, expected_hash: &str) -> Result<bool> {
    Ok(compute_full_hash(path)? == expected_hash)
}

/// Stand-in ID for a tag a dry run would have created.
/// Negative so it can never collide with a real row ID, and stable for a
/// given (parent, name) so repeated lookups within a run agree.
pub fn synthetic_tag_id(parent_tag: i64, name: &str) -> i64 {
    let hash = blake3::hash(format!("{}/{}", parent_tag, name).as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash.as_bytes()[..8]);
    let value = (u64::from_le_bytes(bytes) >> 1) as i64;
    -(value.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_full_hash() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"Hello, World!").unwrap();

        let hash = compute_full_hash(file.path()).unwrap();
        assert!(hash.starts_with("blake3:full:"));
        assert!(verify_hash(file.path(), &hash).unwrap());
        assert!(!verify_hash(file.path(), "blake3:full:00").unwrap());
    }

    #[test]
    fn test_synthetic_tag_id_is_negative_and_stable() {
        let a = synthetic_tag_id(7, "Jane Doe");
        assert!(a < 0);
        assert_eq!(a, synthetic_tag_id(7, "Jane Doe"));
        assert_ne!(a, synthetic_tag_id(7, "John"));
        assert_ne!(a, synthetic_tag_id(8, "Jane Doe"));
    }
}
