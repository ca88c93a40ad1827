//! BLAKE3 file checksumming with streaming support.
//!
//! # Overview
//!
//! This module provides the [`Hasher`] struct for computing BLAKE3 digests
//! of file contents. Files are read in fixed-size chunks and fed into an
//! incremental hasher, so memory use stays constant regardless of file
//! size. The whole point of the duplicate detector is to avoid reading
//! files it does not have to; when it does read one, it must not slurp
//! the entire content into memory either.
//!
//! # Example
//!
//! ```no_run
//! use dupescan::scanner::{digest_to_hex, Hasher};
//! use std::path::Path;
//!
//! let hasher = Hasher::new();
//! let digest = hasher.digest(Path::new("/some/file")).unwrap();
//! println!("{}", digest_to_hex(&digest));
//! ```

use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::HashError;

/// Read chunk size in bytes.
///
/// Anything in the 4KB-64KB range is fine for throughput; 8KB matches
/// the default buffer size of most stdlib readers.
pub const CHUNK_SIZE: usize = 8192;

/// A BLAKE3 content digest (32 bytes).
pub type Digest = [u8; 32];

/// Streaming file checksummer.
///
/// Stateless and cheap to construct; one instance can be shared across
/// threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct Hasher;

impl Hasher {
    /// Create a new hasher.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Compute the BLAKE3 digest of a file's full content.
    ///
    /// The file is read in [`CHUNK_SIZE`] chunks; the handle is closed on
    /// every exit path, including errors.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the file cannot be opened or a read fails
    /// mid-stream (permission denied, vanished file, generic I/O fault).
    pub fn digest(&self, path: &Path) -> Result<Digest, HashError> {
        let mut file =
            File::open(path).map_err(|e| HashError::from_io(path.to_path_buf(), e))?;

        let mut hasher = blake3::Hasher::new();
        let mut buf = [0u8; CHUNK_SIZE];
        loop {
            let n = file
                .read(&mut buf)
                .map_err(|e| HashError::from_io(path.to_path_buf(), e))?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
        }

        Ok(*hasher.finalize().as_bytes())
    }

    /// Compare two files byte for byte.
    ///
    /// Used by the opt-in verification mode to rule out checksum
    /// collisions before reporting a duplicate. Both files are read in
    /// [`CHUNK_SIZE`] chunks; short reads are handled by refilling until
    /// either stream ends.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if either file cannot be read.
    pub fn contents_equal(&self, a: &Path, b: &Path) -> Result<bool, HashError> {
        let file_a = File::open(a).map_err(|e| HashError::from_io(a.to_path_buf(), e))?;
        let file_b = File::open(b).map_err(|e| HashError::from_io(b.to_path_buf(), e))?;

        let mut reader_a = std::io::BufReader::with_capacity(CHUNK_SIZE, file_a);
        let mut reader_b = std::io::BufReader::with_capacity(CHUNK_SIZE, file_b);
        let mut buf_a = [0u8; CHUNK_SIZE];
        let mut buf_b = [0u8; CHUNK_SIZE];

        loop {
            let n_a = read_full(&mut reader_a, &mut buf_a)
                .map_err(|e| HashError::from_io(a.to_path_buf(), e))?;
            let n_b = read_full(&mut reader_b, &mut buf_b)
                .map_err(|e| HashError::from_io(b.to_path_buf(), e))?;

            if n_a != n_b || buf_a[..n_a] != buf_b[..n_b] {
                return Ok(false);
            }
            if n_a == 0 {
                return Ok(true);
            }
        }
    }
}

/// Read until the buffer is full or the stream ends, returning bytes read.
fn read_full(reader: &mut impl Read, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

/// Render a digest as a lowercase hex string.
#[must_use]
pub fn digest_to_hex(digest: &Digest) -> String {
    blake3::Hash::from_bytes(*digest).to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, content: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut f = File::create(&path).unwrap();
        f.write_all(content).unwrap();
        path
    }

    #[test]
    fn test_digest_deterministic() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "a.bin", b"hello world");

        let hasher = Hasher::new();
        assert_eq!(hasher.digest(&path).unwrap(), hasher.digest(&path).unwrap());
    }

    #[test]
    fn test_identical_content_identical_digest() {
        let dir = TempDir::new().unwrap();
        let a = write_file(&dir, "a.bin", b"same bytes");
        let b = write_file(&dir, "b.bin", b"same bytes");

        let hasher = Hasher::new();
        assert_eq!(hasher.digest(&a).unwrap(), hasher.digest(&b).unwrap());
    }

    #[test]
    fn test_different_content_different_digest() {
        let dir = TempDir::new().unwrap();
        let a = write_file(&dir, "a.bin", b"content one");
        let b = write_file(&dir, "b.bin", b"content two");

        let hasher = Hasher::new();
        assert_ne!(hasher.digest(&a).unwrap(), hasher.digest(&b).unwrap());
    }

    #[test]
    fn test_digest_spans_multiple_chunks() {
        let dir = TempDir::new().unwrap();
        // 3.5 chunks of data, so the streaming loop runs more than once
        let content = vec![0xAB; CHUNK_SIZE * 3 + CHUNK_SIZE / 2];
        let path = write_file(&dir, "big.bin", &content);

        let hasher = Hasher::new();
        let streamed = hasher.digest(&path).unwrap();
        let one_shot = *blake3::hash(&content).as_bytes();
        assert_eq!(streamed, one_shot);
    }

    #[test]
    fn test_empty_file_digest() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "empty.bin", b"");

        let hasher = Hasher::new();
        assert_eq!(
            hasher.digest(&path).unwrap(),
            *blake3::hash(b"").as_bytes()
        );
    }

    #[test]
    fn test_digest_missing_file() {
        let hasher = Hasher::new();
        let err = hasher.digest(Path::new("/nonexistent/file/12345")).unwrap_err();
        assert!(matches!(err, HashError::NotFound(_)));
    }

    #[test]
    fn test_digest_to_hex_matches_blake3() {
        let hash = blake3::hash(b"hex rendering check");
        let hex = digest_to_hex(hash.as_bytes());

        assert_eq!(hex, hash.to_hex().to_string());
        assert_eq!(hex.len(), 64);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit() && !c.is_uppercase()));
    }

    #[test]
    fn test_contents_equal() {
        let dir = TempDir::new().unwrap();
        let a = write_file(&dir, "a.bin", b"identical payload");
        let b = write_file(&dir, "b.bin", b"identical payload");
        let c = write_file(&dir, "c.bin", b"different payload");

        let hasher = Hasher::new();
        assert!(hasher.contents_equal(&a, &b).unwrap());
        assert!(!hasher.contents_equal(&a, &c).unwrap());
    }

    #[test]
    fn test_contents_equal_large_files() {
        let dir = TempDir::new().unwrap();
        let mut content = vec![0x5A; CHUNK_SIZE * 2];
        let a = write_file(&dir, "a.bin", &content);
        let b = write_file(&dir, "b.bin", &content);
        // Flip one byte deep in the second chunk
        content[CHUNK_SIZE + 17] ^= 0xFF;
        let c = write_file(&dir, "c.bin", &content);

        let hasher = Hasher::new();
        assert!(hasher.contents_equal(&a, &b).unwrap());
        assert!(!hasher.contents_equal(&a, &c).unwrap());
    }

    #[test]
    fn test_digest_to_hex() {
        let mut digest = [0u8; 32];
        digest[0] = 0xAB;
        digest[31] = 0x01;

        let hex = digest_to_hex(&digest);
        assert_eq!(hex.len(), 64);
        assert!(hex.starts_with("ab00"));
        assert!(hex.ends_with("01"));
    }
}
