//! SHA1 content hashing for release archives.
//!
//! Kilnfile.lock pins releases by SHA1 hex digest.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use sha1::{Digest, Sha1};

use crate::error::{io_err, FetchError};

const CHUNK: usize = 64 * 1024;

/// Lowercase hex SHA1 of the file at `path`, streamed in fixed-size chunks.
pub fn file_sha1(path: &Path) -> Result<String, FetchError> {
    let mut file = File::open(path).map_err(|e| io_err(path, e))?;
    let mut hasher = Sha1::new();
    let mut buf = vec![0u8; CHUNK];
    loop {
        let n = file.read(&mut buf).map_err(|e| io_err(path, e))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Lowercase hex SHA1 of an in-memory buffer.
pub fn bytes_sha1(data: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
