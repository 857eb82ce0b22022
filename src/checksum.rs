use sha2::{Digest, Sha256};

use crate::error::{IacEnvError, Result};

/// Verify `data` against a SHA256SUMS-style manifest.
///
/// The manifest is a sequence of `<hex-digest> <file-name>` lines; only the
/// line matching `file_name` is consulted. Names prefixed with a directory
/// (e.g. `./dist/<file_name>`) still match, as some release pipelines emit
/// them that way.
pub fn check(data: &[u8], manifest: &[u8], file_name: &str) -> Result<()> {
    let manifest = String::from_utf8_lossy(manifest);

    for line in manifest.lines() {
        let mut parts = line.split_whitespace();
        let (Some(digest), Some(name)) = (parts.next(), parts.next()) else {
            continue;
        };

        if name != file_name && !name.ends_with(&format!("/{file_name}")) {
            continue;
        }

        let computed = hex::encode(Sha256::digest(data));
        if computed.eq_ignore_ascii_case(digest) {
            return Ok(());
        }

        return Err(IacEnvError::ChecksumMismatch {
            file_name: file_name.to_string(),
            expected: digest.to_string(),
            computed,
        });
    }

    Err(IacEnvError::ChecksumMissing {
        file_name: file_name.to_string(),
    })
}

/// Verifier used when a retrieval mode cannot supply a manifest.
pub fn no_check(_data: &[u8]) -> Result<()> {
    Ok(())
}
