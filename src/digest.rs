//! Content digesting for bundles
//!
//! The digest is the change-detection fingerprint recorded in the lock file:
//! SHA-256 over each file's path bytes followed by its content bytes, in
//! canonical path order, rendered as lowercase hex. Because entries are
//! sorted before hashing, the digest is a pure function of the (path,
//! content) set and independent of discovery order.

use crate::bundle::{Bundle, BundleFile};
use crate::error::{Error, Result};
use sha2::{Digest as _, Sha256};

/// SHA-256 of zero bytes. Reserved as a sentinel: it only appears when a
/// bundle contributed nothing to the hash, which means the bundle was empty
/// and must not be locked.
pub const EMPTY_SENTINEL: &str =
    "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

/// Compute the content digest of a bundle.
///
/// Empty bundles should have been rejected before reaching this point; the
/// sentinel check is the safety net that turns a missed rejection into a loud
/// failure instead of a silently-locked empty digest.
pub fn digest(bundle: &Bundle) -> Result<String> {
    let mut entries: Vec<&BundleFile> = bundle.files().collect();
    entries.sort_by(|a, b| a.path.cmp(&b.path));

    let mut hasher = Sha256::new();
    for file in entries {
        hasher.update(file.path.as_bytes());
        hasher.update(&file.content);
    }
    let out = hex::encode(hasher.finalize());

    if out == EMPTY_SENTINEL {
        return Err(Error::DegenerateBundle {
            message: "digest equals the empty-input sentinel".to_string(),
        });
    }

    Ok(out)
}
