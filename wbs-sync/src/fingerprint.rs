//! Change detection
//!
//! Computes a deterministic content fingerprint of the item collection and
//! compares it to the previously recorded one. The fingerprint gates only
//! the final snapshot write; fetching and aggregation always run.

use sha2::{Digest, Sha256};
use std::path::PathBuf;
use tracing::{debug, warn};
use wbs_common::model::CanonicalItem;
use wbs_common::{Error, Result};

/// Compute the content fingerprint of an item collection
///
/// Canonical form: items ordered by `id`, each serialized with the model's
/// fixed field order. Insertion order of the input never changes the
/// result.
pub fn fingerprint(items: &[CanonicalItem]) -> Result<String> {
    let mut ordered: Vec<&CanonicalItem> = items.iter().collect();
    ordered.sort_by(|a, b| a.id.cmp(&b.id));

    let mut hasher = Sha256::new();
    for item in ordered {
        hasher.update(serde_json::to_vec(item)?);
        hasher.update(b"\n");
    }
    Ok(format!("{:x}", hasher.finalize()))
}

/// Compare the collection against a previous fingerprint
///
/// Returns whether a write is needed and the fingerprint to record after a
/// successful write. No previous fingerprint always reads as changed.
pub fn has_changed(
    items: &[CanonicalItem],
    previous: Option<&str>,
) -> Result<(bool, String)> {
    let current = fingerprint(items)?;
    let changed = previous != Some(current.as_str());
    debug!(changed, fingerprint = %current, "Computed collection fingerprint");
    Ok((changed, current))
}

/// Single-string fingerprint state file
///
/// Absent (first run) or unreadable state reads as no previous fingerprint,
/// which forces a write. Overwritten only after the snapshot write
/// succeeded.
pub struct FingerprintStore {
    path: PathBuf,
}

impl FingerprintStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn load(&self) -> Option<String> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => {
                let content = content.trim().to_string();
                if content.is_empty() {
                    None
                } else {
                    Some(content)
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!(
                    "Could not read fingerprint state {}: {} (forcing a write)",
                    self.path.display(),
                    e
                );
                None
            }
        }
    }

    pub fn store(&self, fingerprint: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::Persistence(format!("Create {} failed: {}", parent.display(), e))
            })?;
        }
        std::fs::write(&self.path, format!("{}\n", fingerprint)).map_err(|e| {
            Error::Persistence(format!("Write {} failed: {}", self.path.display(), e))
        })
    }
}
