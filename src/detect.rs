// src/detect.rs

//! Runtime detection.
//!
//! A short-circuit scan over the registry: for each runtime in priority
//! order, look for its marker files, then fall back to a directory-listing
//! scan for its characteristic extension. First match wins.

use crate::runtime::{Runtime, REGISTRY};
use std::path::Path;

/// Detect the runtime of the project in `dir`.
///
/// Never fails: an unreadable or missing directory logs a warning and
/// degrades to [`Runtime::Unknown`].
pub fn detect(dir: &Path) -> Runtime {
    let listing = match std::fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect::<Vec<_>>(),
        Err(e) => {
            tracing::warn!(
                dir = %dir.display(),
                error = %e,
                "directory not readable during detection"
            );
            Vec::new()
        }
    };

    for spec in REGISTRY {
        tracing::debug!(runtime = %spec.runtime, dir = %dir.display(), "checking");

        if spec.markers.iter().any(|m| dir.join(m).is_file()) {
            return spec.runtime;
        }
        if listing.iter().any(|f| f.ends_with(spec.extension)) {
            return spec.runtime;
        }
    }

    Runtime::Unknown
}

/* ---------------- tests ---------------- */
