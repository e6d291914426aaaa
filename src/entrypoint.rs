// src/entrypoint.rs

//! Entrypoint resolution.
//!
//! For a detected runtime, map each declared role to the conventional
//! entrypoint files that actually exist on disk. The project root is searched
//! before `src/`, and within a directory candidates keep their declared
//! order, so the result is fully deterministic.

use crate::runtime::{spec_for, Runtime};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Search directories relative to the project root, in order.
const SEARCH_DIRS: &[&str] = &["", "src"];

/// Resolve entrypoint candidates for `runtime` in `dir`.
///
/// When `role` is given, only that role is considered. Roles with zero
/// matches are omitted from the result entirely.
pub fn resolve(
    runtime: Runtime,
    dir: &Path,
    role: Option<&str>,
) -> BTreeMap<String, Vec<PathBuf>> {
    let mut out = BTreeMap::new();

    let Some(spec) = spec_for(runtime) else {
        return out;
    };

    for role_spec in spec.roles {
        if role.is_some_and(|r| r != role_spec.name) {
            continue;
        }

        let mut found = Vec::new();
        for search in SEARCH_DIRS {
            for candidate in role_spec.candidates {
                let path = if search.is_empty() {
                    dir.join(candidate)
                } else {
                    dir.join(search).join(candidate)
                };
                if path.is_file() {
                    found.push(path);
                }
            }
        }

        if !found.is_empty() {
            out.insert(role_spec.name.to_string(), found);
        }
    }

    out
}

/* ---------------- tests ---------------- */

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn root_is_searched_before_src() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/server.js"), "").unwrap();
        fs::write(dir.path().join("app.js"), "").unwrap();

        let roles = resolve(Runtime::Node, dir.path(), None);
        let server = &roles["server"];
        assert_eq!(server[0], dir.path().join("app.js"));
        assert_eq!(server[1], dir.path().join("src/server.js"));
    }

    #[test]
    fn declared_candidate_order_within_a_directory() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("app.js"), "").unwrap();
        fs::write(dir.path().join("server.js"), "").unwrap();

        let roles = resolve(Runtime::Node, dir.path(), None);
        // server.js is declared before app.js in the registry.
        assert_eq!(
            roles["server"],
            vec![dir.path().join("server.js"), dir.path().join("app.js")]
        );
    }

    #[test]
    fn roles_without_matches_are_omitted() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("server.js"), "").unwrap();

        let roles = resolve(Runtime::Node, dir.path(), None);
        assert!(roles.contains_key("server"));
        assert!(!roles.contains_key("client"));
        assert!(!roles.contains_key("worker"));
    }

    #[test]
    fn role_filter_restricts_the_result() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("server.js"), "").unwrap();
        fs::write(dir.path().join("client.js"), "").unwrap();

        let roles = resolve(Runtime::Node, dir.path(), Some("client"));
        assert_eq!(roles.len(), 1);
        assert_eq!(roles["client"], vec![dir.path().join("client.js")]);
    }

    #[test]
    fn unknown_runtime_resolves_to_nothing() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("server.js"), "").unwrap();
        assert!(resolve(Runtime::Unknown, dir.path(), None).is_empty());
    }

    #[test]
    fn rust_main_is_found_under_src() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/main.rs"), "fn main() {}").unwrap();

        let roles = resolve(Runtime::Rust, dir.path(), None);
        assert_eq!(roles["server"], vec![dir.path().join("src/main.rs")]);
    }
}
