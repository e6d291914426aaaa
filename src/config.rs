// src/config.rs

//! Project configuration (`.nili.json` / `nili.config.json`).
//!
//! The config file is optional: when absent nili falls back to runtime
//! detection. When present it is the source of truth for roles, and any
//! schema violation is fatal before anything is spawned.
//!
//! Example:
//!
//! {
//!   "defaultRole": "server",
//!   "roles": {
//!     "server": { "entry": "server.js", "port": 3000 },
//!     "worker": "worker.js"
//!   }
//! }

use crate::runtime::Runtime;
use crate::util::read_to_string;
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Config filenames probed in the project directory, in order.
pub const CONFIG_CANDIDATES: &[&str] = &[".nili.json", "nili.config.json"];

/* ---------------- raw (on-disk) shape ---------------- */

#[derive(Debug, Deserialize)]
struct RawConfig {
    /// Default runtime for roles that do not set their own.
    #[serde(default)]
    runtime: Option<String>,

    /// Default runner command for roles that do not set their own.
    #[serde(default)]
    runner: Option<String>,

    /// Role to pre-select instead of prompting.
    #[serde(default, rename = "defaultRole")]
    default_role: Option<String>,

    #[serde(default)]
    roles: BTreeMap<String, RawRole>,
}

/// A role is either a bare entry path string, or the full table.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawRole {
    Entry(String),
    Full(RawRoleTable),
}

#[derive(Debug, Deserialize)]
struct RawRoleTable {
    // Optional here so a missing field produces our own diagnostic naming
    // the role, not serde's untagged-enum mismatch.
    #[serde(default)]
    entry: Option<String>,

    #[serde(default)]
    runtime: Option<String>,

    #[serde(default)]
    runner: Option<String>,

    #[serde(default)]
    port: Option<u16>,
}

/* ---------------- normalized shape ---------------- */

/// One declared role, normalized and validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleConfig {
    /// Entry path, relative to the project directory.
    pub entry: String,
    pub runtime: Option<Runtime>,
    pub runner: Option<String>,
    pub port: Option<u16>,
}

/// The loaded, validated configuration.
#[derive(Debug)]
pub struct NiliConfig {
    pub default_role: Option<String>,
    /// Role name -> config. BTreeMap keeps role iteration deterministic.
    pub roles: BTreeMap<String, RoleConfig>,
    /// Where the config was loaded from, for diagnostics.
    pub path: PathBuf,
}

impl NiliConfig {
    /// Look for a config file in `dir` (or at `override_path`) and load it.
    ///
    /// An absent file is not an error. A present but malformed or invalid
    /// file is, and the error names the offending role and field.
    pub fn load(dir: &Path, override_path: Option<&Path>) -> Result<Option<Self>> {
        let path = match override_path {
            Some(p) => {
                if !p.is_file() {
                    bail!("Config file not found: {}", p.display());
                }
                p.to_path_buf()
            }
            None => {
                match CONFIG_CANDIDATES
                    .iter()
                    .map(|name| dir.join(name))
                    .find(|p| p.is_file())
                {
                    Some(p) => p,
                    None => return Ok(None),
                }
            }
        };

        let raw = read_to_string(&path)?;
        let parsed: RawConfig = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;

        Ok(Some(Self::normalize(parsed, path)?))
    }

    fn normalize(raw: RawConfig, path: PathBuf) -> Result<Self> {
        let RawConfig {
            runtime: default_runtime,
            runner: default_runner,
            default_role,
            roles: raw_roles,
        } = raw;

        let mut roles = BTreeMap::new();

        for (name, def) in raw_roles {
            let (entry, runtime, runner, port) = match def {
                RawRole::Entry(entry) => (Some(entry), None, None, None),
                RawRole::Full(t) => (t.entry, t.runtime, t.runner, t.port),
            };

            let entry = match entry {
                Some(e) if !e.trim().is_empty() => e,
                Some(_) => bail!(
                    "{}: role {:?}: \"entry\" must be a non-empty string",
                    path.display(),
                    name
                ),
                None => bail!(
                    "{}: role {:?} is missing required field \"entry\"",
                    path.display(),
                    name
                ),
            };

            // Role-level settings win over top-level defaults.
            let runtime = match runtime.as_deref().or(default_runtime.as_deref()) {
                Some(s) => Some(s.parse::<Runtime>().with_context(|| {
                    format!("{}: role {:?}: invalid \"runtime\"", path.display(), name)
                })?),
                None => None,
            };

            let runner = runner.or_else(|| default_runner.clone());

            if port == Some(0) {
                bail!(
                    "{}: role {:?}: \"port\" must be non-zero",
                    path.display(),
                    name
                );
            }

            roles.insert(
                name,
                RoleConfig {
                    entry,
                    runtime,
                    runner,
                    port,
                },
            );
        }

        Ok(Self {
            default_role,
            roles,
            path,
        })
    }
}

/* ---------------- tests ---------------- */

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write_config(dir: &Path, body: &str) {
        fs::write(dir.join(".nili.json"), body).unwrap();
    }

    #[test]
    fn absent_config_is_not_an_error() {
        let dir = tempdir().unwrap();
        assert!(NiliConfig::load(dir.path(), None).unwrap().is_none());
    }

    #[test]
    fn shorthand_role_normalizes_to_entry() {
        let dir = tempdir().unwrap();
        write_config(dir.path(), r#"{ "roles": { "worker": "worker.js" } }"#);

        let cfg = NiliConfig::load(dir.path(), None).unwrap().unwrap();
        assert_eq!(
            cfg.roles["worker"],
            RoleConfig {
                entry: "worker.js".into(),
                runtime: None,
                runner: None,
                port: None,
            }
        );
    }

    #[test]
    fn full_role_with_overrides() {
        let dir = tempdir().unwrap();
        write_config(
            dir.path(),
            r#"{ "roles": { "server": {
                "entry": "app.py", "runtime": "python",
                "runner": "uvicorn app:app", "port": 8000 } } }"#,
        );

        let cfg = NiliConfig::load(dir.path(), None).unwrap().unwrap();
        let server = &cfg.roles["server"];
        assert_eq!(server.entry, "app.py");
        assert_eq!(server.runtime, Some(Runtime::Python));
        assert_eq!(server.runner.as_deref(), Some("uvicorn app:app"));
        assert_eq!(server.port, Some(8000));
    }

    #[test]
    fn top_level_defaults_apply_to_roles() {
        let dir = tempdir().unwrap();
        write_config(
            dir.path(),
            r#"{ "runtime": "node", "runner": "npm start",
                 "roles": {
                   "server": "server.js",
                   "worker": { "entry": "worker.py", "runtime": "python" } } }"#,
        );

        let cfg = NiliConfig::load(dir.path(), None).unwrap().unwrap();
        assert_eq!(cfg.roles["server"].runtime, Some(Runtime::Node));
        assert_eq!(cfg.roles["server"].runner.as_deref(), Some("npm start"));
        // Role-level override wins.
        assert_eq!(cfg.roles["worker"].runtime, Some(Runtime::Python));
    }

    #[test]
    fn missing_entry_names_the_role_and_field() {
        let dir = tempdir().unwrap();
        write_config(dir.path(), r#"{ "roles": { "server": { "port": 3000 } } }"#);

        let err = NiliConfig::load(dir.path(), None).unwrap_err().to_string();
        assert!(err.contains("server"), "got: {err}");
        assert!(err.contains("entry"), "got: {err}");
    }

    #[test]
    fn empty_entry_is_rejected() {
        let dir = tempdir().unwrap();
        write_config(dir.path(), r#"{ "roles": { "server": { "entry": "  " } } }"#);
        assert!(NiliConfig::load(dir.path(), None).is_err());
    }

    #[test]
    fn unknown_runtime_is_rejected() {
        let dir = tempdir().unwrap();
        write_config(
            dir.path(),
            r#"{ "roles": { "server": { "entry": "x", "runtime": "cobol" } } }"#,
        );
        assert!(NiliConfig::load(dir.path(), None).is_err());
    }

    #[test]
    fn port_zero_is_rejected() {
        let dir = tempdir().unwrap();
        write_config(
            dir.path(),
            r#"{ "roles": { "server": { "entry": "x", "port": 0 } } }"#,
        );
        assert!(NiliConfig::load(dir.path(), None).is_err());
    }

    #[test]
    fn malformed_json_is_fatal() {
        let dir = tempdir().unwrap();
        write_config(dir.path(), "{ not json");
        assert!(NiliConfig::load(dir.path(), None).is_err());
    }

    #[test]
    fn second_filename_is_probed() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("nili.config.json"),
            r#"{ "roles": { "server": "app.rb" } }"#,
        )
        .unwrap();

        let cfg = NiliConfig::load(dir.path(), None).unwrap().unwrap();
        assert_eq!(cfg.path, dir.path().join("nili.config.json"));
        assert_eq!(cfg.roles["server"].entry, "app.rb");
    }

    #[test]
    fn explicit_override_path_must_exist() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("custom.json");
        assert!(NiliConfig::load(dir.path(), Some(&missing)).is_err());
    }
}
