// src/runtime.rs

//! The runtime registry.
//!
//! One static table drives every component: the detector reads marker files
//! and extensions from it, the entrypoint resolver reads role candidates, and
//! the runner reads default command templates. Keeping it in one place means
//! the detector and the runner can never disagree about what "node" means.

use anyhow::bail;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// The language ecosystem a project is believed to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Runtime {
    Node,
    Python,
    Go,
    Rust,
    Java,
    Ruby,
    Unknown,
}

impl Runtime {
    pub fn as_str(&self) -> &'static str {
        match self {
            Runtime::Node => "node",
            Runtime::Python => "python",
            Runtime::Go => "go",
            Runtime::Rust => "rust",
            Runtime::Java => "java",
            Runtime::Ruby => "ruby",
            Runtime::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Runtime {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "node" => Runtime::Node,
            "python" => Runtime::Python,
            "go" => Runtime::Go,
            "rust" => Runtime::Rust,
            "java" => Runtime::Java,
            "ruby" => Runtime::Ruby,
            other => bail!("Unsupported runtime: {:?}", other),
        })
    }
}

/* ---------------- registry ---------------- */

/// Conventional entrypoint filenames for one role of one runtime.
#[derive(Debug)]
pub struct RoleSpec {
    pub name: &'static str,
    pub candidates: &'static [&'static str],
}

/// Everything nili knows about one runtime.
#[derive(Debug)]
pub struct RuntimeSpec {
    pub runtime: Runtime,
    /// Manifest-style files whose presence strongly implies this runtime.
    pub markers: &'static [&'static str],
    /// Characteristic source extension, used as a detection fallback.
    pub extension: &'static str,
    pub roles: &'static [RoleSpec],
}

/// Detection priority order. First match wins.
pub static REGISTRY: &[RuntimeSpec] = &[
    RuntimeSpec {
        runtime: Runtime::Node,
        markers: &["package.json"],
        extension: ".js",
        roles: &[
            RoleSpec {
                name: "server",
                candidates: &["server.js", "server.ts", "app.js", "app.ts"],
            },
            RoleSpec {
                name: "client",
                candidates: &["client.js", "client.ts", "index.js", "index.ts"],
            },
            RoleSpec {
                name: "worker",
                candidates: &["worker.js", "worker.ts"],
            },
        ],
    },
    RuntimeSpec {
        runtime: Runtime::Python,
        markers: &["requirements.txt", "pyproject.toml"],
        extension: ".py",
        roles: &[
            RoleSpec {
                name: "server",
                candidates: &["server.py", "app.py", "main.py"],
            },
            RoleSpec {
                name: "client",
                candidates: &["client.py"],
            },
        ],
    },
    RuntimeSpec {
        runtime: Runtime::Go,
        markers: &["go.mod"],
        extension: ".go",
        roles: &[RoleSpec {
            name: "server",
            candidates: &["main.go"],
        }],
    },
    RuntimeSpec {
        runtime: Runtime::Rust,
        markers: &["Cargo.toml"],
        extension: ".rs",
        roles: &[RoleSpec {
            name: "server",
            candidates: &["main.rs"],
        }],
    },
    RuntimeSpec {
        runtime: Runtime::Java,
        markers: &["pom.xml", "build.gradle"],
        extension: ".java",
        roles: &[RoleSpec {
            name: "server",
            candidates: &["Main.java", "App.java"],
        }],
    },
    RuntimeSpec {
        runtime: Runtime::Ruby,
        markers: &["Gemfile"],
        extension: ".rb",
        roles: &[
            RoleSpec {
                name: "server",
                candidates: &["server.rb", "app.rb", "main.rb"],
            },
            RoleSpec {
                name: "client",
                candidates: &["client.rb"],
            },
        ],
    },
];

/// Registry entry for a runtime, if it has one (Unknown does not).
pub fn spec_for(runtime: Runtime) -> Option<&'static RuntimeSpec> {
    REGISTRY.iter().find(|s| s.runtime == runtime)
}

/// Infer a runtime from a file's extension.
///
/// Used by the `NILI_ENTRYPOINT` escape hatch, where there is no project
/// detection step, only a file the user told us to run.
pub fn runtime_for_entry(entry: &Path) -> Runtime {
    let ext = entry
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "js" | "mjs" | "cjs" | "ts" | "mts" | "cts" => Runtime::Node,
        "py" => Runtime::Python,
        "go" => Runtime::Go,
        "rs" => Runtime::Rust,
        "java" => Runtime::Java,
        "rb" => Runtime::Ruby,
        _ => Runtime::Unknown,
    }
}

/// Default launch command for `entry` under `runtime`.
///
/// One template per runtime, parameterized by the entry path. Node entries in
/// typed source go through `npx tsx` so they run without a build step; rust
/// delegates entry lookup to cargo entirely.
pub fn default_command(runtime: Runtime, entry: &Path) -> Option<Vec<String>> {
    let entry_arg = entry.to_string_lossy().into_owned();

    let cmd = match runtime {
        Runtime::Node => {
            let ext = entry
                .extension()
                .and_then(|s| s.to_str())
                .unwrap_or("")
                .to_lowercase();
            if matches!(ext.as_str(), "ts" | "mts" | "cts") {
                vec!["npx".into(), "tsx".into(), entry_arg]
            } else {
                vec!["node".into(), entry_arg]
            }
        }
        Runtime::Python => vec!["python3".into(), entry_arg],
        Runtime::Go => vec!["go".into(), "run".into(), entry_arg],
        Runtime::Rust => vec!["cargo".into(), "run".into()],
        Runtime::Java => vec!["java".into(), entry_arg],
        Runtime::Ruby => vec!["ruby".into(), entry_arg],
        Runtime::Unknown => return None,
    };

    Some(cmd)
}

/* ---------------- tests ---------------- */

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn registry_priority_puts_node_before_go() {
        let node = REGISTRY
            .iter()
            .position(|s| s.runtime == Runtime::Node)
            .unwrap();
        let go = REGISTRY
            .iter()
            .position(|s| s.runtime == Runtime::Go)
            .unwrap();
        assert!(node < go);
    }

    #[test]
    fn every_registry_entry_has_a_server_role() {
        for spec in REGISTRY {
            assert!(
                spec.roles.iter().any(|r| r.name == "server"),
                "{} has no server role",
                spec.runtime
            );
        }
    }

    #[test]
    fn runtime_parses_and_displays() {
        assert_eq!("go".parse::<Runtime>().unwrap(), Runtime::Go);
        assert_eq!(Runtime::Python.to_string(), "python");
        assert!("cobol".parse::<Runtime>().is_err());
    }

    #[test]
    fn entry_extension_maps_to_runtime() {
        assert_eq!(runtime_for_entry(Path::new("foo.js")), Runtime::Node);
        assert_eq!(runtime_for_entry(Path::new("src/app.mts")), Runtime::Node);
        assert_eq!(runtime_for_entry(Path::new("main.rb")), Runtime::Ruby);
        assert_eq!(runtime_for_entry(Path::new("README")), Runtime::Unknown);
    }

    #[test]
    fn node_typed_source_uses_tsx() {
        let cmd = default_command(Runtime::Node, &PathBuf::from("server.ts")).unwrap();
        assert_eq!(cmd, vec!["npx", "tsx", "server.ts"]);

        let cmd = default_command(Runtime::Node, &PathBuf::from("server.js")).unwrap();
        assert_eq!(cmd, vec!["node", "server.js"]);
    }

    #[test]
    fn go_and_rust_templates() {
        let cmd = default_command(Runtime::Go, &PathBuf::from("main.go")).unwrap();
        assert_eq!(cmd, vec!["go", "run", "main.go"]);

        let cmd = default_command(Runtime::Rust, &PathBuf::from("main.rs")).unwrap();
        assert_eq!(cmd, vec!["cargo", "run"]);
    }

    #[test]
    fn unknown_runtime_has_no_command() {
        assert!(default_command(Runtime::Unknown, Path::new("x")).is_none());
    }
}
