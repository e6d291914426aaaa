// src/runner.rs

//! Orchestration: turn CLI input into a launch plan, spawn every launch as a
//! child process, supervise them, and derive the tool's own exit code.
//!
//! Planning is synchronous and pure-ish (filesystem reads, env reads, one
//! interactive prompt at most); spawning and waiting are async. A launch that
//! cannot be realized is reported and skipped; the invocation only fails
//! outright when nothing remains to run.

use crate::cli::{Cli, Command};
use crate::config::NiliConfig;
use crate::detect;
use crate::entrypoint;
use crate::ports::PortAssigner;
use crate::runtime::{self, Runtime};
use crate::select::{choose_many, choose_one, Selector};
use crate::util::split_command;

use anyhow::{bail, Context, Result};
use std::fmt;
use std::path::Path;
use tokio::process::Command as TokioCommand;
use tokio::task::JoinSet;

/// What identifies a launch to its child process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Label {
    /// A named role from config or the registry; injected as `ROLE`.
    Role(String),
    /// A bare entrypoint (the `NILI_ENTRYPOINT` path); injected as `ENTRYPOINT`.
    Entrypoint(String),
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Role(name) => write!(f, "role {}", name),
            Label::Entrypoint(entry) => write!(f, "entrypoint {}", entry),
        }
    }
}

/// One fully resolved subprocess launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Launch {
    pub label: Label,
    pub command: Vec<String>,
    pub port: u16,
}

/// Entry point from `main.rs`. Returns the process exit code.
pub async fn run(cli: Cli, selector: &dyn Selector) -> Result<i32> {
    match cli.command {
        Command::Detect { dir } => {
            let runtime = detect::detect(&dir);
            println!("{}", runtime);
            Ok(0)
        }

        Command::Run {
            dir,
            role,
            all,
            config,
        } => {
            let dir = dir
                .canonicalize()
                .with_context(|| format!("Project directory not found: {}", dir.display()))?;

            let launches = plan(&dir, role.as_deref(), all, config.as_deref(), selector)?;
            supervise(&dir, launches).await
        }
    }
}

/* ---------------- planning ---------------- */

/// Build the list of launches for one invocation.
///
/// Resolution order: `NILI_ENTRYPOINT` env override, declared config roles,
/// then runtime detection with conventional entrypoints.
pub fn plan(
    dir: &Path,
    role: Option<&str>,
    all: bool,
    config_override: Option<&Path>,
    selector: &dyn Selector,
) -> Result<Vec<Launch>> {
    if let Ok(entry) = std::env::var("NILI_ENTRYPOINT") {
        if !entry.trim().is_empty() {
            return plan_for_entry(&entry);
        }
    }

    if let Some(cfg) = NiliConfig::load(dir, config_override)? {
        if !cfg.roles.is_empty() {
            return plan_from_config(dir, &cfg, role, all, selector);
        }
        tracing::debug!(config = %cfg.path.display(), "config declares no roles, falling back to detection");
    }

    plan_from_detection(dir, role, all, selector)
}

/// `NILI_ENTRYPOINT` bypasses detection, config, and prompting entirely.
fn plan_for_entry(entry: &str) -> Result<Vec<Launch>> {
    let runtime = runtime::runtime_for_entry(Path::new(entry));

    let command = runtime::default_command(runtime, Path::new(entry))
        .with_context(|| format!("NILI_ENTRYPOINT has an unsupported extension: {}", entry))?;

    let port = PortAssigner::new().assign(0, None)?;

    Ok(vec![Launch {
        label: Label::Entrypoint(entry.to_string()),
        command,
        port,
    }])
}

fn plan_from_config(
    dir: &Path,
    cfg: &NiliConfig,
    role: Option<&str>,
    all: bool,
    selector: &dyn Selector,
) -> Result<Vec<Launch>> {
    let names: Vec<String> = cfg.roles.keys().cloned().collect();

    let chosen: Vec<String> = if let Some(r) = role {
        if !cfg.roles.contains_key(r) {
            bail!("Role {:?} is not defined in {}", r, cfg.path.display());
        }
        vec![r.to_string()]
    } else if all {
        names
    } else if let Some(default) = cfg.default_role.as_deref() {
        if cfg.roles.contains_key(default) {
            eprintln!("[nili] Using default role: {}", default);
            vec![default.to_string()]
        } else {
            tracing::warn!(role = default, "defaultRole is not a declared role, prompting instead");
            choose_many(selector, "Which roles do you want to run?", &names)?
        }
    } else {
        choose_many(selector, "Which roles do you want to run?", &names)?
    };

    let mut ports = PortAssigner::new();
    let mut launches = Vec::new();

    for name in chosen {
        let rc = &cfg.roles[&name];

        let entry_path = dir.join(&rc.entry);
        if !entry_path.is_file() {
            eprintln!(
                "[nili] Skipping role {:?}: entry not found: {}",
                name, entry_path.display()
            );
            continue;
        }

        let command = if let Some(runner) = rc.runner.as_deref() {
            let mut parts = split_command(runner);
            if parts.is_empty() {
                eprintln!("[nili] Skipping role {:?}: runner command is empty", name);
                continue;
            }
            parts.push(rc.entry.clone());
            parts
        } else {
            let rt = match rc.runtime {
                Some(rt) => rt,
                None => detect::detect(dir),
            };
            match runtime::default_command(rt, Path::new(&rc.entry)) {
                Some(cmd) => cmd,
                None => {
                    eprintln!(
                        "[nili] Skipping role {:?}: could not determine a runtime for {}",
                        name, rc.entry
                    );
                    continue;
                }
            }
        };

        let port = ports.assign(launches.len(), rc.port)?;

        launches.push(Launch {
            label: Label::Role(name),
            command,
            port,
        });
    }

    if launches.is_empty() {
        bail!("No runnable roles in {}", cfg.path.display());
    }

    Ok(launches)
}

fn plan_from_detection(
    dir: &Path,
    role: Option<&str>,
    all: bool,
    selector: &dyn Selector,
) -> Result<Vec<Launch>> {
    let rt = detect::detect(dir);
    if rt == Runtime::Unknown {
        bail!("Could not detect runtime in {}", dir.display());
    }
    eprintln!("[nili] Detected runtime: {}", rt);

    let by_role = entrypoint::resolve(rt, dir, role);
    if by_role.is_empty() {
        match role {
            Some(r) => bail!("No entrypoint found for role {:?} ({} project)", r, rt),
            None => bail!("No entrypoint found for {} project", rt),
        }
    }

    let names: Vec<String> = by_role.keys().cloned().collect();
    let chosen = if all {
        names
    } else {
        choose_many(selector, "Which roles do you want to run?", &names)?
    };

    let mut ports = PortAssigner::new();
    let mut launches = Vec::new();

    for name in chosen {
        let candidates: Vec<String> = by_role[&name]
            .iter()
            .map(|p| {
                p.strip_prefix(dir)
                    .unwrap_or(p)
                    .to_string_lossy()
                    .into_owned()
            })
            .collect();

        let entry = choose_one(
            selector,
            &format!("Multiple entrypoints found for {}, choose one to run:", name),
            &candidates,
        )?;

        let command = match runtime::default_command(rt, Path::new(&entry)) {
            Some(cmd) => cmd,
            None => {
                eprintln!("[nili] Skipping role {:?}: unsupported runtime {}", name, rt);
                continue;
            }
        };

        let port = ports.assign(launches.len(), None)?;

        launches.push(Launch {
            label: Label::Role(name),
            command,
            port,
        });
    }

    if launches.is_empty() {
        bail!("No runnable roles for {} project", rt);
    }

    Ok(launches)
}

/* ---------------- supervision ---------------- */

/// Spawn every launch, then wait for all of them.
///
/// Children run concurrently with inherited stdio; the parent only injects
/// `PORT` plus a `ROLE`/`ENTRYPOINT` label and observes exit codes. A single
/// launch propagates its child's exact code; with several launches the tool
/// exits 0 only when every child did, otherwise with the first observed
/// non-zero code.
async fn supervise(dir: &Path, launches: Vec<Launch>) -> Result<i32> {
    let single = launches.len() == 1;
    let mut children = Vec::new();

    for launch in launches {
        let (program, args) = launch
            .command
            .split_first()
            .context("Empty launch command")?;

        let mut cmd = TokioCommand::new(program);
        cmd.args(args)
            .current_dir(dir)
            .env("PORT", launch.port.to_string());

        match &launch.label {
            Label::Role(name) => {
                cmd.env("ROLE", name);
            }
            Label::Entrypoint(entry) => {
                cmd.env("ENTRYPOINT", entry);
            }
        }

        eprintln!(
            "[nili] Running: {} ({}, port {})",
            launch.command.join(" "),
            launch.label,
            launch.port
        );

        match cmd.spawn() {
            Ok(child) => children.push((launch.label.clone(), child)),
            Err(e) => {
                eprintln!("[nili] Failed to start {}: {}", launch.label, e);
            }
        }
    }

    if children.is_empty() {
        bail!("No process was started");
    }

    let mut set = JoinSet::new();
    for (label, mut child) in children {
        set.spawn(async move {
            let status = child.wait().await;
            (label, status)
        });
    }

    let mut codes = Vec::new();
    while let Some(joined) = set.join_next().await {
        let (label, status) = joined.context("Child supervision task failed")?;
        let status =
            status.with_context(|| format!("Failed while waiting for {}", label))?;

        // Terminated-by-signal has no code; treat it as a plain failure.
        let code = status.code().unwrap_or(1);
        if code == 0 {
            eprintln!("[nili] {} exited cleanly", label);
        } else {
            eprintln!("[nili] {} exited with code {}", label, code);
        }
        codes.push(code);
    }

    if single {
        Ok(codes[0])
    } else {
        Ok(codes.into_iter().find(|&c| c != 0).unwrap_or(0))
    }
}

/* ---------------- tests ---------------- */
