// src/ports.rs

//! Port assignment for launches.
//!
//! Precedence per launch: the configured port, then `PORT_<index>`, then bare
//! `PORT` (first launch only, so two launches never both inherit it), then an
//! OS-allocated ephemeral port. Dynamically assigned ports are unique within
//! one invocation; there is deliberately no cross-invocation registry.

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::net::TcpListener;

/// Hands out ports for one invocation.
#[derive(Debug, Default)]
pub struct PortAssigner {
    taken: HashSet<u16>,
}

impl PortAssigner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the port for the launch at `index`.
    pub fn assign(&mut self, index: usize, configured: Option<u16>) -> Result<u16> {
        if let Some(port) = configured {
            self.taken.insert(port);
            return Ok(port);
        }

        if let Some(port) = env_port(&format!("PORT_{index}"))? {
            self.taken.insert(port);
            return Ok(port);
        }

        if index == 0 {
            if let Some(port) = env_port("PORT")? {
                self.taken.insert(port);
                return Ok(port);
            }
        }

        // The ephemeral range is large; a couple of retries covers collisions
        // with ports already handed out this invocation.
        loop {
            let port = free_port()?;
            if self.taken.insert(port) {
                return Ok(port);
            }
        }
    }
}

fn env_port(var: &str) -> Result<Option<u16>> {
    match std::env::var(var) {
        Ok(raw) => {
            let port = raw
                .trim()
                .parse::<u16>()
                .with_context(|| format!("{} is not a valid port: {:?}", var, raw))?;
            Ok(Some(port))
        }
        Err(_) => Ok(None),
    }
}

/// Ask the OS for a currently-free ephemeral port.
fn free_port() -> Result<u16> {
    let listener =
        TcpListener::bind(("127.0.0.1", 0)).context("Failed to allocate a free port")?;
    let addr = listener
        .local_addr()
        .context("Failed to read allocated port")?;
    Ok(addr.port())
}

/* ---------------- tests ---------------- */
