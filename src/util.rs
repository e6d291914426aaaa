// src/util.rs

use anyhow::{Context, Result};
use std::path::Path;

/// Read a UTF-8 file into a String with a clear error message.
pub fn read_to_string(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file {:?}", path))
}

/// Split a user-supplied runner string (e.g. `"npm start"`) into argv parts.
///
/// Whitespace splitting only; runner strings are short commands, not shell
/// scripts. Returns an empty vec for a blank string, which callers treat as
/// a malformed runner.
pub fn split_command(raw: &str) -> Vec<String> {
    raw.split_whitespace().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_command_handles_blank_and_multiword() {
        assert!(split_command("   ").is_empty());
        assert_eq!(split_command("npm start"), vec!["npm", "start"]);
    }
}
