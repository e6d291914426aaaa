// src/select.rs

//! Interactive selection behind a capability trait.
//!
//! The runner only knows "pick one of N" and "pick a subset of N", so it can
//! be driven by a scripted selector in tests. The production implementation
//! uses `inquire`, degrading to plain numbered stdin prompts when there is no
//! real TTY.

use anyhow::{bail, Result};
use inquire::{InquireError, MultiSelect, Select};
use std::io::{self, BufRead, Write};

pub trait Selector {
    /// Pick exactly one of `options`.
    fn select_one(&self, message: &str, options: &[String]) -> Result<String>;

    /// Pick a non-empty subset of `options`.
    fn select_many(&self, message: &str, options: &[String]) -> Result<Vec<String>>;
}

/// Cardinality-aware wrapper: 0 options is an error, 1 auto-selects,
/// otherwise the selector is consulted.
pub fn choose_one(
    selector: &dyn Selector,
    message: &str,
    options: &[String],
) -> Result<String> {
    match options.len() {
        0 => bail!("Nothing to select from"),
        1 => Ok(options[0].clone()),
        _ => selector.select_one(message, options),
    }
}

/// Like [`choose_one`] but for subsets; a single option short-circuits to
/// "run it".
pub fn choose_many(
    selector: &dyn Selector,
    message: &str,
    options: &[String],
) -> Result<Vec<String>> {
    match options.len() {
        0 => bail!("Nothing to select from"),
        1 => Ok(vec![options[0].clone()]),
        _ => selector.select_many(message, options),
    }
}

/* ---------------- production selector ---------------- */

/// Prompts on the controlling terminal via `inquire`, with a stdin fallback.
pub struct TtySelector;

impl Selector for TtySelector {
    fn select_one(&self, message: &str, options: &[String]) -> Result<String> {
        match Select::new(message, options.to_vec()).prompt() {
            Ok(v) => Ok(v),
            Err(
                InquireError::OperationCanceled | InquireError::OperationInterrupted,
            ) => {
                bail!("Cancelled");
            }
            Err(_) => fallback_select_one(message, options),
        }
    }

    fn select_many(&self, message: &str, options: &[String]) -> Result<Vec<String>> {
        match MultiSelect::new(message, options.to_vec()).prompt() {
            Ok(v) if v.is_empty() => bail!("Nothing selected"),
            Ok(v) => Ok(v),
            Err(
                InquireError::OperationCanceled | InquireError::OperationInterrupted,
            ) => {
                bail!("Cancelled");
            }
            Err(_) => fallback_select_many(message, options),
        }
    }
}

fn read_line() -> Result<String> {
    let mut input = String::new();
    io::stdin().lock().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

fn print_numbered(options: &[String]) {
    eprintln!();
    for (i, opt) in options.iter().enumerate() {
        eprintln!("  [{}] {}", i, opt);
    }
    eprintln!();
}

fn fallback_select_one(message: &str, options: &[String]) -> Result<String> {
    print_numbered(options);
    loop {
        eprint!("  {} ", message);
        io::stderr().flush()?;
        let input = read_line()?;
        if let Ok(idx) = input.parse::<usize>() {
            if idx < options.len() {
                return Ok(options[idx].clone());
            }
        }
        eprintln!("  (enter a valid number)");
    }
}

fn fallback_select_many(message: &str, options: &[String]) -> Result<Vec<String>> {
    print_numbered(options);
    loop {
        eprint!("  {} (numbers separated by commas, or \"all\") ", message);
        io::stderr().flush()?;
        let input = read_line()?;

        if input.eq_ignore_ascii_case("all") || input == "*" {
            return Ok(options.to_vec());
        }

        let picks: Option<Vec<usize>> = input
            .split(',')
            .map(|p| p.trim().parse::<usize>().ok())
            .collect();

        if let Some(idxs) = picks {
            if !idxs.is_empty() && idxs.iter().all(|&i| i < options.len()) {
                return Ok(idxs.iter().map(|&i| options[i].clone()).collect());
            }
        }
        eprintln!("  (enter valid numbers, e.g. 0,2)");
    }
}

/* ---------------- scripted selector (tests) ---------------- */
