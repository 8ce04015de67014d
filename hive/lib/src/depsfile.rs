//! Extra package list files.
//!
//! One or more package names per line, separated by whitespace. Lines
//! starting with `#` are comments and a leading `-` on a name is ignored so
//! YAML-ish lists (`- ripgrep`) also work.

use std::fs;
use std::path::Path;

use crate::error::HiveError;

/// Parses package names out of a dependency list.
pub fn parse_packages(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(str::split_whitespace)
        .map(|name| name.trim_start_matches('-'))
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Reads and parses a dependency list file.
///
/// ## Errors
///
/// Returns an I/O error if the file cannot be read.
pub fn read_packages(path: &Path) -> Result<Vec<String>, HiveError> {
    let content = fs::read_to_string(path)?;
    Ok(parse_packages(&content))
}
