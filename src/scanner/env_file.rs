//! .env file parsing. Only variable names are kept; values are dropped.

use regex::Regex;
use std::sync::OnceLock;

/// `.env` or `.env.<suffix>` (e.g. `.env.production`).
pub fn is_env_file(base_name: &str) -> bool {
    match base_name.strip_prefix(".env") {
        Some("") => true,
        Some(rest) => rest.len() > 1 && rest.starts_with('.'),
        None => false,
    }
}

/// Names declared in `content`, in file order. Comment lines and lines
/// without `=` are skipped.
pub fn variable_names(content: &str) -> Vec<String> {
    content
        .lines()
        .filter(|line| !line.trim().is_empty() && !line.trim_start().starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(name, _)| name.trim())
        .filter(|name| !name.is_empty())
        .map(String::from)
        .collect()
}

/// The part of `raw` before any `=`, when it is a plain variable name.
/// Anything carrying a value or control characters yields `None`.
pub fn declared_name(raw: &str) -> Option<&str> {
    static NAME: OnceLock<Regex> = OnceLock::new();
    let name_re = NAME.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_.]*$").expect("valid env name pattern"));
    let name = raw.split('=').next().unwrap_or_default().trim();
    name_re.is_match(name).then_some(name)
}
