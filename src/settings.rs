//! Optional `stackprobe.toml`: size limits and server defaults.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const SETTINGS_FILE: &str = "stackprobe.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub max_files: usize,
    pub max_file_bytes: u64,
    pub max_remote_file_bytes: u64,
    pub max_body_bytes: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_files: 2000,
            max_file_bytes: 5 * 1024 * 1024,
            max_remote_file_bytes: 100 * 1024,
            max_body_bytes: 32 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct RawServer {
    port: Option<u16>,
    request_timeout: Option<String>,
    store_path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct RawSettings {
    limits: Limits,
    server: RawServer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    pub port: u16,
    pub request_timeout: Duration,
    /// Submission log; `None` keeps submissions in memory only.
    pub store_path: Option<PathBuf>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        ServerSettings {
            port: 8377,
            request_timeout: Duration::from_secs(30),
            store_path: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub limits: Limits,
    pub server: ServerSettings,
}

impl Settings {
    pub fn parse(content: &str) -> Result<Self> {
        let raw: RawSettings = toml::from_str(content).context("Invalid settings file")?;
        let defaults = ServerSettings::default();

        let request_timeout = match raw.server.request_timeout {
            Some(ref s) => humantime::parse_duration(s)
                .with_context(|| format!("Invalid server.request_timeout '{}'", s))?,
            None => defaults.request_timeout,
        };

        Ok(Settings {
            limits: raw.limits,
            server: ServerSettings {
                port: raw.server.port.unwrap_or(defaults.port),
                request_timeout,
                store_path: raw
                    .server
                    .store_path
                    .map(|p| PathBuf::from(shellexpand::tilde(&p).into_owned())),
            },
        })
    }

    /// Load `path`, or `./stackprobe.toml` when it exists, or defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let p = PathBuf::from(SETTINGS_FILE);
                if !p.exists() {
                    return Ok(Settings::default());
                }
                p
            }
        };
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_default() {
        assert_eq!(Settings::parse("").unwrap(), Settings::default());
    }

    #[test]
    fn test_partial_limits_and_server() {
        let s = Settings::parse(
            "[limits]\nmax_files = 10\n\n[server]\nport = 9000\nrequest_timeout = \"2m 30s\"\nstore_path = \"/var/lib/stackprobe/submissions.json\"\n",
        )
        .unwrap();
        assert_eq!(s.limits.max_files, 10);
        assert_eq!(s.limits.max_file_bytes, 5 * 1024 * 1024);
        assert_eq!(s.server.port, 9000);
        assert_eq!(s.server.request_timeout, Duration::from_secs(150));
        assert_eq!(
            s.server.store_path.as_deref(),
            Some(Path::new("/var/lib/stackprobe/submissions.json"))
        );
    }

    #[test]
    fn test_bad_timeout_rejected() {
        assert!(Settings::parse("[server]\nrequest_timeout = \"soon\"\n").is_err());
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        fs::write(&path, "[limits]\nmax_remote_file_bytes = 2048\n").unwrap();
        let s = Settings::load(Some(&path)).unwrap();
        assert_eq!(s.limits.max_remote_file_bytes, 2048);
        assert!(Settings::load(Some(&dir.path().join("missing.toml"))).is_err());
    }
}
