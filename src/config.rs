//! Runtime settings for the branch console.
//!
//! Layered configuration: built-in defaults, then an optional
//! `branchdesk.toml`, then `BRANCHDESK_*` environment variables. CLI flags
//! are applied last by the binary.
//!
//! # Configuration File Format
//!
//! ```toml
//! [server]
//! bind = "0.0.0.0"
//! port = 8080
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::errors::ConfigError;

/// Default config file, looked up in the working directory.
pub const CONFIG_FILE: &str = "branchdesk.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub bind: String,
    pub port: u16,
    /// Launch the system browser once the server is up.
    pub open_browser: bool,
    /// Permissive CORS, for pointing other tooling at the server.
    pub dev_mode: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 4001,
            open_browser: false,
            dev_mode: false,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    server: Option<ServerSection>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerSection {
    bind: Option<String>,
    port: Option<u16>,
}

impl Settings {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }

    /// Load settings with precedence defaults < file < environment.
    ///
    /// An explicitly given `config_path` must exist; the default
    /// `branchdesk.toml` is optional and silently skipped when absent.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut settings = Self::default();

        let (path, required) = match config_path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(CONFIG_FILE), false),
        };

        if path.exists() || required {
            let raw = fs::read_to_string(&path).map_err(|source| ConfigError::Unreadable {
                path: path.clone(),
                source,
            })?;
            let file: ConfigFile =
                toml::from_str(&raw).map_err(|source| ConfigError::InvalidFile {
                    path: path.clone(),
                    source,
                })?;
            if let Some(server) = file.server {
                if let Some(bind) = server.bind {
                    settings.bind = bind;
                }
                if let Some(port) = server.port {
                    settings.port = port;
                }
            }
        }

        if let Ok(bind) = std::env::var("BRANCHDESK_BIND") {
            settings.bind = bind;
        }
        if let Ok(port) = std::env::var("BRANCHDESK_PORT") {
            settings.port = port.parse().map_err(|source| ConfigError::InvalidPort {
                value: port.clone(),
                source,
            })?;
        }

        Ok(settings)
    }

    /// Apply CLI flag overrides, the last layer over file and environment.
    /// Boolean flags only ever switch a setting on.
    pub fn apply_cli(
        &mut self,
        port: Option<u16>,
        bind: Option<String>,
        open_browser: bool,
        dev_mode: bool,
    ) {
        if let Some(port) = port {
            self.port = port;
        }
        if let Some(bind) = bind {
            self.bind = bind;
        }
        if open_browser {
            self.open_browser = true;
        }
        if dev_mode {
            self.dev_mode = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use tempfile::tempdir;

    use super::*;

    // Environment variables are process-global; serialize the tests that
    // touch them.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn clear_env() -> (Option<String>, Option<String>) {
        let saved = (
            std::env::var("BRANCHDESK_BIND").ok(),
            std::env::var("BRANCHDESK_PORT").ok(),
        );
        unsafe { std::env::remove_var("BRANCHDESK_BIND") };
        unsafe { std::env::remove_var("BRANCHDESK_PORT") };
        saved
    }

    fn restore_env(saved: (Option<String>, Option<String>)) {
        if let Some(v) = saved.0 {
            unsafe { std::env::set_var("BRANCHDESK_BIND", v) };
        }
        if let Some(v) = saved.1 {
            unsafe { std::env::set_var("BRANCHDESK_PORT", v) };
        }
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.bind, "127.0.0.1");
        assert_eq!(settings.port, 4001);
        assert!(!settings.open_browser);
        assert!(!settings.dev_mode);
        assert_eq!(settings.addr(), "127.0.0.1:4001");
    }

    #[test]
    fn test_file_overrides_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let saved = clear_env();

        let dir = tempdir().unwrap();
        let path = dir.path().join("branchdesk.toml");
        fs::write(&path, "[server]\nbind = \"0.0.0.0\"\nport = 8080\n").unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.bind, "0.0.0.0");
        assert_eq!(settings.port, 8080);

        restore_env(saved);
    }

    #[test]
    fn test_partial_file_keeps_remaining_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let saved = clear_env();

        let dir = tempdir().unwrap();
        let path = dir.path().join("branchdesk.toml");
        fs::write(&path, "[server]\nport = 9000\n").unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.bind, "127.0.0.1");
        assert_eq!(settings.port, 9000);

        restore_env(saved);
    }

    #[test]
    fn test_empty_file_is_valid() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let saved = clear_env();

        let dir = tempdir().unwrap();
        let path = dir.path().join("branchdesk.toml");
        fs::write(&path, "").unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings, Settings::default());

        restore_env(saved);
    }

    #[test]
    fn test_malformed_file_is_a_typed_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("branchdesk.toml");
        fs::write(&path, "[server\nport = nine\n").unwrap();

        let err = Settings::load(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidFile { .. }));
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nope.toml");
        let err = Settings::load(Some(&path)).unwrap_err();
        match err {
            ConfigError::Unreadable { path: p, .. } => assert_eq!(p, path),
            other => panic!("expected Unreadable, got {:?}", other),
        }
    }

    #[test]
    fn test_env_overrides_file() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let saved = clear_env();

        let dir = tempdir().unwrap();
        let path = dir.path().join("branchdesk.toml");
        fs::write(&path, "[server]\nbind = \"0.0.0.0\"\nport = 8080\n").unwrap();

        unsafe { std::env::set_var("BRANCHDESK_BIND", "10.0.0.5") };
        unsafe { std::env::set_var("BRANCHDESK_PORT", "9100") };
        let settings = Settings::load(Some(&path)).unwrap();
        unsafe { std::env::remove_var("BRANCHDESK_BIND") };
        unsafe { std::env::remove_var("BRANCHDESK_PORT") };

        assert_eq!(settings.bind, "10.0.0.5");
        assert_eq!(settings.port, 9100);

        restore_env(saved);
    }

    #[test]
    fn test_invalid_env_port_is_a_typed_error() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let saved = clear_env();

        unsafe { std::env::set_var("BRANCHDESK_PORT", "not-a-port") };
        let err = Settings::load(None).unwrap_err();
        unsafe { std::env::remove_var("BRANCHDESK_PORT") };

        match err {
            ConfigError::InvalidPort { value, .. } => assert_eq!(value, "not-a-port"),
            other => panic!("expected InvalidPort, got {:?}", other),
        }

        restore_env(saved);
    }

    #[test]
    fn test_cli_flags_override_file_and_env() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let saved = clear_env();

        let dir = tempdir().unwrap();
        let path = dir.path().join("branchdesk.toml");
        fs::write(&path, "[server]\nbind = \"0.0.0.0\"\nport = 8080\n").unwrap();

        unsafe { std::env::set_var("BRANCHDESK_PORT", "9100") };
        let mut settings = Settings::load(Some(&path)).unwrap();
        unsafe { std::env::remove_var("BRANCHDESK_PORT") };
        assert_eq!(settings.port, 9100, "env wins over the file");
        assert_eq!(settings.bind, "0.0.0.0");

        settings.apply_cli(Some(4100), Some("127.0.0.1".to_string()), true, false);
        assert_eq!(settings.port, 4100, "flag wins over env");
        assert_eq!(settings.bind, "127.0.0.1", "flag wins over the file");
        assert!(settings.open_browser);
        assert!(!settings.dev_mode);

        restore_env(saved);
    }

    #[test]
    fn test_absent_cli_flags_change_nothing() {
        let mut settings = Settings {
            bind: "0.0.0.0".to_string(),
            port: 8080,
            open_browser: false,
            dev_mode: true,
        };
        settings.apply_cli(None, None, false, false);
        assert_eq!(settings.bind, "0.0.0.0");
        assert_eq!(settings.port, 8080);
        assert!(!settings.open_browser);
        assert!(settings.dev_mode, "a false flag never unsets dev mode");
    }
}
