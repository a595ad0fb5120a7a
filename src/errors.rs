//! Typed configuration errors.
//!
//! Runtime failures in the live view surface as field errors or silent
//! no-ops, never as typed errors (see the view controller); the only place
//! the process can refuse to start with a diagnosable cause is settings
//! loading, so that is the one error enum this crate carries.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Unreadable {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    InvalidFile {
        path: std::path::PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid port '{value}': {source}")]
    InvalidPort {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_unreadable_carries_path() {
        use std::path::PathBuf;
        let path = PathBuf::from("/etc/branchdesk.toml");
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = ConfigError::Unreadable {
            path: path.clone(),
            source: io_err,
        };
        match &err {
            ConfigError::Unreadable { path: p, source: s } => {
                assert_eq!(p, &path);
                assert_eq!(s.kind(), std::io::ErrorKind::PermissionDenied);
            }
            _ => panic!("Expected Unreadable variant"),
        }
        assert!(err.to_string().contains("branchdesk.toml"));
    }

    #[test]
    fn config_error_invalid_port_carries_value() {
        let source = "not-a-port".parse::<u16>().unwrap_err();
        let err = ConfigError::InvalidPort {
            value: "not-a-port".to_string(),
            source,
        };
        assert!(matches!(err, ConfigError::InvalidPort { .. }));
        assert!(err.to_string().contains("not-a-port"));
    }

    #[test]
    fn config_error_implements_std_error_trait() {
        fn assert_std_error<E: std::error::Error>(_: &E) {}
        let source = "x".parse::<u16>().unwrap_err();
        let err = ConfigError::InvalidPort {
            value: "x".to_string(),
            source,
        };
        assert_std_error(&err);
    }
}
