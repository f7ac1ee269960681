/*!
 * Service Configuration
 * Environment-driven configuration with sane defaults
 */

use super::limits::DEFAULT_MAX_ENTRIES;
use std::path::PathBuf;
use tracing::warn;

/// Default runtime directory for endpoint sockets
pub const DEFAULT_RUNTIME_DIR: &str = "/tmp/uniqset";

/// Default endpoint names: A inserts, B removes
pub const DEFAULT_INSERT_ENDPOINT: &str = "A";
pub const DEFAULT_REMOVE_ENDPOINT: &str = "B";

/// Service configuration
///
/// Environment variables:
/// - `UNIQSET_RUNTIME_DIR`: directory holding the endpoint sockets
/// - `UNIQSET_INSERT_ENDPOINT`: name of the insert endpoint
/// - `UNIQSET_REMOVE_ENDPOINT`: name of the remove endpoint
/// - `UNIQSET_CAPACITY`: maximum number of distinct stored values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub runtime_dir: PathBuf,
    pub insert_endpoint: String,
    pub remove_endpoint: String,
    pub capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            runtime_dir: PathBuf::from(DEFAULT_RUNTIME_DIR),
            insert_endpoint: DEFAULT_INSERT_ENDPOINT.to_string(),
            remove_endpoint: DEFAULT_REMOVE_ENDPOINT.to_string(),
            capacity: DEFAULT_MAX_ENTRIES,
        }
    }
}

impl Config {
    /// Load configuration from the environment, falling back to defaults
    ///
    /// Unparseable values are logged and replaced with their defaults rather
    /// than aborting startup.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let runtime_dir = std::env::var("UNIQSET_RUNTIME_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.runtime_dir);

        let insert_endpoint =
            std::env::var("UNIQSET_INSERT_ENDPOINT").unwrap_or(defaults.insert_endpoint);
        let remove_endpoint =
            std::env::var("UNIQSET_REMOVE_ENDPOINT").unwrap_or(defaults.remove_endpoint);

        let capacity = match std::env::var("UNIQSET_CAPACITY") {
            Ok(raw) => match raw.parse::<usize>() {
                Ok(n) if n > 0 => n,
                Ok(_) | Err(_) => {
                    warn!(
                        value = %raw,
                        default = defaults.capacity,
                        "UNIQSET_CAPACITY is not a positive integer, using default"
                    );
                    defaults.capacity
                }
            },
            Err(_) => defaults.capacity,
        };

        Self {
            runtime_dir,
            insert_endpoint,
            remove_endpoint,
            capacity,
        }
    }

    /// Socket path for a named endpoint inside the runtime directory
    pub fn socket_path(&self, endpoint: &str) -> PathBuf {
        self.runtime_dir.join(format!("{endpoint}.sock"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_defaults() {
        std::env::remove_var("UNIQSET_RUNTIME_DIR");
        std::env::remove_var("UNIQSET_INSERT_ENDPOINT");
        std::env::remove_var("UNIQSET_REMOVE_ENDPOINT");
        std::env::remove_var("UNIQSET_CAPACITY");
        let config = Config::from_env();
        assert_eq!(config, Config::default());
        assert_eq!(config.capacity, DEFAULT_MAX_ENTRIES);
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        std::env::set_var("UNIQSET_RUNTIME_DIR", "/run/uniqset-test");
        std::env::set_var("UNIQSET_CAPACITY", "64");
        let config = Config::from_env();
        assert_eq!(config.runtime_dir, PathBuf::from("/run/uniqset-test"));
        assert_eq!(config.capacity, 64);
        std::env::remove_var("UNIQSET_RUNTIME_DIR");
        std::env::remove_var("UNIQSET_CAPACITY");
    }

    #[test]
    #[serial]
    fn test_invalid_capacity_falls_back() {
        std::env::set_var("UNIQSET_CAPACITY", "not-a-number");
        let config = Config::from_env();
        assert_eq!(config.capacity, DEFAULT_MAX_ENTRIES);

        std::env::set_var("UNIQSET_CAPACITY", "0");
        let config = Config::from_env();
        assert_eq!(config.capacity, DEFAULT_MAX_ENTRIES);

        std::env::remove_var("UNIQSET_CAPACITY");
    }

    #[test]
    #[serial]
    fn test_socket_path() {
        let config = Config::default();
        assert_eq!(
            config.socket_path("A"),
            PathBuf::from("/tmp/uniqset/A.sock")
        );
    }
}
