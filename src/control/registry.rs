/*!
 * Endpoint Registry
 * Named control endpoints bound to Unix domain sockets
 */

use crate::core::errors::ControlError;
use std::path::PathBuf;
use tokio::net::UnixListener;
use tracing::{error, info, warn};

/// Which set operation a write on the endpoint performs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointOp {
    Insert,
    Remove,
}

/// A registered endpoint: a named socket plus its bound listener
#[derive(Debug)]
pub struct BoundEndpoint {
    pub name: String,
    pub op: EndpointOp,
    pub path: PathBuf,
    pub listener: UnixListener,
}

/// Tracks registered endpoint sockets so a failed or finished startup can
/// always unwind them
///
/// Registration is all-or-nothing at the service level: the caller
/// unregisters everything already bound before surfacing a registration
/// failure, so no partial registration survives a failed start.
#[derive(Debug)]
pub struct EndpointRegistry {
    runtime_dir: PathBuf,
    registered: Vec<(String, PathBuf)>,
}

impl EndpointRegistry {
    pub fn new(runtime_dir: PathBuf) -> Self {
        Self {
            runtime_dir,
            registered: Vec::new(),
        }
    }

    /// Bind a named endpoint socket in the runtime directory
    ///
    /// A stale socket file from a previous run is removed before binding.
    /// Must be called from within a tokio runtime.
    pub fn register(&mut self, name: &str, op: EndpointOp) -> Result<BoundEndpoint, ControlError> {
        let path = self.runtime_dir.join(format!("{name}.sock"));

        if path.exists() {
            warn!(endpoint = name, path = %path.display(), "removing stale endpoint socket");
            let _ = std::fs::remove_file(&path);
        }

        let listener = match UnixListener::bind(&path) {
            Ok(listener) => listener,
            Err(e) => {
                error!(endpoint = name, path = %path.display(), error = %e, "endpoint not registered");
                return Err(ControlError::RegistrationFailure {
                    name: name.to_string(),
                    reason: e.to_string(),
                });
            }
        };

        info!(endpoint = name, path = %path.display(), "endpoint registered");
        self.registered.push((name.to_string(), path.clone()));

        Ok(BoundEndpoint {
            name: name.to_string(),
            op,
            path,
            listener,
        })
    }

    /// Remove every registered endpoint socket
    ///
    /// Idempotent; called on both failed startup and clean shutdown. The
    /// listeners themselves must already be dropped by then.
    pub fn unregister_all(&mut self) {
        for (name, path) in self.registered.drain(..) {
            match std::fs::remove_file(&path) {
                Ok(()) => info!(endpoint = %name, "endpoint unregistered"),
                Err(e) => warn!(endpoint = %name, error = %e, "endpoint socket removal failed"),
            }
        }
    }

    /// Names currently registered, in registration order
    pub fn registered_names(&self) -> impl Iterator<Item = &str> {
        self.registered.iter().map(|(name, _)| name.as_str())
    }
}

impl Drop for EndpointRegistry {
    fn drop(&mut self) {
        self.unregister_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_register_and_unregister() {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = EndpointRegistry::new(dir.path().to_path_buf());

        let endpoint = registry.register("A", EndpointOp::Insert).unwrap();
        assert!(endpoint.path.exists());
        assert_eq!(registry.registered_names().collect::<Vec<_>>(), vec!["A"]);

        drop(endpoint);
        registry.unregister_all();
        assert!(!dir.path().join("A.sock").exists());
        assert_eq!(registry.registered_names().count(), 0);
    }

    #[tokio::test]
    async fn test_unbindable_path_fails_registration() {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = EndpointRegistry::new(dir.path().to_path_buf());

        let _first = registry.register("A", EndpointOp::Insert).unwrap();

        // A directory at the socket path cannot be unlinked as stale and
        // cannot be bound.
        std::fs::create_dir(dir.path().join("B.sock")).unwrap();
        let err = registry.register("B", EndpointOp::Remove).unwrap_err();
        assert!(matches!(err, ControlError::RegistrationFailure { .. }));
        assert_eq!(registry.registered_names().collect::<Vec<_>>(), vec!["A"]);
    }

    #[tokio::test]
    async fn test_unregister_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = EndpointRegistry::new(dir.path().to_path_buf());
        let endpoint = registry.register("A", EndpointOp::Insert).unwrap();
        drop(endpoint);

        registry.unregister_all();
        registry.unregister_all();
    }
}
