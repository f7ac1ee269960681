/*!
 * Control Server
 * One-request-per-connection text protocol over the endpoint sockets
 *
 * An empty payload (the caller closed its write side without sending
 * anything) is a read request and produces the labeled listing. A non-empty
 * payload is a write request: parsed and applied as the endpoint's
 * operation, answered with a status line.
 */

use super::parse::parse_payload;
use super::registry::{BoundEndpoint, EndpointOp, EndpointRegistry};
use crate::core::config::Config;
use crate::core::errors::ControlError;
use crate::core::limits::MAX_PAYLOAD_BYTES;
use crate::monitoring::RequestSpan;
use crate::set::ValueSet;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Bound but not yet serving control surface
///
/// Binding and serving are split so startup can fail atomically before any
/// request is accepted.
#[derive(Debug)]
pub struct ControlServer {
    set: Arc<ValueSet>,
    registry: EndpointRegistry,
    endpoints: Vec<BoundEndpoint>,
}

impl ControlServer {
    /// Register both endpoints
    ///
    /// On failure every endpoint already registered during this call is
    /// unregistered before the error is returned; no partial registration
    /// survives a failed start. Must be called from within a tokio runtime.
    pub fn bind(config: &Config, set: Arc<ValueSet>) -> Result<Self, ControlError> {
        std::fs::create_dir_all(&config.runtime_dir).map_err(|e| {
            ControlError::RegistrationFailure {
                name: config.insert_endpoint.clone(),
                reason: format!("runtime dir {}: {e}", config.runtime_dir.display()),
            }
        })?;

        let mut registry = EndpointRegistry::new(config.runtime_dir.clone());

        let insert = registry.register(&config.insert_endpoint, EndpointOp::Insert)?;
        let remove = match registry.register(&config.remove_endpoint, EndpointOp::Remove) {
            Ok(endpoint) => endpoint,
            Err(e) => {
                registry.unregister_all();
                return Err(e);
            }
        };

        Ok(Self {
            set,
            registry,
            endpoints: vec![insert, remove],
        })
    }

    /// Spawn one accept loop per endpoint and hand back the running server
    pub fn spawn(self) -> ServerHandle {
        let (shutdown_tx, _) = watch::channel(false);
        let mut tasks = Vec::with_capacity(self.endpoints.len());

        for endpoint in self.endpoints {
            info!(endpoint = %endpoint.name, "serving endpoint");
            tasks.push(tokio::spawn(accept_loop(
                endpoint,
                Arc::clone(&self.set),
                shutdown_tx.subscribe(),
            )));
        }

        ServerHandle {
            registry: self.registry,
            tasks,
            shutdown: shutdown_tx,
        }
    }
}

/// Handle to the serving control surface
pub struct ServerHandle {
    registry: EndpointRegistry,
    tasks: Vec<JoinHandle<()>>,
    shutdown: watch::Sender<bool>,
}

impl ServerHandle {
    /// Stop accepting, wait for the accept loops, unregister the endpoints
    pub async fn shutdown(mut self) {
        let _ = self.shutdown.send(true);
        for task in self.tasks.drain(..) {
            if let Err(e) = task.await {
                warn!(error = %e, "accept loop did not stop cleanly");
            }
        }
        // Listeners are gone with the loops; now the socket files.
        self.registry.unregister_all();
    }
}

async fn accept_loop(
    endpoint: BoundEndpoint,
    set: Arc<ValueSet>,
    mut shutdown: watch::Receiver<bool>,
) {
    let name: Arc<str> = Arc::from(endpoint.name.as_str());
    loop {
        tokio::select! {
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
            accepted = endpoint.listener.accept() => match accepted {
                Ok((stream, _addr)) => {
                    let set = Arc::clone(&set);
                    let name = Arc::clone(&name);
                    let op = endpoint.op;
                    tokio::spawn(async move {
                        handle_connection(stream, &name, op, &set).await;
                    });
                }
                Err(error) => {
                    warn!(endpoint = %name, %error, "accept failed");
                }
            }
        }
    }
    debug!(endpoint = %endpoint.name, "accept loop stopped");
}

/// Serve one request on one connection
async fn handle_connection(mut stream: UnixStream, name: &str, op: EndpointOp, set: &ValueSet) {
    let span = RequestSpan::new(name);

    let response = match read_request(&mut stream).await {
        Ok(payload) if payload.is_empty() => {
            span.record_kind("read");
            render_listing(set, name)
        }
        Ok(payload) => {
            span.record_kind("write");
            match apply_write(op, &payload, set) {
                Ok(line) => {
                    span.record_outcome("ok");
                    line
                }
                Err(e) => {
                    span.record_error(&e.to_string());
                    format!("error {}: {e}\n", e.kind())
                }
            }
        }
        Err(e) => {
            span.record_error(&e.to_string());
            format!("error {}: {e}\n", e.kind())
        }
    };

    if let Err(error) = stream.write_all(response.as_bytes()).await {
        warn!(endpoint = name, %error, "response write failed");
        return;
    }
    let _ = stream.shutdown().await;
}

/// Read the request payload, bounded
///
/// One byte past the accepted payload bound is enough to detect oversize
/// input without buffering arbitrary amounts of it; the parser then rejects
/// the oversize payload with a typed error.
async fn read_request(stream: &mut UnixStream) -> Result<Vec<u8>, ControlError> {
    let mut payload = Vec::with_capacity(MAX_PAYLOAD_BYTES + 1);
    let (reader, _writer) = stream.split();
    let mut limited = reader.take((MAX_PAYLOAD_BYTES + 1) as u64);
    limited
        .read_to_end(&mut payload)
        .await
        .map_err(|e| ControlError::TransferFault(e.to_string()))?;
    Ok(payload)
}

/// Drain a fresh labeled cursor into the response buffer
///
/// The cursor (and with it the epoch pin) is closed before the response
/// leaves for the socket, so the read-side protected region never spans I/O.
fn render_listing(set: &ValueSet, label: &str) -> String {
    let mut out = String::new();
    for line in set.iterate(label) {
        out.push_str(&line);
        out.push('\n');
    }
    out
}

fn apply_write(op: EndpointOp, payload: &[u8], set: &ValueSet) -> Result<String, ControlError> {
    let value = parse_payload(payload)?;
    match op {
        EndpointOp::Insert => {
            let outcome = set.insert(value)?;
            debug!(value, %outcome, "insert applied");
            Ok(format!("ok {outcome}\n"))
        }
        EndpointOp::Remove => {
            let outcome = set.remove(value);
            debug!(value, %outcome, "remove applied");
            Ok(format!("ok {outcome}\n"))
        }
    }
}
