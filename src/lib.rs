/*!
 * uniqset Library
 * Concurrently-accessed deduplicated integer set with text control endpoints
 */

pub mod control;
pub mod core;
pub mod monitoring;
pub mod set;

// Re-exports
pub use control::{ControlServer, EndpointOp, EndpointRegistry, ServerHandle};
pub use core::{Config, ControlError, SetError, Value};
pub use monitoring::init_tracing;
pub use set::{InsertOutcome, RemoveOutcome, SnapshotCursor, ValueSet};
