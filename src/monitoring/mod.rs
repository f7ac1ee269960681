/*!
 * Monitoring Module
 * Tracing setup and request spans
 */

pub mod tracer;

pub use tracer::{generate_trace_id, init_tracing, RequestSpan};
