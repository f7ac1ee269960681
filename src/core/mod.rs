/*!
 * Core Module
 * Errors, limits, configuration, and shared types
 */

pub mod config;
pub mod errors;
pub mod limits;
pub mod types;

pub use config::Config;
pub use errors::{ControlError, Result, SetError};
pub use types::Value;
