/*!
 * Concurrent Set Module
 * Entry storage, writer-serialized mutation, and epoch-protected iteration
 */

mod cursor;
mod entry;
mod list;

pub use cursor::{CursorItem, SnapshotCursor, Values};
pub use list::{InsertOutcome, RemoveOutcome, ValueSet};
