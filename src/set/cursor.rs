/*!
 * Snapshot Cursor
 * One-shot labeled iteration over the set, safe against concurrent writers
 */

use super::entry::Entry;
use super::list::ValueSet;
use crate::core::types::Value;
use crossbeam_epoch::{self as epoch, Guard};
use std::sync::atomic::Ordering;

/// Where the cursor currently stands
enum Position {
    Start,
    Node(*const Entry),
    Finished,
}

/// What a single advance produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorItem {
    /// Start sentinel, emitted exactly once before any member
    Start,
    /// A member value, in insertion order
    Member(Value),
}

/// Lazy one-shot view over the set's members
///
/// Holds an epoch pin for its entire lifetime, so no entry it can still
/// reach is reclaimed under it — entries removed mid-traversal are observed
/// once or not at all, never as freed memory. The pin is released by
/// [`SnapshotCursor::end`] or by drop, whichever comes first; both are safe
/// on every exit path.
///
/// The view is weakly consistent: an entry appended after the cursor passed
/// the tail may or may not be observed. A cursor is not restartable; each
/// read opens a fresh one.
///
/// As an [`Iterator`] it yields wire lines: the start line identifying the
/// label, then `val is <value>` per member.
pub struct SnapshotCursor<'a> {
    set: &'a ValueSet,
    label: String,
    guard: Option<Guard>,
    position: Position,
}

impl<'a> SnapshotCursor<'a> {
    pub(super) fn new(set: &'a ValueSet, label: String) -> Self {
        Self {
            set,
            label,
            // Entering the read-side protected region; held until end/drop.
            guard: Some(epoch::pin()),
            position: Position::Start,
        }
    }

    /// Endpoint label this cursor was opened for
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Advance one step
    pub fn advance(&mut self) -> Option<CursorItem> {
        let guard = self.guard.as_ref()?;
        match self.position {
            Position::Start => {
                let head = self.set.head.load(Ordering::Acquire, guard);
                self.position = if head.is_null() {
                    Position::Finished
                } else {
                    Position::Node(head.as_raw())
                };
                Some(CursorItem::Start)
            }
            Position::Node(ptr) => {
                // Safety: the pin has been held since before this pointer
                // was loaded from a live link, so the entry cannot have been
                // reclaimed even if it was unlinked since.
                let entry = unsafe { &*ptr };
                let next = entry.next.load(Ordering::Acquire, guard);
                self.position = if next.is_null() {
                    Position::Finished
                } else {
                    Position::Node(next.as_raw())
                };
                Some(CursorItem::Member(entry.value))
            }
            Position::Finished => None,
        }
    }

    /// Leave the read-side protected region
    ///
    /// Idempotent; dropping the cursor has the same effect. After this the
    /// cursor only yields `None`.
    pub fn end(&mut self) {
        self.position = Position::Finished;
        self.guard = None;
    }

    /// Member values only, skipping the start sentinel
    pub fn values(self) -> Values<'a> {
        Values(self)
    }
}

impl Iterator for SnapshotCursor<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        match self.advance()? {
            CursorItem::Start => Some(format!(
                "This is start of list, (entry name is {})",
                self.label
            )),
            CursorItem::Member(value) => Some(format!("val is {value}")),
        }
    }
}

/// Adapter over [`SnapshotCursor`] yielding member values
pub struct Values<'a>(SnapshotCursor<'a>);

impl Iterator for Values<'_> {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        loop {
            match self.0.advance()? {
                CursorItem::Start => continue,
                CursorItem::Member(value) => return Some(value),
            }
        }
    }
}
