/*!
 * Concurrent Value Set
 * Deduplicated, insertion-ordered set with lock-serialized writers and
 * epoch-protected lock-free readers
 */

use super::cursor::SnapshotCursor;
use super::entry::Entry;
use crate::core::errors::SetError;
use crate::core::limits::DEFAULT_MAX_ENTRIES;
use crate::core::types::Value;
use crossbeam_epoch::{self as epoch, Atomic, Owned, Shared};
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

/// Outcome of an insert: the set either grew or already held the value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    AlreadyPresent,
}

impl fmt::Display for InsertOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InsertOutcome::Inserted => write!(f, "inserted"),
            InsertOutcome::AlreadyPresent => write!(f, "already present"),
        }
    }
}

/// Outcome of a remove: the value was unlinked or was never there
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    NotFound,
}

impl fmt::Display for RemoveOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoveOutcome::Removed => write!(f, "removed"),
            RemoveOutcome::NotFound => write!(f, "not found"),
        }
    }
}

/// Deduplicated set of values in insertion order
///
/// # Concurrency
///
/// - Writers (`insert`, `remove`, `drain`) serialize on a mutex held only
///   across the scan and the single link/unlink store.
/// - Readers ([`ValueSet::iterate`]) never take the mutex; they pin the
///   epoch for the cursor's lifetime instead. Writers never wait on readers.
/// - An unlinked entry is handed to the epoch collector and destroyed only
///   after every reader pinned at unlink time has finished.
///
/// # Performance
///
/// - Insert and remove scan linearly; dedup on insert is an accepted O(n)
///   cost.
/// - Reads are wait-free pointer chasing under a pin.
pub struct ValueSet {
    pub(super) head: Atomic<Entry>,
    writer: Mutex<()>,
    len: AtomicUsize,
    capacity: usize,
}

impl ValueSet {
    /// Create an empty set bounded by the default capacity
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_ENTRIES)
    }

    /// Create an empty set holding at most `capacity` distinct values
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            head: Atomic::null(),
            writer: Mutex::new(()),
            len: AtomicUsize::new(0),
            capacity,
        }
    }

    /// Insert a value unless it is already present
    ///
    /// The candidate entry is allocated before the lock is taken and is
    /// discarded without ever being linked when the value is a duplicate.
    /// The link itself is one release store: a fully built entry becomes
    /// visible to readers, or nothing does.
    ///
    /// # Errors
    ///
    /// [`SetError::AllocationFailure`] when the capacity bound is reached;
    /// nothing is linked in that case.
    pub fn insert(&self, value: Value) -> Result<InsertOutcome, SetError> {
        let guard = epoch::pin();
        let candidate = Owned::new(Entry::new(value));

        let lock = self.writer.lock();
        // Writers own all structural mutation while the lock is held, so the
        // scan below cannot race an unlink.
        let mut link = &self.head;
        loop {
            let shared = link.load(Ordering::Acquire, &guard);
            match unsafe { shared.as_ref() } {
                Some(entry) if entry.value == value => {
                    drop(lock);
                    // Candidate was never linked and never observed.
                    drop(candidate);
                    return Ok(InsertOutcome::AlreadyPresent);
                }
                Some(entry) => link = &entry.next,
                None => {
                    if self.len.load(Ordering::Relaxed) >= self.capacity {
                        drop(lock);
                        drop(candidate);
                        return Err(SetError::AllocationFailure {
                            limit: self.capacity,
                        });
                    }
                    // Publish: a single release store links the entry at the
                    // tail; readers see it fully constructed or not at all.
                    link.store(candidate, Ordering::Release);
                    self.len.fetch_add(1, Ordering::Relaxed);
                    drop(lock);
                    return Ok(InsertOutcome::Inserted);
                }
            }
        }
    }

    /// Remove a value if present
    ///
    /// Unlinking is one release store, after which no new traversal can
    /// reach the entry. The entry itself is handed to the epoch collector
    /// once the lock is released and freed only after every reader pinned at
    /// unlink time has finished.
    pub fn remove(&self, value: Value) -> RemoveOutcome {
        let guard = epoch::pin();

        let lock = self.writer.lock();
        let mut link = &self.head;
        loop {
            let shared = link.load(Ordering::Acquire, &guard);
            let Some(entry) = (unsafe { shared.as_ref() }) else {
                drop(lock);
                return RemoveOutcome::NotFound;
            };
            if entry.value == value {
                let next = entry.next.load(Ordering::Acquire, &guard);
                link.store(next, Ordering::Release);
                self.len.fetch_sub(1, Ordering::Relaxed);
                drop(lock);
                // Readers that were pinned before the unlink may still be
                // standing on this entry; destruction is deferred past them.
                unsafe { guard.defer_destroy(shared) };
                return RemoveOutcome::Removed;
            }
            link = &entry.next;
        }
    }

    /// Open a labeled snapshot cursor over the current members
    ///
    /// Enters the read-side protected region; the region is left when the
    /// cursor is ended or dropped. See [`SnapshotCursor`].
    pub fn iterate(&self, label: impl Into<String>) -> SnapshotCursor<'_> {
        SnapshotCursor::new(self, label.into())
    }

    /// Number of stored values (advisory under concurrent mutation)
    #[inline]
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Relaxed)
    }

    /// Whether the set is empty (advisory under concurrent mutation)
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Configured capacity bound
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Unlink and reclaim every remaining entry
    ///
    /// Shutdown path: unregistration has already stopped new readers, and
    /// stragglers are still protected because reclamation goes through the
    /// epoch collector. Returns how many entries were drained.
    pub fn drain(&self) -> usize {
        let guard = epoch::pin();
        let _lock = self.writer.lock();

        let mut drained = 0;
        let mut cur = self.head.swap(Shared::null(), Ordering::AcqRel, &guard);
        while let Some(entry) = unsafe { cur.as_ref() } {
            let next = entry.next.load(Ordering::Acquire, &guard);
            debug!(value = entry.value, "draining entry");
            unsafe { guard.defer_destroy(cur) };
            cur = next;
            drained += 1;
        }
        self.len.store(0, Ordering::Relaxed);
        drained
    }
}

impl Default for ValueSet {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ValueSet {
    fn drop(&mut self) {
        // Exclusive access: no reader can be pinned on this set anymore, so
        // the remaining chain is freed directly.
        unsafe {
            let guard = epoch::unprotected();
            let mut cur = self.head.load(Ordering::Relaxed, guard);
            while !cur.is_null() {
                let next = cur.deref().next.load(Ordering::Relaxed, guard);
                drop(cur.into_owned());
                cur = next;
            }
        }
    }
}

impl fmt::Debug for ValueSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueSet")
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}
