/*!
 * Set Entry
 * One stored value plus its link into the insertion-ordered list
 */

use crate::core::types::Value;
use crossbeam_epoch::Atomic;

/// A single linked entry
///
/// While linked the set collectively owns the entry. Once unlinked it is
/// owned by the epoch collector until every reader pinned at unlink time has
/// finished, then destroyed.
pub(super) struct Entry {
    pub(super) value: Value,
    pub(super) next: Atomic<Entry>,
}

impl Entry {
    pub(super) fn new(value: Value) -> Self {
        Self {
            value,
            next: Atomic::null(),
        }
    }
}
