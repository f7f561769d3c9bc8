//! Capacity-bounded request pool with two access paths
//!
//! Pending requests live in a fixed arena allocated up front. Every live
//! record is indexed twice: once by LBA (admission duplicate checks,
//! completion lookup) and once by physical location (the scheduler's
//! spatial scan). Both indices are threaded AVL trees over arena slot
//! numbers, so either path resolves in logarithmic time and an ordered
//! walk is a chain of successor links.

mod tavl;

use crate::error::{ReorderError, Result};
use crate::geometry::PhysicalLocation;
use tavl::{NodeId, Tavl, NIL};

/// One outstanding I/O request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestRecord {
    /// Logical block address, unique among pending records
    pub lba: u64,
    /// Length of the request in blocks (opaque to scheduling)
    pub block_count: u32,
    /// Physical position, computed once at admission and cached
    pub location: PhysicalLocation,
}

/// Location-ordered key: service group first, then track, with the LBA
/// as a final tie-break so equal locations still order deterministically
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct LocationKey {
    service_group: u32,
    track: u32,
    lba: u64,
}

impl LocationKey {
    fn of(record: &RequestRecord) -> Self {
        Self {
            service_group: record.location.service_group,
            track: record.location.track,
            lba: record.lba,
        }
    }
}

/// Fixed-capacity pool of pending requests, indexed by LBA and by location
#[derive(Debug)]
pub(crate) struct RequestPool {
    slots: Vec<Option<RequestRecord>>,
    free: Vec<u32>,
    by_lba: Tavl<u64>,
    by_location: Tavl<LocationKey>,
}

impl RequestPool {
    /// Allocate a pool with a fixed number of request slots
    pub(crate) fn new(capacity: usize) -> Self {
        let slots = (0..capacity).map(|_| None).collect();
        // Pop order makes slot 0 the first handed out, which keeps
        // failure diagnostics stable across runs.
        let free = (0..capacity as u32).rev().collect();
        Self {
            slots,
            free,
            by_lba: Tavl::with_capacity(capacity),
            by_location: Tavl::with_capacity(capacity),
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn contains(&self, lba: u64) -> bool {
        self.by_lba.get(&lba).is_some()
    }

    /// Admit a record into the pool
    ///
    /// Validates before committing: a failed insert leaves the pool
    /// exactly as it was.
    ///
    /// # Returns
    /// * `Err(DuplicateKey)` if the LBA is already pending
    /// * `Err(CapacityExceeded)` if every slot is in use
    pub(crate) fn insert(&mut self, record: RequestRecord) -> Result<()> {
        if self.contains(record.lba) {
            return Err(ReorderError::DuplicateKey { lba: record.lba });
        }
        let slot = match self.free.pop() {
            Some(slot) => slot,
            None => {
                return Err(ReorderError::CapacityExceeded {
                    capacity: self.capacity(),
                })
            }
        };

        self.by_lba.insert(record.lba, slot);
        self.by_location.insert(LocationKey::of(&record), slot);
        self.slots[slot as usize] = Some(record);
        Ok(())
    }

    /// Remove and return the record for an LBA
    ///
    /// # Returns
    /// * `Err(NotFound)` if the LBA is not pending
    pub(crate) fn remove_by_lba(&mut self, lba: u64) -> Result<RequestRecord> {
        let slot = self
            .by_lba
            .remove(&lba)
            .ok_or(ReorderError::NotFound { lba })?;
        let record = match self.slots[slot as usize].take() {
            Some(record) => record,
            // A slot named by the LBA index is always occupied; treat a
            // miss as the record being gone rather than poisoning state.
            None => return Err(ReorderError::NotFound { lba }),
        };
        let removed = self.by_location.remove(&LocationKey::of(&record));
        debug_assert_eq!(removed, Some(slot));
        self.free.push(slot);
        Ok(record)
    }

    /// Ascending cyclic scan of pending records in location order
    ///
    /// Starts at the first record whose service group is `>= start_sg`,
    /// wraps past the maximum service group back to zero, and visits
    /// each pending record exactly once. The iterator borrows the pool,
    /// so a fresh scan can be started per selection call.
    pub(crate) fn scan_from(&self, start_sg: u32) -> Scan<'_> {
        let start = LocationKey {
            service_group: start_sg,
            track: 0,
            lba: 0,
        };
        Scan {
            pool: self,
            cursor: self.by_location.lower_bound(&start),
            remaining: self.len(),
        }
    }

    /// Cross-index consistency check for tests: every live slot must be
    /// reachable through both trees, and both trees must agree on size
    #[cfg(test)]
    pub(crate) fn verify(&self) {
        self.by_lba.verify();
        self.by_location.verify();
        assert_eq!(self.by_lba.len(), self.len());
        assert_eq!(self.by_location.len(), self.len());
        for (slot, entry) in self.slots.iter().enumerate() {
            if let Some(record) = entry {
                assert_eq!(self.by_lba.get(&record.lba), Some(slot as u32));
                assert_eq!(
                    self.by_location.get(&LocationKey::of(record)),
                    Some(slot as u32)
                );
            }
        }
    }
}

/// Lazy cyclic iterator over pending records in location order
pub(crate) struct Scan<'a> {
    pool: &'a RequestPool,
    cursor: NodeId,
    remaining: usize,
}

impl<'a> Iterator for Scan<'a> {
    type Item = &'a RequestRecord;

    fn next(&mut self) -> Option<&'a RequestRecord> {
        if self.remaining == 0 {
            return None;
        }
        if self.cursor == NIL {
            // Wrapped past the maximum service group; resume at zero.
            self.cursor = self.pool.by_location.first();
        }
        let slot = self.pool.by_location.slot_of(self.cursor);
        self.cursor = self.pool.by_location.next(self.cursor);
        self.remaining -= 1;
        self.pool.slots[slot as usize].as_ref()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}
