//! Latest-value cache
//!
//! Single-slot handoff between the acquisition loop and the consumer. A put
//! replaces whatever is in the slot, read or not; a get copies the slot and
//! leaves it in place. Under a fast producer the consumer only ever sees the
//! newest record.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::record::Record;

#[derive(Debug, Default)]
struct Slot {
    record: Option<Record>,
    /// Number of completed puts
    sequence: u64,
}

/// Shared single-slot, latest-wins record cache
#[derive(Debug, Clone, Default)]
pub struct LatestValueCache {
    slot: Arc<Mutex<Slot>>,
}

impl LatestValueCache {
    /// Empty cache
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Slot> {
        // A Record is Copy and written in one assignment, so a poisoned slot
        // still holds a whole record
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Overwrite the slot
    pub fn put(&self, record: Record) {
        let mut slot = self.lock();
        slot.record = Some(record);
        slot.sequence += 1;
    }

    /// Copy of the newest record, or `None` before the first put
    pub fn get(&self) -> Option<Record> {
        self.lock().record
    }

    /// Newest record together with the number of puts that preceded it
    ///
    /// The sequence lets a reader tell a fresh record from a repeat.
    pub fn get_with_sequence(&self) -> Option<(u64, Record)> {
        let slot = self.lock();
        slot.record.map(|r| (slot.sequence, r))
    }

    /// Number of completed puts
    pub fn sequence(&self) -> u64 {
        self.lock().sequence
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::SCHEMA_LEN;
    use std::thread;

    fn record(index: i64) -> Record {
        Record::from_values([index; SCHEMA_LEN])
    }

    #[test]
    fn test_empty_before_first_put() {
        let cache = LatestValueCache::new();
        assert_eq!(cache.get(), None);
        assert_eq!(cache.get_with_sequence(), None);
        assert_eq!(cache.sequence(), 0);
    }

    #[test]
    fn test_latest_wins() {
        let cache = LatestValueCache::new();
        cache.put(record(1));
        cache.put(record(2));
        for _ in 0..3 {
            assert_eq!(cache.get(), Some(record(2)));
        }
        assert_eq!(cache.get_with_sequence(), Some((2, record(2))));
    }

    #[test]
    fn test_get_does_not_consume() {
        let cache = LatestValueCache::new();
        cache.put(record(5));
        assert_eq!(cache.get(), cache.get());
    }

    #[test]
    fn test_readers_never_see_torn_records() {
        let cache = LatestValueCache::new();
        let writer = {
            let cache = cache.clone();
            thread::spawn(move || {
                for i in 1..=20_000 {
                    cache.put(record(i));
                }
            })
        };

        let mut last_seen = 0;
        while last_seen < 20_000 {
            if let Some(r) = cache.get() {
                // Every channel was written from the same index
                assert!(r.values().iter().all(|&v| v == r.log_index));
                assert!(r.log_index >= last_seen, "went back from {} to {}", last_seen, r.log_index);
                last_seen = r.log_index;
            }
        }
        writer.join().unwrap();
        assert_eq!(cache.get(), Some(record(20_000)));
    }
}
