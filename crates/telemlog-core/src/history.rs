//! Plot history
//!
//! Fixed-capacity per-channel series kept by the consumer side. Appending
//! to a full buffer evicts the oldest element.

use std::collections::VecDeque;

use crate::record::{Channel, Record, SCHEMA_LEN};

/// Default number of points kept per channel
pub const DEFAULT_HISTORY_CAPACITY: usize = 1200;

/// Fixed-capacity FIFO buffer
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T: Clone> RingBuffer<T> {
    /// Create an empty buffer holding at most `capacity` elements
    ///
    /// A zero capacity is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append, evicting the oldest element when full
    pub fn append(&mut self, value: T) {
        if self.items.len() >= self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(value);
    }

    /// Contents in arrival order
    pub fn snapshot(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }

    /// Iterate in arrival order
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    /// Most recent element
    pub fn latest(&self) -> Option<&T> {
        self.items.back()
    }

    /// Number of stored elements
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing was appended since creation or the last clear
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Maximum number of stored elements
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop all elements
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

/// One ring buffer per schema channel
///
/// The `log_index` channel serves as the shared x axis.
#[derive(Debug, Clone)]
pub struct History {
    series: Vec<RingBuffer<i64>>,
    last: Option<Record>,
}

impl History {
    /// Empty history keeping `capacity` points per channel
    pub fn new(capacity: usize) -> Self {
        Self {
            series: (0..SCHEMA_LEN).map(|_| RingBuffer::new(capacity)).collect(),
            last: None,
        }
    }

    /// Append every channel of `record`
    ///
    /// Returns `false` without appending when `record` equals the last one
    /// ingested, i.e. the consumer ticked without new data.
    pub fn ingest(&mut self, record: &Record) -> bool {
        if self.last.as_ref() == Some(record) {
            return false;
        }
        for (buffer, value) in self.series.iter_mut().zip(record.values()) {
            buffer.append(value);
        }
        self.last = Some(*record);
        true
    }

    /// Points of one channel in arrival order
    pub fn series(&self, channel: Channel) -> Vec<i64> {
        self.series[channel.index()].snapshot()
    }

    /// Buffer backing one channel
    pub fn buffer(&self, channel: Channel) -> &RingBuffer<i64> {
        &self.series[channel.index()]
    }

    /// Last record ingested
    pub fn last(&self) -> Option<&Record> {
        self.last.as_ref()
    }

    /// Number of points per channel
    pub fn len(&self) -> usize {
        self.series[0].len()
    }

    /// Whether no record was ingested
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Points kept per channel
    pub fn capacity(&self) -> usize {
        self.series[0].capacity()
    }

    /// Forget all points and the last record
    pub fn clear(&mut self) {
        self.series.iter_mut().for_each(RingBuffer::clear);
        self.last = None;
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(index: i64) -> Record {
        let mut values = [0i64; SCHEMA_LEN];
        values[0] = index;
        values[1] = index * 100;
        Record::from_values(values)
    }

    #[test]
    fn test_eviction_keeps_newest() {
        let mut buffer = RingBuffer::new(4);
        for i in 1..=5 {
            buffer.append(i);
        }
        assert_eq!(buffer.len(), 4);
        assert_eq!(buffer.snapshot(), vec![2, 3, 4, 5]);
        assert_eq!(buffer.latest(), Some(&5));
    }

    #[test]
    fn test_below_capacity() {
        let mut buffer = RingBuffer::new(10);
        buffer.append("a");
        buffer.append("b");
        assert_eq!(buffer.snapshot(), vec!["a", "b"]);
        buffer.clear();
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_zero_capacity_holds_one() {
        let mut buffer = RingBuffer::new(0);
        buffer.append(1);
        buffer.append(2);
        assert_eq!(buffer.snapshot(), vec![2]);
    }

    #[test]
    fn test_history_ingest() {
        let mut history = History::new(3);
        for i in 1..=4 {
            assert!(history.ingest(&record(i)));
        }
        assert_eq!(history.series(Channel::LogIndex), vec![2, 3, 4]);
        assert_eq!(history.series(Channel::EngineRpm), vec![200, 300, 400]);
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn test_history_skips_repeated_record() {
        let mut history = History::default();
        assert!(history.ingest(&record(1)));
        assert!(!history.ingest(&record(1)));
        assert!(history.ingest(&record(2)));
        assert_eq!(history.series(Channel::LogIndex), vec![1, 2]);
        assert_eq!(history.last(), Some(&record(2)));
    }
}
