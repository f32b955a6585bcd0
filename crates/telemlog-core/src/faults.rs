//! Fault word decoding
//!
//! Maps bits of the `faultword1` channel to labels. The table is plain data:
//! swap it for the real mapping of a given logger build.

use std::collections::BTreeMap;

/// Bit position to label lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaultTable {
    labels: BTreeMap<u8, String>,
}

impl FaultTable {
    /// Empty table
    pub fn empty() -> Self {
        Self {
            labels: BTreeMap::new(),
        }
    }

    /// Build from `(bit, label)` pairs. Bits above 63 are ignored.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (u8, S)>,
        S: Into<String>,
    {
        let labels = pairs
            .into_iter()
            .filter(|(bit, _)| *bit < 64)
            .map(|(bit, label)| (bit, label.into()))
            .collect();
        Self { labels }
    }

    /// Label of a single bit
    pub fn label(&self, bit: u8) -> Option<&str> {
        self.labels.get(&bit).map(String::as_str)
    }

    /// Labels of the set bits, lowest bit first. Unmapped bits are skipped.
    pub fn decode(&self, mask: i64) -> Vec<&str> {
        let mask = mask as u64;
        self.labels
            .iter()
            .filter(|(bit, _)| mask & (1u64 << **bit) != 0)
            .map(|(_, label)| label.as_str())
            .collect()
    }

    /// `FAULT <mask>: a, b`, or `None` when no bit is set
    pub fn summary(&self, mask: i64) -> Option<String> {
        if mask == 0 {
            return None;
        }
        Some(format!("FAULT {}: {}", mask, self.decode(mask).join(", ")))
    }
}

impl Default for FaultTable {
    /// Placeholder labels shipped with the logger
    fn default() -> Self {
        Self::from_pairs([
            (0, "SENSOR_ERR"),
            (1, "OVERBOOST"),
            (2, "LOW_OIL"),
            (3, "HIGH_EGT"),
            (4, "LOW_FUEL_PRESS"),
            (5, "LOW_U12V"),
            (6, "LOW_U5V"),
            (7, "MAP_IMPLAUS"),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_default_table() {
        let table = FaultTable::default();
        assert!(table.decode(0).is_empty());
        assert_eq!(table.decode(0b101), vec!["SENSOR_ERR", "LOW_OIL"]);
        assert_eq!(table.decode(1 << 7), vec!["MAP_IMPLAUS"]);
    }

    #[test]
    fn test_unmapped_bits_are_skipped() {
        let table = FaultTable::default();
        assert_eq!(table.decode((1 << 12) | 2), vec!["OVERBOOST"]);
        assert_eq!(table.summary(1 << 12).as_deref(), Some("FAULT 4096: "));
    }

    #[test]
    fn test_summary() {
        let table = FaultTable::default();
        assert_eq!(table.summary(0), None);
        assert_eq!(table.summary(10).as_deref(), Some("FAULT 10: OVERBOOST, HIGH_EGT"));
    }

    #[test]
    fn test_custom_table() {
        let table = FaultTable::from_pairs([(3u8, "DOOR_OPEN"), (63, "TOP"), (70, "IGNORED")]);
        assert_eq!(table.label(3), Some("DOOR_OPEN"));
        assert_eq!(table.label(70), None);
        assert_eq!(table.decode(-1), vec!["DOOR_OPEN", "TOP"]);
        assert!(FaultTable::empty().decode(-1).is_empty());
    }
}
