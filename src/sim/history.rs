//! Bounded record of simulated steps.

use std::collections::VecDeque;

use tracing::debug;

use super::types::PerformanceRecord;

/// Once the history grows past this many records it is trimmed.
pub const HISTORY_CEILING: usize = 10_000;
/// Records kept after a trim: one year of hourly steps.
pub const HISTORY_RETAIN: usize = 8_760;

/// Append-only step history with a fixed retention policy.
///
/// Records are never mutated once pushed. When the length exceeds
/// [`HISTORY_CEILING`] the oldest records are dropped until
/// [`HISTORY_RETAIN`] remain.
#[derive(Debug, Clone, Default)]
pub struct History {
    records: VecDeque<PerformanceRecord>,
    total_pushed: usize,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record, trimming if the ceiling is exceeded.
    pub fn push(&mut self, record: PerformanceRecord) {
        self.records.push_back(record);
        self.total_pushed += 1;
        if self.records.len() > HISTORY_CEILING {
            let dropped = self.records.len() - HISTORY_RETAIN;
            self.records.drain(..dropped);
            debug!(dropped, retained = self.records.len(), "history trimmed");
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Steps pushed since creation, including trimmed ones.
    pub fn total_pushed(&self) -> usize {
        self.total_pushed
    }

    pub fn latest(&self) -> Option<&PerformanceRecord> {
        self.records.back()
    }

    /// Iterates retained records, oldest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &PerformanceRecord> + ExactSizeIterator {
        self.records.iter()
    }

    /// Iterates the most recent `n` records (or fewer), oldest first.
    pub fn trailing(&self, n: usize) -> impl DoubleEndedIterator<Item = &PerformanceRecord> {
        let skip = self.records.len().saturating_sub(n);
        self.records.iter().skip(skip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::PerModality;
    use crate::sim::types::tests::record;

    #[test]
    fn retains_everything_below_ceiling() {
        let mut h = History::new();
        for t in 0..HISTORY_CEILING {
            h.push(record(t, 1.0, PerModality::default()));
            assert_eq!(h.len(), t + 1);
        }
        assert_eq!(h.len(), HISTORY_CEILING);
    }

    #[test]
    fn trims_to_one_year_past_ceiling() {
        let mut h = History::new();
        for t in 0..=HISTORY_CEILING {
            h.push(record(t, 1.0, PerModality::default()));
        }
        assert_eq!(h.len(), HISTORY_RETAIN);
        assert_eq!(h.total_pushed(), HISTORY_CEILING + 1);
        assert_eq!(h.latest().map(|r| r.time_index), Some(HISTORY_CEILING));
        assert_eq!(
            h.iter().next().map(|r| r.time_index),
            Some(HISTORY_CEILING + 1 - HISTORY_RETAIN)
        );
    }

    #[test]
    fn length_never_exceeds_ceiling() {
        let mut h = History::new();
        for t in 0..25_000 {
            h.push(record(t, 0.0, PerModality::default()));
            assert!(h.len() <= HISTORY_CEILING);
        }
    }

    #[test]
    fn trailing_window() {
        let mut h = History::new();
        for t in 0..10 {
            h.push(record(t, t as f64, PerModality::default()));
        }
        let last: Vec<_> = h.trailing(3).map(|r| r.time_index).collect();
        assert_eq!(last, vec![7, 8, 9]);
        assert_eq!(h.trailing(50).count(), 10);
    }
}
