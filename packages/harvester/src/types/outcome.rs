//! Per-entry outcomes and the traversal report.

use crate::error::EntryError;
use crate::types::record::CourseRecord;

/// Result of one open/extract/close cycle.
#[derive(Debug)]
pub enum ExtractionResult {
    Success(CourseRecord),
    Failure { index: usize, reason: EntryError },
}

impl ExtractionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ExtractionResult::Success(_))
    }
}

/// An entry that produced no record.
#[derive(Debug)]
pub struct EntryFailure {
    /// Zero-based list position
    pub index: usize,
    pub reason: EntryError,
}

/// Everything a traversal produced.
#[derive(Debug, Default)]
pub struct TraversalReport {
    /// Entries present in the list when traversal started
    pub entry_count: usize,

    /// Positions visited (`min(entry_count, cap)`)
    pub visited: usize,

    /// Successful records, in list order
    pub records: Vec<CourseRecord>,

    /// Entries that failed, in list order
    pub failures: Vec<EntryFailure>,

    /// Times returning to the list view failed
    pub recovery_faults: usize,
}

impl TraversalReport {
    pub fn new(entry_count: usize) -> Self {
        Self {
            entry_count,
            ..Default::default()
        }
    }

    /// Fold one cycle's outcome into the report.
    pub fn record(&mut self, outcome: ExtractionResult) {
        self.visited += 1;
        match outcome {
            ExtractionResult::Success(record) => self.records.push(record),
            ExtractionResult::Failure { index, reason } => {
                self.failures.push(EntryFailure { index, reason })
            }
        }
    }

    pub fn failed_count(&self) -> usize {
        self.failures.len()
    }

    /// Consume the report, keeping only the records.
    pub fn into_records(self) -> Vec<CourseRecord> {
        self.records
    }
}
