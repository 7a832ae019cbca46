//! Bounded execution history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

use super::{Command, CommandResult, ExecutionId};

/// Immutable audit record of one execution, whatever its outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    /// Correlation identifier.
    pub id: ExecutionId,
    /// The executed command.
    pub command: Command,
    /// The normalized result.
    pub result: CommandResult,
    /// When the execution settled.
    pub timestamp: DateTime<Utc>,
    /// Wall-clock time spent executing.
    pub elapsed: Duration,
}

/// Ring buffer of execution records.
///
/// Once `capacity` records are held, each new record evicts the oldest. A
/// capacity of zero retains nothing.
#[derive(Debug, Clone, Default)]
pub struct ExecutionHistory {
    capacity: usize,
    records: VecDeque<ExecutionRecord>,
}

impl ExecutionHistory {
    /// Creates an empty history with the given capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            records: VecDeque::with_capacity(capacity),
        }
    }

    /// Appends a record, evicting the oldest when full.
    pub fn push(&mut self, record: ExecutionRecord) {
        if self.capacity == 0 {
            return;
        }
        while self.records.len() >= self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    /// Returns the maximum number of retained records.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of retained records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` when no records are retained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the most recent record.
    #[must_use]
    pub fn latest(&self) -> Option<&ExecutionRecord> {
        self.records.back()
    }

    /// Iterates records from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &ExecutionRecord> {
        self.records.iter()
    }
}
