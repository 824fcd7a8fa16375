//! Record id generation.
//!
//! Ids are decimal Unix-millisecond timestamps, the format the browser
//! application used. Within one generator they are strictly increasing, so
//! two records created in the same millisecond still get distinct ids.

use std::cell::Cell;

use chrono::{DateTime, Utc};

/// Issues timestamp-derived record ids.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: Cell<i64>,
}

impl IdGenerator {
    /// Create a generator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Next id for the current time.
    #[must_use]
    pub fn next_id(&self) -> String {
        self.next_at(Utc::now())
    }

    /// Next id for the given time; bumps past the last issued id if needed.
    #[must_use]
    pub fn next_at(&self, now: DateTime<Utc>) -> String {
        let id = now.timestamp_millis().max(self.last.get() + 1);
        self.last.set(id);
        id.to_string()
    }
}

/// Id of the task at `index` (zero-based) within a record.
#[must_use]
pub fn task_id(record_id: &str, index: usize) -> String {
    format!("{record_id}-{}", index + 1)
}
