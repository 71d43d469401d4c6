//! Upsert-by-key store for practice logs.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::model::PracticeLog;

/// One practice log per (student, date). A later save replaces the earlier
/// log in full; subjects are never merged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PracticeLogBook {
    logs: BTreeMap<(String, NaiveDate), PracticeLog>,
}

impl PracticeLogBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a book from logs in save order.
    pub fn from_saves<I>(saves: I) -> Self
    where
        I: IntoIterator<Item = PracticeLog>,
    {
        let mut book = Self::new();
        for log in saves {
            book.upsert(log);
        }
        book
    }

    /// Insert or replace the log for its (student, date). Returns the replaced log.
    pub fn upsert(&mut self, log: PracticeLog) -> Option<PracticeLog> {
        let key = (log.student_id.clone(), log.date);
        let previous = self.logs.insert(key, log);
        if let Some(prev) = &previous {
            tracing::debug!(
                student = %prev.student_id,
                date = %prev.date,
                "practice log replaced by a later save"
            );
        }
        previous
    }

    pub fn get(&self, student_id: &str, date: NaiveDate) -> Option<&PracticeLog> {
        self.logs.get(&(student_id.to_string(), date))
    }

    pub fn len(&self) -> usize {
        self.logs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.logs.is_empty()
    }

    /// Logs ordered by student, then date.
    pub fn iter(&self) -> impl Iterator<Item = &PracticeLog> {
        self.logs.values()
    }

    pub fn into_vec(self) -> Vec<PracticeLog> {
        self.logs.into_values().collect()
    }
}
