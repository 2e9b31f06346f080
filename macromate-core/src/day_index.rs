//! Lookup from (user, date) to a position in the day-log list.

use chrono::NaiveDate;
use std::collections::HashMap;

use crate::models::DayLog;

/// Maps `(user id, date)` to the index of that day's log in the owning
/// `Vec<DayLog>`.
///
/// Positions stay valid as long as day logs are only appended. Any other
/// change to the list requires a `rebuild`.
#[derive(Debug, Clone, Default)]
pub struct DayLogIndex {
    positions: HashMap<(String, NaiveDate), usize>,
}

impl DayLogIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indexes `logs` from scratch. When two logs share a key the earlier
    /// one wins.
    pub fn rebuild(logs: &[DayLog]) -> Self {
        let mut positions = HashMap::with_capacity(logs.len());
        for (pos, log) in logs.iter().enumerate() {
            positions
                .entry((log.user_id.clone(), log.date))
                .or_insert(pos);
        }
        Self { positions }
    }

    pub fn get(&self, user_id: &str, date: NaiveDate) -> Option<usize> {
        self.positions.get(&(user_id.to_string(), date)).copied()
    }

    /// Records a position. Returns false and keeps the existing one if the
    /// key is already indexed.
    pub fn insert(&mut self, user_id: &str, date: NaiveDate, pos: usize) -> bool {
        let key = (user_id.to_string(), date);
        if self.positions.contains_key(&key) {
            return false;
        }
        self.positions.insert(key, pos);
        true
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
