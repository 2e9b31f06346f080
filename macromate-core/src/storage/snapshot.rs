use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::{CustomFood, DayLog, Food, Goal, User};

/// Current snapshot schema version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Everything that is persisted, in file order.
///
/// Collections default to empty when absent, so fields added later keep
/// older snapshots of the same version readable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    #[serde(default)]
    pub active_user: Option<String>,
    #[serde(default)]
    pub goals: Vec<Goal>,
    #[serde(default)]
    pub foods: Vec<Food>,
    #[serde(default)]
    pub custom_foods: Vec<CustomFood>,
    #[serde(default)]
    pub day_logs: Vec<DayLog>,
    #[serde(default)]
    pub users_by_email: BTreeMap<String, User>,
    #[serde(default)]
    pub salt_by_email: BTreeMap<String, String>,
    #[serde(default)]
    pub hash_by_email: BTreeMap<String, String>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            active_user: None,
            goals: Vec::new(),
            foods: Vec::new(),
            custom_foods: Vec::new(),
            day_logs: Vec::new(),
            users_by_email: BTreeMap::new(),
            salt_by_email: BTreeMap::new(),
            hash_by_email: BTreeMap::new(),
        }
    }
}

/// Just enough of a snapshot to check its version before parsing the rest.
#[derive(Debug, Deserialize)]
pub(crate) struct VersionProbe {
    pub version: u32,
}
