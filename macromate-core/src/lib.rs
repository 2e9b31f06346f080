//! MacroMate Core Library
//!
//! Accounts, the food catalog, custom foods, day logs, goals and the
//! nutrient arithmetic behind them, persisted as one JSON snapshot.

pub mod credentials;
pub mod day_index;
mod manager;
pub mod models;
pub mod nutrition;
pub mod report;
pub mod storage;

pub use credentials::{CredentialRejection, CredentialStore};
pub use day_index::DayLogIndex;
pub use manager::{DataManager, LoadOutcome};
pub use models::{
    mirror_food_id, ActivityLevel, CustomFood, DayLog, DayTotals, Food, FoodLog, Goal, Ingredient,
    MealType, Nutrients, ProfileUpdate, Sex, User, ValidationError, CUSTOM_FOOD_PREFIX,
};
pub use report::{DaySummary, GoalProgress, WeeklySummary};
pub use storage::{Snapshot, SnapshotStorage, StorageError};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
