//! The single entry point the presentation layer talks to.

use chrono::{Local, NaiveDate, NaiveDateTime};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::credentials::{normalize_email, CredentialStore};
use crate::day_index::DayLogIndex;
use crate::models::{
    mirror_food_id, CustomFood, DayLog, Food, FoodLog, Goal, MealType, Nutrients, ProfileUpdate,
    User, CUSTOM_FOOD_PREFIX,
};
use crate::report::{GoalProgress, WeeklySummary};
use crate::storage::{seed_catalog, Snapshot, SnapshotStorage, StorageError, SNAPSHOT_VERSION};

/// What `load_all_data` found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The snapshot was read.
    Loaded,
    /// No snapshot existed; state starts empty.
    Fresh,
    /// The snapshot could not be read and state was reset. Holds the reason.
    Recovered(String),
}

impl fmt::Display for LoadOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadOutcome::Loaded => write!(f, "loaded"),
            LoadOutcome::Fresh => write!(f, "fresh"),
            LoadOutcome::Recovered(reason) => write!(f, "recovered ({})", reason),
        }
    }
}

/// Owns every collection, the active session and the snapshot storage.
///
/// Registration, email changes and custom-food creation or deletion save
/// immediately. Everything else is persisted by an explicit
/// [`save_all_data`](Self::save_all_data).
#[derive(Debug)]
pub struct DataManager {
    storage: SnapshotStorage,
    active_user: Option<String>,
    goals: Vec<Goal>,
    foods: Vec<Food>,
    custom_foods: Vec<CustomFood>,
    day_logs: Vec<DayLog>,
    day_index: DayLogIndex,
    credentials: CredentialStore,
    last_save_error: Option<StorageError>,
}

impl DataManager {
    /// Creates an empty manager for `data_dir` without touching the disk.
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            storage: SnapshotStorage::new(data_dir),
            active_user: None,
            goals: Vec::new(),
            foods: Vec::new(),
            custom_foods: Vec::new(),
            day_logs: Vec::new(),
            day_index: DayLogIndex::new(),
            credentials: CredentialStore::new(),
            last_save_error: None,
        }
    }

    /// Creates a manager and loads whatever is stored in `data_dir`.
    pub fn open(data_dir: PathBuf) -> (Self, LoadOutcome) {
        let mut manager = Self::new(data_dir);
        let outcome = manager.load_all_data();
        (manager, outcome)
    }

    pub fn data_dir(&self) -> &Path {
        self.storage.data_dir()
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.storage.path()
    }

    // ---- persistence ----

    /// Replaces in-memory state with the snapshot on disk.
    ///
    /// Never fails: a missing snapshot starts fresh and an unreadable one is
    /// discarded. The catalog is seeded when it ends up empty.
    pub fn load_all_data(&mut self) -> LoadOutcome {
        if let Err(e) = fs::create_dir_all(self.storage.data_dir()) {
            tracing::warn!(
                "Failed to create data directory {}: {}",
                self.storage.data_dir().display(),
                e
            );
        }

        let outcome = match self.storage.load() {
            Ok(Some(snapshot)) => {
                self.apply_snapshot(snapshot);
                tracing::info!(
                    "Loaded {} user(s), {} food(s), {} day log(s)",
                    self.credentials.len(),
                    self.foods.len(),
                    self.day_logs.len()
                );
                LoadOutcome::Loaded
            }
            Ok(None) => {
                self.apply_snapshot(Snapshot::default());
                tracing::info!("No {} found, starting empty", self.storage.path().display());
                LoadOutcome::Fresh
            }
            Err(e) => {
                tracing::warn!("Failed to load snapshot, starting empty: {}", e);
                self.apply_snapshot(Snapshot::default());
                LoadOutcome::Recovered(e.to_string())
            }
        };

        if seed_catalog(&mut self.foods) {
            tracing::info!("Seeded default food catalog");
        }

        outcome
    }

    /// Writes the full state to disk.
    pub fn save_all_data(&mut self) -> Result<(), StorageError> {
        let snapshot = self.to_snapshot();
        self.storage.save(&snapshot)?;
        self.last_save_error = None;
        tracing::info!("Saved snapshot to {}", self.storage.path().display());
        Ok(())
    }

    /// The error from the most recent save that happened as a side effect of
    /// another operation, if it failed.
    pub fn last_save_error(&self) -> Option<&StorageError> {
        self.last_save_error.as_ref()
    }

    fn save_implicitly(&mut self) {
        if let Err(e) = self.save_all_data() {
            tracing::warn!("Failed to save snapshot: {}", e);
            self.last_save_error = Some(e);
        }
    }

    fn to_snapshot(&self) -> Snapshot {
        Snapshot {
            version: SNAPSHOT_VERSION,
            active_user: self.active_user.clone(),
            goals: self.goals.clone(),
            foods: self.foods.clone(),
            custom_foods: self.custom_foods.clone(),
            day_logs: self.day_logs.clone(),
            users_by_email: self.credentials.users().clone(),
            salt_by_email: self.credentials.salts().clone(),
            hash_by_email: self.credentials.hashes().clone(),
        }
    }

    fn apply_snapshot(&mut self, snapshot: Snapshot) {
        self.credentials = CredentialStore::from_parts(
            snapshot.users_by_email,
            snapshot.salt_by_email,
            snapshot.hash_by_email,
        );
        self.active_user = snapshot
            .active_user
            .map(|email| normalize_email(&email))
            .filter(|email| self.credentials.contains(email));
        self.goals = snapshot.goals;
        self.foods = snapshot.foods;
        self.custom_foods = snapshot.custom_foods;
        self.day_logs = snapshot.day_logs;
        for day in &mut self.day_logs {
            day.compute_totals();
        }
        self.day_index = DayLogIndex::rebuild(&self.day_logs);
    }

    // ---- session and accounts ----

    pub fn active_user(&self) -> Option<&User> {
        self.active_user
            .as_deref()
            .and_then(|email| self.credentials.get(email))
    }

    pub fn active_user_id(&self) -> Option<&str> {
        self.active_user.as_deref()
    }

    /// Switches the session. `None` logs out; an unknown email is refused
    /// and leaves the session unchanged.
    pub fn set_active_user(&mut self, email: Option<&str>) -> bool {
        match email {
            None => {
                self.active_user = None;
                true
            }
            Some(email) => {
                let key = normalize_email(email);
                if !self.credentials.contains(&key) {
                    tracing::debug!("Cannot activate unknown user {}", key);
                    return false;
                }
                self.active_user = Some(key);
                true
            }
        }
    }

    pub fn logout(&mut self) {
        self.active_user = None;
    }

    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.credentials.users().values()
    }

    /// Creates an account, makes it active and saves.
    pub fn register_user(&mut self, name: &str, email: &str, password: &str) -> bool {
        match self.credentials.register(name, email, password) {
            Ok(key) => {
                tracing::info!("Registered user {}", key);
                self.active_user = Some(key);
                self.save_implicitly();
                true
            }
            Err(reason) => {
                tracing::debug!("Registration refused: {}", reason);
                false
            }
        }
    }

    /// Checks a password and, on success, makes the account active.
    pub fn authenticate(&mut self, email: &str, password: &str) -> Option<&User> {
        let key = self
            .credentials
            .verify(email, password)
            .map(|user| user.id.clone());

        match key {
            Some(key) => {
                self.active_user = Some(key);
                self.active_user()
            }
            None => {
                tracing::debug!("Authentication failed for {}", normalize_email(email));
                None
            }
        }
    }

    /// Renames an account and moves everything it owns to the new email.
    pub fn update_account_email(&mut self, old_email: &str, new_email: &str) -> bool {
        let (old_key, new_key) = match self.credentials.rename(old_email, new_email) {
            Ok(new_key) => (normalize_email(old_email), new_key),
            Err(reason) => {
                tracing::debug!("Email change refused: {}", reason);
                return false;
            }
        };

        if self.active_user.as_deref() == Some(old_key.as_str()) {
            self.active_user = Some(new_key.clone());
        }
        for custom in self.custom_foods.iter_mut().filter(|c| c.user_id == old_key) {
            custom.user_id = new_key.clone();
        }
        for day in self.day_logs.iter_mut().filter(|d| d.user_id == old_key) {
            day.user_id = new_key.clone();
        }
        self.day_index = DayLogIndex::rebuild(&self.day_logs);

        tracing::info!("Changed account email {} to {}", old_key, new_key);
        self.save_implicitly();
        true
    }

    /// Applies a profile edit to the active user.
    pub fn update_active_profile(&mut self, update: ProfileUpdate) -> bool {
        let Some(email) = self.active_user.clone() else {
            tracing::debug!("Profile update without an active user");
            return false;
        };
        if !update.is_finite() {
            tracing::debug!("Refusing profile update with non-finite height or weight");
            return false;
        }
        match self.credentials.get_mut(&email) {
            Some(user) => {
                update.apply(user);
                true
            }
            None => false,
        }
    }

    // ---- catalog ----

    pub fn foods(&self) -> &[Food] {
        &self.foods
    }

    /// The catalog as the active user sees it: global foods plus the mirrors
    /// of their own custom foods. With nobody logged in, everything.
    pub fn foods_for_active_user(&self) -> Vec<&Food> {
        match self.active_user.as_deref() {
            None => self.foods.iter().collect(),
            Some(user_id) => self
                .foods
                .iter()
                .filter(|food| self.is_visible_to(food, user_id))
                .collect(),
        }
    }

    fn is_visible_to(&self, food: &Food, user_id: &str) -> bool {
        if !food.is_custom_mirror() {
            return true;
        }
        self.custom_foods
            .iter()
            .any(|c| c.user_id == user_id && c.mirror_id() == food.id)
    }

    pub fn food(&self, id: &str) -> Option<&Food> {
        self.foods.iter().find(|f| f.id == id)
    }

    /// Adds a catalog food. Blank, reserved-prefix and duplicate ids are
    /// refused, as are foods with NaN or infinite values.
    pub fn add_food(&mut self, food: Food) -> bool {
        let id = food.id.trim();
        if id.is_empty() || id.starts_with(CUSTOM_FOOD_PREFIX) {
            tracing::debug!("Refusing catalog food with id '{}'", food.id);
            return false;
        }
        if !food.is_finite() {
            tracing::debug!("Refusing catalog food {} with non-finite values", food.id);
            return false;
        }
        if self.food(&food.id).is_some() {
            tracing::debug!("Catalog already has food {}", food.id);
            return false;
        }
        self.foods.push(food);
        true
    }

    // ---- custom foods ----

    pub fn custom_foods(&self) -> &[CustomFood] {
        &self.custom_foods
    }

    pub fn custom_foods_for_active_user(&self) -> Vec<&CustomFood> {
        match self.active_user.as_deref() {
            None => Vec::new(),
            Some(user_id) => self
                .custom_foods
                .iter()
                .filter(|c| c.user_id == user_id)
                .collect(),
        }
    }

    pub fn custom_food(&self, id: &str) -> Option<&CustomFood> {
        self.custom_foods.iter().find(|c| c.id == id)
    }

    /// Builds a custom food for the active user from `(food id, grams)`
    /// pairs, mirrors it into the catalog and saves. Returns the new id.
    ///
    /// Every ingredient must name a food the user can see, and at least one
    /// must have a positive weight. Non-positive weights are skipped, but a
    /// non-finite weight or one that overflows the totals refuses the food.
    pub fn create_custom_food(
        &mut self,
        name: &str,
        description: &str,
        ingredients: &[(String, f64)],
    ) -> Option<String> {
        let user_id = self.active_user.clone()?;
        let name = name.trim();
        if name.is_empty() {
            tracing::debug!("Custom food name is blank");
            return None;
        }

        let mut custom = CustomFood::new(user_id.as_str(), name).with_description(description.trim());
        for (food_id, grams) in ingredients {
            let Some(food) = self
                .food(food_id)
                .filter(|f| self.is_visible_to(f, &user_id))
                .cloned()
            else {
                tracing::debug!("Unknown ingredient {}", food_id);
                return None;
            };
            let skipped = !grams.is_nan() && *grams <= 0.0;
            if !custom.add_ingredient(food, *grams) && !skipped {
                tracing::debug!("Ingredient {} with {} g is out of range", food_id, grams);
                return None;
            }
        }
        if custom.ingredients().is_empty() {
            tracing::debug!("Custom food {} has no usable ingredients", name);
            return None;
        }

        Some(self.insert_custom_food(custom.mirror_food(), custom))
    }

    /// Creates a custom food straight from typed per-serving values.
    ///
    /// The mirror food carries the values and the custom food holds the
    /// mirror as its single 1 g ingredient, so both report the same totals.
    pub fn create_quick_custom_food(
        &mut self,
        name: &str,
        description: &str,
        per_serving: Nutrients,
    ) -> Option<String> {
        let user_id = self.active_user.clone()?;
        let name = name.trim();
        if name.is_empty() {
            tracing::debug!("Custom food name is blank");
            return None;
        }
        let values = [
            per_serving.calories,
            per_serving.protein_g,
            per_serving.carbs_g,
            per_serving.fat_g,
        ];
        if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
            tracing::debug!("Custom food {} has invalid nutrient values", name);
            return None;
        }

        let mut custom = CustomFood::new(user_id.as_str(), name).with_description(description.trim());
        let mirror = Food::new(custom.mirror_id(), name, 1.0)
            .with_brand("Custom")
            .with_category("Custom")
            .with_nutrients(per_serving);
        custom.add_ingredient(mirror.clone(), 1.0);

        Some(self.insert_custom_food(mirror, custom))
    }

    fn insert_custom_food(&mut self, mirror: Food, custom: CustomFood) -> String {
        let id = custom.id.clone();
        self.foods.retain(|f| f.id != mirror.id);
        self.foods.push(mirror);
        tracing::info!("Created custom food {} ({})", custom.name, id);
        self.custom_foods.push(custom);
        self.save_implicitly();
        id
    }

    /// Deletes a custom food, its catalog mirror and every log entry that
    /// references either, for all users. Saves. Returns true if the custom
    /// food or its mirror existed.
    pub fn delete_custom_food_by_id(&mut self, id: &str) -> bool {
        let id = id.trim();
        if id.is_empty() {
            return false;
        }
        let mirror_id = mirror_food_id(id);

        let customs_before = self.custom_foods.len();
        self.custom_foods.retain(|c| c.id != id);
        let removed_custom = self.custom_foods.len() != customs_before;

        let foods_before = self.foods.len();
        self.foods.retain(|f| f.id != mirror_id);
        let removed_mirror = self.foods.len() != foods_before;

        let removed_logs: usize = self
            .day_logs
            .iter_mut()
            .map(|day| day.remove_where(|log| log.food_id == id || log.food_id == mirror_id))
            .sum();

        tracing::info!(
            "Deleted custom food {} (record: {}, mirror: {}, log entries: {})",
            id,
            removed_custom,
            removed_mirror,
            removed_logs
        );
        self.save_implicitly();
        removed_custom || removed_mirror
    }

    // ---- day logs ----

    pub fn day_logs(&self) -> &[DayLog] {
        &self.day_logs
    }

    /// The active user's log for `date`, if one exists.
    pub fn day_log(&self, date: NaiveDate) -> Option<&DayLog> {
        let user_id = self.active_user.as_deref()?;
        let pos = self.day_index.get(user_id, date)?;
        self.day_logs.get(pos)
    }

    /// The active user's log for `date`, created empty if missing. `None`
    /// without an active user.
    pub fn get_or_create_day_log(&mut self, date: NaiveDate) -> Option<&DayLog> {
        let pos = self.day_log_position(date)?;
        self.day_logs.get(pos)
    }

    fn day_log_position(&mut self, date: NaiveDate) -> Option<usize> {
        let user_id = self.active_user.clone()?;
        if let Some(pos) = self.day_index.get(&user_id, date) {
            return Some(pos);
        }
        let pos = self.day_logs.len();
        self.day_logs.push(DayLog::new(user_id.as_str(), date));
        self.day_index.insert(&user_id, date, pos);
        Some(pos)
    }

    /// Appends `log` to the active user's day. Totals are current on return.
    ///
    /// Refused when the entry's nutrients, or the day totals with it, are not
    /// finite.
    pub fn add_food_log(&mut self, date: NaiveDate, log: FoodLog) -> bool {
        if !log.nutrients().is_finite() || !log.servings.is_finite() {
            tracing::debug!("Refusing log entry {} with non-finite values", log.id);
            return false;
        }
        let Some(pos) = self.day_log_position(date) else {
            tracing::debug!("Cannot log food without an active user");
            return false;
        };
        match self.day_logs.get_mut(pos) {
            Some(day) => {
                let projected = day.entries().iter().map(FoodLog::nutrients).sum::<Nutrients>()
                    + log.nutrients();
                if !projected.is_finite() {
                    tracing::debug!("Day {} totals would overflow", date);
                    return false;
                }
                day.add_food_log(log);
                true
            }
            None => false,
        }
    }

    /// Removes one entry from the active user's day.
    pub fn remove_food_log(&mut self, date: NaiveDate, log_id: Uuid) -> bool {
        let Some(user_id) = self.active_user.as_deref() else {
            return false;
        };
        let Some(pos) = self.day_index.get(user_id, date) else {
            return false;
        };
        self.day_logs
            .get_mut(pos)
            .and_then(|day| day.remove_food_log(log_id))
            .is_some()
    }

    /// Resolves `food_id` against the active user's custom foods, then the
    /// visible catalog, builds the entry and appends it to `date`.
    ///
    /// Servings must be positive and finite, and the entry's nutrients must
    /// not overflow.
    pub fn log_food(
        &mut self,
        date: NaiveDate,
        food_id: &str,
        meal_type: MealType,
        servings: f64,
        timestamp: NaiveDateTime,
        notes: &str,
    ) -> Option<FoodLog> {
        let user_id = self.active_user.clone()?;
        if !servings.is_finite() || servings <= 0.0 {
            tracing::debug!("Refusing to log {} servings", servings);
            return None;
        }

        let log = if let Some(custom) = self
            .custom_foods
            .iter()
            .find(|c| c.id == food_id && c.user_id == user_id)
        {
            FoodLog::from_custom_food(custom, meal_type, servings, timestamp, notes)
        } else if let Some(food) = self
            .food(food_id)
            .filter(|f| self.is_visible_to(f, &user_id))
        {
            FoodLog::from_food(food, meal_type, servings, timestamp, notes)
        } else {
            tracing::debug!("No food {} visible to {}", food_id, user_id);
            return None;
        };

        if self.add_food_log(date, log.clone()) {
            Some(log)
        } else {
            None
        }
    }

    /// Display name for a catalog or custom food id.
    pub fn resolve_food_name(&self, id: &str) -> Option<&str> {
        self.foods
            .iter()
            .find(|f| f.id == id)
            .map(|f| f.name.as_str())
            .or_else(|| self.custom_food(id).map(|c| c.name.as_str()))
    }

    // ---- goals ----

    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    pub fn replace_goals(&mut self, goals: Vec<Goal>) {
        self.goals = goals;
    }

    /// The first goal whose range includes today.
    pub fn active_goal(&self) -> Option<&Goal> {
        self.active_goal_on(Local::now().date_naive())
    }

    pub fn active_goal_on(&self, date: NaiveDate) -> Option<&Goal> {
        self.goals.iter().find(|g| g.is_active(date))
    }

    // ---- reports ----

    /// The active user's seven days ending on `end`.
    pub fn weekly_summary(&self, end: NaiveDate) -> Option<WeeklySummary> {
        self.active_user.as_ref()?;
        Some(WeeklySummary::collect(end, |date| {
            self.day_log(date).map(DayLog::totals)
        }))
    }

    /// The active user's intake on `date` against the goal active that day.
    pub fn goal_progress(&self, date: NaiveDate) -> Option<GoalProgress> {
        self.active_user.as_ref()?;
        let goal = self.active_goal_on(date)?;
        let consumed = self.day_log(date).map(DayLog::totals).unwrap_or_default();
        Some(GoalProgress::new(date, goal, consumed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, day).unwrap()
    }

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        d(day).and_hms_opt(hour, 0, 0).unwrap()
    }

    fn test_manager() -> (DataManager, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let (manager, outcome) = DataManager::open(temp_dir.path().to_path_buf());
        assert_eq!(outcome, LoadOutcome::Fresh);
        (manager, temp_dir)
    }

    fn logged_in() -> (DataManager, TempDir) {
        let (mut manager, temp) = test_manager();
        assert!(manager.register_user("Ann", "a@x.com", "pw"));
        (manager, temp)
    }

    #[test]
    fn test_fresh_manager_is_seeded() {
        let (manager, _temp) = test_manager();
        assert_eq!(manager.foods().len(), 3);
        assert!(manager.active_user().is_none());
        assert!(manager.goals().is_empty());
    }

    #[test]
    fn test_register_activates_and_saves() {
        let (manager, _temp) = logged_in();
        assert_eq!(manager.active_user_id(), Some("a@x.com"));
        assert_eq!(manager.active_user().unwrap().name, "Ann");
        assert!(manager.snapshot_path().exists());
        assert!(manager.last_save_error().is_none());
    }

    #[test]
    fn test_register_duplicate_refused() {
        let (mut manager, _temp) = logged_in();
        assert!(!manager.register_user("Other", " A@X.COM ", "pw"));
        assert!(!manager.register_user("Blank", "b@x.com", "  "));
        assert_eq!(manager.users().count(), 1);
    }

    #[test]
    fn test_set_active_user() {
        let (mut manager, _temp) = logged_in();
        assert!(!manager.set_active_user(Some("nobody@x.com")));
        assert_eq!(manager.active_user_id(), Some("a@x.com"));

        assert!(manager.set_active_user(None));
        assert!(manager.active_user().is_none());

        assert!(manager.set_active_user(Some("A@x.com")));
        assert_eq!(manager.active_user_id(), Some("a@x.com"));

        manager.logout();
        assert!(manager.active_user_id().is_none());
    }

    #[test]
    fn test_authenticate_sets_session() {
        let (mut manager, _temp) = logged_in();
        manager.logout();

        assert!(manager.authenticate("a@x.com", "wrong").is_none());
        assert!(manager.active_user().is_none());

        let user = manager.authenticate("A@X.com", "pw").unwrap();
        assert_eq!(user.id, "a@x.com");
        assert_eq!(manager.active_user_id(), Some("a@x.com"));
    }

    #[test]
    fn test_update_active_profile() {
        let (mut manager, _temp) = test_manager();
        assert!(!manager.update_active_profile(ProfileUpdate::default()));

        manager.register_user("Ann", "a@x.com", "pw");
        let update = ProfileUpdate {
            age: Some(30),
            weight_lb: Some(150.0),
            ..ProfileUpdate::default()
        };
        assert!(manager.update_active_profile(update));
        assert_eq!(manager.active_user().unwrap().age, 30);
    }

    #[test]
    fn test_add_food_rules() {
        let (mut manager, _temp) = test_manager();
        assert!(manager.add_food(Food::new("oats", "Oats", 40.0)));
        assert!(!manager.add_food(Food::new("oats", "Oats again", 40.0)));
        assert!(!manager.add_food(Food::new("  ", "Blank", 40.0)));
        assert!(!manager.add_food(Food::new("cf_item_x", "Sneaky", 1.0)));
        assert_eq!(manager.foods().len(), 4);
    }

    #[test]
    fn test_custom_food_visibility() {
        let (mut manager, _temp) = logged_in();
        let ann_food = manager
            .create_custom_food("Bowl", "", &[("f1".to_string(), 100.0)])
            .unwrap();

        manager.register_user("Bob", "b@x.com", "pw");
        let bob_ids: Vec<&str> = manager
            .foods_for_active_user()
            .into_iter()
            .map(|f| f.id.as_str())
            .collect();
        assert_eq!(bob_ids, vec!["f1", "f2", "f3"]);
        assert!(manager.custom_foods_for_active_user().is_empty());

        manager.set_active_user(Some("a@x.com"));
        assert_eq!(manager.foods_for_active_user().len(), 4);
        assert_eq!(manager.custom_foods_for_active_user()[0].id, ann_food);

        manager.logout();
        assert_eq!(manager.foods_for_active_user().len(), 4);
    }

    #[test]
    fn test_create_custom_food_validation() {
        let (mut manager, _temp) = test_manager();
        assert!(manager
            .create_custom_food("Bowl", "", &[("f1".to_string(), 100.0)])
            .is_none());

        manager.register_user("Ann", "a@x.com", "pw");
        assert!(manager
            .create_custom_food("  ", "", &[("f1".to_string(), 100.0)])
            .is_none());
        assert!(manager
            .create_custom_food("Bowl", "", &[("nope".to_string(), 100.0)])
            .is_none());
        assert!(manager
            .create_custom_food("Bowl", "", &[("f1".to_string(), 0.0)])
            .is_none());
        assert!(manager.custom_foods().is_empty());
    }

    #[test]
    fn test_create_custom_food_mirrors_totals() {
        let (mut manager, _temp) = logged_in();
        let id = manager
            .create_custom_food(
                "Plate",
                "dinner",
                &[("f1".to_string(), 2.0), ("f2".to_string(), 1.0)],
            )
            .unwrap();

        let mirror = manager.food(&mirror_food_id(&id)).unwrap();
        assert_eq!(mirror.calories, 165.0 * 2.0 + 218.0);
        assert_eq!(mirror.brand, "Custom");
        assert_eq!(manager.resolve_food_name(&id), Some("Plate"));
    }

    #[test]
    fn test_quick_custom_food() {
        let (mut manager, _temp) = logged_in();
        let per_serving = Nutrients::new(320.0, 20.0, 30.0, 10.0);
        let id = manager
            .create_quick_custom_food("Protein Bar", "", per_serving)
            .unwrap();

        let custom = manager.custom_food(&id).unwrap();
        assert_eq!(custom.ingredients().len(), 1);
        assert_eq!(custom.ingredients()[0].grams, 1.0);
        assert_eq!(custom.total_nutrients(), per_serving);
        assert_eq!(
            manager.food(&mirror_food_id(&id)).unwrap().per_serving(),
            per_serving
        );

        assert!(manager
            .create_quick_custom_food("Bad", "", Nutrients::new(-1.0, 0.0, 0.0, 0.0))
            .is_none());
    }

    #[test]
    fn test_day_log_requires_active_user() {
        let (mut manager, _temp) = test_manager();
        assert!(manager.get_or_create_day_log(d(1)).is_none());
        let log = FoodLog::from_food(&manager.foods()[0].clone(), MealType::Lunch, 1.0, at(1, 12), "");
        assert!(!manager.add_food_log(d(1), log));
        assert!(manager.day_logs().is_empty());
    }

    #[test]
    fn test_get_or_create_day_log_is_unique() {
        let (mut manager, _temp) = logged_in();
        let first = manager.get_or_create_day_log(d(1)).unwrap().id;
        let second = manager.get_or_create_day_log(d(1)).unwrap().id;
        assert_eq!(first, second);
        assert_eq!(manager.day_logs().len(), 1);
        assert!(manager.day_log(d(2)).is_none());
    }

    #[test]
    fn test_log_food_and_remove() {
        let (mut manager, _temp) = logged_in();
        let log = manager
            .log_food(d(3), "f2", MealType::Dinner, 2.0, at(3, 19), "")
            .unwrap();
        assert_eq!(manager.day_log(d(3)).unwrap().totals().calories, 436);

        assert!(manager
            .log_food(d(3), "f2", MealType::Dinner, 0.0, at(3, 19), "")
            .is_none());
        assert!(manager
            .log_food(d(3), "missing", MealType::Dinner, 1.0, at(3, 19), "")
            .is_none());

        assert!(manager.remove_food_log(d(3), log.id));
        assert!(!manager.remove_food_log(d(3), log.id));
        assert_eq!(manager.day_log(d(3)).unwrap().totals().calories, 0);
    }

    #[test]
    fn test_log_food_by_custom_id() {
        let (mut manager, _temp) = logged_in();
        let id = manager
            .create_quick_custom_food("Shake", "", Nutrients::new(250.0, 30.0, 10.0, 5.0))
            .unwrap();

        let log = manager
            .log_food(d(4), &id, MealType::Snack, 2.0, at(4, 15), "post-run")
            .unwrap();
        assert_eq!(log.food_id, id);
        assert_eq!(log.calories(), 500.0);

        manager.register_user("Bob", "b@x.com", "pw");
        assert!(manager
            .log_food(d(4), &id, MealType::Snack, 1.0, at(4, 15), "")
            .is_none());
    }

    #[test]
    fn test_delete_custom_food_cascades() {
        let (mut manager, _temp) = logged_in();
        let id = manager
            .create_custom_food("Bowl", "", &[("f3".to_string(), 1.0)])
            .unwrap();
        let mirror = mirror_food_id(&id);

        manager.log_food(d(5), &id, MealType::Lunch, 1.0, at(5, 12), "");
        manager.log_food(d(5), &mirror, MealType::Dinner, 1.0, at(5, 18), "");
        manager.log_food(d(5), "f1", MealType::Dinner, 1.0, at(5, 18), "");
        manager.log_food(d(6), &id, MealType::Lunch, 1.0, at(6, 12), "");

        assert!(manager.delete_custom_food_by_id(&id));
        assert!(manager.custom_food(&id).is_none());
        assert!(manager.food(&mirror).is_none());
        assert_eq!(manager.day_log(d(5)).unwrap().entries().len(), 1);
        assert_eq!(manager.day_log(d(5)).unwrap().totals().calories, 165);
        assert!(manager.day_log(d(6)).unwrap().is_empty());

        assert!(!manager.delete_custom_food_by_id(&id));
        assert!(!manager.delete_custom_food_by_id("  "));
    }

    #[test]
    fn test_update_account_email_migrates_ownership() {
        let (mut manager, _temp) = logged_in();
        let id = manager
            .create_custom_food("Bowl", "", &[("f1".to_string(), 1.0)])
            .unwrap();
        manager.log_food(d(7), "f1", MealType::Lunch, 1.0, at(7, 12), "");

        manager.register_user("Bob", "b@x.com", "pw");
        assert!(!manager.update_account_email("a@x.com", "b@x.com"));
        assert!(!manager.update_account_email("a@x.com", ""));

        assert!(manager.update_account_email("a@x.com", "ann@new.com"));
        assert_eq!(manager.active_user_id(), Some("b@x.com"));
        assert_eq!(manager.custom_food(&id).unwrap().user_id, "ann@new.com");

        manager.set_active_user(Some("ann@new.com"));
        assert_eq!(manager.day_log(d(7)).unwrap().totals().calories, 165);
        assert!(manager.authenticate("ann@new.com", "pw").is_some());
        assert!(manager.authenticate("a@x.com", "pw").is_none());
    }

    #[test]
    fn test_active_session_follows_rename() {
        let (mut manager, _temp) = logged_in();
        assert!(manager.update_account_email("a@x.com", "ann@new.com"));
        assert_eq!(manager.active_user_id(), Some("ann@new.com"));
        assert_eq!(manager.active_user().unwrap().id, "ann@new.com");
    }

    #[test]
    fn test_goals() {
        let (mut manager, _temp) = logged_in();
        assert!(manager.active_goal_on(d(1)).is_none());
        assert!(manager.goal_progress(d(1)).is_none());

        let april = Goal::new(1800, 120.0, 180.0, 60.0, d(1), d(30));
        manager.replace_goals(vec![april.clone()]);
        assert_eq!(manager.active_goal_on(d(30)), Some(&april));

        manager.log_food(d(2), "f1", MealType::Lunch, 2.0, at(2, 12), "");
        let progress = manager.goal_progress(d(2)).unwrap();
        assert_eq!(progress.consumed.calories, 330);
        assert_eq!(progress.remaining_calories, 1470);
    }

    #[test]
    fn test_weekly_summary() {
        let (mut manager, _temp) = test_manager();
        assert!(manager.weekly_summary(d(7)).is_none());

        manager.register_user("Ann", "a@x.com", "pw");
        manager.log_food(d(1), "f3", MealType::Lunch, 1.0, at(1, 12), "");
        manager.log_food(d(7), "f3", MealType::Lunch, 1.0, at(7, 12), "");
        manager.get_or_create_day_log(d(4));

        let summary = manager.weekly_summary(d(7)).unwrap();
        assert_eq!(summary.logged_days(), 3);
        assert_eq!(summary.avg_calories, 110.0 / 7.0);
    }

    #[test]
    fn test_implicit_save_failure_is_recorded() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("not-a-dir");
        fs::write(&blocker, b"file").unwrap();

        let mut manager = DataManager::new(blocker.join("data"));
        assert!(manager.register_user("Ann", "a@x.com", "pw"));
        assert!(manager.last_save_error().is_some());
        assert!(manager.save_all_data().is_err());
    }
}
