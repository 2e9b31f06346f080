use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

use super::food_log::FoodLog;
use super::meal_type::MealType;
use super::nutrients::Nutrients;

/// Cached totals of a day. Calories are rounded to a whole number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DayTotals {
    pub calories: i64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
}

impl DayTotals {
    pub fn from_nutrients(sum: Nutrients) -> Self {
        Self {
            calories: sum.calories.round() as i64,
            protein_g: sum.protein_g,
            carbs_g: sum.carbs_g,
            fat_g: sum.fat_g,
        }
    }
}

impl fmt::Display for DayTotals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Calories: {} | Protein: {:.0}g | Carbs: {:.0}g | Fat: {:.0}g",
            self.calories, self.protein_g, self.carbs_g, self.fat_g
        )
    }
}

/// One user's food entries for one calendar date.
///
/// Entries are only reachable through methods that recompute the totals, so
/// `totals()` always reflects the current entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayLog {
    pub id: Uuid,
    pub user_id: String,
    pub date: NaiveDate,
    #[serde(default)]
    entries: Vec<FoodLog>,
    #[serde(default)]
    totals: DayTotals,
}

impl DayLog {
    pub fn new(user_id: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            date,
            entries: Vec::new(),
            totals: DayTotals::default(),
        }
    }

    pub fn entries(&self) -> &[FoodLog] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn totals(&self) -> DayTotals {
        self.totals
    }

    pub fn add_food_log(&mut self, log: FoodLog) {
        self.entries.push(log);
        self.compute_totals();
    }

    /// Removes the entry with `id`, returning it if present.
    pub fn remove_food_log(&mut self, id: Uuid) -> Option<FoodLog> {
        let pos = self.entries.iter().position(|e| e.id == id)?;
        let removed = self.entries.remove(pos);
        self.compute_totals();
        Some(removed)
    }

    /// Drops every entry matching `predicate`. Returns how many were removed.
    pub fn remove_where<F>(&mut self, mut predicate: F) -> usize
    where
        F: FnMut(&FoodLog) -> bool,
    {
        let len_before = self.entries.len();
        self.entries.retain(|e| !predicate(e));
        let removed = len_before - self.entries.len();
        if removed > 0 {
            self.compute_totals();
        }
        removed
    }

    /// Recomputes the cached totals from the entries.
    pub fn compute_totals(&mut self) {
        let sum: Nutrients = self.entries.iter().map(FoodLog::nutrients).sum();
        self.totals = DayTotals::from_nutrients(sum);
    }

    /// Summed nutrients per meal type. Every meal type is present.
    pub fn totals_by_meal(&self) -> BTreeMap<MealType, Nutrients> {
        let mut by_meal: BTreeMap<MealType, Nutrients> =
            MealType::ALL.iter().map(|m| (*m, Nutrients::ZERO)).collect();

        for entry in &self.entries {
            *by_meal.entry(entry.meal_type).or_default() += entry.nutrients();
        }

        by_meal
    }

    /// Entries of one meal, in logging order.
    pub fn entries_for_meal(&self, meal_type: MealType) -> impl Iterator<Item = &FoodLog> {
        self.entries.iter().filter(move |e| e.meal_type == meal_type)
    }
}

impl fmt::Display for DayLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.date)?;
        writeln!(f, "{}", "-".repeat(60))?;
        for entry in &self.entries {
            writeln!(f, "  {}", entry)?;
        }
        write!(f, "  Daily Total: {}", self.totals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Food;
    use chrono::NaiveDateTime;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
    }

    fn at(hour: u32) -> NaiveDateTime {
        date().and_hms_opt(hour, 0, 0).unwrap()
    }

    fn food(calories: f64) -> Food {
        Food::new("f", "Food", 1.0).with_nutrients(Nutrients::new(calories, 1.5, 2.25, 0.5))
    }

    #[test]
    fn test_totals_track_add_and_remove() {
        let mut day = DayLog::new("a@x.com", date());
        let first = FoodLog::from_food(&food(100.4), MealType::Breakfast, 1.0, at(8), "");
        let second = FoodLog::from_food(&food(50.3), MealType::Lunch, 2.0, at(12), "");
        let second_id = second.id;

        day.add_food_log(first);
        day.add_food_log(second);
        assert_eq!(day.totals().calories, 201);
        assert_eq!(day.totals().protein_g, 4.5);

        assert!(day.remove_food_log(second_id).is_some());
        assert_eq!(day.totals().calories, 100);
        assert_eq!(day.totals().carbs_g, 2.25);

        assert!(day.remove_food_log(second_id).is_none());
    }

    #[test]
    fn test_calories_rounded_after_summing() {
        let mut day = DayLog::new("a@x.com", date());
        day.add_food_log(FoodLog::from_food(&food(0.4), MealType::Snack, 1.0, at(9), ""));
        day.add_food_log(FoodLog::from_food(&food(0.4), MealType::Snack, 1.0, at(10), ""));
        // 0.8 rounds to 1, not 0 + 0
        assert_eq!(day.totals().calories, 1);
    }

    #[test]
    fn test_remove_where() {
        let mut day = DayLog::new("a@x.com", date());
        day.add_food_log(FoodLog::from_food(&food(100.0), MealType::Dinner, 1.0, at(19), ""));
        day.add_food_log(FoodLog::from_food(&food(200.0), MealType::Snack, 1.0, at(21), ""));

        let removed = day.remove_where(|e| e.meal_type == MealType::Snack);
        assert_eq!(removed, 1);
        assert_eq!(day.totals().calories, 100);
        assert_eq!(day.remove_where(|_| false), 0);
    }

    #[test]
    fn test_totals_by_meal() {
        let mut day = DayLog::new("a@x.com", date());
        day.add_food_log(FoodLog::from_food(&food(100.0), MealType::Lunch, 1.0, at(12), ""));
        day.add_food_log(FoodLog::from_food(&food(50.0), MealType::Lunch, 1.0, at(13), ""));

        let by_meal = day.totals_by_meal();
        assert_eq!(by_meal.len(), 4);
        assert_eq!(by_meal[&MealType::Lunch].calories, 150.0);
        assert_eq!(by_meal[&MealType::Dinner], Nutrients::ZERO);
        assert_eq!(day.entries_for_meal(MealType::Lunch).count(), 2);
    }

    #[test]
    fn test_empty_day_has_zero_totals() {
        let day = DayLog::new("a@x.com", date());
        assert!(day.is_empty());
        assert_eq!(day.totals(), DayTotals::default());
    }
}
