use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::custom_food::CustomFood;
use super::food::Food;
use super::meal_type::MealType;
use super::nutrients::Nutrients;
use crate::nutrition;

/// One consumption event.
///
/// The nutrient totals are computed when the log is created and never
/// change afterwards: editing or deleting the referenced food does not
/// rewrite history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodLog {
    pub id: Uuid,
    /// Id of a catalog food or a custom food.
    pub food_id: String,
    pub meal_type: MealType,
    pub servings: f64,
    pub timestamp: NaiveDateTime,
    #[serde(default)]
    pub notes: String,
    nutrients: Nutrients,
}

impl FoodLog {
    fn new(
        food_id: impl Into<String>,
        meal_type: MealType,
        servings: f64,
        timestamp: NaiveDateTime,
        notes: impl Into<String>,
        nutrients: Nutrients,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            food_id: food_id.into(),
            meal_type,
            servings,
            timestamp,
            notes: notes.into(),
            nutrients,
        }
    }

    /// Logs `servings` of a catalog food.
    pub fn from_food(
        food: &Food,
        meal_type: MealType,
        servings: f64,
        timestamp: NaiveDateTime,
        notes: impl Into<String>,
    ) -> Self {
        let nutrients = food.nutrients_for_servings(servings);
        Self::new(&food.id, meal_type, servings, timestamp, notes, nutrients)
    }

    /// Logs `servings` of a custom food, one serving being the whole
    /// composite.
    pub fn from_custom_food(
        custom_food: &CustomFood,
        meal_type: MealType,
        servings: f64,
        timestamp: NaiveDateTime,
        notes: impl Into<String>,
    ) -> Self {
        let nutrients = nutrition::scale_servings(&custom_food.total_nutrients(), servings);
        Self::new(
            &custom_food.id,
            meal_type,
            servings,
            timestamp,
            notes,
            nutrients,
        )
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    /// The totals frozen at creation.
    pub fn nutrients(&self) -> Nutrients {
        self.nutrients
    }

    pub fn calories(&self) -> f64 {
        self.nutrients.calories
    }

    /// Time of day as "h:mm AM".
    pub fn formatted_time(&self) -> String {
        self.timestamp.format("%-I:%M %p").to_string()
    }
}

impl fmt::Display for FoodLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}  {}  {:.0} kcal",
            self.meal_type.to_string().to_uppercase(),
            self.formatted_time(),
            self.nutrients.calories
        )
    }
}
