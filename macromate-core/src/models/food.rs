use serde::{Deserialize, Serialize};
use std::fmt;

use super::custom_food::CUSTOM_FOOD_PREFIX;
use super::nutrients::Nutrients;
use crate::nutrition;

/// A catalog entry with a per-serving nutrient profile.
///
/// `serving_size` is in grams. Foods with a non-positive serving size can
/// still be logged by servings, but every gram-based query returns zero.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Food {
    pub id: String,
    pub name: String,
    pub brand: String,
    pub category: String,
    pub serving_size: f64,
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
}

impl Food {
    pub fn new(id: impl Into<String>, name: impl Into<String>, serving_size: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            brand: String::new(),
            category: String::new(),
            serving_size,
            calories: 0.0,
            protein_g: 0.0,
            carbs_g: 0.0,
            fat_g: 0.0,
        }
    }

    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = brand.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_nutrients(mut self, per_serving: Nutrients) -> Self {
        self.calories = per_serving.calories;
        self.protein_g = per_serving.protein_g;
        self.carbs_g = per_serving.carbs_g;
        self.fat_g = per_serving.fat_g;
        self
    }

    /// The per-serving profile.
    pub fn per_serving(&self) -> Nutrients {
        Nutrients::new(self.calories, self.protein_g, self.carbs_g, self.fat_g)
    }

    /// True when the serving size and every per-serving value is finite.
    pub fn is_finite(&self) -> bool {
        self.serving_size.is_finite() && self.per_serving().is_finite()
    }

    /// True for the synthetic catalog entries that mirror a custom food.
    pub fn is_custom_mirror(&self) -> bool {
        self.id.starts_with(CUSTOM_FOOD_PREFIX)
    }

    pub fn calories_for_servings(&self, servings: f64) -> f64 {
        self.nutrients_for_servings(servings).calories
    }

    pub fn nutrients_for_servings(&self, servings: f64) -> Nutrients {
        nutrition::scale_servings(&self.per_serving(), servings)
    }

    pub fn grams_to_servings(&self, grams: f64) -> f64 {
        nutrition::grams_to_servings(grams, self.serving_size)
    }

    pub fn calories_for_grams(&self, grams: f64) -> f64 {
        self.nutrients_for_grams(grams).calories
    }

    pub fn nutrients_for_grams(&self, grams: f64) -> Nutrients {
        nutrition::scale_grams(&self.per_serving(), self.serving_size, grams)
    }
}

impl fmt::Display for Food {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.name.trim();
        let name = if name.is_empty() { "Food" } else { name };
        write!(f, "{} ({} kcal/serving)", name, self.calories.round() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rice() -> Food {
        Food::new("f2", "Brown Rice", 100.0)
            .with_brand("Generic")
            .with_category("Carb")
            .with_nutrients(Nutrients::new(200.0, 4.0, 40.0, 2.0))
    }

    #[test]
    fn test_calories_for_servings() {
        let food = rice();
        assert_eq!(food.calories_for_servings(2.0), 400.0);
        assert_eq!(food.calories_for_servings(0.0), 0.0);
        assert_eq!(food.calories_for_servings(-1.0), 0.0);
    }

    #[test]
    fn test_is_finite() {
        assert!(rice().is_finite());
        assert!(!rice().with_nutrients(Nutrients::new(f64::NAN, 0.0, 0.0, 0.0)).is_finite());
        assert!(!Food::new("x", "X", f64::INFINITY).is_finite());
    }

    #[test]
    fn test_nutrients_for_servings_macros() {
        let n = rice().nutrients_for_servings(0.5);
        assert_eq!(n, Nutrients::new(100.0, 2.0, 20.0, 1.0));
    }

    #[test]
    fn test_grams_conversion() {
        let food = rice();
        assert_eq!(food.grams_to_servings(150.0), 1.5);
        assert_eq!(food.calories_for_grams(150.0), 300.0);
        assert_eq!(food.nutrients_for_grams(50.0).carbs_g, 20.0);
    }

    #[test]
    fn test_zero_serving_size_degrades_to_zero() {
        let mut food = rice();
        food.serving_size = 0.0;
        assert_eq!(food.grams_to_servings(150.0), 0.0);
        assert_eq!(food.nutrients_for_grams(150.0), Nutrients::ZERO);
        // servings-based queries are unaffected
        assert_eq!(food.calories_for_servings(1.0), 200.0);
    }

    #[test]
    fn test_custom_mirror_detection() {
        assert!(!rice().is_custom_mirror());
        assert!(Food::new("cf_item_abc", "Mine", 1.0).is_custom_mirror());
    }

    #[test]
    fn test_food_display() {
        assert_eq!(format!("{}", rice()), "Brown Rice (200 kcal/serving)");
        let blank = Food::new("x", "  ", 1.0).with_nutrients(Nutrients::new(54.6, 0.0, 0.0, 0.0));
        assert_eq!(format!("{}", blank), "Food (55 kcal/serving)");
    }
}
