use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::food::Food;
use super::nutrients::Nutrients;

/// Id prefix of the catalog entry that mirrors a custom food.
pub const CUSTOM_FOOD_PREFIX: &str = "cf_item_";

/// Builds the catalog id of a custom food's mirror.
pub fn mirror_food_id(custom_food_id: &str) -> String {
    format!("{}{}", CUSTOM_FOOD_PREFIX, custom_food_id)
}

/// One component of a custom food: a catalog food and its weight in grams.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ingredient {
    pub food: Food,
    pub grams: f64,
}

impl Ingredient {
    pub fn new(food: Food, grams: f64) -> Self {
        Self { food, grams }
    }

    pub fn nutrients(&self) -> Nutrients {
        self.food.nutrients_for_grams(self.grams)
    }
}

impl fmt::Display for Ingredient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} g {}", self.grams, self.food.name)
    }
}

/// A user-authored composite of catalog foods.
///
/// Ingredients are keyed by food id: adding the same food twice sums the
/// grams into one entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomFood {
    pub id: String,
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    ingredients: Vec<Ingredient>,
}

impl CustomFood {
    pub fn new(user_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), user_id, name)
    }

    pub fn with_id(
        id: impl Into<String>,
        user_id: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            user_id: user_id.into(),
            name: name.into(),
            description: String::new(),
            ingredients: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn ingredients(&self) -> &[Ingredient] {
        &self.ingredients
    }

    /// Adds `grams` of `food`, merging into an existing entry for the same
    /// food id. Returns `false` and leaves the food unchanged when the weight
    /// is not a positive finite number, the food has non-finite values, or
    /// the resulting totals would overflow.
    pub fn add_ingredient(&mut self, food: Food, grams: f64) -> bool {
        if !grams.is_finite() || grams <= 0.0 || !food.is_finite() {
            return false;
        }

        let previous = self.ingredients.clone();
        match self
            .ingredients
            .iter_mut()
            .find(|i| i.food.id == food.id)
        {
            Some(existing) => {
                existing.grams += grams;
                existing.food = food;
            }
            None => self.ingredients.push(Ingredient::new(food, grams)),
        }

        let in_range = self.ingredients.iter().all(|i| i.grams.is_finite())
            && self.total_nutrients().is_finite();
        if !in_range {
            self.ingredients = previous;
        }
        in_range
    }

    /// Removes the ingredient for `food_id`. Returns true if one was removed.
    pub fn remove_ingredient(&mut self, food_id: &str) -> bool {
        let len_before = self.ingredients.len();
        self.ingredients.retain(|i| i.food.id != food_id);
        self.ingredients.len() != len_before
    }

    /// Sum of every ingredient's gram-scaled contribution.
    pub fn total_nutrients(&self) -> Nutrients {
        self.ingredients.iter().map(Ingredient::nutrients).sum()
    }

    pub fn total_calories(&self) -> f64 {
        self.total_nutrients().calories
    }

    pub fn mirror_id(&self) -> String {
        mirror_food_id(&self.id)
    }

    /// The single-serving catalog entry representing this custom food.
    pub fn mirror_food(&self) -> Food {
        Food::new(self.mirror_id(), self.name.clone(), 1.0)
            .with_brand("Custom")
            .with_category("Custom")
            .with_nutrients(self.total_nutrients())
    }
}

impl PartialEq for CustomFood {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl fmt::Display for CustomFood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.name)?;
        writeln!(f, "{}", "=".repeat(self.name.len()))?;

        if !self.description.is_empty() {
            writeln!(f, "{}", self.description)?;
        }

        if !self.ingredients.is_empty() {
            writeln!(f, "\nIngredients:")?;
            for ingredient in &self.ingredients {
                writeln!(f, "  - {}", ingredient)?;
            }
        }

        write!(f, "\nTotal: {}", self.total_nutrients())
    }
}
