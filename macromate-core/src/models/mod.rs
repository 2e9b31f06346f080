mod custom_food;
mod day_log;
mod food;
mod food_log;
mod goal;
mod meal_type;
mod nutrients;
mod user;

pub use custom_food::{mirror_food_id, CustomFood, Ingredient, CUSTOM_FOOD_PREFIX};
pub use day_log::{DayLog, DayTotals};
pub use food::Food;
pub use food_log::FoodLog;
pub use goal::{Goal, ValidationError, DEFAULT_GOAL_DAYS};
pub use meal_type::MealType;
pub use nutrients::Nutrients;
pub use user::{ActivityLevel, ProfileUpdate, Sex, User};
