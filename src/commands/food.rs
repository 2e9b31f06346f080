use clap::{Args, Subcommand};
use macromate_core::{DataManager, Food, Nutrients};
use uuid::Uuid;

use super::OutputFormat;

#[derive(Args)]
pub struct FoodCommand {
    #[command(subcommand)]
    pub command: FoodSubcommand,
}

#[derive(Subcommand)]
pub enum FoodSubcommand {
    /// List the foods visible to the logged-in account
    List {
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Add a food to the shared catalog
    Add {
        #[arg(long, short)]
        name: String,

        /// Catalog id (generated if omitted)
        #[arg(long)]
        id: Option<String>,

        #[arg(long, default_value = "")]
        brand: String,

        #[arg(long, default_value = "")]
        category: String,

        /// Serving size in grams
        #[arg(long, short)]
        serving_size: f64,

        /// Calories per serving
        #[arg(long)]
        calories: f64,

        /// Protein per serving (g)
        #[arg(long, default_value = "0")]
        protein: f64,

        /// Carbs per serving (g)
        #[arg(long, default_value = "0")]
        carbs: f64,

        /// Fat per serving (g)
        #[arg(long, default_value = "0")]
        fat: f64,
    },
}

impl FoodCommand {
    pub fn run(&self, manager: &mut DataManager) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            FoodSubcommand::List { format } => {
                let foods = manager.foods_for_active_user();
                match format {
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&foods)?),
                    OutputFormat::Text => {
                        if foods.is_empty() {
                            println!("No foods found.");
                            return Ok(());
                        }
                        println!("{:<38} {:<30} {:<12} {:>8}", "ID", "NAME", "CATEGORY", "SERVING");
                        println!("{}", "-".repeat(92));
                        for food in &foods {
                            println!(
                                "{:<38} {:<30} {:<12} {:>7}g",
                                food.id,
                                food.to_string(),
                                food.category,
                                food.serving_size
                            );
                        }
                        println!("\nTotal: {} food(s)", foods.len());
                    }
                }
                Ok(())
            }

            FoodSubcommand::Add {
                name,
                id,
                brand,
                category,
                serving_size,
                calories,
                protein,
                carbs,
                fat,
            } => {
                if name.trim().is_empty() {
                    return Err("Food name must not be blank".into());
                }
                let id = id.clone().unwrap_or_else(|| Uuid::new_v4().to_string());
                let food = Food::new(id.trim(), name.trim(), *serving_size)
                    .with_brand(brand.trim())
                    .with_category(category.trim())
                    .with_nutrients(Nutrients::new(*calories, *protein, *carbs, *fat));

                if !food.is_finite() {
                    return Err("Serving size and nutrient values must be finite numbers".into());
                }
                if !manager.add_food(food.clone()) {
                    return Err(format!("Cannot add food with id '{}'", food.id).into());
                }
                manager.save_all_data()?;
                println!("Added {} [{}]", food, food.id);
                Ok(())
            }
        }
    }
}
