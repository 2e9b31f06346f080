use clap::{Args, Subcommand};
use macromate_core::nutrition::parse_positive;
use macromate_core::{mirror_food_id, DataManager, Nutrients};

use super::{require_login, OutputFormat};

#[derive(Args)]
pub struct CustomCommand {
    #[command(subcommand)]
    pub command: CustomSubcommand,
}

#[derive(Subcommand)]
pub enum CustomSubcommand {
    /// Build a custom food from catalog foods
    Create {
        #[arg(long, short)]
        name: String,

        #[arg(long, short, default_value = "")]
        description: String,

        /// Ingredient as FOOD_ID:GRAMS (can be repeated)
        #[arg(long = "ingredient", short = 'i', value_name = "FOOD_ID:GRAMS", required = true)]
        ingredients: Vec<String>,
    },

    /// Create a custom food from per-serving values
    Quick {
        #[arg(long, short)]
        name: String,

        #[arg(long, short, default_value = "")]
        description: String,

        #[arg(long)]
        calories: f64,

        #[arg(long, default_value = "0")]
        protein: f64,

        #[arg(long, default_value = "0")]
        carbs: f64,

        #[arg(long, default_value = "0")]
        fat: f64,
    },

    /// List your custom foods
    List {
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Delete a custom food and every log entry that uses it
    Delete {
        /// Custom food ID
        id: String,
    },
}

impl CustomCommand {
    pub fn run(&self, manager: &mut DataManager) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            CustomSubcommand::Create {
                name,
                description,
                ingredients,
            } => {
                require_login(manager)?;
                let parsed = ingredients
                    .iter()
                    .map(|raw| parse_ingredient(raw))
                    .collect::<Result<Vec<_>, _>>()?;

                let id = manager
                    .create_custom_food(name, description, &parsed)
                    .ok_or("Could not create custom food: check the name and ingredient ids")?;
                report_created(manager, &id)
            }

            CustomSubcommand::Quick {
                name,
                description,
                calories,
                protein,
                carbs,
                fat,
            } => {
                require_login(manager)?;
                let per_serving = Nutrients::new(*calories, *protein, *carbs, *fat);
                let id = manager
                    .create_quick_custom_food(name, description, per_serving)
                    .ok_or("Could not create custom food: name is blank or values are negative")?;
                report_created(manager, &id)
            }

            CustomSubcommand::List { format } => {
                require_login(manager)?;
                let customs = manager.custom_foods_for_active_user();
                match format {
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&customs)?),
                    OutputFormat::Text => {
                        if customs.is_empty() {
                            println!("No custom foods yet.");
                            return Ok(());
                        }
                        for custom in &customs {
                            println!("{}", custom);
                            println!("ID: {}\n", custom.id);
                        }
                    }
                }
                Ok(())
            }

            CustomSubcommand::Delete { id } => {
                if !manager.delete_custom_food_by_id(id) {
                    return Err(format!("Custom food not found: {}", id).into());
                }
                if let Some(e) = manager.last_save_error() {
                    return Err(format!("Deleted in memory but not saved: {}", e).into());
                }
                println!("Deleted custom food {}", id);
                Ok(())
            }
        }
    }
}

fn report_created(manager: &DataManager, id: &str) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(e) = manager.last_save_error() {
        return Err(format!("Custom food created but not saved: {}", e).into());
    }
    if let Some(custom) = manager.custom_food(id) {
        println!("{}", custom);
    }
    println!("\nID: {}", id);
    println!("Catalog ID: {}", mirror_food_id(id));
    Ok(())
}

/// Parses `FOOD_ID:GRAMS`. The id may itself contain colons.
fn parse_ingredient(raw: &str) -> Result<(String, f64), String> {
    let (id, grams) = raw
        .rsplit_once(':')
        .ok_or_else(|| format!("Invalid ingredient '{}'. Use FOOD_ID:GRAMS.", raw))?;
    let grams = parse_positive("grams", grams).map_err(|e| format!("{} in '{}'", e, raw))?;
    Ok((id.trim().to_string(), grams))
}
