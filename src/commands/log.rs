use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use clap::{Args, Subcommand};
use macromate_core::nutrition::parse_positive;
use macromate_core::{DataManager, DayLog, MealType};
use uuid::Uuid;

use super::{parse_date_or_today, require_login, OutputFormat};

#[derive(Args)]
pub struct LogCommand {
    #[command(subcommand)]
    pub command: LogSubcommand,
}

#[derive(Subcommand)]
pub enum LogSubcommand {
    /// Log a catalog or custom food
    Add {
        /// Catalog food ID or custom food ID
        food_id: String,

        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long, short)]
        date: Option<String>,

        /// Meal type (breakfast, lunch, dinner, snack)
        #[arg(long = "meal", short = 'm', default_value = "lunch")]
        meal_type: String,

        /// Number of servings
        #[arg(long, short, conflicts_with = "grams")]
        servings: Option<String>,

        /// Weight eaten in grams (catalog foods only)
        #[arg(long, short)]
        grams: Option<String>,

        /// Time of day (HH:MM), defaults to now
        #[arg(long, short)]
        time: Option<String>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Show a day's entries and totals
    Show {
        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long, short)]
        date: Option<String>,

        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Remove an entry from a day
    Remove {
        /// Log entry ID
        id: String,

        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long, short)]
        date: Option<String>,
    },

    /// Show the seven days ending on a date
    Week {
        /// Last day of the week (YYYY-MM-DD), defaults to today
        #[arg(long, short)]
        end: Option<String>,

        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

impl LogCommand {
    pub fn run(&self, manager: &mut DataManager) -> Result<(), Box<dyn std::error::Error>> {
        require_login(manager)?;

        match &self.command {
            LogSubcommand::Add {
                food_id,
                date,
                meal_type,
                servings,
                grams,
                time,
                notes,
            } => {
                let date = parse_date_or_today(date)?;
                let meal_type: MealType = meal_type.parse()?;
                let timestamp = timestamp_for(date, time)?;
                let servings = resolve_servings(manager, food_id, servings.as_deref(), grams.as_deref())?;

                let log = manager
                    .log_food(
                        date,
                        food_id,
                        meal_type,
                        servings,
                        timestamp,
                        notes.as_deref().unwrap_or(""),
                    )
                    .ok_or_else(|| format!("Could not log '{}': unknown food or bad servings", food_id))?;
                manager.save_all_data()?;

                let name = manager.resolve_food_name(food_id).unwrap_or(food_id);
                println!("Logged {} x {} ({})", servings, name, log);
                println!("Log ID: {}", log.id);
                Ok(())
            }

            LogSubcommand::Show { date, format } => {
                let date = parse_date_or_today(date)?;
                let Some(day) = manager.day_log(date) else {
                    println!("No entries for {}", date);
                    return Ok(());
                };
                match format {
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(day)?),
                    OutputFormat::Text => {
                        print_day(&*manager, day);
                        if let Some(progress) = manager.goal_progress(date) {
                            println!();
                            println!("{}", progress);
                        }
                    }
                }
                Ok(())
            }

            LogSubcommand::Remove { id, date } => {
                let date = parse_date_or_today(date)?;
                let log_id =
                    Uuid::parse_str(id).map_err(|_| format!("Invalid log ID: {}", id))?;
                if !manager.remove_food_log(date, log_id) {
                    return Err(format!("No entry {} on {}", id, date).into());
                }
                manager.save_all_data()?;
                println!("Removed entry {}", id);
                Ok(())
            }

            LogSubcommand::Week { end, format } => {
                let end = parse_date_or_today(end)?;
                let summary = manager
                    .weekly_summary(end)
                    .ok_or("Not logged in. Use 'macromate account login' first.")?;
                match format {
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
                    OutputFormat::Text => println!("{}", summary),
                }
                Ok(())
            }
        }
    }
}

/// Servings from either `--servings` or `--grams`. Defaults to one serving.
fn resolve_servings(
    manager: &DataManager,
    food_id: &str,
    servings: Option<&str>,
    grams: Option<&str>,
) -> Result<f64, String> {
    match (servings, grams) {
        (Some(s), _) => parse_positive("servings", s).map_err(|e| e.to_string()),
        (None, Some(g)) => {
            let g = parse_positive("grams", g).map_err(|e| e.to_string())?;
            let food = manager
                .food(food_id)
                .ok_or_else(|| format!("--grams needs a catalog food, '{}' is not one", food_id))?;
            if food.serving_size <= 0.0 {
                return Err(format!("'{}' has no serving size to convert grams", food.name));
            }
            Ok(food.grams_to_servings(g))
        }
        (None, None) => Ok(1.0),
    }
}

fn timestamp_for(date: NaiveDate, time: &Option<String>) -> Result<NaiveDateTime, String> {
    let time = match time {
        Some(t) => NaiveTime::parse_from_str(t.trim(), "%H:%M")
            .map_err(|_| format!("Invalid time '{}'. Use HH:MM.", t))?,
        None => Local::now().time(),
    };
    Ok(date.and_time(time))
}

fn print_day(manager: &DataManager, day: &DayLog) {
    println!("{}", day.date);
    println!("{}", "-".repeat(60));

    for (meal, totals) in day.totals_by_meal() {
        let entries: Vec<_> = day.entries_for_meal(meal).collect();
        if entries.is_empty() {
            continue;
        }
        println!("  {} ({:.0} kcal)", meal.label(), totals.calories);
        for entry in entries {
            let name = manager
                .resolve_food_name(&entry.food_id)
                .unwrap_or("(deleted food)");
            println!(
                "    {:>8}  {} x {:<24} {:>5.0} kcal  [{}]",
                entry.formatted_time(),
                entry.servings,
                name,
                entry.calories(),
                entry.id
            );
            if !entry.notes.is_empty() {
                println!("              Notes: {}", entry.notes);
            }
        }
    }

    println!("  {}", "-".repeat(56));
    println!("  Daily Total: {}", day.totals());
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_timestamp_for() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
        let ts = timestamp_for(date, &Some("07:45".to_string())).unwrap();
        assert_eq!(ts.format("%Y-%m-%d %H:%M").to_string(), "2025-01-02 07:45");
        assert!(timestamp_for(date, &Some("7pm".to_string())).is_err());
    }

    #[test]
    fn test_resolve_servings_from_grams() {
        let temp = TempDir::new().unwrap();
        let (manager, _) = DataManager::open(temp.path().to_path_buf());

        assert_eq!(resolve_servings(&manager, "f1", Some("2.5"), None).unwrap(), 2.5);
        assert_eq!(resolve_servings(&manager, "f1", None, None).unwrap(), 1.0);
        // seeded foods use a 1 g serving
        assert_eq!(resolve_servings(&manager, "f1", None, Some("150")).unwrap(), 150.0);
        assert!(resolve_servings(&manager, "nope", None, Some("10")).is_err());
        assert!(resolve_servings(&manager, "f1", Some("0"), None).is_err());
        assert!(resolve_servings(&manager, "f1", Some("lots"), None).is_err());
    }
}
