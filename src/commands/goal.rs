use chrono::Local;
use clap::{Args, Subcommand};
use macromate_core::{DataManager, Goal};

use super::{parse_date, parse_date_or_today, OutputFormat};

#[derive(Args)]
pub struct GoalCommand {
    #[command(subcommand)]
    pub command: GoalSubcommand,
}

#[derive(Subcommand)]
pub enum GoalSubcommand {
    /// Replace the current goal
    Set {
        /// Daily calories (whole number)
        #[arg(long)]
        calories: String,

        /// Daily protein (g)
        #[arg(long)]
        protein: String,

        /// Daily carbs (g)
        #[arg(long)]
        carbs: String,

        /// Daily fat (g)
        #[arg(long)]
        fat: String,

        /// First day (YYYY-MM-DD), defaults to today
        #[arg(long)]
        start: Option<String>,

        /// Last day (YYYY-MM-DD), defaults to 30 days after the start
        #[arg(long)]
        end: Option<String>,
    },

    /// Reset to 2000 kcal / 150 g protein / 200 g carbs / 65 g fat for 30 days
    Reset,

    /// Show the active goal and today's progress
    Show {
        /// Date to check (YYYY-MM-DD), defaults to today
        #[arg(long, short)]
        date: Option<String>,

        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

impl GoalCommand {
    pub fn run(&self, manager: &mut DataManager) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            GoalSubcommand::Set {
                calories,
                protein,
                carbs,
                fat,
                start,
                end,
            } => {
                let start = parse_date_or_today(start)?;
                let mut goal = Goal::parse_targets(calories, protein, carbs, fat, start)?;
                if let Some(end) = end {
                    goal = goal.with_range(start, parse_date(end)?)?;
                }

                println!("Saved {}", goal.summary());
                manager.replace_goals(vec![goal]);
                manager.save_all_data()?;
                Ok(())
            }

            GoalSubcommand::Reset => {
                let goal = Goal::default_starting(Local::now().date_naive());
                println!("Saved {}", goal.summary());
                manager.replace_goals(vec![goal]);
                manager.save_all_data()?;
                Ok(())
            }

            GoalSubcommand::Show { date, format } => {
                let date = parse_date_or_today(date)?;
                let Some(goal) = manager.active_goal_on(date) else {
                    println!("No goal active on {}. Use 'macromate goal set'.", date);
                    return Ok(());
                };

                match format {
                    OutputFormat::Json => match manager.goal_progress(date) {
                        Some(progress) => println!("{}", serde_json::to_string_pretty(&progress)?),
                        None => println!("{}", serde_json::to_string_pretty(goal)?),
                    },
                    OutputFormat::Text => {
                        println!("{}", goal);
                        if let Some(progress) = manager.goal_progress(date) {
                            println!();
                            println!("{}", progress);
                        }
                    }
                }
                Ok(())
            }
        }
    }
}
