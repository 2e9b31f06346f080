mod account;
mod config_cmd;
mod custom;
mod food;
mod goal;
mod log;

pub use account::AccountCommand;
pub use config_cmd::ConfigCommand;
pub use custom::CustomCommand;
pub use food::FoodCommand;
pub use goal::GoalCommand;
pub use log::LogCommand;

use chrono::{Local, NaiveDate};
use clap::ValueEnum;
use macromate_core::{DataManager, User};

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Parses an optional YYYY-MM-DD argument, defaulting to today.
pub(crate) fn parse_date_or_today(date: &Option<String>) -> Result<NaiveDate, String> {
    match date {
        Some(d) => parse_date(d),
        None => Ok(Local::now().date_naive()),
    }
}

pub(crate) fn parse_date(date: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|_| format!("Invalid date format '{}'. Use YYYY-MM-DD.", date))
}

pub(crate) fn require_login(manager: &DataManager) -> Result<&User, String> {
    manager
        .active_user()
        .ok_or_else(|| "Not logged in. Use 'macromate account login' first.".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2025-02-03").unwrap(),
            NaiveDate::from_ymd_opt(2025, 2, 3).unwrap()
        );
        assert!(parse_date("02/03/2025").unwrap_err().contains("YYYY-MM-DD"));
        assert_eq!(
            parse_date_or_today(&None).unwrap(),
            Local::now().date_naive()
        );
    }
}
