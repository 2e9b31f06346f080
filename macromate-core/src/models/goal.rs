use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Length of the window a freshly saved goal covers.
pub const DEFAULT_GOAL_DAYS: i64 = 30;

/// Errors from parsing user-typed goal and serving fields.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("{field} is required")]
    Missing { field: &'static str },

    #[error("{field} must be a number, got '{value}'")]
    NotNumeric { field: &'static str, value: String },

    #[error("{field} must not be negative")]
    Negative { field: &'static str },

    #[error("{field} must be greater than zero")]
    NotPositive { field: &'static str },

    #[error("a goal starting {start} would end past the last supported date")]
    DateOutOfRange { start: NaiveDate },

    #[error("end date {end} is before start date {start}")]
    InvertedRange { start: NaiveDate, end: NaiveDate },
}

/// A daily calorie and macro target valid over an inclusive date range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    pub id: Uuid,
    pub target_calories: i32,
    pub target_protein_g: f64,
    pub target_carbs_g: f64,
    pub target_fat_g: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl Goal {
    pub fn new(
        target_calories: i32,
        target_protein_g: f64,
        target_carbs_g: f64,
        target_fat_g: f64,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            target_calories,
            target_protein_g,
            target_carbs_g,
            target_fat_g,
            start_date,
            end_date,
        }
    }

    /// 2000 kcal, 150 g protein, 200 g carbs, 65 g fat for 30 days. Near
    /// the end of the calendar the range stops at `NaiveDate::MAX`.
    pub fn default_starting(start: NaiveDate) -> Self {
        let end = default_end(start).unwrap_or(NaiveDate::MAX);
        Self::new(2000, 150.0, 200.0, 65.0, start, end)
    }

    /// Parses the four target fields as typed by a user.
    ///
    /// Calories must be a whole number; macros may be fractional. The goal
    /// covers `start` through `start + 30 days`.
    pub fn parse_targets(
        calories: &str,
        protein: &str,
        carbs: &str,
        fat: &str,
        start: NaiveDate,
    ) -> Result<Self, ValidationError> {
        let calories = parse_field::<i32>("calories", calories)?;
        if calories < 0 {
            return Err(ValidationError::Negative { field: "calories" });
        }
        let protein = parse_macro("protein", protein)?;
        let carbs = parse_macro("carbs", carbs)?;
        let fat = parse_macro("fat", fat)?;
        let end = default_end(start).ok_or(ValidationError::DateOutOfRange { start })?;

        Ok(Self::new(calories, protein, carbs, fat, start, end))
    }

    pub fn with_range(mut self, start: NaiveDate, end: NaiveDate) -> Result<Self, ValidationError> {
        if end < start {
            return Err(ValidationError::InvertedRange { start, end });
        }
        self.start_date = start;
        self.end_date = end;
        Ok(self)
    }

    /// True when `date` falls within the range, both ends included.
    pub fn is_active(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    /// Fraction of the calorie target consumed; 0 when the target is not positive.
    pub fn progress_calories(&self, consumed: f64) -> f64 {
        if self.target_calories <= 0 {
            return 0.0;
        }
        consumed / f64::from(self.target_calories)
    }

    pub fn summary(&self) -> String {
        format!(
            "Goal {}: {} kcal, P={:.0}g C={:.0}g F={:.0}g ({} to {})",
            self.id,
            self.target_calories,
            self.target_protein_g,
            self.target_carbs_g,
            self.target_fat_g,
            self.start_date,
            self.end_date
        )
    }
}

fn default_end(start: NaiveDate) -> Option<NaiveDate> {
    start.checked_add_signed(Duration::days(DEFAULT_GOAL_DAYS))
}

impl PartialEq for Goal {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

fn parse_field<T: std::str::FromStr>(field: &'static str, raw: &str) -> Result<T, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Missing { field });
    }
    trimmed.parse::<T>().map_err(|_| ValidationError::NotNumeric {
        field,
        value: trimmed.to_string(),
    })
}

fn parse_macro(field: &'static str, raw: &str) -> Result<f64, ValidationError> {
    let value = parse_field::<f64>(field, raw)?;
    if !value.is_finite() {
        return Err(ValidationError::NotNumeric {
            field,
            value: raw.trim().to_string(),
        });
    }
    if value < 0.0 {
        return Err(ValidationError::Negative { field });
    }
    Ok(value)
}
