//! Aggregates over day logs: seven-day trends and goal progress.

use chrono::{Duration, NaiveDate};
use serde::Serialize;
use std::fmt;

use crate::models::{DayTotals, Goal};

/// Days covered by a weekly summary.
pub const WEEK_DAYS: usize = 7;

/// One day in a weekly summary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub totals: DayTotals,
    /// False when no day log exists for the date.
    pub logged: bool,
}

/// Totals for the seven days ending on `end`, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklySummary {
    pub end: NaiveDate,
    pub days: Vec<DaySummary>,
    pub avg_calories: f64,
    pub avg_protein_g: f64,
    pub avg_carbs_g: f64,
    pub avg_fat_g: f64,
}

impl WeeklySummary {
    /// Builds the summary from a lookup of each day's totals. Days the
    /// lookup has nothing for count as zero in the averages. Dates before
    /// `NaiveDate::MIN` are left out of `days` and also count as zero.
    pub fn collect<F>(end: NaiveDate, mut totals_for: F) -> Self
    where
        F: FnMut(NaiveDate) -> Option<DayTotals>,
    {
        let days: Vec<DaySummary> = (0..WEEK_DAYS)
            .rev()
            .filter_map(|back| end.checked_sub_signed(Duration::days(back as i64)))
            .map(|date| match totals_for(date) {
                Some(totals) => DaySummary {
                    date,
                    totals,
                    logged: true,
                },
                None => DaySummary {
                    date,
                    totals: DayTotals::default(),
                    logged: false,
                },
            })
            .collect();

        let n = WEEK_DAYS as f64;
        let avg_calories = days.iter().map(|d| d.totals.calories as f64).sum::<f64>() / n;
        let avg_protein_g = days.iter().map(|d| d.totals.protein_g).sum::<f64>() / n;
        let avg_carbs_g = days.iter().map(|d| d.totals.carbs_g).sum::<f64>() / n;
        let avg_fat_g = days.iter().map(|d| d.totals.fat_g).sum::<f64>() / n;

        Self {
            end,
            days,
            avg_calories,
            avg_protein_g,
            avg_carbs_g,
            avg_fat_g,
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.days.first().map(|d| d.date).unwrap_or(self.end)
    }

    pub fn logged_days(&self) -> usize {
        self.days.iter().filter(|d| d.logged).count()
    }
}

impl fmt::Display for WeeklySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Week {} to {}", self.start(), self.end)?;
        writeln!(f, "{}", "-".repeat(60))?;
        for day in &self.days {
            if day.logged {
                writeln!(f, "  {}  {}", day.date, day.totals)?;
            } else {
                writeln!(f, "  {}  (no entries)", day.date)?;
            }
        }
        write!(
            f,
            "  Average: Calories: {:.0} | Protein: {:.0}g | Carbs: {:.0}g | Fat: {:.0}g",
            self.avg_calories, self.avg_protein_g, self.avg_carbs_g, self.avg_fat_g
        )
    }
}

/// Consumed-versus-target figures for one day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalProgress {
    pub date: NaiveDate,
    pub goal: Goal,
    pub consumed: DayTotals,
    /// Calories left before the target, never below zero.
    pub remaining_calories: i64,
    pub calories_fraction: f64,
    pub protein_fraction: f64,
    pub carbs_fraction: f64,
    pub fat_fraction: f64,
}

impl GoalProgress {
    pub fn new(date: NaiveDate, goal: &Goal, consumed: DayTotals) -> Self {
        let target = i64::from(goal.target_calories);
        Self {
            date,
            goal: goal.clone(),
            consumed,
            remaining_calories: (target - consumed.calories).max(0),
            calories_fraction: clamp_unit(goal.progress_calories(consumed.calories as f64)),
            protein_fraction: fraction(consumed.protein_g, goal.target_protein_g),
            carbs_fraction: fraction(consumed.carbs_g, goal.target_carbs_g),
            fat_fraction: fraction(consumed.fat_g, goal.target_fat_g),
        }
    }
}

impl fmt::Display for GoalProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Progress for {}", self.date)?;
        writeln!(
            f,
            "  Calories  {} / {} kcal  {}  ({} remaining)",
            self.consumed.calories,
            self.goal.target_calories,
            bar(self.calories_fraction),
            self.remaining_calories
        )?;
        writeln!(
            f,
            "  Protein   {:.0} / {:.0} g  {}",
            self.consumed.protein_g,
            self.goal.target_protein_g,
            bar(self.protein_fraction)
        )?;
        writeln!(
            f,
            "  Carbs     {:.0} / {:.0} g  {}",
            self.consumed.carbs_g,
            self.goal.target_carbs_g,
            bar(self.carbs_fraction)
        )?;
        write!(
            f,
            "  Fat       {:.0} / {:.0} g  {}",
            self.consumed.fat_g,
            self.goal.target_fat_g,
            bar(self.fat_fraction)
        )
    }
}

fn fraction(consumed: f64, target: f64) -> f64 {
    if target <= 0.0 {
        return 0.0;
    }
    clamp_unit(consumed / target)
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

fn bar(fraction: f64) -> String {
    const WIDTH: usize = 20;
    let filled = (fraction * WIDTH as f64).round() as usize;
    format!(
        "[{}{}] {:>3.0}%",
        "#".repeat(filled.min(WIDTH)),
        ".".repeat(WIDTH - filled.min(WIDTH)),
        fraction * 100.0
    )
}
