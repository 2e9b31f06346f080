use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::nutrition;

/// Biological sex, used only for the BMR offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
    #[default]
    Other,
}

impl Sex {
    /// Constant added to the Mifflin-St Jeor base value.
    pub fn bmr_offset(&self) -> f64 {
        match self {
            Sex::Male => 5.0,
            Sex::Female => -161.0,
            Sex::Other => 0.0,
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sex::Male => write!(f, "male"),
            Sex::Female => write!(f, "female"),
            Sex::Other => write!(f, "other"),
        }
    }
}

impl FromStr for Sex {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" => Ok(Sex::Male),
            "female" | "f" => Ok(Sex::Female),
            "other" | "o" => Ok(Sex::Other),
            _ => Err(format!(
                "Invalid sex '{}'. Valid options: male, female, other",
                s
            )),
        }
    }
}

/// Daily activity tier, each with a fixed TDEE multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    /// Minimal physical activity.
    #[default]
    Sedentary,
    /// Light exercise 1-3 days/week.
    Light,
    /// Moderate exercise 3-5 days/week.
    Moderate,
    /// Hard exercise 6-7 days/week.
    VeryActive,
    /// Intense physical labor or training.
    ExtraActive,
}

impl ActivityLevel {
    pub fn multiplier(&self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::VeryActive => 1.725,
            ActivityLevel::ExtraActive => 1.9,
        }
    }
}

impl fmt::Display for ActivityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActivityLevel::Sedentary => write!(f, "sedentary"),
            ActivityLevel::Light => write!(f, "light"),
            ActivityLevel::Moderate => write!(f, "moderate"),
            ActivityLevel::VeryActive => write!(f, "very_active"),
            ActivityLevel::ExtraActive => write!(f, "extra_active"),
        }
    }
}

impl FromStr for ActivityLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "sedentary" => Ok(ActivityLevel::Sedentary),
            "light" => Ok(ActivityLevel::Light),
            "moderate" => Ok(ActivityLevel::Moderate),
            "very_active" => Ok(ActivityLevel::VeryActive),
            "extra_active" => Ok(ActivityLevel::ExtraActive),
            _ => Err(format!(
                "Invalid activity level '{}'. Valid options: sedentary, light, moderate, very_active, extra_active",
                s
            )),
        }
    }
}

/// A registered account and its body profile.
///
/// `id` is the normalized email address and is the only identity used for
/// equality. Height is stored in inches and weight in pounds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub goal: String,
    #[serde(default)]
    pub age: u32,
    #[serde(default)]
    pub sex: Sex,
    #[serde(default)]
    pub height_in: f64,
    #[serde(default)]
    pub weight_lb: f64,
    #[serde(default)]
    pub activity_level: ActivityLevel,
}

impl User {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    /// Basal metabolic rate in kcal/day.
    pub fn bmr(&self) -> f64 {
        nutrition::basal_metabolic_rate(self.weight_lb, self.height_in, self.age, self.sex)
    }

    /// Total daily energy expenditure in kcal/day.
    pub fn tdee(&self) -> f64 {
        nutrition::total_daily_energy(self.bmr(), self.activity_level)
    }
}

impl PartialEq for User {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for User {}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} <{}>", self.name, self.id)?;
        if !self.goal.is_empty() {
            writeln!(f, "Goal: {}", self.goal)?;
        }
        writeln!(f, "Age: {}  Sex: {}", self.age, self.sex)?;
        writeln!(
            f,
            "Height: {:.1} in  Weight: {:.1} lb",
            self.height_in, self.weight_lb
        )?;
        writeln!(f, "Activity: {}", self.activity_level)?;
        write!(f, "BMR: {:.0} kcal  TDEE: {:.0} kcal", self.bmr(), self.tdee())
    }
}

/// Partial edit of a user's profile. `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub goal: Option<String>,
    pub age: Option<u32>,
    pub sex: Option<Sex>,
    pub height_in: Option<f64>,
    pub weight_lb: Option<f64>,
    pub activity_level: Option<ActivityLevel>,
}

impl ProfileUpdate {
    /// False if a given height or weight is NaN or infinite.
    pub fn is_finite(&self) -> bool {
        self.height_in.map_or(true, f64::is_finite) && self.weight_lb.map_or(true, f64::is_finite)
    }

    /// Applies the edit. A blank name is ignored rather than clearing it.
    pub fn apply(&self, user: &mut User) {
        if let Some(name) = &self.name {
            let trimmed = name.trim();
            if !trimmed.is_empty() {
                user.name = trimmed.to_string();
            }
        }
        if let Some(goal) = &self.goal {
            user.goal = goal.trim().to_string();
        }
        if let Some(age) = self.age {
            user.age = age;
        }
        if let Some(sex) = self.sex {
            user.sex = sex;
        }
        if let Some(height) = self.height_in {
            user.height_in = height;
        }
        if let Some(weight) = self.weight_lb {
            user.weight_lb = weight;
        }
        if let Some(level) = self.activity_level {
            user.activity_level = level;
        }
    }
}
