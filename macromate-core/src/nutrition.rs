//! Nutrient scaling and energy expenditure.
//!
//! Everything here is a pure function of its inputs. Negative or NaN serving
//! counts are treated as zero, and a non-positive serving size makes every
//! gram-based quantity zero instead of dividing by it.

use crate::models::{ActivityLevel, Nutrients, Sex, ValidationError};

pub const POUNDS_TO_KG: f64 = 0.453_592_37;
pub const INCHES_TO_CM: f64 = 2.54;

/// Clamps a serving count to be non-negative.
pub fn clamp_servings(servings: f64) -> f64 {
    if servings > 0.0 {
        servings
    } else {
        0.0
    }
}

/// Scales a per-serving profile by `max(0, servings)`.
pub fn scale_servings(per_serving: &Nutrients, servings: f64) -> Nutrients {
    per_serving.scaled(clamp_servings(servings))
}

/// Converts a weight in grams to a serving count.
///
/// Returns 0 when `serving_size` is not positive.
pub fn grams_to_servings(grams: f64, serving_size: f64) -> f64 {
    if serving_size > 0.0 {
        grams / serving_size
    } else {
        0.0
    }
}

/// Scales a per-serving profile by a weight in grams.
pub fn scale_grams(per_serving: &Nutrients, serving_size: f64, grams: f64) -> Nutrients {
    if serving_size > 0.0 {
        scale_servings(per_serving, grams_to_servings(grams, serving_size))
    } else {
        Nutrients::ZERO
    }
}

/// Parses a typed serving count or weight. It must be a finite number
/// greater than zero.
pub fn parse_positive(field: &'static str, raw: &str) -> Result<f64, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Missing { field });
    }
    let value: f64 = trimmed.parse().map_err(|_| ValidationError::NotNumeric {
        field,
        value: trimmed.to_string(),
    })?;
    if !value.is_finite() {
        return Err(ValidationError::NotNumeric {
            field,
            value: trimmed.to_string(),
        });
    }
    if value <= 0.0 {
        return Err(ValidationError::NotPositive { field });
    }
    Ok(value)
}

/// Basal metabolic rate (kcal/day) using the Mifflin-St Jeor equation.
pub fn basal_metabolic_rate(weight_lb: f64, height_in: f64, age: u32, sex: Sex) -> f64 {
    let weight_kg = weight_lb * POUNDS_TO_KG;
    let height_cm = height_in * INCHES_TO_CM;
    let base = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * f64::from(age);

    base + sex.bmr_offset()
}

/// Total daily energy expenditure: BMR times the activity multiplier.
pub fn total_daily_energy(bmr: f64, activity: ActivityLevel) -> f64 {
    bmr * activity.multiplier()
}
