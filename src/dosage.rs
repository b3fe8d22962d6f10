//! Dose computation for medication rows.
//!
//! Catalog dosing references are per kilogram of patient weight; the grid
//! shows absolute amounts. Rounding is part of the contract — recommended
//! ranges carry one decimal, converted volumes three — and callers must not
//! round again.

use serde::Serialize;

use crate::models::Medication;

/// Absolute recommended dose range for one patient.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendedRange {
    /// Lower bound, rounded to one decimal.
    pub min: Option<f64>,
    /// Upper bound, rounded to one decimal.
    pub max: Option<f64>,
    pub unit: String,
}

/// Per-kg reference × weight. `None` when the catalog carries no per-kg
/// bound at all — "no reference", not a zero range.
pub fn recommended_range(medication: &Medication, weight_kg: f64) -> Option<RecommendedRange> {
    if medication.dose_min_per_kg.is_none() && medication.dose_max_per_kg.is_none() {
        return None;
    }

    let unit = medication
        .dose_unit
        .clone()
        .unwrap_or_else(|| medication.unit.clone());

    Some(RecommendedRange {
        min: medication.dose_min_per_kg.map(|d| round1(d * weight_kg)),
        max: medication.dose_max_per_kg.map(|d| round1(d * weight_kg)),
        unit,
    })
}

/// Convert a mass-per-kg dose to an administration volume:
/// `(mass_per_kg × weight) / concentration`, rounded to three decimals.
///
/// Undefined without a positive concentration — never substitutes a
/// default, the caller keeps showing mass instead.
pub fn convert_mass_to_volume(
    mass_per_kg: f64,
    weight_kg: f64,
    concentration: Option<f64>,
) -> Option<f64> {
    let concentration = concentration.filter(|c| *c > 0.0)?;
    Some(round3((mass_per_kg * weight_kg) / concentration))
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}
