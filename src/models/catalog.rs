use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Catalog view of a medication — consumed, not owned, by the engine.
/// Dosing reference is per kilogram of patient weight; `concentration`
/// (mass per volume) enables mass→volume display conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Medication {
    pub id: Uuid,
    pub name: String,
    pub dose_min_per_kg: Option<f64>,
    pub dose_max_per_kg: Option<f64>,
    pub dose_unit: Option<String>,
    /// Catalog reference unit, used when `dose_unit` is not set.
    pub unit: String,
    pub concentration: Option<f64>,
    pub concentration_unit: Option<String>,
}

/// One recorded material consumption during a stay (swabs, cannulas, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialUsage {
    pub material_ref: Uuid,
    pub material_name: String,
    pub quantity: f64,
    pub unit: Option<String>,
}
