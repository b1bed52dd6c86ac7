//! MCP `add_ingredient_to_fridge` tool parameter definition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for adding a structured item to the fridge.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct AddIngredientParams {
    #[schemars(description = "Name of the ingredient to add, e.g. 'mleko'")]
    pub ingredient: String,

    #[schemars(description = "Amount to add. Defaults to 1 when not given.")]
    pub quantity: Option<f64>,

    #[schemars(description = "Unit the ingredient is counted in, e.g. 'szt', 'kg', 'g', 'l', 'ml', 'opak.'")]
    pub unit: Option<String>,

    #[schemars(description = "Product category, e.g. 'Nabiał', 'Warzywa', 'Owoce'. Defaults to 'Inne'.")]
    pub category: Option<String>,
}
