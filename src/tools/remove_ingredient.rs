use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct RemoveIngredientParams {
    #[schemars(description = "Name of the ingredient to remove, exactly as stored")]
    pub ingredient: String,

    #[schemars(description = "Amount to remove. Defaults to 1. Removing at least the held amount deletes the item.")]
    pub quantity: Option<f64>,

    #[schemars(description = "Unit of the stored item. Must match the stored unit exactly; omit only if the item has no unit.")]
    pub unit: Option<String>,
}
