//! MCP `add_ingredient_to_shopping_list` tool parameter definition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for adding free-text items to the shopping list.
///
/// The text goes through the structuring service, which infers unit and
/// category.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct AddToShoppingListParams {
    #[schemars(description = "What to buy, as the user said it, e.g. 'mleko' or '2 kostki masła'")]
    pub ingredient: String,

    #[schemars(description = "How much to buy. Defaults to 1 when not given.")]
    pub quantity: Option<f64>,
}
