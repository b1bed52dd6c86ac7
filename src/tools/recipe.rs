use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct RecipeParams {
    #[schemars(description = "Recipe title or a fragment of it; the first recipe whose title contains it is used")]
    pub recipe_title: String,
}
