//! MCP `import_shopping_list_photo` tool parameter definition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for importing a photographed shopping list.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ImportPhotoParams {
    #[schemars(description = "Path to a JPEG or PNG photo of a shopping list")]
    pub path: String,

    #[schemars(description = "Target list: 'fridge' or 'shopping_list'. Defaults to 'shopping_list'.")]
    pub list: Option<String>,
}
