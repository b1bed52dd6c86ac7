pub mod add_ingredient;
pub mod add_to_shopping_list;
pub mod import_photo;
pub mod recipe;
pub mod remove_ingredient;

use add_ingredient::AddIngredientParams;
use add_to_shopping_list::AddToShoppingListParams;
use import_photo::ImportPhotoParams;
use recipe::RecipeParams;
use remove_ingredient::RemoveIngredientParams;
use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::{tool, tool_handler, tool_router, ServerHandler};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::config::PantryConfig;
use crate::intake::{self, photo, IngredientStructurer, TextExtractor};
use crate::ledger::{IngredientRecord, ListKind, RemoveOutcome};
use crate::pantry::Pantry;
use crate::recipes::planner::{self, RecipePlan};
use crate::recipes::{RecipeMatch, RecipeSource};

/// The pantry MCP tool handler. Holds the session's pantry plus the external
/// collaborators and exposes all tools via the `#[tool_router]` macro.
#[derive(Clone)]
pub struct PantryTools {
    tool_router: ToolRouter<Self>,
    pantry: Arc<Mutex<Pantry>>,
    recipes: Arc<dyn RecipeSource>,
    structurer: Arc<dyn IngredientStructurer>,
    extractor: Arc<dyn TextExtractor>,
    config: Arc<PantryConfig>,
}

#[tool_router]
impl PantryTools {
    pub fn new(
        pantry: Arc<Mutex<Pantry>>,
        recipes: Arc<dyn RecipeSource>,
        structurer: Arc<dyn IngredientStructurer>,
        extractor: Arc<dyn TextExtractor>,
        config: Arc<PantryConfig>,
    ) -> Self {
        Self {
            tool_router: Self::tool_router(),
            pantry,
            recipes,
            structurer,
            extractor,
            config,
        }
    }

    /// List what is in the fridge.
    #[tool(description = "Return the ingredients currently in the FRIDGE (what the user already has at home) as JSON. Not for the shopping list; use read_shopping_list for that.")]
    async fn read_fridge(&self) -> Result<String, String> {
        tracing::info!("read_fridge called");
        self.read_list(ListKind::Fridge).await
    }

    /// Add a structured item to the fridge. Surrounding whitespace is
    /// stripped from the name before the exact-match lookup.
    #[tool(description = "Add an ingredient to the FRIDGE. An existing item with the same name and unit has its quantity increased instead of being duplicated.")]
    async fn add_ingredient_to_fridge(
        &self,
        Parameters(params): Parameters<AddIngredientParams>,
    ) -> Result<String, String> {
        tracing::info!(ingredient = %params.ingredient, "add_ingredient_to_fridge called");

        let record = IngredientRecord {
            ingredient: params.ingredient.trim().to_string(),
            quantity: params.quantity.unwrap_or(1.0),
            unit: params.unit,
            category: params.category.filter(|c| !c.trim().is_empty()),
        };
        let ingredient = record.ingredient.clone();

        let outcome = self
            .with_pantry(move |pantry| {
                pantry
                    .add(ListKind::Fridge, record)
                    .map_err(|e| format!("add failed: {e}"))
            })
            .await?;

        Ok(serde_json::json!({
            "list": ListKind::Fridge,
            "ingredient": ingredient,
            "result": outcome,
        })
        .to_string())
    }

    /// Remove an amount of an item from the fridge. The name is trimmed as in
    /// [`Self::remove_from`].
    #[tool(description = "Remove an amount of an ingredient from the FRIDGE. Name and unit must match the stored item exactly. Removing at least the held amount deletes the item.")]
    async fn remove_ingredient_from_fridge(
        &self,
        Parameters(params): Parameters<RemoveIngredientParams>,
    ) -> Result<String, String> {
        tracing::info!(ingredient = %params.ingredient, "remove_ingredient_from_fridge called");
        self.remove_from(ListKind::Fridge, params).await
    }

    /// List the shopping list.
    #[tool(description = "Return the SHOPPING LIST (what the user still needs to buy) as JSON. Not for the fridge; use read_fridge for that.")]
    async fn read_shopping_list(&self) -> Result<String, String> {
        tracing::info!("read_shopping_list called");
        self.read_list(ListKind::ShoppingList).await
    }

    /// Structure free text and add it to the shopping list.
    #[tool(description = "Add something the user needs to BUY to the SHOPPING LIST. Pass the item as the user said it; unit and category are inferred. Not for the fridge; use add_ingredient_to_fridge for that.")]
    async fn add_ingredient_to_shopping_list(
        &self,
        Parameters(params): Parameters<AddToShoppingListParams>,
    ) -> Result<String, String> {
        tracing::info!(ingredient = %params.ingredient, "add_ingredient_to_shopping_list called");

        if params.ingredient.trim().is_empty() {
            return Err("ingredient must not be empty".into());
        }
        let quantity = params.quantity.unwrap_or(1.0);
        let text = format!("{}, quantity: {quantity}", params.ingredient.trim());

        let records = self
            .structurer
            .structure(&text)
            .await
            .map_err(|e| format!("could not understand '{}': {e}", params.ingredient))?;

        let report = self
            .with_pantry(move |pantry| {
                intake::apply_records(pantry.ledger_mut(ListKind::ShoppingList), records)
                    .map_err(|e| format!("add failed: {e}"))
            })
            .await?;

        serde_json::to_string(&report).map_err(|e| format!("serialization failed: {e}"))
    }

    /// Remove an amount of an item from the shopping list. The name is
    /// trimmed as in [`Self::remove_from`].
    #[tool(description = "Remove an amount of an item from the SHOPPING LIST, e.g. after buying it. Name and unit must match the stored item exactly.")]
    async fn remove_ingredient_from_shopping_list(
        &self,
        Parameters(params): Parameters<RemoveIngredientParams>,
    ) -> Result<String, String> {
        tracing::info!(ingredient = %params.ingredient, "remove_ingredient_from_shopping_list called");
        self.remove_from(ListKind::ShoppingList, params).await
    }

    /// Add a recipe's missing ingredients to the shopping list.
    #[tool(description = "Add the ingredients of a recipe that are not in the fridge to the shopping list. Use when the user explicitly asks to shop for a specific dish.")]
    async fn add_missing_ingredients_for_recipe(
        &self,
        Parameters(params): Parameters<RecipeParams>,
    ) -> Result<String, String> {
        tracing::info!(recipe = %params.recipe_title, "add_missing_ingredients_for_recipe called");

        let Some(recipe) = self.find_recipe(&params.recipe_title).await? else {
            return Ok(format!("No recipe matches '{}'.", params.recipe_title));
        };

        self.with_pantry(move |pantry| {
            match planner::plan_recipe(recipe, pantry.fridge().records()) {
                RecipePlan::Missing { title, items } => {
                    planner::add_missing_to_shopping_list(
                        pantry.ledger_mut(ListKind::ShoppingList),
                        &title,
                        &items,
                    )
                    .map_err(|e| format!("add failed: {e}"))?;
                    Ok(format!(
                        "Added {} missing ingredient(s) for {title} to the shopping list: {}",
                        items.len(),
                        items.join(", ")
                    ))
                }
                RecipePlan::NothingMissing { title } => {
                    Ok(format!("You already have every ingredient for {title}!"))
                }
                RecipePlan::NotFound { query } => Ok(format!("No recipe matches '{query}'.")),
            }
        })
        .await
    }

    /// Write a recipe's missing ingredients to a text file.
    #[tool(description = "Write a text file listing the ingredients of a recipe that are not in the fridge. Use when the user wants a file instead of changing the shopping list.")]
    async fn create_shopping_list_file_for_recipe(
        &self,
        Parameters(params): Parameters<RecipeParams>,
    ) -> Result<String, String> {
        tracing::info!(recipe = %params.recipe_title, "create_shopping_list_file_for_recipe called");

        let Some(recipe) = self.find_recipe(&params.recipe_title).await? else {
            return Ok(format!("No recipe matches '{}'.", params.recipe_title));
        };
        let export_dir = self.config.resolved_export_dir();

        self.with_pantry(move |pantry| {
            match planner::plan_recipe(recipe, pantry.fridge().records()) {
                RecipePlan::Missing { title, items } => {
                    let path = planner::write_shopping_file(&export_dir, &title, &items)
                        .map_err(|e| format!("failed to write shopping list file: {e}"))?;
                    Ok(format!(
                        "Created shopping list file {} with {} missing ingredient(s).",
                        path.display(),
                        items.len()
                    ))
                }
                RecipePlan::NothingMissing { title } => Ok(format!(
                    "You already have every ingredient for {title}; no file needed."
                )),
                RecipePlan::NotFound { query } => Ok(format!("No recipe matches '{query}'.")),
            }
        })
        .await
    }

    /// OCR a photographed list and add the items.
    #[tool(description = "Read a photo of a handwritten or printed shopping list and add the recognised products to the shopping list (or the fridge).")]
    async fn import_shopping_list_photo(
        &self,
        Parameters(params): Parameters<ImportPhotoParams>,
    ) -> Result<String, String> {
        tracing::info!(path = %params.path, "import_shopping_list_photo called");

        let kind = match params.list.as_deref() {
            Some(list) => list.parse::<ListKind>()?,
            None => ListKind::ShoppingList,
        };

        let image = photo::read_image(&PathBuf::from(&params.path))
            .await
            .map_err(|e| e.to_string())?;
        let records =
            photo::records_from_photo(&image, self.extractor.as_ref(), self.structurer.as_ref())
                .await
                .map_err(|e| format!("photo import failed: {e}"))?;

        let report = self
            .with_pantry(move |pantry| {
                intake::apply_records(pantry.ledger_mut(kind), records)
                    .map_err(|e| format!("add failed: {e}"))
            })
            .await?;

        Ok(serde_json::json!({ "list": kind, "result": report }).to_string())
    }
}

impl PantryTools {
    /// Run `f` against the pantry on the blocking pool.
    async fn with_pantry<T, F>(&self, f: F) -> Result<T, String>
    where
        F: FnOnce(&mut Pantry) -> Result<T, String> + Send + 'static,
        T: Send + 'static,
    {
        let pantry = Arc::clone(&self.pantry);
        tokio::task::spawn_blocking(move || {
            let mut pantry = pantry
                .lock()
                .map_err(|e| format!("pantry lock poisoned: {e}"))?;
            f(&mut pantry)
        })
        .await
        .map_err(|e| format!("pantry task failed: {e}"))?
    }

    async fn read_list(&self, kind: ListKind) -> Result<String, String> {
        let records = self
            .with_pantry(move |pantry| pantry.read(kind).map_err(|e| format!("read failed: {e}")))
            .await?;
        serde_json::to_string(&records).map_err(|e| format!("serialization failed: {e}"))
    }

    /// Surrounding whitespace is stripped from the name; the ledger then
    /// matches `(ingredient, unit)` exactly.
    async fn remove_from(
        &self,
        kind: ListKind,
        params: RemoveIngredientParams,
    ) -> Result<String, String> {
        let request = IngredientRecord {
            ingredient: params.ingredient.trim().to_string(),
            quantity: params.quantity.unwrap_or(1.0),
            unit: params.unit,
            category: None,
        };
        let ingredient = request.ingredient.clone();

        let outcome = self
            .with_pantry(move |pantry| {
                pantry
                    .remove(kind, &request)
                    .map_err(|e| format!("remove failed: {e}"))
            })
            .await?;

        let mut response = serde_json::json!({
            "list": kind,
            "ingredient": ingredient,
            "result": outcome,
        });
        if outcome == RemoveOutcome::NotFound {
            response["message"] = format!("{ingredient} is not on the {kind}; nothing removed").into();
        }
        Ok(response.to_string())
    }

    async fn find_recipe(&self, title: &str) -> Result<Option<RecipeMatch>, String> {
        if title.trim().is_empty() {
            return Err("recipe_title must not be empty".into());
        }
        let recipes = Arc::clone(&self.recipes);
        let title = title.trim().to_string();
        tokio::task::spawn_blocking(move || recipes.find_by_title(&title))
            .await
            .map_err(|e| format!("recipe task failed: {e}"))?
            .map_err(|e| format!("recipe lookup failed: {e:#}"))
    }
}

#[tool_handler]
impl ServerHandler for PantryTools {
    fn get_info(&self) -> rmcp::model::ServerInfo {
        rmcp::model::ServerInfo {
            instructions: Some(
                "Pantry keeps two lists. The FRIDGE is what the user has at home \
                 (read_fridge, add_ingredient_to_fridge, remove_ingredient_from_fridge). \
                 The SHOPPING LIST is what they must buy (read_shopping_list, \
                 add_ingredient_to_shopping_list, remove_ingredient_from_shopping_list). \
                 For a dish, use add_missing_ingredients_for_recipe or \
                 create_shopping_list_file_for_recipe. Check read_fridge before suggesting recipes."
                    .into(),
            ),
            capabilities: rmcp::model::ServerCapabilities::builder()
                .enable_tools()
                .build(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::{StructuringError, VisionError};
    use async_trait::async_trait;
    use tempfile::TempDir;

    struct Cookbook(Vec<RecipeMatch>);

    impl RecipeSource for Cookbook {
        fn find_by_title(&self, title: &str) -> anyhow::Result<Option<RecipeMatch>> {
            let needle = title.to_lowercase();
            Ok(self
                .0
                .iter()
                .find(|r| r.title.to_lowercase().contains(&needle))
                .cloned())
        }
    }

    /// Structures "<name>, quantity: <n>" into one record with unit "szt".
    struct EchoStructurer;

    #[async_trait]
    impl IngredientStructurer for EchoStructurer {
        async fn structure(&self, text: &str) -> Result<Vec<IngredientRecord>, StructuringError> {
            let (name, quantity) = text
                .split_once(", quantity: ")
                .ok_or_else(|| StructuringError::Malformed(text.to_string()))?;
            let quantity = quantity
                .parse()
                .map_err(|_| StructuringError::Malformed(text.to_string()))?;
            Ok(vec![IngredientRecord::new(name, quantity)
                .with_unit("szt")
                .with_category("Nabiał")])
        }
    }

    struct FailingStructurer;

    #[async_trait]
    impl IngredientStructurer for FailingStructurer {
        async fn structure(&self, _text: &str) -> Result<Vec<IngredientRecord>, StructuringError> {
            Err(StructuringError::EmptyReply)
        }
    }

    struct StaticLines(Vec<&'static str>);

    #[async_trait]
    impl TextExtractor for StaticLines {
        async fn extract_lines(&self, _image: &[u8]) -> Result<Vec<String>, VisionError> {
            Ok(self.0.iter().map(|s| s.to_string()).collect())
        }
    }

    /// Structures every line as one unit-less record.
    struct LinesStructurer;

    #[async_trait]
    impl IngredientStructurer for LinesStructurer {
        async fn structure(&self, text: &str) -> Result<Vec<IngredientRecord>, StructuringError> {
            Ok(text.lines().map(|l| IngredientRecord::new(l, 1.0)).collect())
        }
    }

    fn tools_with(
        tmp: &TempDir,
        structurer: Arc<dyn IngredientStructurer>,
        extractor: Arc<dyn TextExtractor>,
    ) -> PantryTools {
        let pantry = Pantry::open(&tmp.path().join("data")).unwrap();
        let mut config = PantryConfig::default();
        config.storage.export_dir = tmp.path().join("exports").to_string_lossy().into_owned();

        let cookbook = Cookbook(vec![RecipeMatch {
            title: "Jajecznica na maśle".into(),
            ingredients: vec!["jajka".into(), "masło".into(), "szczypiorek".into()],
        }]);

        PantryTools::new(
            Arc::new(Mutex::new(pantry)),
            Arc::new(cookbook),
            structurer,
            extractor,
            Arc::new(config),
        )
    }

    fn tools(tmp: &TempDir) -> PantryTools {
        tools_with(tmp, Arc::new(EchoStructurer), Arc::new(StaticLines(vec![])))
    }

    fn add_params(ingredient: &str, quantity: Option<f64>, unit: Option<&str>) -> Parameters<AddIngredientParams> {
        Parameters(AddIngredientParams {
            ingredient: ingredient.into(),
            quantity,
            unit: unit.map(String::from),
            category: None,
        })
    }

    fn fridge_json(tools: &PantryTools) -> serde_json::Value {
        let pantry = tools.pantry.lock().unwrap();
        serde_json::to_value(pantry.fridge().records()).unwrap()
    }

    #[tokio::test]
    async fn fridge_add_merges_and_reads_back() {
        let tmp = TempDir::new().unwrap();
        let tools = tools(&tmp);

        tools
            .add_ingredient_to_fridge(add_params("mleko", Some(1.0), Some("l")))
            .await
            .unwrap();
        let second = tools
            .add_ingredient_to_fridge(add_params("mleko", Some(1.0), Some("l")))
            .await
            .unwrap();
        assert!(second.contains("merged"));

        let listed: serde_json::Value =
            serde_json::from_str(&tools.read_fridge().await.unwrap()).unwrap();
        assert_eq!(
            listed,
            serde_json::json!([{"ingredient": "mleko", "quantity": 2, "unit": "l", "category": "Inne"}])
        );
    }

    #[tokio::test]
    async fn names_are_trimmed_before_lookup() {
        let tmp = TempDir::new().unwrap();
        let tools = tools(&tmp);

        tools
            .add_ingredient_to_fridge(add_params("  mleko ", Some(2.0), Some("l")))
            .await
            .unwrap();
        let response = tools
            .remove_ingredient_from_fridge(Parameters(RemoveIngredientParams {
                ingredient: "mleko\n".into(),
                quantity: Some(1.0),
                unit: Some("l".into()),
            }))
            .await
            .unwrap();

        assert!(response.contains("decremented"));
        assert_eq!(fridge_json(&tools)[0]["ingredient"], "mleko");
    }

    #[tokio::test]
    async fn quantity_defaults_to_one() {
        let tmp = TempDir::new().unwrap();
        let tools = tools(&tmp);

        tools
            .add_ingredient_to_fridge(add_params("cebula", None, None))
            .await
            .unwrap();
        assert_eq!(fridge_json(&tools)[0]["quantity"], 1);
    }

    #[tokio::test]
    async fn invalid_quantity_is_an_error_message() {
        let tmp = TempDir::new().unwrap();
        let tools = tools(&tmp);

        let err = tools
            .add_ingredient_to_fridge(add_params("cukier", Some(-2.0), None))
            .await
            .unwrap_err();
        assert!(err.contains("quantity"));
        assert_eq!(fridge_json(&tools), serde_json::json!([]));
    }

    #[tokio::test]
    async fn removing_absent_item_reports_not_found() {
        let tmp = TempDir::new().unwrap();
        let tools = tools(&tmp);

        let response = tools
            .remove_ingredient_from_fridge(Parameters(RemoveIngredientParams {
                ingredient: "brokuły".into(),
                quantity: Some(1.0),
                unit: None,
            }))
            .await
            .unwrap();

        let response: serde_json::Value = serde_json::from_str(&response).unwrap();
        assert_eq!(response["result"]["status"], "not_found");
        assert!(response["message"].as_str().unwrap().contains("brokuły"));
    }

    #[tokio::test]
    async fn shopping_list_add_goes_through_structuring() {
        let tmp = TempDir::new().unwrap();
        let tools = tools(&tmp);

        tools
            .add_ingredient_to_shopping_list(Parameters(AddToShoppingListParams {
                ingredient: "jogurt".into(),
                quantity: Some(3.0),
            }))
            .await
            .unwrap();

        let listed: serde_json::Value =
            serde_json::from_str(&tools.read_shopping_list().await.unwrap()).unwrap();
        assert_eq!(
            listed,
            serde_json::json!([{"ingredient": "jogurt", "quantity": 3, "unit": "szt", "category": "Nabiał"}])
        );
    }

    #[tokio::test]
    async fn structuring_failure_leaves_list_untouched() {
        let tmp = TempDir::new().unwrap();
        let tools = tools_with(&tmp, Arc::new(FailingStructurer), Arc::new(StaticLines(vec![])));

        let err = tools
            .add_ingredient_to_shopping_list(Parameters(AddToShoppingListParams {
                ingredient: "jogurt".into(),
                quantity: None,
            }))
            .await
            .unwrap_err();

        assert!(err.contains("could not understand"));
        assert_eq!(tools.read_shopping_list().await.unwrap(), "[]");
    }

    #[tokio::test]
    async fn missing_recipe_ingredients_go_to_shopping_list() {
        let tmp = TempDir::new().unwrap();
        let tools = tools(&tmp);
        tools
            .add_ingredient_to_fridge(add_params("Jajka", Some(6.0), Some("szt")))
            .await
            .unwrap();

        let message = tools
            .add_missing_ingredients_for_recipe(Parameters(RecipeParams {
                recipe_title: "jajecznica".into(),
            }))
            .await
            .unwrap();
        assert!(message.contains("Added 2"));

        let listed: serde_json::Value =
            serde_json::from_str(&tools.read_shopping_list().await.unwrap()).unwrap();
        assert_eq!(listed[0]["ingredient"], "masło");
        assert_eq!(listed[0]["category"], "Brakujące do: Jajecznica na maśle");
        assert_eq!(listed[1]["ingredient"], "szczypiorek");
    }

    #[tokio::test]
    async fn unknown_recipe_is_a_message() {
        let tmp = TempDir::new().unwrap();
        let tools = tools(&tmp);

        let message = tools
            .add_missing_ingredients_for_recipe(Parameters(RecipeParams {
                recipe_title: "bigos".into(),
            }))
            .await
            .unwrap();
        assert!(message.contains("No recipe matches"));
        assert_eq!(tools.read_shopping_list().await.unwrap(), "[]");
    }

    #[tokio::test]
    async fn recipe_file_is_written_to_export_dir() {
        let tmp = TempDir::new().unwrap();
        let tools = tools(&tmp);

        let message = tools
            .create_shopping_list_file_for_recipe(Parameters(RecipeParams {
                recipe_title: "Jajecznica".into(),
            }))
            .await
            .unwrap();
        assert!(message.contains("3 missing"));

        let path = tmp
            .path()
            .join("exports")
            .join("lista_zakupow_Jajecznica_na_maśle.txt");
        let text = std::fs::read_to_string(path).unwrap();
        assert!(text.contains("- [ ] szczypiorek"));
    }

    #[tokio::test]
    async fn photo_import_adds_every_line() {
        let tmp = TempDir::new().unwrap();
        let image = tmp.path().join("lista.jpg");
        std::fs::write(&image, b"not really a jpeg").unwrap();
        let tools = tools_with(
            &tmp,
            Arc::new(LinesStructurer),
            Arc::new(StaticLines(vec!["mleko", "chleb", "mleko"])),
        );

        let response = tools
            .import_shopping_list_photo(Parameters(ImportPhotoParams {
                path: image.to_string_lossy().into_owned(),
                list: None,
            }))
            .await
            .unwrap();

        let response: serde_json::Value = serde_json::from_str(&response).unwrap();
        assert_eq!(response["list"], "shopping_list");
        assert_eq!(response["result"]["added"], 2);
        assert_eq!(response["result"]["merged"], 1);
    }

    #[tokio::test]
    async fn photo_import_rejects_unknown_list() {
        let tmp = TempDir::new().unwrap();
        let tools = tools(&tmp);

        let err = tools
            .import_shopping_list_photo(Parameters(ImportPhotoParams {
                path: "x.jpg".into(),
                list: Some("freezer".into()),
            }))
            .await
            .unwrap_err();
        assert!(err.contains("unknown list"));
    }
}
