//! MCP server initialization for stdio and Streamable HTTP transports.
//!
//! Provides [`serve_stdio`] and [`serve_http`] entry points that wire up the
//! pantry lists, recipe store, and intake services into a running server.

use crate::config::PantryConfig;
use crate::intake::{self, IngredientStructurer, TextExtractor};
use crate::pantry::Pantry;
use crate::recipes::{RecipeSource, SqliteRecipeStore};
use crate::tools::PantryTools;
use anyhow::{Context, Result};
use rmcp::ServiceExt;
use std::sync::{Arc, Mutex};

/// Everything a [`PantryTools`] handler needs, shared across sessions.
#[derive(Clone)]
struct SharedState {
    pantry: Arc<Mutex<Pantry>>,
    recipes: Arc<dyn RecipeSource>,
    structurer: Arc<dyn IngredientStructurer>,
    extractor: Arc<dyn TextExtractor>,
    config: Arc<PantryConfig>,
}

impl SharedState {
    fn tools(&self) -> PantryTools {
        PantryTools::new(
            self.pantry.clone(),
            self.recipes.clone(),
            self.structurer.clone(),
            self.extractor.clone(),
            self.config.clone(),
        )
    }
}

/// Shared setup: load both lists, open the recipe store, build the intake
/// clients. Missing credentials do not stop the server; the affected tools
/// report it instead.
fn setup_shared_state(config: PantryConfig) -> Result<SharedState> {
    let data_dir = config.resolved_data_dir();
    let pantry = Pantry::open(&data_dir)
        .with_context(|| format!("failed to open pantry lists in {}", data_dir.display()))?;
    tracing::info!(
        data_dir = %data_dir.display(),
        fridge = pantry.fridge().records().len(),
        shopping_list = pantry.shopping_list().records().len(),
        "pantry lists ready"
    );

    let db_path = config.resolved_recipes_db();
    let recipes = SqliteRecipeStore::open(&db_path)?;
    tracing::info!(db = %db_path.display(), "recipe store ready");

    let structurer = intake::create_structurer(&config.structuring);
    let extractor = intake::create_extractor(&config.vision);

    Ok(SharedState {
        pantry: Arc::new(Mutex::new(pantry)),
        recipes: Arc::new(recipes),
        structurer,
        extractor,
        config: Arc::new(config),
    })
}

/// Start the MCP server over stdio transport.
pub async fn serve_stdio(config: PantryConfig) -> Result<()> {
    tracing::info!("starting pantry MCP server on stdio");

    let state = setup_shared_state(config)?;
    let transport = rmcp::transport::stdio();

    let server = state.tools().serve(transport).await?;
    tracing::info!("MCP server running, waiting for client");

    server.waiting().await?;
    tracing::info!("MCP server shut down");

    Ok(())
}

/// Start the MCP server over Streamable HTTP transport at `/mcp`.
pub async fn serve_http(config: PantryConfig) -> Result<()> {
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);

    tracing::info!(addr = %bind_addr, "starting pantry MCP server on HTTP");

    let state = setup_shared_state(config)?;

    let service = rmcp::transport::streamable_http_server::StreamableHttpService::new(
        move || Ok(state.tools()),
        rmcp::transport::streamable_http_server::session::local::LocalSessionManager::default()
            .into(),
        Default::default(),
    );

    let router = axum::Router::new().nest_service("/mcp", service);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    tracing::info!(addr = %bind_addr, "MCP server listening at http://{bind_addr}/mcp");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl-c");
            }
            tracing::info!("shutting down HTTP server");
        })
        .await?;

    Ok(())
}
