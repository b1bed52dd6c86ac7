use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use pantry::cli;
use pantry::config::PantryConfig;
use pantry::ledger::ListKind;
use pantry::server;

#[derive(Parser)]
#[command(name = "pantry", version, about = "Fridge and shopping-list MCP server for AI agents")]
struct Cli {
    /// Config file (defaults to ~/.pantry/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the MCP server (stdio transport unless --http)
    Serve {
        /// Serve Streamable HTTP on the configured host and port
        #[arg(long)]
        http: bool,
    },
    /// Print a list
    List {
        /// fridge or shopping-list
        list: ListKind,
    },
    /// Add an item to a list
    Add {
        list: ListKind,
        ingredient: String,
        #[arg(short, long, default_value_t = 1.0)]
        quantity: f64,
        #[arg(short, long)]
        unit: Option<String>,
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Remove an amount of an item from a list
    Remove {
        list: ListKind,
        ingredient: String,
        #[arg(short, long, default_value_t = 1.0)]
        quantity: f64,
        #[arg(short, long)]
        unit: Option<String>,
    },
    /// Add the items on a photographed shopping list
    Photo {
        list: ListKind,
        image: PathBuf,
    },
    /// Manage the recipe store
    Recipes {
        #[command(subcommand)]
        action: RecipesAction,
    },
    /// Check data files and the recipe database
    Doctor,
}

#[derive(Subcommand)]
enum RecipesAction {
    /// Import crawled recipes (JSON array or JSON lines)
    Import { file: PathBuf },
    /// Show what a recipe needs that the fridge lacks
    Missing {
        title: String,
        /// Add the missing items to the shopping list
        #[arg(long, conflicts_with = "file")]
        add: bool,
        /// Write the missing items to a checklist file in the export dir
        #[arg(long)]
        file: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => PantryConfig::load_from(path)?,
        None => PantryConfig::load()?,
    };

    // Log to stderr so stdout stays clean for MCP JSON-RPC.
    let filter = EnvFilter::try_new(&config.server.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Serve { http } => {
            if http || config.server.transport == "http" {
                server::serve_http(config).await?;
            } else {
                server::serve_stdio(config).await?;
            }
        }
        Command::List { list } => cli::list::list(&config, list)?,
        Command::Add {
            list,
            ingredient,
            quantity,
            unit,
            category,
        } => cli::edit::add(&config, list, &ingredient, quantity, unit, category)?,
        Command::Remove {
            list,
            ingredient,
            quantity,
            unit,
        } => cli::edit::remove(&config, list, &ingredient, quantity, unit)?,
        Command::Photo { list, image } => cli::photo::photo(&config, list, &image).await?,
        Command::Recipes { action } => match action {
            RecipesAction::Import { file } => cli::recipes::import(&config, &file)?,
            RecipesAction::Missing { title, add, file } => {
                let mode = if add {
                    cli::recipes::MissingMode::Add
                } else if file {
                    cli::recipes::MissingMode::File
                } else {
                    cli::recipes::MissingMode::Show
                };
                cli::recipes::missing(&config, &title, mode)?;
            }
        },
        Command::Doctor => cli::doctor::doctor(&config)?,
    }

    Ok(())
}
