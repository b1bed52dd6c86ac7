//! Kitchen inventory for AI agents: a fridge and a shopping list, served via MCP.
//!
//! The core is the ingredient [`ledger`]: an ordered list of
//! `(ingredient, quantity, unit, category)` records persisted as JSON, where
//! adding an item with the same name and unit increases the held quantity and
//! removing at least the held amount deletes the item. A [`pantry::Pantry`]
//! holds one ledger per list for the lifetime of a session.
//!
//! Around the ledger sit the pieces an assistant needs to keep it current:
//!
//! | Piece | Purpose |
//! |-------|---------|
//! | **Intake** | Free text or a photographed list turned into records by an LLM and OCR |
//! | **Recipes** | Local SQLite store of crawled recipes, and what a recipe still needs |
//! | **Tools** | MCP tools over the two lists, served on stdio or Streamable HTTP |
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from TOML files and environment variables
//! - [`ledger`]: Ingredient records, merge/decrement rules, JSON persistence
//! - [`pantry`]: The per-session pair of fridge and shopping-list ledgers
//! - [`intake`]: Structuring and vision clients, photo import
//! - [`recipes`]: Recipe store, crawled-recipe import, missing-ingredient planning
//! - [`db`]: SQLite initialization, schema, migrations, and health checks
//! - [`tools`] / [`server`]: MCP tool handler and transports
//! - [`cli`]: Terminal subcommands

pub mod cli;
pub mod config;
pub mod db;
pub mod intake;
pub mod ledger;
pub mod pantry;
pub mod recipes;
pub mod server;
pub mod tools;
