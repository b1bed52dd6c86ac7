//! Ingredient record and list type definitions.
//!
//! Defines [`IngredientRecord`] (one quantified item on a list), [`ListKind`]
//! (which named list a ledger holds) and the outcome types reported by
//! [`Ledger::add`](super::Ledger::add) and [`Ledger::remove`](super::Ledger::remove).

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Category assigned by `add` when the caller did not supply one.
pub const DEFAULT_CATEGORY: &str = "Inne";

/// A quantified ingredient on the fridge or shopping list.
///
/// Identity for merge and removal is the `(ingredient, unit)` pair, compared
/// exactly. `unit: None` and `unit: Some("")` are different identities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientRecord {
    /// Free-text name, matched case-sensitively.
    pub ingredient: String,
    /// Amount held. Whole numbers are written back as JSON integers.
    #[serde(serialize_with = "serialize_quantity")]
    pub quantity: f64,
    /// Unit of measure (`szt`, `kg`, `l`, `opak.`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Free-text grouping such as `Nabiał` or `Warzywa`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl IngredientRecord {
    pub fn new(ingredient: impl Into<String>, quantity: f64) -> Self {
        Self {
            ingredient: ingredient.into(),
            quantity,
            unit: None,
            category: None,
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Whether `self` and `other` share the `(ingredient, unit)` identity key.
    pub fn same_identity(&self, other: &IngredientRecord) -> bool {
        self.ingredient == other.ingredient && self.unit == other.unit
    }
}

impl fmt::Display for IngredientRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.unit {
            Some(unit) if !unit.is_empty() => {
                write!(f, "{} {} {}", self.quantity, unit, self.ingredient)?
            }
            _ => write!(f, "{} {}", self.quantity, self.ingredient)?,
        }
        if let Some(category) = &self.category {
            write!(f, " ({category})")?;
        }
        Ok(())
    }
}

/// Largest integer an f64 holds exactly (2^53).
const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;

fn serialize_quantity<S: Serializer>(quantity: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if quantity.fract() == 0.0 && quantity.abs() <= MAX_EXACT_INT {
        serializer.serialize_i64(*quantity as i64)
    } else {
        serializer.serialize_f64(*quantity)
    }
}

/// The two named lists a pantry keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListKind {
    /// What the user already has at home.
    Fridge,
    /// What the user still needs to buy.
    ShoppingList,
}

impl ListKind {
    pub const ALL: [ListKind; 2] = [ListKind::Fridge, ListKind::ShoppingList];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fridge => "fridge",
            Self::ShoppingList => "shopping_list",
        }
    }

    /// File name of the persisted list inside the data directory.
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Fridge => "fridge.json",
            Self::ShoppingList => "shopping_list.json",
        }
    }

    /// Human-facing heading.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Fridge => "Lodówka",
            Self::ShoppingList => "Lista zakupów",
        }
    }
}

impl fmt::Display for ListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ListKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fridge" => Ok(Self::Fridge),
            "shopping_list" | "shopping-list" | "shopping" => Ok(Self::ShoppingList),
            _ => Err(format!(
                "unknown list: {s} (expected 'fridge' or 'shopping_list')"
            )),
        }
    }
}

/// What `add` did with the incoming record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AddOutcome {
    /// No record shared the identity key; the record was appended.
    Appended,
    /// An existing record absorbed the quantity; `quantity` is the new total.
    Merged { quantity: f64 },
}

/// What `remove` did with the matching record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RemoveOutcome {
    /// The requested amount covered everything held; the record is gone.
    Removed,
    /// The record stays with `remaining` left.
    Decremented { remaining: f64 },
    /// Nothing matched the identity key. Content is unchanged.
    NotFound,
}

impl RemoveOutcome {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}
