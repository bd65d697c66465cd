//! # Ingredient and Quantity Data Model
//!
//! This module defines the data structures that flow through the shopping list
//! pipeline: parsed ingredient lines, their quantities, and the aggregated items
//! produced when the same ingredient shows up in several recipes.
//!
//! ## Core Concepts
//!
//! - **Quantity**: an amount with an optional unit (`None` means a plain count, "2 onions")
//! - **Dimension**: the family a unit belongs to (mass, volume, count, unspecified)
//! - **Descriptor**: the normalized ingredient name used as the aggregation key
//! - **AggregatedItem**: one shopping list entry, holding one quantity per dimension
//!
//! ## Usage
//!
//! ```rust
//! use shopping_list::ingredient_model::{Descriptor, Quantity};
//!
//! let flour = Quantity::new(250.0, Some("g"));
//! let onions = Quantity::unitless(2.0);
//! assert!(onions.is_unitless());
//! assert_eq!(Descriptor::from_raw("  Red  Onion ").unwrap().as_str(), "red onion");
//! # let _ = flour;
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Zone label given to items that match no configured zone
pub const UNZONED: &str = "unzoned";

/// A measured amount with an optional unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    /// Non-negative amount; zero marks "to taste" items
    pub amount: f64,

    /// Canonical unit name, or `None` for unit-less counts
    pub unit: Option<String>,
}

/// Families of mutually convertible units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    /// Weights, based on grams
    Mass,
    /// Volumes, based on milliliters
    Volume,
    /// Discrete named units (cloves, cans, bunches)
    Count,
    /// No unit at all ("2 onions")
    Unspecified,
}

/// Normalized ingredient name, the key used to merge lines across recipes
///
/// Never empty. Built by the parser's normalization step or, for manually
/// typed items, from the raw text with only case and whitespace folded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Descriptor(String);

/// One ingredient line of one recipe, after parsing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientLine {
    /// The line as it appeared in the recipe
    pub raw_text: String,

    /// Parsed (and possibly scaled) quantity
    pub quantity: Quantity,

    /// Aggregation key
    pub descriptor: Descriptor,

    /// Ingredient name as written, cleaned but not singularized
    #[serde(default)]
    pub display_name: String,

    /// Recipe the line belongs to
    pub recipe_id: String,

    /// Servings the recipe is written for
    pub servings_declared: i32,

    /// Servings the shopper wants to cook
    pub servings_target: i32,

    /// Matched the exclude list; never reaches aggregation
    pub excluded: bool,
}

/// A merged shopping list entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedItem {
    pub descriptor: Descriptor,

    /// Name shown on the list row, taken from the contributing recipe with the
    /// lowest id; the descriptor when no recipe wording is known
    pub display_name: String,

    /// Mass, volume, one entry per count unit, unit-less; unmerged quantities last
    pub quantities: Vec<Quantity>,

    /// Every recipe that contributed to this item
    pub source_recipes: BTreeSet<String>,

    pub is_pantry: bool,

    /// Label of the first matching zone, or [`UNZONED`]
    pub zone: String,
}

/// Rendered shopping list row handed to the UI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayItem {
    /// Human readable line, e.g. "1kg chicken"
    pub display: String,
    pub descriptor: String,
    pub zone: String,
}

/// A recipe picked by the shopper together with the servings they want
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeSelection {
    pub recipe_id: String,
    pub raw_ingredient_lines: Vec<String>,
    pub declared_servings: i32,
    pub target_servings: i32,
}

impl Quantity {
    /// Create a quantity with an optional unit
    pub fn new(amount: f64, unit: Option<&str>) -> Self {
        Self {
            amount,
            unit: unit.map(str::to_string),
        }
    }

    /// Create a quantity without a unit
    pub fn unitless(amount: f64) -> Self {
        Self { amount, unit: None }
    }

    /// Check if this quantity has no unit
    pub fn is_unitless(&self) -> bool {
        self.unit.is_none()
    }

    /// Return a copy with the amount multiplied by `factor`
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            amount: self.amount * factor,
            unit: self.unit.clone(),
        }
    }
}

impl Dimension {
    /// Get a human-readable name for the dimension
    pub fn display_name(&self) -> &'static str {
        match self {
            Dimension::Mass => "mass",
            Dimension::Volume => "volume",
            Dimension::Count => "count",
            Dimension::Unspecified => "unspecified",
        }
    }

    /// Check if amounts in this dimension can be converted between units
    pub fn is_convertible(&self) -> bool {
        matches!(self, Dimension::Mass | Dimension::Volume)
    }
}

impl Descriptor {
    /// Build a descriptor from free text, folding case and whitespace only
    ///
    /// Returns `None` when nothing but whitespace is left.
    pub fn from_raw(text: &str) -> Option<Self> {
        let folded = text
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        if folded.is_empty() {
            None
        } else {
            Some(Self(folded))
        }
    }

    /// Wrap an already normalized, non-empty name
    pub(crate) fn from_normalized(name: String) -> Self {
        debug_assert!(!name.is_empty());
        Self(name)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AggregatedItem {
    /// Create an unzoned, non-pantry item
    pub fn new(descriptor: Descriptor, quantities: Vec<Quantity>) -> Self {
        Self {
            display_name: descriptor.to_string(),
            descriptor,
            quantities,
            source_recipes: BTreeSet::new(),
            is_pantry: false,
            zone: UNZONED.to_string(),
        }
    }

    /// Check if the item was assigned to a configured zone
    pub fn is_zoned(&self) -> bool {
        self.zone != UNZONED
    }
}

impl RecipeSelection {
    pub fn new(
        recipe_id: &str,
        raw_ingredient_lines: Vec<String>,
        declared_servings: i32,
        target_servings: i32,
    ) -> Self {
        Self {
            recipe_id: recipe_id.to_string(),
            raw_ingredient_lines,
            declared_servings,
            target_servings,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
