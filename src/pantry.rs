//! # Pantry Filter
//!
//! Splits aggregated items into what still has to be bought and what the
//! shopper already keeps at home. A pantry rule is a case-insensitive substring
//! of the descriptor; rules are scanned in order and the first hit wins.

use crate::ingredient_model::AggregatedItem;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A staple the shopper always has on hand
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PantryRule {
    /// Lower-cased substring matched against descriptors
    pub pattern: String,
}

impl PantryRule {
    pub fn new(pattern: &str) -> Self {
        Self {
            pattern: pattern.trim().to_lowercase(),
        }
    }

    pub fn matches(&self, descriptor: &str) -> bool {
        !self.pattern.is_empty() && descriptor.to_lowercase().contains(&self.pattern)
    }
}

/// Which pantry items the shopper wants on the list anyway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PantryInclusion {
    /// Every pantry match goes back on the shopping list
    All,
    /// Only these descriptors (compared case-insensitively)
    Selected(BTreeSet<String>),
}

impl PantryInclusion {
    /// Nothing re-included
    pub fn none() -> Self {
        PantryInclusion::Selected(BTreeSet::new())
    }

    /// Re-include the given descriptors
    pub fn selected<I, S>(descriptors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        PantryInclusion::Selected(
            descriptors
                .into_iter()
                .map(|d| d.as_ref().trim().to_lowercase())
                .collect(),
        )
    }

    pub fn includes(&self, descriptor: &str) -> bool {
        match self {
            PantryInclusion::All => true,
            PantryInclusion::Selected(selected) => selected.contains(&descriptor.to_lowercase()),
        }
    }
}

impl Default for PantryInclusion {
    fn default() -> Self {
        Self::none()
    }
}

impl From<bool> for PantryInclusion {
    fn from(include_all: bool) -> Self {
        if include_all {
            PantryInclusion::All
        } else {
            PantryInclusion::none()
        }
    }
}

/// Items partitioned by pantry membership
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PantrySplit {
    /// Items to buy, in input order
    pub shopping: Vec<AggregatedItem>,
    /// Pantry items left off the list, ordered by descriptor
    pub pantry: Vec<AggregatedItem>,
}

/// First rule matching the descriptor
pub fn matching_rule<'r>(descriptor: &str, rules: &'r [PantryRule]) -> Option<&'r PantryRule> {
    rules.iter().find(|rule| rule.matches(descriptor))
}

/// Mark pantry items and move the ones not re-included into their own list
pub fn filter_pantry(
    items: Vec<AggregatedItem>,
    rules: &[PantryRule],
    inclusion: &PantryInclusion,
) -> PantrySplit {
    let mut split = PantrySplit::default();

    for mut item in items {
        let descriptor = item.descriptor.as_str();
        match matching_rule(descriptor, rules) {
            Some(rule) => {
                item.is_pantry = true;
                if inclusion.includes(descriptor) {
                    debug!("Pantry item '{}' re-included", descriptor);
                    split.shopping.push(item);
                } else {
                    debug!("'{}' is in the pantry (rule '{}')", descriptor, rule.pattern);
                    split.pantry.push(item);
                }
            }
            None => split.shopping.push(item),
        }
    }

    split.pantry.sort_by(|a, b| a.descriptor.cmp(&b.descriptor));
    split
}
