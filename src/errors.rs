//! # Shopping List Error Types Module
//!
//! This module defines the warning kinds raised while building a shopping list.
//! None of them abort a request: the pipeline records them on the result and
//! keeps going with whatever input is still usable.

use crate::unit_registry::UnitError;
use serde::Serialize;

/// Which configuration text a line came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigSource {
    Pantry,
    Zones,
    ExtraItems,
}

/// Non-fatal problems found while building a shopping list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ShoppingError {
    /// Quantity or unit could not be parsed; the line was kept with a fallback quantity
    ParseDegraded { raw_text: String, reason: String },
    /// Declared or target servings not positive; the recipe was skipped
    ScalingConfig {
        recipe_id: String,
        declared: i32,
        target: i32,
    },
    /// A conversion failed during aggregation; quantities were listed unmerged
    Unit(UnitError),
    /// A configuration line was malformed and skipped
    ConfigParse {
        source: ConfigSource,
        line_number: usize,
        line: String,
        reason: String,
    },
}

impl ShoppingError {
    /// Short name of the warning kind
    pub fn kind(&self) -> &'static str {
        match self {
            ShoppingError::ParseDegraded { .. } => "parse_degraded",
            ShoppingError::ScalingConfig { .. } => "scaling_config",
            ShoppingError::Unit(_) => "unit",
            ShoppingError::ConfigParse { .. } => "config_parse",
        }
    }
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Pantry => write!(f, "pantry"),
            ConfigSource::Zones => write!(f, "zones"),
            ConfigSource::ExtraItems => write!(f, "extra items"),
        }
    }
}

impl std::fmt::Display for ShoppingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShoppingError::ParseDegraded { raw_text, reason } => {
                write!(f, "Parse degraded for '{raw_text}': {reason}")
            }
            ShoppingError::ScalingConfig {
                recipe_id,
                declared,
                target,
            } => write!(
                f,
                "Scaling config error for recipe {recipe_id}: \
                 declared servings {declared}, target servings {target}"
            ),
            ShoppingError::Unit(err) => write!(f, "Unit error: {err}"),
            ShoppingError::ConfigParse {
                source,
                line_number,
                line,
                reason,
            } => write!(
                f,
                "Config parse error in {source} line {line_number} ('{line}'): {reason}"
            ),
        }
    }
}

impl std::error::Error for ShoppingError {}

impl From<UnitError> for ShoppingError {
    fn from(err: UnitError) -> Self {
        ShoppingError::Unit(err)
    }
}
