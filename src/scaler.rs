//! # Ingredient Scaler
//!
//! Multiplies a recipe's parsed quantities by target servings / declared
//! servings. Mass and volume keep full precision; counts are rounded to whole
//! numbers since nobody buys 2.33 onions.

use crate::errors::ShoppingError;
use crate::ingredient_model::{Dimension, IngredientLine, Quantity};
use crate::unit_registry::UnitRegistry;
use log::{debug, warn};

/// Compute the scale factor for a recipe
///
/// Both servings counts must be positive.
pub fn scale_factor(recipe_id: &str, declared: i32, target: i32) -> Result<f64, ShoppingError> {
    if declared <= 0 || target <= 0 {
        warn!(
            "Recipe {}: invalid servings (declared {}, target {}), skipping",
            recipe_id, declared, target
        );
        return Err(ShoppingError::ScalingConfig {
            recipe_id: recipe_id.to_string(),
            declared,
            target,
        });
    }
    Ok(f64::from(target) / f64::from(declared))
}

/// Scale every line of one recipe by a factor from [`scale_factor`]
pub fn scale_lines(
    lines: &[IngredientLine],
    factor: f64,
    registry: &UnitRegistry,
) -> Vec<IngredientLine> {
    if let Some(first) = lines.first() {
        debug!("Recipe {}: scale factor {}", first.recipe_id, factor);
    }

    lines
        .iter()
        .map(|line| IngredientLine {
            quantity: scale_quantity(&line.quantity, factor, registry),
            ..line.clone()
        })
        .collect()
}

/// Scale one quantity, rounding counts to whole numbers
pub fn scale_quantity(quantity: &Quantity, factor: f64, registry: &UnitRegistry) -> Quantity {
    let scaled = quantity.scaled(factor);
    match registry.dimension_of(scaled.unit.as_deref()) {
        Ok(Dimension::Mass) | Ok(Dimension::Volume) => scaled,
        // Unknown units cannot be converted either, treat them like counts
        Ok(Dimension::Count) | Ok(Dimension::Unspecified) | Err(_) => Quantity {
            amount: round_count(scaled.amount),
            unit: scaled.unit,
        },
    }
}

/// Round a count half up to a whole number, never below one for a positive amount
pub fn round_count(amount: f64) -> f64 {
    if amount <= 0.0 {
        0.0
    } else {
        (amount + 0.5).floor().max(1.0)
    }
}
