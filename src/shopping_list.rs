//! # Shopping List Builder
//!
//! Runs the whole pipeline for one request: parse each selected recipe, scale
//! it, merge everything into one item per ingredient, move pantry staples
//! aside, order the rest along the store zones and render it.
//!
//! A build is a pure function of its inputs. Problems with individual lines or
//! recipes are collected as warnings on the result; a request with nothing
//! usable in it produces an empty list, not an error.

use crate::aggregator::Aggregator;
use crate::config::PipelineConfig;
use crate::errors::ShoppingError;
use crate::ingredient_model::{AggregatedItem, DisplayItem, RecipeSelection, UNZONED};
use crate::ingredient_parser::parse_recipe_lines;
use crate::pantry::{filter_pantry, PantryInclusion, PantryRule};
use crate::scaler::{scale_factor, scale_lines};
use crate::unit_registry::{UnitRegistry, STANDARD_UNITS};
use crate::zones::{assign_zone, sort_by_zone, ZoneRule};
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// Heading of the trailing pantry section in the text output
pub const PANTRY_HEADING: &str = "Pantry (already have):";

/// Everything a single build needs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShoppingRequest {
    pub selections: Vec<RecipeSelection>,
    pub pantry_rules: Vec<PantryRule>,
    pub zone_rules: Vec<ZoneRule>,
    pub pantry_inclusion: PantryInclusion,
    /// Free-text items added as-is, one unit each
    pub extra_items: Vec<String>,
}

/// The finished shopping list
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ShoppingList {
    /// Rows to buy, in store walking order
    pub shopping_items: Vec<DisplayItem>,
    /// Descriptors of pantry items left off the list, sorted
    pub pantry_items: Vec<String>,
    /// One row per line, pantry section last
    pub formatted_text: String,

    /// Aggregated items behind `shopping_items`, same order
    pub items: Vec<AggregatedItem>,
    /// Aggregated items behind `pantry_items`, same order
    pub pantry: Vec<AggregatedItem>,
    pub warnings: Vec<ShoppingError>,
}

impl ShoppingList {
    pub fn is_empty(&self) -> bool {
        self.shopping_items.is_empty() && self.pantry_items.is_empty()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// Number of warnings of one kind, see [`ShoppingError::kind`]
    pub fn count_of(&self, kind: &str) -> usize {
        self.warnings.iter().filter(|w| w.kind() == kind).count()
    }

    /// Lines that fell back to a quantity of one
    pub fn degraded_count(&self) -> usize {
        self.count_of("parse_degraded")
    }
}

/// Builds shopping lists against one unit registry and pipeline configuration
pub struct ShoppingListBuilder<'a> {
    registry: &'a UnitRegistry,
    config: PipelineConfig,
}

impl<'a> ShoppingListBuilder<'a> {
    pub fn new(registry: &'a UnitRegistry, config: PipelineConfig) -> Self {
        Self { registry, config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn build(&self, request: &ShoppingRequest) -> ShoppingList {
        info!(
            "Building shopping list from {} recipes and {} extra items",
            request.selections.len(),
            request.extra_items.len()
        );

        let mut warnings = Vec::new();
        let mut aggregator = Aggregator::new(self.registry);

        for selection in &request.selections {
            let factor = match scale_factor(
                &selection.recipe_id,
                selection.declared_servings,
                selection.target_servings,
            ) {
                Ok(factor) => factor,
                Err(err) => {
                    warnings.push(err);
                    continue;
                }
            };

            let parsed = parse_recipe_lines(selection, self.registry, &self.config.exclude);
            warnings.extend(parsed.warnings);

            for line in scale_lines(&parsed.lines, factor, self.registry) {
                aggregator.add_line(&line);
            }
        }

        for extra in &request.extra_items {
            aggregator.add_extra_item(extra);
        }

        let (items, aggregation_warnings) = aggregator.finish();
        warnings.extend(aggregation_warnings);

        let split = filter_pantry(items, &request.pantry_rules, &request.pantry_inclusion);
        let mut shopping = split.shopping;
        sort_by_zone(&mut shopping, &request.zone_rules);

        let mut pantry = split.pantry;
        for item in pantry.iter_mut() {
            item.zone = assign_zone(item.descriptor.as_str(), &request.zone_rules)
                .map_or_else(|| UNZONED.to_string(), |rule| rule.zone_label.clone());
        }

        let shopping_items: Vec<DisplayItem> = shopping
            .iter()
            .map(|item| DisplayItem {
                display: render_item(item, self.registry),
                descriptor: item.descriptor.to_string(),
                zone: item.zone.clone(),
            })
            .collect();
        let pantry_lines: Vec<String> = pantry
            .iter()
            .map(|item| render_item(item, self.registry))
            .collect();
        let formatted_text = render_text(&shopping_items, &pantry_lines);

        debug!(
            "Built list: {} to buy, {} in pantry, {} warnings",
            shopping_items.len(),
            pantry.len(),
            warnings.len()
        );

        ShoppingList {
            shopping_items,
            pantry_items: pantry.iter().map(|item| item.descriptor.to_string()).collect(),
            formatted_text,
            items: shopping,
            pantry,
            warnings,
        }
    }
}

/// Build a shopping list with the standard units and default settings
///
/// # Examples
///
/// ```rust
/// use shopping_list::ingredient_model::RecipeSelection;
/// use shopping_list::pantry::PantryInclusion;
/// use shopping_list::shopping_list::build_shopping_list;
///
/// let soup = RecipeSelection::new("soup", vec!["500g chicken".to_string()], 4, 4);
/// let stew = RecipeSelection::new("stew", vec!["500g chicken".to_string()], 4, 4);
///
/// let list = build_shopping_list(&[soup, stew], &[], &[], &PantryInclusion::none(), &[]);
/// assert_eq!(list.formatted_text, "1kg chicken");
/// ```
pub fn build_shopping_list(
    selections: &[RecipeSelection],
    pantry_rules: &[PantryRule],
    zone_rules: &[ZoneRule],
    pantry_inclusion: &PantryInclusion,
    extra_items: &[String],
) -> ShoppingList {
    let request = ShoppingRequest {
        selections: selections.to_vec(),
        pantry_rules: pantry_rules.to_vec(),
        zone_rules: zone_rules.to_vec(),
        pantry_inclusion: pantry_inclusion.clone(),
        extra_items: extra_items.to_vec(),
    };
    ShoppingListBuilder::new(&STANDARD_UNITS, PipelineConfig::default()).build(&request)
}

/// Render one item as "<amount> <unit> <name>"
///
/// The name is the item's display name ("onions", not the "onion" key).
/// Zero unit-less amounts ("to taste") are dropped, a lone unit-less one is
/// implied, and several quantities are joined with " + ".
pub fn render_item(item: &AggregatedItem, registry: &UnitRegistry) -> String {
    let parts: Vec<_> = item
        .quantities
        .iter()
        .filter(|q| !(q.is_unitless() && q.amount == 0.0))
        .collect();

    let amounts = match parts.as_slice() {
        [] => String::new(),
        [single] if single.is_unitless() && single.amount == 1.0 => String::new(),
        _ => parts
            .iter()
            .map(|q| registry.format_quantity(q))
            .collect::<Vec<_>>()
            .join(" + "),
    };

    if amounts.is_empty() {
        item.display_name.clone()
    } else {
        format!("{} {}", amounts, item.display_name)
    }
}

/// Join the rows into the copy-paste text block
pub fn render_text(shopping_items: &[DisplayItem], pantry_lines: &[String]) -> String {
    let mut lines: Vec<&str> = shopping_items.iter().map(|item| item.display.as_str()).collect();

    if !pantry_lines.is_empty() {
        if !lines.is_empty() {
            lines.push("");
        }
        lines.push(PANTRY_HEADING);
        lines.extend(pantry_lines.iter().map(String::as_str));
    }

    lines.join("\n")
}
