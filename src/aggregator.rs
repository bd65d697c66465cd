//! # Ingredient Aggregator
//!
//! Merges scaled ingredient lines from any number of recipes into one item per
//! descriptor. Within an item, amounts are summed per dimension: mass and
//! volume after conversion to their base unit, counts per count unit, and
//! unit-less amounts directly. Quantities from different dimensions are kept
//! side by side, never merged and never dropped.
//!
//! The result does not depend on the order lines are added in: groups live in
//! an ordered map keyed by descriptor, and amounts are sorted before summing so
//! floating point addition always happens in the same order.

use crate::errors::ShoppingError;
use crate::ingredient_model::{AggregatedItem, Descriptor, Dimension, IngredientLine, Quantity};
use crate::unit_registry::UnitRegistry;
use log::{debug, trace, warn};
use std::collections::{BTreeMap, BTreeSet};

/// Sub-bucket of an item, one per reported quantity
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum BucketKey {
    Mass,
    Volume,
    /// Count units do not convert into each other, so each keeps its own total
    Count(String),
    Unspecified,
}

#[derive(Debug, Default)]
struct Group {
    buckets: BTreeMap<BucketKey, Vec<f64>>,
    /// Quantities that failed conversion, listed as-is
    unmerged: Vec<Quantity>,
    sources: BTreeSet<String>,
    /// (recipe id, name as written); the first one names the item
    names: BTreeSet<(String, String)>,
    extra_name: Option<String>,
}

/// Accumulates ingredient lines into aggregated items
pub struct Aggregator<'a> {
    registry: &'a UnitRegistry,
    groups: BTreeMap<Descriptor, Group>,
    warnings: Vec<ShoppingError>,
}

impl<'a> Aggregator<'a> {
    pub fn new(registry: &'a UnitRegistry) -> Self {
        Self {
            registry,
            groups: BTreeMap::new(),
            warnings: Vec::new(),
        }
    }

    /// Add one scaled line; excluded lines are ignored
    pub fn add_line(&mut self, line: &IngredientLine) {
        if line.excluded {
            trace!("Skipping excluded ingredient '{}'", line.descriptor);
            return;
        }

        let registry = self.registry;
        let group = self.groups.entry(line.descriptor.clone()).or_default();
        group.sources.insert(line.recipe_id.clone());
        if !line.display_name.is_empty() {
            group
                .names
                .insert((line.recipe_id.clone(), line.display_name.clone()));
        }

        let quantity = &line.quantity;
        let bucket = match registry.dimension_of(quantity.unit.as_deref()) {
            Ok(Dimension::Unspecified) => Ok((BucketKey::Unspecified, quantity.amount)),
            Ok(Dimension::Count) => Ok((
                BucketKey::Count(canonical_unit(registry, quantity)),
                quantity.amount,
            )),
            Ok(dimension) => {
                let key = if dimension == Dimension::Mass {
                    BucketKey::Mass
                } else {
                    BucketKey::Volume
                };
                let unit = quantity.unit.as_deref().unwrap_or_default();
                registry.to_base(quantity.amount, unit).map(|base| (key, base))
            }
            Err(err) => Err(err),
        };

        match bucket {
            Ok((key, amount)) => group.buckets.entry(key).or_default().push(amount),
            Err(err) => {
                warn!(
                    "Could not merge {:?} of '{}': {}; listing it separately",
                    quantity, line.descriptor, err
                );
                group.unmerged.push(quantity.clone());
                self.warnings.push(err.into());
            }
        }
    }

    /// Add a manually typed item as a unit-less quantity of one
    ///
    /// The text bypasses parsing: only case and whitespace are folded.
    pub fn add_extra_item(&mut self, text: &str) {
        let Some(descriptor) = Descriptor::from_raw(text) else {
            return;
        };
        debug!("Adding extra item '{}'", descriptor);
        let name = descriptor.to_string();
        let group = self.groups.entry(descriptor).or_default();
        group.extra_name.get_or_insert(name);
        group
            .buckets
            .entry(BucketKey::Unspecified)
            .or_default()
            .push(1.0);
    }

    /// Produce the aggregated items, ordered by descriptor, and the warnings raised
    pub fn finish(self) -> (Vec<AggregatedItem>, Vec<ShoppingError>) {
        let registry = self.registry;
        let mut warnings = self.warnings;
        let mut items = Vec::with_capacity(self.groups.len());

        for (descriptor, group) in self.groups {
            let mut quantities = Vec::with_capacity(group.buckets.len() + group.unmerged.len());

            for (key, mut amounts) in group.buckets {
                amounts.sort_by(f64::total_cmp);
                let total: f64 = amounts.iter().sum();

                match key {
                    BucketKey::Mass | BucketKey::Volume => {
                        let dimension = if key == BucketKey::Mass {
                            Dimension::Mass
                        } else {
                            Dimension::Volume
                        };
                        match registry.preferred_display(dimension, total) {
                            Ok(quantity) => quantities.push(quantity),
                            Err(err) => {
                                warn!(
                                    "No display unit for {} of '{}': {}",
                                    dimension, descriptor, err
                                );
                                let base = registry.base_unit(dimension);
                                quantities.push(Quantity::new(total, base));
                                warnings.push(err.into());
                            }
                        }
                    }
                    BucketKey::Count(unit) => quantities.push(Quantity::new(total, Some(&unit))),
                    BucketKey::Unspecified => quantities.push(Quantity::unitless(total)),
                }
            }

            let mut unmerged = group.unmerged;
            unmerged.sort_by(|a, b| {
                a.unit
                    .cmp(&b.unit)
                    .then_with(|| a.amount.total_cmp(&b.amount))
            });
            quantities.extend(unmerged);

            let display_name = group
                .names
                .into_iter()
                .next()
                .map(|(_, name)| name)
                .or(group.extra_name)
                .unwrap_or_else(|| descriptor.to_string());

            let mut item = AggregatedItem::new(descriptor, quantities);
            item.display_name = display_name;
            item.source_recipes = group.sources;
            items.push(item);
        }

        debug!("Aggregated {} items", items.len());
        (items, warnings)
    }
}

/// Aggregate a batch of scaled lines
///
/// # Examples
///
/// ```rust
/// use shopping_list::aggregator::aggregate;
/// use shopping_list::ingredient_model::{Descriptor, IngredientLine, Quantity};
/// use shopping_list::unit_registry::UnitRegistry;
///
/// let registry = UnitRegistry::standard();
/// let chicken = |recipe: &str| IngredientLine {
///     raw_text: "500g chicken".to_string(),
///     quantity: Quantity::new(500.0, Some("g")),
///     descriptor: Descriptor::from_raw("chicken").unwrap(),
///     display_name: "chicken".to_string(),
///     recipe_id: recipe.to_string(),
///     servings_declared: 4,
///     servings_target: 4,
///     excluded: false,
/// };
///
/// let (items, warnings) = aggregate(&[chicken("curry"), chicken("soup")], &registry);
/// assert!(warnings.is_empty());
/// assert_eq!(items.len(), 1);
/// assert_eq!(items[0].quantities, vec![Quantity::new(1.0, Some("kg"))]);
/// ```
pub fn aggregate(
    lines: &[IngredientLine],
    registry: &UnitRegistry,
) -> (Vec<AggregatedItem>, Vec<ShoppingError>) {
    let mut aggregator = Aggregator::new(registry);
    for line in lines {
        aggregator.add_line(line);
    }
    aggregator.finish()
}

fn canonical_unit(registry: &UnitRegistry, quantity: &Quantity) -> String {
    let unit = quantity.unit.as_deref().unwrap_or_default();
    registry
        .lookup(unit)
        .map(|def| def.canonical.to_string())
        .unwrap_or_else(|| unit.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(recipe: &str, descriptor: &str, quantity: Quantity) -> IngredientLine {
        IngredientLine {
            raw_text: format!("{:?} {}", quantity, descriptor),
            quantity,
            descriptor: Descriptor::from_raw(descriptor).unwrap(),
            display_name: descriptor.to_string(),
            recipe_id: recipe.to_string(),
            servings_declared: 4,
            servings_target: 4,
            excluded: false,
        }
    }

    #[test]
    fn test_mass_sums_across_units() {
        let registry = UnitRegistry::standard();
        let lines = vec![
            line("a", "butter", Quantity::new(0.5, Some("kg"))),
            line("b", "butter", Quantity::new(250.0, Some("g"))),
        ];
        let (items, _) = aggregate(&lines, &registry);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantities, vec![Quantity::new(750.0, Some("g"))]);
        assert_eq!(
            items[0].source_recipes.iter().cloned().collect::<Vec<_>>(),
            vec!["a".to_string(), "b".to_string()]
        );
    }

    #[test]
    fn test_dimensions_stay_separate() {
        let registry = UnitRegistry::standard();
        let lines = vec![
            line("a", "garlic", Quantity::new(2.0, Some("clove"))),
            line("b", "garlic", Quantity::new(200.0, Some("g"))),
        ];
        let (items, warnings) = aggregate(&lines, &registry);
        assert!(warnings.is_empty());
        assert_eq!(
            items[0].quantities,
            vec![
                Quantity::new(200.0, Some("g")),
                Quantity::new(2.0, Some("clove")),
            ]
        );
    }

    #[test]
    fn test_count_units_keep_their_own_totals() {
        let registry = UnitRegistry::standard();
        let lines = vec![
            line("a", "tomato", Quantity::new(1.0, Some("can"))),
            line("b", "tomato", Quantity::new(2.0, Some("can"))),
            line("b", "tomato", Quantity::unitless(3.0)),
        ];
        let (items, _) = aggregate(&lines, &registry);
        assert_eq!(
            items[0].quantities,
            vec![Quantity::new(3.0, Some("can")), Quantity::unitless(3.0)]
        );
    }

    #[test]
    fn test_excluded_lines_are_dropped() {
        let registry = UnitRegistry::standard();
        let mut water = line("a", "water", Quantity::new(1.0, Some("cup")));
        water.excluded = true;
        let (items, _) = aggregate(&[water], &registry);
        assert!(items.is_empty());
    }

    #[test]
    fn test_unknown_unit_is_listed_unmerged() {
        let registry = UnitRegistry::standard();
        let lines = vec![
            line("a", "saffron", Quantity::new(1.0, Some("smidgen"))),
            line("b", "saffron", Quantity::new(1.0, Some("g"))),
        ];
        let (items, warnings) = aggregate(&lines, &registry);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind(), "unit");
        assert_eq!(
            items[0].quantities,
            vec![Quantity::new(1.0, Some("g")), Quantity::new(1.0, Some("smidgen"))]
        );
    }

    #[test]
    fn test_extra_items_merge_with_unitless_amounts() {
        let registry = UnitRegistry::standard();
        let mut aggregator = Aggregator::new(&registry);
        aggregator.add_line(&line("a", "lemon", Quantity::unitless(2.0)));
        aggregator.add_extra_item(" Lemon ");
        aggregator.add_extra_item("Paper Towels");
        aggregator.add_extra_item("   ");
        let (items, _) = aggregator.finish();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].descriptor.as_str(), "lemon");
        assert_eq!(items[0].quantities, vec![Quantity::unitless(3.0)]);
        assert_eq!(items[1].descriptor.as_str(), "paper towels");
        assert!(items[1].source_recipes.is_empty());
    }

    #[test]
    fn test_display_name_comes_from_lowest_recipe_id() {
        let registry = UnitRegistry::standard();
        let mut stew = line("stew", "onion", Quantity::unitless(1.0));
        stew.display_name = "onion".to_string();
        let mut curry = line("curry", "onion", Quantity::unitless(2.0));
        curry.display_name = "onions".to_string();

        let (forward, _) = aggregate(&[stew.clone(), curry.clone()], &registry);
        let (backward, _) = aggregate(&[curry, stew], &registry);
        assert_eq!(forward[0].display_name, "onions");
        assert_eq!(forward, backward);

        let mut aggregator = Aggregator::new(&registry);
        aggregator.add_extra_item("Dish  Soap");
        let (items, _) = aggregator.finish();
        assert_eq!(items[0].display_name, "dish soap");
    }

    #[test]
    fn test_order_independence() {
        let registry = UnitRegistry::standard();
        let mut lines = vec![
            line("a", "milk", Quantity::new(0.1, Some("l"))),
            line("b", "milk", Quantity::new(0.2, Some("cup"))),
            line("c", "milk", Quantity::new(0.3, Some("tbsp"))),
            line("c", "onion", Quantity::unitless(1.0)),
        ];
        let (forward, _) = aggregate(&lines, &registry);
        lines.reverse();
        let (backward, _) = aggregate(&lines, &registry);
        assert_eq!(forward, backward);
    }
}
