//! End-to-end tests for the shopping list pipeline

use shopping_list::config::{parse_pantry_text, parse_zone_text, PipelineConfig};
use shopping_list::ingredient_model::{Quantity, RecipeSelection, UNZONED};
use shopping_list::pantry::{PantryInclusion, PantryRule};
use shopping_list::recipe_document::parse_recipe_document;
use shopping_list::shopping_list::{build_shopping_list, ShoppingListBuilder, ShoppingRequest};
use shopping_list::unit_registry::UnitRegistry;
use shopping_list::zones::zone_rules_from;

fn selection(id: &str, lines: &[&str], declared: i32, target: i32) -> RecipeSelection {
    RecipeSelection::new(
        id,
        lines.iter().map(|l| l.to_string()).collect(),
        declared,
        target,
    )
}

fn displays(list: &shopping_list::shopping_list::ShoppingList) -> Vec<&str> {
    list.shopping_items
        .iter()
        .map(|item| item.display.as_str())
        .collect()
}

#[test]
fn test_same_mass_from_two_recipes_merges_into_kilograms() {
    let list = build_shopping_list(
        &[
            selection("soup", &["500g chicken"], 4, 4),
            selection("stew", &["500g chicken"], 4, 4),
        ],
        &[],
        &[],
        &PantryInclusion::none(),
        &[],
    );

    assert_eq!(displays(&list), vec!["1kg chicken"]);
    assert_eq!(list.items[0].source_recipes.len(), 2);
}

#[test]
fn test_garlic_in_cloves_and_grams_keeps_both_quantities() {
    let list = build_shopping_list(
        &[
            selection("a", &["2 cloves garlic"], 4, 4),
            selection("b", &["200g garlic"], 4, 4),
        ],
        &[],
        &[],
        &PantryInclusion::none(),
        &[],
    );

    assert_eq!(list.items.len(), 1);
    assert_eq!(
        list.items[0].quantities,
        vec![
            Quantity::new(200.0, Some("g")),
            Quantity::new(2.0, Some("clove")),
        ]
    );
    assert_eq!(list.formatted_text, "200g + 2 cloves garlic");
}

#[test]
fn test_doubling_servings_doubles_mass_and_volume() {
    let lines = ["300g rice", "250ml stock", "1 1/2 cups milk"];
    let base = build_shopping_list(
        &[selection("r", &lines, 2, 2)],
        &[],
        &[],
        &PantryInclusion::none(),
        &[],
    );
    let doubled = build_shopping_list(
        &[selection("r", &lines, 2, 4)],
        &[],
        &[],
        &PantryInclusion::none(),
        &[],
    );

    assert_eq!(displays(&base), vec!["354.88ml milk", "300g rice", "250ml stock"]);
    assert_eq!(displays(&doubled), vec!["709.76ml milk", "600g rice", "500ml stock"]);
}

#[test]
fn test_pantry_items_are_split_off_unless_included() {
    let pantry = vec![PantryRule::new("flour"), PantryRule::new("olive oil")];
    let recipes = [selection(
        "bread",
        &["500g flour", "2 tbsp olive oil", "1 packet yeast"],
        1,
        1,
    )];

    let list = build_shopping_list(&recipes, &pantry, &[], &PantryInclusion::none(), &[]);
    assert_eq!(displays(&list), vec!["1 packet yeast"]);
    assert_eq!(list.pantry_items, vec!["flour", "olive oil"]);
    assert!(list.formatted_text.ends_with("Pantry (already have):\n500g flour\n29.57ml olive oil"));

    let list = build_shopping_list(
        &recipes,
        &pantry,
        &[],
        &PantryInclusion::selected(["flour"]),
        &[],
    );
    assert_eq!(displays(&list), vec!["500g flour", "1 packet yeast"]);
    assert_eq!(list.pantry_items, vec!["olive oil"]);

    let list = build_shopping_list(&recipes, &pantry, &[], &PantryInclusion::All, &[]);
    assert_eq!(list.shopping_items.len(), 3);
    assert!(list.pantry_items.is_empty());
}

#[test]
fn test_zone_order_then_unzoned() {
    let (zones, warnings) = parse_zone_text("zone1: onion\nzone2: milk\n");
    assert!(warnings.is_empty());

    let list = build_shopping_list(
        &[selection("r", &["1 cup milk", "1 onion", "1 tsp paprika"], 4, 4)],
        &[],
        &zones,
        &PantryInclusion::none(),
        &[],
    );

    let descriptors: Vec<_> = list
        .shopping_items
        .iter()
        .map(|item| item.descriptor.as_str())
        .collect();
    assert_eq!(descriptors, vec!["onion", "milk", "paprika"]);
    assert_eq!(list.shopping_items[2].zone, UNZONED);
}

#[test]
fn test_identical_inputs_give_identical_text() {
    let recipes = [
        selection("a", &["2 cups flour", "3 eggs", "1 onion, diced"], 4, 6),
        selection("b", &["1 lb ground beef", "2 onions", "salt to taste"], 2, 3),
    ];
    let zones = zone_rules_from(&[("produce", vec!["onion"]), ("meat", vec!["beef"])]);
    let pantry = vec![PantryRule::new("flour")];

    let first = build_shopping_list(&recipes, &pantry, &zones, &PantryInclusion::none(), &[]);
    let second = build_shopping_list(&recipes, &pantry, &zones, &PantryInclusion::none(), &[]);
    assert_eq!(first.formatted_text, second.formatted_text);
    assert_eq!(first, second);
}

#[test]
fn test_to_taste_line_without_exclusion() {
    let registry = UnitRegistry::standard();
    let builder = ShoppingListBuilder::new(
        &registry,
        PipelineConfig {
            exclude: Vec::new(),
            ..PipelineConfig::default()
        },
    );
    let list = builder.build(&ShoppingRequest {
        selections: vec![selection("r", &["salt to taste"], 4, 4)],
        ..ShoppingRequest::default()
    });

    assert_eq!(list.items[0].descriptor.as_str(), "salt");
    assert_eq!(list.items[0].quantities, vec![Quantity::unitless(0.0)]);
    assert_eq!(displays(&list), vec!["salt"]);
    assert_eq!(list.warning_count(), 0);
}

#[test]
fn test_to_taste_clause_keeps_leading_quantity_and_merges() {
    let list = build_shopping_list(
        &[
            selection("curry", &["1/2 tsp chili flakes, or to taste"], 4, 4),
            selection("stew", &["1 tsp chili flakes"], 4, 4),
        ],
        &[],
        &[],
        &PantryInclusion::none(),
        &[],
    );

    assert_eq!(list.items.len(), 1);
    assert_eq!(list.items[0].descriptor.as_str(), "chili flake");
    assert_eq!(displays(&list), vec!["7.39ml chili flakes"]);
    assert_eq!(list.warning_count(), 0);
}

#[test]
fn test_bad_servings_skip_only_that_recipe() {
    let list = build_shopping_list(
        &[
            selection("bad", &["1 kg potatoes"], 0, 4),
            selection("good", &["2 carrots"], 2, 2),
        ],
        &[],
        &[],
        &PantryInclusion::none(),
        &[],
    );

    assert_eq!(displays(&list), vec!["2 carrots"]);
    assert_eq!(list.count_of("scaling_config"), 1);
}

#[test]
fn test_degraded_lines_are_counted_and_kept() {
    let list = build_shopping_list(
        &[selection("r", &["Fresh basil", "1/0 cup sugar"], 4, 4)],
        &[],
        &[],
        &PantryInclusion::none(),
        &[],
    );

    assert_eq!(list.degraded_count(), 2);
    assert_eq!(displays(&list), vec!["1/0 cup sugar", "fresh basil"]);
}

#[test]
fn test_extra_items_only() {
    let list = build_shopping_list(
        &[],
        &parse_pantry_text("paper").0,
        &[],
        &PantryInclusion::none(),
        &["Dish soap".to_string(), "Paper towels".to_string()],
    );

    assert_eq!(displays(&list), vec!["dish soap"]);
    assert_eq!(list.pantry_items, vec!["paper towels"]);
}

#[test]
fn test_recipe_document_to_shopping_list() {
    let curry = parse_recipe_document(
        "curry.md",
        "# Curry\nServings: 2\n\n## Ingredients\n\
         - 250g chicken\n- 1 can coconut milk\n- Water, as needed\n\n\
         ## Steps\nCook.\n",
        4,
    );
    let rice = parse_recipe_document(
        "rice.md",
        "## Ingredients\n- 1 cup rice\n- 1 can coconut milk\n",
        4,
    );

    let selections = vec![
        curry.into_selection("curry", Some(4)),
        rice.into_selection("rice", None),
    ];
    let list = build_shopping_list(&selections, &[], &[], &PantryInclusion::none(), &[]);

    assert_eq!(
        displays(&list),
        vec!["500g chicken", "3 cans coconut milk", "236.59ml rice"]
    );
}
