//! # Ingredient Parser
//!
//! This module turns raw recipe ingredient lines into structured quantities and
//! normalized descriptors.
//!
//! ## Features
//!
//! - Integers, decimals, fractions (1/2), mixed numbers (1 1/2) and vulgar fractions (1½)
//! - Ranges (2-3, 2 to 3), which resolve to the upper bound
//! - Unit tokens resolved through the [`UnitRegistry`], attached ("500g") or spaced ("2 cups")
//! - "to taste" clauses, dropped from the line; a line with no other quantity gets a zero amount
//! - Descriptor normalization: case folding, modifier stripping, article removal,
//!   best-effort singularization
//!
//! Lines that cannot be parsed confidently are never dropped: they degrade to a
//! unit-less quantity of one and a descriptor built from the raw text.
//!
//! ## Usage
//!
//! ```rust
//! use shopping_list::ingredient_parser::parse_ingredient_line;
//! use shopping_list::unit_registry::UnitRegistry;
//!
//! let registry = UnitRegistry::standard();
//! let parsed = parse_ingredient_line("- 2 cups flour, sifted", &registry, &[]).unwrap();
//! assert_eq!(parsed.quantity.amount, 2.0);
//! assert_eq!(parsed.quantity.unit.as_deref(), Some("cup"));
//! assert_eq!(parsed.descriptor.as_str(), "flour");
//! ```

use crate::errors::ShoppingError;
use crate::ingredient_model::{Descriptor, IngredientLine, Quantity, RecipeSelection};
use crate::measurement_patterns::{
    vulgar_fraction_value, BULLET_REGEX, QUANTITY_REGEX, TO_TASTE_REGEX,
    TRAILING_PARENTHETICAL_REGEX,
};
use crate::unit_registry::{UnitDef, UnitRegistry};
use log::{debug, trace, warn};
use regex::Captures;

/// Leading words dropped from descriptors
const LEADING_ARTICLES: &[&str] = &["a", "an", "the", "of"];

/// Words that look plural but are not
const INVARIANT_WORDS: &[&str] = &[
    "asparagus", "couscous", "hummus", "molasses", "swiss", "lemongrass", "watercress",
    "citrus", "grits", "series", "species",
];

/// Plurals the suffix rules get wrong
const IRREGULAR_PLURALS: &[(&str, &str)] = &[
    ("leaves", "leaf"),
    ("loaves", "loaf"),
    ("halves", "half"),
    ("knives", "knife"),
    ("chilies", "chili"),
    ("chillies", "chilli"),
    ("cookies", "cookie"),
    ("brownies", "brownie"),
    ("smoothies", "smoothie"),
    ("veggies", "veggie"),
    ("calories", "calorie"),
];

/// Result of parsing one ingredient line
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedIngredient {
    pub quantity: Quantity,
    pub descriptor: Descriptor,
    /// Cleaned ingredient name before singularization, e.g. "onions"
    pub display_name: String,
    /// Descriptor is on the exclude list
    pub excluded: bool,
    /// Why the line fell back to the default quantity, if it did
    pub degraded: Option<String>,
}

/// Ingredient lines of one recipe plus the warnings raised while parsing them
#[derive(Debug, Clone, Default)]
pub struct ParsedRecipeLines {
    pub lines: Vec<IngredientLine>,
    pub warnings: Vec<ShoppingError>,
}

/// Parse a single ingredient line
///
/// Returns `None` for blank lines (including a lone bullet marker).
pub fn parse_ingredient_line(
    line: &str,
    registry: &UnitRegistry,
    exclude: &[String],
) -> Option<ParsedIngredient> {
    let cleaned = BULLET_REGEX.replace(line, "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }
    trace!("Parsing ingredient line: '{}'", cleaned);

    // A "to taste" clause never hides a leading quantity
    let to_taste = TO_TASTE_REGEX.is_match(cleaned);
    let text = TO_TASTE_REGEX.replace(cleaned, "");
    let text = text.trim();

    let mut parsed = if let Some(captures) = QUANTITY_REGEX.captures(text) {
        match amount_from_captures(&captures) {
            Ok(amount) => {
                let rest = &text[captures.get(0).map_or(0, |m| m.end())..];
                let (unit, remainder) = split_unit(rest, registry);
                let quantity = Quantity::new(amount, unit.map(|def| def.canonical));
                named(remainder, quantity)
                    .unwrap_or_else(|| degrade(cleaned, "no ingredient name after quantity"))
            }
            Err(reason) => degrade(cleaned, reason),
        }
    } else if to_taste {
        named(text, Quantity::unitless(0.0))
            .unwrap_or_else(|| degrade(cleaned, "no ingredient name before 'to taste'"))
    } else {
        match named(text, Quantity::unitless(1.0)) {
            Some(parsed) => ParsedIngredient {
                degraded: Some("no leading quantity".to_string()),
                ..parsed
            },
            None => degrade(cleaned, "no ingredient name"),
        }
    };

    parsed.excluded = is_excluded(&parsed.descriptor, exclude);
    debug!(
        "Parsed '{}' -> amount={}, unit={:?}, descriptor='{}', excluded={}",
        cleaned, parsed.quantity.amount, parsed.quantity.unit, parsed.descriptor, parsed.excluded
    );
    Some(parsed)
}

/// Parse every ingredient line of a selected recipe
///
/// Blank lines are skipped. Degraded lines are kept and reported as
/// [`ShoppingError::ParseDegraded`] warnings; excluded lines are kept with
/// `excluded = true` so the caller can see them.
pub fn parse_recipe_lines(
    selection: &RecipeSelection,
    registry: &UnitRegistry,
    exclude: &[String],
) -> ParsedRecipeLines {
    let mut parsed_lines = ParsedRecipeLines::default();

    for raw in &selection.raw_ingredient_lines {
        let Some(parsed) = parse_ingredient_line(raw, registry, exclude) else {
            continue;
        };

        if let Some(reason) = &parsed.degraded {
            warn!(
                "Recipe {}: degraded parse of '{}': {}",
                selection.recipe_id, raw, reason
            );
            parsed_lines.warnings.push(ShoppingError::ParseDegraded {
                raw_text: raw.trim().to_string(),
                reason: reason.clone(),
            });
        }

        parsed_lines.lines.push(IngredientLine {
            raw_text: raw.clone(),
            quantity: parsed.quantity,
            descriptor: parsed.descriptor,
            display_name: parsed.display_name,
            recipe_id: selection.recipe_id.clone(),
            servings_declared: selection.declared_servings,
            servings_target: selection.target_servings,
            excluded: parsed.excluded,
        });
    }

    parsed_lines
}

/// Normalize free text into an aggregation key
///
/// Same cleanup as [`clean_ingredient_name`], then the last word is
/// singularized. Returns `None` when nothing is left.
///
/// # Examples
///
/// ```rust
/// use shopping_list::ingredient_parser::normalize_descriptor;
///
/// assert_eq!(normalize_descriptor("Onions, diced").unwrap().as_str(), "onion");
/// assert_eq!(normalize_descriptor("a Tomatoes (ripe)").unwrap().as_str(), "tomato");
/// assert!(normalize_descriptor(" , chopped").is_none());
/// ```
pub fn normalize_descriptor(text: &str) -> Option<Descriptor> {
    clean_ingredient_name(text).map(|name| singular_descriptor(&name))
}

/// Clean an ingredient name for display
///
/// Lower-cases, drops comma clauses and trailing parentheticals and strips
/// leading articles. Plurals are kept.
pub fn clean_ingredient_name(text: &str) -> Option<String> {
    let mut name = text.to_lowercase();

    if let Some(comma) = name.find(',') {
        name.truncate(comma);
    }
    while TRAILING_PARENTHETICAL_REGEX.is_match(&name) {
        name = TRAILING_PARENTHETICAL_REGEX.replace(&name, "").into_owned();
    }

    // Remove trailing punctuation
    let name = name.trim_end_matches(|c: char| {
        !c.is_alphanumeric() && !c.is_whitespace() && c != '-' && c != '\''
    });

    let mut words: Vec<&str> = name.split_whitespace().collect();
    while words.len() > 1 && LEADING_ARTICLES.contains(&words[0]) {
        words.remove(0);
    }
    if words.is_empty() || (words.len() == 1 && LEADING_ARTICLES.contains(&words[0])) {
        return None;
    }

    Some(words.join(" "))
}

/// Singularize the last word of a cleaned, non-empty name
fn singular_descriptor(name: &str) -> Descriptor {
    let singular = match name.rsplit_once(' ') {
        Some((head, last)) => format!("{} {}", head, singularize(last)),
        None => singularize(name),
    };
    Descriptor::from_normalized(singular)
}

/// Best-effort singular form of a lower-case word
///
/// Leaves the word unchanged when no rule applies or the result would be
/// implausibly short.
pub fn singularize(word: &str) -> String {
    if let Some((_, singular)) = IRREGULAR_PLURALS.iter().find(|(plural, _)| *plural == word) {
        return singular.to_string();
    }
    if word.chars().count() <= 3
        || INVARIANT_WORDS.contains(&word)
        || !word.chars().all(|c| c.is_alphabetic() || c == '-' || c == '\'')
    {
        return word.to_string();
    }

    let candidate = if let Some(stem) = word.strip_suffix("ies") {
        format!("{stem}y")
    } else if word.ends_with("oes")
        || word.ends_with("ches")
        || word.ends_with("shes")
        || word.ends_with("sses")
        || word.ends_with("xes")
        || word.ends_with("zes")
    {
        word[..word.len() - 2].to_string()
    } else if word.ends_with("ss") || word.ends_with("us") || word.ends_with("is") {
        word.to_string()
    } else if let Some(stem) = word.strip_suffix('s') {
        stem.to_string()
    } else {
        word.to_string()
    };

    if candidate.chars().count() < 2 {
        word.to_string()
    } else {
        candidate
    }
}

/// Check if a descriptor is on the exclude list
///
/// Exclude entries go through the same normalization as descriptors and
/// must match the whole descriptor, so "pepper" excludes "peppers" but not
/// "bell pepper".
pub fn is_excluded(descriptor: &Descriptor, exclude: &[String]) -> bool {
    exclude
        .iter()
        .filter_map(|entry| normalize_descriptor(entry))
        .any(|entry| entry == *descriptor)
}

/// Compute the amount from a [`QUANTITY_REGEX`] match
fn amount_from_captures(captures: &Captures<'_>) -> Result<f64, &'static str> {
    let number = |name: &str| -> Result<Option<f64>, &'static str> {
        captures
            .name(name)
            .map(|m| m.as_str().parse::<f64>().map_err(|_| "invalid number"))
            .transpose()
    };

    if let (Some(whole), Some(num), Some(den)) = (
        number("mixed_whole")?,
        number("mixed_num")?,
        number("mixed_den")?,
    ) {
        return fraction(num, den).map(|f| whole + f);
    }

    if let Some(vulgar) = captures.name("vulgar") {
        let whole = number("vulgar_whole")?.unwrap_or(0.0);
        let value = vulgar
            .as_str()
            .chars()
            .next()
            .and_then(vulgar_fraction_value)
            .ok_or("unknown fraction character")?;
        return Ok(whole + value);
    }

    if let (Some(num), Some(den)) = (number("num")?, number("den")?) {
        return fraction(num, den);
    }

    // Ranges use the upper bound
    if let (Some(_), Some(high)) = (number("low")?, number("high")?) {
        return Ok(high);
    }

    number("number")?.ok_or("no number found")
}

fn fraction(numerator: f64, denominator: f64) -> Result<f64, &'static str> {
    if denominator == 0.0 {
        Err("zero denominator in fraction")
    } else {
        Ok(numerator / denominator)
    }
}

/// Split a leading unit token off the text that follows a quantity
///
/// Two-word units ("fl oz") are tried before single words. When no known
/// unit follows, the text is returned untouched.
fn split_unit<'t>(rest: &'t str, registry: &'t UnitRegistry) -> (Option<&'t UnitDef>, &'t str) {
    let trimmed = rest.trim_start();

    let mut word_ends = Vec::with_capacity(2);
    let mut in_word = false;
    for (i, c) in trimmed.char_indices() {
        if c.is_whitespace() {
            if in_word {
                word_ends.push(i);
                in_word = false;
                if word_ends.len() == 2 {
                    break;
                }
            }
        } else {
            in_word = true;
        }
    }
    if in_word && word_ends.len() < 2 {
        word_ends.push(trimmed.len());
    }

    for &end in word_ends.iter().rev() {
        let token = trimmed[..end].trim_end_matches([',', ';', ':']);
        if !token.chars().any(char::is_alphabetic)
            || !token
                .chars()
                .all(|c| c.is_alphabetic() || c == '.' || c.is_whitespace())
        {
            continue;
        }
        if let Some(def) = registry.lookup(token) {
            trace!("Resolved unit token '{}' -> '{}'", token, def.canonical);
            return (Some(def), &trimmed[end..]);
        }
    }

    (None, trimmed)
}

/// Build a parsed line from the name text that follows the quantity
fn named(text: &str, quantity: Quantity) -> Option<ParsedIngredient> {
    let display_name = clean_ingredient_name(text)?;
    Some(ParsedIngredient {
        quantity,
        descriptor: singular_descriptor(&display_name),
        display_name,
        excluded: false,
        degraded: None,
    })
}

/// Fallback for lines that could not be parsed: one unit-less item named by the raw text
fn degrade(cleaned: &str, reason: &str) -> ParsedIngredient {
    // cleaned is non-empty, so folding it cannot produce an empty descriptor
    let descriptor = Descriptor::from_raw(cleaned)
        .unwrap_or_else(|| Descriptor::from_normalized(cleaned.to_string()));
    ParsedIngredient {
        quantity: Quantity::unitless(1.0),
        display_name: descriptor.to_string(),
        descriptor,
        excluded: false,
        degraded: Some(reason.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> ParsedIngredient {
        parse_ingredient_line(line, &UnitRegistry::standard(), &[]).unwrap()
    }

    #[test]
    fn test_parse_simple_ingredient() {
        let result = parse("2 cups flour");
        assert_eq!(result.descriptor.as_str(), "flour");
        assert_eq!(result.quantity, Quantity::new(2.0, Some("cup")));
        assert!(result.degraded.is_none());
    }

    #[test]
    fn test_parse_fraction_ingredient() {
        let result = parse("1/2 cup sugar");
        assert_eq!(result.quantity, Quantity::new(0.5, Some("cup")));

        let result = parse("2 1/4 cups butter");
        assert_eq!(result.quantity, Quantity::new(2.25, Some("cup")));
        assert_eq!(result.descriptor.as_str(), "butter");

        let result = parse("1½ tsp vanilla extract");
        assert_eq!(result.quantity, Quantity::new(1.5, Some("tsp")));
        assert_eq!(result.descriptor.as_str(), "vanilla extract");
    }

    #[test]
    fn test_parse_range_uses_upper_bound() {
        let result = parse("2-3 tbsp olive oil");
        assert_eq!(result.quantity, Quantity::new(3.0, Some("tbsp")));
        assert_eq!(result.descriptor.as_str(), "olive oil");

        let result = parse("2 to 3 cloves garlic");
        assert_eq!(result.quantity, Quantity::new(3.0, Some("clove")));
    }

    #[test]
    fn test_parse_attached_unit() {
        let result = parse("500g chicken");
        assert_eq!(result.quantity, Quantity::new(500.0, Some("g")));
        assert_eq!(result.descriptor.as_str(), "chicken");
    }

    #[test]
    fn test_parse_two_word_unit() {
        let result = parse("8 fl oz cream");
        assert_eq!(result.quantity, Quantity::new(8.0, Some("fl oz")));
        assert_eq!(result.descriptor.as_str(), "cream");
    }

    #[test]
    fn test_parse_count_without_unit() {
        let result = parse("2 onions");
        assert_eq!(result.quantity, Quantity::unitless(2.0));
        assert_eq!(result.descriptor.as_str(), "onion");

        let result = parse("3 large eggs");
        assert_eq!(result.quantity, Quantity::unitless(3.0));
        assert_eq!(result.descriptor.as_str(), "large egg");
    }

    #[test]
    fn test_parse_with_modifiers() {
        let result = parse("1 onion, diced");
        assert_eq!(result.descriptor.as_str(), "onion");

        let result = parse("2 cups flour (all-purpose)");
        assert_eq!(result.descriptor.as_str(), "flour");

        let result = parse("1 cup of milk");
        assert_eq!(result.descriptor.as_str(), "milk");
    }

    #[test]
    fn test_parse_to_taste() {
        let result = parse("salt to taste");
        assert_eq!(result.quantity, Quantity::unitless(0.0));
        assert_eq!(result.descriptor.as_str(), "salt");
        assert!(result.degraded.is_none());

        let result = parse("Black pepper, to taste");
        assert_eq!(result.descriptor.as_str(), "black pepper");
    }

    #[test]
    fn test_parse_quantity_with_to_taste_clause() {
        let result = parse("1/2 tsp chili flakes, or to taste");
        assert_eq!(result.quantity, Quantity::new(0.5, Some("tsp")));
        assert_eq!(result.descriptor.as_str(), "chili flake");
        assert_eq!(result.display_name, "chili flakes");
        assert!(result.degraded.is_none());

        let result = parse("2 tbsp sugar to taste");
        assert_eq!(result.quantity, Quantity::new(2.0, Some("tbsp")));
        assert_eq!(result.descriptor.as_str(), "sugar");
    }

    #[test]
    fn test_display_name_keeps_plural() {
        let result = parse("3 Large Eggs, beaten");
        assert_eq!(result.descriptor.as_str(), "large egg");
        assert_eq!(result.display_name, "large eggs");

        let result = parse("1/0 cup sugar");
        assert_eq!(result.display_name, "1/0 cup sugar");
    }

    #[test]
    fn test_parse_no_quantity() {
        let result = parse("- Fresh basil, torn");
        assert_eq!(result.quantity, Quantity::unitless(1.0));
        assert_eq!(result.descriptor.as_str(), "fresh basil");
        assert!(result.degraded.is_some());
    }

    #[test]
    fn test_parse_degraded_fraction() {
        let result = parse("1/0 cup sugar");
        assert_eq!(result.quantity, Quantity::unitless(1.0));
        assert_eq!(result.descriptor.as_str(), "1/0 cup sugar");
        assert_eq!(result.degraded.as_deref(), Some("zero denominator in fraction"));
    }

    #[test]
    fn test_parse_quantity_without_name_degrades() {
        let result = parse("2 cups");
        assert_eq!(result.quantity, Quantity::unitless(1.0));
        assert_eq!(result.descriptor.as_str(), "2 cups");
        assert!(result.degraded.is_some());
    }

    #[test]
    fn test_blank_lines_produce_nothing() {
        let registry = UnitRegistry::standard();
        assert!(parse_ingredient_line("", &registry, &[]).is_none());
        assert!(parse_ingredient_line("   ", &registry, &[]).is_none());
        assert!(parse_ingredient_line(" - ", &registry, &[]).is_none());
    }

    #[test]
    fn test_exclude_list() {
        let registry = UnitRegistry::standard();
        let exclude = vec!["water".to_string(), "Pepper".to_string()];

        let water = parse_ingredient_line("2 cups water", &registry, &exclude).unwrap();
        assert!(water.excluded);

        let peppers = parse_ingredient_line("2 peppers", &registry, &exclude).unwrap();
        assert!(peppers.excluded);

        let bell = parse_ingredient_line("1 bell pepper", &registry, &exclude).unwrap();
        assert!(!bell.excluded);
    }

    #[test]
    fn test_singularize() {
        assert_eq!(singularize("onions"), "onion");
        assert_eq!(singularize("tomatoes"), "tomato");
        assert_eq!(singularize("berries"), "berry");
        assert_eq!(singularize("peaches"), "peach");
        assert_eq!(singularize("cheeses"), "cheese");
        assert_eq!(singularize("leaves"), "leaf");
        assert_eq!(singularize("cookies"), "cookie");
        assert_eq!(singularize("asparagus"), "asparagus");
        assert_eq!(singularize("hummus"), "hummus");
        assert_eq!(singularize("gas"), "gas");
        assert_eq!(singularize("flour"), "flour");
    }

    #[test]
    fn test_parse_recipe_lines_collects_warnings() {
        let registry = UnitRegistry::standard();
        let selection = RecipeSelection::new(
            "pancakes",
            vec![
                "2 cups flour".to_string(),
                "".to_string(),
                "eggs".to_string(),
                "1 cup water".to_string(),
            ],
            4,
            4,
        );
        let parsed = parse_recipe_lines(&selection, &registry, &["water".to_string()]);

        assert_eq!(parsed.lines.len(), 3);
        assert_eq!(parsed.warnings.len(), 1);
        assert_eq!(parsed.warnings[0].kind(), "parse_degraded");
        assert!(parsed.lines[2].excluded);
        assert!(parsed.lines.iter().all(|l| l.recipe_id == "pancakes"));
    }
}
