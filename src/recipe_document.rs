//! # Recipe Document Module
//!
//! Pulls the pieces the shopping list needs out of a markdown recipe:
//!
//! ```text
//! # Chicken Curry
//!
//! Servings: 4
//!
//! ## Ingredients
//! - 500g chicken
//! - 2 cloves garlic
//!
//! ## Steps
//! ...
//! ```
//!
//! Only the ingredients section is read line by line; everything after the
//! next `##` heading is ignored.

use crate::ingredient_model::RecipeSelection;
use lazy_static::lazy_static;
use log::{debug, warn};
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    static ref TITLE_REGEX: Regex =
        Regex::new(r"^#\s+(.+)$").expect("Title pattern should be valid");
    static ref SERVINGS_REGEX: Regex =
        Regex::new(r"(?i)^servings:\s*(\d+)").expect("Servings pattern should be valid");
    static ref INGREDIENTS_HEADING_REGEX: Regex = Regex::new(r"(?i)^##\s*ingredients\s*$")
        .expect("Ingredients heading pattern should be valid");
}

pub const MISSING_SECTION_ERROR: &str = "Missing '## Ingredients' section";
pub const EMPTY_SECTION_ERROR: &str = "No ingredients found in '## Ingredients' section";

/// A recipe file reduced to what the shopping list pipeline consumes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeDocument {
    /// Title from the first `# ` heading, or the humanized file name
    pub name: String,
    /// Declared servings; the configured default when the document has none
    pub servings: i32,
    /// Raw lines of the ingredients section, comments and blanks removed
    pub ingredient_lines: Vec<String>,
    /// Why the document has no ingredient lines, if it has none
    pub error: Option<String>,
}

impl RecipeDocument {
    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }

    /// Turn the document into a selection, cooking `target` servings or the declared amount
    pub fn into_selection(self, recipe_id: &str, target: Option<i32>) -> RecipeSelection {
        let target = target.unwrap_or(self.servings);
        RecipeSelection::new(recipe_id, self.ingredient_lines, self.servings, target)
    }
}

/// Parse a markdown recipe document
///
/// # Examples
///
/// ```rust
/// use shopping_list::recipe_document::parse_recipe_document;
///
/// let doc = parse_recipe_document(
///     "pancakes.md",
///     "# Pancakes\nServings: 2\n\n## Ingredients\n- 200g flour\n- 2 eggs\n\n## Method\nMix.\n",
///     4,
/// );
/// assert_eq!(doc.name, "Pancakes");
/// assert_eq!(doc.servings, 2);
/// assert_eq!(doc.ingredient_lines, vec!["- 200g flour", "- 2 eggs"]);
/// ```
pub fn parse_recipe_document(
    filename: &str,
    content: &str,
    default_servings: i32,
) -> RecipeDocument {
    let name = content
        .lines()
        .find_map(|line| TITLE_REGEX.captures(line.trim_end()))
        .map(|caps| caps[1].trim().to_string())
        .unwrap_or_else(|| humanize_filename(filename));

    let servings = content
        .lines()
        .find_map(|line| SERVINGS_REGEX.captures(line.trim()))
        .and_then(|caps| caps[1].parse::<i32>().ok())
        .unwrap_or(default_servings);

    let mut document = RecipeDocument {
        name,
        servings,
        ingredient_lines: Vec::new(),
        error: None,
    };

    let mut lines = content.lines();
    if !lines.any(|line| INGREDIENTS_HEADING_REGEX.is_match(line.trim())) {
        warn!("Recipe '{}' has no ingredients section", filename);
        document.error = Some(MISSING_SECTION_ERROR.to_string());
        return document;
    }

    document.ingredient_lines = lines
        .map(str::trim)
        .take_while(|line| !line.starts_with("##"))
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect();

    if document.ingredient_lines.is_empty() {
        warn!("Recipe '{}' has an empty ingredients section", filename);
        document.error = Some(EMPTY_SECTION_ERROR.to_string());
    }

    debug!(
        "Parsed recipe '{}': {} servings, {} ingredient lines",
        document.name,
        document.servings,
        document.ingredient_lines.len()
    );
    document
}

/// "chicken-tikka_masala.md" becomes "Chicken Tikka Masala"
pub fn humanize_filename(filename: &str) -> String {
    let stem = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename);
    let stem = match stem.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => stem,
    };

    stem.split(['-', '_', ' '])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const CURRY: &str = "# Chicken Curry\n\nServings: 6\n\n\
        ## Ingredients\n\n- 500g chicken\n# optional\n- 2 cloves garlic\n\
        ### For the sauce\n- 400ml coconut milk\n\n\
        ## Steps\n1. Cook it\n";

    #[test]
    fn test_parse_full_document() {
        let doc = parse_recipe_document("curry.md", CURRY, 4);
        assert!(doc.is_valid());
        assert_eq!(doc.name, "Chicken Curry");
        assert_eq!(doc.servings, 6);
        assert_eq!(
            doc.ingredient_lines,
            vec!["- 500g chicken", "- 2 cloves garlic", "- 400ml coconut milk"]
        );
    }

    #[test]
    fn test_defaults_for_title_and_servings() {
        let doc =
            parse_recipe_document("beef-and_broccoli.md", "## Ingredients\n1 head broccoli\n", 4);
        assert_eq!(doc.name, "Beef And Broccoli");
        assert_eq!(doc.servings, 4);
        assert_eq!(doc.ingredient_lines, vec!["1 head broccoli"]);
    }

    #[test]
    fn test_section_heading_is_case_insensitive() {
        let doc = parse_recipe_document("x.md", "# X\nservings: 2\n##INGREDIENTS\n2 eggs", 4);
        assert_eq!(doc.servings, 2);
        assert_eq!(doc.ingredient_lines, vec!["2 eggs"]);
    }

    #[test]
    fn test_missing_and_empty_sections() {
        let missing = parse_recipe_document("x.md", "# X\nJust text\n", 4);
        assert_eq!(missing.error.as_deref(), Some(MISSING_SECTION_ERROR));
        assert!(missing.ingredient_lines.is_empty());

        let empty = parse_recipe_document("x.md", "# X\n## Ingredients\n\n## Steps\nstir\n", 4);
        assert_eq!(empty.error.as_deref(), Some(EMPTY_SECTION_ERROR));
    }

    #[test]
    fn test_into_selection() {
        let doc = parse_recipe_document("curry.md", CURRY, 4);
        let selection = doc.clone().into_selection("curry", Some(3));
        assert_eq!(selection.declared_servings, 6);
        assert_eq!(selection.target_servings, 3);
        assert_eq!(selection.raw_ingredient_lines.len(), 3);

        let selection = doc.into_selection("curry", None);
        assert_eq!(selection.target_servings, 6);
    }

    #[test]
    fn test_humanize_filename() {
        assert_eq!(humanize_filename("recipes/thai_green-curry.md"), "Thai Green Curry");
        assert_eq!(humanize_filename("soup"), "Soup");
    }
}
