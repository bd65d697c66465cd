//! Command-line front end: build a shopping list from markdown recipe files.

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use shopping_list::config::{ConfigPaths, PipelineConfig, ShoppingConfig};
use shopping_list::ingredient_model::{Descriptor, RecipeSelection};
use shopping_list::ingredient_parser::parse_recipe_lines;
use shopping_list::pantry::PantryInclusion;
use shopping_list::recipe_document::parse_recipe_document;
use shopping_list::shopping_list::{ShoppingListBuilder, ShoppingRequest};
use shopping_list::unit_registry::STANDARD_UNITS;
use shopping_list::zones::{format_zone_rules, zone_report};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "shopping-list",
    version,
    about = "Merge recipe ingredients into one shopping list ordered by store zone"
)]
struct Cli {
    /// Recipe files, each optionally followed by ":<servings>" to scale it
    #[arg(required_unless_present = "show_zones", value_parser = parse_recipe_arg)]
    recipes: Vec<RecipeArg>,

    /// Extra item to add, may be repeated
    #[arg(long = "extra")]
    extra: Vec<String>,

    /// Keep every pantry item on the list
    #[arg(long)]
    include_pantry: bool,

    /// Keep one pantry item on the list, may be repeated
    #[arg(long = "include")]
    include: Vec<String>,

    /// Print the full result as JSON
    #[arg(long)]
    json: bool,

    /// Print the zone coverage report instead of the list
    #[arg(long)]
    zones: bool,

    /// Print the configured zones and their patterns, then exit
    #[arg(long)]
    show_zones: bool,
}

#[derive(Debug, Clone, PartialEq)]
struct RecipeArg {
    path: PathBuf,
    servings: Option<i32>,
}

fn parse_recipe_arg(arg: &str) -> Result<RecipeArg, String> {
    if let Some((path, servings)) = arg.rsplit_once(':') {
        if let Ok(servings) = servings.parse::<i32>() {
            if path.is_empty() {
                return Err(format!("missing recipe path in '{arg}'"));
            }
            return Ok(RecipeArg {
                path: PathBuf::from(path),
                servings: Some(servings),
            });
        }
    }
    Ok(RecipeArg {
        path: PathBuf::from(arg),
        servings: None,
    })
}

fn recipe_id(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn load_selections(
    recipes: &[RecipeArg],
    pipeline: &PipelineConfig,
) -> Result<Vec<RecipeSelection>> {
    let mut selections = Vec::with_capacity(recipes.len());

    for recipe in recipes {
        let content = std::fs::read_to_string(&recipe.path)
            .with_context(|| format!("Failed to read recipe {}", recipe.path.display()))?;
        let filename = recipe.path.to_string_lossy();
        let document = parse_recipe_document(&filename, &content, pipeline.default_servings);

        if let Some(error) = &document.error {
            warn!("Skipping {}: {}", recipe.path.display(), error);
            continue;
        }

        info!("Loaded recipe '{}' ({} servings)", document.name, document.servings);
        selections.push(document.into_selection(&recipe_id(&recipe.path), recipe.servings));
    }

    Ok(selections)
}

/// Descriptors the zone report covers: recipe lines plus extra items
fn report_descriptors(
    selections: &[RecipeSelection],
    extra_items: &[String],
    pipeline: &PipelineConfig,
) -> Vec<String> {
    let recipe_descriptors = selections
        .iter()
        .flat_map(|selection| {
            parse_recipe_lines(selection, &STANDARD_UNITS, &pipeline.exclude).lines
        })
        .filter(|line| !line.excluded)
        .map(|line| line.descriptor.to_string());
    let extra_descriptors = extra_items
        .iter()
        .filter_map(|item| Descriptor::from_raw(item))
        .map(|descriptor| descriptor.to_string());

    recipe_descriptors.chain(extra_descriptors).collect()
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let paths = ConfigPaths::from_env();
    info!("Using configuration files {:?}", paths);

    let config = ShoppingConfig::load(&paths)?;
    if cli.show_zones {
        print!("{}", format_zone_rules(&config.zones));
        return Ok(());
    }

    let pipeline = PipelineConfig::default();
    let selections = load_selections(&cli.recipes, &pipeline)?;

    let mut extra_items = config.extra_items;
    extra_items.extend(cli.extra);

    if cli.zones {
        let descriptors = report_descriptors(&selections, &extra_items, &pipeline);
        print!("{}", zone_report(&descriptors, &config.zones));
        return Ok(());
    }

    let pantry_inclusion = if cli.include_pantry {
        PantryInclusion::All
    } else {
        PantryInclusion::selected(&cli.include)
    };

    let request = ShoppingRequest {
        selections,
        pantry_rules: config.pantry,
        zone_rules: config.zones,
        pantry_inclusion,
        extra_items,
    };
    let list = ShoppingListBuilder::new(&STANDARD_UNITS, pipeline).build(&request);

    if cli.json {
        let json =
            serde_json::to_string_pretty(&list).context("Failed to serialize shopping list")?;
        println!("{}", json);
    } else {
        println!("{}", list.formatted_text);
    }

    let warnings = config.warnings.len() + list.warning_count();
    if warnings > 0 {
        eprintln!(
            "{} warnings ({} degraded lines); run with RUST_LOG=warn for details",
            warnings,
            list.degraded_count()
        );
    }

    Ok(())
}
