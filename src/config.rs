//! # Configuration Module
//!
//! Pipeline settings plus the three plain-text files the shopper maintains:
//!
//! - pantry file: one pattern per line
//! - zones file: `<zone label>: pattern, pattern, ...` in walking order
//! - extra items file: one item per line, added to every list
//!
//! In all three, blank lines and lines starting with `#` are ignored. A
//! malformed line is skipped and reported as a [`ShoppingError::ConfigParse`]
//! warning; nothing here rejects a whole file.

use crate::errors::{ConfigSource, ShoppingError};
use crate::pantry::PantryRule;
use crate::zones::ZoneRule;
use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

// Environment variables naming the configuration files
pub const PANTRY_PATH_VAR: &str = "PANTRY_PATH";
pub const ZONES_PATH_VAR: &str = "ZONES_PATH";
pub const EXTRA_ITEMS_PATH_VAR: &str = "ADDITIONAL_ITEMS_PATH";

// Defaults used when the variables are unset
pub const DEFAULT_PANTRY_PATH: &str = "config/pantry.txt";
pub const DEFAULT_ZONES_PATH: &str = "categories.txt";
pub const DEFAULT_EXTRA_ITEMS_PATH: &str = "config/additional-items.txt";

pub const DEFAULT_SERVINGS: i32 = 4;
pub const DEFAULT_EXCLUDED: [&str; 3] = ["water", "salt", "pepper"];

/// Settings for parsing and scaling
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Descriptors parsed but never put on the list
    pub exclude: Vec<String>,
    /// Servings assumed for recipe documents that do not declare any
    pub default_servings: i32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            exclude: DEFAULT_EXCLUDED.iter().map(|s| s.to_string()).collect(),
            default_servings: DEFAULT_SERVINGS,
        }
    }
}

/// Where the configuration files live
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    pub pantry: PathBuf,
    pub zones: PathBuf,
    pub extra_items: PathBuf,
}

impl Default for ConfigPaths {
    fn default() -> Self {
        Self {
            pantry: PathBuf::from(DEFAULT_PANTRY_PATH),
            zones: PathBuf::from(DEFAULT_ZONES_PATH),
            extra_items: PathBuf::from(DEFAULT_EXTRA_ITEMS_PATH),
        }
    }
}

impl ConfigPaths {
    /// Resolve paths from the environment, loading `.env` first
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve paths through a variable lookup, falling back to the defaults
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let resolve = |var: &str, default: &str| {
            lookup(var)
                .filter(|value| !value.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(default))
        };

        Self {
            pantry: resolve(PANTRY_PATH_VAR, DEFAULT_PANTRY_PATH),
            zones: resolve(ZONES_PATH_VAR, DEFAULT_ZONES_PATH),
            extra_items: resolve(EXTRA_ITEMS_PATH_VAR, DEFAULT_EXTRA_ITEMS_PATH),
        }
    }
}

/// Parsed configuration files
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShoppingConfig {
    pub pantry: Vec<PantryRule>,
    pub zones: Vec<ZoneRule>,
    pub extra_items: Vec<String>,
    /// Lines skipped while parsing
    pub warnings: Vec<ShoppingError>,
}

impl ShoppingConfig {
    /// Read and parse all configuration files
    ///
    /// A missing file counts as empty. Any other I/O failure is returned.
    pub fn load(paths: &ConfigPaths) -> Result<Self> {
        let mut config = ShoppingConfig::default();

        if let Some(text) = read_optional(&paths.pantry)? {
            let (rules, warnings) = parse_pantry_text(&text);
            config.pantry = rules;
            config.warnings.extend(warnings);
        }
        if let Some(text) = read_optional(&paths.zones)? {
            let (rules, warnings) = parse_zone_text(&text);
            config.zones = rules;
            config.warnings.extend(warnings);
        }
        if let Some(text) = read_optional(&paths.extra_items)? {
            let (items, warnings) = parse_extra_items_text(&text);
            config.extra_items = items;
            config.warnings.extend(warnings);
        }

        info!(
            "Loaded configuration: {} pantry rules, {} zones, {} extra items, {} warnings",
            config.pantry.len(),
            config.zones.len(),
            config.extra_items.len(),
            config.warnings.len()
        );
        Ok(config)
    }
}

fn read_optional(path: &Path) -> Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("Config file {} not found, using no rules", path.display());
            Ok(None)
        }
        Err(e) => {
            Err(e).with_context(|| format!("Failed to read config file {}", path.display()))
        }
    }
}

/// Non-comment, non-blank lines with their 1-based line numbers
fn content_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
}

fn config_warning(
    source: ConfigSource,
    line_number: usize,
    line: &str,
    reason: &str,
) -> ShoppingError {
    warn!(
        "Skipping {} config line {} ('{}'): {}",
        source, line_number, line, reason
    );
    ShoppingError::ConfigParse {
        source,
        line_number,
        line: line.to_string(),
        reason: reason.to_string(),
    }
}

/// Parse the pantry file, one pattern per line
///
/// Repeated patterns are skipped with a warning.
pub fn parse_pantry_text(text: &str) -> (Vec<PantryRule>, Vec<ShoppingError>) {
    let mut rules: Vec<PantryRule> = Vec::new();
    let mut warnings = Vec::new();

    for (line_number, line) in content_lines(text) {
        let rule = PantryRule::new(line);
        if rules.contains(&rule) {
            warnings.push(config_warning(
                ConfigSource::Pantry,
                line_number,
                line,
                "duplicate pattern",
            ));
            continue;
        }
        rules.push(rule);
    }

    (rules, warnings)
}

/// Parse the zones file
///
/// Zone order is the order labels are first seen. A label declared again,
/// in any case, extends the existing zone instead of creating a new one.
///
/// # Examples
///
/// ```rust
/// use shopping_list::config::parse_zone_text;
///
/// let (zones, warnings) = parse_zone_text("produce: onion, carrot\n# dairy later\ndairy: milk\n");
/// assert!(warnings.is_empty());
/// assert_eq!(zones[0].zone_label, "produce");
/// assert_eq!(zones[0].patterns, vec!["onion", "carrot"]);
/// assert_eq!(zones[1].order_index, 1);
/// ```
pub fn parse_zone_text(text: &str) -> (Vec<ZoneRule>, Vec<ShoppingError>) {
    let mut zones: Vec<ZoneRule> = Vec::new();
    let mut warnings = Vec::new();

    for (line_number, line) in content_lines(text) {
        let Some((label, patterns)) = line.split_once(':') else {
            warnings.push(config_warning(ConfigSource::Zones, line_number, line, "missing ':'"));
            continue;
        };

        let label = label.trim();
        if label.is_empty() {
            warnings.push(config_warning(
                ConfigSource::Zones,
                line_number,
                line,
                "empty zone label",
            ));
            continue;
        }

        let patterns: Vec<&str> = patterns
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();
        if patterns.is_empty() {
            warnings.push(config_warning(ConfigSource::Zones, line_number, line, "no patterns"));
            continue;
        }

        match zones
            .iter_mut()
            .find(|zone| zone.zone_label.eq_ignore_ascii_case(label))
        {
            Some(zone) => {
                debug!("Zone '{}' declared again on line {}, extending it", label, line_number);
                zone.patterns.extend(ZoneRule::new(label, zone.order_index, &patterns).patterns);
            }
            None => {
                let order_index = zones.len();
                zones.push(ZoneRule::new(label, order_index, &patterns));
            }
        }
    }

    (zones, warnings)
}

/// Parse the extra items file, one item per line
///
/// Items are compared case-insensitively; repeats are skipped with a warning.
pub fn parse_extra_items_text(text: &str) -> (Vec<String>, Vec<ShoppingError>) {
    let mut seen = HashSet::new();
    let mut items = Vec::new();
    let mut warnings = Vec::new();

    for (line_number, line) in content_lines(text) {
        if !seen.insert(line.to_lowercase()) {
            warnings.push(config_warning(
                ConfigSource::ExtraItems,
                line_number,
                line,
                "duplicate item",
            ));
            continue;
        }
        items.push(line.to_string());
    }

    (items, warnings)
}
