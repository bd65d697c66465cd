//! # Unit Registry
//!
//! Read-only table of every accepted unit alias, the canonical unit it resolves
//! to, and the factor that relates it to its dimension's base unit (grams for
//! mass, milliliters for volume).
//!
//! The table also holds the display ladder: once a total crosses a threshold it
//! is reported in the larger unit, so 500g + 500g is shown as 1kg.
//!
//! Build it once (see [`STANDARD_UNITS`]) and pass it by reference; nothing
//! mutates it after construction, so it can be shared between threads.

use crate::ingredient_model::{Dimension, Quantity};
use lazy_static::lazy_static;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Maximum number of decimals kept when displaying an amount
pub const DISPLAY_DECIMALS: i32 = 2;

lazy_static! {
    /// The default registry, built on first use
    pub static ref STANDARD_UNITS: UnitRegistry = UnitRegistry::standard();
}

/// A canonical unit and how it relates to its dimension
#[derive(Debug, Clone, PartialEq)]
pub struct UnitDef {
    /// Name used in output ("g", "cup", "clove")
    pub canonical: &'static str,
    /// Name used when the amount is not exactly one
    pub plural: &'static str,
    pub dimension: Dimension,
    /// Multiplier to the dimension base unit; `None` for count units
    pub factor: Option<f64>,
    /// Symbol written directly after the amount ("500g" rather than "500 g")
    pub attached: bool,
}

/// One rung of a display ladder
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayStep {
    /// Smallest base amount reported in `unit`
    pub threshold: f64,
    pub unit: &'static str,
}

/// Errors raised by unit lookups and conversions
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum UnitError {
    /// The unit is not in the registry
    UnknownUnit(String),
    /// Both units are known but belong to different dimensions
    IncompatibleUnits {
        from: String,
        to: String,
        from_dimension: Dimension,
        to_dimension: Dimension,
    },
    /// The dimension has no conversion factors (count, unspecified)
    NotConvertible(Dimension),
}

impl fmt::Display for UnitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitError::UnknownUnit(unit) => write!(f, "Unknown unit: {unit}"),
            UnitError::IncompatibleUnits {
                from,
                to,
                from_dimension,
                to_dimension,
            } => write!(
                f,
                "Cannot convert {from} ({from_dimension}) to {to} ({to_dimension})"
            ),
            UnitError::NotConvertible(dimension) => {
                write!(f, "Units of dimension {dimension} cannot be converted")
            }
        }
    }
}

impl std::error::Error for UnitError {}

/// Alias table, conversion factors and display ladders
#[derive(Debug, Clone)]
pub struct UnitRegistry {
    units: Vec<UnitDef>,
    aliases: HashMap<String, usize>,
    /// Per dimension, ordered by descending threshold
    ladders: Vec<(Dimension, Vec<DisplayStep>)>,
}

impl UnitRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            units: Vec::new(),
            aliases: HashMap::new(),
            ladders: Vec::new(),
        }
    }

    /// Build the registry with the common metric, US and count units
    pub fn standard() -> Self {
        let mut registry = Self::new();

        // Mass, base grams
        registry.register(
            unit("g", "g", Dimension::Mass, Some(1.0), true),
            &["g", "gr", "gram", "grams", "gramme", "grammes"],
        );
        registry.register(
            unit("kg", "kg", Dimension::Mass, Some(1000.0), true),
            &["kg", "kilo", "kilos", "kilogram", "kilograms", "kilogramme", "kilogrammes"],
        );
        registry.register(
            unit("mg", "mg", Dimension::Mass, Some(0.001), true),
            &["mg", "milligram", "milligrams"],
        );
        registry.register(
            unit("oz", "oz", Dimension::Mass, Some(28.3495), false),
            &["oz", "ounce", "ounces"],
        );
        registry.register(
            unit("lb", "lb", Dimension::Mass, Some(453.592), false),
            &["lb", "lbs", "pound", "pounds"],
        );

        // Volume, base milliliters
        registry.register(
            unit("ml", "ml", Dimension::Volume, Some(1.0), true),
            &["ml", "milliliter", "milliliters", "millilitre", "millilitres"],
        );
        registry.register(
            unit("cl", "cl", Dimension::Volume, Some(10.0), true),
            &["cl", "centiliter", "centiliters", "centilitre", "centilitres"],
        );
        registry.register(
            unit("dl", "dl", Dimension::Volume, Some(100.0), true),
            &["dl", "deciliter", "deciliters", "decilitre", "decilitres"],
        );
        registry.register(
            unit("l", "l", Dimension::Volume, Some(1000.0), true),
            &["l", "liter", "liters", "litre", "litres"],
        );
        registry.register(
            unit("tsp", "tsp", Dimension::Volume, Some(4.929), false),
            &["tsp", "teaspoon", "teaspoons"],
        );
        registry.register(
            unit("tbsp", "tbsp", Dimension::Volume, Some(14.787), false),
            &["tbsp", "tbs", "tablespoon", "tablespoons"],
        );
        registry.register(
            unit("fl oz", "fl oz", Dimension::Volume, Some(29.574), false),
            &["fl oz", "floz", "fluid ounce", "fluid ounces"],
        );
        registry.register(
            unit("cup", "cups", Dimension::Volume, Some(236.588), false),
            &["cup", "cups", "c"],
        );
        registry.register(
            unit("pint", "pints", Dimension::Volume, Some(473.176), false),
            &["pint", "pints", "pt"],
        );
        registry.register(
            unit("quart", "quarts", Dimension::Volume, Some(946.353), false),
            &["quart", "quarts", "qt"],
        );
        registry.register(
            unit("gallon", "gallons", Dimension::Volume, Some(3785.41), false),
            &["gallon", "gallons", "gal"],
        );

        // Count units never convert
        let counts: &[(&'static str, &'static str, &[&str])] = &[
            ("clove", "cloves", &["clove", "cloves"]),
            ("can", "cans", &["can", "cans", "tin", "tins"]),
            ("bunch", "bunches", &["bunch", "bunches"]),
            ("pinch", "pinches", &["pinch", "pinches"]),
            ("dash", "dashes", &["dash", "dashes"]),
            ("package", "packages", &["package", "packages", "pkg", "pack", "packs"]),
            ("packet", "packets", &["packet", "packets", "sachet", "sachets"]),
            ("piece", "pieces", &["piece", "pieces"]),
            ("slice", "slices", &["slice", "slices"]),
            ("stick", "sticks", &["stick", "sticks"]),
            ("sprig", "sprigs", &["sprig", "sprigs"]),
            ("head", "heads", &["head", "heads"]),
            ("bottle", "bottles", &["bottle", "bottles"]),
            ("jar", "jars", &["jar", "jars"]),
            ("handful", "handfuls", &["handful", "handfuls"]),
        ];
        for &(canonical, plural, aliases) in counts {
            registry.register(unit(canonical, plural, Dimension::Count, None, false), aliases);
        }

        registry.set_ladder(
            Dimension::Mass,
            vec![
                DisplayStep { threshold: 1000.0, unit: "kg" },
                DisplayStep { threshold: 0.0, unit: "g" },
            ],
        );
        registry.set_ladder(
            Dimension::Volume,
            vec![
                DisplayStep { threshold: 1000.0, unit: "l" },
                DisplayStep { threshold: 0.0, unit: "ml" },
            ],
        );

        registry
    }

    /// Add a unit and the aliases that resolve to it
    pub fn register(&mut self, def: UnitDef, aliases: &[&str]) {
        let index = self.units.len();
        self.aliases.insert(def.canonical.to_string(), index);
        for alias in aliases {
            self.aliases.insert(normalize_token(alias), index);
        }
        self.units.push(def);
    }

    /// Set the display ladder of a dimension
    ///
    /// Steps are kept ordered by descending threshold.
    pub fn set_ladder(&mut self, dimension: Dimension, mut steps: Vec<DisplayStep>) {
        steps.sort_by(|a, b| b.threshold.total_cmp(&a.threshold));
        self.ladders.retain(|(d, _)| *d != dimension);
        self.ladders.push((dimension, steps));
    }

    /// Resolve a unit token ("Tbsp.", "cups", "fl oz") to its definition
    ///
    /// Falls back to dropping a trailing "s" for plurals not listed as aliases.
    pub fn lookup(&self, token: &str) -> Option<&UnitDef> {
        let token = normalize_token(token);
        if let Some(&index) = self.aliases.get(&token) {
            return Some(&self.units[index]);
        }

        if token.len() > 2 {
            if let Some(singular) = token.strip_suffix('s') {
                return self.aliases.get(singular).map(|&index| &self.units[index]);
            }
        }

        None
    }

    /// Check if the token names a known unit
    pub fn is_unit(&self, token: &str) -> bool {
        self.lookup(token).is_some()
    }

    /// Dimension of an optional unit; `None` is [`Dimension::Unspecified`]
    pub fn dimension_of(&self, unit: Option<&str>) -> Result<Dimension, UnitError> {
        match unit {
            None => Ok(Dimension::Unspecified),
            Some(unit) => self
                .lookup(unit)
                .map(|def| def.dimension)
                .ok_or_else(|| UnitError::UnknownUnit(unit.to_string())),
        }
    }

    /// Canonical name of the base unit of a convertible dimension
    pub fn base_unit(&self, dimension: Dimension) -> Option<&'static str> {
        self.units
            .iter()
            .find(|def| def.dimension == dimension && def.factor == Some(1.0))
            .map(|def| def.canonical)
    }

    /// Convert an amount between two units of the same dimension
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shopping_list::unit_registry::UnitRegistry;
    ///
    /// let registry = UnitRegistry::standard();
    /// assert_eq!(registry.convert(1500.0, "g", "kg")?, 1.5);
    /// assert!(registry.convert(1.0, "cup", "g").is_err());
    /// # Ok::<(), shopping_list::unit_registry::UnitError>(())
    /// ```
    pub fn convert(&self, amount: f64, from_unit: &str, to_unit: &str) -> Result<f64, UnitError> {
        let from = self
            .lookup(from_unit)
            .ok_or_else(|| UnitError::UnknownUnit(from_unit.to_string()))?;
        let to = self
            .lookup(to_unit)
            .ok_or_else(|| UnitError::UnknownUnit(to_unit.to_string()))?;

        if from.dimension != to.dimension {
            return Err(UnitError::IncompatibleUnits {
                from: from.canonical.to_string(),
                to: to.canonical.to_string(),
                from_dimension: from.dimension,
                to_dimension: to.dimension,
            });
        }

        match (from.factor, to.factor) {
            (Some(from_factor), Some(to_factor)) => Ok(amount * from_factor / to_factor),
            _ => Err(UnitError::NotConvertible(from.dimension)),
        }
    }

    /// Convert an amount to its dimension's base unit
    pub fn to_base(&self, amount: f64, unit: &str) -> Result<f64, UnitError> {
        let def = self
            .lookup(unit)
            .ok_or_else(|| UnitError::UnknownUnit(unit.to_string()))?;
        def.factor
            .map(|factor| amount * factor)
            .ok_or(UnitError::NotConvertible(def.dimension))
    }

    /// Pick the display unit for a base amount using the dimension's ladder
    ///
    /// The returned amount is rounded to [`DISPLAY_DECIMALS`].
    pub fn preferred_display(
        &self,
        dimension: Dimension,
        base_amount: f64,
    ) -> Result<Quantity, UnitError> {
        let steps = self
            .ladders
            .iter()
            .find(|(d, _)| *d == dimension)
            .map(|(_, steps)| steps)
            .ok_or(UnitError::NotConvertible(dimension))?;

        let base = self
            .base_unit(dimension)
            .ok_or(UnitError::NotConvertible(dimension))?;
        let step = steps
            .iter()
            .find(|step| base_amount >= step.threshold)
            .or_else(|| steps.last())
            .ok_or(UnitError::NotConvertible(dimension))?;

        let amount = self.convert(base_amount, base, step.unit)?;
        Ok(Quantity::new(round_display(amount), Some(step.unit)))
    }

    /// Render a quantity: "1kg", "2 cups", "1 clove", "3"
    pub fn format_quantity(&self, quantity: &Quantity) -> String {
        let amount = format_amount(quantity.amount);
        match quantity.unit.as_deref() {
            None => amount,
            Some(unit) => match self.lookup(unit) {
                Some(def) if def.attached => format!("{amount}{}", def.canonical),
                Some(def) => {
                    let name = if quantity.amount == 1.0 { def.canonical } else { def.plural };
                    format!("{amount} {name}")
                }
                None => format!("{amount} {unit}"),
            },
        }
    }
}

impl Default for UnitRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

/// Round to [`DISPLAY_DECIMALS`] decimals
pub fn round_display(amount: f64) -> f64 {
    let scale = 10f64.powi(DISPLAY_DECIMALS);
    (amount * scale).round() / scale
}

/// Format an amount with at most two decimals and no trailing zeros
pub fn format_amount(amount: f64) -> String {
    let text = format!("{:.*}", DISPLAY_DECIMALS as usize, round_display(amount));
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}

fn unit(
    canonical: &'static str,
    plural: &'static str,
    dimension: Dimension,
    factor: Option<f64>,
    attached: bool,
) -> UnitDef {
    UnitDef {
        canonical,
        plural,
        dimension,
        factor,
        attached,
    }
}

/// Lower-case, drop dots, collapse whitespace: "Fl. Oz" -> "fl oz"
fn normalize_token(token: &str) -> String {
    token
        .to_lowercase()
        .replace('.', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
