//! # Store Zones
//!
//! Orders a shopping list along the shopper's walk through the store. Zones
//! are declared in configuration order; an item belongs to the first zone with
//! a pattern contained in its descriptor. Items matching no zone go last,
//! alphabetically.
//!
//! Also builds the coverage report used to grow the zone configuration: how
//! many items each zone picks up and which descriptors fall through.

use crate::ingredient_model::{AggregatedItem, UNZONED};
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A store zone and the descriptor patterns that belong to it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneRule {
    pub zone_label: String,

    /// Position in the configuration, first declared is walked first
    pub order_index: usize,

    /// Lower-cased substrings, checked in order
    pub patterns: Vec<String>,
}

impl ZoneRule {
    pub fn new(zone_label: &str, order_index: usize, patterns: &[&str]) -> Self {
        Self {
            zone_label: zone_label.trim().to_string(),
            order_index,
            patterns: patterns
                .iter()
                .map(|p| p.trim().to_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    pub fn matches(&self, descriptor: &str) -> bool {
        let descriptor = descriptor.to_lowercase();
        self.patterns
            .iter()
            .any(|pattern| descriptor.contains(pattern.as_str()))
    }
}

/// Build ordered zone rules from `(label, patterns)` pairs
///
/// Order indexes follow the slice order.
pub fn zone_rules_from<S: AsRef<str>>(zones: &[(S, Vec<S>)]) -> Vec<ZoneRule> {
    zones
        .iter()
        .enumerate()
        .map(|(index, (label, patterns))| {
            let patterns: Vec<&str> = patterns.iter().map(AsRef::as_ref).collect();
            ZoneRule::new(label.as_ref(), index, &patterns)
        })
        .collect()
}

/// Sort index for items matching no zone, greater than every configured zone
pub fn unzoned_index(rules: &[ZoneRule]) -> usize {
    rules
        .iter()
        .map(|rule| rule.order_index + 1)
        .max()
        .unwrap_or(0)
}

/// Zone with the lowest order index that matches the descriptor
pub fn assign_zone<'r>(descriptor: &str, rules: &'r [ZoneRule]) -> Option<&'r ZoneRule> {
    rules
        .iter()
        .filter(|rule| rule.matches(descriptor))
        .min_by_key(|rule| rule.order_index)
}

/// Label every item with its zone and sort by zone, then descriptor
pub fn sort_by_zone(items: &mut [AggregatedItem], rules: &[ZoneRule]) {
    let fallback = unzoned_index(rules);

    for item in items.iter_mut() {
        item.zone = match assign_zone(item.descriptor.as_str(), rules) {
            Some(rule) => rule.zone_label.clone(),
            None => UNZONED.to_string(),
        };
        trace!("'{}' -> zone '{}'", item.descriptor, item.zone);
    }

    items.sort_by_cached_key(|item| {
        let index = assign_zone(item.descriptor.as_str(), rules)
            .map_or(fallback, |rule| rule.order_index);
        (index, item.descriptor.as_str().to_lowercase())
    });
}

/// Item counts for one zone
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZoneCount {
    pub zone_label: String,
    pub count: usize,
}

/// How well the zone configuration covers a set of descriptors
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ZoneReport {
    pub total: usize,
    pub zoned: usize,
    /// Every configured zone in walk order, including empty ones
    pub distribution: Vec<ZoneCount>,
    /// Unmatched descriptors with occurrence counts, most frequent first
    pub unzoned: Vec<(String, usize)>,
}

impl ZoneReport {
    /// Share of descriptors that landed in a zone, in percent
    pub fn coverage_percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.zoned as f64 * 100.0 / self.total as f64
        }
    }
}

/// Count descriptors per zone and collect the ones no zone picks up
pub fn zone_report<S: AsRef<str>>(descriptors: &[S], rules: &[ZoneRule]) -> ZoneReport {
    let mut ordered: Vec<&ZoneRule> = rules.iter().collect();
    ordered.sort_by_key(|rule| rule.order_index);

    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut unzoned: HashMap<String, usize> = HashMap::new();

    for descriptor in descriptors {
        let descriptor = descriptor.as_ref();
        match assign_zone(descriptor, rules) {
            Some(rule) => *counts.entry(rule.zone_label.as_str()).or_insert(0) += 1,
            None => *unzoned.entry(descriptor.to_lowercase()).or_insert(0) += 1,
        }
    }

    let distribution: Vec<ZoneCount> = ordered
        .iter()
        .map(|rule| ZoneCount {
            zone_label: rule.zone_label.clone(),
            count: counts.get(rule.zone_label.as_str()).copied().unwrap_or(0),
        })
        .collect();

    let mut unzoned: Vec<(String, usize)> = unzoned.into_iter().collect();
    unzoned.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let zoned = distribution.iter().map(|zone| zone.count).sum();
    debug!(
        "Zone report: {} of {} descriptors zoned, {} distinct unzoned",
        zoned,
        descriptors.len(),
        unzoned.len()
    );

    ZoneReport {
        total: descriptors.len(),
        zoned,
        distribution,
        unzoned,
    }
}

/// List the configured zones in walk order, one zone and its patterns per line
pub fn format_zone_rules(rules: &[ZoneRule]) -> String {
    if rules.is_empty() {
        return "No zones configured\n".to_string();
    }

    let mut ordered: Vec<&ZoneRule> = rules.iter().collect();
    ordered.sort_by_key(|rule| rule.order_index);

    let mut text = format!("{} zones configured:\n", ordered.len());
    for rule in ordered {
        text.push_str(&format!("  {}: {}\n", rule.zone_label, rule.patterns.join(", ")));
    }
    text
}

impl fmt::Display for ZoneReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Zone coverage: {} of {} items ({:.1}%)",
            self.zoned,
            self.total,
            self.coverage_percent()
        )?;
        writeln!(f)?;
        writeln!(f, "Items per zone:")?;
        for zone in &self.distribution {
            writeln!(f, "  {}: {}", zone.zone_label, zone.count)?;
        }
        if !self.unzoned.is_empty() {
            writeln!(f)?;
            writeln!(f, "Unzoned items:")?;
            for (descriptor, count) in &self.unzoned {
                writeln!(f, "  {} ({})", descriptor, count)?;
            }
        }
        Ok(())
    }
}
