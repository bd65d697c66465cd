//! # Shopping List
//!
//! Turns the ingredient sections of several recipes into one deduplicated,
//! unit-normalized shopping list, split by pantry membership and ordered by
//! store zone.
//!
//! The pipeline per request is parse, scale, aggregate, pantry filter, zone
//! sort, render; [`shopping_list::ShoppingListBuilder`] runs it end to end.

pub mod aggregator;
pub mod config;
pub mod errors;
pub mod ingredient_model;
pub mod ingredient_parser;
pub mod measurement_patterns;
pub mod pantry;
pub mod recipe_document;
pub mod scaler;
pub mod shopping_list;
pub mod unit_registry;
pub mod zones;
