//! # Measurement Patterns Module
//!
//! This module contains regex patterns and constants used by the ingredient parser.

use lazy_static::lazy_static;
use regex::Regex;

// Leading quantity: mixed number, vulgar fraction, simple fraction, range, or plain number
pub const QUANTITY_PATTERN: &str = concat!(
    r"^(?:",
    r"(?P<mixed_whole>\d+)\s+(?P<mixed_num>\d+)\s*[/⁄]\s*(?P<mixed_den>\d+)",
    r"|(?P<vulgar_whole>\d+)?\s*(?P<vulgar>[½⅓⅔¼¾⅕⅖⅗⅘⅙⅚⅛⅜⅝⅞])",
    r"|(?P<num>\d+)\s*[/⁄]\s*(?P<den>\d+)",
    r"|(?P<low>\d+(?:\.\d+)?)\s*(?:-|–|—|to|or)\s*(?P<high>\d+(?:\.\d+)?)",
    r"|(?P<number>\d+(?:\.\d+)?|\.\d+)",
    r")"
);

// Leading bullet markers: "- ", "* ", "• ", "+ "
pub const BULLET_PATTERN: &str = r"^\s*(?:[-*•+]\s*)+";

// "to taste" (or ", or to taste") and everything after it
pub const TO_TASTE_PATTERN: &str = r"(?i)[\s,]*(?:\bor\s+)?\bto\s+taste\b.*$";

// A trailing "(...)" modifier
pub const TRAILING_PARENTHETICAL_PATTERN: &str = r"\s*\([^()]*\)\s*$";

// Lazy static regexes to avoid recompilation
lazy_static! {
    pub static ref QUANTITY_REGEX: Regex =
        Regex::new(QUANTITY_PATTERN).expect("Quantity pattern should be valid");
    pub static ref BULLET_REGEX: Regex =
        Regex::new(BULLET_PATTERN).expect("Bullet pattern should be valid");
    pub static ref TO_TASTE_REGEX: Regex =
        Regex::new(TO_TASTE_PATTERN).expect("To-taste pattern should be valid");
    pub static ref TRAILING_PARENTHETICAL_REGEX: Regex = Regex::new(TRAILING_PARENTHETICAL_PATTERN)
        .expect("Trailing parenthetical pattern should be valid");
}

/// Numeric value of a unicode vulgar fraction character
pub fn vulgar_fraction_value(c: char) -> Option<f64> {
    let value = match c {
        '½' => 1.0 / 2.0,
        '⅓' => 1.0 / 3.0,
        '⅔' => 2.0 / 3.0,
        '¼' => 1.0 / 4.0,
        '¾' => 3.0 / 4.0,
        '⅕' => 1.0 / 5.0,
        '⅖' => 2.0 / 5.0,
        '⅗' => 3.0 / 5.0,
        '⅘' => 4.0 / 5.0,
        '⅙' => 1.0 / 6.0,
        '⅚' => 5.0 / 6.0,
        '⅛' => 1.0 / 8.0,
        '⅜' => 3.0 / 8.0,
        '⅝' => 5.0 / 8.0,
        '⅞' => 7.0 / 8.0,
        _ => return None,
    };
    Some(value)
}
