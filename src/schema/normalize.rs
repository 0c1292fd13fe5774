//! Identifier normalization

use convert_case::{Case, Casing};

/// Normalize a list title or field name into a snake_case identifier
///
/// Word boundaries follow the usual snake conversion (lower->upper, acronyms,
/// letter/digit), everything is lower-cased, and any remaining ASCII spaces or
/// hyphens become `_`. Applying it twice yields the same result.
pub fn normalize(name: &str) -> String {
    name.to_case(Case::Snake).replace([' ', '-'], "_")
}
