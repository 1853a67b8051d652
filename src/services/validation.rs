//! Field validators for note headers and line items
//!
//! Pure functions with no I/O. Patterns are anchored at the start of the
//! input. The RFC pattern is not anchored at the end, so a well-formed
//! prefix followed by extra characters is accepted.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::Money;

/// 3-4 letters (including Ñ and &), 6 digits, then a 3-character homoclave
static RFC_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Z&Ñ]{3,4}[0-9]{6}[A-V1-9][A-Z1-9][0-9A]").expect("RFC pattern is valid")
});

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w.-]+@[\w.-]+$").expect("email pattern is valid"));

/// Check a Mexican tax identifier (simplified RFC shape, no checksum)
pub fn valid_tax_id(s: &str) -> bool {
    RFC_PATTERN.is_match(s)
}

/// Check a basic `local@domain` email shape
pub fn valid_email(s: &str) -> bool {
    EMAIL_PATTERN.is_match(s)
}

/// A line item cost must be strictly positive
pub fn valid_line_item(cost: Money) -> bool {
    cost.is_positive()
}
