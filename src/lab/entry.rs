//! Numeric entry parsing
//!
//! Text typed into a field either parses under its rules or is ignored
//! outright; invalid input never reaches lab state.

/// Bounds and precision accepted by a numeric field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntryRules {
    pub min: f64,
    pub max: f64,
    pub max_decimals: usize,
}

impl EntryRules {
    /// Measured or computed quantities: any sign, up to 4 decimals
    pub const fn measurement() -> Self {
        Self {
            min: f64::NEG_INFINITY,
            max: f64::INFINITY,
            max_decimals: 4,
        }
    }

    /// Awarded points: 0..=max_points, one decimal
    pub const fn points(max_points: f64) -> Self {
        Self {
            min: 0.0,
            max: max_points,
            max_decimals: 1,
        }
    }
}

/// Parse `text` under `rules`; `None` means "leave the field unchanged"
pub fn parse_entry(text: &str, rules: &EntryRules) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    // Only plain decimal notation: no exponents, no inf/nan spellings
    let digits = text.strip_prefix(['-', '+']).unwrap_or(text);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return None;
    }
    let mut parts = digits.split('.');
    let whole = parts.next().unwrap_or("");
    let fraction = parts.next();
    if parts.next().is_some() {
        return None;
    }
    if whole.is_empty() && fraction.is_none_or(str::is_empty) {
        return None;
    }
    if fraction.is_some_and(|f| f.len() > rules.max_decimals) {
        return None;
    }

    let value: f64 = text.parse().ok()?;
    if !value.is_finite() || value < rules.min || value > rules.max {
        return None;
    }
    Some(value)
}
