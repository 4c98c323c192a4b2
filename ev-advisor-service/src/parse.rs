use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

/// Why a turn could not be read as an amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("no number found in input")]
    Missing,

    #[error("negative amounts are not accepted")]
    Negative,
}

// Optional sign, then either a thousands-grouped integer ("30,000") or a
// plain integer, with an optional decimal part.
const AMOUNT_PATTERN: &str = r"-?(?:\d{1,3}(?:,\d{3})+|\d+)(?:\.\d+)?";

fn amount_regex() -> &'static Regex {
    static AMOUNT_RE: OnceLock<Regex> = OnceLock::new();
    AMOUNT_RE.get_or_init(|| Regex::new(AMOUNT_PATTERN).expect("valid amount pattern"))
}

/// Extract the first well-formed number from a free-text turn.
///
/// "around €30,000 please" parses as 30000.0 and "year 2024" as 2024.0, but
/// input without a number token, or whose first token is negated, is
/// rejected with a typed error rather than silently coerced.
pub fn extract_amount(input: &str) -> Result<f64, AmountError> {
    let token = amount_regex()
        .find(input)
        .map(|m| m.as_str())
        .ok_or(AmountError::Missing)?;

    if token.starts_with('-') {
        return Err(AmountError::Negative);
    }

    token
        .replace(',', "")
        .parse::<f64>()
        .map_err(|_| AmountError::Missing)
}
