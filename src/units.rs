//! Token amount conversions.
//!
//! Chain-side amounts are smallest-unit integers scaled by 10^18. They cross
//! the wire and the datastore as decimal strings; display values use the
//! `"100.0"` style the token tooling emits.

use thiserror::Error;

/// Token decimal places
pub const TOKEN_DECIMALS: u32 = 18;

const SCALE: u128 = 10u128.pow(TOKEN_DECIMALS);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UnitsError {
    #[error("amount is not a decimal integer: {0:?}")]
    NotAnInteger(String),
}

/// Parse a smallest-unit amount from its decimal-string form.
pub fn parse_base_units(raw: &str) -> Result<u128, UnitsError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(UnitsError::NotAnInteger(raw.to_string()));
    }
    trimmed
        .parse::<u128>()
        .map_err(|_| UnitsError::NotAnInteger(raw.to_string()))
}

/// Format a smallest-unit amount as a token-denominated display string.
///
/// Whole amounts keep a single trailing zero (`"100.0"`); fractional amounts
/// trim trailing zeros (`"1.5"`, `"0.1"`).
pub fn format_tokens(base_units: u128) -> String {
    let whole = base_units / SCALE;
    let frac = base_units % SCALE;
    if frac == 0 {
        format!("{whole}.0")
    } else {
        let frac_str = format!("{:018}", frac);
        let trimmed = frac_str.trim_end_matches('0');
        format!("{whole}.{trimmed}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_tokens() {
        assert_eq!(format_tokens(0), "0.0");
        assert_eq!(format_tokens(SCALE), "1.0");
        assert_eq!(format_tokens(10 * SCALE), "10.0");
        assert_eq!(format_tokens(100 * SCALE), "100.0");
        assert_eq!(format_tokens(SCALE + SCALE / 2), "1.5");
        assert_eq!(format_tokens(SCALE / 10), "0.1");
        assert_eq!(format_tokens(123_456_789), "0.000000000123456789");
    }

    #[test]
    fn test_format_tokens_catalogue_amounts() {
        // The four configured action rewards
        assert_eq!(format_tokens(100_000_000_000_000_000_000), "100.0");
        assert_eq!(format_tokens(10_000_000_000_000_000_000), "10.0");
        assert_eq!(format_tokens(50_000_000_000_000_000_000), "50.0");
        assert_eq!(format_tokens(25_000_000_000_000_000_000), "25.0");
    }

    #[test]
    fn test_parse_base_units() {
        assert_eq!(parse_base_units("0"), Ok(0));
        assert_eq!(
            parse_base_units("100000000000000000000"),
            Ok(100_000_000_000_000_000_000)
        );
        assert!(parse_base_units("").is_err());
        assert!(parse_base_units("12.5").is_err());
        assert!(parse_base_units("-3").is_err());
        assert!(parse_base_units("0x64").is_err());
    }

    #[test]
    fn test_parse_format_round_trip() {
        let wei = parse_base_units("100000000000000000000").unwrap();
        assert_eq!(format_tokens(wei), "100.0");
    }
}
