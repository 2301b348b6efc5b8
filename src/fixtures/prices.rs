//! Price strings

use rust_decimal::{Decimal, prelude::ToPrimitive};
use rusty_money::iso::{self, Currency};

use crate::fixtures::FixtureError;

/// Parse a price string (e.g. `"45.00 USD"`) into minor units and currency.
///
/// The amount may not carry more decimal places than the currency allows.
///
/// # Errors
///
/// Returns [`FixtureError::InvalidPrice`] when the string is not in the form
/// `AMOUNT CURRENCY` or the amount is negative or too precise, and
/// [`FixtureError::UnknownCurrency`] for unrecognised ISO codes.
pub fn parse_price(s: &str) -> Result<(u64, &'static Currency), FixtureError> {
    let mut parts = s.split_whitespace();

    let (Some(amount), Some(code), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let currency = iso::find(code).ok_or_else(|| FixtureError::UnknownCurrency(code.to_string()))?;

    let amount = amount
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    let minor = amount
        .checked_mul(Decimal::from(10_u64.pow(currency.exponent)))
        .filter(|minor| minor.fract().is_zero())
        .and_then(|minor| minor.to_u64())
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    Ok((minor, currency))
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{EUR, JPY, USD};
    use testresult::TestResult;

    use super::*;

    #[test]
    fn parses_amount_in_minor_units() -> TestResult {
        assert_eq!(parse_price("45.00 USD")?, (4_500, USD));
        assert_eq!(parse_price("2.5 EUR")?, (250, EUR));
        assert_eq!(parse_price("1200 JPY")?, (1_200, JPY));

        Ok(())
    }

    #[test]
    fn rejects_malformed_prices() {
        assert!(matches!(parse_price("45.00USD"), Err(FixtureError::InvalidPrice(_))));
        assert!(matches!(parse_price("1 USD extra"), Err(FixtureError::InvalidPrice(_))));
        assert!(matches!(parse_price("-1.00 USD"), Err(FixtureError::InvalidPrice(_))));
        assert!(matches!(parse_price("1.005 USD"), Err(FixtureError::InvalidPrice(_))));
    }

    #[test]
    fn rejects_unknown_currency() {
        let result = parse_price("2.99 ABC");

        assert!(matches!(result, Err(FixtureError::UnknownCurrency(code)) if code == "ABC"));
    }
}
