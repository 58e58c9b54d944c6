use std::{fmt, str::FromStr};

use crate::error::ConsoleError;

/// Strictly positive money amount in **integer minor units**.
///
/// Credit/debit forms submit amounts as text; parsing happens here, before
/// any network call, so a malformed or non-positive amount never leaves the
/// client. Balances coming back from the server stay raw `i64` minor units.
///
/// Parsing accepts `.` or `,` as the decimal separator and at most two
/// fractional digits:
///
/// ```rust
/// use console::Amount;
///
/// assert_eq!("25".parse::<Amount>().unwrap().minor(), 2500);
/// assert_eq!("9,99".parse::<Amount>().unwrap().minor(), 999);
/// assert!("0".parse::<Amount>().is_err());
/// assert!("1.005".parse::<Amount>().is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(i64);

impl Amount {
    /// Wraps an already-validated amount in minor units.
    ///
    /// Rejects zero and negative values; mutation amounts are strictly
    /// positive by contract.
    pub fn from_minor(minor: i64) -> Result<Self, ConsoleError> {
        if minor <= 0 {
            return Err(ConsoleError::Validation(
                "amount must be greater than zero".to_string(),
            ));
        }
        Ok(Self(minor))
    }

    #[must_use]
    pub const fn minor(self) -> i64 {
        self.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl FromStr for Amount {
    type Err = ConsoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConsoleError::Validation(format!("invalid amount: '{s}'"));

        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ConsoleError::Validation("amount is empty".to_string()));
        }
        if trimmed.starts_with('-') || trimmed.starts_with('+') {
            // Signs are rejected outright: direction comes from the form, not
            // from the amount field.
            return Err(invalid());
        }

        let normalized = trimmed.replace(',', ".");
        let (units_str, frac_str) = match normalized.split_once('.') {
            None => (normalized.as_str(), ""),
            Some((units, frac)) => (units, frac),
        };

        if units_str.is_empty()
            || !units_str.chars().all(|c| c.is_ascii_digit())
            || !frac_str.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid());
        }

        let units: i64 = units_str.parse().map_err(|_| invalid())?;
        let cents: i64 = match frac_str.len() {
            0 => 0,
            1 => frac_str.parse::<i64>().map_err(|_| invalid())? * 10,
            2 => frac_str.parse::<i64>().map_err(|_| invalid())?,
            _ => {
                return Err(ConsoleError::Validation(format!(
                    "too many decimals: '{s}'"
                )));
            }
        };

        let minor = units
            .checked_mul(100)
            .and_then(|v| v.checked_add(cents))
            .ok_or_else(|| ConsoleError::Validation(format!("amount too large: '{s}'")))?;

        Self::from_minor(minor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_dot_or_comma() {
        assert_eq!("10".parse::<Amount>().unwrap().minor(), 1000);
        assert_eq!("10.5".parse::<Amount>().unwrap().minor(), 1050);
        assert_eq!("10,50".parse::<Amount>().unwrap().minor(), 1050);
        assert_eq!(" 2.30 ".parse::<Amount>().unwrap().minor(), 230);
    }

    #[test]
    fn parse_rejects_non_positive() {
        assert!("0".parse::<Amount>().is_err());
        assert!("0.00".parse::<Amount>().is_err());
        assert!("-5".parse::<Amount>().is_err());
        assert!("+5".parse::<Amount>().is_err());
    }

    #[test]
    fn parse_rejects_garbage_and_extra_decimals() {
        assert!("".parse::<Amount>().is_err());
        assert!("abc".parse::<Amount>().is_err());
        assert!("1.2.3".parse::<Amount>().is_err());
        assert!("12.345".parse::<Amount>().is_err());
    }

    #[test]
    fn display_two_decimals() {
        assert_eq!(Amount::from_minor(1).unwrap().to_string(), "0.01");
        assert_eq!(Amount::from_minor(1050).unwrap().to_string(), "10.50");
    }
}
