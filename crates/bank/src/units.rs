//! Conversion between decimal ether strings and base units.

use alloy_primitives::{
    U256,
    utils::{ParseUnits, Unit},
};

use crate::error::AmountError;

/// Converts a decimal ether amount like `"1.5"` into wei.
///
/// Negative amounts, non-numeric input and amounts finer than one wei are rejected.
///
/// # Example
///
/// ```
/// use alloy_primitives::U256;
/// use ntc_bank::units::parse_ether;
///
/// assert_eq!(parse_ether("1.5")?, U256::from(1_500_000_000_000_000_000u128));
/// assert_eq!(parse_ether("0.000000000000000001")?, U256::from(1));
/// assert!(parse_ether("-1").is_err());
/// # Ok::<_, ntc_bank::error::AmountError>(())
/// ```
pub fn parse_ether(amount: &str) -> Result<U256, AmountError> {
    let amount = amount.trim();
    if amount.is_empty() {
        return Err(AmountError::Empty);
    }
    if amount.starts_with('-') {
        return Err(AmountError::Negative(amount.to_string()));
    }
    // parsing would silently truncate digits finer than one wei
    if let Some((_, frac)) = amount.split_once('.')
        && frac.len() > Unit::ETHER.get() as usize
    {
        return Err(AmountError::TooPrecise(amount.to_string()));
    }
    match ParseUnits::parse_units(amount, Unit::ETHER) {
        Ok(ParseUnits::U256(value)) => Ok(value),
        Ok(ParseUnits::I256(_)) => Err(AmountError::Negative(amount.to_string())),
        Err(source) => Err(AmountError::Invalid { amount: amount.to_string(), source }),
    }
}

/// Formats wei as decimal ether, keeping at least one fractional digit.
///
/// # Example
///
/// ```
/// use alloy_primitives::U256;
/// use ntc_bank::units::format_ether;
///
/// assert_eq!(format_ether(U256::ZERO), "0.0");
/// assert_eq!(format_ether(U256::from(1_500_000_000_000_000_000u128)), "1.5");
/// assert_eq!(format_ether(U256::from(1)), "0.000000000000000001");
/// ```
pub fn format_ether(value: U256) -> String {
    let formatted = ParseUnits::U256(value).format_units(Unit::ETHER);
    match formatted.split_once('.') {
        Some((int, frac)) => {
            let frac = frac.trim_end_matches('0');
            format!("{int}.{}", if frac.is_empty() { "0" } else { frac })
        }
        None => format!("{formatted}.0"),
    }
}
