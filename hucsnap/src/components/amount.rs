//! Exact-decimal conversion of snapshot balances.

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};

/// Number of fractional digits in a Huntercoin (and successor-chain) amount.
pub(crate) const PRECISION: u32 = 8;

/// Successor-chain coins paid out per whole snapshot coin.
pub(crate) fn default_exchange_rate() -> Decimal {
    Decimal::new(23_338_000, PRECISION)
}

/// Rounds an amount to the ledger's native granularity.
///
/// The resulting value always carries exactly [`PRECISION`] fractional digits, so that it
/// renders the same way no matter how it was originally written.
pub(crate) fn quantize(value: Decimal) -> Decimal {
    let mut value = value.round_dp_with_strategy(PRECISION, RoundingStrategy::MidpointNearestEven);
    value.rescale(PRECISION);
    value
}

/// A balance split into the parts that take part in the conversion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Converted {
    pub(crate) exact: Decimal,
    pub(crate) whole: u64,
    pub(crate) successor: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum AmountError {
    Negative,
    Overflow,
}

/// Converts a snapshot balance at the given rate.
///
/// Only whole coins are converted; any fractional remainder is dropped. The whole coins
/// are taken from the balance as written, so rounding excess digits never adds a coin.
pub(crate) fn convert(balance: Decimal, rate: Decimal) -> Result<Converted, AmountError> {
    if balance.is_sign_negative() && !balance.is_zero() {
        return Err(AmountError::Negative);
    }

    let exact = quantize(balance);
    let whole_part = balance.trunc();
    let whole = whole_part.to_u64().ok_or(AmountError::Overflow)?;
    let successor = whole_part
        .checked_mul(rate)
        .map(quantize)
        .ok_or(AmountError::Overflow)?;

    Ok(Converted {
        exact,
        whole,
        successor,
    })
}

/// Checks that a configured exchange rate is usable without rounding.
pub(crate) fn validate_rate(rate: Decimal) -> bool {
    rate.is_sign_positive() && !rate.is_zero() && rate.normalize().scale() <= PRECISION
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rust_decimal::Decimal;

    use super::{AmountError, convert, default_exchange_rate, quantize, validate_rate};

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn truncates_to_whole_units() {
        let c = convert(dec("12.99999999"), default_exchange_rate()).unwrap();
        assert_eq!(c.exact.to_string(), "12.99999999");
        assert_eq!(c.whole, 12);
        assert_eq!(c.successor.to_string(), "2.80056000");
    }

    #[test]
    fn whole_balance_converts_fully() {
        let c = convert(dec("5.00000000"), default_exchange_rate()).unwrap();
        assert_eq!(c.whole, 5);
        assert_eq!(c.successor.to_string(), "1.16690000");
    }

    #[test]
    fn dust_converts_to_zero() {
        let c = convert(dec("0.99999999"), default_exchange_rate()).unwrap();
        assert_eq!(c.whole, 0);
        assert_eq!(c.successor.to_string(), "0.00000000");
    }

    #[test]
    fn short_inputs_are_padded() {
        let c = convert(dec("7"), default_exchange_rate()).unwrap();
        assert_eq!(c.exact.to_string(), "7.00000000");
        assert_eq!(c.successor.to_string(), "1.63366000");
    }

    #[test]
    fn excess_digits_round_half_even() {
        assert_eq!(quantize(dec("1.000000005")).to_string(), "1.00000000");
        assert_eq!(quantize(dec("1.000000015")).to_string(), "1.00000002");
    }

    #[test]
    fn no_cumulative_error() {
        let rate = default_exchange_rate();
        let mut total = Decimal::ZERO;
        for _ in 0..1_000_000 {
            total += convert(dec("1.5"), rate).unwrap().successor;
        }
        assert_eq!(total, dec("233380.00000000"));
    }

    #[test]
    fn rounding_never_adds_a_whole_coin() {
        let c = convert(dec("12.999999995"), default_exchange_rate()).unwrap();
        assert_eq!(c.exact.to_string(), "13.00000000");
        assert_eq!(c.whole, 12);
        assert_eq!(c.successor.to_string(), "2.80056000");

        let c = convert(dec("12.999999999999998"), default_exchange_rate()).unwrap();
        assert_eq!(c.whole, 12);
    }

    #[test]
    fn rejects_negative_balances() {
        assert_eq!(
            convert(dec("-1"), default_exchange_rate()),
            Err(AmountError::Negative)
        );
    }

    #[test]
    fn rate_validation() {
        assert!(validate_rate(default_exchange_rate()));
        assert!(validate_rate(dec("0.23338")));
        assert!(validate_rate(dec("0.233380000000")));
        assert!(!validate_rate(dec("0.000000001")));
        assert!(!validate_rate(Decimal::ZERO));
        assert!(!validate_rate(dec("-0.5")));
    }
}
