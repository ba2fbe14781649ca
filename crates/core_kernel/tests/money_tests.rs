//! Integration tests for money types

use core_kernel::{Money, Currency, MoneyError};
use rust_decimal_macros::dec;

#[test]
fn display_uses_currency_symbol() {
    let m = Money::rupees(dec!(1500.5));
    assert_eq!(m.to_string(), "₹1500.50");

    let m = Money::new(dec!(42), Currency::USD);
    assert_eq!(m.to_string(), "$42.00");
}

#[test]
fn amounts_are_rounded_to_two_places() {
    let m = Money::rupees(dec!(10.006));
    assert_eq!(m.amount(), dec!(10.01));
}

#[test]
fn zero_is_neither_positive_nor_negative() {
    let zero = Money::zero(Currency::INR);
    assert!(zero.is_zero());
    assert!(!zero.is_positive());
    assert!(!zero.is_negative());
}

#[test]
fn checked_ops_reject_mixed_currencies() {
    let inr = Money::rupees(dec!(100));
    let gbp = Money::new(dec!(100), Currency::GBP);

    assert!(matches!(
        inr.checked_sub(&gbp),
        Err(MoneyError::CurrencyMismatch(_, _))
    ));
}

#[test]
fn serde_round_trip() {
    let m = Money::rupees(dec!(800));
    let json = serde_json::to_string(&m).unwrap();
    let back: Money = serde_json::from_str(&json).unwrap();
    assert_eq!(m, back);
}
