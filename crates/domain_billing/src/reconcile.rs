//! Invoice status reconciliation
//!
//! The status of an invoice is derived from its total and the cumulative
//! amount paid against it. The derivation is deliberately one-way:
//! reconciliation promotes a status but never demotes one, and an invoice
//! cancelled by an explicit update stays cancelled no matter what the
//! ledger says.

use core_kernel::Money;

use crate::invoice::InvoiceStatus;

/// Derives the status an invoice should carry given the cumulative paid sum
///
/// Rules:
/// - `Cancelled` is sticky: reconciliation never leaves it
/// - `Paid` is sticky: a later shortfall (e.g. a deleted payment) does not
///   demote the invoice
/// - paid ≥ total ⇒ `Paid`
/// - 0 < paid < total ⇒ `Partial`
/// - otherwise the current status is kept
pub fn reconcile_status(
    current: InvoiceStatus,
    total_amount: Money,
    paid_amount: Money,
) -> InvoiceStatus {
    match current {
        InvoiceStatus::Cancelled => InvoiceStatus::Cancelled,
        InvoiceStatus::Paid => InvoiceStatus::Paid,
        current => {
            if paid_amount >= total_amount {
                InvoiceStatus::Paid
            } else if paid_amount.is_positive() {
                InvoiceStatus::Partial
            } else {
                current
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Currency;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn rupees(amount: Decimal) -> Money {
        Money::new(amount, Currency::INR)
    }

    #[test]
    fn test_pending_to_partial() {
        let status = reconcile_status(InvoiceStatus::Pending, rupees(dec!(1000)), rupees(dec!(400)));
        assert_eq!(status, InvoiceStatus::Partial);
    }

    #[test]
    fn test_partial_to_paid() {
        let status = reconcile_status(InvoiceStatus::Partial, rupees(dec!(1000)), rupees(dec!(1000)));
        assert_eq!(status, InvoiceStatus::Paid);
    }

    #[test]
    fn test_pending_straight_to_paid() {
        let status = reconcile_status(InvoiceStatus::Pending, rupees(dec!(1000)), rupees(dec!(1500)));
        assert_eq!(status, InvoiceStatus::Paid);
    }

    #[test]
    fn test_zero_paid_leaves_status_unchanged() {
        let status = reconcile_status(InvoiceStatus::Pending, rupees(dec!(1000)), rupees(dec!(0)));
        assert_eq!(status, InvoiceStatus::Pending);
    }

    #[test]
    fn test_cancelled_is_sticky() {
        let status = reconcile_status(InvoiceStatus::Cancelled, rupees(dec!(1000)), rupees(dec!(1000)));
        assert_eq!(status, InvoiceStatus::Cancelled);

        let status = reconcile_status(InvoiceStatus::Cancelled, rupees(dec!(1000)), rupees(dec!(400)));
        assert_eq!(status, InvoiceStatus::Cancelled);
    }

    #[test]
    fn test_paid_is_never_demoted() {
        // A shortfall after e.g. a deleted payment does not demote the invoice.
        let status = reconcile_status(InvoiceStatus::Paid, rupees(dec!(1000)), rupees(dec!(400)));
        assert_eq!(status, InvoiceStatus::Paid);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use core_kernel::Currency;
    use proptest::prelude::*;

    fn any_status() -> impl Strategy<Value = InvoiceStatus> {
        prop_oneof![
            Just(InvoiceStatus::Pending),
            Just(InvoiceStatus::Partial),
            Just(InvoiceStatus::Paid),
            Just(InvoiceStatus::Cancelled),
        ]
    }

    fn rank(status: InvoiceStatus) -> u8 {
        match status {
            InvoiceStatus::Pending => 0,
            InvoiceStatus::Partial => 1,
            InvoiceStatus::Paid => 2,
            InvoiceStatus::Cancelled => 3,
        }
    }

    proptest! {
        #[test]
        fn reconciliation_never_demotes(
            current in any_status(),
            total in 0i64..10_000_000i64,
            paid in 0i64..10_000_000i64
        ) {
            let next = reconcile_status(
                current,
                Money::from_minor(total, Currency::INR),
                Money::from_minor(paid, Currency::INR),
            );
            prop_assert!(rank(next) >= rank(current));
        }

        #[test]
        fn paid_iff_covered_when_not_settled(
            total in 1i64..10_000_000i64,
            paid in 1i64..10_000_000i64
        ) {
            let next = reconcile_status(
                InvoiceStatus::Pending,
                Money::from_minor(total, Currency::INR),
                Money::from_minor(paid, Currency::INR),
            );
            if paid >= total {
                prop_assert_eq!(next, InvoiceStatus::Paid);
            } else {
                prop_assert_eq!(next, InvoiceStatus::Partial);
            }
        }
    }
}
