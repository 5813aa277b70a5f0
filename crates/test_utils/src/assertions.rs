//! Custom Assertion Helpers
//!
//! Domain-aware assertions that produce readable failure messages for the
//! invariants the settlement flows promise.

use domain_billing::bill::{Bill, BillStatus};
use domain_coupon::coupon::{Coupon, CouponStatus};

/// Asserts a bill carries the full settled state
pub fn assert_bill_paid(bill: &Bill) {
    assert_eq!(
        bill.status,
        BillStatus::Paid,
        "expected bill {} to be paid, was {:?}",
        bill.id,
        bill.status
    );
    assert!(
        bill.paid_date.is_some(),
        "paid bill {} must carry a paid date",
        bill.id
    );
}

/// Asserts a bill was rolled back to the unsettled state
pub fn assert_bill_reverted(bill: &Bill) {
    assert_eq!(
        bill.status,
        BillStatus::Unpaid,
        "expected bill {} to be unpaid, was {:?}",
        bill.id,
        bill.status
    );
    assert!(
        bill.paid_amount.is_zero(),
        "reverted bill {} must have zero paid amount",
        bill.id
    );
    assert!(
        bill.paid_date.is_none(),
        "reverted bill {} must not carry a paid date",
        bill.id
    );
}

/// Asserts a coupon honours the 3x-minimum-spend invariant
pub fn assert_min_spend_invariant(coupon: &Coupon) {
    let expected = (coupon.amount.amount() * rust_decimal_macros::dec!(3)).ceil();
    assert_eq!(
        coupon.min_spend.amount(),
        expected,
        "coupon {} min spend must be ceil(3 x amount)",
        coupon.id
    );
}

/// Asserts exactly `expected` active coupons in a slice
pub fn assert_active_coupon_count(coupons: &[Coupon], expected: usize) {
    let active = coupons
        .iter()
        .filter(|c| c.status == CouponStatus::Active)
        .count();
    assert_eq!(
        active, expected,
        "expected {} active coupons, found {}",
        expected, active
    );
}
