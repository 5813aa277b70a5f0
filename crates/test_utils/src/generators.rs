//! Property-Based Test Data Generators
//!
//! Proptest strategies and fake-data helpers for the domain types.

use fake::faker::name::zh_cn::Name;
use fake::faker::phone_number::zh_cn::CellNumber;
use fake::Fake;
use proptest::prelude::*;
use rust_decimal::Decimal;

use core_kernel::{Currency, Money, TenantId};
use domain_billing::ports::TenantRef;
use domain_coupon::rule::CashbackTier;

/// A tenant with realistic fake identity data
pub fn fake_tenant() -> TenantRef {
    TenantRef {
        id: TenantId::new_v7(),
        name: Name().fake(),
        phone: CellNumber().fake(),
    }
}

/// Strategy over positive CNY amounts up to one million yuan
pub fn positive_cny() -> impl Strategy<Value = Money> {
    (1i64..100_000_000i64).prop_map(|minor| Money::from_minor(minor, Currency::CNY))
}

/// Strategy over amounts straddling the default confirmation threshold
pub fn amount_near_threshold() -> impl Strategy<Value = Money> {
    (49_000i64..51_000i64).prop_map(|minor| Money::from_minor(minor, Currency::CNY))
}

/// Strategy over well-formed cashback tiers
pub fn cashback_tier() -> impl Strategy<Value = CashbackTier> {
    (1i64..10_000i64, 1i64..500i64).prop_map(|(min_amount, return_amount)| CashbackTier {
        min_amount: Decimal::from(min_amount),
        return_amount: Decimal::from(return_amount),
    })
}

/// Strategy over tier tables of up to eight tiers
pub fn cashback_table() -> impl Strategy<Value = Vec<CashbackTier>> {
    proptest::collection::vec(cashback_tier(), 0..8)
}
