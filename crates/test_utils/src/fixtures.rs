//! Pre-built Test Fixtures
//!
//! Ready-to-use test data for common entities across the rental system.
//! Fixtures are consistent and predictable for unit tests.

use chrono::{DateTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use rust_decimal_macros::dec;

use core_kernel::{Money, TenantId};
use domain_billing::ports::TenantRef;
use domain_coupon::rule::{CashbackRuleTable, CashbackTier};

/// The tier table most tests run against, as stored in system config
pub static DEFAULT_RULE_JSON: Lazy<String> = Lazy::new(|| {
    r#"[{"minAmount": 100, "returnAmount": 5}, {"minAmount": 300, "returnAmount": 30}, {"minAmount": 500, "returnAmount": 70}]"#
        .to_string()
});

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// A typical monthly rent
    pub fn rent() -> Money {
        Money::cny(dec!(1500.00))
    }

    /// An electricity bill that earns the middle cashback tier
    pub fn electricity_300() -> Money {
        Money::cny(dec!(300.00))
    }

    /// The default auto-confirm threshold
    pub fn threshold() -> Money {
        Money::cny(dec!(500.00))
    }

    /// One fen below the default threshold
    pub fn just_below_threshold() -> Money {
        Money::cny(dec!(499.99))
    }

    /// A zero amount
    pub fn zero() -> Money {
        Money::zero(core_kernel::Currency::CNY)
    }
}

/// Fixture for tenant directory entries
pub struct TenantFixtures;

impl TenantFixtures {
    /// A registered tenant with a fresh id
    pub fn tenant() -> TenantRef {
        TenantRef {
            id: TenantId::new_v7(),
            name: "张伟".to_string(),
            phone: "13800000001".to_string(),
        }
    }

    /// The phone number tests use as an authorised approver
    pub fn approver_phone() -> &'static str {
        "13900000000"
    }
}

/// Fixture for cashback rule data
pub struct RuleFixtures;

impl RuleFixtures {
    /// The default three-tier table, parsed
    pub fn default_table() -> CashbackRuleTable {
        CashbackRuleTable::new(vec![
            CashbackTier { min_amount: dec!(100), return_amount: dec!(5) },
            CashbackTier { min_amount: dec!(300), return_amount: dec!(30) },
            CashbackTier { min_amount: dec!(500), return_amount: dec!(70) },
        ])
    }
}

/// Fixture for temporal test data
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// A fixed billing period start (Jul 1, 2026)
    pub fn period_start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 7, 1, 0, 0, 0).unwrap()
    }

    /// A fixed billing period end (Jul 31, 2026)
    pub fn period_end() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 7, 31, 23, 59, 59).unwrap()
    }

    /// A due date comfortably in the future
    pub fn due_date() -> DateTime<Utc> {
        Utc::now() + chrono::Duration::days(7)
    }
}
