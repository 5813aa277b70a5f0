//! Coupon Domain - Cashback rewards
//!
//! A qualifying bill payment earns a cashback coupon. The reward scale is a
//! configurable, amount-tiered rule table: the highest tier whose threshold
//! the paid amount reaches wins, and a single payment earns exactly one
//! tier - never a stack.
//!
//! Issuance is idempotent per bill: no matter how many times the settlement
//! engine or the approval gate reach the issuer for the same bill (retries,
//! double-clicked confirmations), at most one active coupon exists for a
//! `(tenant, bill)` pair. The store enforces this with a uniqueness
//! constraint; the issuer's pre-check is only a fast path.
//!
//! Redemption is soft-fail: an invalid, expired, consumed, or insufficient
//! coupon produces a zero discount and an untouched coupon rather than an
//! error, so a shopper always completes the purchase at the plain amount.

pub mod rule;
pub mod coupon;
pub mod issuer;
pub mod redeemer;
pub mod usage;
pub mod ports;
pub mod error;

pub use rule::{CashbackTier, CashbackRuleTable, ELECTRICITY_RETURN_RULE_KEY};
pub use coupon::{Coupon, CouponStatus};
pub use issuer::CouponIssuer;
pub use redeemer::{CouponRedeemer, Redemption};
pub use usage::CouponUsage;
pub use ports::{CouponStore, ConfigStore, CouponFilter, CouponInsertError};
pub use error::CouponError;
