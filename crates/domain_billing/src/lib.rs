//! Billing Domain - Bills and Payments
//!
//! This crate models the money owed by tenants (bills) and the attempts to
//! settle it (payments). A bill moves `unpaid -> paid` directly for small
//! payments, or `unpaid -> pending -> paid` when a payment is large enough
//! to need merchant confirmation; a rejected confirmation rolls the bill
//! back to `unpaid`. Bills are never deleted - they are the historical
//! ledger of the tenancy.
//!
//! Payments track each settlement attempt independently of the bill's own
//! status. A rejected payment is terminal; retrying means submitting a new
//! payment against the (reverted) bill.

pub mod bill;
pub mod payment;
pub mod ports;
pub mod error;

pub use bill::{Bill, BillType, BillStatus, UtilityReading};
pub use payment::{Payment, PaymentType, PaymentMethod, PaymentStatus};
pub use ports::{
    BillStore, PaymentStore, BillFilter, PaymentFilter, BillSettlement,
    TenantDirectory, TenantRef,
};
pub use error::BillingError;
