//! Store Domain - the on-site supermarket
//!
//! Tenants shop at the property's store and pay by scanning at the till.
//! Checkout optionally consumes one cashback coupon: redemption runs
//! through the coupon domain's soft-fail rules, so an invalid or
//! insufficient coupon never blocks the purchase - the order simply
//! completes at the undiscounted amount.

pub mod order;
pub mod checkout;
pub mod ports;
pub mod error;

pub use order::{StoreOrder, OrderStatus};
pub use checkout::{CheckoutService, CheckoutOutcome};
pub use ports::{OrderStore, OrderFilter};
pub use error::StoreError;
