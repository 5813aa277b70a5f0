//! Settlement Domain - the money-movement state machine
//!
//! A payment request enters the settlement engine, which decides whether it
//! auto-completes or needs manual merchant confirmation:
//!
//! ```text
//!                    submit_payment
//!                          |
//!              amount >= threshold ?
//!               /                  \
//!             no                    yes
//!              |                     |
//!     Payment completed       Payment pending
//!     Bill unpaid -> paid     Bill unpaid -> pending
//!     coupon issued                  |
//!                             approval gate
//!                             /           \
//!                        confirm         reject
//!                           |               |
//!                  Payment completed   Payment rejected
//!                  Bill -> paid        Bill -> unpaid
//!                  coupon issued       (amounts reset)
//! ```
//!
//! The tenant-side submission and the merchant-side resolution are
//! temporally decoupled; a bill can sit in `pending` for days. Every bill
//! and payment transition is persisted through an expected-status guard so
//! a raced or replayed request fails with a conflict instead of losing an
//! update.

pub mod request;
pub mod engine;
pub mod approval;
pub mod error;

pub use request::PaymentRequest;
pub use engine::{SettlementEngine, SettlementOutcome};
pub use approval::{ApprovalGate, ApprovalOutcome, AdminAllowList};
pub use error::SettlementError;
