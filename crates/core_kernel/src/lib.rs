//! Core Kernel - Foundational types and utilities for the rental system
//!
//! This crate provides the fundamental building blocks used across all domain modules:
//! - Money types with precise decimal arithmetic
//! - Strongly-typed identifiers for domain entities
//! - The shared port error taxonomy for store adapters

pub mod money;
pub mod identifiers;
pub mod ports;
pub mod error;

pub use money::{Money, Currency, MoneyError};
pub use identifiers::{
    TenantId, RoomId, BillId, PaymentId, CouponId, CouponUsageId, OrderId,
};
pub use ports::{PortError, DomainPort};
pub use error::CoreError;
