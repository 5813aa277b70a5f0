//! Repository implementations of the domain store ports

pub mod bills;
pub mod payments;
pub mod coupons;
pub mod orders;
pub mod config;
pub mod tenants;

pub use bills::BillRepository;
pub use payments::PaymentRepository;
pub use coupons::CouponRepository;
pub use orders::OrderRepository;
pub use config::ConfigRepository;
pub use tenants::TenantRepository;

use core_kernel::{Currency, PortError};

use crate::error::{classify_sqlx_error, DatabaseError};

/// Maps a low-level SQLx failure into the domain-facing port error
pub(crate) fn to_port(error: sqlx::Error) -> PortError {
    classify_sqlx_error(error).into()
}

/// Parses a stored currency code
pub(crate) fn currency_from_str(code: &str) -> Result<Currency, DatabaseError> {
    match code {
        "CNY" => Ok(Currency::CNY),
        "USD" => Ok(Currency::USD),
        "HKD" => Ok(Currency::HKD),
        other => Err(DatabaseError::SerializationError(format!(
            "unknown currency code '{}'",
            other
        ))),
    }
}
