//! Coupon Domain Ports
//!
//! Store interfaces for coupons, usage records, and the system-config
//! reader. The insert path distinguishes its two uniqueness constraints -
//! the redemption code and the single-active-coupon-per-bill rule - because
//! the issuer reacts differently to each: a code collision is retried with
//! a fresh code, while a duplicate active coupon means another request
//! already issued the reward and the issuer backs off.

use async_trait::async_trait;
use thiserror::Error;

use core_kernel::{CouponId, TenantId, BillId, PortError, DomainPort};

use crate::coupon::{Coupon, CouponStatus};
use crate::usage::CouponUsage;

/// Query parameters for listing coupons
#[derive(Debug, Clone, Default)]
pub struct CouponFilter {
    pub tenant_id: Option<TenantId>,
    pub status: Option<CouponStatus>,
}

impl CouponFilter {
    /// Creates a filter scoped to one tenant
    pub fn for_tenant(tenant_id: TenantId) -> Self {
        Self {
            tenant_id: Some(tenant_id),
            ..Default::default()
        }
    }

    /// Restricts the filter to a status
    pub fn with_status(mut self, status: CouponStatus) -> Self {
        self.status = Some(status);
        self
    }
}

/// Errors surfaced by a coupon insert
#[derive(Debug, Error)]
pub enum CouponInsertError {
    /// The generated redemption code already exists
    #[error("Coupon code already exists")]
    DuplicateCode,

    /// An active coupon already references this (tenant, bill) pair
    #[error("An active coupon already exists for this bill")]
    DuplicateActiveBill,

    /// Any other store failure
    #[error(transparent)]
    Store(#[from] PortError),
}

/// Store port for coupons and usage records
#[async_trait]
pub trait CouponStore: DomainPort {
    /// Fetches a coupon by id
    async fn get(&self, id: CouponId) -> Result<Coupon, PortError>;

    /// Fetches a coupon by its redemption code, if one exists
    async fn get_by_code(&self, code: &str) -> Result<Option<Coupon>, PortError>;

    /// Lists coupons matching the filter
    async fn list(&self, filter: CouponFilter) -> Result<Vec<Coupon>, PortError>;

    /// Finds the active coupon for a bill, if one was already issued
    async fn find_active_for_bill(
        &self,
        tenant_id: TenantId,
        bill_id: BillId,
    ) -> Result<Option<Coupon>, PortError>;

    /// Inserts a new coupon
    ///
    /// The store enforces both uniqueness constraints atomically; a plain
    /// check-then-insert is not an acceptable implementation of this
    /// method.
    async fn insert(&self, coupon: &Coupon) -> Result<(), CouponInsertError>;

    /// Consumes an active coupon (conditional active -> used transition)
    ///
    /// Returns `PortError::Conflict` if the coupon is no longer active,
    /// which a concurrent redemption can cause.
    async fn consume(&self, id: CouponId) -> Result<Coupon, PortError>;

    /// Records a redemption audit entry
    async fn record_usage(&self, usage: &CouponUsage) -> Result<(), PortError>;
}

/// Read-only port for system configuration values
#[async_trait]
pub trait ConfigStore: DomainPort {
    /// Returns the raw value for a key, or None when unset
    async fn get(&self, key: &str) -> Result<Option<String>, PortError>;
}
