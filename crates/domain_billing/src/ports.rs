//! Billing Domain Ports
//!
//! This module defines the store interfaces the billing domain needs from
//! its data source. Two adapters implement them:
//!
//! - **PostgreSQL adapter** (`infra_db`) for production
//! - **In-memory adapter** (`test_utils`) for tests
//!
//! Every status-changing update carries an expected-status guard: the store
//! must apply the change only if the row is still in the expected state and
//! report `PortError::Conflict` otherwise. This is what protects the bill
//! and payment state machines from lost updates under concurrent requests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{BillId, PaymentId, RoomId, TenantId, Money, PortError, DomainPort};

use crate::bill::{Bill, BillStatus, BillType};
use crate::payment::{Payment, PaymentStatus, PaymentType};

/// The slice of tenant data the billing flows consume
///
/// Tenant management is an external collaborator; bills and payments only
/// ever need to know that a tenant exists and how to address them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantRef {
    pub id: TenantId,
    pub name: String,
    pub phone: String,
}

/// Read-only port into the tenant aggregate
#[async_trait]
pub trait TenantDirectory: DomainPort {
    /// Looks a tenant up by id; None when unknown
    async fn lookup(&self, id: TenantId) -> Result<Option<TenantRef>, PortError>;
}

/// Query parameters for listing bills
#[derive(Debug, Clone, Default)]
pub struct BillFilter {
    pub tenant_id: Option<TenantId>,
    pub room_id: Option<RoomId>,
    pub bill_type: Option<BillType>,
    pub status: Option<BillStatus>,
}

impl BillFilter {
    /// Creates a filter scoped to one tenant
    pub fn for_tenant(tenant_id: TenantId) -> Self {
        Self {
            tenant_id: Some(tenant_id),
            ..Default::default()
        }
    }

    /// Restricts the filter to a status
    pub fn with_status(mut self, status: BillStatus) -> Self {
        self.status = Some(status);
        self
    }
}

/// Query parameters for listing payments
#[derive(Debug, Clone, Default)]
pub struct PaymentFilter {
    pub tenant_id: Option<TenantId>,
    pub bill_id: Option<BillId>,
    pub payment_type: Option<PaymentType>,
    pub status: Option<PaymentStatus>,
}

impl PaymentFilter {
    /// Creates a filter scoped to one tenant
    pub fn for_tenant(tenant_id: TenantId) -> Self {
        Self {
            tenant_id: Some(tenant_id),
            ..Default::default()
        }
    }

    /// Creates a filter matching every payment in a status
    pub fn by_status(status: PaymentStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }
}

/// Settlement fields applied by a guarded bill update
#[derive(Debug, Clone)]
pub struct BillSettlement {
    pub status: BillStatus,
    pub paid_amount: Money,
    pub paid_date: Option<DateTime<Utc>>,
}

impl BillSettlement {
    /// Settlement fields for a fully paid bill
    pub fn paid(paid_amount: Money, paid_date: DateTime<Utc>) -> Self {
        Self {
            status: BillStatus::Paid,
            paid_amount,
            paid_date: Some(paid_date),
        }
    }

    /// Settlement fields for a bill awaiting confirmation
    pub fn pending(submitted_amount: Money) -> Self {
        Self {
            status: BillStatus::Pending,
            paid_amount: submitted_amount,
            paid_date: None,
        }
    }

    /// Settlement fields that roll a bill back to unpaid
    pub fn reverted(currency: core_kernel::Currency) -> Self {
        Self {
            status: BillStatus::Unpaid,
            paid_amount: Money::zero(currency),
            paid_date: None,
        }
    }
}

/// Store port for bills
#[async_trait]
pub trait BillStore: DomainPort {
    /// Fetches a bill by id
    async fn get(&self, id: BillId) -> Result<Bill, PortError>;

    /// Lists bills matching the filter
    async fn list(&self, filter: BillFilter) -> Result<Vec<Bill>, PortError>;

    /// Inserts a new bill
    async fn insert(&self, bill: &Bill) -> Result<(), PortError>;

    /// Applies settlement fields iff the stored status equals `expected`
    ///
    /// Returns the updated bill, or `PortError::Conflict` when the guard
    /// does not match (the bill was settled or reverted by someone else).
    async fn apply_settlement(
        &self,
        id: BillId,
        settlement: BillSettlement,
        expected: BillStatus,
    ) -> Result<Bill, PortError>;
}

/// Store port for payments
#[async_trait]
pub trait PaymentStore: DomainPort {
    /// Fetches a payment by id
    async fn get(&self, id: PaymentId) -> Result<Payment, PortError>;

    /// Lists payments matching the filter, newest first
    async fn list(&self, filter: PaymentFilter) -> Result<Vec<Payment>, PortError>;

    /// Inserts a new payment
    async fn insert(&self, payment: &Payment) -> Result<(), PortError>;

    /// Persists a resolved payment (status, remarks, completion time)
    ///
    /// The write is guarded: it applies only if the stored status equals
    /// `expected`, otherwise `PortError::Conflict` is returned. Callers
    /// mutate the aggregate first and then persist it through this guard.
    async fn update_resolution(
        &self,
        payment: &Payment,
        expected: PaymentStatus,
    ) -> Result<(), PortError>;
}
