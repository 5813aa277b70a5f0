//! In-Memory Store Adapters
//!
//! Mock adapters implementing every domain port against process memory, so
//! domain and orchestration tests run without PostgreSQL. They enforce the
//! same constraints as the real schema - the unique coupon code, the
//! single-active-coupon-per-bill rule, and every expected-status guard -
//! because the settlement logic's correctness depends on the store
//! honouring them, not just on the happy path.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use core_kernel::{
    BillId, CouponId, OrderId, PaymentId, TenantId, PortError, DomainPort,
};
use domain_billing::bill::{Bill, BillStatus};
use domain_billing::payment::{Payment, PaymentStatus};
use domain_billing::ports::{
    BillFilter, BillSettlement, BillStore, PaymentFilter, PaymentStore, TenantDirectory,
    TenantRef,
};
use domain_coupon::coupon::{Coupon, CouponStatus};
use domain_coupon::ports::{ConfigStore, CouponFilter, CouponInsertError, CouponStore};
use domain_coupon::usage::CouponUsage;
use domain_store::order::StoreOrder;
use domain_store::ports::{OrderFilter, OrderStore};

// ============================================================================
// Tenants
// ============================================================================

/// In-memory tenant directory
#[derive(Default)]
pub struct InMemoryTenantDirectory {
    tenants: Mutex<HashMap<TenantId, TenantRef>>,
}

impl InMemoryTenantDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a tenant
    pub fn register(&self, tenant: TenantRef) {
        self.tenants.lock().unwrap().insert(tenant.id, tenant);
    }
}

impl DomainPort for InMemoryTenantDirectory {}

#[async_trait]
impl TenantDirectory for InMemoryTenantDirectory {
    async fn lookup(&self, id: TenantId) -> Result<Option<TenantRef>, PortError> {
        Ok(self.tenants.lock().unwrap().get(&id).cloned())
    }
}

// ============================================================================
// Bills
// ============================================================================

/// In-memory bill store
#[derive(Default)]
pub struct InMemoryBillStore {
    bills: Mutex<HashMap<BillId, Bill>>,
}

impl InMemoryBillStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DomainPort for InMemoryBillStore {}

#[async_trait]
impl BillStore for InMemoryBillStore {
    async fn get(&self, id: BillId) -> Result<Bill, PortError> {
        self.bills
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| PortError::not_found("Bill", id))
    }

    async fn list(&self, filter: BillFilter) -> Result<Vec<Bill>, PortError> {
        let bills = self.bills.lock().unwrap();
        let mut matched: Vec<Bill> = bills
            .values()
            .filter(|b| filter.tenant_id.is_none_or(|t| b.tenant_id == t))
            .filter(|b| filter.room_id.is_none_or(|r| b.room_id == Some(r)))
            .filter(|b| filter.bill_type.is_none_or(|ty| b.bill_type == ty))
            .filter(|b| filter.status.is_none_or(|s| b.status == s))
            .cloned()
            .collect();
        matched.sort_by_key(|b| b.created_at);
        Ok(matched)
    }

    async fn insert(&self, bill: &Bill) -> Result<(), PortError> {
        let mut bills = self.bills.lock().unwrap();
        if bills.contains_key(&bill.id) {
            return Err(PortError::conflict(format!("bill {} already exists", bill.id)));
        }
        bills.insert(bill.id, bill.clone());
        Ok(())
    }

    async fn apply_settlement(
        &self,
        id: BillId,
        settlement: BillSettlement,
        expected: BillStatus,
    ) -> Result<Bill, PortError> {
        let mut bills = self.bills.lock().unwrap();
        let bill = bills
            .get_mut(&id)
            .ok_or_else(|| PortError::not_found("Bill", id))?;

        // The expected-status guard the real adapter expresses as
        // `UPDATE ... WHERE status = $expected`
        if bill.status != expected {
            return Err(PortError::conflict(format!(
                "bill {} is not in the expected state",
                id
            )));
        }

        bill.status = settlement.status;
        bill.paid_amount = settlement.paid_amount;
        bill.paid_date = settlement.paid_date;
        bill.updated_at = Utc::now();
        Ok(bill.clone())
    }
}

// ============================================================================
// Payments
// ============================================================================

/// In-memory payment store
#[derive(Default)]
pub struct InMemoryPaymentStore {
    payments: Mutex<HashMap<PaymentId, Payment>>,
}

impl InMemoryPaymentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DomainPort for InMemoryPaymentStore {}

#[async_trait]
impl PaymentStore for InMemoryPaymentStore {
    async fn get(&self, id: PaymentId) -> Result<Payment, PortError> {
        self.payments
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| PortError::not_found("Payment", id))
    }

    async fn list(&self, filter: PaymentFilter) -> Result<Vec<Payment>, PortError> {
        let payments = self.payments.lock().unwrap();
        let mut matched: Vec<Payment> = payments
            .values()
            .filter(|p| filter.tenant_id.is_none_or(|t| p.tenant_id == t))
            .filter(|p| filter.bill_id.is_none_or(|b| p.bill_id == Some(b)))
            .filter(|p| filter.payment_type.is_none_or(|ty| p.payment_type == ty))
            .filter(|p| filter.status.is_none_or(|s| p.status == s))
            .cloned()
            .collect();
        matched.sort_by_key(|p| std::cmp::Reverse(p.created_at));
        Ok(matched)
    }

    async fn insert(&self, payment: &Payment) -> Result<(), PortError> {
        let mut payments = self.payments.lock().unwrap();
        if payments.contains_key(&payment.id) {
            return Err(PortError::conflict(format!(
                "payment {} already exists",
                payment.id
            )));
        }
        payments.insert(payment.id, payment.clone());
        Ok(())
    }

    async fn update_resolution(
        &self,
        payment: &Payment,
        expected: PaymentStatus,
    ) -> Result<(), PortError> {
        let mut payments = self.payments.lock().unwrap();
        let stored = payments
            .get_mut(&payment.id)
            .ok_or_else(|| PortError::not_found("Payment", payment.id))?;

        if stored.status != expected {
            return Err(PortError::conflict(format!(
                "payment {} is not in the expected state",
                payment.id
            )));
        }

        *stored = payment.clone();
        Ok(())
    }
}

// ============================================================================
// Coupons
// ============================================================================

#[derive(Default)]
struct CouponState {
    coupons: HashMap<CouponId, Coupon>,
    usages: Vec<CouponUsage>,
}

/// In-memory coupon store
#[derive(Default)]
pub struct InMemoryCouponStore {
    state: Mutex<CouponState>,
}

impl InMemoryCouponStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrites a stored coupon, bypassing constraints (test seam)
    pub fn replace(&self, coupon: Coupon) {
        self.state.lock().unwrap().coupons.insert(coupon.id, coupon);
    }

    /// Snapshot of recorded usages
    pub fn usages(&self) -> Vec<CouponUsage> {
        self.state.lock().unwrap().usages.clone()
    }
}

impl DomainPort for InMemoryCouponStore {}

#[async_trait]
impl CouponStore for InMemoryCouponStore {
    async fn get(&self, id: CouponId) -> Result<Coupon, PortError> {
        self.state
            .lock()
            .unwrap()
            .coupons
            .get(&id)
            .cloned()
            .ok_or_else(|| PortError::not_found("Coupon", id))
    }

    async fn get_by_code(&self, code: &str) -> Result<Option<Coupon>, PortError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .coupons
            .values()
            .find(|c| c.code == code)
            .cloned())
    }

    async fn list(&self, filter: CouponFilter) -> Result<Vec<Coupon>, PortError> {
        let state = self.state.lock().unwrap();
        let mut matched: Vec<Coupon> = state
            .coupons
            .values()
            .filter(|c| filter.tenant_id.is_none_or(|t| c.tenant_id == t))
            .filter(|c| filter.status.is_none_or(|s| c.status == s))
            .cloned()
            .collect();
        matched.sort_by_key(|c| c.created_at);
        Ok(matched)
    }

    async fn find_active_for_bill(
        &self,
        tenant_id: TenantId,
        bill_id: BillId,
    ) -> Result<Option<Coupon>, PortError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .coupons
            .values()
            .find(|c| {
                c.tenant_id == tenant_id
                    && c.bill_id == bill_id
                    && c.status == CouponStatus::Active
            })
            .cloned())
    }

    async fn insert(&self, coupon: &Coupon) -> Result<(), CouponInsertError> {
        let mut state = self.state.lock().unwrap();

        // Mirrors the unique index on code
        if state.coupons.values().any(|c| c.code == coupon.code) {
            return Err(CouponInsertError::DuplicateCode);
        }

        // Mirrors the partial unique index on active (tenant_id, bill_id)
        if state.coupons.values().any(|c| {
            c.tenant_id == coupon.tenant_id
                && c.bill_id == coupon.bill_id
                && c.status == CouponStatus::Active
        }) {
            return Err(CouponInsertError::DuplicateActiveBill);
        }

        state.coupons.insert(coupon.id, coupon.clone());
        Ok(())
    }

    async fn consume(&self, id: CouponId) -> Result<Coupon, PortError> {
        let mut state = self.state.lock().unwrap();
        let coupon = state
            .coupons
            .get_mut(&id)
            .ok_or_else(|| PortError::not_found("Coupon", id))?;

        if coupon.status != CouponStatus::Active {
            return Err(PortError::conflict(format!("coupon {} is not active", id)));
        }

        coupon.status = CouponStatus::Used;
        coupon.updated_at = Utc::now();
        Ok(coupon.clone())
    }

    async fn record_usage(&self, usage: &CouponUsage) -> Result<(), PortError> {
        self.state.lock().unwrap().usages.push(usage.clone());
        Ok(())
    }
}

// ============================================================================
// System config
// ============================================================================

/// In-memory config store
#[derive(Default)]
pub struct InMemoryConfigStore {
    values: Mutex<HashMap<String, String>>,
}

impl InMemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a config value
    pub fn set(&self, key: &str, value: &str) {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }
}

impl DomainPort for InMemoryConfigStore {}

#[async_trait]
impl ConfigStore for InMemoryConfigStore {
    async fn get(&self, key: &str) -> Result<Option<String>, PortError> {
        Ok(self.values.lock().unwrap().get(key).cloned())
    }
}

// ============================================================================
// Store orders
// ============================================================================

/// In-memory order store
#[derive(Default)]
pub struct InMemoryOrderStore {
    orders: Mutex<HashMap<OrderId, StoreOrder>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DomainPort for InMemoryOrderStore {}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn get(&self, id: OrderId) -> Result<StoreOrder, PortError> {
        self.orders
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| PortError::not_found("Order", id))
    }

    async fn list(&self, filter: OrderFilter) -> Result<Vec<StoreOrder>, PortError> {
        let orders = self.orders.lock().unwrap();
        let mut matched: Vec<StoreOrder> = orders
            .values()
            .filter(|o| filter.tenant_id.is_none_or(|t| o.tenant_id == t))
            .filter(|o| filter.status.is_none_or(|s| o.status == s))
            .cloned()
            .collect();
        matched.sort_by_key(|o| std::cmp::Reverse(o.created_at));
        Ok(matched)
    }

    async fn insert(&self, order: &StoreOrder) -> Result<(), PortError> {
        let mut orders = self.orders.lock().unwrap();
        if orders.contains_key(&order.id) {
            return Err(PortError::conflict(format!(
                "order {} already exists",
                order.id
            )));
        }
        orders.insert(order.id, order.clone());
        Ok(())
    }
}
