//! Store Domain Ports

use async_trait::async_trait;

use core_kernel::{OrderId, TenantId, PortError, DomainPort};

use crate::order::{OrderStatus, StoreOrder};

/// Query parameters for listing orders
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub tenant_id: Option<TenantId>,
    pub status: Option<OrderStatus>,
}

impl OrderFilter {
    /// Creates a filter scoped to one tenant
    pub fn for_tenant(tenant_id: TenantId) -> Self {
        Self {
            tenant_id: Some(tenant_id),
            ..Default::default()
        }
    }
}

/// Store port for supermarket orders
#[async_trait]
pub trait OrderStore: DomainPort {
    /// Fetches an order by id
    async fn get(&self, id: OrderId) -> Result<StoreOrder, PortError>;

    /// Lists orders matching the filter, newest first
    async fn list(&self, filter: OrderFilter) -> Result<Vec<StoreOrder>, PortError>;

    /// Inserts a new order
    async fn insert(&self, order: &StoreOrder) -> Result<(), PortError>;
}
