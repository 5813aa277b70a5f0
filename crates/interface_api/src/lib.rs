//! HTTP API Layer
//!
//! This crate provides the REST API for the rental core system using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: request handlers for payments, coupons, and orders
//! - **Middleware**: request audit logging
//! - **DTOs**: request/response data transfer objects
//! - **Error Handling**: consistent error responses
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, config::ApiConfig};
//!
//! let app = create_router(pool, config);
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod handlers;
pub mod dto;
pub mod auth;

use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use core_kernel::Money;
use domain_billing::ports::PaymentStore;
use domain_coupon::issuer::CouponIssuer;
use domain_coupon::ports::CouponStore;
use domain_coupon::redeemer::CouponRedeemer;
use domain_settlement::approval::{AdminAllowList, ApprovalGate};
use domain_settlement::engine::SettlementEngine;
use domain_store::checkout::CheckoutService;
use domain_store::ports::OrderStore;
use infra_db::repositories::{
    BillRepository, ConfigRepository, CouponRepository, OrderRepository, PaymentRepository,
    TenantRepository,
};

use crate::config::ApiConfig;
use crate::handlers::{coupons, health, orders, payments};
use crate::middleware::audit_middleware;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<SettlementEngine>,
    pub gate: Arc<ApprovalGate>,
    pub checkout: Arc<CheckoutService>,
    pub payments: Arc<dyn PaymentStore>,
    pub coupons: Arc<dyn CouponStore>,
    pub orders: Arc<dyn OrderStore>,
    pub approvers: AdminAllowList,
    pub pool: PgPool,
    pub config: ApiConfig,
}

impl AppState {
    /// Wires the repositories and domain services over the given pool
    pub fn new(pool: PgPool, config: ApiConfig) -> Self {
        let tenants = Arc::new(TenantRepository::new(pool.clone()));
        let bills = Arc::new(BillRepository::new(pool.clone()));
        let payments: Arc<dyn PaymentStore> = Arc::new(PaymentRepository::new(pool.clone()));
        let coupons: Arc<dyn CouponStore> = Arc::new(CouponRepository::new(pool.clone()));
        let orders: Arc<dyn OrderStore> = Arc::new(OrderRepository::new(pool.clone()));
        let system_config = Arc::new(ConfigRepository::new(pool.clone()));

        let issuer = Arc::new(CouponIssuer::new(coupons.clone(), system_config));
        let approvers = auth::admin_allow_list(&config);

        let engine = Arc::new(
            SettlementEngine::new(
                tenants.clone(),
                bills.clone(),
                payments.clone(),
                issuer.clone(),
            )
            .with_threshold(Money::cny(config.auto_confirm_threshold)),
        );

        let gate = Arc::new(ApprovalGate::new(
            bills,
            payments.clone(),
            issuer,
            approvers.clone(),
        ));

        let checkout = Arc::new(CheckoutService::new(
            tenants,
            orders.clone(),
            Arc::new(CouponRedeemer::new(coupons.clone())),
        ));

        Self {
            engine,
            gate,
            checkout,
            payments,
            coupons,
            orders,
            approvers,
            pool,
            config,
        }
    }
}

/// Creates the main API router
///
/// # Arguments
///
/// * `pool` - Database connection pool
/// * `config` - API configuration
///
/// # Returns
///
/// Configured Axum router with all routes and middleware
pub fn create_router(pool: PgPool, config: ApiConfig) -> Router {
    let state = AppState::new(pool, config);

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    // Payment routes
    let payment_routes = Router::new()
        .route("/", post(payments::submit_payment))
        .route("/", get(payments::list_payments))
        .route("/pending", get(payments::pending_payments))
        .route("/:id/confirm", post(payments::confirm_payment))
        .route("/:id/reject", post(payments::reject_payment));

    // Coupon routes
    let coupon_routes = Router::new().route("/", get(coupons::list_coupons));

    // Store order routes
    let order_routes = Router::new()
        .route("/", post(orders::create_order))
        .route("/", get(orders::list_orders));

    // API routes
    let api_routes = Router::new()
        .nest("/payments", payment_routes)
        .nest("/coupons", coupon_routes)
        .nest("/orders", order_routes)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            audit_middleware,
        ));

    // Combine all routes
    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
