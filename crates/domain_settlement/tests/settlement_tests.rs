//! End-to-end settlement tests against the in-memory store adapters
//!
//! These cover the full submission -> (confirmation | rejection) flows,
//! the threshold boundary, and the coupon side effects.

use std::sync::Arc;

use chrono::{Duration, Utc};
use rust_decimal_macros::dec;

use core_kernel::{TenantId, RoomId, Money};
use domain_billing::bill::{Bill, BillStatus, BillType, UtilityReading};
use domain_billing::payment::{PaymentMethod, PaymentStatus};
use domain_billing::ports::{BillStore, PaymentStore, TenantDirectory, TenantRef};
use domain_coupon::issuer::CouponIssuer;
use domain_coupon::ports::CouponStore;
use domain_coupon::rule::ELECTRICITY_RETURN_RULE_KEY;
use domain_settlement::approval::{AdminAllowList, ApprovalGate};
use domain_settlement::engine::SettlementEngine;
use domain_settlement::error::SettlementError;
use domain_settlement::request::PaymentRequest;

use test_utils::memory::{
    InMemoryBillStore, InMemoryConfigStore, InMemoryCouponStore, InMemoryPaymentStore,
    InMemoryTenantDirectory,
};

const APPROVER: &str = "13900000000";
const RULES: &str =
    r#"[{"minAmount": 100, "returnAmount": 5}, {"minAmount": 300, "returnAmount": 30}, {"minAmount": 500, "returnAmount": 70}]"#;

struct World {
    tenants: Arc<InMemoryTenantDirectory>,
    bills: Arc<InMemoryBillStore>,
    payments: Arc<InMemoryPaymentStore>,
    coupons: Arc<InMemoryCouponStore>,
    engine: SettlementEngine,
    gate: ApprovalGate,
    tenant_id: TenantId,
    room_id: RoomId,
}

fn setup() -> World {
    let tenants = Arc::new(InMemoryTenantDirectory::new());
    let bills = Arc::new(InMemoryBillStore::new());
    let payments = Arc::new(InMemoryPaymentStore::new());
    let coupons = Arc::new(InMemoryCouponStore::new());
    let config = Arc::new(InMemoryConfigStore::new());
    config.set(ELECTRICITY_RETURN_RULE_KEY, RULES);

    let tenant_id = TenantId::new_v7();
    tenants.register(TenantRef {
        id: tenant_id,
        name: "张伟".to_string(),
        phone: "13800000001".to_string(),
    });

    let issuer = Arc::new(CouponIssuer::new(coupons.clone(), config));
    let engine = SettlementEngine::new(
        tenants.clone(),
        bills.clone(),
        payments.clone(),
        issuer.clone(),
    );
    let gate = ApprovalGate::new(
        bills.clone(),
        payments.clone(),
        issuer,
        AdminAllowList::new(vec![APPROVER.to_string()]),
    );

    World {
        tenants,
        bills,
        payments,
        coupons,
        engine,
        gate,
        tenant_id,
        room_id: RoomId::new_v7(),
    }
}

impl World {
    async fn electricity_bill(&self, usage: rust_decimal::Decimal) -> Bill {
        let bill = Bill::utility(
            self.tenant_id,
            self.room_id,
            BillType::Electricity,
            UtilityReading {
                usage,
                unit_price: dec!(1.00),
            },
        )
        .unwrap();
        self.bills.insert(&bill).await.unwrap();
        bill
    }

    async fn rent_bill(&self, amount: rust_decimal::Decimal) -> Bill {
        let bill = Bill::rent(self.tenant_id, self.room_id, Money::cny(amount), Utc::now());
        self.bills.insert(&bill).await.unwrap();
        bill
    }

    fn electricity_request(&self, bill: &Bill, amount: rust_decimal::Decimal) -> PaymentRequest {
        PaymentRequest::Electricity {
            tenant_id: self.tenant_id,
            bill_id: bill.id,
            amount: Money::cny(amount),
            method: PaymentMethod::Wechat,
        }
    }

    fn rent_request(&self, bill: &Bill, amount: rust_decimal::Decimal) -> PaymentRequest {
        PaymentRequest::Rent {
            tenant_id: self.tenant_id,
            bill_id: bill.id,
            amount: Money::cny(amount),
            method: PaymentMethod::Wechat,
        }
    }
}

// ============================================================================
// Scenario A: small electricity payment auto-completes and earns a coupon
// ============================================================================

#[tokio::test]
async fn test_small_electricity_payment_completes_with_coupon() {
    let w = setup();
    let bill = w.electricity_bill(dec!(300)).await;
    let before = Utc::now();

    let outcome = w
        .engine
        .submit_payment(w.electricity_request(&bill, dec!(300)))
        .await
        .unwrap();

    assert!(!outcome.needs_confirmation);
    assert_eq!(outcome.payment.status, PaymentStatus::Completed);
    assert!(outcome.message.contains("coupon"));

    let stored_bill = w.bills.get(bill.id).await.unwrap();
    assert_eq!(stored_bill.status, BillStatus::Paid);
    assert_eq!(stored_bill.paid_amount.amount(), dec!(300));
    assert!(stored_bill.paid_date.is_some());

    let coupon = outcome.coupon.expect("electricity payment of 300 earns the 30-yuan tier");
    assert_eq!(coupon.amount.amount(), dec!(30));
    assert_eq!(coupon.min_spend.amount(), dec!(90));
    assert!(coupon.valid_until >= before + Duration::days(30));
    assert!(coupon.valid_until <= Utc::now() + Duration::days(30));
}

// ============================================================================
// Threshold boundary
// ============================================================================

#[tokio::test]
async fn test_amount_at_threshold_needs_confirmation() {
    let w = setup();
    let bill = w.rent_bill(dec!(500)).await;

    let outcome = w
        .engine
        .submit_payment(w.rent_request(&bill, dec!(500)))
        .await
        .unwrap();

    assert!(outcome.needs_confirmation);
    assert_eq!(outcome.payment.status, PaymentStatus::Pending);
    assert!(outcome.coupon.is_none());
}

#[tokio::test]
async fn test_amount_just_below_threshold_auto_completes() {
    let w = setup();
    let bill = w.rent_bill(dec!(499.99)).await;

    let outcome = w
        .engine
        .submit_payment(w.rent_request(&bill, dec!(499.99)))
        .await
        .unwrap();

    assert!(!outcome.needs_confirmation);
    assert_eq!(outcome.payment.status, PaymentStatus::Completed);
}

// ============================================================================
// Scenario B: large rent payment goes through the approval gate
// ============================================================================

#[tokio::test]
async fn test_large_rent_payment_pending_then_confirmed() {
    let w = setup();
    let bill = w.rent_bill(dec!(600)).await;

    let outcome = w
        .engine
        .submit_payment(w.rent_request(&bill, dec!(600)))
        .await
        .unwrap();

    assert!(outcome.needs_confirmation);
    assert!(outcome.coupon.is_none());

    let parked = w.bills.get(bill.id).await.unwrap();
    assert_eq!(parked.status, BillStatus::Pending);
    assert_eq!(parked.paid_amount.amount(), dec!(600));
    assert!(parked.paid_date.is_none());

    let approval = w
        .gate
        .confirm_payment(outcome.payment.id, APPROVER)
        .await
        .unwrap();

    // Rent never earns cashback in the default rule set
    assert!(approval.coupon.is_none());

    let paid = w.bills.get(bill.id).await.unwrap();
    assert_eq!(paid.status, BillStatus::Paid);
    assert!(paid.paid_date.is_some());

    let payment = w.payments.get(outcome.payment.id).await.unwrap();
    assert_eq!(payment.status, PaymentStatus::Completed);
    assert!(payment.remarks.as_deref().unwrap().contains("confirmed by"));
}

#[tokio::test]
async fn test_large_electricity_payment_earns_coupon_on_confirmation() {
    let w = setup();
    let bill = w.electricity_bill(dec!(600)).await;

    let outcome = w
        .engine
        .submit_payment(w.electricity_request(&bill, dec!(600)))
        .await
        .unwrap();
    assert!(outcome.needs_confirmation);
    assert!(outcome.coupon.is_none(), "issuance is deferred to the gate");

    let approval = w
        .gate
        .confirm_payment(outcome.payment.id, APPROVER)
        .await
        .unwrap();

    let coupon = approval.coupon.expect("600 reaches the 70-yuan tier");
    assert_eq!(coupon.amount.amount(), dec!(70));
}

// ============================================================================
// Scenario C: rejection rolls the bill back
// ============================================================================

#[tokio::test]
async fn test_rejection_reverts_bill_and_issues_no_coupon() {
    let w = setup();
    let bill = w.electricity_bill(dec!(600)).await;

    let outcome = w
        .engine
        .submit_payment(w.electricity_request(&bill, dec!(600)))
        .await
        .unwrap();

    w.gate
        .reject_payment(outcome.payment.id, APPROVER, Some("duplicate"))
        .await
        .unwrap();

    let reverted = w.bills.get(bill.id).await.unwrap();
    assert_eq!(reverted.status, BillStatus::Unpaid);
    assert!(reverted.paid_amount.is_zero());
    assert!(reverted.paid_date.is_none());

    let payment = w.payments.get(outcome.payment.id).await.unwrap();
    assert_eq!(payment.status, PaymentStatus::Rejected);
    assert!(payment.remarks.as_deref().unwrap().contains("duplicate"));

    assert!(w
        .coupons
        .find_active_for_bill(w.tenant_id, bill.id)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_resubmission_after_rejection_creates_fresh_payment() {
    let w = setup();
    let bill = w.electricity_bill(dec!(600)).await;

    let first = w
        .engine
        .submit_payment(w.electricity_request(&bill, dec!(600)))
        .await
        .unwrap();
    w.gate
        .reject_payment(first.payment.id, APPROVER, None)
        .await
        .unwrap();

    // The bill is unpaid again; a new submission settles it with a new payment
    let second = w
        .engine
        .submit_payment(w.electricity_request(&bill, dec!(600)))
        .await
        .unwrap();
    assert_ne!(second.payment.id, first.payment.id);

    w.gate
        .confirm_payment(second.payment.id, APPROVER)
        .await
        .unwrap();

    assert_eq!(w.bills.get(bill.id).await.unwrap().status, BillStatus::Paid);
    let rejected = w.payments.get(first.payment.id).await.unwrap();
    assert_eq!(rejected.status, PaymentStatus::Rejected);
}

// ============================================================================
// Preconditions and error taxonomy
// ============================================================================

#[tokio::test]
async fn test_unknown_tenant_is_not_found() {
    let w = setup();
    let request = PaymentRequest::Deposit {
        tenant_id: TenantId::new_v7(),
        amount: Money::cny(dec!(100)),
        method: PaymentMethod::Cash,
    };

    let result = w.engine.submit_payment(request).await;
    assert!(matches!(result, Err(SettlementError::NotFound(_))));
}

#[tokio::test]
async fn test_unknown_bill_is_not_found() {
    let w = setup();
    let ghost = Bill::rent(w.tenant_id, w.room_id, Money::cny(dec!(100)), Utc::now());

    let result = w
        .engine
        .submit_payment(w.rent_request(&ghost, dec!(100)))
        .await;
    assert!(matches!(result, Err(SettlementError::NotFound(_))));
}

#[tokio::test]
async fn test_paid_bill_conflicts() {
    let w = setup();
    let bill = w.rent_bill(dec!(100)).await;

    w.engine
        .submit_payment(w.rent_request(&bill, dec!(100)))
        .await
        .unwrap();

    let result = w
        .engine
        .submit_payment(w.rent_request(&bill, dec!(100)))
        .await;
    assert!(matches!(result, Err(SettlementError::Conflict(_))));
}

#[tokio::test]
async fn test_pending_bill_conflicts() {
    let w = setup();
    let bill = w.rent_bill(dec!(600)).await;

    w.engine
        .submit_payment(w.rent_request(&bill, dec!(600)))
        .await
        .unwrap();

    let result = w
        .engine
        .submit_payment(w.rent_request(&bill, dec!(600)))
        .await;
    assert!(matches!(result, Err(SettlementError::Conflict(_))));
}

#[tokio::test]
async fn test_bill_type_mismatch_is_invalid_argument() {
    let w = setup();
    let rent = w.rent_bill(dec!(300)).await;

    let result = w
        .engine
        .submit_payment(w.electricity_request(&rent, dec!(300)))
        .await;
    assert!(matches!(result, Err(SettlementError::InvalidArgument(_))));
}

#[tokio::test]
async fn test_unauthorized_approver_is_denied() {
    let w = setup();
    let bill = w.rent_bill(dec!(600)).await;
    let outcome = w
        .engine
        .submit_payment(w.rent_request(&bill, dec!(600)))
        .await
        .unwrap();

    let result = w
        .gate
        .confirm_payment(outcome.payment.id, "13811111111")
        .await;
    assert!(matches!(result, Err(SettlementError::PermissionDenied(_))));

    // Nothing moved
    assert_eq!(
        w.bills.get(bill.id).await.unwrap().status,
        BillStatus::Pending
    );
}

#[tokio::test]
async fn test_double_confirmation_conflicts() {
    let w = setup();
    let bill = w.rent_bill(dec!(600)).await;
    let outcome = w
        .engine
        .submit_payment(w.rent_request(&bill, dec!(600)))
        .await
        .unwrap();

    w.gate
        .confirm_payment(outcome.payment.id, APPROVER)
        .await
        .unwrap();

    let again = w.gate.confirm_payment(outcome.payment.id, APPROVER).await;
    assert!(matches!(again, Err(SettlementError::Conflict(_))));
}

#[tokio::test]
async fn test_reject_after_confirm_conflicts() {
    let w = setup();
    let bill = w.rent_bill(dec!(600)).await;
    let outcome = w
        .engine
        .submit_payment(w.rent_request(&bill, dec!(600)))
        .await
        .unwrap();

    w.gate
        .confirm_payment(outcome.payment.id, APPROVER)
        .await
        .unwrap();

    let result = w
        .gate
        .reject_payment(outcome.payment.id, APPROVER, Some("late"))
        .await;
    assert!(matches!(result, Err(SettlementError::Conflict(_))));
    assert_eq!(w.bills.get(bill.id).await.unwrap().status, BillStatus::Paid);
}

// ============================================================================
// Bill-less payments
// ============================================================================

#[tokio::test]
async fn test_small_deposit_completes_without_bill() {
    let w = setup();
    let request = PaymentRequest::Deposit {
        tenant_id: w.tenant_id,
        amount: Money::cny(dec!(200)),
        method: PaymentMethod::Cash,
    };

    let outcome = w.engine.submit_payment(request).await.unwrap();

    assert!(!outcome.needs_confirmation);
    assert!(outcome.payment.bill_id.is_none());
    assert!(outcome.coupon.is_none());
}

#[tokio::test]
async fn test_large_deposit_resolves_without_bill_update() {
    let w = setup();
    let request = PaymentRequest::Deposit {
        tenant_id: w.tenant_id,
        amount: Money::cny(dec!(2000)),
        method: PaymentMethod::BankTransfer,
    };

    let outcome = w.engine.submit_payment(request).await.unwrap();
    assert!(outcome.needs_confirmation);

    let approval = w
        .gate
        .confirm_payment(outcome.payment.id, APPROVER)
        .await
        .unwrap();
    assert!(approval.coupon.is_none());

    let payment = w.payments.get(outcome.payment.id).await.unwrap();
    assert_eq!(payment.status, PaymentStatus::Completed);
}

// ============================================================================
// Idempotent issuance across engine and gate
// ============================================================================

#[tokio::test]
async fn test_gate_cannot_double_issue_for_same_bill() {
    let w = setup();
    let bill = w.electricity_bill(dec!(300)).await;

    let outcome = w
        .engine
        .submit_payment(w.electricity_request(&bill, dec!(300)))
        .await
        .unwrap();
    assert!(outcome.coupon.is_some());

    // A replayed issuance attempt for the same bill finds the active coupon
    let replay = w
        .coupons
        .find_active_for_bill(w.tenant_id, bill.id)
        .await
        .unwrap();
    assert!(replay.is_some());

    let active: Vec<_> = w
        .coupons
        .list(domain_coupon::ports::CouponFilter::for_tenant(w.tenant_id))
        .await
        .unwrap();
    assert_eq!(active.len(), 1);
}

#[tokio::test]
async fn test_cashback_types_are_configurable() {
    // The cashback mechanism is type-agnostic; electricity-only is just the
    // default rule set
    let w = setup();
    let bill = Bill::utility(
        w.tenant_id,
        w.room_id,
        BillType::Water,
        UtilityReading {
            usage: dec!(300),
            unit_price: dec!(1.00),
        },
    )
    .unwrap();
    w.bills.insert(&bill).await.unwrap();

    let config = Arc::new(InMemoryConfigStore::new());
    config.set(ELECTRICITY_RETURN_RULE_KEY, RULES);
    let issuer = Arc::new(CouponIssuer::new(w.coupons.clone(), config));
    let water_engine = SettlementEngine::new(
        w.tenants.clone(),
        w.bills.clone(),
        w.payments.clone(),
        issuer,
    )
    .with_cashback_types(vec![BillType::Water]);

    let outcome = water_engine
        .submit_payment(PaymentRequest::Water {
            tenant_id: w.tenant_id,
            bill_id: bill.id,
            amount: Money::cny(dec!(300)),
            method: PaymentMethod::Wechat,
        })
        .await
        .unwrap();

    assert!(outcome.coupon.is_some(), "water qualifies under this rule set");
}

#[tokio::test]
async fn test_tenant_directory_lookup() {
    let w = setup();
    let found = w.tenants.lookup(w.tenant_id).await.unwrap();
    assert_eq!(found.unwrap().name, "张伟");

    let missing = w.tenants.lookup(TenantId::new_v7()).await.unwrap();
    assert!(missing.is_none());
}
