//! Issuance and redemption tests against the in-memory store adapters

use std::sync::Arc;

use rust_decimal_macros::dec;

use core_kernel::{TenantId, BillId, OrderId, Money};
use domain_coupon::coupon::CouponStatus;
use domain_coupon::issuer::CouponIssuer;
use domain_coupon::ports::{CouponFilter, CouponStore};
use domain_coupon::redeemer::CouponRedeemer;
use domain_coupon::rule::ELECTRICITY_RETURN_RULE_KEY;

use test_utils::memory::{InMemoryConfigStore, InMemoryCouponStore};

const DEFAULT_RULES: &str =
    r#"[{"minAmount": 100, "returnAmount": 5}, {"minAmount": 300, "returnAmount": 30}, {"minAmount": 500, "returnAmount": 70}]"#;

fn issuer_with_rules(rules: Option<&str>) -> (CouponIssuer, Arc<InMemoryCouponStore>) {
    let coupons = Arc::new(InMemoryCouponStore::new());
    let config = Arc::new(InMemoryConfigStore::new());
    if let Some(raw) = rules {
        config.set(ELECTRICITY_RETURN_RULE_KEY, raw);
    }
    let issuer = CouponIssuer::new(coupons.clone(), config);
    (issuer, coupons)
}

// ============================================================================
// Issuance
// ============================================================================

mod issuance_tests {
    use super::*;

    #[tokio::test]
    async fn test_qualifying_payment_earns_highest_tier() {
        let (issuer, _) = issuer_with_rules(Some(DEFAULT_RULES));

        let coupon = issuer
            .issue_for_bill(TenantId::new_v7(), BillId::new_v7(), Money::cny(dec!(300)))
            .await
            .unwrap()
            .expect("tier should match");

        assert_eq!(coupon.amount.amount(), dec!(30));
        assert_eq!(coupon.min_spend.amount(), dec!(90));
        assert_eq!(coupon.description, "30元券(满90用)");
        assert_eq!(coupon.status, CouponStatus::Active);
    }

    #[tokio::test]
    async fn test_below_lowest_tier_earns_nothing() {
        let (issuer, coupons) = issuer_with_rules(Some(DEFAULT_RULES));

        let result = issuer
            .issue_for_bill(TenantId::new_v7(), BillId::new_v7(), Money::cny(dec!(99)))
            .await
            .unwrap();

        assert!(result.is_none());
        assert!(coupons.list(CouponFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_config_is_not_an_error() {
        let (issuer, _) = issuer_with_rules(None);

        let result = issuer
            .issue_for_bill(TenantId::new_v7(), BillId::new_v7(), Money::cny(dec!(1000)))
            .await
            .unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_malformed_config_is_not_an_error() {
        let (issuer, _) = issuer_with_rules(Some("{broken"));

        let result = issuer
            .issue_for_bill(TenantId::new_v7(), BillId::new_v7(), Money::cny(dec!(1000)))
            .await
            .unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_issuance_is_idempotent_per_bill() {
        let (issuer, coupons) = issuer_with_rules(Some(DEFAULT_RULES));
        let tenant_id = TenantId::new_v7();
        let bill_id = BillId::new_v7();

        let first = issuer
            .issue_for_bill(tenant_id, bill_id, Money::cny(dec!(300)))
            .await
            .unwrap();
        assert!(first.is_some());

        // Repeated calls - retries, double confirmations - must not double-issue
        for _ in 0..4 {
            let again = issuer
                .issue_for_bill(tenant_id, bill_id, Money::cny(dec!(300)))
                .await
                .unwrap();
            assert!(again.is_none());
        }

        let active = coupons
            .list(CouponFilter::for_tenant(tenant_id).with_status(CouponStatus::Active))
            .await
            .unwrap();
        assert_eq!(active.len(), 1);
    }

    #[tokio::test]
    async fn test_distinct_bills_each_earn_a_coupon() {
        let (issuer, coupons) = issuer_with_rules(Some(DEFAULT_RULES));
        let tenant_id = TenantId::new_v7();

        for _ in 0..3 {
            issuer
                .issue_for_bill(tenant_id, BillId::new_v7(), Money::cny(dec!(500)))
                .await
                .unwrap()
                .expect("each bill earns its own reward");
        }

        let active = coupons
            .list(CouponFilter::for_tenant(tenant_id).with_status(CouponStatus::Active))
            .await
            .unwrap();
        assert_eq!(active.len(), 3);
    }

    #[tokio::test]
    async fn test_used_coupon_does_not_block_reissue_check() {
        // The idempotency key is *active* coupons per bill; a consumed one
        // does not suppress a later legitimate issuance attempt.
        let (issuer, coupons) = issuer_with_rules(Some(DEFAULT_RULES));
        let tenant_id = TenantId::new_v7();
        let bill_id = BillId::new_v7();

        let coupon = issuer
            .issue_for_bill(tenant_id, bill_id, Money::cny(dec!(300)))
            .await
            .unwrap()
            .unwrap();
        coupons.consume(coupon.id).await.unwrap();

        let reissued = issuer
            .issue_for_bill(tenant_id, bill_id, Money::cny(dec!(300)))
            .await
            .unwrap();
        assert!(reissued.is_some());
    }
}

// ============================================================================
// Redemption
// ============================================================================

mod redemption_tests {
    use super::*;

    async fn issued_coupon(
        coupons: &Arc<InMemoryCouponStore>,
        config: &Arc<InMemoryConfigStore>,
    ) -> domain_coupon::Coupon {
        config.set(ELECTRICITY_RETURN_RULE_KEY, DEFAULT_RULES);
        let issuer = CouponIssuer::new(coupons.clone(), config.clone());
        issuer
            .issue_for_bill(TenantId::new_v7(), BillId::new_v7(), Money::cny(dec!(300)))
            .await
            .unwrap()
            .unwrap()
    }

    #[tokio::test]
    async fn test_successful_redemption_consumes_coupon() {
        let coupons = Arc::new(InMemoryCouponStore::new());
        let config = Arc::new(InMemoryConfigStore::new());
        let coupon = issued_coupon(&coupons, &config).await;

        let redeemer = CouponRedeemer::new(coupons.clone());
        let redemption = redeemer
            .redeem(&coupon.code, Money::cny(dec!(90)), OrderId::new_v7())
            .await
            .unwrap();

        assert!(redemption.coupon_consumed);
        assert_eq!(redemption.discount.amount(), dec!(30));

        let stored = coupons.get(coupon.id).await.unwrap();
        assert_eq!(stored.status, CouponStatus::Used);
    }

    #[tokio::test]
    async fn test_minimum_spend_boundary() {
        // A 30-yuan coupon with a 60-yuan floor: 59.99 soft-fails, 60.00 redeems
        let coupons = Arc::new(InMemoryCouponStore::new());
        let config = Arc::new(InMemoryConfigStore::new());
        let mut coupon = issued_coupon(&coupons, &config).await;
        coupon.min_spend = Money::cny(dec!(60));
        coupons.replace(coupon.clone());

        let redeemer = CouponRedeemer::new(coupons.clone());

        let below = redeemer
            .redeem(&coupon.code, Money::cny(dec!(59.99)), OrderId::new_v7())
            .await
            .unwrap();
        assert!(!below.coupon_consumed);
        assert!(below.discount.is_zero());
        assert_eq!(coupons.get(coupon.id).await.unwrap().status, CouponStatus::Active);

        let at = redeemer
            .redeem(&coupon.code, Money::cny(dec!(60.00)), OrderId::new_v7())
            .await
            .unwrap();
        assert!(at.coupon_consumed);
        assert_eq!(at.discount.amount(), dec!(30));
        assert_eq!(coupons.get(coupon.id).await.unwrap().status, CouponStatus::Used);
    }

    #[tokio::test]
    async fn test_unknown_code_soft_fails() {
        let coupons = Arc::new(InMemoryCouponStore::new());
        let redeemer = CouponRedeemer::new(coupons);

        let redemption = redeemer
            .redeem("CPNDOESNOTEXIST", Money::cny(dec!(100)), OrderId::new_v7())
            .await
            .unwrap();

        assert!(!redemption.coupon_consumed);
        assert!(redemption.discount.is_zero());
    }

    #[tokio::test]
    async fn test_double_redemption_soft_fails() {
        let coupons = Arc::new(InMemoryCouponStore::new());
        let config = Arc::new(InMemoryConfigStore::new());
        let coupon = issued_coupon(&coupons, &config).await;
        let redeemer = CouponRedeemer::new(coupons.clone());

        let first = redeemer
            .redeem(&coupon.code, Money::cny(dec!(100)), OrderId::new_v7())
            .await
            .unwrap();
        assert!(first.coupon_consumed);

        let second = redeemer
            .redeem(&coupon.code, Money::cny(dec!(100)), OrderId::new_v7())
            .await
            .unwrap();
        assert!(!second.coupon_consumed);
        assert!(second.discount.is_zero());
    }

    #[tokio::test]
    async fn test_expired_coupon_soft_fails() {
        let coupons = Arc::new(InMemoryCouponStore::new());
        let config = Arc::new(InMemoryConfigStore::new());
        let mut coupon = issued_coupon(&coupons, &config).await;
        coupon.valid_until = chrono::Utc::now() - chrono::Duration::days(1);
        coupons.replace(coupon.clone());

        let redeemer = CouponRedeemer::new(coupons.clone());
        let redemption = redeemer
            .redeem(&coupon.code, Money::cny(dec!(500)), OrderId::new_v7())
            .await
            .unwrap();

        assert!(!redemption.coupon_consumed);
        assert_eq!(coupons.get(coupon.id).await.unwrap().status, CouponStatus::Active);
    }

    #[tokio::test]
    async fn test_redemption_writes_usage_record() {
        let coupons = Arc::new(InMemoryCouponStore::new());
        let config = Arc::new(InMemoryConfigStore::new());
        let coupon = issued_coupon(&coupons, &config).await;
        let order_id = OrderId::new_v7();

        let redeemer = CouponRedeemer::new(coupons.clone());
        redeemer
            .redeem(&coupon.code, Money::cny(dec!(100)), order_id)
            .await
            .unwrap();

        let usages = coupons.usages();
        assert_eq!(usages.len(), 1);
        assert_eq!(usages[0].coupon_id, coupon.id);
        assert_eq!(usages[0].order_id, order_id);
        assert_eq!(usages[0].amount.amount(), dec!(30));
    }
}
