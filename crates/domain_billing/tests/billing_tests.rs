//! Comprehensive tests for domain_billing

use chrono::Utc;
use rust_decimal_macros::dec;

use core_kernel::{TenantId, RoomId, BillId, Money};

use domain_billing::bill::{Bill, BillStatus, BillType, UtilityReading};
use domain_billing::payment::{Payment, PaymentMethod, PaymentStatus, PaymentType};
use domain_billing::ports::{BillFilter, BillSettlement, PaymentFilter};

// ============================================================================
// Bill Tests
// ============================================================================

mod bill_tests {
    use super::*;

    fn rent_bill() -> Bill {
        Bill::rent(
            TenantId::new_v7(),
            RoomId::new_v7(),
            Money::cny(dec!(1500)),
            Utc::now(),
        )
    }

    #[test]
    fn test_full_pending_lifecycle() {
        let mut bill = rent_bill();

        bill.mark_pending(Money::cny(dec!(1500))).unwrap();
        assert_eq!(bill.status, BillStatus::Pending);
        assert!(bill.paid_date.is_none());

        bill.mark_paid(Money::cny(dec!(1500)), Utc::now()).unwrap();
        assert_eq!(bill.status, BillStatus::Paid);
        assert!(bill.paid_date.is_some());
    }

    #[test]
    fn test_pending_rollback_then_resettle() {
        let mut bill = rent_bill();

        bill.mark_pending(Money::cny(dec!(1500))).unwrap();
        bill.revert_unpaid().unwrap();

        // A fresh submission against the reverted bill is allowed
        bill.mark_paid(Money::cny(dec!(1500)), Utc::now()).unwrap();
        assert_eq!(bill.status, BillStatus::Paid);
    }

    #[test]
    fn test_paid_bill_cannot_go_pending() {
        let mut bill = rent_bill();
        bill.mark_paid(Money::cny(dec!(1500)), Utc::now()).unwrap();

        assert!(bill.mark_pending(Money::cny(dec!(1500))).is_err());
    }

    #[test]
    fn test_paid_bill_cannot_revert() {
        let mut bill = rent_bill();
        bill.mark_paid(Money::cny(dec!(1500)), Utc::now()).unwrap();

        assert!(bill.revert_unpaid().is_err());
    }

    #[test]
    fn test_utility_reading_rounds_to_fen() {
        let bill = Bill::utility(
            TenantId::new_v7(),
            RoomId::new_v7(),
            BillType::Water,
            UtilityReading {
                usage: dec!(33.333),
                unit_price: dec!(3.50),
            },
        )
        .unwrap();

        // 33.333 * 3.50 = 116.6655, rounded to currency precision
        assert_eq!(bill.amount.amount(), dec!(116.67));
    }

    #[test]
    fn test_with_period() {
        let start = Utc::now();
        let end = start + chrono::Duration::days(30);
        let bill = rent_bill().with_period(start, end);

        assert_eq!(bill.period_start, Some(start));
        assert_eq!(bill.period_end, Some(end));
    }

    #[test]
    fn test_bill_serde_roundtrip() {
        let bill = rent_bill();
        let json = serde_json::to_string(&bill).unwrap();
        let back: Bill = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, bill.id);
        assert_eq!(back.status, bill.status);
    }

    #[test]
    fn test_status_serialises_snake_case() {
        assert_eq!(
            serde_json::to_string(&BillStatus::Unpaid).unwrap(),
            "\"unpaid\""
        );
        assert_eq!(
            serde_json::to_string(&BillType::Electricity).unwrap(),
            "\"electricity\""
        );
    }
}

// ============================================================================
// Payment Tests
// ============================================================================

mod payment_tests {
    use super::*;

    #[test]
    fn test_deposit_without_bill() {
        let payment = Payment::completed(
            TenantId::new_v7(),
            None,
            Money::cny(dec!(200)),
            PaymentType::Deposit,
            PaymentMethod::Cash,
        );

        assert!(payment.bill_id.is_none());
        assert_eq!(payment.status, PaymentStatus::Completed);
    }

    #[test]
    fn test_transaction_reference() {
        let payment = Payment::completed(
            TenantId::new_v7(),
            Some(BillId::new_v7()),
            Money::cny(dec!(300)),
            PaymentType::Electricity,
            PaymentMethod::Wechat,
        )
        .with_transaction_id("wx-20260808-0001");

        assert_eq!(payment.transaction_id.as_deref(), Some("wx-20260808-0001"));
    }

    #[test]
    fn test_pending_remark_mentions_amount() {
        let payment = Payment::pending(
            TenantId::new_v7(),
            Some(BillId::new_v7()),
            Money::cny(dec!(600)),
            PaymentType::Rent,
            PaymentMethod::Wechat,
        );

        assert!(payment.remarks.as_deref().unwrap().contains("¥600.00"));
    }

    #[test]
    fn test_audit_trail_survives_resolution() {
        let mut payment = Payment::pending(
            TenantId::new_v7(),
            Some(BillId::new_v7()),
            Money::cny(dec!(600)),
            PaymentType::Rent,
            PaymentMethod::Wechat,
        );
        payment.complete("13800000001").unwrap();

        let remarks = payment.remarks.as_deref().unwrap();
        assert!(remarks.contains("requires merchant confirmation"));
        assert!(remarks.contains("confirmed by"));
    }

    #[test]
    fn test_payment_serde_roundtrip() {
        let payment = Payment::pending(
            TenantId::new_v7(),
            None,
            Money::cny(dec!(600)),
            PaymentType::Deposit,
            PaymentMethod::BankTransfer,
        );
        let json = serde_json::to_string(&payment).unwrap();
        let back: Payment = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, payment.id);
        assert_eq!(back.status, PaymentStatus::Pending);
    }
}

// ============================================================================
// Filter / Settlement helper tests
// ============================================================================

mod port_type_tests {
    use super::*;

    #[test]
    fn test_bill_filter_builders() {
        let tenant = TenantId::new_v7();
        let filter = BillFilter::for_tenant(tenant).with_status(BillStatus::Unpaid);

        assert_eq!(filter.tenant_id, Some(tenant));
        assert_eq!(filter.status, Some(BillStatus::Unpaid));
        assert!(filter.bill_type.is_none());
    }

    #[test]
    fn test_payment_filter_by_status() {
        let filter = PaymentFilter::by_status(PaymentStatus::Pending);
        assert_eq!(filter.status, Some(PaymentStatus::Pending));
        assert!(filter.tenant_id.is_none());
    }

    #[test]
    fn test_settlement_constructors() {
        let now = Utc::now();
        let paid = BillSettlement::paid(Money::cny(dec!(300)), now);
        assert_eq!(paid.status, BillStatus::Paid);
        assert_eq!(paid.paid_date, Some(now));

        let pending = BillSettlement::pending(Money::cny(dec!(600)));
        assert_eq!(pending.status, BillStatus::Pending);
        assert!(pending.paid_date.is_none());

        let reverted = BillSettlement::reverted(core_kernel::Currency::CNY);
        assert_eq!(reverted.status, BillStatus::Unpaid);
        assert!(reverted.paid_amount.is_zero());
        assert!(reverted.paid_date.is_none());
    }
}

// ============================================================================
// Properties
// ============================================================================

mod proptests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal::Decimal;

    proptest! {
        #[test]
        fn utility_amount_is_rounded_product(
            usage_minor in 1i64..1_000_000i64,
            price_minor in 1i64..10_000i64
        ) {
            let usage = Decimal::new(usage_minor, 2);
            let unit_price = Decimal::new(price_minor, 2);

            let bill = Bill::utility(
                TenantId::new_v7(),
                RoomId::new_v7(),
                BillType::Electricity,
                UtilityReading { usage, unit_price },
            )
            .unwrap();

            prop_assert_eq!(bill.amount.amount(), (usage * unit_price).round_dp(2));
        }

        #[test]
        fn pending_then_revert_always_restores_unpaid(amount_minor in 1i64..100_000_000i64) {
            let amount = Money::from_minor(amount_minor, core_kernel::Currency::CNY);
            let mut bill = Bill::rent(TenantId::new_v7(), RoomId::new_v7(), amount, Utc::now());

            bill.mark_pending(amount).unwrap();
            bill.revert_unpaid().unwrap();

            prop_assert_eq!(bill.status, BillStatus::Unpaid);
            prop_assert!(bill.paid_amount.is_zero());
            prop_assert!(bill.paid_date.is_none());
        }
    }
}
