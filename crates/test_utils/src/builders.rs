//! Test Data Builders
//!
//! Builder patterns for constructing test data with sensible defaults.
//! Tests specify only the relevant fields and take defaults for the rest.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{TenantId, RoomId, Money};
use domain_billing::bill::{Bill, BillType, UtilityReading};

use crate::fixtures::TemporalFixtures;

/// Builder for test bills
pub struct TestBillBuilder {
    tenant_id: TenantId,
    room_id: RoomId,
    bill_type: BillType,
    amount: Money,
    usage: Decimal,
    unit_price: Decimal,
    due_date: DateTime<Utc>,
}

impl Default for TestBillBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestBillBuilder {
    /// Creates a builder with default values (a 1500-yuan rent bill)
    pub fn new() -> Self {
        Self {
            tenant_id: TenantId::new_v7(),
            room_id: RoomId::new_v7(),
            bill_type: BillType::Rent,
            amount: Money::cny(dec!(1500)),
            usage: dec!(300),
            unit_price: dec!(1.00),
            due_date: TemporalFixtures::due_date(),
        }
    }

    /// Sets the tenant
    pub fn with_tenant(mut self, tenant_id: TenantId) -> Self {
        self.tenant_id = tenant_id;
        self
    }

    /// Sets the room
    pub fn with_room(mut self, room_id: RoomId) -> Self {
        self.room_id = room_id;
        self
    }

    /// Sets the rent amount
    pub fn with_amount(mut self, amount: Money) -> Self {
        self.amount = amount;
        self
    }

    /// Sets the due date
    pub fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = due_date;
        self
    }

    /// Switches to an electricity bill with the given meter reading
    pub fn electricity(mut self, usage: Decimal, unit_price: Decimal) -> Self {
        self.bill_type = BillType::Electricity;
        self.usage = usage;
        self.unit_price = unit_price;
        self
    }

    /// Switches to a water bill with the given meter reading
    pub fn water(mut self, usage: Decimal, unit_price: Decimal) -> Self {
        self.bill_type = BillType::Water;
        self.usage = usage;
        self.unit_price = unit_price;
        self
    }

    /// Builds the bill
    pub fn build(self) -> Bill {
        match self.bill_type {
            BillType::Rent => Bill::rent(self.tenant_id, self.room_id, self.amount, self.due_date),
            bill_type => Bill::utility(
                self.tenant_id,
                self.room_id,
                bill_type,
                UtilityReading {
                    usage: self.usage,
                    unit_price: self.unit_price,
                },
            )
            .expect("builder never pairs utility() with rent"),
        }
    }
}
