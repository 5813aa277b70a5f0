//! Bill aggregate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;

use core_kernel::{BillId, TenantId, RoomId, Money};
use crate::error::BillingError;

/// Bill type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillType {
    Rent,
    Electricity,
    Water,
}

impl BillType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillType::Rent => "rent",
            BillType::Electricity => "electricity",
            BillType::Water => "water",
        }
    }
}

/// Bill status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillStatus {
    /// Awaiting payment
    Unpaid,
    /// A large payment was submitted and awaits merchant confirmation
    Pending,
    /// Settled
    Paid,
}

/// Meter details recorded on utility bills
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UtilityReading {
    /// Units consumed in the billing period
    pub usage: Decimal,
    /// Price per unit
    pub unit_price: Decimal,
}

/// An amount owed by a tenant for a room
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bill {
    /// Unique identifier
    pub id: BillId,
    /// Tenant who owes the amount
    pub tenant_id: TenantId,
    /// Room the charge relates to
    pub room_id: Option<RoomId>,
    /// Charge type
    pub bill_type: BillType,
    /// Amount owed
    pub amount: Money,
    /// Amount actually paid; zero until a settlement is recorded
    pub paid_amount: Money,
    /// Status
    pub status: BillStatus,
    /// Due date
    pub due_date: Option<DateTime<Utc>>,
    /// Populated only once the bill is paid
    pub paid_date: Option<DateTime<Utc>>,
    /// Billing period start
    pub period_start: Option<DateTime<Utc>>,
    /// Billing period end
    pub period_end: Option<DateTime<Utc>>,
    /// Free-form details (e.g. usage and unit price for utility bills)
    pub details: Option<serde_json::Value>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Bill {
    /// Creates a rent bill due on the given date
    pub fn rent(tenant_id: TenantId, room_id: RoomId, amount: Money, due_date: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            id: BillId::new_v7(),
            tenant_id,
            room_id: Some(room_id),
            bill_type: BillType::Rent,
            amount,
            paid_amount: Money::zero(amount.currency()),
            status: BillStatus::Unpaid,
            due_date: Some(due_date),
            paid_date: None,
            period_start: None,
            period_end: None,
            details: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Creates a utility bill from a meter reading (usage x unit price)
    pub fn utility(
        tenant_id: TenantId,
        room_id: RoomId,
        bill_type: BillType,
        reading: UtilityReading,
    ) -> Result<Self, BillingError> {
        if bill_type == BillType::Rent {
            return Err(BillingError::InvalidBillType(
                "utility bill cannot have type rent".to_string(),
            ));
        }

        let amount = Money::cny(reading.usage * reading.unit_price).round_to_currency();
        let now = Utc::now();

        Ok(Self {
            id: BillId::new_v7(),
            tenant_id,
            room_id: Some(room_id),
            bill_type,
            amount,
            paid_amount: Money::zero(amount.currency()),
            status: BillStatus::Unpaid,
            due_date: None,
            paid_date: None,
            period_start: None,
            period_end: None,
            details: Some(json!({
                "usage": reading.usage,
                "unit_price": reading.unit_price,
            })),
            created_at: now,
            updated_at: now,
        })
    }

    /// Sets the billing period
    pub fn with_period(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.period_start = Some(start);
        self.period_end = Some(end);
        self
    }

    /// Marks the bill paid, recording the settled amount and date
    pub fn mark_paid(&mut self, paid_amount: Money, paid_date: DateTime<Utc>) -> Result<(), BillingError> {
        self.transition_to(BillStatus::Paid)?;
        self.paid_amount = paid_amount;
        self.paid_date = Some(paid_date);
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Marks the bill pending merchant confirmation
    ///
    /// The submitted amount is recorded but `paid_date` stays unset until
    /// the payment is confirmed.
    pub fn mark_pending(&mut self, submitted_amount: Money) -> Result<(), BillingError> {
        self.transition_to(BillStatus::Pending)?;
        self.paid_amount = submitted_amount;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Rolls a pending bill back to unpaid after a rejected payment
    pub fn revert_unpaid(&mut self) -> Result<(), BillingError> {
        self.transition_to(BillStatus::Unpaid)?;
        self.paid_amount = Money::zero(self.amount.currency());
        self.paid_date = None;
        self.updated_at = Utc::now();
        Ok(())
    }

    fn transition_to(&mut self, target: BillStatus) -> Result<(), BillingError> {
        if !self.can_transition_to(target) {
            return Err(BillingError::InvalidStatusTransition {
                from: format!("{:?}", self.status),
                to: format!("{:?}", target),
            });
        }
        self.status = target;
        Ok(())
    }

    /// Checks if transition is valid
    fn can_transition_to(&self, target: BillStatus) -> bool {
        use BillStatus::*;
        matches!(
            (self.status, target),
            (Unpaid, Pending) | (Unpaid, Paid) | (Pending, Paid) | (Pending, Unpaid)
        )
    }
}
