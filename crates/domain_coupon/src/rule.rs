//! Cashback rule table
//!
//! The rule table is stored as a JSON-encoded list of `{minAmount,
//! returnAmount}` pairs under a system-config key. Parsing is fail-soft: a
//! missing or malformed table means "no reward", never a settlement error.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// System-config key holding the electricity cashback tiers
pub const ELECTRICITY_RETURN_RULE_KEY: &str = "electricity_return_rule";

/// One cashback tier: paying at least `min_amount` earns `return_amount`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashbackTier {
    pub min_amount: Decimal,
    pub return_amount: Decimal,
}

/// An ordered cashback rule table
///
/// Tiers are kept sorted by `min_amount` descending so resolution is a
/// first-match scan: a single payment satisfies the highest threshold it
/// reaches and earns exactly that one tier.
#[derive(Debug, Clone, PartialEq)]
pub struct CashbackRuleTable {
    tiers: Vec<CashbackTier>,
}

impl CashbackRuleTable {
    /// Builds a table from tiers, normalising the order
    pub fn new(mut tiers: Vec<CashbackTier>) -> Self {
        tiers.sort_by(|a, b| b.min_amount.cmp(&a.min_amount));
        Self { tiers }
    }

    /// Parses the JSON-encoded config value
    ///
    /// Malformed JSON is logged and treated as no table present.
    pub fn parse(raw: &str) -> Option<Self> {
        match serde_json::from_str::<Vec<CashbackTier>>(raw) {
            Ok(tiers) => Some(Self::new(tiers)),
            Err(e) => {
                warn!(error = %e, "failed to parse cashback rule table, treating as unconfigured");
                None
            }
        }
    }

    /// Resolves a paid amount to at most one tier
    ///
    /// Returns the highest tier whose `min_amount` the paid amount reaches,
    /// or `None` when no tier qualifies or the table is empty.
    pub fn resolve_tier(&self, paid_amount: Decimal) -> Option<&CashbackTier> {
        self.tiers.iter().find(|tier| paid_amount >= tier.min_amount)
    }

    /// Returns true when no tiers are configured
    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }
}
