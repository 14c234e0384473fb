//! Configuration types for the ledger engine.
//!
//! These structures are deserialized from YAML. Every key is optional and
//! falls back to the value in [`EngineConfig::default`].

use chrono::Weekday;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculation::{
    AllocationPolicy, DueWeighted, FifoByCreatedAt, ManualAllocation, ProportionalToValue,
};

/// Which allocation policy spreads a supplier payment across materials.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationPolicyKind {
    /// In proportion to each item's total value.
    #[default]
    Proportional,
    /// Oldest item first.
    Fifo,
    /// In proportion to each item's outstanding due.
    DueWeighted,
    /// Per-item amounts are entered by hand.
    Manual,
}

impl AllocationPolicyKind {
    /// Returns the policy implementation.
    pub fn policy(self) -> &'static dyn AllocationPolicy {
        match self {
            AllocationPolicyKind::Proportional => &ProportionalToValue,
            AllocationPolicyKind::Fifo => &FifoByCreatedAt,
            AllocationPolicyKind::DueWeighted => &DueWeighted,
            AllocationPolicyKind::Manual => &ManualAllocation,
        }
    }
}

/// Engine-wide settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Decimal places allocated amounts are rounded to.
    pub money_scale: u32,
    /// Days a monthly salary is divided by to obtain a daily rate.
    pub monthly_rate_divisor: Decimal,
    /// The weekly rest day, excluded from working days.
    #[serde(with = "weekday")]
    pub rest_day: Weekday,
    /// Default allocation policy for supplier reallocation.
    pub allocation_policy: AllocationPolicyKind,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            money_scale: 2,
            monthly_rate_divisor: Decimal::new(30, 0),
            rest_day: Weekday::Sun,
            allocation_policy: AllocationPolicyKind::Proportional,
        }
    }
}

/// Weekdays written as `sun`, `Sunday`, `SUN` and so on.
mod weekday {
    use chrono::Weekday;
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(day: &Weekday, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&day.to_string().to_lowercase())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Weekday, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.trim()
            .parse::<Weekday>()
            .map_err(|_| de::Error::custom(format!("unknown weekday '{}'", raw)))
    }
}
