use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

use crate::decimal::Money;
use crate::types::UtilizationStatus;

/// classifier output for one balance/limit pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UtilizationReading {
    pub percentage: Decimal,
    pub status: UtilizationStatus,
    pub badge_label: &'static str,
    pub color_token: &'static str,
}

/// utilization as a percentage, zero when the limit is not positive
pub fn utilization_percentage(balance: Money, limit: Money) -> Decimal {
    balance.percent_of(limit)
}

/// classify a balance against its limit
pub fn classify(balance: Money, limit: Money) -> UtilizationReading {
    let percentage = utilization_percentage(balance, limit);
    let status = UtilizationStatus::from_percentage(percentage);

    UtilizationReading {
        percentage,
        status,
        badge_label: status.badge_label(),
        color_token: status.color_token(),
    }
}

impl UtilizationStatus {
    /// band for a utilization percentage
    pub fn from_percentage(percentage: Decimal) -> Self {
        if percentage > dec!(100) {
            UtilizationStatus::Overlimit
        } else if percentage > dec!(30) {
            UtilizationStatus::High
        } else if percentage > dec!(10) {
            UtilizationStatus::Medium
        } else {
            UtilizationStatus::Good
        }
    }

    pub fn badge_label(&self) -> &'static str {
        match self {
            UtilizationStatus::Good => "Excellent",
            UtilizationStatus::Medium => "Fair",
            UtilizationStatus::High => "High",
            UtilizationStatus::Overlimit => "Over Limit",
        }
    }

    pub fn color_token(&self) -> &'static str {
        match self {
            UtilizationStatus::Good => "green",
            UtilizationStatus::Medium => "yellow",
            UtilizationStatus::High => "orange",
            UtilizationStatus::Overlimit => "red",
        }
    }

    /// whether this band counts against the 30% guideline
    pub fn is_above_guideline(&self) -> bool {
        matches!(self, UtilizationStatus::High | UtilizationStatus::Overlimit)
    }
}
