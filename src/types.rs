use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::decimal::{Money, Rate};

/// unique identifier for a card within a portfolio
pub type CardId = Uuid;

/// utilization band a balance falls into
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UtilizationStatus {
    /// 10% or less
    Good,
    /// above 10%, up to 30%
    Medium,
    /// above 30%, up to 100%
    High,
    /// balance exceeds the limit
    Overlimit,
}

/// why a payment is scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentPurpose {
    /// paid before the statement closes to lower the reported balance
    Optimization,
    /// pays what is left by the due date
    Balance,
}

/// a user's credit card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditCard {
    pub id: CardId,
    pub nickname: String,
    pub credit_limit: Money,
    pub current_balance: Money,
    /// day of month the statement closes
    pub statement_date: u32,
    /// day of month payment is due
    pub due_date: u32,
    #[serde(default)]
    pub apr: Option<Rate>,
}

impl CreditCard {
    /// create card with a fresh id
    pub fn new(
        nickname: impl Into<String>,
        credit_limit: Money,
        current_balance: Money,
        statement_date: u32,
        due_date: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            nickname: nickname.into(),
            credit_limit,
            current_balance,
            statement_date,
            due_date,
            apr: None,
        }
    }

    pub fn with_id(mut self, id: CardId) -> Self {
        self.id = id;
        self
    }

    pub fn with_apr(mut self, apr: Rate) -> Self {
        self.apr = Some(apr);
        self
    }

    /// copy with every numeric field forced into its valid domain.
    /// limits and balances floor at zero, days clamp into 1..=31, aprs floor at zero
    pub fn sanitized(&self) -> CreditCard {
        let mut card = self.clone();

        if !card.credit_limit.is_positive() {
            if !card.credit_limit.is_zero() {
                warn!(card = %card.id, limit = %card.credit_limit, "negative credit limit treated as zero");
            }
            card.credit_limit = Money::ZERO;
        }
        if card.current_balance.is_negative() {
            warn!(card = %card.id, balance = %card.current_balance, "negative balance treated as zero");
            card.current_balance = Money::ZERO;
        }
        card.statement_date = clamp_day(card.id, "statement", card.statement_date);
        card.due_date = clamp_day(card.id, "due", card.due_date);
        card.apr = card.apr.map(Rate::non_negative);
        if card.nickname.trim().is_empty() {
            card.nickname = "Card".to_string();
        }

        card
    }

    /// available credit, never negative
    pub fn available_credit(&self) -> Money {
        self.credit_limit.saturating_sub(self.current_balance)
    }

    /// amount by which the balance exceeds the limit
    pub fn overage(&self) -> Money {
        if self.credit_limit.is_positive() {
            self.current_balance.saturating_sub(self.credit_limit)
        } else {
            Money::ZERO
        }
    }

    pub fn is_over_limit(&self) -> bool {
        self.overage().is_positive()
    }
}

fn clamp_day(card: CardId, which: &str, day: u32) -> u32 {
    let clamped = day.clamp(1, 31);
    if clamped != day {
        warn!(card = %card, day, clamped, "{} day out of range", which);
    }
    clamped
}

/// target reported utilization, held as a percentage in 0..=100
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TargetUtilization(Decimal);

impl TargetUtilization {
    /// from a percentage (5 means 5%); clamped into 0..=100
    pub fn from_percentage(p: Decimal) -> Self {
        TargetUtilization(p.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED))
    }

    /// from a fraction (0.05 means 5%); clamped into 0..=1
    pub fn from_fraction(f: Decimal) -> Self {
        Self::from_percentage(f * Decimal::ONE_HUNDRED)
    }

    pub fn as_percentage(&self) -> Decimal {
        self.0
    }

    pub fn as_fraction(&self) -> Decimal {
        self.0 / Decimal::ONE_HUNDRED
    }

    /// largest whole-cent balance reporting no more than this utilization on `limit`
    pub fn balance_for(&self, limit: Money) -> Money {
        if !limit.is_positive() {
            return Money::ZERO;
        }
        Money::from_decimal_floor(limit.as_decimal() * self.as_fraction())
    }
}

impl Default for TargetUtilization {
    fn default() -> Self {
        TargetUtilization(Decimal::from(5))
    }
}

/// estimated credit score change as a point range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScoreImpact {
    pub min: i32,
    pub max: i32,
}

impl ScoreImpact {
    pub const NONE: ScoreImpact = ScoreImpact { min: 0, max: 0 };

    pub fn new(min: i32, max: i32) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// the same range seen from the other direction
    pub fn negate(self) -> Self {
        Self {
            min: -self.max,
            max: -self.min,
        }
    }

    /// component-wise difference `self - baseline`
    pub fn diff(self, baseline: ScoreImpact) -> ScoreImpact {
        ScoreImpact {
            min: self.min - baseline.min,
            max: self.max - baseline.max,
        }
    }

    pub fn is_none(&self) -> bool {
        self.min == 0 && self.max == 0
    }
}
