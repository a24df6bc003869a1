pub mod card;
pub mod portfolio;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::{CardId, CreditCard, PaymentPurpose, UtilizationStatus};

pub use card::{optimize_card, CardOptimizer};
pub use portfolio::{optimize_portfolio, OptimizationResult, PortfolioOptimizer};

/// one scheduled payment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub date: NaiveDate,
    pub amount: Money,
    pub purpose: PaymentPurpose,
    pub description: String,
}

/// payment plan for a single card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardPaymentPlan {
    /// the card as the optimizer saw it, after sanitizing
    pub card: CreditCard,
    /// chronological
    pub payments: Vec<Payment>,
    pub current_utilization: Decimal,
    /// utilization the next statement will report
    pub new_utilization: Decimal,
    pub utilization_status: UtilizationStatus,
    pub new_utilization_status: UtilizationStatus,
    /// balance left when the statement closes
    pub reported_balance: Money,
    pub next_statement_date: NaiveDate,
    pub next_due_date: NaiveDate,
    pub is_already_optimal: bool,
    pub is_over_limit: bool,
    pub needs_optimization: bool,
}

impl CardPaymentPlan {
    pub fn card_id(&self) -> CardId {
        self.card.id
    }

    /// total paid before the statement closes
    pub fn optimization_amount(&self) -> Money {
        self.amount_for(PaymentPurpose::Optimization)
    }

    /// total paid by the due date
    pub fn balance_amount(&self) -> Money {
        self.amount_for(PaymentPurpose::Balance)
    }

    pub fn total_payments(&self) -> Money {
        self.payments.iter().map(|p| p.amount).sum()
    }

    pub fn payments_for(&self, purpose: PaymentPurpose) -> impl Iterator<Item = &Payment> {
        self.payments.iter().filter(move |p| p.purpose == purpose)
    }

    fn amount_for(&self, purpose: PaymentPurpose) -> Money {
        self.payments_for(purpose).map(|p| p.amount).sum()
    }
}
