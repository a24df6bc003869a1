use chrono::NaiveDate;
use hourglass_rs::SafeTimeProvider;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::OptimizerConfig;
use crate::cycle::reference_date;
use crate::decimal::Money;
use crate::errors::Result;
use crate::types::{CreditCard, ScoreImpact, TargetUtilization};
use crate::utilization::utilization_percentage;

use super::{CardOptimizer, CardPaymentPlan};

/// portfolio-wide aggregate of every card plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationResult {
    pub cards: Vec<CardPaymentPlan>,
    pub total_credit_limit: Money,
    pub total_current_balance: Money,
    /// sum of balances the statements will report
    pub total_reported_balance: Money,
    pub current_overall_utilization: Decimal,
    pub optimized_overall_utilization: Decimal,
    pub estimated_score_impact: ScoreImpact,
}

impl OptimizationResult {
    /// all-zero result with no cards
    pub fn empty() -> Self {
        Self {
            cards: Vec::new(),
            total_credit_limit: Money::ZERO,
            total_current_balance: Money::ZERO,
            total_reported_balance: Money::ZERO,
            current_overall_utilization: Decimal::ZERO,
            optimized_overall_utilization: Decimal::ZERO,
            estimated_score_impact: ScoreImpact::NONE,
        }
    }

    pub fn total_available_credit(&self) -> Money {
        self.cards.iter().map(|plan| plan.card.available_credit()).sum()
    }

    /// number of cards whose current utilization is strictly above `percentage`
    pub fn cards_above(&self, percentage: Decimal) -> usize {
        self.cards
            .iter()
            .filter(|plan| plan.current_utilization > percentage)
            .count()
    }

    pub fn total_optimization_amount(&self) -> Money {
        self.cards.iter().map(|plan| plan.optimization_amount()).sum()
    }

    pub fn cards_needing_optimization(&self) -> impl Iterator<Item = &CardPaymentPlan> {
        self.cards.iter().filter(|plan| plan.needs_optimization)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// runs the card optimizer across a whole portfolio
#[derive(Debug, Clone, Default)]
pub struct PortfolioOptimizer {
    card_optimizer: CardOptimizer,
}

impl PortfolioOptimizer {
    pub fn new(config: OptimizerConfig) -> Result<Self> {
        Ok(Self {
            card_optimizer: CardOptimizer::new(config)?,
        })
    }

    pub fn config(&self) -> &OptimizerConfig {
        self.card_optimizer.config()
    }

    pub fn card_optimizer(&self) -> &CardOptimizer {
        &self.card_optimizer
    }

    pub fn optimize(
        &self,
        cards: &[CreditCard],
        target: TargetUtilization,
        reference: NaiveDate,
    ) -> OptimizationResult {
        if cards.is_empty() {
            return OptimizationResult::empty();
        }

        let plans: Vec<CardPaymentPlan> = cards
            .iter()
            .map(|card| self.card_optimizer.optimize(card, target, reference))
            .collect();

        let total_credit_limit: Money = plans.iter().map(|p| p.card.credit_limit).sum();
        let total_current_balance: Money = plans.iter().map(|p| p.card.current_balance).sum();
        let total_reported_balance: Money = plans.iter().map(|p| p.reported_balance).sum();

        let current_overall_utilization =
            utilization_percentage(total_current_balance, total_credit_limit);
        let optimized_overall_utilization =
            utilization_percentage(total_reported_balance, total_credit_limit);

        let estimated_score_impact = self
            .config()
            .score_table
            .impact(current_overall_utilization, optimized_overall_utilization);

        debug!(
            cards = plans.len(),
            current = %current_overall_utilization.round_dp(2),
            optimized = %optimized_overall_utilization.round_dp(2),
            impact_min = estimated_score_impact.min,
            impact_max = estimated_score_impact.max,
            "portfolio optimized"
        );

        OptimizationResult {
            cards: plans,
            total_credit_limit,
            total_current_balance,
            total_reported_balance,
            current_overall_utilization,
            optimized_overall_utilization,
            estimated_score_impact,
        }
    }

    /// same as `optimize`, taking today from the time provider
    pub fn optimize_at(
        &self,
        cards: &[CreditCard],
        target: TargetUtilization,
        time_provider: &SafeTimeProvider,
    ) -> OptimizationResult {
        self.optimize(cards, target, reference_date(time_provider))
    }
}

/// optimize a portfolio with the default config
pub fn optimize_portfolio(
    cards: &[CreditCard],
    target: TargetUtilization,
    reference: NaiveDate,
) -> OptimizationResult {
    PortfolioOptimizer::default().optimize(cards, target, reference)
}
