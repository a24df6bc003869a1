use std::cmp::Ordering;

use chrono::NaiveDate;
use hourglass_rs::SafeTimeProvider;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{OptimizerConfig, PriorityWeights};
use crate::cycle::{days_until, reference_date};
use crate::decimal::Money;
use crate::errors::Result;
use crate::optimizer::{CardOptimizer, CardPaymentPlan};
use crate::types::{CardId, CreditCard, PaymentPurpose, TargetUtilization};
use crate::utilization::utilization_percentage;

/// statements further out than this earn no urgency
const URGENCY_HORIZON_DAYS: i64 = 31;

/// share of a sub-score's weight needed to be called out in the reasoning
const TOP_TIER: Decimal = dec!(0.75);

/// weighted sub-scores, each capped by its weight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub utilization_impact: Decimal,
    pub apr_weight: Decimal,
    pub time_urgency: Decimal,
    pub credit_limit_weight: Decimal,
}

impl ScoreBreakdown {
    pub fn total(&self) -> Decimal {
        self.utilization_impact + self.apr_weight + self.time_urgency + self.credit_limit_weight
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorityScore {
    pub card_id: CardId,
    /// 0 to 100
    pub total_score: Decimal,
    pub breakdown: ScoreBreakdown,
    pub reasoning: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardAllocation {
    pub card_id: CardId,
    pub nickname: String,
    /// 1-based
    pub priority_rank: usize,
    pub amount: Money,
    /// what the card needs to reach target
    pub optimization_amount: Money,
    pub new_balance: Money,
    pub new_utilization: Decimal,
    pub payment_date: NaiveDate,
    pub priority_score: PriorityScore,
}

impl CardAllocation {
    pub fn is_fully_funded(&self) -> bool {
        self.amount >= self.optimization_amount
    }
}

/// a budget split across cards in priority order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorityAllocation {
    /// rank order
    pub allocations: Vec<CardAllocation>,
    /// rank order
    pub scores: Vec<PriorityScore>,
    pub total_budget: Money,
    pub total_needed: Money,
    pub total_allocated: Money,
    pub unallocated_budget: Money,
}

impl PriorityAllocation {
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// ranks cards by urgency and spends a limited budget on them in that order
#[derive(Debug, Clone, Default)]
pub struct PriorityAllocator {
    card_optimizer: CardOptimizer,
}

struct Candidate {
    plan: CardPaymentPlan,
    need: Money,
    days_to_statement: i64,
    score: PriorityScore,
}

impl PriorityAllocator {
    pub fn new(config: OptimizerConfig) -> Result<Self> {
        Ok(Self {
            card_optimizer: CardOptimizer::new(config)?,
        })
    }

    pub fn allocate(
        &self,
        cards: &[CreditCard],
        total_budget: Money,
        target: TargetUtilization,
        reference: NaiveDate,
    ) -> PriorityAllocation {
        let weights = self.card_optimizer.config().priority_weights;
        let plans: Vec<CardPaymentPlan> = cards
            .iter()
            .map(|card| self.card_optimizer.optimize(card, target, reference))
            .collect();

        let max_need = plans.iter().map(|p| p.optimization_amount()).max().unwrap_or(Money::ZERO);
        let max_apr = plans
            .iter()
            .filter_map(|p| p.card.apr)
            .map(|apr| apr.as_decimal())
            .max()
            .unwrap_or(Decimal::ZERO);
        let max_limit = plans.iter().map(|p| p.card.credit_limit).max().unwrap_or(Money::ZERO);

        let mut candidates: Vec<Candidate> = plans
            .into_iter()
            .map(|plan| {
                let need = plan.optimization_amount();
                let days_to_statement = days_until(reference, plan.next_statement_date).max(0);
                let breakdown = ScoreBreakdown {
                    utilization_impact: scaled(
                        weights.utilization_impact,
                        need.as_decimal(),
                        max_need.as_decimal(),
                    ),
                    apr_weight: scaled(
                        weights.apr,
                        plan.card.apr.map(|a| a.as_decimal()).unwrap_or(Decimal::ZERO),
                        max_apr,
                    ),
                    time_urgency: scaled(
                        weights.time_urgency,
                        Decimal::from(URGENCY_HORIZON_DAYS - days_to_statement.min(URGENCY_HORIZON_DAYS)),
                        Decimal::from(URGENCY_HORIZON_DAYS),
                    ),
                    credit_limit_weight: scaled(
                        weights.credit_limit,
                        plan.card.credit_limit.as_decimal(),
                        max_limit.as_decimal(),
                    ),
                };
                let score = PriorityScore {
                    card_id: plan.card.id,
                    total_score: breakdown.total(),
                    reasoning: reasoning(&plan, &breakdown, &weights, need, days_to_statement),
                    breakdown,
                };
                Candidate {
                    plan,
                    need,
                    days_to_statement,
                    score,
                }
            })
            .collect();

        candidates.sort_by(rank_order);

        let total_budget = total_budget.non_negative();
        let mut remaining = total_budget;
        let mut allocations = Vec::with_capacity(candidates.len());
        let mut total_needed = Money::ZERO;

        for (index, candidate) in candidates.into_iter().enumerate() {
            let amount = remaining.min(candidate.need);
            remaining -= amount;
            total_needed += candidate.need;

            let card = &candidate.plan.card;
            let new_balance = card.current_balance.saturating_sub(amount);
            let payment_date = candidate
                .plan
                .payments_for(PaymentPurpose::Optimization)
                .map(|p| p.date)
                .max()
                .unwrap_or(candidate.plan.next_statement_date);

            allocations.push(CardAllocation {
                card_id: card.id,
                nickname: card.nickname.clone(),
                priority_rank: index + 1,
                amount,
                optimization_amount: candidate.need,
                new_balance,
                new_utilization: utilization_percentage(new_balance, card.credit_limit),
                payment_date,
                priority_score: candidate.score,
            });
        }

        let total_allocated = total_budget - remaining;
        debug!(
            cards = allocations.len(),
            budget = %total_budget,
            allocated = %total_allocated,
            needed = %total_needed,
            "budget allocated"
        );

        PriorityAllocation {
            scores: allocations.iter().map(|a| a.priority_score.clone()).collect(),
            allocations,
            total_budget,
            total_needed,
            total_allocated,
            unallocated_budget: remaining,
        }
    }

    /// same as `allocate`, taking today from the time provider
    pub fn allocate_at(
        &self,
        cards: &[CreditCard],
        total_budget: Money,
        target: TargetUtilization,
        time_provider: &SafeTimeProvider,
    ) -> PriorityAllocation {
        self.allocate(cards, total_budget, target, reference_date(time_provider))
    }
}

/// `weight * value / max`, zero when there is nothing to compare against
fn scaled(weight: Decimal, value: Decimal, max: Decimal) -> Decimal {
    if max <= Decimal::ZERO || value <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    (value.min(max) / max * weight).round_dp(2)
}

/// highest score first, then the nearer statement, then card id
fn rank_order(a: &Candidate, b: &Candidate) -> Ordering {
    b.score
        .total_score
        .cmp(&a.score.total_score)
        .then_with(|| a.days_to_statement.cmp(&b.days_to_statement))
        .then_with(|| a.plan.card.id.cmp(&b.plan.card.id))
}

fn reasoning(
    plan: &CardPaymentPlan,
    breakdown: &ScoreBreakdown,
    weights: &PriorityWeights,
    need: Money,
    days_to_statement: i64,
) -> Vec<String> {
    let top = |score: Decimal, weight: Decimal| weight > Decimal::ZERO && score >= weight * TOP_TIER;
    let mut reasons = Vec::new();

    if plan.is_over_limit {
        reasons.push("Over credit limit".to_string());
    }
    if !need.is_positive() {
        reasons.push("Already at target utilization".to_string());
    } else if top(breakdown.utilization_impact, weights.utilization_impact) {
        reasons.push("High utilization impact".to_string());
    }
    if top(breakdown.apr_weight, weights.apr) {
        if let Some(apr) = plan.card.apr {
            reasons.push(format!("High APR ({})", apr));
        }
    }
    if top(breakdown.time_urgency, weights.time_urgency) {
        let when = match days_to_statement {
            0 => "today".to_string(),
            1 => "in 1 day".to_string(),
            n => format!("in {} days", n),
        };
        reasons.push(format!("Statement closes {}", when));
    }
    if top(breakdown.credit_limit_weight, weights.credit_limit) {
        reasons.push("Large credit limit".to_string());
    }

    reasons
}

/// allocate with the default config
pub fn allocate_budget(
    cards: &[CreditCard],
    total_budget: Money,
    target: TargetUtilization,
    reference: NaiveDate,
) -> PriorityAllocation {
    PriorityAllocator::default().allocate(cards, total_budget, target, reference)
}
