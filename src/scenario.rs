use std::collections::HashSet;

use chrono::NaiveDate;
use hourglass_rs::SafeTimeProvider;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::OptimizerConfig;
use crate::cycle::reference_date;
use crate::decimal::Money;
use crate::errors::{Result, TempoError};
use crate::optimizer::{OptimizationResult, PortfolioOptimizer};
use crate::types::{CardId, CreditCard, ScoreImpact, TargetUtilization};

/// what-if change applied to a copy of the portfolio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScenarioMutation {
    /// raise (or set) a card's limit; never below its balance
    LimitIncrease { card_id: CardId, new_limit: Money },
    /// pay a lump sum off a card's balance
    BalancePaydown { card_id: CardId, amount: Money },
    /// close a card and drop it from the portfolio
    CardRemoval { card_id: CardId },
    /// open a new card
    OpenCard { card: CreditCard },
}

impl ScenarioMutation {
    pub fn label(&self) -> String {
        match self {
            ScenarioMutation::LimitIncrease { new_limit, .. } => {
                format!("Raise credit limit to ${}", new_limit)
            }
            ScenarioMutation::BalancePaydown { amount, .. } => format!("Pay down ${}", amount),
            ScenarioMutation::CardRemoval { .. } => "Close card".to_string(),
            ScenarioMutation::OpenCard { card } => {
                format!("Open {} with a ${} limit", card.nickname, card.credit_limit)
            }
        }
    }

    /// apply to an owned copy of the cards
    fn apply(&self, mut cards: Vec<CreditCard>) -> Result<Vec<CreditCard>> {
        match self {
            ScenarioMutation::LimitIncrease { card_id, new_limit } => {
                let card = find_mut(&mut cards, *card_id)?;
                let floor = card.current_balance.non_negative();
                card.credit_limit = new_limit.non_negative().max(floor);
            }
            ScenarioMutation::BalancePaydown { card_id, amount } => {
                let card = find_mut(&mut cards, *card_id)?;
                let balance = card.current_balance.non_negative();
                card.current_balance = balance - amount.non_negative().min(balance);
            }
            ScenarioMutation::CardRemoval { card_id } => {
                let index = cards
                    .iter()
                    .position(|c| c.id == *card_id)
                    .ok_or(TempoError::CardNotFound { id: *card_id })?;
                cards.remove(index);
            }
            ScenarioMutation::OpenCard { card } => {
                if cards.iter().any(|c| c.id == card.id) {
                    return Err(TempoError::DuplicateCardId { id: card.id });
                }
                cards.push(card.clone());
            }
        }
        Ok(cards)
    }
}

fn find_mut(cards: &mut [CreditCard], id: CardId) -> Result<&mut CreditCard> {
    cards
        .iter_mut()
        .find(|c| c.id == id)
        .ok_or(TempoError::CardNotFound { id })
}

fn ensure_unique_ids(cards: &[CreditCard]) -> Result<()> {
    let mut seen = HashSet::with_capacity(cards.len());
    for card in cards {
        if !seen.insert(card.id) {
            return Err(TempoError::DuplicateCardId { id: card.id });
        }
    }
    Ok(())
}

/// headline numbers compared between baseline and scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioMetrics {
    pub overall_utilization: Decimal,
    #[serde(rename = "cardsOver30Percent")]
    pub cards_over_30_percent: usize,
    pub total_available_credit: Money,
    pub total_balance: Money,
}

impl ScenarioMetrics {
    pub fn from_result(result: &OptimizationResult) -> Self {
        Self {
            overall_utilization: result.current_overall_utilization,
            cards_over_30_percent: result.cards_above(dec!(30)),
            total_available_credit: result.total_available_credit(),
            total_balance: result.total_current_balance,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioMetric {
    OverallUtilization,
    CardsOver30Percent,
    TotalAvailableCredit,
}

impl ScenarioMetric {
    fn lower_is_better(&self) -> bool {
        !matches!(self, ScenarioMetric::TotalAvailableCredit)
    }

    fn label(&self) -> &'static str {
        match self {
            ScenarioMetric::OverallUtilization => "Overall utilization",
            ScenarioMetric::CardsOver30Percent => "Cards over 30%",
            ScenarioMetric::TotalAvailableCredit => "Available credit",
        }
    }

    fn format_value(&self, value: Decimal) -> String {
        match self {
            ScenarioMetric::OverallUtilization => format!("{:.1}%", value),
            ScenarioMetric::CardsOver30Percent => value.normalize().to_string(),
            ScenarioMetric::TotalAvailableCredit => format!("${:.2}", value),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeDirection {
    Improvement,
    Decline,
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricChange {
    pub metric: ScenarioMetric,
    pub baseline: Decimal,
    pub scenario: Decimal,
    pub direction: ChangeDirection,
}

impl MetricChange {
    /// one line of ui narration
    pub fn describe(&self) -> String {
        let label = self.metric.label();
        let from = self.metric.format_value(self.baseline);
        let to = self.metric.format_value(self.scenario);
        match self.direction {
            ChangeDirection::Unchanged => format!("{} stays at {}", label, from),
            ChangeDirection::Improvement => format!("{} improves from {} to {}", label, from, to),
            ChangeDirection::Decline => format!("{} worsens from {} to {}", label, from, to),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Positive,
    Neutral,
    Negative,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioComparison {
    pub changes: Vec<MetricChange>,
    pub verdict: Verdict,
}

impl ScenarioComparison {
    pub fn narration(&self) -> Vec<String> {
        self.changes.iter().map(MetricChange::describe).collect()
    }
}

/// classify each metric movement; any decline beyond `tolerance` makes the
/// whole scenario negative
pub fn compare_metrics(
    baseline: &ScenarioMetrics,
    scenario: &ScenarioMetrics,
    tolerance: Decimal,
) -> ScenarioComparison {
    let pairs = [
        (
            ScenarioMetric::OverallUtilization,
            baseline.overall_utilization,
            scenario.overall_utilization,
        ),
        (
            ScenarioMetric::CardsOver30Percent,
            Decimal::from(baseline.cards_over_30_percent),
            Decimal::from(scenario.cards_over_30_percent),
        ),
        (
            ScenarioMetric::TotalAvailableCredit,
            baseline.total_available_credit.as_decimal(),
            scenario.total_available_credit.as_decimal(),
        ),
    ];

    let changes: Vec<MetricChange> = pairs
        .into_iter()
        .map(|(metric, before, after)| {
            let delta = after - before;
            let direction = if delta.abs() <= tolerance {
                ChangeDirection::Unchanged
            } else if (delta < Decimal::ZERO) == metric.lower_is_better() {
                ChangeDirection::Improvement
            } else {
                ChangeDirection::Decline
            };
            MetricChange {
                metric,
                baseline: before,
                scenario: after,
                direction,
            }
        })
        .collect();

    let verdict = if changes.iter().any(|c| c.direction == ChangeDirection::Decline) {
        Verdict::Negative
    } else if changes.iter().any(|c| c.direction == ChangeDirection::Improvement) {
        Verdict::Positive
    } else {
        Verdict::Neutral
    };

    ScenarioComparison { changes, verdict }
}

/// outcome of one what-if run
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioResult {
    pub mutation: ScenarioMutation,
    #[serde(flatten)]
    pub result: OptimizationResult,
    /// baseline minus scenario overall utilization; positive is better
    pub utilization_change: Decimal,
    /// scenario minus baseline estimated optimization impact
    pub score_change: ScoreImpact,
    /// score movement from the baseline's current utilization to the scenario's
    pub score_impact: ScoreImpact,
    pub baseline_metrics: ScenarioMetrics,
    pub metrics: ScenarioMetrics,
    pub comparison: ScenarioComparison,
}

impl ScenarioResult {
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// re-runs the portfolio optimizer against modified card sets
#[derive(Debug, Clone, Default)]
pub struct ScenarioSimulator {
    optimizer: PortfolioOptimizer,
}

impl ScenarioSimulator {
    pub fn new(config: OptimizerConfig) -> Result<Self> {
        Ok(Self {
            optimizer: PortfolioOptimizer::new(config)?,
        })
    }

    pub fn simulate(
        &self,
        cards: &[CreditCard],
        mutation: &ScenarioMutation,
        target: TargetUtilization,
        reference: NaiveDate,
    ) -> Result<ScenarioResult> {
        ensure_unique_ids(cards)?;
        let baseline = self.optimizer.optimize(cards, target, reference);
        self.run(&baseline, cards, mutation, target, reference)
    }

    /// run several mutations, each against the same untouched baseline
    pub fn simulate_all(
        &self,
        cards: &[CreditCard],
        mutations: &[ScenarioMutation],
        target: TargetUtilization,
        reference: NaiveDate,
    ) -> Result<Vec<ScenarioResult>> {
        ensure_unique_ids(cards)?;
        let baseline = self.optimizer.optimize(cards, target, reference);
        mutations
            .iter()
            .map(|mutation| self.run(&baseline, cards, mutation, target, reference))
            .collect()
    }

    /// same as `simulate`, taking today from the time provider
    pub fn simulate_at(
        &self,
        cards: &[CreditCard],
        mutation: &ScenarioMutation,
        target: TargetUtilization,
        time_provider: &SafeTimeProvider,
    ) -> Result<ScenarioResult> {
        self.simulate(cards, mutation, target, reference_date(time_provider))
    }

    fn run(
        &self,
        baseline: &OptimizationResult,
        cards: &[CreditCard],
        mutation: &ScenarioMutation,
        target: TargetUtilization,
        reference: NaiveDate,
    ) -> Result<ScenarioResult> {
        let modified = mutation.apply(cards.to_vec())?;
        let result = self.optimizer.optimize(&modified, target, reference);

        let utilization_change =
            baseline.current_overall_utilization - result.current_overall_utilization;
        let score_change = result
            .estimated_score_impact
            .diff(baseline.estimated_score_impact);
        let score_impact = self.optimizer.config().score_table.impact(
            baseline.current_overall_utilization,
            result.current_overall_utilization,
        );

        let baseline_metrics = ScenarioMetrics::from_result(baseline);
        let metrics = ScenarioMetrics::from_result(&result);
        let comparison = compare_metrics(
            &baseline_metrics,
            &metrics,
            self.optimizer.config().comparison_tolerance,
        );

        debug!(
            scenario = %mutation.label(),
            utilization_change = %utilization_change.round_dp(2),
            verdict = ?comparison.verdict,
            "scenario simulated"
        );

        Ok(ScenarioResult {
            mutation: mutation.clone(),
            result,
            utilization_change,
            score_change,
            score_impact,
            baseline_metrics,
            metrics,
            comparison,
        })
    }
}

/// simulate one mutation with the default config
pub fn simulate(
    cards: &[CreditCard],
    mutation: &ScenarioMutation,
    target: TargetUtilization,
    reference: NaiveDate,
) -> Result<ScenarioResult> {
    ScenarioSimulator::default().simulate(cards, mutation, target, reference)
}
