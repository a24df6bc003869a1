use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::{Result, TempoError};
use crate::score::ScoreImpactTable;

/// tunables shared by every engine in the crate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// days before the statement date the optimization payment is scheduled
    pub optimization_offset_days: u32,
    /// when set, a card at or under target only counts as already optimal
    /// if its balance is also at or under this amount
    pub already_optimal_balance_ceiling: Option<Money>,
    pub score_table: ScoreImpactTable,
    pub priority_weights: PriorityWeights,
    /// slack, in percentage points or currency units, before a scenario
    /// metric counts as changed
    pub comparison_tolerance: Decimal,
}

/// maximum points each priority sub-score can contribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityWeights {
    pub utilization_impact: Decimal,
    pub apr: Decimal,
    pub time_urgency: Decimal,
    pub credit_limit: Decimal,
}

impl Default for PriorityWeights {
    fn default() -> Self {
        Self {
            utilization_impact: dec!(40),
            apr: dec!(25),
            time_urgency: dec!(20),
            credit_limit: dec!(15),
        }
    }
}

impl PriorityWeights {
    pub fn total(&self) -> Decimal {
        self.utilization_impact + self.apr + self.time_urgency + self.credit_limit
    }
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            optimization_offset_days: 3,
            already_optimal_balance_ceiling: None,
            score_table: ScoreImpactTable::default(),
            priority_weights: PriorityWeights::default(),
            comparison_tolerance: dec!(0.5),
        }
    }
}

impl OptimizerConfig {
    /// set payment offset before the statement date
    pub fn with_offset_days(mut self, days: u32) -> Self {
        self.optimization_offset_days = days;
        self
    }

    /// cap the balance a card may carry and still count as already optimal
    pub fn with_balance_ceiling(mut self, ceiling: Money) -> Self {
        self.already_optimal_balance_ceiling = Some(ceiling);
        self
    }

    pub fn with_priority_weights(mut self, weights: PriorityWeights) -> Self {
        self.priority_weights = weights;
        self
    }

    pub fn with_comparison_tolerance(mut self, tolerance: Decimal) -> Self {
        self.comparison_tolerance = tolerance;
        self
    }

    /// check the config describes a usable optimizer
    pub fn validate(&self) -> Result<()> {
        if self.optimization_offset_days > 28 {
            return Err(TempoError::InvalidConfiguration {
                message: format!(
                    "optimization offset of {} days spans more than a billing cycle",
                    self.optimization_offset_days
                ),
            });
        }

        if let Some(ceiling) = self.already_optimal_balance_ceiling {
            if ceiling.is_negative() {
                return Err(TempoError::InvalidConfiguration {
                    message: format!("balance ceiling must not be negative, got {}", ceiling),
                });
            }
        }

        let weights = &self.priority_weights;
        let parts = [
            weights.utilization_impact,
            weights.apr,
            weights.time_urgency,
            weights.credit_limit,
        ];
        if parts.iter().any(|w| *w < Decimal::ZERO) {
            return Err(TempoError::InvalidConfiguration {
                message: "priority weights must not be negative".to_string(),
            });
        }
        if weights.total() != dec!(100) {
            return Err(TempoError::InvalidConfiguration {
                message: format!("priority weights must sum to 100, got {}", weights.total()),
            });
        }

        if self.comparison_tolerance < Decimal::ZERO {
            return Err(TempoError::InvalidConfiguration {
                message: "comparison tolerance must not be negative".to_string(),
            });
        }

        self.score_table.validate()
    }

    /// parse and validate a json config
    pub fn from_json(json: &str) -> Result<Self> {
        let config: OptimizerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
