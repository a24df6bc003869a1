pub mod config;
pub mod cycle;
pub mod decimal;
pub mod errors;
pub mod optimizer;
pub mod priority;
pub mod reminders;
pub mod scenario;
pub mod score;
pub mod types;
pub mod utilization;

// re-export key types
pub use config::{OptimizerConfig, PriorityWeights};
pub use cycle::{next_occurrence, BillingCycle};
pub use decimal::{Money, Rate};
pub use errors::{Result, TempoError};
pub use optimizer::{
    optimize_card, optimize_portfolio, CardOptimizer, CardPaymentPlan, OptimizationResult,
    Payment, PortfolioOptimizer,
};
pub use priority::{
    allocate_budget, CardAllocation, PriorityAllocation, PriorityAllocator, PriorityScore,
    ScoreBreakdown,
};
pub use reminders::{schedule_portfolio_reminders, schedule_reminders, PaymentReminder};
pub use scenario::{
    compare_metrics, simulate, ScenarioComparison, ScenarioMetrics, ScenarioMutation,
    ScenarioResult, ScenarioSimulator, Verdict,
};
pub use score::{ScoreBand, ScoreImpactTable};
pub use types::{
    CardId, CreditCard, PaymentPurpose, ScoreImpact, TargetUtilization, UtilizationStatus,
};
pub use utilization::{classify, utilization_percentage, UtilizationReading};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
