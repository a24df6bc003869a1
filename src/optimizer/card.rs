use chrono::NaiveDate;
use hourglass_rs::SafeTimeProvider;
use tracing::debug;

use crate::config::OptimizerConfig;
use crate::cycle::{days_before, reference_date, BillingCycle};
use crate::decimal::Money;
use crate::errors::Result;
use crate::types::{CreditCard, PaymentPurpose, TargetUtilization};
use crate::utilization::classify;

use super::{CardPaymentPlan, Payment};

/// computes the payment plan for one card
#[derive(Debug, Clone, Default)]
pub struct CardOptimizer {
    config: OptimizerConfig,
}

impl CardOptimizer {
    pub fn new(config: OptimizerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// plan payments so the next statement reports `target` utilization and
    /// the remainder is cleared by the due date
    pub fn optimize(
        &self,
        card: &CreditCard,
        target: TargetUtilization,
        reference: NaiveDate,
    ) -> CardPaymentPlan {
        let card = card.sanitized();
        let cycle = BillingCycle::resolve(&card, reference);
        let current = classify(card.current_balance, card.credit_limit);
        let balance = card.current_balance;
        let is_over_limit = card.is_over_limit();

        let within_ceiling = self
            .config
            .already_optimal_balance_ceiling
            .map_or(true, |ceiling| balance <= ceiling);
        let at_target = current.percentage <= target.as_percentage();

        let mut payments = Vec::new();
        let mut optimization_amount = Money::ZERO;
        let is_already_optimal = at_target && within_ceiling && !is_over_limit;

        if is_already_optimal {
            if balance.is_positive() {
                payments.push(Payment {
                    date: cycle.next_due_date,
                    amount: balance,
                    purpose: PaymentPurpose::Balance,
                    description: format!(
                        "Pay the full ${} by the due date. Utilization is already {:.1}%, at or under the {}% target",
                        balance,
                        current.percentage,
                        target.as_percentage().normalize()
                    ),
                });
            }
        } else {
            optimization_amount = balance.saturating_sub(target.balance_for(card.credit_limit));

            let optimization_date = days_before(
                cycle.next_statement_date,
                self.config.optimization_offset_days,
                reference,
            );
            let reported = balance - optimization_amount;
            let reported_pct = classify(reported, card.credit_limit).percentage;

            // the overage goes out immediately; the rest waits for the usual slot
            let overage = card.overage().min(optimization_amount);
            let mut scheduled = optimization_amount;
            if overage.is_positive() && optimization_date > reference {
                payments.push(Payment {
                    date: reference,
                    amount: overage,
                    purpose: PaymentPurpose::Optimization,
                    description: format!(
                        "Pay ${} now to bring {} back under its ${} limit",
                        overage, card.nickname, card.credit_limit
                    ),
                });
                scheduled = optimization_amount - overage;
            }

            if scheduled.is_positive() {
                let description = if is_over_limit && scheduled == optimization_amount {
                    format!(
                        "Pay ${} now to get back under the ${} limit and have the {} statement report {:.1}% utilization",
                        scheduled, card.credit_limit, cycle.next_statement_date, reported_pct
                    )
                } else {
                    format!(
                        "Pay ${} by {} so the {} statement reports {:.1}% utilization",
                        scheduled, optimization_date, cycle.next_statement_date, reported_pct
                    )
                };
                payments.push(Payment {
                    date: optimization_date,
                    amount: scheduled,
                    purpose: PaymentPurpose::Optimization,
                    description,
                });
            }

            let remaining = balance - optimization_amount;
            if remaining.is_positive() {
                payments.push(Payment {
                    date: cycle.next_due_date,
                    amount: remaining,
                    purpose: PaymentPurpose::Balance,
                    description: format!(
                        "Pay the remaining ${} by {} to avoid interest",
                        remaining, cycle.next_due_date
                    ),
                });
            }
        }

        payments.sort_by_key(|p| p.date);

        let reported_balance = balance - optimization_amount;
        let reported = classify(reported_balance, card.credit_limit);

        debug!(
            card = %card.id,
            current = %current.percentage.round_dp(2),
            reported = %reported.percentage.round_dp(2),
            payments = payments.len(),
            "card plan computed"
        );

        CardPaymentPlan {
            payments,
            current_utilization: current.percentage,
            new_utilization: reported.percentage,
            utilization_status: current.status,
            new_utilization_status: reported.status,
            reported_balance,
            next_statement_date: cycle.next_statement_date,
            next_due_date: cycle.next_due_date,
            is_already_optimal,
            is_over_limit,
            needs_optimization: optimization_amount.is_positive(),
            card,
        }
    }

    /// same as `optimize`, taking today from the time provider
    pub fn optimize_at(
        &self,
        card: &CreditCard,
        target: TargetUtilization,
        time_provider: &SafeTimeProvider,
    ) -> CardPaymentPlan {
        self.optimize(card, target, reference_date(time_provider))
    }
}

/// optimize one card with the default config
pub fn optimize_card(
    card: &CreditCard,
    target: TargetUtilization,
    reference: NaiveDate,
) -> CardPaymentPlan {
    CardOptimizer::default().optimize(card, target, reference)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UtilizationStatus;
    use chrono::{TimeZone, Utc};
    use hourglass_rs::TimeSource;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn card(limit: i64, balance: i64) -> CreditCard {
        CreditCard::new("Everyday", Money::from_major(limit), Money::from_major(balance), 25, 20)
            .with_id(Uuid::from_u128(1))
    }

    fn five_percent() -> TargetUtilization {
        TargetUtilization::from_percentage(dec!(5))
    }

    #[test]
    fn test_two_payment_plan() {
        let today = date(2025, 3, 21);
        let plan = optimize_card(&card(10_000, 5_000), five_percent(), today);

        assert_eq!(plan.payments.len(), 2);

        let optimization = &plan.payments[0];
        assert_eq!(optimization.purpose, PaymentPurpose::Optimization);
        assert_eq!(optimization.amount, Money::from_major(4_500));
        assert_eq!(optimization.date, date(2025, 3, 22));

        let balance = &plan.payments[1];
        assert_eq!(balance.purpose, PaymentPurpose::Balance);
        assert_eq!(balance.amount, Money::from_major(500));
        assert_eq!(balance.date, date(2025, 4, 20));

        assert_eq!(plan.current_utilization, dec!(50));
        assert_eq!(plan.new_utilization, dec!(5));
        assert_eq!(plan.utilization_status, UtilizationStatus::High);
        assert_eq!(plan.new_utilization_status, UtilizationStatus::Good);
        assert_eq!(plan.reported_balance, Money::from_major(500));
        assert!(plan.needs_optimization);
        assert!(!plan.is_already_optimal);
        assert!(!plan.is_over_limit);
        assert_eq!(plan.total_payments(), Money::from_major(5_000));
    }

    #[test]
    fn test_already_optimal() {
        let today = date(2025, 3, 10);
        let plan = optimize_card(&card(10_000, 400), five_percent(), today);

        assert!(plan.is_already_optimal);
        assert!(!plan.needs_optimization);
        assert_eq!(plan.payments.len(), 1);
        assert_eq!(plan.payments[0].purpose, PaymentPurpose::Balance);
        assert_eq!(plan.payments[0].amount, Money::from_major(400));
        assert_eq!(plan.payments[0].date, plan.next_due_date);
        assert_eq!(plan.optimization_amount(), Money::ZERO);
        assert_eq!(plan.new_utilization, dec!(4));
    }

    #[test]
    fn test_zero_balance_has_no_payments() {
        let plan = optimize_card(&card(10_000, 0), five_percent(), date(2025, 3, 10));
        assert!(plan.is_already_optimal);
        assert!(plan.payments.is_empty());
    }

    #[test]
    fn test_optimization_date_not_before_today() {
        // statement on the 25th, today the 24th: three days back would be the 22nd
        let today = date(2025, 3, 24);
        let plan = optimize_card(&card(10_000, 5_000), five_percent(), today);
        assert_eq!(plan.payments[0].date, today);
        assert_eq!(plan.next_statement_date, date(2025, 3, 25));
    }

    #[test]
    fn test_configurable_offset() {
        let optimizer = CardOptimizer::new(OptimizerConfig::default().with_offset_days(7)).unwrap();
        let plan = optimizer.optimize(&card(10_000, 5_000), five_percent(), date(2025, 3, 10));
        assert_eq!(plan.payments[0].date, date(2025, 3, 18));
    }

    #[test]
    fn test_balance_ceiling_blocks_already_optimal() {
        let optimizer =
            CardOptimizer::new(OptimizerConfig::default().with_balance_ceiling(Money::from_major(300)))
                .unwrap();
        let plan = optimizer.optimize(&card(10_000, 400), five_percent(), date(2025, 3, 10));

        assert!(!plan.is_already_optimal);
        assert!(!plan.needs_optimization);
        assert_eq!(plan.payments.len(), 1);
        assert_eq!(plan.payments[0].purpose, PaymentPurpose::Balance);
    }

    #[test]
    fn test_over_limit_pays_overage_today() {
        let today = date(2025, 3, 21);
        let plan = optimize_card(&card(1_000, 1_200), five_percent(), today);

        assert!(plan.is_over_limit);
        assert_eq!(plan.utilization_status, UtilizationStatus::Overlimit);
        assert_eq!(plan.payments.len(), 3);

        assert_eq!(plan.payments[0].date, today);
        assert_eq!(plan.payments[0].amount, Money::from_major(200));
        assert_eq!(plan.payments[0].purpose, PaymentPurpose::Optimization);

        assert_eq!(plan.payments[1].amount, Money::from_major(950));
        assert_eq!(plan.payments[1].date, date(2025, 3, 22));

        assert_eq!(plan.payments[2].amount, Money::from_major(50));
        assert_eq!(plan.payments[2].purpose, PaymentPurpose::Balance);

        assert_eq!(plan.optimization_amount(), Money::from_major(1_150));
        assert_eq!(plan.new_utilization, dec!(5));
    }

    #[test]
    fn test_over_limit_on_statement_eve_merges_payments() {
        let today = date(2025, 3, 23);
        let plan = optimize_card(&card(1_000, 1_200), five_percent(), today);

        let optimizations: Vec<_> = plan.payments_for(PaymentPurpose::Optimization).collect();
        assert_eq!(optimizations.len(), 1);
        assert_eq!(optimizations[0].date, today);
        assert_eq!(optimizations[0].amount, Money::from_major(1_150));
    }

    #[test]
    fn test_over_limit_never_already_optimal() {
        let target = TargetUtilization::from_percentage(dec!(100));
        let plan = optimize_card(&card(1_000, 1_200), target, date(2025, 3, 10));
        assert!(!plan.is_already_optimal);
        assert_eq!(plan.optimization_amount(), Money::from_major(200));
        assert_eq!(plan.new_utilization, dec!(100));
    }

    #[test]
    fn test_degenerate_limits_never_divide_by_zero() {
        let mut broken = card(0, 750);
        broken.credit_limit = Money::from_major(-10);
        let plan = optimize_card(&broken, five_percent(), date(2025, 3, 10));

        assert_eq!(plan.current_utilization, Decimal::ZERO);
        assert_eq!(plan.new_utilization, Decimal::ZERO);
        assert!(plan.is_already_optimal);
        assert_eq!(plan.card.credit_limit, Money::ZERO);
    }

    #[test]
    fn test_runaway_balance_on_tiny_limit() {
        let mut runaway = card(0, 0);
        runaway.credit_limit = Money::from_cents(1);
        runaway.current_balance = Money::from_decimal(Decimal::MAX / dec!(1000));
        let plan = optimize_card(&runaway, five_percent(), date(2025, 3, 21));

        assert_eq!(plan.current_utilization, Decimal::MAX);
        assert_eq!(plan.utilization_status, UtilizationStatus::Overlimit);
        assert!(plan.is_over_limit);
        assert_eq!(plan.optimization_amount(), runaway.current_balance);
        assert_eq!(plan.new_utilization, Decimal::ZERO);
    }

    #[test]
    fn test_due_before_statement_is_sorted() {
        // due on the 5th, statement on the 25th, today the 2nd
        let mut early_due = card(10_000, 5_000);
        early_due.due_date = 5;
        let plan = optimize_card(&early_due, five_percent(), date(2025, 3, 2));

        assert_eq!(plan.payments[0].purpose, PaymentPurpose::Balance);
        assert_eq!(plan.payments[0].date, date(2025, 3, 5));
        assert_eq!(plan.payments[1].purpose, PaymentPurpose::Optimization);
        assert!(plan.payments.windows(2).all(|w| w[0].date <= w[1].date));
    }

    #[test]
    fn test_repeatable_for_same_inputs() {
        let today = date(2025, 3, 10);
        let input = card(7_500, 3_210);
        let first = optimize_card(&input, five_percent(), today);
        let second = optimize_card(&input, five_percent(), today);
        assert_eq!(first, second);
    }

    #[test]
    fn test_optimize_at_uses_provider_date() {
        let time = SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap(),
        ));
        let optimizer = CardOptimizer::default();
        let plan = optimizer.optimize_at(&card(10_000, 5_000), five_percent(), &time);
        assert_eq!(plan, optimize_card(&card(10_000, 5_000), five_percent(), date(2025, 3, 10)));
    }

    #[test]
    fn test_rejects_invalid_config() {
        assert!(CardOptimizer::new(OptimizerConfig::default().with_offset_days(40)).is_err());
    }
}
