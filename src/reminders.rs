use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::cycle::days_before;
use crate::decimal::Money;
use crate::errors::{Result, TempoError};
use crate::optimizer::{CardPaymentPlan, OptimizationResult};
use crate::types::{CardId, PaymentPurpose};

pub const MIN_REMINDER_OFFSET_DAYS: u32 = 1;
pub const MAX_REMINDER_OFFSET_DAYS: u32 = 14;

/// notification for one scheduled payment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReminder {
    pub card_id: CardId,
    pub nickname: String,
    pub payment_date: NaiveDate,
    /// never before the day the reminders were scheduled
    pub remind_on: NaiveDate,
    pub amount: Money,
    pub purpose: PaymentPurpose,
}

impl PaymentReminder {
    pub fn subject(&self) -> String {
        match self.purpose {
            PaymentPurpose::Optimization => format!(
                "Pay ${} on {} by {} to lower reported utilization",
                self.amount, self.nickname, self.payment_date
            ),
            PaymentPurpose::Balance => format!(
                "Pay ${} on {} by {} to avoid interest",
                self.amount, self.nickname, self.payment_date
            ),
        }
    }

    /// true when the reminder had to be moved up to the scheduling day
    pub fn is_short_notice(&self, offset_days: u32) -> bool {
        (self.payment_date - self.remind_on).num_days() < offset_days as i64
    }
}

fn check_offset(offset_days: u32) -> Result<()> {
    if !(MIN_REMINDER_OFFSET_DAYS..=MAX_REMINDER_OFFSET_DAYS).contains(&offset_days) {
        return Err(TempoError::InvalidReminderOffset { days: offset_days });
    }
    Ok(())
}

/// one reminder per payment in the plan, `offset_days` ahead of it
pub fn schedule_reminders(
    plan: &CardPaymentPlan,
    offset_days: u32,
    reference: NaiveDate,
) -> Result<Vec<PaymentReminder>> {
    check_offset(offset_days)?;

    Ok(plan
        .payments
        .iter()
        .map(|payment| PaymentReminder {
            card_id: plan.card.id,
            nickname: plan.card.nickname.clone(),
            payment_date: payment.date,
            remind_on: days_before(payment.date, offset_days, reference),
            amount: payment.amount,
            purpose: payment.purpose,
        })
        .collect())
}

/// reminders for every card, ordered by when they fire
pub fn schedule_portfolio_reminders(
    result: &OptimizationResult,
    offset_days: u32,
    reference: NaiveDate,
) -> Result<Vec<PaymentReminder>> {
    check_offset(offset_days)?;

    let mut reminders = Vec::new();
    for plan in &result.cards {
        reminders.extend(schedule_reminders(plan, offset_days, reference)?);
    }
    reminders.sort_by(|a, b| {
        a.remind_on
            .cmp(&b.remind_on)
            .then_with(|| a.payment_date.cmp(&b.payment_date))
            .then_with(|| a.card_id.cmp(&b.card_id))
    });
    Ok(reminders)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizer::{optimize_card, optimize_portfolio};
    use crate::types::{CreditCard, TargetUtilization};
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn card() -> CreditCard {
        CreditCard::new("Everyday", Money::from_major(10_000), Money::from_major(5_000), 25, 20)
            .with_id(Uuid::from_u128(1))
    }

    fn five_percent() -> TargetUtilization {
        TargetUtilization::from_percentage(dec!(5))
    }

    #[test]
    fn test_reminders_follow_payments() {
        let today = date(2025, 3, 10);
        let plan = optimize_card(&card(), five_percent(), today);
        let reminders = schedule_reminders(&plan, 2, today).unwrap();

        assert_eq!(reminders.len(), 2);
        assert_eq!(reminders[0].purpose, PaymentPurpose::Balance);
        assert_eq!(reminders[0].payment_date, date(2025, 3, 20));
        assert_eq!(reminders[0].remind_on, date(2025, 3, 18));

        assert_eq!(reminders[1].purpose, PaymentPurpose::Optimization);
        assert_eq!(reminders[1].payment_date, date(2025, 3, 22));
        assert_eq!(reminders[1].remind_on, date(2025, 3, 20));
        assert_eq!(reminders[1].amount, Money::from_major(4_500));
        assert_eq!(reminders[1].nickname, "Everyday");
    }

    #[test]
    fn test_remind_on_clamped_to_today() {
        let today = date(2025, 3, 21);
        let plan = optimize_card(&card(), five_percent(), today);
        let reminders = schedule_reminders(&plan, 7, today).unwrap();

        assert_eq!(reminders[0].payment_date, date(2025, 3, 22));
        assert_eq!(reminders[0].remind_on, today);
        assert!(reminders[0].is_short_notice(7));

        assert_eq!(reminders[1].remind_on, date(2025, 4, 13));
        assert!(!reminders[1].is_short_notice(7));
    }

    #[test]
    fn test_offset_bounds() {
        let today = date(2025, 3, 10);
        let plan = optimize_card(&card(), five_percent(), today);

        assert!(schedule_reminders(&plan, 1, today).is_ok());
        assert!(schedule_reminders(&plan, 14, today).is_ok());
        assert!(matches!(
            schedule_reminders(&plan, 0, today),
            Err(TempoError::InvalidReminderOffset { days: 0 })
        ));
        assert!(matches!(
            schedule_reminders(&plan, 15, today),
            Err(TempoError::InvalidReminderOffset { days: 15 })
        ));
    }

    #[test]
    fn test_no_payments_no_reminders() {
        let mut paid_off = card();
        paid_off.current_balance = Money::ZERO;
        let plan = optimize_card(&paid_off, five_percent(), date(2025, 3, 10));
        assert!(schedule_reminders(&plan, 3, date(2025, 3, 10)).unwrap().is_empty());
    }

    #[test]
    fn test_portfolio_reminders_sorted() {
        let today = date(2025, 3, 10);
        let cards = vec![
            card(),
            CreditCard::new("Travel", Money::from_major(5_000), Money::from_major(4_000), 12, 7)
                .with_id(Uuid::from_u128(2)),
        ];
        let result = optimize_portfolio(&cards, five_percent(), today);
        let reminders = schedule_portfolio_reminders(&result, 3, today).unwrap();

        assert_eq!(reminders.len(), 4);
        assert!(reminders.windows(2).all(|w| w[0].remind_on <= w[1].remind_on));
        assert!(reminders.iter().all(|r| r.remind_on >= today));
        assert_eq!(reminders[0].card_id, Uuid::from_u128(2));
    }

    #[test]
    fn test_subject_mentions_purpose() {
        let today = date(2025, 3, 21);
        let plan = optimize_card(&card(), five_percent(), today);
        let reminders = schedule_reminders(&plan, 1, today).unwrap();
        assert_eq!(
            reminders[0].subject(),
            "Pay $4500.00 on Everyday by 2025-03-22 to lower reported utilization"
        );
    }
}
