/// quick start - plan payments for one card
use card_tempo_rs::chrono::NaiveDate;
use card_tempo_rs::{optimize_card, schedule_reminders, CreditCard, Decimal, Money, TargetUtilization};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // $5,000 on a $10,000 card, statement on the 25th, due on the 20th
    let card = CreditCard::new("Everyday", Money::from_major(10_000), Money::from_major(5_000), 25, 20);
    let today = NaiveDate::from_ymd_opt(2025, 3, 21).ok_or("invalid date")?;

    let plan = optimize_card(&card, TargetUtilization::from_percentage(Decimal::from(5)), today);

    println!("current utilization: {:.1}% ({:?})", plan.current_utilization, plan.utilization_status);
    println!("reported utilization: {:.1}% ({:?})", plan.new_utilization, plan.new_utilization_status);
    for payment in &plan.payments {
        println!("  {} ${} - {}", payment.date, payment.amount, payment.description);
    }

    // remind two days ahead of each payment
    for reminder in schedule_reminders(&plan, 2, today)? {
        println!("remind on {}: {}", reminder.remind_on, reminder.subject());
    }

    Ok(())
}
