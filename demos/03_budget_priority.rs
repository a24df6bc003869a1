/// budget priority - spend a limited budget where it matters most
use card_tempo_rs::chrono::NaiveDate;
use card_tempo_rs::{CreditCard, Money, PriorityAllocator, Rate, TargetUtilization};
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("=== budget priority example ===\n");

    let cards = vec![
        CreditCard::new("Rewards", Money::from_major(10_000), Money::from_major(5_000), 25, 20)
            .with_apr(Rate::from_percentage(15)),
        CreditCard::new("Travel", Money::from_major(5_000), Money::from_major(4_000), 12, 7)
            .with_apr(Rate::from_percentage_decimal(dec!(29.99))),
        CreditCard::new("Store", Money::from_major(2_000), Money::from_major(2_100), 18, 13),
    ];

    let today = NaiveDate::from_ymd_opt(2025, 3, 10).ok_or("invalid date")?;
    let allocation = PriorityAllocator::default().allocate(
        &cards,
        Money::from_major(5_000),
        TargetUtilization::from_percentage(dec!(5)),
        today,
    );

    for card in &allocation.allocations {
        println!(
            "#{} {} score {} -> pay ${} of ${} by {} ({:.1}% after)",
            card.priority_rank,
            card.nickname,
            card.priority_score.total_score,
            card.amount,
            card.optimization_amount,
            card.payment_date,
            card.new_utilization
        );
        for reason in &card.priority_score.reasoning {
            println!("    {}", reason);
        }
    }
    println!("\nallocated ${} of ${}, ${} left over", allocation.total_allocated, allocation.total_budget, allocation.unallocated_budget);

    println!("\n{}", allocation.to_json_pretty()?);

    Ok(())
}
