/// portfolio - optimize several cards with a controlled clock
use card_tempo_rs::{
    CreditCard, Money, OptimizerConfig, PortfolioOptimizer, Rate, SafeTimeProvider,
    TargetUtilization, TimeSource,
};
use chrono::{Duration, TimeZone, Utc};
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("=== portfolio example ===\n");

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap()
    ));
    let controller = time.test_control().unwrap();

    let cards = vec![
        CreditCard::new("Rewards", Money::from_major(10_000), Money::from_major(5_000), 25, 20)
            .with_apr(Rate::from_percentage_decimal(dec!(22.99))),
        CreditCard::new("Travel", Money::from_major(5_000), Money::from_major(4_000), 12, 7)
            .with_apr(Rate::from_percentage_decimal(dec!(27.49))),
        CreditCard::new("Store", Money::from_major(1_500), Money::from_major(60), 3, 28),
    ];

    // pay a week ahead of each statement instead of three days
    let optimizer = PortfolioOptimizer::new(OptimizerConfig::default().with_offset_days(7))?;
    let target = TargetUtilization::from_percentage(dec!(5));

    let result = optimizer.optimize_at(&cards, target, &time);
    println!("today: {}", time.now().format("%Y-%m-%d"));
    println!(
        "overall: {:.1}% -> {:.1}%, estimated score impact +{} to +{}",
        result.current_overall_utilization,
        result.optimized_overall_utilization,
        result.estimated_score_impact.min,
        result.estimated_score_impact.max
    );
    println!("to pay before statements: ${}", result.total_optimization_amount());

    // two weeks later the statement dates have rolled
    controller.advance(Duration::days(14));
    let later = optimizer.optimize_at(&cards, target, &time);
    println!("\nadvanced to: {}", time.now().format("%Y-%m-%d"));
    for plan in &later.cards {
        println!("  {} statement {} due {}", plan.card.nickname, plan.next_statement_date, plan.next_due_date);
    }

    println!("\n{}", result.to_json_pretty()?);

    Ok(())
}
