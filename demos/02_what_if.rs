/// what if - compare portfolio changes against the current state
use card_tempo_rs::chrono::NaiveDate;
use card_tempo_rs::{CreditCard, Money, ScenarioMutation, ScenarioSimulator, TargetUtilization};
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("=== what-if example ===\n");

    let rewards = CreditCard::new("Rewards", Money::from_major(10_000), Money::from_major(5_000), 25, 20);
    let travel = CreditCard::new("Travel", Money::from_major(5_000), Money::from_major(4_000), 12, 7);
    let cards = vec![rewards.clone(), travel.clone()];

    let mutations = vec![
        ScenarioMutation::LimitIncrease { card_id: travel.id, new_limit: Money::from_major(15_000) },
        ScenarioMutation::BalancePaydown { card_id: rewards.id, amount: Money::from_major(3_000) },
        ScenarioMutation::CardRemoval { card_id: rewards.id },
        ScenarioMutation::OpenCard {
            card: CreditCard::new("New Card", Money::from_major(15_000), Money::ZERO, 10, 5),
        },
    ];

    let today = NaiveDate::from_ymd_opt(2025, 3, 10).ok_or("invalid date")?;
    let simulator = ScenarioSimulator::default();
    let results = simulator.simulate_all(&cards, &mutations, TargetUtilization::from_percentage(dec!(5)), today)?;

    for scenario in &results {
        println!("{} ({:?})", scenario.mutation.label(), scenario.comparison.verdict);
        println!(
            "  utilization change: {:+.1} points, estimated score impact {} to {}",
            scenario.utilization_change, scenario.score_impact.min, scenario.score_impact.max
        );
        for line in scenario.comparison.narration() {
            println!("  - {}", line);
        }
    }

    Ok(())
}
