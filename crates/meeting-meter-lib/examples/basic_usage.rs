use meeting_meter_core::prelude::*;
use meeting_meter_core::{parse_duration, Calculator, DEFAULT_TICK_INTERVAL};
use std::env;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    // Optional: hourly rate and meeting length, e.g. `basic_usage 450 1h30m`
    let hourly_rate: f64 = match args.get(1) {
        Some(rate) => rate.parse()?,
        None => 450.0,
    };
    let meeting_duration = match args.get(2) {
        Some(duration) => parse_duration(duration)?,
        None => Duration::from_secs(45 * 60),
    };

    let calculator = Calculator::new();

    println!("--- Cost Breakdown ---");
    println!("Hourly rate: ${:.2}", hourly_rate);
    println!("Per second: ${:.4}", calculator.rate_per_second(hourly_rate));
    for minutes in [5, 15, 30, 60] {
        let cost = calculator.calculate_cost(hourly_rate, Duration::from_secs(minutes * 60));
        println!("{:>3} minutes: ${:.2}", minutes, cost);
    }

    println!("\n--- Projection ---");
    let config = MeetingConfig::new(hourly_rate, meeting_duration, DEFAULT_TICK_INTERVAL)?;
    let mut meter = MeetingMeter::new(config);

    match meter.run(tokio::io::empty(), tokio::io::stdout()).await? {
        MeetingOutcome::Projected { amount, .. } => {
            println!("Projected total for {:?}: ${:.2}", meeting_duration, amount);
        }
        outcome => println!("Unexpected {} run", outcome.mode().name()),
    }

    Ok(())
}
