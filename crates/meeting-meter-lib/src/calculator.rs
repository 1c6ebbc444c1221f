use std::time::Duration;

pub const SECONDS_PER_HOUR: f64 = 3600.0;

/// Converts an hourly rate and an elapsed time into money.
///
/// Only whole seconds count: anything shorter than one second costs nothing.
pub struct Calculator;

impl Calculator {
    pub fn new() -> Self {
        Self
    }

    /// Linear in both arguments, as long as durations are whole seconds.
    pub fn calculate_cost(&self, hourly_rate: f64, duration: Duration) -> f64 {
        hourly_rate * duration.as_secs() as f64 / SECONDS_PER_HOUR
    }

    pub fn rate_per_second(&self, hourly_rate: f64) -> f64 {
        hourly_rate / SECONDS_PER_HOUR
    }
}

impl Default for Calculator {
    fn default() -> Self {
        Self::new()
    }
}

pub fn cost(hourly_rate: f64, duration: Duration) -> f64 {
    Calculator::new().calculate_cost(hourly_rate, duration)
}

/// The running-cost line. Starts with a carriage return so each tick
/// overwrites the previous one.
pub fn format_cost(amount: f64) -> String {
    format!("\rThe total current cost of this meeting is ${:.2}", amount)
}
