use crate::error::MeterError;
use std::time::Duration;

const NANOS_PER_MICRO: f64 = 1_000.0;
const NANOS_PER_MILLI: f64 = 1_000_000.0;
const NANOS_PER_SECOND: f64 = 1_000_000_000.0;

fn unit_nanos(unit: &str) -> Option<f64> {
    match unit {
        "ns" => Some(1.0),
        "us" | "µs" | "μs" => Some(NANOS_PER_MICRO),
        "ms" => Some(NANOS_PER_MILLI),
        "s" => Some(NANOS_PER_SECOND),
        "m" => Some(60.0 * NANOS_PER_SECOND),
        "h" => Some(3600.0 * NANOS_PER_SECOND),
        _ => None,
    }
}

fn is_number_char(c: char) -> bool {
    c.is_ascii_digit() || c == '.'
}

/// Parses durations such as `0`, `90s`, `1.5h`, `1h30m` or `500ms`.
///
/// Every number needs a unit, except a bare `0`.
pub fn parse_duration(text: &str) -> Result<Duration, MeterError> {
    let raw = text.trim();
    let invalid = || MeterError::InvalidDuration(text.to_string());

    let (negative, body) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    };

    if body == "0" {
        return Ok(Duration::ZERO);
    }
    if body.is_empty() {
        return Err(invalid());
    }

    let mut total_nanos = 0.0;
    let mut rest = body;

    while !rest.is_empty() {
        let number_len = rest.find(|c: char| !is_number_char(c)).unwrap_or(rest.len());
        let (number, after_number) = rest.split_at(number_len);
        let value: f64 = number.parse().map_err(|_| invalid())?;

        let unit_len = after_number.find(is_number_char).unwrap_or(after_number.len());
        let (unit, after_unit) = after_number.split_at(unit_len);
        let scale = unit_nanos(unit).ok_or_else(invalid)?;

        total_nanos += value * scale;
        rest = after_unit;
    }

    if negative && total_nanos > 0.0 {
        return Err(MeterError::NegativeDuration(text.to_string()));
    }
    if !total_nanos.is_finite() || total_nanos > u64::MAX as f64 {
        return Err(invalid());
    }

    Ok(Duration::from_nanos(total_nanos.round() as u64))
}
