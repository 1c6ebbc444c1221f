use crate::error::MeterError;
use std::time::Duration;

/// Ticks slower than this start a live ticker; anything at or below it
/// only prints a projected total.
pub const TICKER_THRESHOLD: Duration = Duration::from_secs(1);

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeetingMode {
    /// Open-ended meeting, runs until the user types `q`.
    Interactive,
    /// Fixed-length meeting with a live ticker.
    Ticking,
    /// Fixed-length meeting, total cost printed once.
    Projection,
}

impl MeetingMode {
    pub fn name(&self) -> &'static str {
        match self {
            MeetingMode::Interactive => "interactive",
            MeetingMode::Ticking => "ticking",
            MeetingMode::Projection => "projection",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeetingConfig {
    hourly_rate: f64,
    meeting_duration: Duration,
    tick_interval: Duration,
}

impl MeetingConfig {
    pub fn new(
        hourly_rate: f64,
        meeting_duration: Duration,
        tick_interval: Duration,
    ) -> Result<Self, MeterError> {
        validate_rate(hourly_rate)?;
        if tick_interval.is_zero() {
            return Err(MeterError::ZeroTickInterval);
        }

        Ok(Self {
            hourly_rate,
            meeting_duration,
            tick_interval,
        })
    }

    /// Fills in a rate that was not supplied up front.
    pub fn with_hourly_rate(self, hourly_rate: f64) -> Result<Self, MeterError> {
        validate_rate(hourly_rate)?;
        Ok(Self {
            hourly_rate,
            ..self
        })
    }

    pub fn hourly_rate(&self) -> f64 {
        self.hourly_rate
    }

    pub fn meeting_duration(&self) -> Duration {
        self.meeting_duration
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    pub fn needs_rate(&self) -> bool {
        self.hourly_rate == 0.0
    }

    pub fn is_open_ended(&self) -> bool {
        self.meeting_duration.is_zero()
    }

    pub fn mode(&self) -> MeetingMode {
        if self.is_open_ended() {
            MeetingMode::Interactive
        } else if self.tick_interval > TICKER_THRESHOLD {
            MeetingMode::Ticking
        } else {
            MeetingMode::Projection
        }
    }
}

fn validate_rate(hourly_rate: f64) -> Result<(), MeterError> {
    if hourly_rate.is_finite() && hourly_rate >= 0.0 {
        Ok(())
    } else {
        Err(MeterError::InvalidRate(hourly_rate))
    }
}
