use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum MeterError {
    #[error("invalid duration {0:?}")]
    InvalidDuration(String),

    #[error("negative duration {0:?} is not allowed")]
    NegativeDuration(String),

    #[error("hourly rate must be a non-negative number, got {0}")]
    InvalidRate(f64),

    #[error("tick interval must be greater than zero")]
    ZeroTickInterval,
}
