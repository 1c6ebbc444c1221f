pub mod calculator;
pub mod collector;
pub mod data_structures;
pub mod duration;
pub mod error;
pub mod meter;
pub mod session;
pub mod termination;

pub use calculator::{cost, format_cost, Calculator};
pub use collector::RateCollector;
pub use data_structures::{MeetingConfig, MeetingMode, DEFAULT_TICK_INTERVAL, TICKER_THRESHOLD};
pub use duration::parse_duration;
pub use error::MeterError;
pub use meter::{MeetingMeter, MeetingOutcome};
pub use session::{run_ticker, SessionHandle};
pub use termination::{TerminationSignal, TerminationStrategy};

pub use anyhow::Result;

pub mod prelude {
    pub use crate::data_structures::{MeetingConfig, MeetingMode};
    pub use crate::meter::{MeetingMeter, MeetingOutcome};
    pub use anyhow::Result;
}
