use crate::calculator::{format_cost, Calculator};
use crate::collector::RateCollector;
use crate::data_structures::{MeetingConfig, MeetingMode};
use crate::session::SessionHandle;
use crate::termination::TerminationStrategy;
use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

const INTERACTIVE_BANNER: &str =
    "Starting an interactive ticker, press Q and enter to end the meeting\n";

/// How a run ended.
pub enum MeetingOutcome<W> {
    /// An open-ended meeting was closed by the user.
    Finished(W),
    /// A ticking session was started and left running. Dropping the handle
    /// abandons it.
    Detached(SessionHandle<W>),
    /// The total cost was printed once.
    Projected { amount: f64, output: W },
}

impl<W> MeetingOutcome<W> {
    pub fn mode(&self) -> MeetingMode {
        match self {
            MeetingOutcome::Finished(_) => MeetingMode::Interactive,
            MeetingOutcome::Detached(_) => MeetingMode::Ticking,
            MeetingOutcome::Projected { .. } => MeetingMode::Projection,
        }
    }
}

pub struct MeetingMeter {
    config: MeetingConfig,
    collector: RateCollector,
    calculator: Calculator,
}

impl MeetingMeter {
    pub fn new(config: MeetingConfig) -> Self {
        Self {
            config,
            collector: RateCollector::new(),
            calculator: Calculator::new(),
        }
    }

    pub fn config(&self) -> &MeetingConfig {
        &self.config
    }

    pub async fn run<R, W>(&mut self, mut input: R, mut output: W) -> Result<MeetingOutcome<W>>
    where
        R: AsyncBufRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        if self.config.needs_rate() {
            let rate = self.collector.collect(&mut input, &mut output).await?;
            self.config = self.config.with_hourly_rate(rate)?;
        }

        let mode = self.config.mode();
        debug!(mode = mode.name(), hourly_rate = self.config.hourly_rate(), "running meeting meter");

        match mode {
            MeetingMode::Interactive => {
                write_text(&mut output, INTERACTIVE_BANNER).await?;

                let session = SessionHandle::start(
                    &self.config,
                    TerminationStrategy::Interactive,
                    input,
                    output,
                );
                let mut output = session.wait().await?;
                write_text(&mut output, "\n").await?;

                Ok(MeetingOutcome::Finished(output))
            }
            MeetingMode::Ticking => {
                let session = SessionHandle::start(
                    &self.config,
                    TerminationStrategy::for_config(&self.config),
                    input,
                    output,
                );
                warn!(
                    duration = ?self.config.meeting_duration(),
                    "ticking session started without waiting for it; exiting now ends it before any output"
                );

                Ok(MeetingOutcome::Detached(session))
            }
            MeetingMode::Projection => {
                let amount = self
                    .calculator
                    .calculate_cost(self.config.hourly_rate(), self.config.meeting_duration());
                write_text(&mut output, &format_cost(amount)).await?;
                write_text(&mut output, "\n").await?;

                Ok(MeetingOutcome::Projected { amount, output })
            }
        }
    }
}

async fn write_text<W: AsyncWrite + Unpin>(output: &mut W, text: &str) -> Result<()> {
    output
        .write_all(text.as_bytes())
        .await
        .context("Failed to write output")?;
    output.flush().await.context("Failed to flush output")?;
    Ok(())
}
