use crate::calculator::{format_cost, Calculator};
use crate::data_structures::MeetingConfig;
use crate::termination::{fired, TerminationSignal, TerminationStrategy};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncWrite, AsyncWriteExt};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, trace};

/// Rewrites the running cost every `tick_interval` until `stop` fires.
///
/// The first tick lands one full interval after the loop starts. The writer
/// is handed back once the loop ends.
pub async fn run_ticker<W>(
    hourly_rate: f64,
    tick_interval: Duration,
    mut stop: watch::Receiver<bool>,
    mut output: W,
) -> Result<W>
where
    W: AsyncWrite + Unpin,
{
    let calculator = Calculator::new();
    let start = Instant::now();
    let mut ticker = time::interval_at(start + tick_interval, tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;

            _ = fired(&mut stop) => break,

            tick = ticker.tick() => {
                let elapsed = tick.duration_since(start);
                let amount = calculator.calculate_cost(hourly_rate, elapsed);
                trace!(?elapsed, amount, "tick");

                output
                    .write_all(format_cost(amount).as_bytes())
                    .await
                    .context("Failed to write running cost")?;
                output.flush().await.context("Failed to flush running cost")?;
            }
        }
    }

    Ok(output)
}

/// A running meeting: one ticker task plus one termination task.
pub struct SessionHandle<W> {
    ticker: JoinHandle<Result<W>>,
    strategy: JoinHandle<Result<()>>,
    signal: TerminationSignal,
    finished: Arc<AtomicBool>,
    started_at: DateTime<Utc>,
}

impl<W> SessionHandle<W>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    pub fn start<R>(
        config: &MeetingConfig,
        strategy: TerminationStrategy,
        mut input: R,
        output: W,
    ) -> Self
    where
        R: AsyncBufRead + Unpin + Send + 'static,
    {
        let signal = TerminationSignal::new();
        let finished = Arc::new(AtomicBool::new(false));
        let started_at = Utc::now();

        debug!(
            %started_at,
            hourly_rate = config.hourly_rate(),
            tick_interval = ?config.tick_interval(),
            ?strategy,
            "meeting session started"
        );

        let ticker = tokio::spawn(run_ticker(
            config.hourly_rate(),
            config.tick_interval(),
            signal.subscribe(),
            output,
        ));

        let strategy_signal = signal.clone();
        let strategy_finished = Arc::clone(&finished);
        let strategy = tokio::spawn(async move {
            let result = strategy.wait(&mut input).await;
            strategy_signal.fire();
            strategy_finished.store(true, Ordering::SeqCst);
            result
        });

        Self {
            ticker,
            strategy,
            signal,
            finished,
            started_at,
        }
    }
}

impl<W> SessionHandle<W> {
    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Ends the meeting early, without waiting for the strategy.
    pub fn stop(&self) {
        if self.signal.fire() {
            debug!("meeting session stopped early");
        }
        self.strategy.abort();
        self.finished.store(true, Ordering::SeqCst);
    }

    /// Waits for both tasks and returns the writer the ticker was using.
    pub async fn wait(self) -> Result<W> {
        match self.strategy.await {
            Ok(result) => result?,
            Err(err) if err.is_cancelled() => {}
            Err(err) => return Err(err).context("Termination task failed"),
        }

        let output = self.ticker.await.context("Ticker task failed")??;
        let elapsed = Utc::now() - self.started_at;
        debug!(elapsed_seconds = elapsed.num_seconds(), "meeting session finished");

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINE: &str = "\rThe total current cost of this meeting is $";

    fn config(rate: f64, duration: Duration, ticks: Duration) -> MeetingConfig {
        MeetingConfig::new(rate, duration, ticks).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticker_writes_cost_each_interval() {
        let signal = TerminationSignal::new();
        let ticker = tokio::spawn(run_ticker(
            3600.0,
            Duration::from_secs(1),
            signal.subscribe(),
            Vec::new(),
        ));

        time::sleep(Duration::from_millis(3_500)).await;
        signal.fire();

        let output = String::from_utf8(ticker.await.unwrap().unwrap()).unwrap();
        assert_eq!(
            output,
            format!("{LINE}1.00{LINE}2.00{LINE}3.00"),
        );
        assert!(!output.contains('\n'));
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticker_never_ticks_after_early_signal() {
        let signal = TerminationSignal::new();
        signal.fire();

        let output = run_ticker(3600.0, Duration::from_secs(1), signal.subscribe(), Vec::new())
            .await
            .unwrap();

        assert!(output.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fixed_session_stops_itself() {
        let config = config(3600.0, Duration::from_secs(5), Duration::from_secs(2));
        let session = SessionHandle::start(
            &config,
            TerminationStrategy::for_config(&config),
            tokio::io::empty(),
            Vec::new(),
        );
        assert!(!session.is_finished());

        let output = String::from_utf8(session.wait().await.unwrap()).unwrap();
        assert_eq!(output, format!("{LINE}2.00{LINE}4.00"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_ends_session_before_input_arrives() {
        let config = config(3600.0, Duration::ZERO, Duration::from_secs(1));
        let (_keep_open, reader) = tokio::io::duplex(16);
        let session = SessionHandle::start(
            &config,
            TerminationStrategy::Interactive,
            tokio::io::BufReader::new(reader),
            Vec::new(),
        );

        time::sleep(Duration::from_millis(1_500)).await;
        session.stop();
        assert!(session.is_finished());

        let output = String::from_utf8(session.wait().await.unwrap()).unwrap();
        assert_eq!(output, format!("{LINE}1.00"));
    }

    #[tokio::test]
    async fn test_started_at_is_recorded() {
        let before = Utc::now();
        let config = config(10.0, Duration::from_millis(10), Duration::from_secs(2));
        let session = SessionHandle::start(
            &config,
            TerminationStrategy::for_config(&config),
            tokio::io::empty(),
            Vec::new(),
        );

        assert!(session.started_at() >= before);
        session.wait().await.unwrap();
    }
}
