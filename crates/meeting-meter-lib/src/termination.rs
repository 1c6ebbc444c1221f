use crate::data_structures::MeetingConfig;
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::watch;
use tracing::{debug, warn};

/// One-shot stop signal shared by the ticker and the active strategy.
#[derive(Clone)]
pub struct TerminationSignal {
    sender: Arc<watch::Sender<bool>>,
}

impl TerminationSignal {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Returns `true` only for the call that actually fired the signal.
    pub fn fire(&self) -> bool {
        self.sender.send_if_modified(|fired| {
            if *fired {
                false
            } else {
                *fired = true;
                true
            }
        })
    }

    pub fn is_fired(&self) -> bool {
        *self.sender.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.sender.subscribe()
    }
}

impl Default for TerminationSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves once the signal has fired, or once every sender is gone.
pub async fn fired(receiver: &mut watch::Receiver<bool>) {
    loop {
        let is_fired = *receiver.borrow_and_update();
        if is_fired {
            return;
        }
        if receiver.changed().await.is_err() {
            return;
        }
    }
}

/// Decides when a session is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationStrategy {
    /// Wait for the user to type `q`.
    Interactive,
    /// Wait out the scheduled meeting length.
    FixedDuration(Duration),
}

impl TerminationStrategy {
    pub fn for_config(config: &MeetingConfig) -> Self {
        if config.is_open_ended() {
            TerminationStrategy::Interactive
        } else {
            TerminationStrategy::FixedDuration(config.meeting_duration())
        }
    }

    pub async fn wait<R>(&self, input: &mut R) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        match self {
            TerminationStrategy::Interactive => wait_for_quit(input).await,
            TerminationStrategy::FixedDuration(duration) => {
                tokio::time::sleep(*duration).await;
                debug!(?duration, "scheduled meeting length elapsed");
                Ok(())
            }
        }
    }
}

async fn wait_for_quit<R>(input: &mut R) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = Vec::new();

    loop {
        line.clear();
        let bytes_read = input
            .read_until(b'\n', &mut line)
            .await
            .context("Failed to read from input")?;

        if bytes_read == 0 {
            warn!("input closed, ending the meeting");
            return Ok(());
        }

        if String::from_utf8_lossy(&line)
            .split_whitespace()
            .any(|token| token.eq_ignore_ascii_case("q"))
        {
            debug!("quit requested");
            return Ok(());
        }
    }
}
