use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

const OPENING_PROMPT: &str =
    "Please enter the hourly rates of all participants, one at a time. ie. 150 OR 1000.50\n";
const NEXT_PARTICIPANT_PROMPT: &str = "Please enter the hourly rates of the next participant\n\
If all meeting participants accounted for, type Q and enter to move on.\n";

fn is_sentinel(line: &str) -> bool {
    line == "q" || line == "Q"
}

enum RateEntry {
    Rate(f64),
    Negative,
    Unreadable,
}

fn parse_rate(line: &str) -> RateEntry {
    match line.trim().parse::<f64>() {
        Ok(rate) if !rate.is_finite() => RateEntry::Unreadable,
        Ok(rate) if rate < 0.0 => RateEntry::Negative,
        Ok(rate) => RateEntry::Rate(rate),
        Err(_) => RateEntry::Unreadable,
    }
}

/// Sums participants' hourly rates, one per line, until `q` or `Q`.
pub struct RateCollector;

impl RateCollector {
    pub fn new() -> Self {
        Self
    }

    pub async fn collect<R, W>(&self, input: &mut R, output: &mut W) -> Result<f64>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut total_rate = 0.0;
        let mut line = Vec::new();

        write_prompt(output, OPENING_PROMPT).await?;

        loop {
            write_prompt(output, NEXT_PARTICIPANT_PROMPT).await?;

            line.clear();
            let bytes_read = input
                .read_until(b'\n', &mut line)
                .await
                .context("Failed to read hourly rate")?;

            if bytes_read == 0 {
                warn!(total_rate, "input closed before Q, using rates collected so far");
                break;
            }

            let text = String::from_utf8_lossy(&line);
            let entry = text.trim_end_matches(['\r', '\n']);
            if is_sentinel(entry) {
                break;
            }

            match parse_rate(entry) {
                RateEntry::Rate(rate) => {
                    total_rate += rate;
                    debug!(rate, total_rate, "added participant rate");
                }
                RateEntry::Negative => {
                    let retry = format!(
                        "Sorry, {} is negative. Hourly rates can't be below zero, please try again.\n",
                        entry
                    );
                    write_prompt(output, &retry).await?;
                }
                RateEntry::Unreadable => {
                    let retry = format!("Sorry, didn't understand {}. Please try again.\n", entry);
                    write_prompt(output, &retry).await?;
                }
            }
        }

        Ok(total_rate)
    }
}

impl Default for RateCollector {
    fn default() -> Self {
        Self::new()
    }
}

async fn write_prompt<W: AsyncWrite + Unpin>(output: &mut W, text: &str) -> Result<()> {
    output
        .write_all(text.as_bytes())
        .await
        .context("Failed to write prompt")?;
    output.flush().await.context("Failed to flush prompt")?;
    Ok(())
}
