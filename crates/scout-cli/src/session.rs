use anyhow::Result;
use futures::StreamExt;
use scout_client::{ArgumentMode, ChunkAggregator, ClientError, ScoutClient};
use scout_types::{Message, StreamEvent};
use serde::Deserialize;
use std::io::Write;

/// One conversation thread driven from the terminal
pub struct Session {
    client: ScoutClient,
    thread_id: String,
    mode: ArgumentMode,
    /// Last chart announced to the user
    current_chart: Option<String>,
}

#[derive(Deserialize)]
struct RunError {
    message: String,
}

impl Session {
    /// Create a fresh thread for `user_id`
    pub async fn start(client: ScoutClient, user_id: &str, mode: ArgumentMode) -> Result<Self> {
        let thread = client.create_thread(user_id).await?;
        tracing::info!(thread_id = %thread.thread_id, "Thread created");
        Ok(Self {
            client,
            thread_id: thread.thread_id,
            mode,
            current_chart: None,
        })
    }

    pub fn thread_id(&self) -> &str {
        &self.thread_id
    }

    pub async fn show_history(&self, out: &mut impl Write) -> Result<()> {
        writeln!(out, "\n---- Thread History ---- \n")?;
        match self.client.get_thread_messages(&self.thread_id).await {
            Ok(messages) => write!(out, "{}", format_history(&messages))?,
            Err(e) => writeln!(out, "Error retrieving history: {}", e)?,
        }
        writeln!(out)?;
        Ok(())
    }

    /// Re-save the thread's current checkpoint
    pub async fn save(&self, out: &mut impl Write) -> Result<()> {
        writeln!(out, "\n---- Saving Thread State ---- \n")?;
        let saved = async {
            let snapshot = self.client.get_thread_state(&self.thread_id).await?;
            self.client
                .save_thread_state(&self.thread_id, &snapshot.values)
                .await
        }
        .await;

        match saved {
            Ok(result) => writeln!(
                out,
                "Thread state saved successfully: {} messages",
                result.message_count
            )?,
            Err(e) => writeln!(out, "Error saving thread state: {}", e)?,
        }
        writeln!(out)?;
        Ok(())
    }

    /// Send one user turn, echoing the assistant's output as it streams.
    ///
    /// A payload that fails to decode ends this run's output but not the
    /// session. Transport failures are returned to the caller.
    pub async fn send(&mut self, content: &str, out: &mut impl Write) -> Result<String> {
        writeln!(out, "\n---- User ---- \n\n{}\n", content)?;
        writeln!(out, "---- Assistant ---- \n")?;
        out.flush()?;

        let mut aggregator = ChunkAggregator::new(self.mode);
        let mut events = self.client.stream_run(&self.thread_id, content).await?;

        while let Some(event) = events.next().await {
            let event = match event.inspect_err(log_diagnostics) {
                Ok(event) => event,
                Err(e) if e.is_decode_failure() => {
                    writeln!(out, "\n[stream could not be decoded: {}]", e)?;
                    break;
                }
                Err(e) => return Err(e.into()),
            };
            match &event {
                StreamEvent::Messages { chunk, .. } => {
                    let piece = aggregator.push(chunk);
                    if !piece.is_empty() {
                        write!(out, "{}", piece)?;
                        out.flush()?;
                    }
                }
                StreamEvent::Other { kind, data } if kind == "error" => {
                    let message = serde_json::from_str::<RunError>(data)
                        .map(|e| e.message)
                        .unwrap_or_else(|_| data.clone());
                    writeln!(out, "\n[run failed: {}]", message)?;
                }
                _ => {}
            }
        }
        writeln!(out)?;

        self.check_chart(out).await?;
        writeln!(out)?;

        Ok(aggregator.text().to_string())
    }

    /// Announce a chart the last run produced
    async fn check_chart(&mut self, out: &mut impl Write) -> Result<()> {
        let snapshot = match self.client.get_thread_state(&self.thread_id).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                writeln!(out, "Error checking for charts: {}", e)?;
                return Ok(());
            }
        };

        let chart = snapshot.values.chart_json;
        if chart.is_empty() || self.current_chart.as_deref() == Some(chart.as_str()) {
            return Ok(());
        }

        writeln!(
            out,
            "[A new chart is available ({} bytes of Plotly JSON)]",
            chart.len()
        )?;
        self.current_chart = Some(chart);
        Ok(())
    }
}

fn log_diagnostics(error: &ClientError) {
    if let Some((kind, payload)) = error.diagnostics() {
        tracing::error!(event = kind, payload = payload, error = %error, "Failed to decode run event");
    } else {
        tracing::error!(error = %error, "Run stream failed");
    }
}

/// `ROLE: content` per message
pub fn format_history(messages: &[Message]) -> String {
    if messages.is_empty() {
        return "No message history found.\n".to_string();
    }

    messages
        .iter()
        .map(|msg| format!("{}: {}\n\n", msg.role().to_uppercase(), msg.content()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_history() {
        let messages = vec![Message::human("Hi"), Message::ai("Hello!")];
        assert_eq!(format_history(&messages), "HUMAN: Hi\n\nASSISTANT: Hello!\n\n");
    }

    #[test]
    fn test_format_empty_history() {
        assert_eq!(format_history(&[]), "No message history found.\n");
    }
}
