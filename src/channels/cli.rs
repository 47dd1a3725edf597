//! CLI channel: stdin/stdout REPL for local use.

use async_trait::async_trait;
use futures::stream;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::channels::{Channel, IncomingMessage, MessageStream, OutgoingResponse};
use crate::error::ChannelError;

/// Reads user lines from stdin and prints replies to stdout.
///
/// Suggested actions print as a numbered list; typing the number picks the
/// entry.
pub struct CliChannel {
    conversation_id: String,
}

impl CliChannel {
    pub fn new(conversation_id: impl Into<String>) -> Self {
        Self {
            conversation_id: conversation_id.into(),
        }
    }

    pub fn conversation_id(&self) -> &str {
        &self.conversation_id
    }
}

/// Text block printed for one response.
pub fn render(response: &OutgoingResponse) -> String {
    let mut out = response.content.clone();
    for (i, action) in response.suggested_actions.iter().enumerate() {
        out.push_str(&format!("\n  {}. {}", i + 1, action));
    }
    out
}

#[async_trait]
impl Channel for CliChannel {
    fn name(&self) -> &str {
        "cli"
    }

    async fn start(&self) -> Result<MessageStream, ChannelError> {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let conversation_id = self.conversation_id.clone();

        tokio::spawn(async move {
            let stdin = tokio::io::stdin();
            let reader = BufReader::new(stdin);
            let mut lines = reader.lines();

            eprint!("> ");

            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        let line = line.trim().to_string();
                        if line.is_empty() {
                            eprint!("> ");
                            continue;
                        }
                        let msg = IncomingMessage::new("cli", "local-user", &line)
                            .with_conversation(conversation_id.as_str());
                        if tx.send(msg).is_err() {
                            break;
                        }
                    }
                    Ok(None) => break, // EOF
                    Err(e) => {
                        tracing::error!("Error reading stdin: {}", e);
                        break;
                    }
                }
            }
        });

        let stream = stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|msg| (msg, rx))
        });

        Ok(Box::pin(stream))
    }

    async fn respond(
        &self,
        _msg: &IncomingMessage,
        response: OutgoingResponse,
    ) -> Result<(), ChannelError> {
        let mut stdout = tokio::io::stdout();
        let block = format!("\n{}\n", render(&response));
        let send_failed = |e: std::io::Error| ChannelError::SendFailed {
            name: self.name().to_string(),
            reason: e.to_string(),
        };
        stdout.write_all(block.as_bytes()).await.map_err(send_failed)?;
        stdout.flush().await.map_err(send_failed)
    }

    async fn health_check(&self) -> Result<(), ChannelError> {
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), ChannelError> {
        Ok(())
    }
}
