//! Ask command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::rag::{ChatEngine, ChatEvent};
use anyhow::Result;
use std::io::Write;

/// Run the ask command.
pub async fn run_ask(
    video_id: &str,
    question: &str,
    model: Option<String>,
    mut settings: Settings,
) -> Result<()> {
    if let Some(model) = model {
        settings.chat.model = model;
    }

    let engine = ChatEngine::new(&settings)?;
    let mut rx = engine.stream_chat(video_id.to_string(), question.to_string());

    let mut stdout = std::io::stdout();
    let mut failed = false;

    while let Some(event) = rx.recv().await {
        match event {
            ChatEvent::Message(segment) => {
                print!("{}", segment);
                stdout.flush()?;
            }
            ChatEvent::End => {
                println!();
            }
            ChatEvent::Error(message) => {
                println!();
                Output::error(&format!("Generation failed: {}", message));
                failed = true;
            }
        }
    }

    if failed {
        anyhow::bail!("answer stream ended with an error");
    }

    Ok(())
}
