//! Ingest command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the ingest command.
pub async fn run_ingest(video_id: &str, settings: Settings) -> Result<()> {
    let orchestrator = Orchestrator::new(settings)?;

    Output::info(&format!("Ingesting transcript for {}...", video_id));

    match orchestrator.ingest(video_id).await {
        Ok(0) => {
            Output::success("Transcript unchanged, nothing to do.");
        }
        Ok(added) => {
            Output::success(&format!("Indexed {} chunks.", added));
        }
        Err(e) => {
            Output::error(&format!("Ingest failed: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
