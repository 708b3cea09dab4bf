//! OpenAI client construction.

use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Request timeout. Generous because streamed completions hold the
/// connection open for the whole answer.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Create an OpenAI client with a bounded request timeout, so a hung
/// embedding or generation call cannot stall an ingest or chat forever.
pub fn create_client() -> Client<OpenAIConfig> {
    let http_client = reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .expect("Failed to create HTTP client");

    Client::with_config(OpenAIConfig::default()).with_http_client(http_client)
}
