pub mod openai;

use std::time::Duration;

use crate::error::Result;
use crate::llm::CompletionClient;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

pub fn build_client(
    api_key: String,
    model: String,
    max_tokens: u32,
    base_url: Option<String>,
    timeout: Option<Duration>,
) -> Result<Box<dyn CompletionClient>> {
    let base = base_url.unwrap_or_else(|| DEFAULT_BASE_URL.into());
    Ok(Box::new(openai::OpenAIProvider::new(
        api_key, model, max_tokens, base, timeout,
    )?))
}
