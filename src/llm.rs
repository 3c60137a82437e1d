use std::future::Future;
use std::pin::Pin;

use crate::error::Result;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// A single completion. `text` is `None` when the service answered without
/// any usable content.
#[derive(Debug, Clone, Default)]
pub struct Completion {
    pub text: Option<String>,
    pub usage: Usage,
}

pub trait CompletionClient: Send + Sync {
    fn model(&self) -> &str;

    fn complete<'a>(
        &'a self,
        system: Option<&'a str>,
        user: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Completion>> + Send + 'a>>;
}
