#![allow(unused_assignments)]

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("unsupported event: {0}")]
    #[diagnostic(
        code(herald::unsupported_event),
        help("herald runs on pull_request events (opened, synchronize or reopened)")
    )]
    UnsupportedEvent(String),

    #[error("pull request #{0} has no commits")]
    #[diagnostic(code(herald::no_commits))]
    NoCommits(u64),

    #[error("completion service returned no text")]
    #[diagnostic(
        code(herald::empty_completion),
        help("no release was created; check the model name and the API response")
    )]
    EmptyCompletion,

    #[error("git error: {0}")]
    Git(String),

    #[error("GitHub API error: {0}")]
    GitHub(String),

    #[error("LLM API error: {0}")]
    Llm(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("{message}")]
    #[diagnostic()]
    Toml {
        message: String,
        #[source_code]
        src: miette::NamedSource<String>,
        #[label("{message}")]
        span: miette::SourceSpan,
    },

    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Xx(#[from] xx::XXError),
}

pub type Result<T> = std::result::Result<T, Error>;
