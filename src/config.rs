use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

pub const FILE_NAME: &str = "herald.toml";

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    pub system_extra: Option<String>,
    pub context: Option<String>,
    pub defaults: Option<Defaults>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Defaults {
    pub language: Option<String>,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub base_url: Option<String>,
    pub github_api_url: Option<String>,
    pub use_github_generated_notes: Option<bool>,
    pub mention_commits_prs: Option<bool>,
    pub draft: Option<bool>,
    pub timeout_secs: Option<u64>,
}

const TEMPLATE: &str = r#"# Extra instructions appended to the system prompt.
# Use this to customize tone or project-specific conventions.
#system_extra = ""

# Project description included in every prompt.
#context = ""

[defaults]
#language = "en"
#model = "gpt-4o"
#max_tokens = 4096
#base_url = "https://api.openai.com/v1"
#github_api_url = "https://api.github.com"
#use_github_generated_notes = false
#mention_commits_prs = false
#draft = false
#timeout_secs = 60
"#;

impl Config {
    /// Loads `herald.toml` from `dir`, if there is one.
    pub fn load(dir: &Path) -> Result<Option<Config>> {
        let path = dir.join(FILE_NAME);
        if !path.exists() {
            return Ok(None);
        }
        Self::load_from(&path).map(Some)
    }

    /// Loads an explicitly requested config file. A missing file is an error.
    pub fn load_from(path: &Path) -> Result<Config> {
        if !path.exists() {
            return Err(Error::Config(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        let contents = xx::file::read_to_string(path)?;
        toml::from_str(&contents).map_err(|e| {
            let span = e.span().map(|s| s.into()).unwrap_or((0, 0).into());
            Error::Toml {
                message: e.message().to_string(),
                src: miette::NamedSource::new(path.display().to_string(), contents.clone()),
                span,
            }
        })
    }

    pub fn template() -> &'static str {
        TEMPLATE
    }
}
