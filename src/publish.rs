use log::info;

use crate::error::{Error, Result};
use crate::github::{GitHubClient, Release};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseSubmission {
    pub tag_name: String,
    pub display_name: String,
    pub body: String,
    pub draft: bool,
}

impl ReleaseSubmission {
    /// Uses the completion text verbatim as the release body. Missing or blank
    /// text is an error so that no empty release is ever created.
    pub fn from_completion(version: &str, text: Option<String>, draft: bool) -> Result<Self> {
        let body = text
            .filter(|t| !t.trim().is_empty())
            .ok_or(Error::EmptyCompletion)?;
        Ok(Self {
            tag_name: version.to_string(),
            display_name: version.to_string(),
            body,
            draft,
        })
    }
}

pub async fn publish(github: &GitHubClient, submission: &ReleaseSubmission) -> Result<Release> {
    let release = github
        .create_release(
            &submission.tag_name,
            &submission.display_name,
            &submission.body,
            submission.draft,
        )
        .await?;
    info!(
        "created release {} (id {}){}",
        release.tag_name,
        release.id,
        release
            .html_url
            .as_deref()
            .map(|u| format!(": {u}"))
            .unwrap_or_default()
    );
    Ok(release)
}
