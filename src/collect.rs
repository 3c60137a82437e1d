//! Gathers the facts the release notes are written from.
//!
//! A run either looks at every commit of the pull request (and the pull
//! requests each commit belongs to), or at the summary GitHub generates
//! between the latest release and the target commit.

use futures_util::{StreamExt, TryStreamExt, stream};
use log::{debug, info, warn};

use crate::error::{Error, Result};
use crate::github::{GitHubClient, PullRequestCommit};

/// Pull request lookups in flight at once.
const LOOKUP_CONCURRENCY: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrReference {
    /// Display form, e.g. `#123`.
    pub label: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    pub message: String,
    pub author_name: String,
    pub author_profile_url: String,
    pub pull_requests: Vec<PrReference>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseContext {
    /// Never empty.
    Commits(Vec<CommitRecord>),
    GeneratedNotes {
        previous_tag: Option<String>,
        raw_notes: String,
    },
}

pub struct CollectRequest<'a> {
    pub pr_number: u64,
    /// Tag of the release being prepared.
    pub version: &'a str,
    /// Commit the release will point at.
    pub target: &'a str,
    pub use_generated_notes: bool,
}

pub async fn collect(github: &GitHubClient, req: &CollectRequest<'_>) -> Result<ReleaseContext> {
    if req.use_generated_notes {
        Ok(collect_generated_notes(github, req.version, req.target).await)
    } else {
        collect_commits(github, req.pr_number).await
    }
}

async fn collect_commits(github: &GitHubClient, pr_number: u64) -> Result<ReleaseContext> {
    let commits = github.list_pr_commits(pr_number).await?;
    info!("PR #{pr_number}: {} commits", commits.len());
    if commits.is_empty() {
        return Err(Error::NoCommits(pr_number));
    }

    let records: Vec<CommitRecord> = stream::iter(commits)
        .map(|c| commit_record(github, c))
        .buffered(LOOKUP_CONCURRENCY)
        .try_collect()
        .await?;
    Ok(ReleaseContext::Commits(records))
}

async fn commit_record(github: &GitHubClient, commit: PullRequestCommit) -> Result<CommitRecord> {
    let prs = github.list_prs_for_commit(&commit.sha).await?;
    debug!("{}: {} associated PRs", commit.sha, prs.len());

    let author_name = commit
        .commit
        .author
        .map(|a| a.name)
        .filter(|n| !n.is_empty())
        .or_else(|| commit.author.as_ref().map(|u| u.login.clone()))
        .unwrap_or_else(|| "unknown".into());
    let author_profile_url = commit
        .author
        .map(|u| u.html_url)
        .unwrap_or_default();

    Ok(CommitRecord {
        message: commit.commit.message,
        author_name,
        author_profile_url,
        pull_requests: prs
            .into_iter()
            .map(|pr| PrReference {
                label: format!("#{}", pr.number),
                url: pr.html_url,
            })
            .collect(),
    })
}

/// Failures here are logged and degrade to empty notes rather than aborting.
async fn collect_generated_notes(
    github: &GitHubClient,
    version: &str,
    target: &str,
) -> ReleaseContext {
    let previous_tag = match github.latest_release().await {
        Ok(release) => release.map(|r| r.tag_name),
        Err(e) => {
            warn!("could not look up the latest release: {e}");
            return ReleaseContext::GeneratedNotes {
                previous_tag: None,
                raw_notes: String::new(),
            };
        }
    };
    match &previous_tag {
        Some(tag) => info!("previous release: {tag}"),
        None => info!("no previous release"),
    }

    let raw_notes = match github
        .generate_notes(version, target, previous_tag.as_deref())
        .await
    {
        Ok(notes) => notes.body,
        Err(e) => {
            warn!("could not generate release notes on GitHub: {e}");
            String::new()
        }
    };

    ReleaseContext::GeneratedNotes {
        previous_tag,
        raw_notes,
    }
}
