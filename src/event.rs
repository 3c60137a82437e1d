//! The pull request a run was triggered for, resolved from explicit flags,
//! the GitHub Actions environment and event payload, and finally the local
//! git checkout.

use std::fmt;
use std::path::{Path, PathBuf};

use log::debug;
use serde::Deserialize;
use strum::EnumString;

use crate::error::{Error, Result};
use crate::git;

const PULL_REQUEST_EVENTS: &[&str] = &["pull_request", "pull_request_target"];

/// Pull request actions a release can be prepared for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum PullRequestAction {
    Opened,
    Synchronize,
    Reopened,
}

#[derive(Debug, Default, Clone)]
pub struct EventArgs {
    pub event_name: Option<String>,
    pub event_path: Option<PathBuf>,
    pub pr: Option<u64>,
    pub repo: Option<String>,
    pub sha: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub event_name: String,
    pub action: Option<PullRequestAction>,
    pub pr_number: u64,
    /// `owner/repo`
    pub repository: String,
    pub sha: String,
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.event_name)?;
        if let Some(action) = self.action {
            write!(f, " ({action})")?;
        }
        write!(
            f,
            " on {} PR #{} at {}",
            self.repository, self.pr_number, self.sha
        )
    }
}

#[derive(Debug, Default, Deserialize)]
struct Payload {
    action: Option<String>,
    pull_request: Option<PayloadPullRequest>,
    repository: Option<PayloadRepository>,
}

#[derive(Debug, Deserialize)]
struct PayloadPullRequest {
    number: u64,
    head: Option<PayloadHead>,
}

#[derive(Debug, Deserialize)]
struct PayloadHead {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct PayloadRepository {
    full_name: String,
}

pub fn resolve(args: &EventArgs, cwd: &Path) -> Result<Invocation> {
    let payload = match &args.event_path {
        Some(path) if path.exists() => read_payload(path)?,
        Some(path) => {
            return Err(Error::Config(format!(
                "event payload {} does not exist (check GITHUB_EVENT_PATH or --event-path)",
                path.display()
            )));
        }
        None => Payload::default(),
    };

    let event_name = match (&args.event_name, args.pr) {
        (Some(name), _) => name.clone(),
        (None, Some(_)) => "pull_request".to_string(),
        (None, None) => {
            return Err(Error::UnsupportedEvent(
                "no event name (set GITHUB_EVENT_NAME or pass --pr)".into(),
            ));
        }
    };
    let action = check_event(&event_name, payload.action.as_deref())?;

    let pr_number = args
        .pr
        .or(payload.pull_request.as_ref().map(|pr| pr.number))
        .ok_or_else(|| Error::Config("pull request number unknown; pass --pr".into()))?;

    let repository = match args
        .repo
        .clone()
        .filter(|r| !r.is_empty())
        .or(payload.repository.map(|r| r.full_name))
    {
        Some(r) => r,
        None => git::detect_remote(cwd)?,
    };

    let sha = match args
        .sha
        .clone()
        .filter(|s| !s.is_empty())
        .or(payload.pull_request.and_then(|pr| pr.head).map(|h| h.sha))
    {
        Some(s) => s,
        None => git::head_sha(cwd)?,
    };

    Ok(Invocation {
        event_name,
        action,
        pr_number,
        repository,
        sha,
    })
}

fn read_payload(path: &Path) -> Result<Payload> {
    debug!("reading event payload {}", path.display());
    let contents = xx::file::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

fn check_event(event_name: &str, action: Option<&str>) -> Result<Option<PullRequestAction>> {
    if !PULL_REQUEST_EVENTS.contains(&event_name) {
        return Err(Error::UnsupportedEvent(event_name.to_string()));
    }
    match action {
        None => Ok(None),
        Some(action) => action
            .parse()
            .map(Some)
            .map_err(|_| Error::UnsupportedEvent(format!("{event_name} ({action})"))),
    }
}
