use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

use crate::usage;

#[derive(Parser, Debug)]
#[command(
    name = "herald",
    version,
    about = "AI-written release notes for pull requests"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write release notes for a pull request and publish them as a GitHub release
    Generate {
        /// Version to release; used as the tag and the release name
        version: String,

        /// Language the release notes are written in
        #[arg(long)]
        language: Option<String>,

        /// API key for the completion service
        #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
        openai_api_key: Option<String>,

        /// GitHub token used for API calls
        #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
        token: Option<String>,

        /// Model to use
        #[arg(long)]
        model: Option<String>,

        /// Max response tokens
        #[arg(long)]
        max_tokens: Option<u32>,

        /// Use GitHub's generated release notes instead of the PR's commits
        #[arg(long)]
        use_github_generated_notes: bool,

        /// Allow the notes to mention commits and pull requests
        #[arg(long)]
        use_mention_commits_prs: bool,

        /// Base URL of an OpenAI-compatible API
        #[arg(long)]
        base_url: Option<String>,

        /// GitHub API base URL
        #[arg(long, env = "GITHUB_API_URL")]
        github_api_url: Option<String>,

        /// Create the release as a draft
        #[arg(long)]
        draft: bool,

        /// Print the notes without creating a release
        #[arg(long)]
        dry_run: bool,

        /// Write the notes to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Path to a config file (defaults to ./herald.toml)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Triggering event name
        #[arg(long, env = "GITHUB_EVENT_NAME")]
        event_name: Option<String>,

        /// Path to the triggering event's JSON payload
        #[arg(long, env = "GITHUB_EVENT_PATH")]
        event_path: Option<PathBuf>,

        /// Pull request number (read from the event payload if omitted)
        #[arg(long)]
        pr: Option<u64>,

        /// GitHub repo in owner/repo format (auto-detected from git remote)
        #[arg(long, env = "GITHUB_REPOSITORY")]
        repo: Option<String>,

        /// Commit the release targets (defaults to the PR head, then HEAD)
        #[arg(long, env = "GITHUB_SHA")]
        sha: Option<String>,
    },

    /// Generate a herald.toml config file in the current directory
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },

    Usage(usage::Usage),
}
