use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clx::progress::{ProgressJob, ProgressJobBuilder, ProgressStatus};
use console::style;
use log::{debug, info};

use crate::collect::{self, CollectRequest};
use crate::config::{self, Defaults};
use crate::error::{Error, Result};
use crate::event::{self, EventArgs, Invocation};
use crate::github::{self, GitHubClient};
use crate::llm::{CompletionClient, Usage};
use crate::prompt::{self, PromptConfig};
use crate::providers;
use crate::publish::{self, ReleaseSubmission};

const DEFAULT_LANGUAGE: &str = "en";
const DEFAULT_MODEL: &str = "gpt-4o";
const DEFAULT_MAX_TOKENS: u32 = 4096;
const DEFAULT_TIMEOUT_SECS: u64 = 60;

pub struct GenerateOptions {
    pub version: String,
    pub language: Option<String>,
    pub openai_api_key: Option<String>,
    pub token: Option<String>,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub use_github_generated_notes: bool,
    pub use_mention_commits_prs: bool,
    pub base_url: Option<String>,
    pub github_api_url: Option<String>,
    pub draft: bool,
    pub dry_run: bool,
    pub output: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub event: EventArgs,
}

struct Context {
    invocation: Invocation,
    version: String,
    prompt_config: PromptConfig,
    use_generated_notes: bool,
    draft: bool,
    client: Box<dyn CompletionClient>,
    github: GitHubClient,
}

struct GeneratedRelease {
    submission: ReleaseSubmission,
    usage: Usage,
}

pub async fn run(opts: GenerateOptions) -> miette::Result<()> {
    let job = ProgressJobBuilder::new()
        .body("{{spinner()}} {{message | flex}}")
        .prop("message", "Resolving pull request...")
        .start();

    let cwd = std::env::current_dir().map_err(Error::from)?;
    let ctx = gather_context(&opts, &cwd)?;
    let generated = execute(&ctx, opts.dry_run, &job).await?;

    job.set_status(ProgressStatus::Done);
    job.prop("message", "Done");
    clx::progress::flush();

    let u = &generated.usage;
    eprintln!(
        "Tokens: {} input + {} output = {} total",
        u.input_tokens,
        u.output_tokens,
        u.input_tokens + u.output_tokens
    );

    let body = &generated.submission.body;
    if let Some(path) = &opts.output {
        xx::file::write(path, body).map_err(Error::from)?;
    } else {
        println!("{body}");
    }

    Ok(())
}

fn gather_context(opts: &GenerateOptions, cwd: &Path) -> Result<Context> {
    let config = match &opts.config {
        Some(path) => config::Config::load_from(path)?,
        None => config::Config::load(cwd)?.unwrap_or_default(),
    };
    let defaults = config.defaults.unwrap_or_default();

    let invocation = event::resolve(&opts.event, cwd)?;
    info!("{invocation}");

    let api_key = opts
        .openai_api_key
        .clone()
        .filter(|k| !k.is_empty())
        .ok_or_else(|| Error::Config("OPENAI_API_KEY not set (or pass --openai-api-key)".into()))?;

    let timeout = timeout(&defaults);
    let model = opts
        .model
        .clone()
        .or(defaults.model.clone())
        .unwrap_or_else(|| DEFAULT_MODEL.into());
    let max_tokens = opts
        .max_tokens
        .or(defaults.max_tokens)
        .unwrap_or(DEFAULT_MAX_TOKENS);
    let base_url = non_empty(opts.base_url.clone().or(defaults.base_url.clone()));
    info!("model: {model}");
    let client = providers::build_client(api_key, model, max_tokens, base_url, timeout)?;

    let api_url = non_empty(opts.github_api_url.clone().or(defaults.github_api_url.clone()))
        .unwrap_or_else(|| github::DEFAULT_API_URL.into());
    let github = GitHubClient::with_base_url(
        opts.token.clone(),
        &invocation.repository,
        api_url,
        timeout,
    )?;

    let prompt_config = PromptConfig {
        language: non_empty(opts.language.clone().or(defaults.language.clone()))
            .unwrap_or_else(|| DEFAULT_LANGUAGE.into()),
        mention_commits_prs: opts.use_mention_commits_prs
            || defaults.mention_commits_prs.unwrap_or(false),
        context: config.context,
        system_extra: config.system_extra,
    };

    Ok(Context {
        invocation,
        version: opts.version.clone(),
        prompt_config,
        use_generated_notes: opts.use_github_generated_notes
            || defaults.use_github_generated_notes.unwrap_or(false),
        draft: opts.draft || defaults.draft.unwrap_or(false),
        client,
        github,
    })
}

fn timeout(defaults: &Defaults) -> Option<Duration> {
    match defaults.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS) {
        0 => None,
        secs => Some(Duration::from_secs(secs)),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Collect, render, complete, then publish. The release is the last write.
async fn execute(ctx: &Context, dry_run: bool, job: &Arc<ProgressJob>) -> Result<GeneratedRelease> {
    let generated = generate_notes(ctx, job).await?;

    if dry_run {
        info!("dry run: not creating release {}", ctx.version);
    } else {
        job.prop(
            "message",
            &format!("Creating GitHub release {}...", ctx.version),
        );
        let release = publish::publish(&ctx.github, &generated.submission).await?;
        eprintln!(
            "{} {}",
            style("Created release").green().bold(),
            release.html_url.as_deref().unwrap_or(&release.tag_name)
        );
    }

    Ok(generated)
}

async fn generate_notes(ctx: &Context, job: &Arc<ProgressJob>) -> Result<GeneratedRelease> {
    job.prop(
        "message",
        &format!(
            "Collecting changes for PR #{}...",
            ctx.invocation.pr_number
        ),
    );
    let release_ctx = collect::collect(
        &ctx.github,
        &CollectRequest {
            pr_number: ctx.invocation.pr_number,
            version: &ctx.version,
            target: &ctx.invocation.sha,
            use_generated_notes: ctx.use_generated_notes,
        },
    )
    .await?;

    let system = prompt::system_prompt(ctx.prompt_config.system_extra.as_deref());
    let user_msg = prompt::render(&release_ctx, &ctx.prompt_config);
    debug!("prompt:\n{user_msg}");

    job.prop(
        "message",
        &format!("Writing release notes with {}...", ctx.client.model()),
    );
    let completion = ctx.client.complete(Some(&system), &user_msg).await?;
    info!(
        "completion tokens: {} input + {} output",
        completion.usage.input_tokens, completion.usage.output_tokens
    );

    let submission = ReleaseSubmission::from_completion(&ctx.version, completion.text, ctx.draft)?;
    Ok(GeneratedRelease {
        submission,
        usage: completion.usage,
    })
}
