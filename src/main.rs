mod cli;
mod collect;
mod config;
mod error;
mod event;
mod generate;
mod git;
mod github;
mod llm;
mod logging;
mod prompt;
mod providers;
mod publish;
#[cfg(test)]
mod test_helpers;
mod usage;

use std::path::Path;

use clap::Parser;
use log::info;

use cli::{Cli, Command};
use event::EventArgs;
use generate::GenerateOptions;

#[tokio::main]
async fn main() -> miette::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Command::Generate {
            version,
            language,
            openai_api_key,
            token,
            model,
            max_tokens,
            use_github_generated_notes,
            use_mention_commits_prs,
            base_url,
            github_api_url,
            draft,
            dry_run,
            output,
            config,
            event_name,
            event_path,
            pr,
            repo,
            sha,
        } => {
            generate::run(GenerateOptions {
                version,
                language,
                openai_api_key,
                token,
                model,
                max_tokens,
                use_github_generated_notes,
                use_mention_commits_prs,
                base_url,
                github_api_url,
                draft,
                dry_run,
                output,
                config,
                event: EventArgs {
                    event_name,
                    event_path,
                    pr,
                    repo,
                    sha,
                },
            })
            .await
        }
        Command::Init { force } => init(Path::new(config::FILE_NAME), force),
        Command::Usage(usage) => usage.run(),
    }
}

fn init(path: &Path, force: bool) -> miette::Result<()> {
    if path.exists() && !force {
        return Err(error::Error::Config(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        ))
        .into());
    }
    xx::file::write(path, config::Config::template()).map_err(error::Error::from)?;
    info!("wrote {}", path.display());
    eprintln!("Created {}", path.display());
    Ok(())
}
