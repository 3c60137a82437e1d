//! Turns a [`ReleaseContext`] into the instruction sent to the completion
//! service. Everything here is pure: the same inputs always render the same
//! bytes.

use std::sync::LazyLock;

use regex::Regex;

use crate::collect::{CommitRecord, ReleaseContext};

/// Pull request, issue and commit references: `(#12)`, `#12`, and GitHub
/// pull/issue/commit/compare URLs, including a leading "in".
static REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:\s+in)?\s*(?:\(#\d+\)|#\d+\b|https?://\S+/(?:pull|issues|commit|compare)/\S*[\w/])",
    )
    .unwrap()
});

/// `by @login` and bare `@login` mentions. A handle followed by `/` is an npm
/// scope such as `@types/node` and is kept.
static ATTRIBUTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\s+by)?(?:\s+|^)@[A-Za-z0-9][A-Za-z0-9-]*(?:\[bot\])?(?P<end>[^\w/\[-]|$)")
        .unwrap()
});

const TRAILERS: &[&str] = &["co-authored-by:", "signed-off-by:"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptConfig {
    /// Free-form language name or code, passed through verbatim.
    pub language: String,
    pub mention_commits_prs: bool,
    /// Project description from the config file.
    pub context: Option<String>,
    pub system_extra: Option<String>,
}

pub fn system_prompt(extra: Option<&str>) -> String {
    let mut prompt = "You are an expert technical writer who turns raw change information into \
clear, accurate release notes for the users of a software project. You follow formatting \
instructions exactly and never add information that was not given to you."
        .to_string();

    if let Some(extra) = extra {
        prompt.push_str("\n\n");
        prompt.push_str(extra);
    }

    prompt
}

pub fn render(context: &ReleaseContext, config: &PromptConfig) -> String {
    let language = &config.language;
    let mut parts = Vec::new();

    if let Some(ctx) = &config.context {
        parts.push(format!("## Project Context\n{ctx}\n"));
    }

    parts.push(format!(
        "Write the release notes for the changes below, in the language \"{language}\"."
    ));

    let mention = if config.mention_commits_prs {
        "- Reference the related pull requests as markdown links, e.g. \
         [#123](https://github.com/OWNER/REPO/pull/123), using only the links provided below."
    } else {
        "- Do NOT mention commits, pull requests or issues, and do not include any links to them."
    };

    parts.push(format!(
        "\n## Rules\n\
         - Organize the notes into exactly two sections: new features first, then bug fixes.\n\
         {mention}\n\
         - Never mention contributors by name, handle or pseudonym. Describe what changed, not who changed it.\n\
         - Only describe changes supported by the information below. Do NOT invent features, fixes or details.\n\
         - Write everything in \"{language}\", including both section headings.\n\
         - Leave a section's list empty rather than padding it.\n\
         - Respond with the markdown below and nothing else: no title, no introduction, no closing remarks."
    ));

    parts.push(
        "\n## Output Format\n\
         ```markdown\n\
         ### New Features\n\
         - <feature>\n\
         \n\
         ### Bug Fixes\n\
         - <fix>\n\
         ```"
        .into(),
    );

    match context {
        ReleaseContext::Commits(commits) => {
            parts.push(render_commits(commits, config.mention_commits_prs));
        }
        ReleaseContext::GeneratedNotes {
            previous_tag,
            raw_notes,
        } => {
            parts.push(render_generated_notes(
                previous_tag.as_deref(),
                raw_notes,
                config.mention_commits_prs,
            ));
        }
    }

    parts.join("\n")
}

fn render_commits(commits: &[CommitRecord], mention: bool) -> String {
    let mut authors: Vec<&str> = Vec::new();
    let mut section = String::from(
        "\n## Commits\nListed oldest first. Authors are anonymized and must not be mentioned.\n",
    );

    for (i, commit) in commits.iter().enumerate() {
        let identity = author_identity(commit);
        let author = match authors.iter().position(|a| *a == identity) {
            Some(idx) => idx + 1,
            None => {
                authors.push(identity);
                authors.len()
            }
        };

        let message = clean_message(&commit.message, mention);
        section.push_str(&format!("\n{}. {}\n", i + 1, message.replace('\n', "\n   ")));
        section.push_str(&format!("   Author: contributor-{author}\n"));

        if mention && !commit.pull_requests.is_empty() {
            let refs = commit
                .pull_requests
                .iter()
                .map(|pr| format!("[{}]({})", pr.label, pr.url))
                .collect::<Vec<_>>()
                .join(", ");
            section.push_str(&format!("   Pull requests: {refs}\n"));
        }
    }

    section
}

/// Profile URL when GitHub knows the author, otherwise the git author name.
fn author_identity(commit: &CommitRecord) -> &str {
    if commit.author_profile_url.is_empty() {
        &commit.author_name
    } else {
        &commit.author_profile_url
    }
}

fn render_generated_notes(previous_tag: Option<&str>, raw_notes: &str, mention: bool) -> String {
    let since = match previous_tag {
        Some(tag) => format!("since {tag}"),
        None => "since the beginning of the project".to_string(),
    };
    let notes = clean_generated_notes(raw_notes, mention);
    let notes = if notes.is_empty() {
        "(no generated notes are available)".to_string()
    } else {
        notes
    };
    format!(
        "\n## Generated Release Notes\n\
         GitHub generated these notes from the changes {since}. Refine and improve them into the \
         format above; do not add anything they do not support.\n\
         ```text\n{notes}\n```"
    )
}

/// Drops trailers that name people and, unless references are wanted, any
/// pull request or commit references.
fn clean_message(message: &str, mention: bool) -> String {
    let kept = message
        .lines()
        .filter(|line| {
            let lower = line.trim_start().to_ascii_lowercase();
            !TRAILERS.iter().any(|t| lower.starts_with(t))
        })
        .collect::<Vec<_>>()
        .join("\n");
    let kept = if mention {
        kept
    } else {
        REFERENCE.replace_all(&kept, "").into_owned()
    };
    kept.trim().to_string()
}

fn clean_generated_notes(notes: &str, mention: bool) -> String {
    let mut out = Vec::new();
    let mut in_contributors = false;
    for line in notes.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with('#') {
            in_contributors = trimmed.trim_start_matches('#').trim() == "New Contributors";
            if in_contributors {
                continue;
            }
        } else if in_contributors && !is_list_item(trimmed) && !trimmed.is_empty() {
            in_contributors = false;
        }
        if in_contributors || trimmed.contains("made their first contribution") {
            continue;
        }
        if !mention && trimmed.starts_with("**Full Changelog**") {
            continue;
        }
        let line = ATTRIBUTION.replace_all(line, "${end}");
        let line = if mention {
            line.into_owned()
        } else {
            REFERENCE.replace_all(&line, "").into_owned()
        };
        out.push(line.trim_end().to_string());
    }
    out.join("\n").trim().to_string()
}

fn is_list_item(line: &str) -> bool {
    line.starts_with("* ") || line.starts_with("- ")
}
