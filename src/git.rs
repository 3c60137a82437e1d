use std::path::Path;

use xx::git::Git;
use xx::process;

use crate::error::{Error, Result};

pub fn detect_remote(dir: &Path) -> Result<String> {
    let git = Git::new(dir.to_path_buf());
    let url = git
        .get_remote_url()
        .ok_or_else(|| Error::Git("no origin remote found".into()))?;
    parse_owner_repo(&url)
}

pub fn head_sha(dir: &Path) -> Result<String> {
    let sha = process::cmd("git", ["rev-parse", "HEAD"])
        .cwd(dir)
        .read()
        .map_err(|e| Error::Git(format!("cannot resolve HEAD: {e}")))?;
    Ok(sha.trim().to_string())
}

fn parse_owner_repo(url: &str) -> Result<String> {
    // SSH: git@github.com:owner/repo.git
    if let Some(rest) = url.strip_prefix("git@github.com:") {
        let repo = rest.trim_end_matches(".git");
        return Ok(repo.to_string());
    }
    // HTTPS: https://github.com/owner/repo.git
    if let Some(rest) = url
        .strip_prefix("https://github.com/")
        .or_else(|| url.strip_prefix("http://github.com/"))
    {
        let repo = rest.trim_end_matches(".git");
        return Ok(repo.to_string());
    }
    Err(Error::Git(format!(
        "cannot parse GitHub repo from remote URL: {url}"
    )))
}
