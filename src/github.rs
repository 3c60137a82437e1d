use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const DEFAULT_API_URL: &str = "https://api.github.com";

const PER_PAGE: usize = 100;

pub struct GitHubClient {
    client: reqwest::Client,
    token: Option<String>,
    owner: String,
    repo: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
pub struct Release {
    pub id: u64,
    pub tag_name: String,
    #[serde(default)]
    pub html_url: Option<String>,
}

/// An entry from `GET /pulls/{number}/commits`.
#[derive(Debug, Deserialize)]
pub struct PullRequestCommit {
    pub sha: String,
    pub commit: CommitDetail,
    /// The linked GitHub account; `null` when the author email is unknown to GitHub.
    pub author: Option<User>,
}

#[derive(Debug, Deserialize)]
pub struct CommitDetail {
    pub message: String,
    pub author: Option<GitAuthor>,
}

#[derive(Debug, Deserialize)]
pub struct GitAuthor {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct User {
    pub login: String,
    pub html_url: String,
}

#[derive(Debug, Deserialize)]
pub struct PullRequestRef {
    pub number: u64,
    pub html_url: String,
}

#[derive(Debug, Deserialize)]
pub struct GeneratedNotes {
    pub body: String,
}

#[derive(Debug, Serialize)]
struct GenerateNotesRequest<'a> {
    tag_name: &'a str,
    target_commitish: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    previous_tag_name: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct CreateRelease<'a> {
    tag_name: &'a str,
    name: &'a str,
    body: &'a str,
    draft: bool,
}

impl GitHubClient {
    pub fn with_base_url(
        token: Option<String>,
        owner_repo: &str,
        base_url: String,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let (owner, repo) = owner_repo
            .split_once('/')
            .filter(|(o, r)| !o.is_empty() && !r.is_empty())
            .ok_or_else(|| Error::GitHub(format!("invalid owner/repo: {owner_repo}")))?;
        let mut builder = reqwest::Client::builder().user_agent("herald/0.1");
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            token: token.filter(|t| !t.is_empty()),
            owner: owner.to_string(),
            repo: repo.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/repos/{}/{}{path}", self.base_url, self.owner, self.repo)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let req = self
            .client
            .request(method, url)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28");
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn check(resp: Response, what: &str) -> Result<Response> {
        if resp.status().is_success() {
            return Ok(resp);
        }
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        Err(Error::GitHub(format!("{what}: {status} {body}")))
    }

    /// Every commit of a pull request, in the order the API returns them.
    pub async fn list_pr_commits(&self, number: u64) -> Result<Vec<PullRequestCommit>> {
        let mut commits = Vec::new();
        let mut page = 1;
        loop {
            let url = self.api_url(&format!(
                "/pulls/{number}/commits?per_page={PER_PAGE}&page={page}"
            ));
            let resp = self.request(Method::GET, &url).send().await?;
            let resp = Self::check(resp, &format!("GET PR #{number} commits")).await?;
            let batch: Vec<PullRequestCommit> = resp.json().await?;
            let done = batch.len() < PER_PAGE;
            commits.extend(batch);
            if done {
                break;
            }
            page += 1;
        }
        Ok(commits)
    }

    pub async fn list_prs_for_commit(&self, sha: &str) -> Result<Vec<PullRequestRef>> {
        let url = self.api_url(&format!("/commits/{sha}/pulls"));
        let resp = self.request(Method::GET, &url).send().await?;
        let resp = Self::check(resp, &format!("GET pulls for {sha}")).await?;
        Ok(resp.json().await?)
    }

    /// The most recent published release, or `None` if the repository has none.
    pub async fn latest_release(&self) -> Result<Option<Release>> {
        let url = self.api_url("/releases/latest");
        let resp = self.request(Method::GET, &url).send().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let resp = Self::check(resp, "GET latest release").await?;
        Ok(Some(resp.json().await?))
    }

    pub async fn generate_notes(
        &self,
        tag: &str,
        target: &str,
        previous_tag: Option<&str>,
    ) -> Result<GeneratedNotes> {
        let url = self.api_url("/releases/generate-notes");
        let payload = GenerateNotesRequest {
            tag_name: tag,
            target_commitish: target,
            previous_tag_name: previous_tag,
        };
        let resp = self
            .request(Method::POST, &url)
            .json(&payload)
            .send()
            .await?;
        let resp = Self::check(resp, &format!("POST generate-notes {tag}")).await?;
        Ok(resp.json().await?)
    }

    pub async fn create_release(
        &self,
        tag: &str,
        name: &str,
        body: &str,
        draft: bool,
    ) -> Result<Release> {
        let url = self.api_url("/releases");
        let payload = CreateRelease {
            tag_name: tag,
            name,
            body,
            draft,
        };
        let resp = self
            .request(Method::POST, &url)
            .json(&payload)
            .send()
            .await?;
        let resp = Self::check(resp, &format!("POST release {tag}")).await?;
        Ok(resp.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::commit_json;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn setup() -> (MockServer, GitHubClient) {
        let server = MockServer::start().await;
        let client = GitHubClient::with_base_url(
            Some("test-token".into()),
            "owner/repo",
            server.uri(),
            None,
        )
        .unwrap();
        (server, client)
    }

    #[test]
    fn test_invalid_owner_repo() {
        for bad in ["invalid", "/repo", "owner/"] {
            let result = GitHubClient::with_base_url(None, bad, DEFAULT_API_URL.into(), None);
            assert!(
                result
                    .err()
                    .unwrap()
                    .to_string()
                    .contains("invalid owner/repo")
            );
        }
    }

    #[tokio::test]
    async fn test_list_pr_commits() {
        let (server, client) = setup().await;
        Mock::given(method("GET"))
            .and(path("/repos/owner/repo/pulls/7/commits"))
            .and(header("Authorization", "Bearer test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                commit_json("aaa", "feat: one", "Alice", Some("alice")),
                commit_json("bbb", "fix: two", "Bob", None),
            ])))
            .mount(&server)
            .await;

        let commits = client.list_pr_commits(7).await.unwrap();
        assert_eq!(commits.len(), 2);
        assert_eq!(commits[0].sha, "aaa");
        assert_eq!(commits[0].commit.message, "feat: one");
        assert_eq!(commits[0].author.as_ref().unwrap().login, "alice");
        assert!(commits[1].author.is_none());
    }

    #[tokio::test]
    async fn test_list_pr_commits_paginates() {
        let (server, client) = setup().await;
        let first: Vec<_> = (0..PER_PAGE)
            .map(|i| commit_json(&format!("sha{i}"), &format!("commit {i}"), "A", None))
            .collect();
        Mock::given(method("GET"))
            .and(path("/repos/owner/repo/pulls/7/commits"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(first)))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repos/owner/repo/pulls/7/commits"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([commit_json(
                "last", "last commit", "A", None
            )])))
            .expect(1)
            .mount(&server)
            .await;

        let commits = client.list_pr_commits(7).await.unwrap();
        assert_eq!(commits.len(), PER_PAGE + 1);
        assert_eq!(commits[0].sha, "sha0");
        assert_eq!(commits[PER_PAGE].sha, "last");
    }

    #[tokio::test]
    async fn test_list_pr_commits_error() {
        let (server, client) = setup().await;
        Mock::given(method("GET"))
            .and(path("/repos/owner/repo/pulls/7/commits"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Bad credentials"))
            .mount(&server)
            .await;

        let err = client.list_pr_commits(7).await.unwrap_err();
        assert!(err.to_string().contains("401"));
        assert!(err.to_string().contains("Bad credentials"));
    }

    #[tokio::test]
    async fn test_list_prs_for_commit() {
        let (server, client) = setup().await;
        Mock::given(method("GET"))
            .and(path("/repos/owner/repo/commits/abc/pulls"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"number": 42, "html_url": "https://github.com/owner/repo/pull/42"}
            ])))
            .mount(&server)
            .await;

        let prs = client.list_prs_for_commit("abc").await.unwrap();
        assert_eq!(prs.len(), 1);
        assert_eq!(prs[0].number, 42);
        assert_eq!(prs[0].html_url, "https://github.com/owner/repo/pull/42");
    }

    #[tokio::test]
    async fn test_latest_release() {
        let (server, client) = setup().await;
        Mock::given(method("GET"))
            .and(path("/repos/owner/repo/releases/latest"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 1, "tag_name": "v1.0.0", "name": "v1.0.0"
            })))
            .mount(&server)
            .await;

        let release = client.latest_release().await.unwrap().unwrap();
        assert_eq!(release.tag_name, "v1.0.0");
    }

    #[tokio::test]
    async fn test_latest_release_not_found() {
        let (server, client) = setup().await;
        Mock::given(method("GET"))
            .and(path("/repos/owner/repo/releases/latest"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        assert!(client.latest_release().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_generate_notes_omits_missing_previous_tag() {
        let (server, client) = setup().await;
        Mock::given(method("POST"))
            .and(path("/repos/owner/repo/releases/generate-notes"))
            .and(body_json(json!({
                "tag_name": "v2.0.0",
                "target_commitish": "deadbeef"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "v2.0.0",
                "body": "## What's Changed\n* Thing"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let notes = client
            .generate_notes("v2.0.0", "deadbeef", None)
            .await
            .unwrap();
        assert!(notes.body.contains("What's Changed"));
    }

    #[tokio::test]
    async fn test_create_release() {
        let (server, client) = setup().await;
        Mock::given(method("POST"))
            .and(path("/repos/owner/repo/releases"))
            .and(body_json(json!({
                "tag_name": "v1.2.0",
                "name": "v1.2.0",
                "body": "notes",
                "draft": false
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": 9,
                "tag_name": "v1.2.0",
                "name": "v1.2.0",
                "html_url": "https://github.com/owner/repo/releases/tag/v1.2.0"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let release = client
            .create_release("v1.2.0", "v1.2.0", "notes", false)
            .await
            .unwrap();
        assert_eq!(release.id, 9);
    }

    #[tokio::test]
    async fn test_unauthenticated_requests_skip_auth_header() {
        let server = MockServer::start().await;
        let client =
            GitHubClient::with_base_url(None, "owner/repo", server.uri(), None).unwrap();
        Mock::given(method("GET"))
            .and(path("/repos/owner/repo/commits/abc/pulls"))
            .respond_with(move |req: &wiremock::Request| {
                if req.headers.contains_key("authorization") {
                    ResponseTemplate::new(400)
                } else {
                    ResponseTemplate::new(200).set_body_json(json!([]))
                }
            })
            .mount(&server)
            .await;

        assert!(client.list_prs_for_commit("abc").await.unwrap().is_empty());
    }
}
