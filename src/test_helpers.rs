use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use serde_json::{Value, json};

use crate::error::Result;
use crate::llm::{Completion, CompletionClient, Usage};

pub struct TempRepo {
    pub dir: tempfile::TempDir,
}

impl TempRepo {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path();
        git(p, &["init"]);
        git(p, &["config", "user.email", "test@test.com"]);
        git(p, &["config", "user.name", "Test"]);
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write_file(&self, name: &str, content: &str) {
        let path = self.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    pub fn commit(&self, msg: &str) {
        git(self.path(), &["add", "-A"]);
        git(self.path(), &["commit", "-m", msg]);
    }

    pub fn add_remote(&self, url: &str) {
        git(self.path(), &["remote", "add", "origin", url]);
    }
}

fn git(dir: &Path, args: &[&str]) {
    let output = std::process::Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
}

/// Prompts a [`MockCompletionClient`] received; stays readable after the
/// client is boxed away.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    prompts: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    pub fn count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

/// Replays canned completions in order.
pub struct MockCompletionClient {
    responses: Mutex<Vec<Completion>>,
    log: CallLog,
}

impl MockCompletionClient {
    pub fn new(responses: Vec<Completion>) -> Self {
        Self {
            responses: Mutex::new(responses),
            log: CallLog::default(),
        }
    }

    pub fn log(&self) -> CallLog {
        self.log.clone()
    }
}

impl CompletionClient for MockCompletionClient {
    fn model(&self) -> &str {
        "mock"
    }

    fn complete<'a>(
        &'a self,
        _system: Option<&'a str>,
        user: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Completion>> + Send + 'a>> {
        self.log.prompts.lock().unwrap().push(user.to_string());
        let resp = self.responses.lock().unwrap().remove(0);
        Box::pin(async move { Ok(resp) })
    }
}

pub fn text_completion(text: &str) -> Completion {
    Completion {
        text: Some(text.into()),
        usage: fake_usage(),
    }
}

pub fn fake_usage() -> Usage {
    Usage {
        input_tokens: 0,
        output_tokens: 0,
    }
}

/// A `GET /pulls/{n}/commits` entry as GitHub returns it.
pub fn commit_json(sha: &str, message: &str, name: &str, login: Option<&str>) -> Value {
    let author = match login {
        Some(login) => json!({
            "login": login,
            "html_url": format!("https://github.com/{login}"),
        }),
        None => Value::Null,
    };
    json!({
        "sha": sha,
        "commit": {
            "message": message,
            "author": {"name": name, "email": "dev@example.com"},
        },
        "author": author,
    })
}
