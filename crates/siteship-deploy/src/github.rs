//! GitHub deployment strategy.
//!
//! Pushes generated files one at a time through the repository contents
//! API. Each file is looked up first so an existing file is updated in
//! place rather than rejected for a missing blob SHA.

use std::sync::Arc;

use base64::Engine;
use serde::Deserialize;
use tracing::{debug, warn};

use siteship_core::deploy::{DeployResult, GeneratedFile};
use siteship_core::{Error, Result};

const GITHUB_API: &str = "https://api.github.com";
const USER_AGENT: &str = "Siteship";

/// Result of writing one file through the contents API.
#[derive(Debug, Clone)]
pub struct PutFile {
    pub commit_sha: String,
}

/// Repository contents operations, separated out so deploys can be tested
/// without the network.
#[async_trait::async_trait]
pub trait GithubContents: Send + Sync {
    /// Blob SHA of an existing file, or `None` when the path does not exist.
    async fn file_sha(&self, repo: &str, path: &str) -> Result<Option<String>>;

    /// Create or update one file. `existing_sha` must be passed when the
    /// file already exists or the API rejects the write.
    async fn put_file(
        &self,
        repo: &str,
        path: &str,
        content: &str,
        existing_sha: Option<&str>,
        message: &str,
    ) -> Result<PutFile>;
}

/// GitHub contents API client.
pub struct HttpGithubContents {
    client: reqwest::Client,
    token: Option<String>,
}

impl HttpGithubContents {
    /// Without a token only public repositories accept writes, which the
    /// API will refuse; the token is optional so read paths still work in
    /// credential-less development.
    pub fn new(token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            token,
        }
    }

    fn contents_url(repo: &str, path: &str) -> String {
        let encoded: Vec<String> = path
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect();
        format!("{}/repos/{}/contents/{}", GITHUB_API, repo, encoded.join("/"))
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let builder = builder
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/vnd.github+json");
        match &self.token {
            Some(token) => builder.header("Authorization", format!("Bearer {}", token)),
            None => builder,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ContentMeta {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct PutContentResponse {
    commit: CommitMeta,
}

#[derive(Debug, Deserialize)]
struct CommitMeta {
    sha: String,
}

#[async_trait::async_trait]
impl GithubContents for HttpGithubContents {
    async fn file_sha(&self, repo: &str, path: &str) -> Result<Option<String>> {
        let url = Self::contents_url(repo, path);
        let response = self
            .request(self.client.get(&url))
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("github request failed: {}", e)))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Upstream(format!(
                "github contents lookup failed ({}): {}",
                status, text
            )));
        }

        let meta: ContentMeta = response
            .json()
            .await
            .map_err(|e| Error::Upstream(format!("github response parse failed: {}", e)))?;
        Ok(Some(meta.sha))
    }

    async fn put_file(
        &self,
        repo: &str,
        path: &str,
        content: &str,
        existing_sha: Option<&str>,
        message: &str,
    ) -> Result<PutFile> {
        let url = Self::contents_url(repo, path);
        let encoded = base64::engine::general_purpose::STANDARD.encode(content);

        let mut payload = serde_json::json!({
            "message": message,
            "content": encoded,
        });
        if let Some(sha) = existing_sha {
            payload["sha"] = serde_json::Value::String(sha.to_string());
        }

        let response = self
            .request(self.client.put(&url))
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("github request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Upstream(format!(
                "github file write failed ({}): {}",
                status, text
            )));
        }

        let put: PutContentResponse = response
            .json()
            .await
            .map_err(|e| Error::Upstream(format!("github response parse failed: {}", e)))?;
        Ok(PutFile {
            commit_sha: put.commit.sha,
        })
    }
}

/// File-by-file deployment to a GitHub repository.
pub struct GithubStrategy {
    contents: Arc<dyn GithubContents>,
}

impl GithubStrategy {
    pub fn new(contents: Arc<dyn GithubContents>) -> Self {
        Self { contents }
    }

    /// Push all files, stopping at the first failure.
    ///
    /// A failure mid-run reports exactly which files landed so an operator
    /// can see how far the deploy got.
    pub async fn deploy(&self, repo: &str, files: &[GeneratedFile]) -> DeployResult {
        let total = files.len();
        let mut deployed: Vec<String> = Vec::with_capacity(total);
        let mut last_commit: Option<String> = None;

        for file in files {
            match self.push_file(repo, file).await {
                Ok(put) => {
                    debug!(repo, file = %file.name, "pushed file");
                    deployed.push(file.name.clone());
                    last_commit = Some(put.commit_sha);
                }
                Err(e) => {
                    warn!(repo, file = %file.name, error = %e, "github push failed");
                    let cause = Error::PartialDeploy {
                        deployed: deployed.len(),
                        total,
                        file: file.name.clone(),
                        cause: e.to_string(),
                    };
                    return DeployResult::failure("GitHub deployment failed", cause)
                        .with_deployed_files(deployed);
                }
            }
        }

        DeployResult {
            url: Some(format!("https://github.com/{}", repo)),
            pages_url: pages_url(repo),
            deployed_files: Some(deployed),
            commit_sha: last_commit,
            ..DeployResult::success(format!(
                "Successfully deployed {} files to {}",
                total, repo
            ))
        }
    }

    async fn push_file(&self, repo: &str, file: &GeneratedFile) -> Result<PutFile> {
        let existing = self.contents.file_sha(repo, &file.name).await?;
        let message = match existing {
            Some(_) => format!("Update {}", file.name),
            None => format!("Add {}", file.name),
        };
        self.contents
            .put_file(repo, &file.name, &file.content, existing.as_deref(), &message)
            .await
    }
}

/// Pages URL for `owner/name` repositories.
fn pages_url(repo: &str) -> Option<String> {
    let (owner, name) = repo.split_once('/')?;
    Some(format!("https://{}.github.io/{}", owner, name))
}
