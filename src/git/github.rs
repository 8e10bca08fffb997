use std::env;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::branch::{full_ref, heads_ref};
use crate::domain::{GitObject, ObjectId, TreeEntry};
use crate::error::{AutoReleaseError, Result};
use crate::git::{CommitInfo, GitHost, PullRequest, PullRequestInfo, Release, ReleaseInfo};

/// Credentials and target repository of the running workflow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitHubContext {
    pub token: String,
    pub owner: String,
    pub repo: String,
    /// Commit that triggered the workflow, when known
    pub sha: Option<String>,
}

impl GitHubContext {
    /// Read the context from the environment.
    ///
    /// The token comes from `token_env`. The repository comes from
    /// `repository` when given, else from `GITHUB_REPOSITORY`. The triggering
    /// commit comes from `GITHUB_SHA`.
    pub fn from_env(token_env: &str, repository: Option<&str>) -> Result<Self> {
        let token = env::var(token_env)
            .ok()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| AutoReleaseError::config(format!("{} is not set", token_env)))?;

        let repository = match repository {
            Some(r) => r.to_string(),
            None => env::var("GITHUB_REPOSITORY").map_err(|_| {
                AutoReleaseError::config("GITHUB_REPOSITORY is not set and no --repository given")
            })?,
        };
        let (owner, repo) = parse_repository(&repository)?;

        let sha = env::var("GITHUB_SHA").ok().filter(|s| !s.is_empty());

        Ok(GitHubContext {
            token,
            owner,
            repo,
            sha,
        })
    }
}

/// Split `owner/name` into its two parts
pub fn parse_repository(repository: &str) -> Result<(String, String)> {
    match repository.trim().split_once('/') {
        Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
            Ok((owner.to_string(), repo.to_string()))
        }
        _ => Err(AutoReleaseError::config(format!(
            "invalid repository '{}' - expected owner/name",
            repository
        ))),
    }
}

/// A failed HTTP exchange
struct Failure {
    status: Option<StatusCode>,
    message: String,
}

impl Failure {
    fn is_not_found(&self) -> bool {
        self.status == Some(StatusCode::NOT_FOUND)
    }

    /// Error for a request on the ref of `branch`: a 404 means the branch is
    /// missing, anything else goes through `otherwise`.
    fn on_ref(self, branch: &str, otherwise: fn(String) -> AutoReleaseError) -> AutoReleaseError {
        if self.is_not_found() {
            AutoReleaseError::ref_not_found(heads_ref(branch))
        } else {
            otherwise(self.message)
        }
    }

    /// Creating a ref fails as a whole; GitHub answers 422 when it exists.
    fn on_create_ref(self, branch: &str) -> AutoReleaseError {
        AutoReleaseError::ref_creation(format!("{}: {}", full_ref(branch), self.message))
    }
}

/// Body of a ref update. `force` lets the ref move to a commit that does
/// not descend from its current head, so the last writer wins.
fn update_ref_payload(target: &ObjectId) -> serde_json::Value {
    serde_json::json!({ "sha": target.as_str(), "force": true })
}

/// Message from a GitHub error body (`{"message": ...}`), or the raw body
fn api_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        message: String,
    }

    serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

#[derive(Deserialize)]
struct ShaField {
    sha: String,
}

#[derive(Deserialize)]
struct RefResponse {
    object: ShaField,
}

#[derive(Deserialize)]
struct CommitResponse {
    tree: ShaField,
}

#[derive(Deserialize)]
struct PullResponse {
    number: u64,
    html_url: String,
}

#[derive(Deserialize)]
struct ReleaseResponse {
    id: u64,
    html_url: String,
}

#[derive(Serialize)]
struct TreeEntryPayload<'a> {
    path: &'a str,
    mode: &'static str,
    #[serde(rename = "type")]
    kind: &'static str,
    sha: &'a str,
}

impl<'a> From<&'a TreeEntry> for TreeEntryPayload<'a> {
    fn from(entry: &'a TreeEntry) -> Self {
        TreeEntryPayload {
            path: &entry.path,
            mode: entry.mode.as_str(),
            kind: entry.kind.as_str(),
            sha: entry.id.as_str(),
        }
    }
}

/// GitHub REST API client bound to one repository
pub struct GitHubHost {
    client: Client,
    api_url: String,
    owner: String,
    repo: String,
}

impl GitHubHost {
    pub fn new(api_url: &str, context: &GitHubContext) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let auth = HeaderValue::from_str(&format!("Bearer {}", context.token))
            .map_err(|_| AutoReleaseError::config("token contains invalid characters"))?;
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("auto-release/", env!("CARGO_PKG_VERSION"))),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AutoReleaseError::config(format!("cannot build HTTP client: {}", e)))?;

        Ok(GitHubHost {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            owner: context.owner.clone(),
            repo: context.repo.clone(),
        })
    }

    /// Endpoint under `/repos/{owner}/{repo}/`
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/repos/{}/{}/{}", self.api_url, self.owner, self.repo, path)
    }

    async fn execute(&self, request: RequestBuilder) -> std::result::Result<Response, Failure> {
        let response = request.send().await.map_err(|e| Failure {
            status: e.status(),
            message: format!("request failed: {}", e),
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(Failure {
            status: Some(status),
            message: format!("{}: {}", status, api_message(&body)),
        })
    }

    async fn call<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        on_error: fn(String) -> AutoReleaseError,
    ) -> Result<T> {
        let response = self
            .execute(request)
            .await
            .map_err(|f| on_error(f.message))?;
        response
            .json::<T>()
            .await
            .map_err(|e| on_error(format!("unexpected response: {}", e)))
    }

    async fn create_sha(&self, path: &str, payload: serde_json::Value) -> Result<ObjectId> {
        let request = self.client.post(self.endpoint(path)).json(&payload);
        let created: ShaField = self.call(request, AutoReleaseError::RemoteObject).await?;
        Ok(ObjectId::new(created.sha))
    }
}

#[async_trait]
impl GitHost for GitHubHost {
    async fn resolve_ref(&self, branch: &str) -> Result<ObjectId> {
        debug!(branch, "GET ref");
        let request = self
            .client
            .get(self.endpoint(&format!("git/ref/{}", heads_ref(branch))));

        let response = self
            .execute(request)
            .await
            .map_err(|f| f.on_ref(branch, AutoReleaseError::Api))?;
        let reference: RefResponse = response
            .json()
            .await
            .map_err(|e| AutoReleaseError::api(format!("unexpected response: {}", e)))?;
        Ok(ObjectId::new(reference.object.sha))
    }

    async fn read_commit(&self, id: &ObjectId) -> Result<CommitInfo> {
        debug!(commit = %id, "GET commit");
        let request = self
            .client
            .get(self.endpoint(&format!("git/commits/{}", id)));
        let commit: CommitResponse = self.call(request, AutoReleaseError::RemoteObject).await?;
        Ok(CommitInfo {
            id: id.clone(),
            tree: ObjectId::new(commit.tree.sha),
        })
    }

    async fn create_object(&self, object: &GitObject) -> Result<ObjectId> {
        debug!(kind = object.kind().as_str(), "POST object");
        match object {
            GitObject::Blob { content } => {
                self.create_sha(
                    "git/blobs",
                    serde_json::json!({ "content": content, "encoding": "utf-8" }),
                )
                .await
            }
            GitObject::Tree { entries, base } => {
                let tree: Vec<TreeEntryPayload> = entries.iter().map(Into::into).collect();
                let mut payload = serde_json::json!({ "tree": tree });
                if let Some(base) = base {
                    payload["base_tree"] = serde_json::Value::String(base.to_string());
                }
                self.create_sha("git/trees", payload).await
            }
            GitObject::Commit {
                message,
                tree,
                parents,
            } => {
                let parents: Vec<&str> = parents.iter().map(ObjectId::as_str).collect();
                self.create_sha(
                    "git/commits",
                    serde_json::json!({
                        "message": message,
                        "tree": tree.as_str(),
                        "parents": parents,
                    }),
                )
                .await
            }
        }
    }

    async fn create_ref(&self, branch: &str, target: &ObjectId) -> Result<()> {
        debug!(branch, target = %target, "POST ref");
        let request = self.client.post(self.endpoint("git/refs")).json(&serde_json::json!({
            "ref": full_ref(branch),
            "sha": target.as_str(),
        }));
        self.execute(request)
            .await
            .map_err(|f| f.on_create_ref(branch))?;
        Ok(())
    }

    async fn update_ref(&self, branch: &str, target: &ObjectId) -> Result<()> {
        debug!(branch, target = %target, "PATCH ref");
        let request = self
            .client
            .patch(self.endpoint(&format!("git/refs/{}", heads_ref(branch))))
            .json(&update_ref_payload(target));
        self.execute(request)
            .await
            .map_err(|f| f.on_ref(branch, AutoReleaseError::RemoteObject))?;
        Ok(())
    }

    async fn create_pull_request(&self, request: &PullRequest) -> Result<PullRequestInfo> {
        debug!(head = %request.head, base = %request.base, "POST pull request");
        let http = self.client.post(self.endpoint("pulls")).json(&serde_json::json!({
            "title": request.title,
            "head": request.head,
            "base": request.base,
            "body": request.body,
        }));
        let pull: PullResponse = self.call(http, AutoReleaseError::Api).await?;
        Ok(PullRequestInfo {
            number: pull.number,
            url: pull.html_url,
        })
    }

    async fn create_release(&self, release: &Release) -> Result<ReleaseInfo> {
        debug!(tag = %release.tag, "POST release");
        let http = self.client.post(self.endpoint("releases")).json(&serde_json::json!({
            "tag_name": release.tag,
            "name": release.name,
            "body": release.body,
            "draft": release.draft,
            "prerelease": release.prerelease,
            "target_commitish": release.target_commitish,
        }));
        let created: ReleaseResponse = self.call(http, AutoReleaseError::Api).await?;
        Ok(ReleaseInfo {
            id: created.id,
            url: created.html_url,
        })
    }
}
