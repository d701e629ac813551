//! Remote task store access.
//!
//! `TodoApi` is the seam between the client and the REST service exposing
//! `{base}/todos`. `HttpTodoApi` is the reqwest implementation used by the
//! binary; tests substitute in-memory fakes.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::error::{Error, Result};
use crate::task::{NewTask, Task, TaskId, TaskPatch};

#[async_trait]
pub trait TodoApi: Send + Sync {
    /// `GET {base}/todos`
    async fn list(&self) -> Result<Vec<Task>>;

    /// `POST {base}/todos`
    async fn create(&self, task: &NewTask) -> Result<Task>;

    /// `PUT {base}/todos/{id}`
    async fn update(&self, id: &TaskId, patch: &TaskPatch) -> Result<Task>;

    /// `DELETE {base}/todos/{id}`; the response body is ignored.
    async fn delete(&self, id: &TaskId) -> Result<()>;

    /// `GET {base}/health`
    async fn health(&self) -> Result<Health>;
}

/// Health report of the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
    #[serde(default)]
    pub redis: bool,
}

/// How long the startup health probe may take. The task operations
/// themselves are never timed out.
pub const HEALTH_TIMEOUT: Duration = Duration::from_secs(3);

/// Ask the store for its health, giving up after `limit`.
pub async fn check_health<A: TodoApi + ?Sized>(api: &A, limit: Duration) -> Result<Health> {
    tokio::time::timeout(limit, api.health())
        .await
        .map_err(|_| Error::timeout(limit))?
}

#[derive(Debug, Clone)]
pub struct HttpTodoApi {
    base_url: Url,
    http_client: reqwest::Client,
}

impl HttpTodoApi {
    pub fn new(base_url: Url) -> Result<Self> {
        if base_url.cannot_be_a_base() {
            return Err(Error::config(format!("{base_url} cannot be used as a base address")));
        }
        let http_client = reqwest::Client::builder().build()?;
        Ok(Self {
            base_url,
            http_client,
        })
    }

    /// Base address with `segments` appended, keeping any path the base already has.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::config(format!("{} cannot be used as a base address", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder> {
        let url = self.endpoint(segments)?;
        debug!(%method, %url, "Sending request");
        Ok(self.http_client.request(method, url))
    }
}

/// Turn non-2xx responses into `Error::Status`, preferring the store's
/// `{"error": "..."}` message over the raw body.
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    debug!(status = status.as_u16(), url = %response.url(), "Received response");
    if status.is_success() {
        return Ok(response);
    }

    #[derive(Deserialize)]
    struct ErrorBody {
        error: String,
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .map(|b| b.error)
        .unwrap_or(body);
    Err(Error::status(status.as_u16(), message))
}

#[async_trait]
impl TodoApi for HttpTodoApi {
    async fn list(&self) -> Result<Vec<Task>> {
        let response = self.request(Method::GET, &["todos"])?.send().await?;
        Ok(check_status(response).await?.json().await?)
    }

    async fn create(&self, task: &NewTask) -> Result<Task> {
        let response = self.request(Method::POST, &["todos"])?.json(task).send().await?;
        Ok(check_status(response).await?.json().await?)
    }

    async fn update(&self, id: &TaskId, patch: &TaskPatch) -> Result<Task> {
        let id = id.to_string();
        let response = self
            .request(Method::PUT, &["todos", id.as_str()])?
            .json(patch)
            .send()
            .await?;
        Ok(check_status(response).await?.json().await?)
    }

    async fn delete(&self, id: &TaskId) -> Result<()> {
        let id = id.to_string();
        let response = self.request(Method::DELETE, &["todos", id.as_str()])?.send().await?;
        check_status(response).await?;
        Ok(())
    }

    async fn health(&self) -> Result<Health> {
        let response = self.request(Method::GET, &["health"])?.send().await?;
        Ok(check_status(response).await?.json().await?)
    }
}
