use std::time::Duration;

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use super::error::{UpstreamError, UpstreamResult};
use crate::api::{API_KEY_HEADER, CreateTaskRequest, ErrorResponse};
use crate::db::Task;

/// HTTP client for the kanban API server.
#[derive(Clone)]
pub struct UpstreamClient {
    base_url: String,
    client: Client,
}

impl UpstreamClient {
    /// Create a client for `base_url`. Every request is bounded by `timeout`
    /// and attempted once.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> UpstreamResult<Self> {
        // reqwest is built without a default TLS provider
        let _ = rustls::crypto::ring::default_provider().install_default();

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| UpstreamError::Client {
                message: e.to_string(),
            })?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Get the base URL being used
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `POST /tasks` on behalf of the entity owning `api_key`.
    #[instrument(skip(self, api_key, request), fields(project_id = request.project_id))]
    pub async fn create_task(
        &self,
        api_key: &str,
        request: &CreateTaskRequest,
    ) -> UpstreamResult<Task> {
        let response = self
            .client
            .post(format!("{}/tasks", self.base_url))
            .header(API_KEY_HEADER, api_key)
            .json(request)
            .send()
            .await?;

        let task: Task = Self::handle_response(response).await?;
        debug!(task_id = task.id, "created task upstream");
        Ok(task)
    }

    /// Deserialize a success body, or classify the failure by status.
    async fn handle_response<T: DeserializeOwned>(response: Response) -> UpstreamResult<T> {
        let status = response.status();
        if status.is_success() {
            return response
                .json()
                .await
                .map_err(|e| UpstreamError::InvalidResponse {
                    message: e.to_string(),
                });
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        let (kind, message) = match serde_json::from_str::<ErrorResponse>(&body) {
            Ok(parsed) => (Some(parsed.kind), parsed.error),
            Err(_) => (None, body),
        };

        if status.is_server_error() {
            Err(UpstreamError::Unavailable {
                message: format!("{}: {}", status, message),
            })
        } else {
            Err(UpstreamError::Rejected {
                status: status.as_u16(),
                kind,
                message,
            })
        }
    }
}
