//! REST backend implementation.
//!
//! Speaks JSON to a taskdeck-compatible REST service:
//!
//! | Operation | Request |
//! |---|---|
//! | list | `GET /todos?status&priority&search&tag&due_before&due_after&page&size` |
//! | get | `GET /todos/{id}` |
//! | create | `POST /todos` |
//! | create_many | `POST /todos/bulk` |
//! | update | `PUT /todos/{id}` |
//! | update_status | `PATCH /todos/{id}/status` |
//! | delete | `DELETE /todos/{id}` |
//! | bulk_update | `PUT /todos/bulk` |
//! | search | `POST /todos/search?page&size` |
//! | stats | `GET /todos/stats?start_date&end_date` |

use crate::config::ClientConfig;
use crate::error::{SyncError, SyncResult};
use crate::transport::TodoBackend;
use async_trait::async_trait;
use reqwest::{header, Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use taskdeck_protocol::{
    BulkCreateRequest, BulkUpdateRequest, FilterParams, SearchRequest, StatsRange, StatusUpdate,
    Todo, TodoCreate, TodoId, TodoListResponse, TodoStats, TodoStatus, TodoUpdate,
};

/// HTTP-based todo backend.
pub struct HttpBackend {
    /// Parsed service root.
    base_url: Url,
    /// Bearer token, if any.
    auth_token: Option<String>,
    /// Shared connection pool.
    client: Client,
}

impl HttpBackend {
    /// Creates a backend from the client configuration.
    pub fn new(config: &ClientConfig) -> SyncResult<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| SyncError::InvalidConfig(format!("base url '{}': {e}", config.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(SyncError::InvalidConfig(format!(
                "base url '{}' cannot carry a path",
                config.base_url
            )));
        }

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .build()
            .map_err(|e| SyncError::InvalidConfig(format!("http client: {e}")))?;

        Ok(Self {
            base_url,
            auth_token: config.auth_token.clone(),
            client,
        })
    }

    /// Returns the service root.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Builds `base/segments...`, percent-encoding each segment.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let url = self.url(segments);
        tracing::debug!(%method, %url, "request");
        let builder = self.client.request(method, url);
        match &self.auth_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> SyncResult<Response> {
        let response = builder.send().await.map_err(transport_error)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body)
            .or_else(|| status.canonical_reason().map(str::to_string))
            .unwrap_or_else(|| "unknown error".to_string());
        tracing::warn!(status = status.as_u16(), %message, "backend rejected request");
        Err(SyncError::backend(status.as_u16(), message))
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> SyncResult<T> {
        let response = self.send(builder).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| SyncError::Decode(e.to_string()))
    }
}

#[async_trait]
impl TodoBackend for HttpBackend {
    async fn list(&self, filters: &FilterParams) -> SyncResult<TodoListResponse> {
        self.send_json(self.request(Method::GET, &["todos"]).query(filters))
            .await
    }

    async fn get(&self, id: &TodoId) -> SyncResult<Todo> {
        self.send_json(self.request(Method::GET, &["todos", id.as_str()]))
            .await
    }

    async fn create(&self, draft: &TodoCreate) -> SyncResult<Todo> {
        self.send_json(self.request(Method::POST, &["todos"]).json(draft))
            .await
    }

    async fn create_many(&self, drafts: &[TodoCreate]) -> SyncResult<Vec<Todo>> {
        let body = BulkCreateRequest {
            todos: drafts.to_vec(),
        };
        self.send_json(self.request(Method::POST, &["todos", "bulk"]).json(&body))
            .await
    }

    async fn update(&self, id: &TodoId, patch: &TodoUpdate) -> SyncResult<Todo> {
        self.send_json(self.request(Method::PUT, &["todos", id.as_str()]).json(patch))
            .await
    }

    async fn update_status(&self, id: &TodoId, status: TodoStatus) -> SyncResult<Todo> {
        let body = StatusUpdate { status };
        self.send_json(
            self.request(Method::PATCH, &["todos", id.as_str(), "status"])
                .json(&body),
        )
        .await
    }

    async fn delete(&self, id: &TodoId) -> SyncResult<()> {
        self.send(self.request(Method::DELETE, &["todos", id.as_str()]))
            .await?;
        Ok(())
    }

    async fn bulk_update(&self, request: &BulkUpdateRequest) -> SyncResult<Vec<Todo>> {
        self.send_json(self.request(Method::PUT, &["todos", "bulk"]).json(request))
            .await
    }

    async fn search(&self, request: &SearchRequest) -> SyncResult<TodoListResponse> {
        let page = PageQuery {
            page: request.filters.page(),
            size: request.filters.size(),
        };
        self.send_json(
            self.request(Method::POST, &["todos", "search"])
                .query(&page)
                .json(request),
        )
        .await
    }

    async fn stats(&self, range: &StatsRange) -> SyncResult<TodoStats> {
        self.send_json(self.request(Method::GET, &["todos", "stats"]).query(range))
            .await
    }
}

#[derive(Serialize)]
struct PageQuery {
    page: u32,
    size: u32,
}

/// Error bodies seen in the wild: `{"detail": "..."}`, `{"message": "..."}`,
/// `{"error": "..."}`, or plain text.
#[derive(Deserialize)]
struct ErrorBody {
    detail: Option<serde_json::Value>,
    message: Option<String>,
    error: Option<String>,
}

fn error_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed
            .message
            .or(parsed.error)
            .or_else(|| match parsed.detail {
                Some(serde_json::Value::String(detail)) => Some(detail),
                Some(other) => Some(other.to_string()),
                None => None,
            }),
        Err(_) => Some(body.to_string()),
    }
}

fn transport_error(err: reqwest::Error) -> SyncError {
    if err.is_timeout() {
        SyncError::Timeout
    } else {
        SyncError::Transport(err.to_string())
    }
}
