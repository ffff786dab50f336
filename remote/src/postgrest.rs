//! PostgREST client for the hosted `todos` table.
//!
//! Talks to `{url}/rest/v1/todos` with the project's anonymous key. There is
//! no realtime socket here: the change feed echoes this client's own
//! successful writes, one event per row the store reports as affected.

use crate::config::{ConfigError, RemoteConfig};
use crate::error::RemoteError;
use crate::feed::{ChangeBroadcaster, ChangeEvent, ChangeFeed, ChangeKind, ChangeSubscription};
use crate::row::{NewTodoRow, OrderBy, TodoPatch, TodoRow};
use crate::table::{RemoteFuture, TodoTable};
use crate::TODOS_TABLE;
use reqwest::{Client, RequestBuilder, Response, StatusCode};

const RETURN_REPRESENTATION: &str = "return=representation";

/// HTTP client for a PostgREST endpoint
#[derive(Clone)]
pub struct PostgrestClient {
    client: Client,
    config: RemoteConfig,
    changes: ChangeBroadcaster,
}

impl PostgrestClient {
    /// Create a client from explicit settings
    #[must_use]
    pub fn new(config: RemoteConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    /// Create a client reusing an existing `reqwest::Client`
    #[must_use]
    pub fn with_client(client: Client, config: RemoteConfig) -> Self {
        Self {
            client,
            config,
            changes: ChangeBroadcaster::default(),
        }
    }

    /// Create a client from `SUPABASE_URL` and `SUPABASE_ANON_KEY`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if either variable is missing or invalid
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self::new(RemoteConfig::from_env()?))
    }

    /// Settings this client was built with
    #[must_use]
    pub const fn config(&self) -> &RemoteConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        self.config.table_url(TODOS_TABLE)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.config.anon_key)
            .header("Authorization", format!("Bearer {}", self.config.anon_key))
    }

    fn id_filter(id: &str) -> [(&'static str, String); 1] {
        [("id", format!("eq.{id}"))]
    }

    async fn check(response: Response) -> Result<Response, RemoteError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response.text().await.unwrap_or_default();
        match status {
            StatusCode::BAD_REQUEST | StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
                Err(RemoteError::Rejected(message))
            },
            StatusCode::SERVICE_UNAVAILABLE | StatusCode::BAD_GATEWAY | StatusCode::GATEWAY_TIMEOUT => {
                Err(RemoteError::Unavailable(message))
            },
            status => Err(RemoteError::Api {
                status: status.as_u16(),
                message,
            }),
        }
    }

    /// Decodes a row list; an empty or `null` body means no data
    async fn rows(response: Response) -> Result<Option<Vec<TodoRow>>, RemoteError> {
        let body = response.text().await?;
        let body = body.trim();
        if body.is_empty() {
            return Ok(None);
        }
        serde_json::from_str::<Option<Vec<TodoRow>>>(body).map_err(|e| RemoteError::Decode(e.to_string()))
    }

    fn echo(&self, kind: ChangeKind, rows: &[TodoRow]) {
        for row in rows {
            self.changes.publish(ChangeEvent::row(kind, row.id.clone()));
        }
    }

    async fn select(&self, order: OrderBy) -> Result<Option<Vec<TodoRow>>, RemoteError> {
        let request = self
            .client
            .get(self.endpoint())
            .query(&[("select", "*".to_string()), ("order", order.to_string())]);
        let response = Self::check(self.authorized(request).send().await?).await?;
        Self::rows(response).await
    }

    async fn insert_rows(&self, rows: Vec<NewTodoRow>) -> Result<Vec<TodoRow>, RemoteError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let request = self
            .client
            .post(self.endpoint())
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&rows);
        let response = Self::check(self.authorized(request).send().await?).await?;
        let stored = Self::rows(response).await?.unwrap_or_default();
        self.echo(ChangeKind::Insert, &stored);
        Ok(stored)
    }

    async fn update_row(&self, id: &str, patch: TodoPatch) -> Result<(), RemoteError> {
        let request = self
            .client
            .patch(self.endpoint())
            .query(&Self::id_filter(id))
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&patch);
        let response = Self::check(self.authorized(request).send().await?).await?;
        let affected = Self::rows(response).await?.unwrap_or_default();
        self.echo(ChangeKind::Update, &affected);
        Ok(())
    }

    async fn delete_row(&self, id: &str) -> Result<(), RemoteError> {
        let request = self
            .client
            .delete(self.endpoint())
            .query(&Self::id_filter(id))
            .header("Prefer", RETURN_REPRESENTATION);
        let response = Self::check(self.authorized(request).send().await?).await?;
        let affected = Self::rows(response).await?.unwrap_or_default();
        self.echo(ChangeKind::Delete, &affected);
        Ok(())
    }
}

impl std::fmt::Debug for PostgrestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgrestClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl TodoTable for PostgrestClient {
    fn select_all(&self, order: OrderBy) -> RemoteFuture<'_, Option<Vec<TodoRow>>> {
        Box::pin(self.select(order))
    }

    fn insert(&self, rows: Vec<NewTodoRow>) -> RemoteFuture<'_, Vec<TodoRow>> {
        Box::pin(self.insert_rows(rows))
    }

    fn update(&self, id: &str, patch: TodoPatch) -> RemoteFuture<'_, ()> {
        let id = id.to_string();
        Box::pin(async move { self.update_row(&id, patch).await })
    }

    fn delete(&self, id: &str) -> RemoteFuture<'_, ()> {
        let id = id.to_string();
        Box::pin(async move { self.delete_row(&id).await })
    }
}

impl ChangeFeed for PostgrestClient {
    fn subscribe(&self) -> ChangeSubscription {
        self.changes.subscribe()
    }
}
