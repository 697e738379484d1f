//! Best-effort push notifications. Delivery failures are logged and never
//! reach the operation that triggered them.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use serde::Serialize;
use serde_json::{Value, json};

use crate::database::store::PushTokenStore;
use crate::error::AppError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const TOKEN_CACHE_CAPACITY: u64 = 10_000;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PushNotification {
    pub recipient_id: String,
    pub title: String,
    pub body: String,
    /// Always carries a `type` key.
    pub data: Value,
}

impl PushNotification {
    pub fn new(
        recipient_id: impl Into<String>,
        title: impl Into<String>,
        body: impl Into<String>,
        data: Value,
    ) -> Self {
        Self {
            recipient_id: recipient_id.into(),
            title: title.into(),
            body: body.into(),
            data,
        }
    }

    pub fn kind(&self) -> Option<&str> {
        self.data.get("type").and_then(Value::as_str)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("Push request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Push endpoint returned HTTP {0}")]
    HttpStatus(u16),

    #[error("Push token lookup failed: {0}")]
    Lookup(String),
}

#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn dispatch(&self, notification: &PushNotification) -> Result<(), NotificationError>;
}

/// Writes notifications to the log instead of delivering them.
#[derive(Debug, Default, Clone)]
pub struct LogDispatcher;

#[async_trait]
impl NotificationDispatcher for LogDispatcher {
    async fn dispatch(&self, notification: &PushNotification) -> Result<(), NotificationError> {
        log::info!(
            "Notification for {}: {} ({})",
            notification.recipient_id,
            notification.title,
            notification.kind().unwrap_or("untyped")
        );
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct ExpoMessage<'a> {
    to: &'a str,
    title: &'a str,
    body: &'a str,
    data: &'a Value,
    sound: &'static str,
}

/// Posts to an Expo-compatible push endpoint. Tokens come from the
/// push-token store through a TTL cache.
pub struct ExpoPushDispatcher {
    client: reqwest::Client,
    endpoint: String,
    tokens: Arc<dyn PushTokenStore>,
    token_cache: Cache<String, Arc<Vec<String>>>,
}

impl ExpoPushDispatcher {
    pub fn new(
        endpoint: impl Into<String>,
        tokens: Arc<dyn PushTokenStore>,
        cache_ttl: Duration,
    ) -> Result<Self, NotificationError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        let token_cache = Cache::builder()
            .max_capacity(TOKEN_CACHE_CAPACITY)
            .time_to_live(cache_ttl)
            .build();

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            tokens,
            token_cache,
        })
    }

    async fn tokens_for(&self, user_id: &str) -> Result<Arc<Vec<String>>, NotificationError> {
        if let Some(cached) = self.token_cache.get(user_id).await {
            return Ok(cached);
        }

        let tokens = self
            .tokens
            .tokens_for_user(user_id)
            .await
            .map_err(|e: AppError| NotificationError::Lookup(e.to_string()))?;
        let tokens = Arc::new(tokens);
        self.token_cache
            .insert(user_id.to_string(), tokens.clone())
            .await;
        Ok(tokens)
    }
}

#[async_trait]
impl NotificationDispatcher for ExpoPushDispatcher {
    async fn dispatch(&self, notification: &PushNotification) -> Result<(), NotificationError> {
        let tokens = self.tokens_for(&notification.recipient_id).await?;
        if tokens.is_empty() {
            log::debug!(
                "No push tokens registered for {}; skipping",
                notification.recipient_id
            );
            return Ok(());
        }

        let messages: Vec<ExpoMessage<'_>> = tokens
            .iter()
            .map(|token| ExpoMessage {
                to: token,
                title: &notification.title,
                body: &notification.body,
                data: &notification.data,
                sound: "default",
            })
            .collect();

        let response = self.client.post(&self.endpoint).json(&messages).send().await?;
        if !response.status().is_success() {
            return Err(NotificationError::HttpStatus(response.status().as_u16()));
        }

        log::debug!(
            "Delivered {} push message(s) to {}",
            messages.len(),
            notification.recipient_id
        );
        Ok(())
    }
}

/// Front door used by the services. Never fails.
#[derive(Clone)]
pub struct Notifier {
    dispatcher: Arc<dyn NotificationDispatcher>,
}

impl Notifier {
    pub fn new(dispatcher: Arc<dyn NotificationDispatcher>) -> Self {
        Self { dispatcher }
    }

    pub fn log_only() -> Self {
        Self::new(Arc::new(LogDispatcher))
    }

    pub async fn notify(&self, notification: PushNotification) {
        if let Err(e) = self.dispatcher.dispatch(&notification).await {
            log::warn!(
                "Failed to notify {} ({}): {}",
                notification.recipient_id,
                notification.kind().unwrap_or("untyped"),
                e
            );
        }
    }
}

pub fn swap_payload(kind: &str, swap_request_id: &str, workspace_id: &str) -> Value {
    json!({
        "type": kind,
        "swapRequestId": swap_request_id,
        "workspaceId": workspace_id,
    })
}
