//! Bot API client
//!
//! Thin JSON client over `reqwest`. Every call posts to
//! `{api_url}/bot{token}/{method}` and unwraps the `{ok, result}` envelope.
//!
//! # Error Handling
//!
//! Failures are mapped to `PortError` variants:
//! - 401/403 -> `PortError::Unauthorized`
//! - 429 -> `PortError::RateLimited`
//! - 400 -> `PortError::Validation`
//! - 5xx -> `PortError::ServiceUnavailable`
//! - Timeouts -> `PortError::Timeout`
//! - Undecodable bodies -> `PortError::Transformation`
//!
//! Nothing is retried here. The token is part of every URL, so request
//! errors are stripped of their URL before they are reported.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{debug, instrument};

use core_kernel::{
    AdapterHealth, ChoiceButtons, DomainPort, HealthCheckResult, HealthCheckable, MessageId,
    MessageRef, Notifier, PortError, Transport, UserId,
};

use super::types::{
    AnswerCallbackQuery, ApiResponse, EditMessageText, GetUpdates, InlineKeyboardMarkup, Message,
    SendMessage, Update, User,
};

/// Extra time allowed on top of the long-poll timeout before a request is abandoned
const REQUEST_GRACE: Duration = Duration::from_secs(10);

const ALLOWED_UPDATES: &[&str] = &["message", "callback_query"];

/// Client for one bot token
#[derive(Clone)]
pub struct TelegramClient {
    http: reqwest::Client,
    endpoint: String,
    request_timeout: Duration,
}

impl TelegramClient {
    /// Creates a client whose requests outlive a long poll of `poll_timeout`
    pub fn new(api_url: &str, token: &str, poll_timeout: Duration) -> Result<Self, PortError> {
        let request_timeout = poll_timeout + REQUEST_GRACE;
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| PortError::Internal {
                message: "failed to build HTTP client".to_string(),
                source: Some(Box::new(e.without_url())),
            })?;

        Ok(Self {
            http,
            endpoint: format!("{}/bot{}", api_url.trim_end_matches('/'), token),
            request_timeout,
        })
    }

    /// Long-polls for updates after `offset`
    pub async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout: Duration,
    ) -> Result<Vec<Update>, PortError> {
        let payload = GetUpdates {
            offset,
            timeout: timeout.as_secs(),
            allowed_updates: ALLOWED_UPDATES,
        };
        self.call("getUpdates", &payload).await
    }

    #[instrument(skip(self, text, reply_markup))]
    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        reply_markup: Option<InlineKeyboardMarkup>,
    ) -> Result<Message, PortError> {
        let payload = SendMessage {
            chat_id,
            text,
            reply_markup,
        };
        self.call("sendMessage", &payload).await
    }

    #[instrument(skip(self, text))]
    pub async fn edit_message_text(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
    ) -> Result<(), PortError> {
        let payload = EditMessageText {
            chat_id,
            message_id,
            text,
        };
        // The result is the edited message, or `true` for inline messages
        let _: serde_json::Value = self.call("editMessageText", &payload).await?;
        Ok(())
    }

    pub async fn answer_callback_query(&self, callback_query_id: &str) -> Result<(), PortError> {
        let payload = AnswerCallbackQuery { callback_query_id };
        let _: bool = self.call("answerCallbackQuery", &payload).await?;
        Ok(())
    }

    /// Identity of the bot, used as a liveness probe
    pub async fn get_me(&self) -> Result<User, PortError> {
        self.call("getMe", &serde_json::json!({})).await
    }

    async fn call<P, R>(&self, method: &'static str, payload: &P) -> Result<R, PortError>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self
            .http
            .post(format!("{}/{}", self.endpoint, method))
            .json(payload)
            .send()
            .await
            .map_err(|e| self.request_error(method, e))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| self.request_error(method, e))?;

        let envelope: ApiResponse<R> = match serde_json::from_slice(&body) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => return Err(status_error(method, status, None, None)),
            Err(e) => {
                return Err(PortError::transformation(format!(
                    "{method}: undecodable response: {e}"
                )))
            }
        };

        if !envelope.ok {
            let code = envelope
                .error_code
                .and_then(|c| StatusCode::from_u16(c).ok())
                .unwrap_or(status);
            let retry_after = envelope.parameters.and_then(|p| p.retry_after);
            return Err(status_error(method, code, envelope.description, retry_after));
        }

        debug!(method, "bot api call succeeded");
        envelope
            .result
            .ok_or_else(|| PortError::transformation(format!("{method}: response without result")))
    }

    fn request_error(&self, method: &'static str, e: reqwest::Error) -> PortError {
        if e.is_timeout() {
            return PortError::Timeout {
                operation: method.to_string(),
                duration_ms: self.request_timeout.as_millis() as u64,
            };
        }
        PortError::Connection {
            message: format!("{method}: request failed"),
            source: Some(Box::new(e.without_url())),
        }
    }
}

fn status_error(
    method: &'static str,
    status: StatusCode,
    description: Option<String>,
    retry_after: Option<u64>,
) -> PortError {
    let message = format!(
        "{method}: {}",
        description.unwrap_or_else(|| status.to_string())
    );
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => PortError::Unauthorized { message },
        StatusCode::TOO_MANY_REQUESTS => PortError::RateLimited {
            retry_after_secs: retry_after.unwrap_or(1),
        },
        StatusCode::BAD_REQUEST => PortError::validation(message),
        s if s.is_server_error() => PortError::ServiceUnavailable {
            service: message,
        },
        _ => PortError::internal(message),
    }
}

impl std::fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramClient")
            .field("request_timeout", &self.request_timeout)
            .finish_non_exhaustive()
    }
}

impl DomainPort for TelegramClient {}

#[async_trait]
impl Transport for TelegramClient {
    async fn send_text(
        &self,
        to: UserId,
        text: &str,
        buttons: Option<&ChoiceButtons>,
    ) -> Result<MessageRef, PortError> {
        let message = self
            .send_message(to.get(), text, buttons.map(InlineKeyboardMarkup::from))
            .await?;
        Ok(MessageRef::new(to, MessageId::new(message.message_id)))
    }

    async fn edit_text(&self, message: &MessageRef, text: &str) -> Result<(), PortError> {
        self.edit_message_text(message.chat.get(), message.message_id.get(), text)
            .await
    }
}

#[async_trait]
impl Notifier for TelegramClient {
    async fn notify(&self, operator: UserId, text: &str) -> Result<(), PortError> {
        self.send_message(operator.get(), text, None).await.map(|_| ())
    }
}

#[async_trait]
impl HealthCheckable for TelegramClient {
    async fn health_check(&self) -> HealthCheckResult {
        let started = Instant::now();
        let (status, message) = match self.get_me().await {
            Ok(_) => (AdapterHealth::Healthy, None),
            Err(e) if e.is_transient() => (AdapterHealth::Degraded, Some(e.to_string())),
            Err(e) => (AdapterHealth::Unhealthy, Some(e.to_string())),
        };

        HealthCheckResult {
            adapter_id: "telegram-bot-api".to_string(),
            status,
            latency_ms: started.elapsed().as_millis() as u64,
            message,
            checked_at: Utc::now(),
        }
    }
}
