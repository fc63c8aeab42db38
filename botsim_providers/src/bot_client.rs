use anyhow::Context;
use async_trait::async_trait;
use botsim_core::{BotReply, BotSession, RemoteError};
use reqwest::{Client, Response, StatusCode};
use serde_json::{Value, json};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// HTTP client for the remote bot service.
///
/// Talks to `{base_url}/initConversation` and `{base_url}/webhook`. Every
/// request is bounded by the configured timeout.
pub struct HttpBotClient {
    client: Client,
    base_url: String,
}

impl HttpBotClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        info!("Creating HttpBotClient for {base_url}");

        Ok(Self { client, base_url })
    }

    async fn post(&self, endpoint: &str, payload: &Value) -> Result<Value, RemoteError> {
        let started = Instant::now();
        let response = self
            .client
            .post(format!("{}/{endpoint}", self.base_url))
            .json(payload)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        info!(
            "Response from {endpoint} received in {:.2} seconds, status code {}",
            started.elapsed().as_secs_f64(),
            status.as_u16()
        );

        read_json(response, status).await
    }
}

fn transport_error(err: reqwest::Error) -> RemoteError {
    if err.is_timeout() {
        RemoteError::Timeout
    } else if err.is_decode() {
        RemoteError::MalformedBody(err.to_string())
    } else {
        RemoteError::Transport(err.to_string())
    }
}

async fn read_json(response: Response, status: StatusCode) -> Result<Value, RemoteError> {
    if status != StatusCode::OK {
        let body = response.text().await.unwrap_or_default();
        return Err(RemoteError::HttpStatus {
            status: status.as_u16(),
            body,
        });
    }

    response
        .json::<Value>()
        .await
        .map_err(|e| RemoteError::MalformedBody(e.to_string()))
}

/// Render a JSON value the way it is shown to the synthesizer: strings
/// without quotes, everything else as compact JSON.
fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn parse_reply(data: &Value) -> BotReply {
    match data.get("text") {
        Some(Value::Array(items)) if !items.is_empty() => BotReply::Message(render(&items[0])),
        Some(other) => BotReply::Unstructured(render(other)),
        None => BotReply::Unstructured("[]".to_string()),
    }
}

#[async_trait]
impl BotSession for HttpBotClient {
    async fn initialize(&self, conversation_id: &str, bot_id: i64) -> Result<(), RemoteError> {
        info!("Initializing conversation {conversation_id} with bot {bot_id}");

        let payload = json!({
            "bot_id": bot_id,
            "conversation_id": conversation_id,
            "input_slots": {},
        });

        let data = self
            .post("initConversation", &payload)
            .await
            .inspect_err(|e| warn!("Error initializing conversation: {e}"))?;

        let status_ok = data.get("status").and_then(Value::as_i64) == Some(0);
        let msg_ok = data.get("msg").and_then(Value::as_str) == Some("Success");
        if !(status_ok && msg_ok) {
            warn!("Bot rejected initialization: {data}");
            return Err(RemoteError::Rejected(data.to_string()));
        }

        info!("Conversation {conversation_id} initialized successfully");
        Ok(())
    }

    async fn exchange(
        &self,
        conversation_id: &str,
        message: &str,
    ) -> Result<BotReply, RemoteError> {
        info!("Sending message: {message}");

        let payload = json!({
            "conversation_id": conversation_id,
            "message": message,
        });

        let data = self
            .post("webhook", &payload)
            .await
            .inspect_err(|e| warn!("Error sending message: {e}"))?;

        let status = data.get("status").unwrap_or(&Value::Null);
        debug!("Bot status: {status}");

        let reply = parse_reply(&data);
        if reply.text().is_empty() {
            warn!("Bot returned an empty reply");
            return Err(RemoteError::EmptyReply);
        }

        let preview: String = reply.text().chars().take(100).collect();
        info!("Bot response: {preview}...");
        Ok(reply)
    }
}
