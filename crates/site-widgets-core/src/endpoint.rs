use futures_util::future::BoxFuture;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::EndpointError;
use crate::state::{ChatMessage, ChatRole};

/// Conversation context handed to the chat endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: String,
    pub session_id: Option<String>,
    pub history: Vec<ContextMessage>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContextMessage {
    pub role: ChatRole,
    pub content: String,
}

impl From<&ChatMessage> for ContextMessage {
    fn from(message: &ChatMessage) -> Self {
        Self {
            role: message.role,
            content: message.content.clone(),
        }
    }
}

/// One assistant reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub response: String,
    pub session_id: Option<String>,
}

impl ChatReply {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            session_id: None,
        }
    }
}

pub type ReplyFuture<'a> = BoxFuture<'a, Result<ChatReply, EndpointError>>;

/// The "send(context) -> reply or failure" capability the widget depends on
pub trait ChatEndpoint: Send + Sync {
    fn send<'a>(&'a self, request: &'a ChatRequest) -> ReplyFuture<'a>;
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReplyBody {
    response: Option<serde_json::Value>,
    session_id: Option<String>,
}

#[derive(Deserialize, Default)]
struct ErrorBody {
    error: Option<String>,
}

/// JSON-over-HTTP chat endpoint
#[derive(Clone)]
pub struct HttpChatEndpoint {
    client: Client,
    url: String,
}

impl HttpChatEndpoint {
    pub fn new(url: &str) -> Self {
        Self {
            client: Client::new(),
            url: url.to_string(),
        }
    }

    pub fn with_client(client: Client, url: &str) -> Self {
        Self {
            client,
            url: url.to_string(),
        }
    }

    pub async fn query(&self, request: &ChatRequest) -> Result<ChatReply, EndpointError> {
        debug!(url = %self.url, history = request.history.len(), "sending chat request");

        let response = self.client.post(&self.url).json(request).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body: ErrorBody = response.json().await.unwrap_or_default();
            return Err(EndpointError::Status {
                status: status.as_u16(),
                message: body
                    .error
                    .unwrap_or_else(|| "Failed to get response from chatbot".to_string()),
            });
        }

        let body: ReplyBody = response
            .json()
            .await
            .map_err(|e| EndpointError::InvalidResponse(e.to_string()))?;

        match body.response {
            Some(serde_json::Value::String(text)) => Ok(ChatReply {
                response: text,
                session_id: body.session_id,
            }),
            _ => Err(EndpointError::InvalidResponse(
                "missing string `response` field".to_string(),
            )),
        }
    }
}

impl ChatEndpoint for HttpChatEndpoint {
    fn send<'a>(&'a self, request: &'a ChatRequest) -> ReplyFuture<'a> {
        Box::pin(self.query(request))
    }
}
