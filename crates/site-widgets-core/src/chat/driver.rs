use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::debug;

use crate::endpoint::{ChatEndpoint, ChatRequest};
use crate::error::{EndpointError, SendError};

use super::widget::{ChatEffect, ChatEvent, ChatWidget};

/// Runs chat requests off the caller's event loop and feeds replies back as events.
///
/// The driver does not own the widget; hosts pass it in on every call so the widget stays
/// part of their own state.
pub struct ChatDriver {
    endpoint: Arc<dyn ChatEndpoint>,
    timeout: Option<Duration>,
    tx: mpsc::UnboundedSender<ChatEvent>,
    rx: mpsc::UnboundedReceiver<ChatEvent>,
}

impl ChatDriver {
    pub fn new(endpoint: Arc<dyn ChatEndpoint>, timeout: Option<Duration>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            endpoint,
            timeout,
            tx,
            rx,
        }
    }

    /// Apply a user event, spawning the request when the widget asks for one.
    pub fn dispatch(&self, widget: &mut ChatWidget, event: ChatEvent) -> Result<(), SendError> {
        if let Some(ChatEffect::Send(request)) = widget.handle(event)? {
            self.spawn_request(request);
        }
        Ok(())
    }

    pub fn submit(&self, widget: &mut ChatWidget, text: &str) -> Result<(), SendError> {
        self.dispatch(widget, ChatEvent::Submit(text.to_string()))
    }

    /// Wait for the next reply and apply it. Returns false if the channel closed.
    pub async fn next_reply(&mut self, widget: &mut ChatWidget) -> bool {
        match self.rx.recv().await {
            Some(event) => {
                // Replies never produce effects
                let _ = widget.handle(event);
                true
            }
            None => false,
        }
    }

    /// Apply every reply that has already arrived without waiting.
    pub fn drain(&mut self, widget: &mut ChatWidget) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.rx.try_recv() {
            let _ = widget.handle(event);
            applied += 1;
        }
        applied
    }

    fn spawn_request(&self, request: ChatRequest) {
        let endpoint = Arc::clone(&self.endpoint);
        let timeout = self.timeout;
        let tx = self.tx.clone();

        debug!(session = ?request.session_id, "spawning chat request");
        tokio::spawn(async move {
            let result = match timeout {
                Some(limit) => tokio::time::timeout(limit, endpoint.send(&request))
                    .await
                    .unwrap_or(Err(EndpointError::TimedOut(limit))),
                None => endpoint.send(&request).await,
            };
            let _ = tx.send(ChatEvent::ReplyReceived(result));
        });
    }
}
