use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::Config;
use crate::endpoint::{ChatEndpoint, ChatReply, ChatRequest, ContextMessage};
use crate::error::{EndpointError, ErrorKind, SendError};
use crate::state::ChatMessage;
use crate::storage::{HistoryStore, TabStorage};

pub const ERROR_REPLY_TEXT: &str = "Sorry, I encountered an error. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChatState {
    #[default]
    Collapsed,
    Expanded,
}

/// Click targets inside the chat card
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatTarget {
    Card,
    MinimizeButton,
    MessagesArea,
    Input,
}

#[derive(Debug)]
pub enum ChatEvent {
    Click(ChatTarget),
    InputFocused,
    Submit(String),
    ReplyReceived(Result<ChatReply, EndpointError>),
}

/// Work the host must perform on the widget's behalf
#[derive(Debug, Clone, PartialEq)]
pub enum ChatEffect {
    Send(ChatRequest),
}

/// Inline error shown at the end of the message area
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatNotice {
    pub kind: ErrorKind,
    pub text: String,
}

pub struct ChatWidget {
    state: ChatState,
    messages: Vec<ChatMessage>,
    pending: bool,
    notice: Option<ChatNotice>,
    session_id: Option<String>,
    history: HistoryStore,
    history_window: usize,
}

impl ChatWidget {
    /// Build a widget for a fresh page load, restoring whatever the tab already holds.
    pub fn new(storage: Arc<dyn TabStorage>, config: &Config) -> Self {
        Self::with_history(HistoryStore::new(storage), config)
    }

    /// Widget whose history lives only as long as the instance.
    pub fn in_memory(config: &Config) -> Self {
        Self::with_history(HistoryStore::detached(), config)
    }

    fn with_history(mut history: HistoryStore, config: &Config) -> Self {
        let (messages, session_id) = history.load();
        if !messages.is_empty() {
            debug!(count = messages.len(), "restored chat history from tab storage");
        }

        Self {
            state: ChatState::Collapsed,
            messages,
            pending: false,
            notice: None,
            session_id,
            history,
            history_window: config.history_window,
        }
    }

    pub fn state(&self) -> ChatState {
        self.state
    }

    pub fn is_expanded(&self) -> bool {
        self.state == ChatState::Expanded
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn notice(&self) -> Option<&ChatNotice> {
        self.notice.as_ref()
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// False once tab storage has failed and history is memory-only
    pub fn is_persistent(&self) -> bool {
        self.history.is_attached()
    }

    pub fn handle(&mut self, event: ChatEvent) -> Result<Option<ChatEffect>, SendError> {
        match event {
            ChatEvent::Click(target) => {
                self.click(target);
                Ok(None)
            }
            ChatEvent::InputFocused => {
                self.expand();
                Ok(None)
            }
            ChatEvent::Submit(text) => {
                let request = self.begin_send(&text)?;
                Ok(Some(ChatEffect::Send(request)))
            }
            ChatEvent::ReplyReceived(result) => {
                self.complete_send(result);
                Ok(None)
            }
        }
    }

    /// Returns true when the click changed the expand/collapse state.
    pub fn click(&mut self, target: ChatTarget) -> bool {
        match self.state {
            // Collapsed: only the card is rendered, so every target is the card
            ChatState::Collapsed => self.expand(),
            ChatState::Expanded => match target {
                ChatTarget::MinimizeButton => self.minimize(),
                ChatTarget::Card | ChatTarget::MessagesArea | ChatTarget::Input => false,
            },
        }
    }

    pub fn expand(&mut self) -> bool {
        if self.state == ChatState::Expanded {
            return false;
        }
        debug!("chat expanded");
        self.state = ChatState::Expanded;
        true
    }

    pub fn minimize(&mut self) -> bool {
        if self.state == ChatState::Collapsed {
            return false;
        }
        debug!("chat collapsed");
        self.state = ChatState::Collapsed;
        true
    }

    /// Record the user's message and produce the request to issue.
    pub fn begin_send(&mut self, text: &str) -> Result<ChatRequest, SendError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SendError::Empty);
        }
        if self.state == ChatState::Collapsed {
            return Err(SendError::Collapsed);
        }
        if self.pending {
            return Err(SendError::InFlight);
        }

        self.push(ChatMessage::user(text));
        self.pending = true;
        self.notice = None;

        let start = self.messages.len().saturating_sub(self.history_window);
        Ok(ChatRequest {
            message: text.to_string(),
            session_id: self.session_id.clone(),
            history: self.messages[start..].iter().map(ContextMessage::from).collect(),
        })
    }

    /// Apply the endpoint's answer to the outstanding request.
    pub fn complete_send(&mut self, result: Result<ChatReply, EndpointError>) {
        if !self.pending {
            debug!("ignoring chat reply with no request outstanding");
            return;
        }
        self.pending = false;

        match result {
            Ok(reply) => {
                if let Some(id) = reply.session_id {
                    if self.session_id.as_deref() != Some(id.as_str()) {
                        self.history.save_session_id(&id);
                        self.session_id = Some(id);
                    }
                }
                self.push(ChatMessage::assistant(reply.response));
            }
            Err(e) => {
                warn!(kind = ?e.kind(), "chat send failed: {}", e);
                self.notice = Some(ChatNotice {
                    kind: e.kind(),
                    text: ERROR_REPLY_TEXT.to_string(),
                });
            }
        }
    }

    /// Single best-effort round trip, awaiting the endpoint inline.
    pub async fn send(&mut self, endpoint: &dyn ChatEndpoint, text: &str) -> Result<(), SendError> {
        let request = self.begin_send(text)?;
        let result = endpoint.send(&request).await;
        self.complete_send(result);
        Ok(())
    }

    fn push(&mut self, message: ChatMessage) {
        debug!(role = message.role.as_str(), "appending chat message");
        self.messages.push(message);
        self.history.save_messages(&self.messages);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ChatRole;
    use crate::storage::{MemoryStorage, UnavailableStorage, CHAT_HISTORY_KEY};

    fn widget() -> (ChatWidget, MemoryStorage) {
        let storage = MemoryStorage::new();
        let widget = ChatWidget::new(Arc::new(storage.clone()), &Config::default());
        (widget, storage)
    }

    #[test]
    fn test_starts_collapsed_and_empty() {
        let (widget, _) = widget();
        assert_eq!(widget.state(), ChatState::Collapsed);
        assert!(widget.messages().is_empty());
        assert!(!widget.is_pending());
    }

    #[test]
    fn test_any_click_expands_collapsed_card() {
        for target in [
            ChatTarget::Card,
            ChatTarget::MessagesArea,
            ChatTarget::Input,
            ChatTarget::MinimizeButton,
        ] {
            let (mut widget, _) = widget();
            assert!(widget.click(target));
            assert!(widget.is_expanded());
        }
    }

    #[test]
    fn test_only_minimize_collapses() {
        let (mut widget, _) = widget();
        widget.click(ChatTarget::Card);

        for target in [ChatTarget::Card, ChatTarget::MessagesArea, ChatTarget::Input] {
            assert!(!widget.click(target));
            assert!(widget.is_expanded());
        }

        assert!(widget.click(ChatTarget::MinimizeButton));
        assert_eq!(widget.state(), ChatState::Collapsed);
    }

    #[test]
    fn test_input_focus_expands() {
        let (mut widget, _) = widget();
        widget.handle(ChatEvent::InputFocused).unwrap();
        assert!(widget.is_expanded());
    }

    #[test]
    fn test_submit_rejections() {
        let (mut widget, _) = widget();
        assert_eq!(widget.begin_send("hello").unwrap_err(), SendError::Collapsed);

        widget.expand();
        assert_eq!(widget.begin_send("   ").unwrap_err(), SendError::Empty);

        widget.begin_send("hello").unwrap();
        assert_eq!(widget.begin_send("again").unwrap_err(), SendError::InFlight);
        assert_eq!(widget.messages().len(), 1);
    }

    #[test]
    fn test_user_message_written_through_before_reply() {
        let (mut widget, storage) = widget();
        widget.expand();
        let request = widget.begin_send("  what do you do?  ").unwrap();

        assert_eq!(request.message, "what do you do?");
        assert_eq!(request.history.len(), 1);
        let raw = storage.get_item(CHAT_HISTORY_KEY).unwrap().unwrap();
        assert!(raw.contains("what do you do?"));
    }

    #[test]
    fn test_reply_appends_assistant_and_session() {
        let (mut widget, storage) = widget();
        widget.expand();
        widget.begin_send("hi").unwrap();
        widget.complete_send(Ok(ChatReply {
            response: "hello there".to_string(),
            session_id: Some("abc".to_string()),
        }));

        assert!(!widget.is_pending());
        assert_eq!(widget.messages()[1].role, ChatRole::Assistant);
        assert_eq!(widget.session_id(), Some("abc"));

        let next = widget.begin_send("more").unwrap();
        assert_eq!(next.session_id.as_deref(), Some("abc"));

        let restored = ChatWidget::new(Arc::new(storage), &Config::default());
        assert_eq!(restored.messages().len(), 3);
        assert_eq!(restored.session_id(), Some("abc"));
    }

    #[test]
    fn test_failure_keeps_user_entry_and_surfaces_notice() {
        let (mut widget, _) = widget();
        widget.expand();
        widget.begin_send("hi").unwrap();
        widget.complete_send(Err(EndpointError::Status {
            status: 500,
            message: "down".to_string(),
        }));

        assert_eq!(widget.messages().len(), 1);
        assert_eq!(widget.messages()[0].role, ChatRole::User);
        let notice = widget.notice().unwrap();
        assert_eq!(notice.kind, ErrorKind::EndpointUnavailable);
        assert_eq!(notice.text, ERROR_REPLY_TEXT);
        assert!(widget.is_expanded());

        // Manual retry clears the notice
        widget.begin_send("hi again").unwrap();
        assert!(widget.notice().is_none());
    }

    #[test]
    fn test_stale_reply_is_ignored() {
        let (mut widget, _) = widget();
        widget.complete_send(Ok(ChatReply::new("unsolicited")));
        assert!(widget.messages().is_empty());
    }

    #[test]
    fn test_history_window_limits_context() {
        let config = Config {
            history_window: 3,
            ..Config::default()
        };
        let mut widget = ChatWidget::in_memory(&config);
        widget.expand();
        for i in 0..3 {
            widget.begin_send(&format!("q{i}")).unwrap();
            widget.complete_send(Ok(ChatReply::new(format!("a{i}"))));
        }

        let request = widget.begin_send("last").unwrap();
        let contents: Vec<&str> = request.history.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["q2", "a2", "last"]);
    }

    #[test]
    fn test_storage_failure_degrades_to_memory() {
        let mut widget = ChatWidget::new(Arc::new(UnavailableStorage), &Config::default());
        assert!(!widget.is_persistent());

        widget.expand();
        widget.begin_send("hi").unwrap();
        widget.complete_send(Ok(ChatReply::new("hello")));
        assert_eq!(widget.messages().len(), 2);
    }

    #[test]
    fn test_minimize_while_pending_still_records_reply() {
        let (mut widget, _) = widget();
        widget.expand();
        widget.begin_send("hi").unwrap();
        widget.minimize();
        widget.complete_send(Ok(ChatReply::new("hello")));
        assert_eq!(widget.messages().len(), 2);
        assert_eq!(widget.state(), ChatState::Collapsed);
    }
}
