use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use site_widgets_core::endpoint::ReplyFuture;
use site_widgets_core::chat::ChatEvent;
use site_widgets_core::{
    ChatDriver, ChatEndpoint, ChatReply, ChatRequest, ChatRole, ChatTarget, ChatWidget, Config,
    EndpointError, ErrorKind, MemoryStorage, SendError,
};

/// Replies "echo: <message>" after an optional delay, counting calls.
struct EchoEndpoint {
    calls: AtomicUsize,
    delay: Duration,
}

impl EchoEndpoint {
    fn new(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            delay,
        })
    }
}

impl ChatEndpoint for EchoEndpoint {
    fn send<'a>(&'a self, request: &'a ChatRequest) -> ReplyFuture<'a> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            Ok(ChatReply {
                response: format!("echo: {}", request.message),
                session_id: Some("echo-session".to_string()),
            })
        })
    }
}

struct DownEndpoint;

impl ChatEndpoint for DownEndpoint {
    fn send<'a>(&'a self, _request: &'a ChatRequest) -> ReplyFuture<'a> {
        Box::pin(async {
            Err(EndpointError::Status {
                status: 503,
                message: "unavailable".to_string(),
            })
        })
    }
}

fn expanded_widget() -> ChatWidget {
    let mut widget = ChatWidget::new(Arc::new(MemoryStorage::new()), &Config::default());
    widget.click(ChatTarget::Card);
    widget
}

#[tokio::test]
async fn reply_is_delivered_back_into_widget() {
    let endpoint = EchoEndpoint::new(Duration::from_millis(0));
    let mut driver = ChatDriver::new(endpoint.clone(), None);
    let mut widget = expanded_widget();

    driver.submit(&mut widget, "hello").unwrap();
    assert!(widget.is_pending());

    assert!(driver.next_reply(&mut widget).await);
    assert!(!widget.is_pending());
    assert_eq!(widget.messages().len(), 2);
    assert_eq!(widget.messages()[1].role, ChatRole::Assistant);
    assert_eq!(widget.messages()[1].content, "echo: hello");
    assert_eq!(widget.session_id(), Some("echo-session"));
}

#[tokio::test]
async fn at_most_one_request_outstanding() {
    let endpoint = EchoEndpoint::new(Duration::from_millis(50));
    let mut driver = ChatDriver::new(endpoint.clone(), None);
    let mut widget = expanded_widget();

    driver.submit(&mut widget, "first").unwrap();
    assert_eq!(driver.submit(&mut widget, "second"), Err(SendError::InFlight));
    assert_eq!(driver.submit(&mut widget, "third"), Err(SendError::InFlight));

    driver.next_reply(&mut widget).await;
    assert_eq!(endpoint.calls.load(Ordering::SeqCst), 1);
    assert_eq!(widget.messages().len(), 2);

    // Once answered, the next submission goes through
    driver.submit(&mut widget, "second").unwrap();
    driver.next_reply(&mut widget).await;
    assert_eq!(endpoint.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn other_interactions_remain_processable_while_pending() {
    let endpoint = EchoEndpoint::new(Duration::from_millis(50));
    let mut driver = ChatDriver::new(endpoint, None);
    let mut widget = expanded_widget();

    driver.submit(&mut widget, "hello").unwrap();
    driver
        .dispatch(&mut widget, ChatEvent::Click(ChatTarget::MinimizeButton))
        .unwrap();
    assert!(!widget.is_expanded());
    assert!(widget.is_pending());

    driver.next_reply(&mut widget).await;
    assert_eq!(widget.messages().len(), 2);
}

#[tokio::test]
async fn endpoint_failure_surfaces_notice() {
    let mut driver = ChatDriver::new(Arc::new(DownEndpoint), None);
    let mut widget = expanded_widget();

    driver.submit(&mut widget, "hello").unwrap();
    driver.next_reply(&mut widget).await;

    assert_eq!(widget.messages().len(), 1);
    assert!(widget.is_expanded());
    assert_eq!(widget.notice().unwrap().kind, ErrorKind::EndpointUnavailable);
}

#[tokio::test]
async fn slow_endpoint_times_out() {
    let endpoint = EchoEndpoint::new(Duration::from_secs(10));
    let mut driver = ChatDriver::new(endpoint, Some(Duration::from_millis(20)));
    let mut widget = expanded_widget();

    driver.submit(&mut widget, "hello").unwrap();
    driver.next_reply(&mut widget).await;

    assert!(!widget.is_pending());
    assert!(widget.notice().is_some());
    assert_eq!(widget.messages().len(), 1);
}

#[tokio::test]
async fn drain_applies_arrived_replies_without_waiting() {
    let endpoint = EchoEndpoint::new(Duration::from_millis(0));
    let mut driver = ChatDriver::new(endpoint, None);
    let mut widget = expanded_widget();

    assert_eq!(driver.drain(&mut widget), 0);
    driver.submit(&mut widget, "hello").unwrap();

    let mut applied = 0;
    for _ in 0..50 {
        applied += driver.drain(&mut widget);
        if applied > 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(applied, 1);
    assert_eq!(widget.messages().len(), 2);
}

#[tokio::test]
async fn inline_send_round_trip() {
    let endpoint = EchoEndpoint::new(Duration::from_millis(0));
    let mut widget = expanded_widget();

    widget.send(endpoint.as_ref(), "hi").await.unwrap();
    assert_eq!(widget.messages().len(), 2);
    assert_eq!(widget.send(endpoint.as_ref(), "  ").await, Err(SendError::Empty));
}
