pub mod chat;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod page;
pub mod state;
pub mod storage;
pub mod video;

// Re-export main types for convenience
pub use chat::{ChatDriver, ChatEvent, ChatState, ChatTarget, ChatView, ChatWidget, Viewport};
pub use config::Config;
pub use endpoint::{ChatEndpoint, ChatReply, ChatRequest, HttpChatEndpoint};
pub use error::{EndpointError, ErrorKind, FullscreenDenied, SendError, StorageError};
pub use page::{Browser, Page, Tab};
pub use state::{ChatMessage, ChatRole};
pub use storage::{MemoryStorage, TabStorage, UnavailableStorage};
pub use video::{VideoEffect, VideoEvent, VideoPlayer, VideoState};
