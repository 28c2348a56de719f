//! Browser, tab and page-load lifecycle
//!
//! A `Browser` holds durable origin storage shared by all of its tabs. Every `Tab` gets its
//! own tab-scoped storage, and each `Tab::load` builds a fresh `Page` from it, so a reload is
//! simply loading the same tab again.

use std::sync::Arc;

use tracing::info;

use crate::chat::{ChatView, ChatWidget, Viewport};
use crate::config::Config;
use crate::storage::{MemoryStorage, TabStorage};
use crate::video::VideoPlayer;

#[derive(Debug, Default)]
pub struct Browser {
    local: MemoryStorage,
    tabs_opened: u32,
}

impl Browser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_tab(&mut self) -> Tab {
        self.tabs_opened += 1;
        Tab {
            id: self.tabs_opened,
            session: MemoryStorage::new(),
            local: self.local.clone(),
            loads: 0,
        }
    }

    /// Durable storage that outlives every tab
    pub fn local_storage(&self) -> &MemoryStorage {
        &self.local
    }
}

#[derive(Debug)]
pub struct Tab {
    id: u32,
    session: MemoryStorage,
    local: MemoryStorage,
    loads: u32,
}

impl Tab {
    /// Load (or reload) the page in this tab.
    pub fn load(&mut self, config: &Config) -> Page {
        self.loads += 1;
        info!(tab = self.id, load = self.loads, "page loaded");

        let session: Arc<dyn TabStorage> = Arc::new(self.session.clone());
        Page {
            chat: ChatWidget::new(session, config),
            video: VideoPlayer::load(&config.video),
            config: config.clone(),
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn loads(&self) -> u32 {
        self.loads
    }

    pub fn session_storage(&self) -> &MemoryStorage {
        &self.session
    }

    pub fn local_storage(&self) -> &MemoryStorage {
        &self.local
    }
}

/// One loaded page: the chat widget and the video player, sharing nothing.
pub struct Page {
    pub chat: ChatWidget,
    pub video: VideoPlayer,
    config: Config,
}

impl Page {
    pub fn chat_view(&self, viewport: Viewport) -> ChatView<'_> {
        ChatView::render(&self.chat, viewport, &self.config.layout)
    }
}
