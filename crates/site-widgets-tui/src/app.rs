use std::sync::Arc;

use ratatui::layout::Rect;
use site_widgets_core::{
    Browser, ChatDriver, ChatEndpoint, ChatEvent, ChatTarget, ChatView, Config, FullscreenDenied,
    HttpChatEndpoint, Page, Tab, VideoEffect, VideoEvent, Viewport,
};
use tracing::{debug, info};

use crate::tui::TICK;

/// Logical pixels per terminal cell, used to map the terminal onto page viewports
pub const CELL_WIDTH_PX: u32 = 8;
pub const CELL_HEIGHT_PX: u32 = 16;

/// Smallest terminal the simulated platform will take fullscreen on
const MIN_FULLSCREEN_COLS: u16 = 40;
const MIN_FULLSCREEN_ROWS: u16 = 12;

pub struct App {
    pub should_quit: bool,
    pub config: Config,

    browser: Browser,
    tab: Tab,
    pub page: Page,
    endpoint: Arc<dyn ChatEndpoint>,
    pub driver: ChatDriver,

    // Input field state
    pub input: String,
    pub input_cursor: usize,
    pub editing: bool,

    pub terminal_size: (u16, u16),
    /// Platform-side fullscreen (the video owns the whole terminal)
    pub fullscreen: bool,
    fullscreen_requested: bool,
    pub video_hovered: bool,

    pub animation_frame: u8,
    pub status: Option<String>,

    // Hit areas, updated during render
    pub card_area: Option<Rect>,
    pub minimize_area: Option<Rect>,
    pub messages_area: Option<Rect>,
    pub input_area: Option<Rect>,
    pub video_area: Option<Rect>,
}

impl App {
    pub fn new(config: Config) -> Self {
        let endpoint: Arc<dyn ChatEndpoint> = Arc::new(HttpChatEndpoint::new(&config.endpoint_url));
        let driver = ChatDriver::new(Arc::clone(&endpoint), config.request_timeout());

        let mut browser = Browser::new();
        let mut tab = browser.open_tab();
        let page = tab.load(&config);
        info!(endpoint = %config.endpoint_url, "site widgets started");

        Self {
            should_quit: false,
            config,
            browser,
            tab,
            page,
            endpoint,
            driver,
            input: String::new(),
            input_cursor: 0,
            editing: false,
            terminal_size: (0, 0),
            fullscreen: false,
            fullscreen_requested: false,
            video_hovered: false,
            animation_frame: 0,
            status: None,
            card_area: None,
            minimize_area: None,
            messages_area: None,
            input_area: None,
            video_area: None,
        }
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(
            self.terminal_size.0 as u32 * CELL_WIDTH_PX,
            self.terminal_size.1 as u32 * CELL_HEIGHT_PX,
        )
    }

    pub fn chat_view(&self) -> ChatView<'_> {
        self.page.chat_view(self.viewport())
    }

    pub fn tab_id(&self) -> u32 {
        self.tab.id()
    }

    pub fn load_count(&self) -> u32 {
        self.tab.loads()
    }

    pub fn set_terminal_size(&mut self, cols: u16, rows: u16) {
        self.terminal_size = (cols, rows);
    }

    pub fn fits_fullscreen(&self) -> bool {
        let (cols, rows) = self.terminal_size;
        cols >= MIN_FULLSCREEN_COLS && rows >= MIN_FULLSCREEN_ROWS
    }

    /// Reload the page in the current tab.
    pub fn reload(&mut self) {
        self.page = self.tab.load(&self.config);
        // Replies to requests from the previous load must not reach the new page
        self.driver = ChatDriver::new(Arc::clone(&self.endpoint), self.config.request_timeout());
        self.input.clear();
        self.input_cursor = 0;
        self.editing = false;
        self.fullscreen = false;
        self.fullscreen_requested = false;
        self.video_hovered = false;
        self.status = Some(format!("Reloaded (load #{})", self.tab.loads()));
    }

    pub fn open_new_tab(&mut self) {
        self.tab = self.browser.open_tab();
        self.reload();
        self.status = Some(format!("Opened tab #{}", self.tab.id()));
    }

    pub fn tick(&mut self) {
        if self.page.chat.is_pending() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
        self.driver.drain(&mut self.page.chat);

        if self.fullscreen_requested {
            self.fullscreen_requested = false;
            self.confirm_fullscreen();
        }

        self.page.video.advance(TICK.as_secs_f64());
    }

    // Chat

    pub fn chat_click(&mut self, target: ChatTarget) {
        let _ = self
            .driver
            .dispatch(&mut self.page.chat, ChatEvent::Click(target));
        if !self.page.chat.is_expanded() {
            self.editing = false;
        }
    }

    pub fn focus_input(&mut self) {
        let _ = self.driver.dispatch(&mut self.page.chat, ChatEvent::InputFocused);
        self.editing = true;
    }

    pub fn submit_input(&mut self) {
        match self.driver.submit(&mut self.page.chat, &self.input) {
            Ok(()) => {
                self.input.clear();
                self.input_cursor = 0;
                self.status = None;
            }
            Err(e) => self.status = Some(format!("Not sent: {}", e)),
        }
    }

    // Video

    pub fn video_event(&mut self, event: VideoEvent) {
        let effects = self.page.video.dispatch(event);
        self.apply_platform_effects(&effects);
    }

    pub fn video_play_attempt(&mut self) {
        let effects = self.page.video.play();
        if effects.contains(&VideoEffect::Pause) {
            self.status = Some("Playback is only allowed in fullscreen".to_string());
        }
    }

    pub fn exit_fullscreen(&mut self) {
        if self.fullscreen {
            self.fullscreen = false;
            self.video_event(VideoEvent::FullscreenExited);
        }
    }

    pub fn set_video_hover(&mut self, hovered: bool) {
        if hovered != self.video_hovered {
            self.video_hovered = hovered;
            let event = if hovered {
                VideoEvent::PointerEnter
            } else {
                VideoEvent::PointerLeave
            };
            self.video_event(event);
        }
    }

    fn apply_platform_effects(&mut self, effects: &[VideoEffect]) {
        if effects.contains(&VideoEffect::RequestFullscreen) {
            // Answered on the next tick, like an asynchronous platform confirmation
            self.fullscreen_requested = true;
        }
    }

    fn confirm_fullscreen(&mut self) {
        if !self.fits_fullscreen() {
            let (cols, rows) = self.terminal_size;
            self.status = Some("Fullscreen unavailable: terminal too small".to_string());
            self.video_event(VideoEvent::FullscreenDenied(FullscreenDenied::new(format!(
                "terminal is {}x{}",
                cols, rows
            ))));
            return;
        }

        debug!("granting fullscreen");
        self.fullscreen = true;
        self.video_event(VideoEvent::FullscreenEntered);
    }
}
