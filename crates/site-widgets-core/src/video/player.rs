use tracing::debug;

use crate::config::VideoConfig;

use super::element::VideoElement;
use super::gate::{VideoEffect, VideoEvent, VideoGate, VideoState};

/// A gate wired to the element it guards.
///
/// Element-directed effects are applied here; the returned effects are the full list so the
/// host can act on the platform-directed ones (`RequestFullscreen`).
#[derive(Debug, Clone)]
pub struct VideoPlayer {
    gate: VideoGate,
    element: VideoElement,
}

impl VideoPlayer {
    pub fn load(config: &VideoConfig) -> Self {
        let (gate, effects) = VideoGate::load();
        let mut element = VideoElement::from_config(config);
        for effect in &effects {
            element.apply(effect);
        }
        Self { gate, element }
    }

    pub fn gate(&self) -> &VideoGate {
        &self.gate
    }

    pub fn element(&self) -> &VideoElement {
        &self.element
    }

    pub fn state(&self) -> VideoState {
        self.gate.state()
    }

    pub fn dispatch(&mut self, event: VideoEvent) -> Vec<VideoEffect> {
        let effects = self.gate.handle(event);
        for effect in &effects {
            self.element.apply(effect);
        }
        effects
    }

    /// Programmatic `play()` on the element, which the gate vetoes outside fullscreen.
    pub fn play(&mut self) -> Vec<VideoEffect> {
        self.element.play();
        self.dispatch(VideoEvent::PlayObserved)
    }

    /// Scripted seek, reported back to the gate as a time update.
    pub fn seek(&mut self, seconds: f64) {
        self.element.set_current_time(seconds);
        let position = self.element.current_time();
        self.dispatch(VideoEvent::TimeUpdate(position));
    }

    /// Let wall time pass; the element reports its new position if it moved, and `ended`
    /// once the clip runs out.
    pub fn advance(&mut self, seconds: f64) {
        let before = self.element.current_time();
        let ended = self.element.advance(seconds);
        let after = self.element.current_time();
        if after != before {
            debug!(position = after, "video time update");
            self.dispatch(VideoEvent::TimeUpdate(after));
        }
        if ended {
            debug!("video ended");
            self.dispatch(VideoEvent::Ended);
        }
    }

    /// True when the element is actually running
    pub fn is_running(&self) -> bool {
        !self.element.is_paused()
    }
}
