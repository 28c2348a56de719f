use crate::config::VideoConfig;

use super::gate::VideoEffect;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaSource {
    pub src: String,
    pub mime_type: String,
}

/// The media element as the page declares it, plus its live playback state.
///
/// Only the gate's effects (and host-observed time updates) move the playback state; nothing
/// here reads or writes any storage.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoElement {
    pub poster: String,
    pub sources: Vec<MediaSource>,
    pub plays_inline: bool,
    duration: f64,
    controls: bool,
    current_time: f64,
    paused: bool,
    fullscreen_requests: usize,
}

impl VideoElement {
    pub fn from_config(config: &VideoConfig) -> Self {
        Self {
            poster: config.poster.clone(),
            sources: vec![MediaSource {
                src: config.source.clone(),
                mime_type: config.source_type.clone(),
            }],
            plays_inline: true,
            duration: config.duration_secs.max(0.0),
            controls: false,
            current_time: 0.0,
            paused: true,
            fullscreen_requests: 0,
        }
    }

    /// Attribute view of the element, in declaration order
    pub fn attributes(&self) -> Vec<(&'static str, String)> {
        let mut attrs = vec![("poster", self.poster.clone())];
        if self.plays_inline {
            attrs.push(("playsinline", String::new()));
        }
        if self.controls {
            attrs.push(("controls", String::new()));
        }
        attrs
    }

    pub fn attribute(&self, name: &str) -> Option<String> {
        self.attributes()
            .into_iter()
            .find(|(attr, _)| *attr == name)
            .map(|(_, value)| value)
    }

    pub fn source(&self) -> Option<&MediaSource> {
        self.sources.first()
    }

    pub fn has_controls(&self) -> bool {
        self.controls
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn is_ended(&self) -> bool {
        self.current_time >= self.duration
    }

    /// Scripted seek, as page code or the user scrubbing would do
    pub fn set_current_time(&mut self, seconds: f64) {
        self.current_time = seconds.clamp(0.0, self.duration);
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn fullscreen_requests(&self) -> usize {
        self.fullscreen_requests
    }

    /// Start playback directly on the element, bypassing the gate.
    pub fn play(&mut self) {
        // Playing a finished clip starts it over
        if self.is_ended() {
            self.current_time = 0.0;
        }
        self.paused = false;
    }

    /// Run the playback clock. Returns true when this step reached the end of the clip,
    /// which also pauses the element.
    pub fn advance(&mut self, seconds: f64) -> bool {
        if self.paused {
            return false;
        }
        self.current_time = (self.current_time + seconds).min(self.duration);
        if self.is_ended() {
            self.paused = true;
            return true;
        }
        false
    }

    pub fn apply(&mut self, effect: &VideoEffect) {
        match effect {
            VideoEffect::RequestFullscreen => self.fullscreen_requests += 1,
            VideoEffect::Play => self.play(),
            VideoEffect::Pause => self.paused = true,
            VideoEffect::Seek(seconds) => self.set_current_time(*seconds),
            VideoEffect::ShowControls(show) => self.controls = *show,
        }
    }
}
