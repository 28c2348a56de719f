//! Fullscreen-gated playback
//!
//! The gate owns the playback permission for one media element. Platform and user events go
//! in, media commands come out. Playback is only ever started after the platform confirms
//! fullscreen, and every path out of fullscreen pauses.

use tracing::{debug, warn};

use crate::error::FullscreenDenied;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VideoState {
    #[default]
    Idle,
    /// Fullscreen requested, waiting on the platform
    Requesting,
    PlayingFullscreen {
        paused: bool,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum VideoEvent {
    Click,
    FullscreenEntered,
    FullscreenExited,
    FullscreenDenied(FullscreenDenied),
    /// The element reported a `play`, whoever started it
    PlayObserved,
    PauseObserved,
    Ended,
    TimeUpdate(f64),
    PointerEnter,
    PointerLeave,
    LoadFailed,
}

/// Commands for the media element or the platform
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VideoEffect {
    RequestFullscreen,
    Play,
    Pause,
    Seek(f64),
    ShowControls(bool),
}

#[derive(Debug, Clone, PartialEq)]
pub struct VideoGate {
    state: VideoState,
    position: f64,
    fullscreen: bool,
    hovered: bool,
    available: bool,
}

impl VideoGate {
    /// Gate for a fresh page load, plus the commands that pin the element to the start.
    pub fn load() -> (Self, Vec<VideoEffect>) {
        let gate = Self {
            state: VideoState::Idle,
            position: 0.0,
            fullscreen: false,
            hovered: false,
            available: true,
        };
        let effects = vec![
            VideoEffect::Pause,
            VideoEffect::ShowControls(false),
            VideoEffect::Seek(0.0),
        ];
        (gate, effects)
    }

    pub fn state(&self) -> VideoState {
        self.state
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    pub fn is_playing(&self) -> bool {
        matches!(self.state, VideoState::PlayingFullscreen { paused: false })
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    /// "Click to watch" affordance
    pub fn overlay_visible(&self) -> bool {
        self.available && self.hovered && self.state == VideoState::Idle
    }

    pub fn controls_visible(&self) -> bool {
        matches!(self.state, VideoState::PlayingFullscreen { .. })
    }

    pub fn handle(&mut self, event: VideoEvent) -> Vec<VideoEffect> {
        match event {
            VideoEvent::Click => self.on_click(),
            VideoEvent::FullscreenEntered => self.on_fullscreen_entered(),
            VideoEvent::FullscreenExited => self.on_fullscreen_exited(),
            VideoEvent::FullscreenDenied(denied) => {
                warn!(kind = ?denied.kind(), "{}", denied);
                if self.state == VideoState::Requesting {
                    self.state = VideoState::Idle;
                }
                Vec::new()
            }
            VideoEvent::PlayObserved => match &mut self.state {
                VideoState::PlayingFullscreen { paused } if self.fullscreen => {
                    *paused = false;
                    Vec::new()
                }
                _ => {
                    debug!("playback outside a fullscreen session, forcing pause");
                    vec![VideoEffect::Pause]
                }
            },
            VideoEvent::PauseObserved | VideoEvent::Ended => {
                if let VideoState::PlayingFullscreen { paused } = &mut self.state {
                    *paused = true;
                }
                Vec::new()
            }
            VideoEvent::TimeUpdate(position) => {
                self.position = position;
                Vec::new()
            }
            VideoEvent::PointerEnter => {
                self.hovered = true;
                Vec::new()
            }
            VideoEvent::PointerLeave => {
                self.hovered = false;
                Vec::new()
            }
            VideoEvent::LoadFailed => {
                warn!("video source failed to load");
                self.available = false;
                Vec::new()
            }
        }
    }

    fn on_click(&mut self) -> Vec<VideoEffect> {
        match self.state {
            VideoState::Idle if self.available => {
                debug!("requesting fullscreen");
                self.state = VideoState::Requesting;
                vec![VideoEffect::RequestFullscreen]
            }
            VideoState::Idle | VideoState::Requesting => Vec::new(),
            VideoState::PlayingFullscreen { paused } => {
                self.state = VideoState::PlayingFullscreen { paused: !paused };
                if paused {
                    vec![VideoEffect::Play]
                } else {
                    vec![VideoEffect::Pause]
                }
            }
        }
    }

    fn on_fullscreen_entered(&mut self) -> Vec<VideoEffect> {
        self.fullscreen = true;
        match self.state {
            VideoState::Requesting if self.available => {
                debug!("fullscreen confirmed, starting playback");
                self.state = VideoState::PlayingFullscreen { paused: false };
                vec![VideoEffect::ShowControls(true), VideoEffect::Play]
            }
            VideoState::Requesting => {
                self.state = VideoState::Idle;
                Vec::new()
            }
            // Only a request from this gate starts playback
            VideoState::Idle | VideoState::PlayingFullscreen { .. } => Vec::new(),
        }
    }

    fn on_fullscreen_exited(&mut self) -> Vec<VideoEffect> {
        self.fullscreen = false;
        let was_fullscreen = matches!(self.state, VideoState::PlayingFullscreen { .. });
        self.state = VideoState::Idle;
        if was_fullscreen {
            debug!("fullscreen exited, pausing");
        }
        vec![VideoEffect::Pause, VideoEffect::ShowControls(false)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate() -> VideoGate {
        VideoGate::load().0
    }

    #[test]
    fn test_load_pins_position_to_zero() {
        let (gate, effects) = VideoGate::load();
        assert_eq!(gate.position(), 0.0);
        assert_eq!(gate.state(), VideoState::Idle);
        assert!(effects.contains(&VideoEffect::Seek(0.0)));
        assert!(effects.contains(&VideoEffect::ShowControls(false)));
    }

    #[test]
    fn test_click_requests_fullscreen_once() {
        let mut gate = gate();
        assert_eq!(gate.handle(VideoEvent::Click), vec![VideoEffect::RequestFullscreen]);
        assert_eq!(gate.state(), VideoState::Requesting);
        assert!(gate.handle(VideoEvent::Click).is_empty());
        assert!(!gate.is_playing());
    }

    #[test]
    fn test_confirmation_starts_playback() {
        let mut gate = gate();
        gate.handle(VideoEvent::Click);
        let effects = gate.handle(VideoEvent::FullscreenEntered);
        assert!(effects.contains(&VideoEffect::Play));
        assert!(gate.is_playing());
        assert!(gate.is_fullscreen());
        assert!(gate.controls_visible());
    }

    #[test]
    fn test_denial_reverts_to_idle() {
        let mut gate = gate();
        gate.handle(VideoEvent::Click);
        let effects = gate.handle(VideoEvent::FullscreenDenied(FullscreenDenied::new(
            "permission check failed",
        )));
        assert!(effects.is_empty());
        assert_eq!(gate.state(), VideoState::Idle);

        // A later click may try again
        assert_eq!(gate.handle(VideoEvent::Click), vec![VideoEffect::RequestFullscreen]);
    }

    #[test]
    fn test_late_confirmation_after_denial_stays_paused() {
        let mut gate = gate();
        gate.handle(VideoEvent::Click);
        gate.handle(VideoEvent::FullscreenDenied(FullscreenDenied::new("user gesture expired")));

        let effects = gate.handle(VideoEvent::FullscreenEntered);
        assert!(effects.is_empty());
        assert_eq!(gate.state(), VideoState::Idle);
        assert!(gate.is_fullscreen());
        assert!(!gate.is_playing());
        assert!(!gate.controls_visible());

        // Playback started by anything else is still reverted
        assert_eq!(gate.handle(VideoEvent::PlayObserved), vec![VideoEffect::Pause]);

        // Leaving that fullscreen pauses as always, and the next click asks again
        gate.handle(VideoEvent::FullscreenExited);
        assert_eq!(gate.handle(VideoEvent::Click), vec![VideoEffect::RequestFullscreen]);
    }

    #[test]
    fn test_fullscreen_without_click_does_not_play() {
        let mut gate = gate();
        assert!(gate.handle(VideoEvent::FullscreenEntered).is_empty());
        assert_eq!(gate.state(), VideoState::Idle);
        assert!(!gate.is_playing());
    }

    #[test]
    fn test_exit_forces_pause() {
        let mut gate = gate();
        gate.handle(VideoEvent::Click);
        gate.handle(VideoEvent::FullscreenEntered);

        let effects = gate.handle(VideoEvent::FullscreenExited);
        assert_eq!(effects[0], VideoEffect::Pause);
        assert_eq!(gate.state(), VideoState::Idle);
        assert!(!gate.is_playing());
    }

    #[test]
    fn test_click_in_fullscreen_toggles() {
        let mut gate = gate();
        gate.handle(VideoEvent::Click);
        gate.handle(VideoEvent::FullscreenEntered);

        assert_eq!(gate.handle(VideoEvent::Click), vec![VideoEffect::Pause]);
        assert_eq!(gate.state(), VideoState::PlayingFullscreen { paused: true });
        assert!(gate.is_fullscreen());

        assert_eq!(gate.handle(VideoEvent::Click), vec![VideoEffect::Play]);
        assert!(gate.is_playing());
    }

    #[test]
    fn test_inline_play_is_reverted() {
        let mut gate = gate();
        assert_eq!(gate.handle(VideoEvent::PlayObserved), vec![VideoEffect::Pause]);
        assert!(!gate.is_playing());
    }

    #[test]
    fn test_overlay_only_on_idle_hover() {
        let mut gate = gate();
        assert!(!gate.overlay_visible());
        gate.handle(VideoEvent::PointerEnter);
        assert!(gate.overlay_visible());

        gate.handle(VideoEvent::Click);
        gate.handle(VideoEvent::FullscreenEntered);
        assert!(!gate.overlay_visible());

        gate.handle(VideoEvent::FullscreenExited);
        assert!(gate.overlay_visible());
        gate.handle(VideoEvent::PointerLeave);
        assert!(!gate.overlay_visible());
    }

    #[test]
    fn test_unavailable_source_ignores_clicks() {
        let mut gate = gate();
        gate.handle(VideoEvent::PointerEnter);
        gate.handle(VideoEvent::LoadFailed);
        assert!(!gate.overlay_visible());
        assert!(gate.handle(VideoEvent::Click).is_empty());
    }

    #[test]
    fn test_playing_implies_fullscreen_for_all_short_sequences() {
        let events = [
            VideoEvent::Click,
            VideoEvent::FullscreenEntered,
            VideoEvent::FullscreenExited,
            VideoEvent::FullscreenDenied(FullscreenDenied::new("no")),
            VideoEvent::PlayObserved,
            VideoEvent::PauseObserved,
            VideoEvent::Ended,
            VideoEvent::LoadFailed,
        ];

        let n = events.len();
        for seq in 0..n.pow(4) {
            let mut gate = gate();
            let mut code = seq;
            let mut requested = false;
            for _ in 0..4 {
                let effects = gate.handle(events[code % n].clone());
                code /= n;

                requested |= effects.contains(&VideoEffect::RequestFullscreen);
                assert!(!gate.is_playing() || gate.is_fullscreen());
                // Playback only ever follows a fullscreen request from this gate
                assert!(!gate.is_playing() || requested);
            }
        }
    }
}
