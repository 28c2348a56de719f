//! Externally observable shape of the chat card
//!
//! `ChatView` is what a page inspector would see: the classes on the root node, the computed
//! layout, the minimize control's geometry and which surface is showing. Front ends render
//! from it instead of reading widget internals.

use crate::config::LayoutConfig;
use crate::state::ChatMessage;

use super::widget::ChatWidget;

pub const CARD_ID: &str = "ai-chat-card";
pub const MINIMIZE_BUTTON_ID: &str = "chat-minimize-btn";
pub const MESSAGES_AREA_ID: &str = "chat-messages-area";
pub const PREVIEW_ID: &str = "chat-preview";
pub const INPUT_ID: &str = "chatbot-input";

pub const EXPANDED_CLASS: &str = "expanded";
pub const COLLAPSE_ICON: &str = "fa-chevron-down";
/// Minimum touch target edge, in logical pixels
pub const MIN_TOUCH_TARGET: u32 = 44;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardLayout {
    /// Collapsed card sized by its content in the page flow
    Flow,
    /// Expanded on wide viewports, anchored in the page flow
    Anchored { height: u32 },
    /// Expanded on narrow viewports, fixed over the whole viewport
    Overlay { width: u32, height: u32 },
}

impl CardLayout {
    pub fn for_state(expanded: bool, viewport: Viewport, config: &LayoutConfig) -> Self {
        if !expanded {
            CardLayout::Flow
        } else if viewport.width < config.mobile_breakpoint {
            CardLayout::Overlay {
                width: viewport.width,
                height: viewport.height,
            }
        } else {
            CardLayout::Anchored {
                height: config.expanded_height,
            }
        }
    }

    pub fn is_fixed(&self) -> bool {
        matches!(self, CardLayout::Overlay { .. })
    }

    pub fn height(&self) -> Option<u32> {
        match self {
            CardLayout::Flow => None,
            CardLayout::Anchored { height } | CardLayout::Overlay { height, .. } => Some(*height),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlView {
    pub visible: bool,
    pub interactable: bool,
    pub width: u32,
    pub height: u32,
    pub icon: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatView<'a> {
    pub classes: Vec<&'static str>,
    pub layout: CardLayout,
    pub minimize: ControlView,
    pub messages_visible: bool,
    pub preview_visible: bool,
    pub input_present: bool,
    pub typing_indicator: bool,
    pub messages: &'a [ChatMessage],
    pub notice: Option<&'a str>,
}

impl<'a> ChatView<'a> {
    pub fn render(widget: &'a ChatWidget, viewport: Viewport, config: &LayoutConfig) -> Self {
        let expanded = widget.is_expanded();

        let mut classes = vec!["chat-card"];
        if expanded {
            classes.push(EXPANDED_CLASS);
        }

        Self {
            classes,
            layout: CardLayout::for_state(expanded, viewport, config),
            minimize: ControlView {
                visible: expanded,
                interactable: expanded,
                width: MIN_TOUCH_TARGET,
                height: MIN_TOUCH_TARGET,
                icon: COLLAPSE_ICON,
            },
            messages_visible: expanded,
            preview_visible: !expanded,
            input_present: expanded,
            typing_indicator: expanded && widget.is_pending(),
            messages: if expanded { widget.messages() } else { &[] },
            notice: if expanded {
                widget.notice().map(|n| n.text.as_str())
            } else {
                None
            },
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| *c == class)
    }

    pub fn is_expanded(&self) -> bool {
        self.has_class(EXPANDED_CLASS)
    }
}
