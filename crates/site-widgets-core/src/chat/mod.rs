pub mod driver;
pub mod view;
pub mod widget;

pub use driver::ChatDriver;
pub use view::{CardLayout, ChatView, ControlView, Viewport};
pub use widget::{ChatEffect, ChatEvent, ChatNotice, ChatState, ChatTarget, ChatWidget};
