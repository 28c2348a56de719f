use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use site_widgets_core::{ChatTarget, VideoEvent};

use crate::app::App;
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(cols, rows) => {
            app.set_terminal_size(cols, rows);
            // The video cannot keep a fullscreen surface that no longer fits
            if app.fullscreen && !app.fits_fullscreen() {
                app.exit_fullscreen();
            }
        }
        AppEvent::Tick => app.tick(),
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    if app.fullscreen {
        handle_fullscreen(app, key);
    } else if app.editing {
        handle_editing(app, key);
    } else {
        handle_normal(app, key);
    }
}

fn handle_fullscreen(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.exit_fullscreen(),
        KeyCode::Char(' ') | KeyCode::Enter => app.video_event(VideoEvent::Click),
        _ => {}
    }
}

fn handle_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,

        // Chat card
        KeyCode::Char('c') => app.chat_click(ChatTarget::Card),
        KeyCode::Char('m') | KeyCode::Esc => {
            if app.page.chat.is_expanded() {
                app.chat_click(ChatTarget::MinimizeButton);
            }
        }
        KeyCode::Char('i') | KeyCode::Tab => app.focus_input(),

        // Video
        KeyCode::Char('v') => app.video_event(VideoEvent::Click),
        KeyCode::Char('p') => app.video_play_attempt(),

        // Page lifecycle
        KeyCode::Char('r') => app.reload(),
        KeyCode::Char('n') => app.open_new_tab(),
        _ => {}
    }
}

fn handle_editing(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.editing = false,
        KeyCode::Enter => app.submit_input(),
        KeyCode::Backspace => {
            if app.input_cursor > 0 {
                app.input_cursor -= 1;
                let byte_idx = char_to_byte_index(&app.input, app.input_cursor);
                app.input.remove(byte_idx);
            }
        }
        KeyCode::Delete => {
            if app.input_cursor < app.input.chars().count() {
                let byte_idx = char_to_byte_index(&app.input, app.input_cursor);
                app.input.remove(byte_idx);
            }
        }
        KeyCode::Left => app.input_cursor = app.input_cursor.saturating_sub(1),
        KeyCode::Right => {
            if app.input_cursor < app.input.chars().count() {
                app.input_cursor += 1;
            }
        }
        KeyCode::Home => app.input_cursor = 0,
        KeyCode::End => app.input_cursor = app.input.chars().count(),
        KeyCode::Char(c) => {
            let byte_idx = char_to_byte_index(&app.input, app.input_cursor);
            app.input.insert(byte_idx, c);
            app.input_cursor += 1;
        }
        _ => {}
    }
}

fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let x = mouse.column;
    let y = mouse.row;
    let hit = |area: Option<Rect>| area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);

    if app.fullscreen {
        if let MouseEventKind::Down(MouseButton::Left) = mouse.kind {
            app.video_event(VideoEvent::Click);
        }
        return;
    }

    match mouse.kind {
        MouseEventKind::Moved => {
            let over_video = hit(app.video_area);
            app.set_video_hover(over_video);
        }
        MouseEventKind::Down(MouseButton::Left) => {
            // Innermost areas first; the card contains the others
            if hit(app.minimize_area) {
                app.chat_click(ChatTarget::MinimizeButton);
            } else if hit(app.input_area) {
                app.chat_click(ChatTarget::Input);
                app.focus_input();
            } else if hit(app.messages_area) {
                app.chat_click(ChatTarget::MessagesArea);
            } else if hit(app.card_area) {
                app.chat_click(ChatTarget::Card);
            } else if hit(app.video_area) {
                app.video_event(VideoEvent::Click);
            } else {
                app.editing = false;
            }
        }
        _ => {}
    }
}
