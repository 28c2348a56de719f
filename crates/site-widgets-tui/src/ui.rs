use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use site_widgets_core::chat::CardLayout;
use site_widgets_core::{ChatRole, VideoState};

use crate::app::{App, CELL_HEIGHT_PX, CELL_WIDTH_PX};

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();
    app.set_terminal_size(area.width, area.height);

    if app.fullscreen {
        app.card_area = None;
        app.minimize_area = None;
        app.messages_area = None;
        app.input_area = None;
        app.video_area = Some(area);
        render_fullscreen_video(app, frame, area);
        return;
    }

    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    let [chat_column, video_column] = Layout::horizontal([
        Constraint::Percentage(50),
        Constraint::Percentage(50),
    ])
    .areas(body_area);

    render_video_panel(app, frame, video_column);

    // An overlay card covers the viewport, so it is drawn after the panels it hides
    let layout = app.chat_view().layout;
    let card_area = match layout {
        CardLayout::Flow => {
            let [card, _] =
                Layout::vertical([Constraint::Length(5), Constraint::Min(0)]).areas(chat_column);
            card
        }
        CardLayout::Anchored { height } => {
            let rows = (height / CELL_HEIGHT_PX).max(8) as u16;
            let [card, _] = Layout::vertical([Constraint::Length(rows), Constraint::Min(0)])
                .areas(chat_column);
            card
        }
        CardLayout::Overlay { .. } => {
            // Everything above the footer, which stays visible for the key help
            let overlay = Rect::new(
                area.x,
                area.y,
                area.width,
                area.height.saturating_sub(footer_area.height),
            );
            app.video_area = None;
            frame.render_widget(Clear, overlay);
            overlay
        }
    };
    render_chat_card(app, frame, card_area);

    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" Site Widgets ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(
            format!("tab #{} · load #{}", app.tab_id(), app.load_count()),
            Style::default().fg(Color::Gray),
        ),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let help = if app.fullscreen {
        " Space: play/pause │ Esc: exit fullscreen "
    } else if app.editing {
        " Enter: send │ Esc: stop typing "
    } else {
        " c: open chat │ m: minimize │ i: type │ v: watch video │ r: reload │ n: new tab │ q: quit "
    };

    let mut spans = vec![Span::styled(help, Style::default().fg(Color::Gray))];
    if let Some(status) = &app.status {
        spans.push(Span::styled(
            format!(" {} ", status),
            Style::default().fg(Color::Yellow),
        ));
    }

    let footer = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}

fn render_chat_card(app: &mut App, frame: &mut Frame, area: Rect) {
    let view = app.chat_view();
    let expanded = view.is_expanded();
    let typing = view.typing_indicator;
    let minimize = view.minimize.clone();
    let notice = view.notice.map(str::to_string);
    let messages: Vec<(ChatRole, String)> = view
        .messages
        .iter()
        .map(|m| (m.role, m.content.clone()))
        .collect();

    app.card_area = Some(area);

    let border_color = if expanded { Color::Cyan } else { Color::DarkGray };
    let card_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(format!(" {} ", app.config.brand_name));

    if !expanded {
        app.minimize_area = None;
        app.messages_area = None;
        app.input_area = None;

        let preview = Paragraph::new(vec![
            Line::from(Span::styled(
                "Ask me anything about this site",
                Style::default().fg(Color::White),
            )),
            Line::from(Span::styled(
                "Click to start chatting",
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )),
        ])
        .block(card_block)
        .wrap(Wrap { trim: true });
        frame.render_widget(preview, area);
        return;
    }

    let inner = card_block.inner(area);
    frame.render_widget(card_block, area);

    // Minimize control hangs from the top border, right-aligned, covering a full touch target
    let minimize_cols = (minimize.width.div_ceil(CELL_WIDTH_PX) as u16).min(inner.width);
    let minimize_rows = (minimize.height.div_ceil(CELL_HEIGHT_PX) as u16).min(area.height);
    let minimize_area = Rect::new(
        inner.right().saturating_sub(minimize_cols),
        area.y,
        minimize_cols,
        minimize_rows,
    );
    let glyph = Span::styled("⌄", Style::default().fg(Color::Cyan).bold());
    let minimize_button = Paragraph::new(glyph)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        );
    frame.render_widget(Clear, minimize_area);
    frame.render_widget(minimize_button, minimize_area);
    app.minimize_area = Some(minimize_area);

    // Rows under the minimize control stay free so the message area never sits beneath it
    let toolbar_rows = minimize_rows.saturating_sub(1);
    let [_, messages_area, input_area] = Layout::vertical([
        Constraint::Length(toolbar_rows),
        Constraint::Min(0),
        Constraint::Length(3),
    ])
    .areas(inner);
    app.messages_area = Some(messages_area);
    app.input_area = Some(input_area);

    let mut lines: Vec<Line> = Vec::new();
    if messages.is_empty() && !typing {
        lines.push(Line::from(Span::styled(
            "Ask a question...",
            Style::default().fg(Color::DarkGray),
        )));
    }

    for (role, content) in &messages {
        match role {
            ChatRole::User => {
                lines.push(Line::from(Span::styled(
                    "You:",
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                )));
            }
            ChatRole::Assistant => {
                lines.push(Line::from(Span::styled(
                    "AI:",
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                )));
            }
        }
        for line in content.lines() {
            lines.push(Line::from(line.to_string()));
        }
        lines.push(Line::default());
    }

    if typing {
        lines.push(Line::from(Span::styled(
            "AI:",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        lines.push(Line::from(Span::styled(
            format!("Thinking{}", dots),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    if let Some(notice) = notice {
        lines.push(Line::from(Span::styled(
            notice,
            Style::default().fg(Color::Red),
        )));
    }

    // Keep the newest lines in view
    let scroll = u16::try_from(lines.len())
        .unwrap_or(u16::MAX)
        .saturating_sub(messages_area.height);
    let chat = Paragraph::new(Text::from(lines))
        .wrap(Wrap { trim: true })
        .scroll((scroll, 0));
    frame.render_widget(chat, messages_area);

    let input_color = if app.editing { Color::Yellow } else { Color::DarkGray };
    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(input_color))
        .title(" Message ");

    // Horizontal scroll keeps the cursor visible
    let inner_width = input_area.width.saturating_sub(2) as usize;
    let cursor_pos = app.input_cursor;
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };
    let visible_text: String = app
        .input
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(input_block);
    frame.render_widget(input, input_area);

    if app.editing {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((input_area.x + cursor_x + 1, input_area.y + 1));
    }
}

fn video_status(app: &App) -> (String, Color) {
    let gate = app.page.video.gate();
    let label = match gate.state() {
        VideoState::Idle => "stopped",
        VideoState::Requesting => "opening fullscreen...",
        VideoState::PlayingFullscreen { paused: false } => "playing",
        VideoState::PlayingFullscreen { paused: true } => "paused",
    };
    let color = if gate.is_playing() { Color::Green } else { Color::Gray };
    (
        format!("{} at {:.1}s", label, app.page.video.element().current_time()),
        color,
    )
}

fn render_video_panel(app: &mut App, frame: &mut Frame, area: Rect) {
    app.video_area = Some(area);

    let border_color = if app.video_hovered { Color::Cyan } else { Color::DarkGray };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" About me ");

    let element = app.page.video.element();
    let gate = app.page.video.gate();
    let mut lines = Vec::new();

    if !gate.is_available() {
        lines.push(Line::from(Span::styled(
            "Video will be available soon",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    } else {
        lines.push(Line::from(vec![
            Span::styled("poster ", Style::default().fg(Color::DarkGray)),
            Span::raw(element.poster.clone()),
        ]));
        if let Some(source) = element.source() {
            lines.push(Line::from(vec![
                Span::styled("source ", Style::default().fg(Color::DarkGray)),
                Span::raw(format!("{} ({})", source.src, source.mime_type)),
            ]));
        }
        lines.push(Line::default());

        if gate.overlay_visible() {
            lines.push(Line::from(Span::styled(
                "▶ Click to watch",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )));
        }

        let (status, color) = video_status(app);
        lines.push(Line::from(Span::styled(status, Style::default().fg(color))));
    }

    let panel = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
    frame.render_widget(panel, area);
}

fn render_fullscreen_video(app: &App, frame: &mut Frame, area: Rect) {
    let gate = app.page.video.gate();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green))
        .title(" Fullscreen ");

    let title = app
        .page
        .video
        .element()
        .source()
        .map(|s| s.src.clone())
        .unwrap_or_default();
    let (status, color) = video_status(app);

    let mut lines = vec![
        Line::from(Span::styled(title, Style::default().fg(Color::White).bold())),
        Line::default(),
        Line::from(Span::styled(status, Style::default().fg(color))),
    ];
    if gate.controls_visible() {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            "Space: play/pause │ Esc: exit fullscreen",
            Style::default().fg(Color::Gray),
        )));
    }

    let body = Paragraph::new(lines).block(block);
    frame.render_widget(body, area);
}
