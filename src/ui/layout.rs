//! Layout components (content area and status bar)

use crate::app::App;
use crate::platform::SUBMIT_SHORTCUT;
use crate::state::View;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Split off the bottom line for the status bar. Returns (content, status).
pub fn create_layout(area: Rect) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Content
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    (chunks[0], chunks[1])
}

/// Draw the status bar
pub fn draw_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![];

    // Session indicator
    match app.current_user() {
        Some(email) => {
            spans.push(Span::styled(" ● ", Style::default().fg(Color::Green)));
            spans.push(Span::styled(email, Style::default().fg(Color::White)));
        }
        None => {
            spans.push(Span::styled(" ○ ", Style::default().fg(Color::Red)));
            spans.push(Span::styled("signed out", Style::default().fg(Color::Gray)));
        }
    }
    spans.push(Span::raw(" | "));

    spans.push(Span::styled(
        view_hints(&app.state.current_view),
        Style::default().fg(Color::Gray),
    ));

    if let Some(msg) = app.notices.status_text() {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(msg, Style::default().fg(Color::Green)));
    }

    let status = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(status, area);

    // Quit hint on the right
    let quit_hint = " ^C:quit ";
    let hint_width = quit_hint.len() as u16;
    if area.width > hint_width {
        let quit_area = Rect {
            x: area.x + area.width - hint_width,
            width: hint_width,
            ..area
        };
        let quit_widget =
            Paragraph::new(quit_hint).style(Style::default().bg(Color::DarkGray).fg(Color::Gray));
        frame.render_widget(quit_widget, quit_area);
    }
}

/// Get keyboard hints for the current view
fn view_hints(view: &View) -> String {
    match view {
        View::Login => format!("Tab:next  Enter/{SUBMIT_SHORTCUT}:sign in"),
        View::Policies => "↑↓:select  n:new  r:refresh  l:logout  q:quit".to_string(),
        View::PolicyCreate => format!("Tab:next  {SUBMIT_SHORTCUT}:create  Esc:cancel"),
    }
}
