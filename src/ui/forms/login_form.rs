//! Login form rendering

use super::field_renderer::{draw_field, draw_help_text, FIELD_HEIGHT};
use crate::app::App;
use crate::platform::SUBMIT_SHORTCUT;
use crate::state::{FieldName, Form, View};
use crate::ui::components::{render_button, BUTTON_HEIGHT};
use ratatui::{
    layout::{Constraint, Direction, Flex, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders},
    Frame,
};

const FORM_WIDTH: u16 = 50;

/// Draw the sign-in form centered in the content area
pub fn draw_login(frame: &mut Frame, area: Rect, app: &App) {
    let form = &app.login_form;
    let submitting = app.login_submitting();

    let [column] = Layout::horizontal([Constraint::Length(FORM_WIDTH)])
        .flex(Flex::Center)
        .areas(area);
    let [panel] = Layout::vertical([Constraint::Length(2 * FIELD_HEIGHT + BUTTON_HEIGHT + 4)])
        .flex(Flex::Center)
        .areas(column);

    let block = Block::default()
        .title(format!(" {} ", View::Login.title()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(panel);
    frame.render_widget(block, panel);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(FIELD_HEIGHT),  // Email
            Constraint::Length(FIELD_HEIGHT),  // Password
            Constraint::Length(BUTTON_HEIGHT), // Sign in
            Constraint::Length(1),             // Help
        ])
        .horizontal_margin(1)
        .split(inner);

    draw_field(
        frame,
        chunks[0],
        &form.email,
        form.active_field() == 0,
        form.error_for(FieldName::Email),
    );
    draw_field(
        frame,
        chunks[1],
        &form.password,
        form.active_field() == 1,
        form.error_for(FieldName::Password),
    );

    let label = if submitting { "Signing in…" } else { "Sign In" };
    render_button(
        frame,
        chunks[2],
        label,
        form.is_buttons_row_active(),
        !submitting,
        Some(Color::Green),
    );

    draw_help_text(
        frame,
        chunks[3],
        &[("Tab", "next"), ("Enter", "sign in"), (SUBMIT_SHORTCUT, "sign in")],
    );
}
