//! Policy create form rendering

use super::field_renderer::{draw_field, draw_help_text, FIELD_HEIGHT};
use crate::app::App;
use crate::platform::SUBMIT_SHORTCUT;
use crate::state::{Form, PolicyForm, PolicyFormButton, View};
use crate::ui::components::{render_button, BUTTON_HEIGHT};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders},
    Frame,
};

/// Draw the policy create form: inputs in two columns, actions below
pub fn draw_policy_create(frame: &mut Frame, area: Rect, app: &App) {
    let form = &app.policy_form;
    let submitting = app.policy_submitting();

    let border_color = if form.is_buttons_row_active() {
        Color::DarkGray
    } else {
        Color::Cyan
    };
    let block = Block::default()
        .title(format!(" {} ", View::PolicyCreate.title()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(FIELD_HEIGHT),  // Name | Company
            Constraint::Length(FIELD_HEIGHT),  // Value | Premium
            Constraint::Length(FIELD_HEIGHT),  // Start | End
            Constraint::Length(FIELD_HEIGHT),  // Nominees
            Constraint::Length(BUTTON_HEIGHT), // Actions
            Constraint::Min(0),
            Constraint::Length(1), // Help
        ])
        .margin(1)
        .split(inner);

    let fields = (0..PolicyForm::BUTTONS_ROW).filter_map(|index| form.get_field(index));
    for (index, field) in fields.enumerate() {
        let row = rows[index / 2];
        let [left, right] =
            Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
                .spacing(1)
                .areas(row);
        let cell = if index % 2 == 0 { left } else { right };
        draw_field(
            frame,
            cell,
            field,
            form.active_field() == index,
            form.error_for(field.name),
        );
    }

    draw_actions(frame, rows[4], form, submitting);

    draw_help_text(
        frame,
        rows[6],
        &[
            ("Tab", "next field"),
            ("Shift+Tab", "previous"),
            (SUBMIT_SHORTCUT, "submit"),
            ("Esc", "cancel"),
        ],
    );
}

fn draw_actions(frame: &mut Frame, area: Rect, form: &PolicyForm, submitting: bool) {
    let [submit_area, cancel_area, _] = Layout::horizontal([
        Constraint::Length(18),
        Constraint::Length(12),
        Constraint::Min(0),
    ])
    .spacing(1)
    .areas(area);

    let focused = form.is_buttons_row_active();
    let submit_label = if submitting { "Submitting…" } else { "Create" };
    render_button(
        frame,
        submit_area,
        submit_label,
        focused && form.selected_button == PolicyFormButton::Submit,
        !submitting,
        Some(Color::Green),
    );
    render_button(
        frame,
        cancel_area,
        "Cancel",
        focused && form.selected_button == PolicyFormButton::Cancel,
        true,
        None,
    );
}
