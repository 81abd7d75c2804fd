//! Policy list view

use crate::app::App;
use crate::state::{PolicyResource, PolicyStatus, View};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

/// Draw the policy table with a summary header
pub fn draw_list(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .title(format!(" {} ", View::Policies.title()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    if app.state.policies.is_empty() {
        let message = if app.state.policies_loading {
            "Loading policies…"
        } else {
            "No policies yet.\nPress 'n' to create one."
        };
        let content = Paragraph::new(message)
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(content, area);
        return;
    }

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(0)])
        .split(inner);

    let mut summary = vec![
        Span::styled(
            format!("{} policies", app.state.policies.len()),
            Style::default().fg(Color::Cyan),
        ),
        Span::raw(" | "),
        Span::styled(
            format!("total value {}", format_amount(app.state.total_value())),
            Style::default().fg(Color::DarkGray),
        ),
    ];
    if let Some(selected) = app.state.selected_policy() {
        summary.push(Span::raw(" | "));
        summary.push(Span::styled(
            format!("id {}", selected.id),
            Style::default().fg(Color::DarkGray),
        ));
    }
    if app.state.policies_loading {
        summary.push(Span::styled(" | refreshing…", Style::default().fg(Color::Yellow)));
    }
    frame.render_widget(Paragraph::new(Line::from(summary)), chunks[0]);

    let header = Row::new(["Name", "Company", "Value", "Premium", "Term", "Nominees", "Status"])
        .style(Style::default().fg(Color::DarkGray).add_modifier(Modifier::BOLD));
    let rows: Vec<Row> = app.state.policies.iter().map(policy_row).collect();

    let table = Table::new(
        rows,
        [
            Constraint::Min(16),
            Constraint::Min(12),
            Constraint::Length(12),
            Constraint::Length(10),
            Constraint::Length(25),
            Constraint::Length(8),
            Constraint::Length(9),
        ],
    )
    .header(header)
    .row_highlight_style(Style::default().bg(Color::DarkGray))
    .highlight_symbol("▸ ");

    // TableState keeps the selected row in view
    let mut table_state = TableState::default().with_selected(Some(app.state.selected_index));
    frame.render_stateful_widget(table, chunks[1], &mut table_state);
}

fn status_color(status: PolicyStatus) -> Color {
    match status {
        PolicyStatus::Active => Color::Green,
        PolicyStatus::Lapsed => Color::Yellow,
        PolicyStatus::Cancelled | PolicyStatus::Expired => Color::Red,
        PolicyStatus::Other => Color::Gray,
    }
}

fn policy_row(policy: &PolicyResource) -> Row<'_> {
    Row::new(vec![
        Cell::from(policy.name.as_str()),
        Cell::from(policy.company.as_str()),
        Cell::from(format_amount(policy.value)),
        Cell::from(format_amount(policy.premium)),
        Cell::from(policy.term_label()),
        Cell::from(policy.nominees.to_string()),
        Cell::from(Span::styled(
            policy.status.label(),
            Style::default().fg(status_color(policy.status)),
        )),
    ])
}

/// Two decimals with thousands separators
fn format_amount(amount: f64) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::new();
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{sign}{grouped}.{fraction}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(100000.0), "100,000.00");
        assert_eq!(format_amount(50.5), "50.50");
        assert_eq!(format_amount(1234567.891), "1,234,567.89");
        assert_eq!(format_amount(0.0), "0.00");
    }

    #[test]
    fn test_status_colors() {
        assert_eq!(status_color(PolicyStatus::Active), Color::Green);
        assert_eq!(status_color(PolicyStatus::Lapsed), Color::Yellow);
        assert_eq!(status_color(PolicyStatus::Expired), Color::Red);
        assert_eq!(status_color(PolicyStatus::Other), Color::Gray);
    }
}
