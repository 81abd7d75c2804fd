//! UI module for rendering the TUI

mod components;
mod forms;
mod layout;
mod policies;

use crate::app::App;
use crate::state::View;
use ratatui::Frame;

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
    let (main_area, status_area) = layout::create_layout(frame.area());

    // Draw main content based on current view
    match &app.state.current_view {
        View::Login => forms::draw_login(frame, main_area, app),
        View::Policies => policies::draw_list(frame, main_area, app),
        View::PolicyCreate => forms::draw_policy_create(frame, main_area, app),
    }

    layout::draw_status_bar(frame, status_area, app);

    // Error dialog is modal and drawn last
    if let Some(error) = app.notices.current_error() {
        components::render_error_dialog(frame, error, app.notices.error_count());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{MockAuthService, MockPolicyService};
    use crate::config::TuiConfig;
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;

    fn render(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| draw(frame, app)).unwrap();
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn app() -> App {
        let mut auth = MockAuthService::new();
        auth.expect_current_user().returning(|| None);
        App::with_services(
            Arc::new(auth),
            Arc::new(MockPolicyService::new()),
            TuiConfig::default(),
        )
    }

    #[test]
    fn test_login_screen_renders() {
        let screen = render(&app());
        assert!(screen.contains("Sign In"));
        assert!(screen.contains("Email"));
        assert!(screen.contains("signed out"));
    }

    #[test]
    fn test_field_error_is_visible() {
        let mut app = app();
        app.state.navigate(View::PolicyCreate);
        app.policy_form.errors.insert(
            crate::state::FieldName::Value,
            "Value must be a positive number".to_string(),
        );
        let screen = render(&app);
        assert!(screen.contains("Value must be a positive number"));
    }

    #[test]
    fn test_error_dialog_overlays() {
        let mut app = app();
        app.notices.push_error("duplicate policy");
        let screen = render(&app);
        assert!(screen.contains("duplicate policy"));
        assert!(screen.contains("to dismiss"));
    }

    #[test]
    fn test_empty_policy_list_hint() {
        let mut app = app();
        app.state.navigate(View::Policies);
        let screen = render(&app);
        assert!(screen.contains("No policies yet."));
    }
}
