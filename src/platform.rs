//! Platform-specific configuration

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Platform-appropriate modifier for form shortcuts
/// - macOS: SUPER (Cmd key)
/// - Linux/Windows: CONTROL (Ctrl key)
#[cfg(target_os = "macos")]
pub const SHORTCUT_MODIFIER: KeyModifiers = KeyModifiers::SUPER;

#[cfg(not(target_os = "macos"))]
pub const SHORTCUT_MODIFIER: KeyModifiers = KeyModifiers::CONTROL;

/// Submit shortcut display for form help text
/// Ctrl+S works on all platforms (Cmd+S also works on macOS)
pub const SUBMIT_SHORTCUT: &str = "Ctrl+S";

/// Whether the key submits the focused form
pub fn is_submit_shortcut(key: &KeyEvent) -> bool {
    key.code == KeyCode::Char('s')
        && (key.modifiers.contains(KeyModifiers::CONTROL)
            || key.modifiers.contains(SHORTCUT_MODIFIER))
}
