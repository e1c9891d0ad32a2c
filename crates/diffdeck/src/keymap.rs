//! Keyboard input to review commands.

use diffdeck_engine::{FooterHint, ReviewAction};
use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// What a key press asks the host to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Quit,
    Reload,
    /// Discard needs a second press before it reaches the engine.
    RequestDiscard,
    Review(ReviewAction),
}

/// Map a key press to a command, if it is bound.
pub fn map_key(key: KeyEvent) -> Option<Command> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(Command::Quit),
            KeyCode::Char('d') => Some(Command::Review(ReviewAction::ScrollPageDown)),
            KeyCode::Char('u') => Some(Command::Review(ReviewAction::ScrollPageUp)),
            _ => None,
        };
    }

    let action = match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return Some(Command::Quit),
        KeyCode::Char('R') => return Some(Command::Reload),
        KeyCode::Char('d') => return Some(Command::RequestDiscard),
        KeyCode::Char('j') | KeyCode::Down => ReviewAction::ScrollDown(1),
        KeyCode::Char('k') | KeyCode::Up => ReviewAction::ScrollUp(1),
        KeyCode::PageDown => ReviewAction::ScrollPageDown,
        KeyCode::PageUp => ReviewAction::ScrollPageUp,
        KeyCode::Char('g') | KeyCode::Home => ReviewAction::ScrollTop,
        KeyCode::Char('G') | KeyCode::End => ReviewAction::ScrollBottom,
        KeyCode::Char(' ') | KeyCode::Enter => ReviewAction::ToggleExpand,
        KeyCode::Char('f') => ReviewAction::ToggleFullView,
        KeyCode::Char('v') => ReviewAction::ToggleViewed,
        KeyCode::Char('u') => ReviewAction::UndoViewed,
        KeyCode::Char('E') => ReviewAction::ExpandAll,
        KeyCode::Char('C') => ReviewAction::CollapseAll,
        KeyCode::Char('A') => ReviewAction::MarkAllViewed,
        KeyCode::Char('U') => ReviewAction::MarkAllUnviewed,
        KeyCode::Char('n') => ReviewAction::FocusNextUnviewed,
        KeyCode::Char('o') => ReviewAction::OpenInEditor,
        KeyCode::Char('r') => ReviewAction::RevealFile,
        _ => return None,
    };
    Some(Command::Review(action))
}

/// Hints shown at the bottom of the file list.
pub fn footer_hints() -> Vec<FooterHint> {
    vec![
        FooterHint::new("j/k", "Scroll"),
        FooterHint::new("Space", "Expand"),
        FooterHint::new("f", "Full"),
        FooterHint::new("v", "Viewed"),
        FooterHint::new("u", "Undo"),
        FooterHint::new("n", "Next"),
        FooterHint::new("E/C", "All"),
        FooterHint::new("q", "Quit"),
    ]
}
