//! Input handling

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};

/// Processed input action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Regular character input
    Char(char),
    /// Enter/submit
    Submit,
    /// Backspace
    Backspace,
    /// Delete
    Delete,
    /// Move cursor left
    Left,
    /// Move cursor right
    Right,
    /// Scroll up
    Up,
    /// Scroll down
    Down,
    /// Move to start of line
    Home,
    /// Move to end of line
    End,
    /// Page up
    PageUp,
    /// Page down
    PageDown,
    /// Escape
    Escape,
    /// Ctrl+C (interrupt)
    Interrupt,
    /// Ctrl+D (EOF)
    Eof,
    /// Ctrl+U (clear line)
    ClearLine,
    /// Ctrl+W (delete word)
    DeleteWord,
    /// Paste (from clipboard or bracketed paste)
    Paste(String),
    /// Quit application
    Quit,
    /// Unknown/unhandled
    Unknown,
}

/// Convert a crossterm key event to an action
pub fn key_to_action(event: KeyEvent) -> Action {
    let KeyEvent {
        code, modifiers, ..
    } = event;

    // Handle Ctrl combinations first
    if modifiers.contains(KeyModifiers::CONTROL) {
        return match code {
            KeyCode::Char('c') => Action::Interrupt,
            KeyCode::Char('d') => Action::Eof,
            KeyCode::Char('u') => Action::ClearLine,
            KeyCode::Char('w') => Action::DeleteWord,
            KeyCode::Char('q') => Action::Quit,
            _ => Action::Unknown,
        };
    }

    // Handle Alt combinations
    if modifiers.contains(KeyModifiers::ALT) {
        return Action::Unknown;
    }

    // Regular keys
    match code {
        KeyCode::Char(c) => Action::Char(c),
        KeyCode::Enter => Action::Submit,
        KeyCode::Backspace => Action::Backspace,
        KeyCode::Delete => Action::Delete,
        KeyCode::Left => Action::Left,
        KeyCode::Right => Action::Right,
        KeyCode::Up => Action::Up,
        KeyCode::Down => Action::Down,
        KeyCode::Home => Action::Home,
        KeyCode::End => Action::End,
        KeyCode::PageUp => Action::PageUp,
        KeyCode::PageDown => Action::PageDown,
        KeyCode::Esc => Action::Escape,
        _ => Action::Unknown,
    }
}

/// Convert a crossterm event to an action
pub fn event_to_action(event: Event) -> Option<Action> {
    match event {
        Event::Key(key_event) => Some(key_to_action(key_event)),
        Event::Paste(text) => Some(Action::Paste(text)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_enter_submits() {
        assert_eq!(
            key_to_action(key(KeyCode::Enter, KeyModifiers::NONE)),
            Action::Submit
        );
    }

    #[test]
    fn test_ctrl_c_interrupts() {
        assert_eq!(
            key_to_action(key(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Action::Interrupt
        );
    }

    #[test]
    fn test_plain_char_passes_through() {
        assert_eq!(
            key_to_action(key(KeyCode::Char('c'), KeyModifiers::NONE)),
            Action::Char('c')
        );
    }

    #[test]
    fn test_paste_event_carries_text() {
        assert_eq!(
            event_to_action(Event::Paste("hello".to_string())),
            Some(Action::Paste("hello".to_string()))
        );
    }
}
