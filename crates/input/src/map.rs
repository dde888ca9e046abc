//! Key mapping from terminal events to engine commands.

use crate::types::Command;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Map a key press to a command.
///
/// Key releases are ignored so terminals reporting both edges do not act
/// twice.
pub fn handle_key_event(key: KeyEvent) -> Option<Command> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if should_quit(key) {
        return Some(Command::Quit);
    }

    match key.code {
        KeyCode::Left | KeyCode::Char('h' | 'H' | 'a' | 'A') => Some(Command::MoveLeft),
        KeyCode::Right | KeyCode::Char('l' | 'L' | 'd' | 'D') => Some(Command::MoveRight),
        KeyCode::Up | KeyCode::Char('k' | 'K' | 'w' | 'W') => Some(Command::RotateForward),
        KeyCode::Char('z' | 'Z') => Some(Command::RotateBackward),
        KeyCode::Down | KeyCode::Char('j' | 'J' | 's' | 'S' | ' ') => Some(Command::Drop),
        _ => None,
    }
}

/// Check if key should quit the game.
pub fn should_quit(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc)
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyEventState, KeyModifiers};

    #[test]
    fn test_movement_keys() {
        for code in [KeyCode::Left, KeyCode::Char('h'), KeyCode::Char('A')] {
            assert_eq!(handle_key_event(KeyEvent::from(code)), Some(Command::MoveLeft));
        }
        for code in [KeyCode::Right, KeyCode::Char('L'), KeyCode::Char('d')] {
            assert_eq!(handle_key_event(KeyEvent::from(code)), Some(Command::MoveRight));
        }
    }

    #[test]
    fn test_rotation_keys() {
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Up)),
            Some(Command::RotateForward)
        );
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Char('w'))),
            Some(Command::RotateForward)
        );
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Char('Z'))),
            Some(Command::RotateBackward)
        );
    }

    #[test]
    fn test_drop_keys() {
        for code in [
            KeyCode::Down,
            KeyCode::Char('j'),
            KeyCode::Char('S'),
            KeyCode::Char(' '),
        ] {
            assert_eq!(handle_key_event(KeyEvent::from(code)), Some(Command::Drop));
        }
    }

    #[test]
    fn test_quit_keys() {
        assert!(should_quit(KeyEvent::from(KeyCode::Char('q'))));
        assert!(should_quit(KeyEvent::from(KeyCode::Esc)));
        assert!(should_quit(KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL
        )));
        assert!(!should_quit(KeyEvent::from(KeyCode::Char('c'))));
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Esc)),
            Some(Command::Quit)
        );
    }

    #[test]
    fn test_release_and_unknown_keys_ignored() {
        let release = KeyEvent {
            code: KeyCode::Left,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert_eq!(handle_key_event(release), None);
        assert_eq!(handle_key_event(KeyEvent::from(KeyCode::Char('x'))), None);
        assert_eq!(handle_key_event(KeyEvent::from(KeyCode::Tab)), None);
    }
}
