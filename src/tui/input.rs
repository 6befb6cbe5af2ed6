use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

use crate::direction::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Press(Direction),
    Release(Direction),
    Quit,
    /// Any other key going down; used to restart after a round ends.
    Other,
    Ignore,
}

fn direction_for(code: KeyCode) -> Option<Direction> {
    match code {
        KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('w') => Some(Direction::North),
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('d') => Some(Direction::East),
        KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('s') => Some(Direction::South),
        KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('a') => Some(Direction::West),
        _ => None,
    }
}

/// Maps a key event onto a game command. Repeats never move the player:
/// holding a key counts as one press.
pub fn translate(key: KeyEvent) -> Command {
    match (key.kind, key.code) {
        (KeyEventKind::Press, KeyCode::Char('q') | KeyCode::Esc) => Command::Quit,
        (KeyEventKind::Press, code) => direction_for(code).map_or(Command::Other, Command::Press),
        (KeyEventKind::Release, code) => {
            direction_for(code).map_or(Command::Ignore, Command::Release)
        }
        (KeyEventKind::Repeat, _) => Command::Ignore,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode, kind: KeyEventKind) -> KeyEvent {
        KeyEvent::new_with_kind(code, KeyModifiers::NONE, kind)
    }

    #[test]
    fn arrows_and_letters_map_to_directions() {
        assert_eq!(
            translate(key(KeyCode::Up, KeyEventKind::Press)),
            Command::Press(Direction::North)
        );
        assert_eq!(
            translate(key(KeyCode::Char('h'), KeyEventKind::Press)),
            Command::Press(Direction::West)
        );
        assert_eq!(
            translate(key(KeyCode::Char('s'), KeyEventKind::Release)),
            Command::Release(Direction::South)
        );
    }

    #[test]
    fn repeats_and_stray_releases_are_ignored() {
        assert_eq!(
            translate(key(KeyCode::Right, KeyEventKind::Repeat)),
            Command::Ignore
        );
        assert_eq!(
            translate(key(KeyCode::Char('q'), KeyEventKind::Release)),
            Command::Ignore
        );
    }

    #[test]
    fn quit_and_other_keys() {
        assert_eq!(translate(key(KeyCode::Esc, KeyEventKind::Press)), Command::Quit);
        assert_eq!(
            translate(key(KeyCode::Char(' '), KeyEventKind::Press)),
            Command::Other
        );
    }
}
