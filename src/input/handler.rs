use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::game::{Direction, GameEvent};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    GameAction(GameEvent),
    Quit,
    None,
}

pub struct InputHandler;

impl InputHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn handle_key_event(&self, key: KeyEvent) -> KeyAction {
        // Only presses drive the game; releases and auto-repeat do not
        if key.kind != KeyEventKind::Press {
            return KeyAction::None;
        }

        // Handle Ctrl+C
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return KeyAction::Quit;
        }

        match key.code {
            // Movement - Arrow keys
            KeyCode::Up => Self::turn(Direction::Up),
            KeyCode::Down => Self::turn(Direction::Down),
            KeyCode::Left => Self::turn(Direction::Left),
            KeyCode::Right => Self::turn(Direction::Right),

            // Movement - WASD
            KeyCode::Char('w') | KeyCode::Char('W') => Self::turn(Direction::Up),
            KeyCode::Char('s') | KeyCode::Char('S') => Self::turn(Direction::Down),
            KeyCode::Char('a') | KeyCode::Char('A') => Self::turn(Direction::Left),
            KeyCode::Char('d') | KeyCode::Char('D') => Self::turn(Direction::Right),

            // Controls
            KeyCode::Char(' ') | KeyCode::Char('p') | KeyCode::Char('P') => {
                KeyAction::GameAction(GameEvent::TogglePause)
            }
            KeyCode::Char('r') | KeyCode::Char('R') => KeyAction::GameAction(GameEvent::Reset),
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => KeyAction::Quit,

            _ => KeyAction::None,
        }
    }

    fn turn(direction: Direction) -> KeyAction {
        KeyAction::GameAction(direction.into())
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}
