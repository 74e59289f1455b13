// Key press -> servo command mapping
//
// Single: Up/Down step the position by `vel_mult`; any other key resends it.
// Triple: Up/Down = servo 0, Right/Left = servo 1, PageUp/PageDown = servo 2.
// q, Esc or Ctrl-C quits in both modes.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::protocol::ServoCommand;
use crate::config::{SERVO_CENTER_DEG, SERVO_MAX_DEG, SERVO_MIN_DEG};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum TeleopMode {
    /// One servo, decimal text protocol
    #[default]
    Single,
    /// Three servos, 3-byte position protocol
    Triple,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Send(ServoCommand),
    Quit,
    Ignore,
}

#[derive(Debug, Clone)]
pub struct TeleopState {
    mode: TeleopMode,
    vel_mult: i32,
    position: i32,
    angles: [u8; 3],
}

impl TeleopState {
    pub fn new(mode: TeleopMode, vel_mult: i32) -> Self {
        Self {
            mode,
            vel_mult,
            position: 0,
            angles: [SERVO_CENTER_DEG; 3],
        }
    }

    /// Command reflecting the current state (also sent once on start)
    pub fn current_command(&self) -> ServoCommand {
        match self.mode {
            TeleopMode::Single => ServoCommand::Single(self.position),
            TeleopMode::Triple => ServoCommand::Position(self.angles),
        }
    }

    pub fn on_key(&mut self, key: &KeyEvent) -> KeyAction {
        if !matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
            return KeyAction::Ignore;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return KeyAction::Quit,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return KeyAction::Quit;
            }
            _ => {}
        }

        match self.mode {
            TeleopMode::Single => {
                let change = match key.code {
                    KeyCode::Up => 1,
                    KeyCode::Down => -1,
                    _ => 0,
                };
                self.position = self
                    .position
                    .saturating_add(self.vel_mult.saturating_mul(change));
            }
            TeleopMode::Triple => {
                let step = match key.code {
                    KeyCode::Up => Some((0, 1)),
                    KeyCode::Down => Some((0, -1)),
                    KeyCode::Right => Some((1, 1)),
                    KeyCode::Left => Some((1, -1)),
                    KeyCode::PageUp => Some((2, 1)),
                    KeyCode::PageDown => Some((2, -1)),
                    _ => None,
                };
                if let Some((axis, dir)) = step {
                    let target = i32::from(self.angles[axis])
                        .saturating_add(self.vel_mult.saturating_mul(dir));
                    self.angles[axis] =
                        target.clamp(i32::from(SERVO_MIN_DEG), i32::from(SERVO_MAX_DEG)) as u8;
                }
            }
        }

        KeyAction::Send(self.current_command())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_single_steps_by_multiplier() {
        let mut state = TeleopState::new(TeleopMode::Single, 2);
        assert_eq!(state.current_command(), ServoCommand::Single(0));

        let sent: Vec<KeyAction> = [KeyCode::Up, KeyCode::Up, KeyCode::Down]
            .into_iter()
            .map(|k| state.on_key(&press(k)))
            .collect();
        assert_eq!(
            sent,
            vec![
                KeyAction::Send(ServoCommand::Single(2)),
                KeyAction::Send(ServoCommand::Single(4)),
                KeyAction::Send(ServoCommand::Single(2)),
            ]
        );
    }

    #[test]
    fn test_single_other_keys_resend() {
        let mut state = TeleopState::new(TeleopMode::Single, 3);
        state.on_key(&press(KeyCode::Down));
        assert_eq!(
            state.on_key(&press(KeyCode::Char('x'))),
            KeyAction::Send(ServoCommand::Single(-3))
        );
    }

    #[test]
    fn test_triple_axes_and_clamp() {
        let mut state = TeleopState::new(TeleopMode::Triple, 50);
        assert_eq!(state.current_command(), ServoCommand::Position([90, 90, 90]));

        state.on_key(&press(KeyCode::Up));
        assert_eq!(
            state.on_key(&press(KeyCode::Up)),
            KeyAction::Send(ServoCommand::Position([180, 90, 90]))
        );

        state.on_key(&press(KeyCode::Left));
        state.on_key(&press(KeyCode::Left));
        assert_eq!(
            state.on_key(&press(KeyCode::PageDown)),
            KeyAction::Send(ServoCommand::Position([180, 0, 40]))
        );
    }

    #[test]
    fn test_extreme_multiplier_saturates() {
        let mut state = TeleopState::new(TeleopMode::Triple, i32::MAX);
        assert_eq!(
            state.on_key(&press(KeyCode::Up)),
            KeyAction::Send(ServoCommand::Position([180, 90, 90]))
        );
        assert_eq!(
            state.on_key(&press(KeyCode::Left)),
            KeyAction::Send(ServoCommand::Position([180, 0, 90]))
        );

        let mut state = TeleopState::new(TeleopMode::Single, i32::MIN);
        assert_eq!(
            state.on_key(&press(KeyCode::Down)),
            KeyAction::Send(ServoCommand::Single(i32::MAX))
        );
        assert_eq!(
            state.on_key(&press(KeyCode::Up)),
            KeyAction::Send(ServoCommand::Single(-1))
        );
    }

    #[test]
    fn test_quit_keys() {
        for mode in [TeleopMode::Single, TeleopMode::Triple] {
            let mut state = TeleopState::new(mode, 2);
            assert_eq!(state.on_key(&press(KeyCode::Char('q'))), KeyAction::Quit);
            assert_eq!(state.on_key(&press(KeyCode::Esc)), KeyAction::Quit);
            let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
            assert_eq!(state.on_key(&ctrl_c), KeyAction::Quit);
        }
    }

    #[test]
    fn test_release_ignored() {
        let mut state = TeleopState::new(TeleopMode::Single, 2);
        let release = KeyEvent::new_with_kind(KeyCode::Up, KeyModifiers::NONE, KeyEventKind::Release);
        assert_eq!(state.on_key(&release), KeyAction::Ignore);
        assert_eq!(state.current_command(), ServoCommand::Single(0));
    }
}
