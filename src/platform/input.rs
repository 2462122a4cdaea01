//! Keyboard to game intent mapping
//!
//! Paddle movement is level-triggered: a direction stays active while any
//! key bound to it is held. Launch, pause and
//! restart are edge-triggered: a press is latched until a simulation tick
//! consumes it, so a tap between two ticks is never lost.

use std::collections::HashSet;

use winit::keyboard::KeyCode;

use crate::sim::TickInput;

/// What a key means to the game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Left,
    Right,
    Launch,
    Pause,
    Restart,
    ToggleStats,
    Quit,
}

impl Intent {
    pub fn from_key(key: KeyCode) -> Option<Self> {
        match key {
            KeyCode::ArrowLeft | KeyCode::KeyA => Some(Intent::Left),
            KeyCode::ArrowRight | KeyCode::KeyD => Some(Intent::Right),
            KeyCode::Space | KeyCode::Enter => Some(Intent::Launch),
            KeyCode::KeyP => Some(Intent::Pause),
            KeyCode::KeyR => Some(Intent::Restart),
            KeyCode::F1 => Some(Intent::ToggleStats),
            KeyCode::Escape => Some(Intent::Quit),
            _ => None,
        }
    }
}

/// Keyboard state accumulated between ticks
#[derive(Debug, Clone, Default)]
pub struct InputState {
    /// Movement keys currently down
    held: HashSet<KeyCode>,
    launch: bool,
    pause: bool,
    restart: bool,
    show_stats: bool,
    quit: bool,
}

impl InputState {
    pub fn new(show_stats: bool) -> Self {
        Self {
            show_stats,
            ..Default::default()
        }
    }

    /// Feed a key transition. Key repeats are ignored for one-shot intents.
    pub fn handle_key(&mut self, key: KeyCode, pressed: bool, repeat: bool) {
        let Some(intent) = Intent::from_key(key) else {
            return;
        };
        match intent {
            Intent::Left | Intent::Right => {
                if pressed {
                    self.held.insert(key);
                } else {
                    self.held.remove(&key);
                }
            }
            _ if !pressed || repeat => {}
            Intent::Launch => self.launch = true,
            Intent::Pause => self.pause = true,
            Intent::Restart => self.restart = true,
            Intent::ToggleStats => {
                self.show_stats = !self.show_stats;
                log::debug!("Frame stats {}", if self.show_stats { "on" } else { "off" });
            }
            Intent::Quit => self.quit = true,
        }
    }

    /// Release held keys (focus lost)
    pub fn release_all(&mut self) {
        self.held.clear();
    }

    fn holding(&self, intent: Intent) -> bool {
        self.held
            .iter()
            .any(|&key| Intent::from_key(key) == Some(intent))
    }

    /// Snapshot for the next tick
    pub fn tick_input(&self) -> TickInput {
        TickInput {
            left: self.holding(Intent::Left),
            right: self.holding(Intent::Right),
            launch: self.launch,
            pause: self.pause,
            restart: self.restart,
        }
    }

    /// Clear one-shot inputs after a tick processed them
    pub fn consume_one_shots(&mut self) {
        self.launch = false;
        self.pause = false;
        self.restart = false;
    }

    pub fn show_stats(&self) -> bool {
        self.show_stats
    }

    pub fn quit_requested(&self) -> bool {
        self.quit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_held_keys_follow_transitions() {
        let mut input = InputState::default();
        input.handle_key(KeyCode::ArrowLeft, true, false);
        input.handle_key(KeyCode::KeyD, true, false);
        let t = input.tick_input();
        assert!(t.left && t.right);

        input.handle_key(KeyCode::ArrowLeft, false, false);
        assert!(!input.tick_input().left);
        assert!(input.tick_input().right);
    }

    #[test]
    fn test_direction_held_while_any_bound_key_down() {
        let mut input = InputState::default();
        input.handle_key(KeyCode::ArrowLeft, true, false);
        input.handle_key(KeyCode::KeyA, true, false);
        input.handle_key(KeyCode::KeyA, false, false);
        assert!(input.tick_input().left, "arrow still held");

        input.handle_key(KeyCode::ArrowLeft, false, false);
        assert!(!input.tick_input().left);

        // Repeats of a held key keep it down
        input.handle_key(KeyCode::KeyD, true, false);
        input.handle_key(KeyCode::KeyD, true, true);
        input.handle_key(KeyCode::ArrowRight, false, false);
        assert!(input.tick_input().right);
    }

    #[test]
    fn test_one_shots_latch_until_consumed() {
        let mut input = InputState::default();
        input.handle_key(KeyCode::Space, true, false);
        input.handle_key(KeyCode::Space, false, false);
        assert!(input.tick_input().launch);

        input.consume_one_shots();
        assert!(!input.tick_input().launch);

        input.handle_key(KeyCode::KeyP, true, true);
        assert!(!input.tick_input().pause, "repeats don't retrigger");
    }

    #[test]
    fn test_stats_toggle_and_quit() {
        let mut input = InputState::new(true);
        input.handle_key(KeyCode::F1, true, false);
        assert!(!input.show_stats());
        input.handle_key(KeyCode::F1, false, false);
        assert!(!input.show_stats());

        assert!(!input.quit_requested());
        input.handle_key(KeyCode::Escape, true, false);
        assert!(input.quit_requested());
    }

    #[test]
    fn test_release_all() {
        let mut input = InputState::default();
        input.handle_key(KeyCode::KeyA, true, false);
        input.release_all();
        assert_eq!(input.tick_input(), TickInput::default());
        assert_eq!(Intent::from_key(KeyCode::KeyQ), None);
    }
}
