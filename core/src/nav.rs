//! Navigation state
//!
//! Track index, pause, input lock and the previous input snapshot. Only the
//! scheduler mutates it, and only in response to input edges.

use crate::input::{Buttons, InputEdges, NavCommand};

/// Index after `current`, wrapping to 0
pub fn next_index(current: usize, count: usize) -> usize {
    if count == 0 { 0 } else { (current + 1) % count }
}

/// Index before `current`, wrapping to the last track
pub fn prev_index(current: usize, count: usize) -> usize {
    if count == 0 {
        0
    } else if current == 0 {
        count - 1
    } else {
        (current - 1).min(count - 1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationState {
    pub current_track: usize,
    pub track_count: usize,
    pub paused: bool,
    pub input_locked: bool,
    pub last_input: Buttons,
}

impl NavigationState {
    pub fn new(track_count: usize) -> Self {
        Self {
            current_track: 0,
            track_count,
            paused: false,
            input_locked: false,
            last_input: Buttons::empty(),
        }
    }

    /// Record this tick's input and pick the command it triggers
    pub fn observe(&mut self, input: Buttons, repeat_mask: Buttons) -> Option<NavCommand> {
        let edges = InputEdges::compute(input, self.last_input, repeat_mask);
        self.last_input = input;
        NavCommand::from_edges(edges, input, self.input_locked)
    }

    pub fn next_track(&self) -> usize {
        next_index(self.current_track, self.track_count)
    }

    pub fn previous_track(&self) -> usize {
        prev_index(self.current_track, self.track_count)
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        self.paused
    }

    pub fn toggle_lock(&mut self) -> bool {
        self.input_locked = !self.input_locked;
        self.input_locked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wraparound_all_indices() {
        for count in 1..6 {
            assert_eq!(next_index(count - 1, count), 0);
            assert_eq!(prev_index(0, count), count - 1);
            for i in 0..count {
                assert_eq!(prev_index(next_index(i, count), count), i);
            }
        }
    }

    #[test]
    fn test_single_track_wraps_to_itself() {
        assert_eq!(next_index(0, 1), 0);
        assert_eq!(prev_index(0, 1), 0);
    }

    #[test]
    fn test_observe_tracks_last_input() {
        let mut nav = NavigationState::new(3);
        assert_eq!(nav.observe(Buttons::START, Buttons::empty()), Some(NavCommand::TogglePause));
        assert_eq!(nav.observe(Buttons::START, Buttons::empty()), None);
        assert_eq!(nav.last_input, Buttons::START);
        assert_eq!(nav.observe(Buttons::empty(), Buttons::empty()), None);
        assert_eq!(nav.observe(Buttons::START, Buttons::empty()), Some(NavCommand::TogglePause));
    }

    #[test]
    fn test_locked_state_ignores_commands() {
        let mut nav = NavigationState::new(3);
        nav.toggle_lock();
        assert_eq!(nav.observe(Buttons::RIGHT, Buttons::empty()), None);
        assert_eq!(nav.observe(Buttons::SELECT, Buttons::empty()), Some(NavCommand::ToggleLock));
    }
}
