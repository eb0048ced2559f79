//! Operator input
//!
//! The key register is polled once per tick. Edge detection happens here,
//! not in the input source.

bitflags::bitflags! {
    /// Buttons in key register bit order
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Buttons: u16 {
        const A = 1 << 0;
        const B = 1 << 1;
        const SELECT = 1 << 2;
        const START = 1 << 3;
        const RIGHT = 1 << 4;
        const LEFT = 1 << 5;
        const UP = 1 << 6;
        const DOWN = 1 << 7;
        const R = 1 << 8;
        const L = 1 << 9;
    }
}

impl Buttons {
    /// Decode the raw key register (active-low: a cleared bit is a held key)
    pub fn from_key_register(raw: u16) -> Self {
        Self::from_bits_truncate(!raw)
    }

    /// Look up a single button by its lowercase name
    pub fn from_label(name: &str) -> Option<Self> {
        let button = match name {
            "a" => Self::A,
            "b" => Self::B,
            "select" => Self::SELECT,
            "start" => Self::START,
            "right" => Self::RIGHT,
            "left" => Self::LEFT,
            "up" => Self::UP,
            "down" => Self::DOWN,
            "r" => Self::R,
            "l" => Self::L,
            "idle" | "none" => Self::empty(),
            _ => return None,
        };
        Some(button)
    }
}

/// Buttons that should act this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputEdges(Buttons);

impl InputEdges {
    /// Newly pressed buttons, plus held buttons in `repeat_mask`
    pub fn compute(current: Buttons, previous: Buttons, repeat_mask: Buttons) -> Self {
        let fresh = current & !previous;
        let repeating = current & repeat_mask;
        Self(fresh | repeating)
    }

    pub fn buttons(&self) -> Buttons {
        self.0
    }

    pub fn contains(&self, button: Buttons) -> bool {
        self.0.contains(button)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A single navigation action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavCommand {
    ToggleLock,
    TogglePause,
    /// Step forward; `tail` starts the track near its end
    NextTrack { tail: bool },
    PreviousTrack { tail: bool },
    SeekBackward,
    SeekForward,
}

impl NavCommand {
    /// Pick at most one command from the tick's edges
    ///
    /// SELECT always toggles the lock. While locked nothing else acts. A
    /// track step taken while L is `held` lands near the end of the track.
    pub fn from_edges(edges: InputEdges, held: Buttons, locked: bool) -> Option<Self> {
        if edges.contains(Buttons::SELECT) {
            return Some(Self::ToggleLock);
        }
        if locked {
            return None;
        }

        let tail = held.contains(Buttons::L);
        let priority = [
            (Buttons::START, NavCommand::TogglePause),
            (Buttons::RIGHT, NavCommand::NextTrack { tail }),
            (Buttons::LEFT, NavCommand::PreviousTrack { tail }),
            (Buttons::L, NavCommand::SeekBackward),
            (Buttons::R, NavCommand::SeekForward),
        ];
        priority
            .iter()
            .find(|(button, _)| edges.contains(*button))
            .map(|&(_, command)| command)
    }
}
