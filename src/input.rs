use std::io;
use std::time::Duration;

use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};

/// Minimum drag distance, in grid cells, that counts as a swipe.
pub const SWIPE_THRESHOLD_CELLS: i32 = 1;

/// Canonical movement directions for snake input.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Returns the opposite direction.
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Unit step `(dx, dy)` in grid coordinates; y grows downwards.
    #[must_use]
    pub fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }
}

/// High-level input events consumed by the game loop.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum GameInput {
    Direction(Direction),
    TogglePause,
    Confirm,
    Restart,
    CycleDifficulty,
    Quit,
}

impl GameInput {
    /// Maps a terminal key press into the game vocabulary.
    #[must_use]
    pub fn from_key_event(event: KeyEvent) -> Option<Self> {
        if event.kind == KeyEventKind::Release {
            return None;
        }

        match (event.modifiers, event.code) {
            (KeyModifiers::CONTROL, KeyCode::Char('c')) => Some(Self::Quit),
            // Chords belong to the terminal; only Shift passes through.
            (modifiers, _) if !modifiers.difference(KeyModifiers::SHIFT).is_empty() => None,
            (_, KeyCode::Up | KeyCode::Char('w' | 'W')) => Some(Self::Direction(Direction::Up)),
            (_, KeyCode::Down | KeyCode::Char('s' | 'S')) => {
                Some(Self::Direction(Direction::Down))
            }
            (_, KeyCode::Left | KeyCode::Char('a' | 'A')) => {
                Some(Self::Direction(Direction::Left))
            }
            (_, KeyCode::Right | KeyCode::Char('d' | 'D')) => {
                Some(Self::Direction(Direction::Right))
            }
            (_, KeyCode::Char('p' | 'P')) => Some(Self::TogglePause),
            (_, KeyCode::Enter | KeyCode::Char(' ')) => Some(Self::Confirm),
            (_, KeyCode::Char('r' | 'R')) => Some(Self::Restart),
            (_, KeyCode::Tab) => Some(Self::CycleDifficulty),
            (_, KeyCode::Esc | KeyCode::Char('q' | 'Q')) => Some(Self::Quit),
            _ => None,
        }
    }
}

/// Returns whether a direction change is legal (no immediate 180° turns).
#[must_use]
pub fn direction_change_is_valid(current: Direction, next: Direction) -> bool {
    next != current.opposite()
}

/// Classifies a drag vector by its dominant axis.
///
/// Returns `None` when the dominant component does not exceed `threshold`.
/// Ties go to the vertical axis.
#[must_use]
pub fn swipe_direction(dx: i32, dy: i32, threshold: i32) -> Option<Direction> {
    if dx.abs() > dy.abs() {
        if dx > threshold {
            Some(Direction::Right)
        } else if dx < -threshold {
            Some(Direction::Left)
        } else {
            None
        }
    } else if dy > threshold {
        Some(Direction::Down)
    } else if dy < -threshold {
        Some(Direction::Up)
    } else {
        None
    }
}

/// Turns left-button press/release pairs into swipe gestures.
#[derive(Debug, Clone, Copy, Default)]
pub struct SwipeTracker {
    start: Option<(u16, u16)>,
}

impl SwipeTracker {
    /// Feeds one mouse event; returns a direction when a swipe completes.
    ///
    /// Terminal cells are drawn two columns wide, so horizontal travel is
    /// halved before classification.
    pub fn track(&mut self, event: MouseEvent) -> Option<Direction> {
        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.start = Some((event.column, event.row));
                None
            }
            MouseEventKind::Up(MouseButton::Left) => {
                let (column, row) = self.start.take()?;
                let dx = (i32::from(event.column) - i32::from(column)) / 2;
                let dy = i32::from(event.row) - i32::from(row);
                swipe_direction(dx, dy, SWIPE_THRESHOLD_CELLS)
            }
            _ => None,
        }
    }
}

/// Polls crossterm for keyboard and mouse input.
#[derive(Debug, Default)]
pub struct InputHandler {
    swipe: SwipeTracker,
}

impl InputHandler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits up to `timeout` for one event and translates it.
    pub fn poll_input(&mut self, timeout: Duration) -> io::Result<Option<GameInput>> {
        if !event::poll(timeout)? {
            return Ok(None);
        }

        let input = match event::read()? {
            Event::Key(key) => GameInput::from_key_event(key),
            Event::Mouse(mouse) => self.swipe.track(mouse).map(GameInput::Direction),
            _ => None,
        };
        Ok(input)
    }
}
