use rand::Rng;

use crate::config::GridSize;
use crate::snake::{Position, Snake};

/// Random draws attempted before falling back to a scan of free cells.
pub const MAX_SAMPLE_ATTEMPTS: usize = 256;

/// Food entity currently active on the board.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Food {
    pub position: Position,
}

impl Food {
    #[must_use]
    pub fn new(position: Position) -> Self {
        Self { position }
    }

    /// Spawns food in an unoccupied cell, or `None` when the snake fills the
    /// grid.
    #[must_use]
    pub fn spawn<R: Rng + ?Sized>(rng: &mut R, bounds: GridSize, snake: &Snake) -> Option<Self> {
        spawn_position(rng, bounds, snake).map(Self::new)
    }
}

/// Picks a uniformly random cell that is not occupied by the snake.
///
/// Uses rejection sampling first; a crowded board falls back to choosing
/// among the explicit set of free cells so the call always terminates.
#[must_use]
pub fn spawn_position<R: Rng + ?Sized>(
    rng: &mut R,
    bounds: GridSize,
    snake: &Snake,
) -> Option<Position> {
    if bounds.total_cells() == 0 || snake.len() >= bounds.total_cells() {
        return None;
    }

    for _ in 0..MAX_SAMPLE_ATTEMPTS {
        let position = random_cell(rng, bounds);
        if !snake.occupies(position) {
            return Some(position);
        }
    }

    log::debug!(
        "rejection sampling exhausted on {}x{} grid with {} segments",
        bounds.width,
        bounds.height,
        snake.len()
    );

    let candidates: Vec<Position> = (0..i32::from(bounds.height))
        .flat_map(|y| (0..i32::from(bounds.width)).map(move |x| Position { x, y }))
        .filter(|position| !snake.occupies(*position))
        .collect();

    if candidates.is_empty() {
        return None;
    }
    Some(candidates[rng.gen_range(0..candidates.len())])
}

fn random_cell<R: Rng + ?Sized>(rng: &mut R, bounds: GridSize) -> Position {
    Position {
        x: rng.gen_range(0..i32::from(bounds.width)),
        y: rng.gen_range(0..i32::from(bounds.height)),
    }
}
