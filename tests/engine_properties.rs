use std::collections::HashSet;
use std::time::Duration;

use grid_snake::config::{EngineConfig, GridSize, SPEED_FLOOR_MS};
use grid_snake::game::{Engine, RunState};
use grid_snake::input::Direction;
use grid_snake::snake::Position;
use proptest::prelude::*;

#[derive(Debug, Clone, Copy)]
enum Action {
    Turn(Direction),
    TowardFood,
    Step,
    Advance(u64),
    PauseResume,
}

fn direction() -> impl Strategy<Value = Direction> {
    prop_oneof![
        Just(Direction::Up),
        Just(Direction::Down),
        Just(Direction::Left),
        Just(Direction::Right),
    ]
}

fn action() -> impl Strategy<Value = Action> {
    prop_oneof![
        2 => direction().prop_map(Action::Turn),
        3 => Just(Action::TowardFood),
        3 => Just(Action::Step),
        2 => (0u64..250).prop_map(Action::Advance),
        1 => Just(Action::PauseResume),
    ]
}

/// Greedy heading towards the food; may still be rejected as a reversal.
fn toward(from: Position, to: Position) -> Direction {
    if to.x > from.x {
        Direction::Right
    } else if to.x < from.x {
        Direction::Left
    } else if to.y > from.y {
        Direction::Down
    } else {
        Direction::Up
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Snapshot {
    segments: Vec<Position>,
    food: Position,
    score: u32,
    eat_count: u32,
    level: u32,
    interval_ms: u64,
    state: RunState,
}

fn snapshot(engine: &Engine) -> Snapshot {
    Snapshot {
        segments: engine.snake.segments().copied().collect(),
        food: engine.food.position,
        score: engine.score,
        eat_count: engine.eat_count,
        level: engine.level,
        interval_ms: engine.interval_ms(),
        state: engine.state(),
    }
}

fn assert_board_invariants(engine: &Engine, bounds: GridSize) -> Result<(), TestCaseError> {
    let segments: Vec<Position> = engine.snake.segments().copied().collect();
    prop_assert!(!segments.is_empty());
    prop_assert!(segments.iter().all(|cell| cell.is_within_bounds(bounds)));

    let distinct: HashSet<Position> = segments.iter().copied().collect();
    prop_assert_eq!(distinct.len(), segments.len(), "duplicate cells in {:?}", segments);

    if engine.state() != RunState::GameOver {
        prop_assert!(!engine.snake.occupies(engine.food.position));
    }
    Ok(())
}

proptest! {
    #[test]
    fn random_play_preserves_invariants(
        seed in any::<u64>(),
        width in 3u16..9,
        height in 3u16..9,
        actions in proptest::collection::vec(action(), 1..300),
    ) {
        let bounds = GridSize::new(width, height);
        let config = EngineConfig { grid: bounds, ..EngineConfig::default() };
        let tuning = config.tuning;
        let mut engine = Engine::with_seed(config, seed);
        engine.start();

        for action in actions {
            let before = snapshot(&engine);

            match action {
                Action::Turn(direction) => {
                    let accepted = engine.set_direction(direction);
                    let reversal = direction == engine.snake.direction().opposite();
                    prop_assert_eq!(accepted, !reversal && before.state != RunState::GameOver);
                }
                Action::TowardFood => {
                    let direction = toward(engine.snake.head(), engine.food.position);
                    let _ = engine.set_direction(direction);
                }
                Action::Step => engine.step(),
                Action::Advance(ms) => {
                    let _ = engine.advance(Duration::from_millis(ms));
                }
                Action::PauseResume => {
                    engine.pause();
                    engine.resume();
                }
            }

            let after = snapshot(&engine);
            assert_board_invariants(&engine, bounds)?;

            // Interval only shrinks, and never past the floor.
            prop_assert!(after.interval_ms <= before.interval_ms);
            prop_assert!(after.interval_ms >= SPEED_FLOOR_MS);
            prop_assert_eq!(after.level, 1 + after.eat_count / tuning.level_up_every);
            prop_assert_eq!(after.score, after.eat_count);

            if before.state == RunState::GameOver {
                prop_assert_eq!(&after, &before);
                break;
            }

            if after.state == RunState::GameOver && after.score == before.score {
                // A fatal step leaves the board exactly as it was.
                prop_assert_eq!(&after.segments, &before.segments);
                prop_assert_eq!(after.food, before.food);
            } else if after.score > before.score {
                prop_assert_eq!(after.score, before.score + 1);
                prop_assert_eq!(after.segments.len(), before.segments.len() + 1);
            } else {
                prop_assert_eq!(after.segments.len(), before.segments.len());
            }
        }
    }
}
