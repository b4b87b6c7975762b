use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::config::{
    ConfigError, DEFAULT_GRID_HEIGHT, DEFAULT_GRID_WIDTH, Difficulty, EngineConfig, GridSize,
    Tuning,
};
use crate::food::Food;
use crate::input::Direction;
use crate::snake::{Position, Snake};

/// Lifecycle of the engine; exactly one value at a time.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum RunState {
    #[default]
    Idle,
    Running,
    Paused,
    GameOver,
}

/// Why a run ended.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum GameOverReason {
    WallCollision,
    SelfCollision,
    /// The snake covers every cell, leaving nowhere to place food.
    BoardFilled,
}

/// Notifications produced for the UI layer.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum GameEvent {
    ScoreChanged(u32),
    LevelChanged(u32),
    FoodEaten { score: u32 },
    SpeedUp { interval_ms: u64 },
    LevelUp { level: u32 },
    GameOver { score: u32, reason: GameOverReason },
    /// Queued by [`crate::session::Session`] when a finished run beats the
    /// stored best.
    NewHighScore(u32),
}

/// Simulation engine state for one game instance.
#[derive(Debug, Clone)]
pub struct Engine {
    pub snake: Snake,
    pub food: Food,
    pub score: u32,
    pub level: u32,
    pub eat_count: u32,
    pub tick_count: u64,
    state: RunState,
    interval_ms: u64,
    accumulator: Duration,
    death_reason: Option<GameOverReason>,
    difficulty: Difficulty,
    grid: GridSize,
    tuning: Tuning,
    events: Vec<GameEvent>,
    rng: StdRng,
}

impl Engine {
    /// Creates an idle engine seeded from system entropy.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Creates a deterministic engine for tests and reproducible simulations.
    #[must_use]
    pub fn with_seed(config: EngineConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(mut config: EngineConfig, rng: StdRng) -> Self {
        if let Err(error @ ConfigError::GridTooSmall { .. }) = config.validate() {
            log::warn!("{error}; using the default {DEFAULT_GRID_WIDTH}x{DEFAULT_GRID_HEIGHT} grid");
            config.grid = GridSize::default();
        }
        let start = config.grid.center();
        let snake = Snake::new(start, Direction::Up);
        let mut engine = Self {
            food: Food::new(start),
            snake,
            score: 0,
            level: 1,
            eat_count: 0,
            tick_count: 0,
            state: RunState::Idle,
            interval_ms: config.difficulty.base_interval_ms(),
            accumulator: Duration::ZERO,
            death_reason: None,
            difficulty: config.difficulty,
            grid: config.grid,
            tuning: config.tuning,
            events: Vec::new(),
            rng,
        };
        // Lay out a board for the start screen; `start` lays out a fresh one.
        engine.init_run();
        engine.events.clear();
        engine
    }

    /// Starts a fresh run from `Idle` or `GameOver`. No-op while a run is
    /// in progress.
    pub fn start(&mut self) {
        if matches!(self.state, RunState::Running | RunState::Paused) {
            return;
        }
        self.begin_run();
    }

    /// Abandons the current run, if any, and starts a fresh one.
    pub fn restart(&mut self) {
        self.begin_run();
    }

    pub fn pause(&mut self) {
        if self.state == RunState::Running {
            self.state = RunState::Paused;
            log::debug!("paused at tick {}", self.tick_count);
        }
    }

    /// Continues a paused run. Time spent paused is not replayed.
    pub fn resume(&mut self) {
        if self.state == RunState::Paused {
            self.state = RunState::Running;
            self.accumulator = Duration::ZERO;
            log::debug!("resumed at tick {}", self.tick_count);
        }
    }

    /// Selects the difficulty used by the next `start`/`restart`.
    pub fn select_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
    }

    /// Buffers a direction for the next step. Ignored before the first start
    /// and after the run has ended; a reversal of the committed direction is
    /// rejected. Returns whether the input was accepted.
    pub fn set_direction(&mut self, direction: Direction) -> bool {
        match self.state {
            RunState::Running | RunState::Paused => self.snake.buffer_direction(direction),
            RunState::Idle | RunState::GameOver => false,
        }
    }

    /// Accounts for `elapsed` wall time and performs at most one step once
    /// the accumulated time exceeds the tick interval. Returns whether a step
    /// ran.
    pub fn advance(&mut self, elapsed: Duration) -> bool {
        if self.state != RunState::Running {
            return false;
        }

        let interval = self.tick_interval();
        self.accumulator = self.accumulator.saturating_add(elapsed);
        if self.accumulator <= interval {
            return false;
        }

        // Carried overshoot stays strictly below one interval: after a stall
        // the next step still needs fresh time.
        let carry_cap = interval.saturating_sub(Duration::from_millis(1));
        self.accumulator = (self.accumulator - interval).min(carry_cap);
        self.step();
        true
    }

    /// Performs one discrete step regardless of accumulated time.
    pub fn step(&mut self) {
        if self.state != RunState::Running {
            return;
        }

        self.tick_count += 1;
        self.snake.commit_direction();
        let head = self.snake.next_head();

        if !head.is_within_bounds(self.grid) {
            self.finish(GameOverReason::WallCollision);
            return;
        }
        // Checked before the tail moves, so stepping into the tail is fatal.
        if self.snake.occupies(head) {
            self.finish(GameOverReason::SelfCollision);
            return;
        }

        self.snake.push_head(head);
        log::trace!("tick {} head ({}, {})", self.tick_count, head.x, head.y);

        if head == self.food.position {
            self.eat();
        } else {
            let _ = self.snake.pop_tail();
        }
    }

    fn eat(&mut self) {
        self.score += 1;
        self.eat_count += 1;
        self.events.push(GameEvent::FoodEaten { score: self.score });
        self.events.push(GameEvent::ScoreChanged(self.score));

        if is_multiple(self.eat_count, self.tuning.speed_up_every) {
            let faster = self
                .interval_ms
                .saturating_sub(self.tuning.speed_up_amount_ms)
                .max(self.tuning.speed_floor_ms);
            if faster < self.interval_ms {
                self.interval_ms = faster;
                self.events.push(GameEvent::SpeedUp {
                    interval_ms: faster,
                });
            }
        }

        if is_multiple(self.eat_count, self.tuning.level_up_every) {
            self.level += 1;
            log::info!("level {} reached with score {}", self.level, self.score);
            self.events.push(GameEvent::LevelUp { level: self.level });
            self.events.push(GameEvent::LevelChanged(self.level));
        }

        match Food::spawn(&mut self.rng, self.grid, &self.snake) {
            Some(food) => self.food = food,
            None => self.finish(GameOverReason::BoardFilled),
        }
    }

    fn finish(&mut self, reason: GameOverReason) {
        self.state = RunState::GameOver;
        self.death_reason = Some(reason);
        log::info!(
            "game over after {} ticks: {reason:?}, score {}",
            self.tick_count,
            self.score
        );
        self.events.push(GameEvent::GameOver {
            score: self.score,
            reason,
        });
    }

    fn begin_run(&mut self) {
        self.init_run();
        self.state = RunState::Running;
        log::info!(
            "run started: {} ({} ms), grid {}x{}",
            self.difficulty,
            self.interval_ms,
            self.grid.width,
            self.grid.height
        );
    }

    fn init_run(&mut self) {
        self.interval_ms = self.difficulty.base_interval_ms();
        self.snake = Snake::new(self.grid.center(), Direction::Up);
        self.score = 0;
        self.level = 1;
        self.eat_count = 0;
        self.tick_count = 0;
        self.accumulator = Duration::ZERO;
        self.death_reason = None;
        // A validated grid always has a free cell next to a one-cell snake.
        self.food = Food::spawn(&mut self.rng, self.grid, &self.snake)
            .unwrap_or(Food::new(Position::new(0, 0)));
        self.events.push(GameEvent::ScoreChanged(self.score));
        self.events.push(GameEvent::LevelChanged(self.level));
    }

    /// Takes all events queued since the last call, oldest first.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    #[must_use]
    pub fn state(&self) -> RunState {
        self.state
    }

    #[must_use]
    pub fn death_reason(&self) -> Option<GameOverReason> {
        self.death_reason
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Current tick interval in milliseconds.
    #[must_use]
    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    #[must_use]
    pub fn bounds(&self) -> GridSize {
        self.grid
    }
}

/// `every == 0` disables the threshold instead of dividing by zero.
fn is_multiple(count: u32, every: u32) -> bool {
    count.checked_rem(every) == Some(0)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::config::{Difficulty, EngineConfig, GridSize, Tuning};
    use crate::food::Food;
    use crate::input::Direction;
    use crate::snake::{Position, Snake};

    use super::{Engine, GameEvent, GameOverReason, RunState};

    fn running_engine(seed: u64) -> Engine {
        let mut engine = Engine::with_seed(EngineConfig::default(), seed);
        engine.start();
        let _ = engine.drain_events();
        engine
    }

    /// Places food somewhere the snake will not reach during a test.
    fn park_food(engine: &mut Engine) {
        engine.food = Food::new(Position::new(0, 19));
    }

    #[test]
    fn new_engine_is_idle_with_fresh_board() {
        let mut engine = Engine::with_seed(EngineConfig::default(), 1);

        assert_eq!(engine.state(), RunState::Idle);
        assert_eq!(engine.snake.head(), Position::new(10, 10));
        assert!(!engine.snake.occupies(engine.food.position));
        assert!(engine.drain_events().is_empty());
    }

    #[test]
    fn start_initialises_run_and_notifies() {
        let mut engine = Engine::with_seed(EngineConfig::default(), 1);
        engine.start();

        assert_eq!(engine.state(), RunState::Running);
        assert_eq!(engine.snake.direction(), Direction::Up);
        assert_eq!(engine.snake.pending_direction(), Direction::Up);
        assert_eq!(engine.interval_ms(), 110);
        assert_eq!(
            engine.drain_events(),
            vec![GameEvent::ScoreChanged(0), GameEvent::LevelChanged(1)]
        );
    }

    #[test]
    fn start_is_ignored_while_running_or_paused() {
        let mut engine = running_engine(2);
        park_food(&mut engine);
        engine.step();
        let head = engine.snake.head();

        engine.start();
        assert_eq!(engine.snake.head(), head);

        engine.pause();
        engine.start();
        assert_eq!(engine.state(), RunState::Paused);
        assert_eq!(engine.snake.head(), head);
    }

    #[test]
    fn idle_engine_ignores_direction_and_time() {
        let mut engine = Engine::with_seed(EngineConfig::default(), 3);

        assert!(!engine.set_direction(Direction::Left));
        assert!(!engine.advance(Duration::from_secs(5)));
        assert_eq!(engine.snake.head(), Position::new(10, 10));
        assert_eq!(engine.state(), RunState::Idle);
    }

    #[test]
    fn three_moves_up_from_center() {
        let mut engine = running_engine(4);
        park_food(&mut engine);

        for _ in 0..3 {
            engine.step();
        }

        assert_eq!(engine.snake.segments().copied().collect::<Vec<_>>(), vec![
            Position::new(10, 7)
        ]);
        assert_eq!(engine.score, 0);
    }

    #[test]
    fn eating_grows_and_scores() {
        let mut engine = running_engine(5);
        engine.snake = Snake::from_segments(
            vec![
                Position::new(5, 5),
                Position::new(5, 6),
                Position::new(5, 7),
            ],
            Direction::Up,
        );
        engine.food = Food::new(Position::new(5, 4));

        engine.step();

        assert_eq!(engine.snake.segments().copied().collect::<Vec<_>>(), vec![
            Position::new(5, 4),
            Position::new(5, 5),
            Position::new(5, 6),
            Position::new(5, 7),
        ]);
        assert_eq!(engine.score, 1);
        assert_eq!(engine.eat_count, 1);
        assert!(!engine.snake.occupies(engine.food.position));
        assert_eq!(
            engine.drain_events(),
            vec![
                GameEvent::FoodEaten { score: 1 },
                GameEvent::ScoreChanged(1)
            ]
        );
    }

    #[test]
    fn wall_collision_ends_run_without_mutation() {
        let mut engine = running_engine(6);
        engine.snake = Snake::new(Position::new(19, 5), Direction::Right);
        let food = engine.food;

        engine.step();

        assert_eq!(engine.state(), RunState::GameOver);
        assert_eq!(engine.death_reason(), Some(GameOverReason::WallCollision));
        assert_eq!(engine.snake.head(), Position::new(19, 5));
        assert_eq!(engine.snake.len(), 1);
        assert_eq!(engine.food, food);
        assert_eq!(
            engine.drain_events(),
            vec![GameEvent::GameOver {
                score: 0,
                reason: GameOverReason::WallCollision
            }]
        );
    }

    #[test]
    fn self_collision_ends_run() {
        let mut engine = running_engine(7);
        engine.snake = Snake::from_segments(
            vec![
                Position::new(2, 2),
                Position::new(1, 2),
                Position::new(1, 3),
                Position::new(2, 3),
                Position::new(3, 3),
                Position::new(3, 2),
            ],
            Direction::Left,
        );
        engine.set_direction(Direction::Down);

        engine.step();

        assert_eq!(engine.state(), RunState::GameOver);
        assert_eq!(engine.death_reason(), Some(GameOverReason::SelfCollision));
        assert_eq!(engine.snake.len(), 6);
    }

    #[test]
    fn stepping_into_the_tail_is_fatal() {
        let mut engine = running_engine(8);
        // A 2x2 loop: moving right from (4,5) reaches the tail at (5,5).
        engine.snake = Snake::from_segments(
            vec![
                Position::new(4, 5),
                Position::new(4, 6),
                Position::new(5, 6),
                Position::new(5, 5),
            ],
            Direction::Up,
        );
        park_food(&mut engine);
        engine.set_direction(Direction::Right);

        engine.step();

        assert_eq!(engine.death_reason(), Some(GameOverReason::SelfCollision));
    }

    #[test]
    fn game_over_ignores_input_and_time() {
        let mut engine = running_engine(9);
        engine.snake = Snake::new(Position::new(0, 0), Direction::Up);
        engine.step();
        assert_eq!(engine.state(), RunState::GameOver);

        assert!(!engine.set_direction(Direction::Right));
        assert!(!engine.advance(Duration::from_secs(1)));
        engine.pause();
        engine.resume();
        assert_eq!(engine.state(), RunState::GameOver);
    }

    #[test]
    fn reverse_input_in_same_tick_cannot_kill() {
        let mut engine = running_engine(10);
        engine.snake = Snake::from_segments(
            vec![Position::new(5, 5), Position::new(5, 6)],
            Direction::Up,
        );
        park_food(&mut engine);

        // Left is accepted, then Down is checked against committed Up.
        assert!(engine.set_direction(Direction::Left));
        assert!(!engine.set_direction(Direction::Down));
        engine.step();

        assert_eq!(engine.state(), RunState::Running);
        assert_eq!(engine.snake.head(), Position::new(4, 5));
    }

    #[test]
    fn direction_can_be_buffered_while_paused() {
        let mut engine = running_engine(11);
        park_food(&mut engine);
        engine.pause();

        assert!(engine.set_direction(Direction::Right));
        engine.resume();
        engine.step();

        assert_eq!(engine.snake.head(), Position::new(11, 10));
    }

    #[test]
    fn advance_steps_only_after_interval_is_exceeded() {
        let mut engine = running_engine(12);
        park_food(&mut engine);

        assert!(!engine.advance(Duration::from_millis(110)));
        assert!(engine.advance(Duration::from_millis(1)));
        assert_eq!(engine.snake.head(), Position::new(10, 9));
    }

    #[test]
    fn advance_never_steps_twice_per_call() {
        let mut engine = running_engine(13);
        park_food(&mut engine);

        assert!(engine.advance(Duration::from_millis(1_000)));
        assert_eq!(engine.tick_count, 1);

        // 109 ms carried on a 110 ms interval: reaching it is not enough.
        assert!(!engine.advance(Duration::from_millis(1)));
        assert_eq!(engine.tick_count, 1);
        assert!(engine.advance(Duration::from_millis(1)));
        assert_eq!(engine.tick_count, 2);
    }

    #[test]
    fn degenerate_grid_falls_back_to_default_board() {
        for grid in [GridSize::new(1, 1), GridSize::new(0, 5), GridSize::new(7, 0)] {
            let config = EngineConfig {
                grid,
                ..EngineConfig::default()
            };
            let mut engine = Engine::with_seed(config, 4);
            engine.start();

            assert_eq!(engine.bounds(), GridSize::default());
            assert_eq!(engine.snake.head(), Position::new(10, 10));
            assert!(engine.snake.head().is_within_bounds(engine.bounds()));
            assert!(engine.food.position.is_within_bounds(engine.bounds()));
            assert!(!engine.snake.occupies(engine.food.position));
        }
    }

    #[test]
    fn stall_does_not_cause_back_to_back_steps() {
        let mut engine = running_engine(21);
        park_food(&mut engine);

        assert!(engine.advance(Duration::from_millis(2_000)));
        let steps = (0..5)
            .filter(|_| engine.advance(Duration::from_millis(1)))
            .count();
        assert_eq!(steps, 1);
        assert_eq!(engine.tick_count, 2);

        // Back to the regular cadence afterwards.
        assert!(!engine.advance(Duration::from_millis(100)));
        assert!(engine.advance(Duration::from_millis(20)));
    }

    #[test]
    fn advance_carries_overshoot_between_steps() {
        let mut engine = running_engine(14);
        park_food(&mut engine);

        // 70 + 70 = 140 > 110, leaving 30 ms carried forward.
        assert!(!engine.advance(Duration::from_millis(70)));
        assert!(engine.advance(Duration::from_millis(70)));
        assert!(!engine.advance(Duration::from_millis(80)));
        assert!(engine.advance(Duration::from_millis(1)));
    }

    #[test]
    fn paused_time_is_discarded() {
        let mut engine = running_engine(15);
        park_food(&mut engine);

        assert!(!engine.advance(Duration::from_millis(100)));
        engine.pause();
        assert!(!engine.advance(Duration::from_secs(10)));
        engine.resume();

        assert!(!engine.advance(Duration::from_millis(100)));
        assert_eq!(engine.tick_count, 0);
        assert!(engine.advance(Duration::from_millis(20)));
    }

    #[test]
    fn speed_and_level_follow_eat_count() {
        let mut engine = running_engine(16);
        engine.snake = Snake::new(Position::new(10, 19), Direction::Up);

        for expected in 1..=10_u32 {
            let target = engine.snake.next_head();
            engine.food = Food::new(target);
            engine.step();
            assert_eq!(engine.score, expected);

            let expected_interval = 110 - 12 * u64::from(expected / 5);
            assert_eq!(engine.interval_ms(), expected_interval);
            assert_eq!(engine.level, 1 + expected / 5);
        }

        let events = engine.drain_events();
        let level_ups: Vec<_> = events
            .iter()
            .filter(|event| matches!(event, GameEvent::LevelUp { .. }))
            .collect();
        assert_eq!(level_ups, vec![
            &GameEvent::LevelUp { level: 2 },
            &GameEvent::LevelUp { level: 3 }
        ]);
    }

    #[test]
    fn interval_never_drops_below_floor() {
        let config = EngineConfig {
            tuning: Tuning {
                speed_up_every: 1,
                ..Tuning::default()
            },
            ..EngineConfig::default()
        };
        let mut engine = Engine::with_seed(config, 17);
        engine.start();

        let mut previous = engine.interval_ms();
        for _ in 0..10 {
            engine.food = Food::new(engine.snake.next_head());
            engine.step();
            assert!(engine.interval_ms() <= previous);
            assert!(engine.interval_ms() >= 40);
            previous = engine.interval_ms();
        }

        assert_eq!(engine.state(), RunState::Running);
        assert_eq!(engine.interval_ms(), 40);
    }

    #[test]
    fn restart_after_game_over_resets_run() {
        let mut engine = running_engine(18);
        engine.snake = Snake::new(Position::new(10, 1), Direction::Up);
        engine.food = Food::new(Position::new(10, 0));
        engine.step();
        engine.step();
        assert_eq!(engine.state(), RunState::GameOver);
        assert_eq!(engine.score, 1);

        engine.restart();

        assert_eq!(engine.state(), RunState::Running);
        assert_eq!(engine.score, 0);
        assert_eq!(engine.level, 1);
        assert_eq!(engine.snake.len(), 1);
        assert_eq!(engine.death_reason(), None);
    }

    #[test]
    fn difficulty_applies_on_next_run() {
        let mut engine = running_engine(19);

        engine.select_difficulty(Difficulty::Easy);
        assert_eq!(engine.interval_ms(), 110);

        engine.restart();
        assert_eq!(engine.interval_ms(), 160);
        assert_eq!(engine.difficulty(), Difficulty::Easy);
    }

    #[test]
    fn filling_the_board_ends_the_run() {
        let config = EngineConfig {
            grid: GridSize::new(2, 1),
            ..EngineConfig::default()
        };
        let mut engine = Engine::with_seed(config, 20);
        engine.start();
        // Snake at (1, 0), food must be at the only other cell.
        assert_eq!(engine.food.position, Position::new(0, 0));

        engine.set_direction(Direction::Left);
        engine.step();

        assert_eq!(engine.score, 1);
        assert_eq!(engine.state(), RunState::GameOver);
        assert_eq!(engine.death_reason(), Some(GameOverReason::BoardFilled));
    }
}
