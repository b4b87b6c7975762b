use std::time::Duration;

use crate::config::Difficulty;
use crate::game::{Engine, GameEvent, RunState};
use crate::input::Direction;
use crate::score::HighScoreStore;

/// An [`Engine`] paired with the high-score persistence collaborator.
///
/// The best score is read once on construction and written whenever a run
/// ends above it. Engine events are collected after every call and can be
/// taken with [`Session::drain_events`].
#[derive(Debug)]
pub struct Session<S> {
    engine: Engine,
    store: S,
    high_score: u32,
    events: Vec<GameEvent>,
}

impl<S: HighScoreStore> Session<S> {
    #[must_use]
    pub fn new(engine: Engine, store: S) -> Self {
        let high_score = store.read_high_score().unwrap_or_else(|error| {
            log::warn!("{error}; starting from a high score of 0");
            0
        });

        Self {
            engine,
            store,
            high_score,
            events: Vec::new(),
        }
    }

    pub fn start(&mut self) {
        self.engine.start();
        self.collect_events();
    }

    pub fn restart(&mut self) {
        self.engine.restart();
        self.collect_events();
    }

    pub fn pause(&mut self) {
        self.engine.pause();
    }

    pub fn resume(&mut self) {
        self.engine.resume();
    }

    /// Pauses a running game or resumes a paused one.
    pub fn toggle_pause(&mut self) {
        match self.engine.state() {
            RunState::Running => self.pause(),
            RunState::Paused => self.resume(),
            RunState::Idle | RunState::GameOver => {}
        }
    }

    pub fn set_direction(&mut self, direction: Direction) -> bool {
        self.engine.set_direction(direction)
    }

    pub fn select_difficulty(&mut self, difficulty: Difficulty) {
        self.engine.select_difficulty(difficulty);
    }

    /// Forwards frame time to the engine; see [`Engine::advance`].
    pub fn advance(&mut self, elapsed: Duration) -> bool {
        let stepped = self.engine.advance(elapsed);
        if stepped {
            self.collect_events();
        }
        stepped
    }

    fn collect_events(&mut self) {
        for event in self.engine.drain_events() {
            self.events.push(event);
            if let GameEvent::GameOver { score, .. } = event {
                self.record_final_score(score);
            }
        }
    }

    fn record_final_score(&mut self, score: u32) {
        if score <= self.high_score {
            return;
        }

        self.high_score = score;
        log::info!("new high score {score}");
        if let Err(error) = self.store.write_high_score(score) {
            log::warn!("{error}");
        }
        self.events.push(GameEvent::NewHighScore(score));
    }

    /// Takes all events queued since the last call, oldest first.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    #[must_use]
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Direct engine access for tests and scripted setups; events produced
    /// through it are picked up on the next session call.
    pub fn engine_mut(&mut self) -> &mut Engine {
        &mut self.engine
    }

    #[must_use]
    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }
}
