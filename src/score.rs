use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

const APP_DIR_NAME: &str = "grid-snake";
const SCORE_FILE_NAME: &str = "scores.json";

/// Storage for the single best score that outlives runs.
pub trait HighScoreStore {
    /// Returns the stored best score, `0` when nothing has been stored yet.
    fn read_high_score(&self) -> Result<u32, ScoreError>;

    fn write_high_score(&mut self, score: u32) -> Result<(), ScoreError>;
}

/// Failure to load or persist the high score.
#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("failed to read score file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("score file {} is malformed", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write score file {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to serialize high score")]
    Serialize(#[source] serde_json::Error),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct ScoreFile {
    high_score: u32,
}

/// Returns the platform-correct score file path.
#[must_use]
pub fn scores_path() -> PathBuf {
    let mut base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    base.push(APP_DIR_NAME);
    base.push(SCORE_FILE_NAME);
    base
}

/// JSON file holding `{ "high_score": n }`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at [`scores_path`].
    #[must_use]
    pub fn at_default_path() -> Self {
        Self::new(scores_path())
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HighScoreStore for JsonFileStore {
    fn read_high_score(&self) -> Result<u32, ScoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(source) => {
                return Err(ScoreError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        serde_json::from_str::<ScoreFile>(&raw)
            .map(|file| file.high_score)
            .map_err(|source| ScoreError::Parse {
                path: self.path.clone(),
                source,
            })
    }

    fn write_high_score(&mut self, score: u32) -> Result<(), ScoreError> {
        let write_error = |source| ScoreError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_error)?;
        }

        let payload = ScoreFile { high_score: score };
        let mut json = serde_json::to_string_pretty(&payload).map_err(ScoreError::Serialize)?;
        json.push('\n');

        fs::write(&self.path, json).map_err(write_error)
    }
}

/// Keeps the high score in memory only.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct MemoryStore {
    pub high_score: u32,
    pub writes: u32,
}

impl MemoryStore {
    #[must_use]
    pub fn with_high_score(high_score: u32) -> Self {
        Self {
            high_score,
            writes: 0,
        }
    }
}

impl HighScoreStore for MemoryStore {
    fn read_high_score(&self) -> Result<u32, ScoreError> {
        Ok(self.high_score)
    }

    fn write_high_score(&mut self, score: u32) -> Result<(), ScoreError> {
        self.high_score = score;
        self.writes += 1;
        Ok(())
    }
}
