//! Best-score persistence, one integer per level.
use crate::error::Result;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

/// Persists the best score reached on each level.
pub trait HighScoreStore {
    /// Returns the stored best score for `level`, or 0 if none was saved.
    fn load(&self, level: u32) -> u32;

    /// Stores `score` as the best score for `level`.
    fn save(&mut self, level: u32, score: u32) -> Result<()>;
}

/// Key under which a level's best score is stored.
pub fn score_key(level: u32) -> String {
    format!("highScore_level_{}", level)
}

/// In-process store; nothing survives the process.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    scores: HashMap<u32, u32>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-seeded with `(level, score)` pairs.
    pub fn with_scores(scores: impl IntoIterator<Item = (u32, u32)>) -> Self {
        MemoryStore {
            scores: scores.into_iter().collect(),
        }
    }
}

impl HighScoreStore for MemoryStore {
    fn load(&self, level: u32) -> u32 {
        self.scores.get(&level).copied().unwrap_or(0)
    }

    fn save(&mut self, level: u32, score: u32) -> Result<()> {
        self.scores.insert(level, score);
        Ok(())
    }
}

/// Store backed by a JSON object on disk, e.g. `{"highScore_level_1": 12}`.
///
/// The whole file is rewritten on every save.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    scores: BTreeMap<String, u32>,
}

impl JsonFileStore {
    /// Opens the store at `path`. A missing file starts an empty store.
    ///
    /// # Errors
    /// Returns an I/O error if the file exists but cannot be read, or a JSON
    /// error if its contents are not a string-to-integer object.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let scores = if path.exists() {
            let content = fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&content)?
            }
        } else {
            BTreeMap::new()
        };
        tracing::debug!(path = %path.display(), levels = scores.len(), "opened score file");
        Ok(JsonFileStore { path, scores })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HighScoreStore for JsonFileStore {
    fn load(&self, level: u32) -> u32 {
        self.scores.get(&score_key(level)).copied().unwrap_or(0)
    }

    fn save(&mut self, level: u32, score: u32) -> Result<()> {
        self.scores.insert(score_key(level), score);
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_string_pretty(&self.scores)?)?;
        Ok(())
    }
}
