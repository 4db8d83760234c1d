//! Last-run persistence.
//!
//! The most recent organize result is kept as `last_run.json` in the config
//! directory so `show` can redisplay it without re-running the categorizer.
//! Only one run is kept; each save replaces the previous file.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use chatblocks_shared::{ChatBlocksError, Result, SemanticBlock};

/// File name of the saved run inside the history directory.
pub const LAST_RUN_FILE: &str = "last_run.json";

// ---------------------------------------------------------------------------
// RunId
// ---------------------------------------------------------------------------

/// A UUID v7 wrapper for saved-run identifiers (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub Uuid);

impl RunId {
    /// Generate a new time-sortable run identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// SavedRun
// ---------------------------------------------------------------------------

/// The `last_run.json` structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedRun {
    pub id: RunId,
    pub created_at: DateTime<Utc>,
    /// Hex SHA-256 of the raw input text. The text itself is not stored.
    pub input_sha256: String,
    /// Categorizer that produced the blocks (`keyword` or `ai`).
    pub categorizer: String,
    pub blocks: Vec<SemanticBlock>,
}

impl SavedRun {
    /// Snapshot a finished run.
    pub fn new(input: &str, categorizer: &str, blocks: Vec<SemanticBlock>) -> Self {
        Self {
            id: RunId::new(),
            created_at: Utc::now(),
            input_sha256: sha256_hex(input),
            categorizer: categorizer.to_string(),
            blocks,
        }
    }
}

fn sha256_hex(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Path of the saved run inside `dir`.
pub fn last_run_path(dir: &Path) -> PathBuf {
    dir.join(LAST_RUN_FILE)
}

/// Write `run` to `<dir>/last_run.json`, creating `dir` if needed.
///
/// Writes to a temp file named after the run id, then renames it into place.
#[instrument(skip_all, fields(dir = %dir.display(), run = %run.id))]
pub fn save_run(dir: &Path, run: &SavedRun) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|e| ChatBlocksError::io(dir, e))?;

    let target = last_run_path(dir);
    let temp = dir.join(format!("{LAST_RUN_FILE}.{}.tmp", run.id));

    let json = serde_json::to_string_pretty(run)?;
    std::fs::write(&temp, json).map_err(|e| ChatBlocksError::io(&temp, e))?;
    std::fs::rename(&temp, &target).map_err(|e| ChatBlocksError::io(&target, e))?;

    info!(path = %target.display(), blocks = run.blocks.len(), "saved last run");
    Ok(target)
}

/// Load `<dir>/last_run.json`.
///
/// A missing file is `None`. A file that does not decode is also `None`
/// (logged at `warn`); it will be replaced by the next save.
#[instrument(skip_all, fields(dir = %dir.display()))]
pub fn load_last_run(dir: &Path) -> Result<Option<SavedRun>> {
    let path = last_run_path(dir);

    let content = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no saved run");
            return Ok(None);
        }
        Err(e) => return Err(ChatBlocksError::io(&path, e)),
    };

    match serde_json::from_str(&content) {
        Ok(run) => Ok(Some(run)),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ignoring unreadable saved run");
            Ok(None)
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
