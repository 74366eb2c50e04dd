//! Persisted dedup state.
//!
//! The state file holds the ids of messages already forwarded, oldest first:
//!
//! ```json
//! {"forwarded": ["1203", "1204"], "updated_at": "2026-01-01T00:00:00Z"}
//! ```
//!
//! The list is capped; the oldest ids are evicted first. Every save rewrites
//! the whole file through a temp file and a rename, so a crash mid-write
//! leaves the previous state intact.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use clawtrail_core::error::StateError;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct DedupState {
    #[serde(default)]
    forwarded: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    updated_at: Option<DateTime<Utc>>,
}

/// Forwarded message ids with FIFO eviction and atomic persistence.
#[derive(Debug)]
pub struct DedupStateStore {
    path: PathBuf,
    capacity: usize,
    state: DedupState,
    index: HashSet<String>,
    persist: bool,
}

impl DedupStateStore {
    /// An empty store that will persist to `path`.
    pub fn empty(path: impl Into<PathBuf>, capacity: usize) -> Self {
        Self {
            path: path.into(),
            capacity: capacity.max(1),
            state: DedupState::default(),
            index: HashSet::new(),
            persist: true,
        }
    }

    /// Keep tracking in memory but turn [`Self::save`] into a no-op.
    /// Used for dry runs, which must not mark anything as forwarded on disk.
    pub fn without_persistence(mut self) -> Self {
        self.persist = false;
        self
    }

    /// Load the store, starting empty when the file is missing.
    pub fn try_load(path: impl Into<PathBuf>, capacity: usize) -> Result<Self, StateError> {
        let path = path.into();
        let mut store = Self::empty(path, capacity);
        if !store.path.exists() {
            return Ok(store);
        }

        let raw = std::fs::read_to_string(&store.path).map_err(|e| StateError::Read {
            path: store.path.clone(),
            reason: e.to_string(),
        })?;
        let mut state: DedupState = serde_json::from_str(&raw).map_err(|e| StateError::Parse {
            path: store.path.clone(),
            reason: e.to_string(),
        })?;

        // Duplicates in a hand-edited file keep their first position.
        let mut seen = HashSet::with_capacity(state.forwarded.len());
        state.forwarded.retain(|id| seen.insert(id.clone()));
        store.state = state;
        store.index = seen;
        store.evict_overflow();
        Ok(store)
    }

    /// Load the store; an unreadable or corrupt file is logged and treated
    /// as empty state.
    pub fn load(path: impl Into<PathBuf>, capacity: usize) -> Self {
        let path = path.into();
        match Self::try_load(&path, capacity) {
            Ok(store) => {
                debug!(path = %path.display(), entries = store.len(), "Dedup state loaded");
                store
            }
            Err(e) => {
                warn!(error = %e, "Starting with empty dedup state");
                Self::empty(path, capacity)
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.state.forwarded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.forwarded.is_empty()
    }

    pub fn contains(&self, message_id: &str) -> bool {
        self.index.contains(message_id)
    }

    /// When the state was last saved, if ever.
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.state.updated_at
    }

    /// Forwarded ids, oldest first.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.state.forwarded.iter().map(String::as_str)
    }

    /// Record `message_id` as forwarded. Returns `false` if it already was.
    pub fn mark_forwarded(&mut self, message_id: &str) -> bool {
        if !self.index.insert(message_id.to_string()) {
            return false;
        }
        self.state.forwarded.push(message_id.to_string());
        self.evict_overflow();
        true
    }

    /// Rewrite the state file with the full current state.
    pub fn save(&mut self) -> Result<(), StateError> {
        if !self.persist {
            return Ok(());
        }
        self.state.updated_at = Some(Utc::now());
        let mut payload = serde_json::to_string_pretty(&self.state).map_err(|e| StateError::Write {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;
        payload.push('\n');
        write_atomic(&self.path, &payload).map_err(|e| StateError::Write {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }

    fn evict_overflow(&mut self) {
        let overflow = self.state.forwarded.len().saturating_sub(self.capacity);
        if overflow == 0 {
            return;
        }
        for id in self.state.forwarded.drain(..overflow) {
            self.index.remove(&id);
        }
        debug!(evicted = overflow, capacity = self.capacity, "Dedup state trimmed");
    }
}

fn write_atomic(path: &Path, content: &str) -> std::io::Result<()> {
    let parent = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent)?;

    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("forwarded.json");
    let temp_path = parent.join(format!(".{file_name}.tmp-{}", std::process::id()));
    std::fs::write(&temp_path, content)?;
    std::fs::rename(&temp_path, path)
}
