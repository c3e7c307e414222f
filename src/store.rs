use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::board::Board;
use crate::error::{BoardError, Result};

/// String-keyed persistent storage for serialized boards.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// One file per key inside a data directory.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(BoardError::Config(format!("invalid storage key: {key:?}")));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;
        // Write beside the target then rename so a crash never leaves half a board.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
#[derive(Default)]
pub struct MemoryStore {
    entries: std::cell::RefCell<std::collections::HashMap<String, String>>,
}

#[cfg(test)]
impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// Read the stored board. Anything unreadable yields an empty board.
pub fn load_board(store: &dyn KeyValueStore, key: &str) -> Board {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            debug!(key, "no stored board, starting empty");
            return Board::new();
        }
        Err(e) => {
            warn!(key, error = %e, "failed to read stored board");
            return Board::new();
        }
    };
    match serde_json::from_str(&raw) {
        Ok(board) => board,
        Err(e) => {
            warn!(key, error = %e, "stored board is not valid JSON, starting empty");
            Board::new()
        }
    }
}

pub fn save_board(store: &dyn KeyValueStore, key: &str, board: &Board) -> Result<()> {
    let json = serde_json::to_string(board)?;
    store.set(key, &json)?;
    debug!(key, tasks = board.total(), "saved board");
    Ok(())
}

pub fn clear_board(store: &dyn KeyValueStore, key: &str) -> Result<()> {
    store.remove(key)?;
    info!(key, "cleared stored board");
    Ok(())
}

pub fn default_export_name(today: NaiveDate) -> String {
    format!("priority-matrix-{}.json", today.format("%Y-%m-%d"))
}

/// Write the board as pretty-printed JSON.
pub fn export_json(board: &Board, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(board)?;
    fs::write(path, json)?;
    info!(path = %path.display(), tasks = board.total(), "exported board");
    Ok(())
}

/// Parse a previously exported board. The caller replaces its board only on success.
pub fn import_json(path: &Path) -> Result<Board> {
    let content = fs::read_to_string(path)?;
    let board: Board = serde_json::from_str(&content)?;
    info!(path = %path.display(), tasks = board.total(), "imported board");
    Ok(board)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use crate::task::{Quadrant, TaskDraft};

    const KEY: &str = "pmatrix-v1";

    fn sample_board() -> Board {
        let mut board = Board::new();
        board.add(TaskDraft::new("Ship release"), Quadrant::Do);
        board.add(TaskDraft::new("Plan roadmap").with_notes("Q3"), Quadrant::Schedule);
        board
    }

    #[test]
    fn file_store_round_trips_and_removes() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested"));

        assert_eq!(store.get(KEY).unwrap(), None);
        store.set(KEY, "{}").unwrap();
        assert_eq!(store.get(KEY).unwrap().as_deref(), Some("{}"));
        assert!(dir.path().join("nested").join("pmatrix-v1.json").exists());

        store.remove(KEY).unwrap();
        assert_eq!(store.get(KEY).unwrap(), None);
        // Removing a missing key is fine.
        store.remove(KEY).unwrap();
    }

    #[test]
    fn file_store_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        assert!(matches!(store.get("../x"), Err(BoardError::Config(_))));
        assert!(matches!(store.set("", "v"), Err(BoardError::Config(_))));
    }

    #[test]
    fn save_then_load_restores_board() {
        let store = MemoryStore::default();
        let board = sample_board();
        save_board(&store, KEY, &board).unwrap();
        assert_eq!(load_board(&store, KEY), board);
    }

    #[test]
    fn load_falls_back_to_empty_on_garbage() {
        let store = MemoryStore::default();
        store.set(KEY, "not json").unwrap();
        assert!(load_board(&store, KEY).is_empty());
        assert!(load_board(&store, "other-key").is_empty());
    }

    #[test]
    fn clear_board_removes_key() {
        let store = MemoryStore::default();
        save_board(&store, KEY, &sample_board()).unwrap();
        clear_board(&store, KEY).unwrap();
        assert_eq!(store.get(KEY).unwrap(), None);
    }

    #[test]
    fn export_is_pretty_and_importable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("board.json");
        let board = sample_board();

        export_json(&board, &path).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("{\n  \"do\""));

        assert_eq!(import_json(&path).unwrap(), board);
    }

    #[test]
    fn import_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, r#"{"someday": []}"#).unwrap();
        assert!(matches!(import_json(&path), Err(BoardError::Json(_))));
        assert!(matches!(
            import_json(&dir.path().join("missing.json")),
            Err(BoardError::Io(_))
        ));
    }

    #[test]
    fn export_name_carries_date() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(default_export_name(day), "priority-matrix-2024-01-05.json");
    }
}
