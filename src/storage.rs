//! Per-user checkpoint persistence.
//!
//! The engine only produces and consumes [`Checkpoint`] payloads; this
//! module is the key-value boundary that files them away by user identifier.
//! [`LocalStore`] keeps one framed `.save` file per user in a flat
//! directory, scanning and validating the directory once at open time so
//! corrupted leftovers are reported early and skipped.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::checkpoint::{self, Checkpoint, CheckpointError};

const SAVE_EXTENSION: &str = "save";

#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),
    #[error("no checkpoint found for user `{0}`")]
    NotFound(String),
}

/// Key-value checkpoint store, keyed by user identifier.
pub trait CheckpointStore {
    /// The stored checkpoint, or `None` when the user has never saved.
    fn get(&self, username: &str) -> Result<Option<Checkpoint>, StorageError>;
    fn set(&mut self, username: &str, checkpoint: &Checkpoint) -> Result<(), StorageError>;
    fn delete(&mut self, username: &str) -> Result<(), StorageError>;
}

/// File-backed store: one `.save` file per user in a single directory.
pub struct LocalStore {
    dir: PathBuf,
    hide_files: bool,
    files: HashMap<String, PathBuf>,
}

impl LocalStore {
    /// Open a store over `dir`, hiding save files behind a leading dot.
    ///
    /// A missing directory is an empty store; it is created on first `set`.
    pub fn open<P: AsRef<Path>>(dir: P) -> Self {
        Self::with_options(dir, true)
    }

    pub fn with_options<P: AsRef<Path>>(dir: P, hide_files: bool) -> Self {
        let dir = dir.as_ref().to_path_buf();
        let files = Self::scan(&dir);
        LocalStore {
            dir,
            hide_files,
            files,
        }
    }

    /// Usernames with a readable checkpoint on disk.
    pub fn users(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    /// Index every decodable `.save` file under `dir`. Files that fail to
    /// decode are reported and left out of the index.
    fn scan(dir: &Path) -> HashMap<String, PathBuf> {
        let mut files = HashMap::new();
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(_) => return files,
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                continue;
            }
            if path.extension().and_then(|ext| ext.to_str()) != Some(SAVE_EXTENSION) {
                continue;
            }
            match checkpoint::read_from_path(&path) {
                Ok(_) => {
                    let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
                        continue;
                    };
                    let username = stem.strip_prefix('.').unwrap_or(stem).to_string();
                    files.insert(username, path);
                }
                Err(err) => {
                    warn!("corrupted user checkpoint found: {} ({err})", path.display());
                }
            }
        }
        files
    }

    fn save_path(&self, username: &str) -> PathBuf {
        let name = if self.hide_files {
            format!(".{username}.{SAVE_EXTENSION}")
        } else {
            format!("{username}.{SAVE_EXTENSION}")
        };
        self.dir.join(name)
    }
}

impl CheckpointStore for LocalStore {
    fn get(&self, username: &str) -> Result<Option<Checkpoint>, StorageError> {
        match self.files.get(username) {
            Some(path) => Ok(Some(checkpoint::read_from_path(path)?)),
            None => Ok(None),
        }
    }

    fn set(&mut self, username: &str, checkpoint: &Checkpoint) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.save_path(username);
        checkpoint::write_to_path(&path, checkpoint)?;
        self.files.insert(username.to_string(), path);
        Ok(())
    }

    fn delete(&mut self, username: &str) -> Result<(), StorageError> {
        match self.files.remove(username) {
            Some(path) => {
                fs::remove_file(path)?;
                Ok(())
            }
            None => Err(StorageError::NotFound(username.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Board, Position, Tile};
    use crate::config::GameConfig;

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("grid2048-store-{tag}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    fn sample(score: u64) -> Checkpoint {
        let config = GameConfig::default();
        let mut board = Board::new(config.width, config.height);
        board.insert(Tile::new(0, Position::new(0, 0), 2));
        Checkpoint {
            config,
            board,
            score,
            best: score,
            finished: false,
        }
    }

    #[test]
    fn it_round_trips_per_user_and_survives_reopen() {
        let dir = temp_dir("roundtrip");
        let mut store = LocalStore::open(&dir);
        assert_eq!(store.get("alice").unwrap(), None);

        store.set("alice", &sample(8)).unwrap();
        store.set("bob", &sample(32)).unwrap();
        assert_eq!(store.get("alice").unwrap().unwrap().score, 8);

        // A fresh store over the same directory finds both users.
        let reopened = LocalStore::open(&dir);
        assert_eq!(reopened.get("alice").unwrap().unwrap().score, 8);
        assert_eq!(reopened.get("bob").unwrap().unwrap().score, 32);
        assert_eq!(reopened.users().count(), 2);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn it_hides_save_files_by_default() {
        let dir = temp_dir("hidden");
        let mut store = LocalStore::open(&dir);
        store.set("carol", &sample(4)).unwrap();
        assert!(dir.join(".carol.save").exists());
        assert!(!dir.join("carol.save").exists());

        let mut plain = LocalStore::with_options(&dir, false);
        plain.set("dave", &sample(4)).unwrap();
        assert!(dir.join("dave.save").exists());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn it_skips_corrupted_files_at_scan() {
        let dir = temp_dir("corrupt");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("mallory.save"), b"not a checkpoint").unwrap();

        let store = LocalStore::open(&dir);
        assert_eq!(store.get("mallory").unwrap(), None);
        assert_eq!(store.users().count(), 0);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn it_deletes_and_reports_missing_users() {
        let dir = temp_dir("delete");
        let mut store = LocalStore::open(&dir);
        store.set("erin", &sample(2)).unwrap();
        store.delete("erin").unwrap();
        assert_eq!(store.get("erin").unwrap(), None);
        assert!(!dir.join(".erin.save").exists());

        assert!(matches!(
            store.delete("erin"),
            Err(StorageError::NotFound(_))
        ));

        let _ = fs::remove_dir_all(&dir);
    }
}
