use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::info;

use super::{KvStore, StoreError};

pub const NOTES_KEY: &str = "smartfin.editor.v1";

/// Removes every `<...>` tag. An unterminated `<` is kept as text.
pub fn strip_tags(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(open) = rest.find('<') {
        let Some(close) = rest[open..].find('>') else {
            break;
        };
        out.push_str(&rest[..open]);
        rest = &rest[open + close + 1..];
    }
    out.push_str(rest);
    out
}

fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n")
}

/// The plain-text notes pad.
pub struct Notes<'a> {
    store: &'a mut KvStore,
}

impl<'a> Notes<'a> {
    pub fn new(store: &'a mut KvStore) -> Self {
        Self { store }
    }

    pub fn load(&self) -> String {
        self.store.get(NOTES_KEY).map(strip_tags).unwrap_or_default()
    }

    pub fn save(&mut self, text: &str) -> bool {
        self.store.set(NOTES_KEY, &normalize_newlines(text))
    }

    /// Persists an empty pad so a cleared note stays cleared.
    pub fn clear(&mut self) -> bool {
        self.store.set(NOTES_KEY, "")
    }

    pub fn export_file_name(now: DateTime<Utc>) -> String {
        now.format("notes-%Y-%m-%d-%H-%M-%S.txt").to_string()
    }

    /// Writes the current notes to `dir` and returns the file path.
    pub fn export(&self, dir: &Path, now: DateTime<Utc>) -> Result<PathBuf, StoreError> {
        let path = dir.join(Self::export_file_name(now));
        let text = normalize_newlines(&self.load());
        fs::write(&path, text).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        info!(path = %path.display(), "exported notes");
        Ok(path)
    }
}
