//! Key/value persistence: one JSON file per logical key, fronted by an
//! in-memory cache. A read or write failure is logged and the cached value
//! keeps serving for the rest of the session; persistence trouble never
//! crashes the app.

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use tracing::warn;

pub const KEY_TASKS: &str = "tasks";
pub const KEY_ALARMS: &str = "alarms";
pub const KEY_LANGUAGE: &str = "language";
pub const KEY_THEME: &str = "theme";
pub const KEY_THEME_MODE: &str = "themeMode";

pub fn tranquil_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".tranquil"))
}

#[derive(Debug)]
pub struct Store {
    dir: PathBuf,
    cache: HashMap<String, serde_json::Value>,
}

impl Store {
    /// Open a store rooted at `dir`. Failure to create the directory is
    /// logged; the store then runs memory-only.
    pub fn open(dir: PathBuf) -> Self {
        if let Err(e) = fs::create_dir_all(&dir) {
            warn!("store: create {} failed ({e}); running memory-only", dir.display());
        }
        Self {
            dir,
            cache: HashMap::new(),
        }
    }

    pub fn open_default() -> Result<Self> {
        Ok(Self::open(tranquil_home()?.join("store")))
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Read a value. Cache wins; otherwise the file is read once and
    /// cached. Missing or unreadable data yields None.
    pub fn get<T: DeserializeOwned>(&mut self, key: &str) -> Option<T> {
        if !self.cache.contains_key(key) {
            let value = self.read_file(key)?;
            self.cache.insert(key.to_string(), value);
        }
        let value = self.cache.get(key)?;
        match serde_json::from_value(value.clone()) {
            Ok(t) => Some(t),
            Err(e) => {
                warn!("store: key '{key}' has unexpected shape: {e}");
                None
            }
        }
    }

    /// Write a value through the cache to disk. A disk failure is logged;
    /// the cache still holds the new value.
    pub fn set<T: Serialize>(&mut self, key: &str, value: &T) {
        let json = match serde_json::to_value(value) {
            Ok(v) => v,
            Err(e) => {
                warn!("store: serialize key '{key}' failed: {e}");
                return;
            }
        };
        self.cache.insert(key.to_string(), json.clone());

        let path = self.path_for(key);
        let body = match serde_json::to_string_pretty(&json) {
            Ok(s) => s,
            Err(e) => {
                warn!("store: encode key '{key}' failed: {e}");
                return;
            }
        };
        if let Err(e) = fs::write(&path, body) {
            warn!("store: write {} failed ({e}); serving from memory", path.display());
        }
    }

    fn read_file(&self, key: &str) -> Option<serde_json::Value> {
        let path = self.path_for(key);
        if !path.exists() {
            return None;
        }
        let raw = match fs::read_to_string(&path) {
            Ok(s) => s,
            Err(e) => {
                warn!("store: read {} failed: {e}", path.display());
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!("store: parse {} failed: {e}", path.display());
                None
            }
        }
    }
}
