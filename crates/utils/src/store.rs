use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// Key holding the stored trade records.
pub const TRADES_KEY: &str = "trades-data";
/// Key holding the account's starting balance.
pub const INITIAL_BALANCE_KEY: &str = "initial-balance";

pub const DEFAULT_INITIAL_BALANCE: f64 = 5000.0;

/// Storage capability injected into everything that persists journal state.
/// The import pipeline itself never touches this; only the surrounding
/// tooling reads and writes through it.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&mut self, key: &str, value: Value);
    fn remove(&mut self, key: &str);
}

/// Journal store backed by a single JSON object file.
///
/// A directory path resolves to `journal.json` inside it. A missing or
/// invalid file starts from an empty object rather than failing, so first
/// runs need no setup step.
pub struct JsonFileStore {
    path: PathBuf,
    entries: Map<String, Value>,
}

impl JsonFileStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<JsonFileStore> {
        let path = resolve_journal_path(path.as_ref());

        let entries = match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str::<Map<String, Value>>(&contents)
                .unwrap_or_else(|_| Map::new()),
            Err(_) => Map::new(),
        };

        Ok(JsonFileStore { path, entries })
    }

    pub fn save(&self) -> Result<PathBuf> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Cannot create directory {}", parent.display()))?;
        }

        let formatted = serde_json::to_string_pretty(&Value::Object(self.entries.clone()))?;
        fs::write(&self.path, formatted)
            .with_context(|| format!("Cannot write journal at {}", self.path.display()))?;

        Ok(self.path.clone())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) {
        self.entries.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// In-memory store for tests and dry runs.
#[derive(Default)]
pub struct MemoryStore {
    entries: Map<String, Value>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) {
        self.entries.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

fn resolve_journal_path(path: &Path) -> PathBuf {
    if path.is_dir() || path.extension().and_then(|e| e.to_str()) != Some("json") {
        path.join("journal.json")
    } else {
        path.to_path_buf()
    }
}

/// Stored trade records, oldest journal state first. Missing key means an
/// empty journal.
pub fn load_trades(store: &impl KeyValueStore) -> Vec<Value> {
    store
        .get(TRADES_KEY)
        .and_then(|v| v.as_array().cloned())
        .unwrap_or_default()
}

pub fn save_trades(store: &mut impl KeyValueStore, trades: Vec<Value>) {
    store.set(TRADES_KEY, Value::Array(trades));
}

pub fn initial_balance(store: &impl KeyValueStore) -> f64 {
    store
        .get(INITIAL_BALANCE_KEY)
        .and_then(|v| v.as_f64())
        .unwrap_or(DEFAULT_INITIAL_BALANCE)
}

pub fn set_initial_balance(store: &mut impl KeyValueStore, balance: f64) {
    store.set(INITIAL_BALANCE_KEY, Value::from(balance));
}
