use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde_json::{Map, Value};

/// Free-text hiring request written by whoever starts the flow.
pub const PROMPT_KEY: &str = "prompt";
/// Flat filter object published by the job generator.
pub const FILTERS_KEY: &str = "filters";
pub const JOB_DESCRIPTION_KEY: &str = "job_description";
/// Export snapshot written right before a candidate search.
pub const APPLIED_FILTERS_KEY: &str = "applied_filters";

/// String key-value store shared by the generator and candidate stages.
pub trait Storage {
    fn get(&mut self, key: &str) -> anyhow::Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: BTreeMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, key: &str, value: impl Into<String>) -> Self {
        self.entries.insert(key.to_string(), value.into());
        self
    }
}

impl Storage for MemoryStorage {
    fn get(&mut self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One JSON object on disk holding string values.
///
/// Every read reloads the file, and writes merge only the dirty keys into
/// whatever is on disk, so two handles writing different keys keep both.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
    payload: Option<Map<String, Value>>,
    dirty_keys: Vec<String>,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            payload: None,
            dirty_keys: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn flush(&mut self) -> anyhow::Result<()> {
        if self.dirty_keys.is_empty() {
            return Ok(());
        }
        let Some(payload) = self.payload.as_ref() else {
            return Ok(());
        };

        let mut on_disk = read_json_object(&self.path)?.unwrap_or_default();
        for key in &self.dirty_keys {
            if let Some(value) = payload.get(key) {
                on_disk.insert(key.clone(), value.clone());
            }
        }
        write_json_object(&self.path, &on_disk)?;
        self.payload = Some(on_disk);
        self.dirty_keys.clear();
        Ok(())
    }

    fn reload(&mut self) -> anyhow::Result<&mut Map<String, Value>> {
        let fresh = read_json_object(&self.path)?.unwrap_or_default();
        Ok(self.payload.insert(fresh))
    }
}

impl Storage for JsonFileStorage {
    fn get(&mut self, key: &str) -> anyhow::Result<Option<String>> {
        let payload = self.reload()?;
        // Hand-edited stores may hold JSON values instead of encoded strings.
        Ok(match payload.get(key) {
            None | Some(Value::Null) => None,
            Some(Value::String(text)) => Some(text.clone()),
            Some(other) => Some(other.to_string()),
        })
    }

    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        let payload = self.reload()?;
        payload.insert(key.to_string(), Value::String(value.to_string()));
        if !self.dirty_keys.iter().any(|existing| existing == key) {
            self.dirty_keys.push(key.to_string());
        }
        self.flush()
    }
}

fn read_json_object(path: &Path) -> anyhow::Result<Option<Map<String, Value>>> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    if raw.trim().is_empty() {
        return Ok(None);
    }
    let parsed: Value = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;
    match parsed {
        Value::Object(map) => Ok(Some(map)),
        _ => anyhow::bail!("{} must hold a JSON object", path.display()),
    }
}

fn write_json_object(path: &Path, payload: &Map<String, Value>) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(
        path,
        serde_json::to_string_pretty(&Value::Object(payload.clone()))?,
    )
    .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
