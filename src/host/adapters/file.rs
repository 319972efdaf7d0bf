use std::{
    collections::BTreeMap,
    fs,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::host::{
    error::{StorageError, codec_error, internal_error, io_error},
    ports::{StorageOp, StoragePort},
};

const STORAGE_FORMAT_VERSION: u64 = 2;

/// JSON-file backed storage. Every mutation rewrites the file atomically
/// through a temp file and rename; a failed rewrite leaves the in-memory
/// entries as they were before the mutation.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
    entries: BTreeMap<String, Vec<u8>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedEntries {
    version: u64,
    entries: BTreeMap<String, PersistedValue>,
}

/// Values that are canonical JSON are embedded as JSON so the state file
/// stays readable. Anything else keeps its exact bytes.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "encoding", content = "data", rename_all = "snake_case")]
enum PersistedValue {
    Json(Value),
    Text(String),
    Bytes(Vec<u8>),
}

impl PersistedValue {
    fn encode(bytes: &[u8]) -> Self {
        if let Ok(value) = serde_json::from_slice::<Value>(bytes)
            && serde_json::to_vec(&value).is_ok_and(|canonical| canonical == bytes)
        {
            return Self::Json(value);
        }
        match std::str::from_utf8(bytes) {
            Ok(text) => Self::Text(text.to_string()),
            Err(_) => Self::Bytes(bytes.to_vec()),
        }
    }

    fn decode(self, key: &str) -> Result<Vec<u8>, StorageError> {
        match self {
            Self::Json(value) => serde_json::to_vec(&value)
                .map_err(|err| codec_error(format!("failed to re-encode '{key}': {err}"))),
            Self::Text(text) => Ok(text.into_bytes()),
            Self::Bytes(bytes) => Ok(bytes),
        }
    }
}

impl FileStorage {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let entries = load_entries(&path)?.unwrap_or_default();
        tracing::debug!(
            target: "faucet.storage",
            path = %path.display(),
            entries = entries.len(),
            "file_storage_opened"
        );
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StorageError> {
        let parent = self.path.parent().ok_or_else(|| {
            internal_error(format!(
                "storage path '{}' has no parent",
                self.path.display()
            ))
        })?;
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|err| {
                io_error(format!(
                    "failed to create storage directory '{}': {err}",
                    parent.display()
                ))
            })?;
        }

        let persisted = PersistedEntries {
            version: STORAGE_FORMAT_VERSION,
            entries: self
                .entries
                .iter()
                .map(|(key, value)| (key.clone(), PersistedValue::encode(value)))
                .collect(),
        };

        let tmp_path = self.path.with_extension("tmp");
        let file = fs::File::create(&tmp_path).map_err(|err| {
            io_error(format!(
                "failed to create storage temp file '{}': {err}",
                tmp_path.display()
            ))
        })?;
        {
            let mut writer = BufWriter::new(&file);
            serde_json::to_writer(&mut writer, &persisted).map_err(|err| {
                codec_error(format!(
                    "failed to serialize storage '{}': {err}",
                    tmp_path.display()
                ))
            })?;
            writer.write_all(b"\n").map_err(|err| {
                io_error(format!(
                    "failed to finalize storage '{}': {err}",
                    tmp_path.display()
                ))
            })?;
            writer.flush().map_err(|err| {
                io_error(format!(
                    "failed to flush storage '{}': {err}",
                    tmp_path.display()
                ))
            })?;
        }
        file.sync_all().map_err(|err| {
            io_error(format!(
                "failed to sync storage temp file '{}': {err}",
                tmp_path.display()
            ))
        })?;

        fs::rename(&tmp_path, &self.path).map_err(|err| {
            io_error(format!(
                "failed to replace storage '{}' from '{}': {err}",
                self.path.display(),
                tmp_path.display()
            ))
        })?;

        Ok(())
    }
}

fn load_entries(path: &Path) -> Result<Option<BTreeMap<String, Vec<u8>>>, StorageError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(io_error(format!(
                "failed to read storage '{}': {err}",
                path.display()
            )));
        }
    };

    let parsed: PersistedEntries = serde_json::from_str(&content).map_err(|err| {
        codec_error(format!(
            "failed to parse storage '{}': {err}",
            path.display()
        ))
    })?;
    if parsed.version != STORAGE_FORMAT_VERSION {
        return Err(codec_error(format!(
            "unsupported storage version {} at '{}'",
            parsed.version,
            path.display()
        )));
    }

    let entries = parsed
        .entries
        .into_iter()
        .map(|(key, value)| {
            let bytes = value.decode(&key)?;
            Ok((key, bytes))
        })
        .collect::<Result<BTreeMap<_, _>, StorageError>>()?;
    Ok(Some(entries))
}

impl StoragePort for FileStorage {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
        self.apply_batch(vec![StorageOp::Put {
            key: key.to_string(),
            value,
        }])
    }

    fn remove(&mut self, key: &str) -> Result<bool, StorageError> {
        if !self.entries.contains_key(key) {
            return Ok(false);
        }
        self.apply_batch(vec![StorageOp::Delete {
            key: key.to_string(),
        }])?;
        Ok(true)
    }

    fn apply_batch(&mut self, ops: Vec<StorageOp>) -> Result<(), StorageError> {
        let snapshot = self.entries.clone();
        for op in ops {
            match op {
                StorageOp::Put { key, value } => {
                    self.entries.insert(key, value);
                }
                StorageOp::Delete { key } => {
                    self.entries.remove(&key);
                }
            }
        }
        if let Err(err) = self.flush() {
            self.entries = snapshot;
            return Err(err);
        }
        Ok(())
    }

    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        Ok(self
            .entries
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect())
    }
}
