use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::backup::{BackupInfo, BackupManager};
use super::utils::{ensure_dir, write_atomic};
use crate::api::StoreError;

/// Environment variable naming an override for the store root.
pub const CONFIG_DIR_ENV: &str = "CUECLI_CONFIG_DIR";

const DEFAULT_DIR_NAME: &str = ".cuecli";
const PROMPTS_FILE: &str = "prompts.json";
const BACKUP_DIR: &str = "backups";

/// Data for a single, storable prompt.
///
/// Decoding is forgiving: `null` reads as the field's default and a numeric
/// string is accepted as a version. Fields this crate does not know about
/// are kept in `extra` and written back unchanged.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PromptRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: BTreeSet<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub variables: Vec<String>,
    #[serde(default = "Utc::now", deserialize_with = "null_as_now")]
    pub created: DateTime<Utc>,
    #[serde(default = "Utc::now", deserialize_with = "null_as_now")]
    pub modified: DateTime<Utc>,
    #[serde(default, deserialize_with = "lenient_version")]
    pub version: u64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_now<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<DateTime<Utc>>::deserialize(deserializer)?.unwrap_or_else(Utc::now))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawVersion {
    Number(u64),
    Text(String),
}

fn lenient_version<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<RawVersion>::deserialize(deserializer)? {
        None => Ok(0),
        Some(RawVersion::Number(n)) => Ok(n),
        Some(RawVersion::Text(text)) => text
            .trim()
            .parse()
            .map_err(|e| D::Error::custom(format!("invalid version '{}': {}", text, e))),
    }
}

/// The whole persisted state: every prompt plus opaque settings.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Document {
    #[serde(default)]
    pub prompts: BTreeMap<String, PromptRecord>,
    #[serde(default)]
    pub config: Map<String, Value>,
}

impl Document {
    /// The document written on first run: no prompts, seeded settings.
    pub fn initial() -> Self {
        let editor = env::var("EDITOR").unwrap_or_else(|_| "vi".to_string());
        let mut config = Map::new();
        config.insert("defaultEditor".to_string(), Value::String(editor));
        config.insert("syncEnabled".to_string(), Value::Bool(false));
        config.insert(
            "createdAt".to_string(),
            Value::String(Utc::now().to_rfc3339()),
        );
        Self {
            prompts: BTreeMap::new(),
            config,
        }
    }

    /// Builds a document from parsed JSON. Returns `None` unless the top
    /// level is an object. A `null` or missing section reads as empty, and
    /// a record that cannot be decoded is skipped with a warning. Map keys
    /// are authoritative for record names.
    pub fn from_value(value: Value) -> Option<Self> {
        let Value::Object(mut root) = value else {
            return None;
        };

        let prompts = match root.remove("prompts") {
            Some(Value::Object(entries)) => entries
                .into_iter()
                .filter_map(|(name, raw)| match serde_json::from_value::<PromptRecord>(raw) {
                    Ok(mut record) => {
                        record.name = name.clone();
                        Some((name, record))
                    }
                    Err(e) => {
                        warn!(prompt = %name, error = %e, "skipping prompt record that cannot be decoded");
                        None
                    }
                })
                .collect(),
            None | Some(Value::Null) => BTreeMap::new(),
            Some(other) => {
                warn!(found = %other, "ignoring prompts section that is not an object");
                BTreeMap::new()
            }
        };

        let config = match root.remove("config") {
            Some(Value::Object(config)) => config,
            None | Some(Value::Null) => Map::new(),
            Some(other) => {
                warn!(found = %other, "ignoring config section that is not an object");
                Map::new()
            }
        };

        Some(Self { prompts, config })
    }
}

/// Resolves the store root: `$CUECLI_CONFIG_DIR`, else `~/.cuecli`.
pub fn resolve_base_dir() -> Result<PathBuf, StoreError> {
    if let Some(dir) = env::var_os(CONFIG_DIR_ENV).filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    let home = env::var("HOME")
        .map_err(|_| StoreError::Init("Unable to determine HOME directory".to_string()))?;
    Ok(PathBuf::from(home).join(DEFAULT_DIR_NAME))
}

/// Sole owner of the prompts document on disk and of its backups.
///
/// Every [`save`](Self::save) snapshots the current file first; a failed
/// snapshot is logged and does not block the write. There is no
/// cross-process locking: the last writer wins.
#[derive(Debug)]
pub struct DocumentStore {
    document_path: PathBuf,
    backups: BackupManager,
}

impl DocumentStore {
    /// Opens (creating directories as needed) the store rooted at `base_dir`.
    pub fn open(base_dir: &Path, max_backups: usize) -> Result<Self, StoreError> {
        let backup_dir = base_dir.join(BACKUP_DIR);
        ensure_dir(base_dir).map_err(StoreError::Init)?;
        ensure_dir(&backup_dir).map_err(StoreError::Init)?;

        Ok(Self {
            document_path: base_dir.join(PROMPTS_FILE),
            backups: BackupManager::new(backup_dir, max_backups),
        })
    }

    pub fn document_path(&self) -> &Path {
        &self.document_path
    }

    pub fn backup_dir(&self) -> &Path {
        self.backups.dir()
    }

    /// Reads the document. A missing file is initialized. A file that
    /// cannot be read or is not a JSON object is backed up, then replaced
    /// by a fresh document after a warning.
    pub fn load(&self) -> Result<Document, StoreError> {
        let bytes = match fs::read(&self.document_path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.document_path.display(), "initializing prompts document");
                return self.initialize();
            }
            Err(e) => {
                warn!(
                    path = %self.document_path.display(),
                    error = %e,
                    "unable to read prompts document, starting fresh"
                );
                self.backup_current();
                return self.initialize();
            }
        };

        let parsed = serde_json::from_slice::<Value>(&bytes)
            .map_err(|e| e.to_string())
            .and_then(|value| {
                Document::from_value(value).ok_or_else(|| "top level is not an object".to_string())
            });
        match parsed {
            Ok(doc) => Ok(doc),
            Err(reason) => {
                warn!(
                    path = %self.document_path.display(),
                    error = %reason,
                    "prompts document is corrupt, starting fresh"
                );
                self.backup_current();
                self.initialize()
            }
        }
    }

    /// Backs up the current file, overwrites it with `doc`, then rotates
    /// old backups. Only the primary write can fail the call.
    pub fn save(&self, doc: &Document) -> Result<(), StoreError> {
        self.backup_current();
        self.write_document(doc)?;
        self.rotate_backups();
        Ok(())
    }

    pub fn list_backups(&self) -> Result<Vec<BackupInfo>, StoreError> {
        self.backups
            .list()
            .map_err(|e| StoreError::Backup(format!("Unable to list backups: {}", e)))
    }

    /// Parses a backup by file name without touching the live document.
    pub fn read_backup(&self, name: &str) -> Result<Document, StoreError> {
        let path = self
            .backups
            .resolve(name)
            .ok_or_else(|| StoreError::Backup(format!("No backup named '{}'", name)))?;
        let bytes = fs::read(&path)
            .map_err(|e| StoreError::Backup(format!("Unable to read {}: {}", name, e)))?;
        let value: Value = serde_json::from_slice(&bytes)
            .map_err(|e| StoreError::Backup(format!("Backup {} is not valid: {}", name, e)))?;
        Document::from_value(value).ok_or_else(|| {
            StoreError::Backup(format!("Backup {} is not a prompts document", name))
        })
    }

    fn initialize(&self) -> Result<Document, StoreError> {
        let doc = Document::initial();
        self.write_document(&doc)?;
        Ok(doc)
    }

    fn write_document(&self, doc: &Document) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(doc)?;
        write_atomic(&self.document_path, &json)
            .map_err(|e| StoreError::write(&self.document_path, e))
    }

    fn backup_current(&self) {
        if !self.document_path.exists() {
            return;
        }
        match self.backups.create(&self.document_path) {
            Ok(path) => debug!(backup = %path.display(), "created backup"),
            Err(e) => warn!(error = %e, "failed to create backup"),
        }
    }

    fn rotate_backups(&self) {
        match self.backups.rotate() {
            Ok(0) => {}
            Ok(removed) => debug!(removed, "rotated old backups"),
            Err(e) => warn!(error = %e, "failed to rotate backups"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::backup::DEFAULT_MAX_BACKUPS;
    use tempfile::tempdir;

    fn record(name: &str, content: &str) -> PromptRecord {
        let now = Utc::now();
        PromptRecord {
            name: name.to_string(),
            content: content.to_string(),
            tags: BTreeSet::new(),
            variables: Vec::new(),
            created: now,
            modified: now,
            version: 1,
            extra: Map::new(),
        }
    }

    #[test]
    fn load_initializes_missing_document() {
        let dir = tempdir().unwrap();
        let store = DocumentStore::open(dir.path(), DEFAULT_MAX_BACKUPS).unwrap();

        let doc = store.load().unwrap();

        assert!(doc.prompts.is_empty());
        assert!(doc.config.contains_key("createdAt"));
        assert!(store.document_path().exists());
    }

    #[test]
    fn corrupt_document_starts_fresh() {
        let dir = tempdir().unwrap();
        let store = DocumentStore::open(dir.path(), DEFAULT_MAX_BACKUPS).unwrap();
        fs::write(store.document_path(), "invalid json").unwrap();

        let doc = store.load().unwrap();

        assert!(doc.prompts.is_empty());
        let on_disk: Document =
            serde_json::from_str(&fs::read_to_string(store.document_path()).unwrap()).unwrap();
        assert_eq!(on_disk, doc);
    }

    #[test]
    fn save_backs_up_previous_contents() {
        let dir = tempdir().unwrap();
        let store = DocumentStore::open(dir.path(), DEFAULT_MAX_BACKUPS).unwrap();
        let before = store.load().unwrap();

        let mut doc = before.clone();
        doc.prompts.insert("a".into(), record("a", "hello"));
        store.save(&doc).unwrap();

        let backups = store.list_backups().unwrap();
        assert_eq!(backups.len(), 1);
        assert_eq!(store.read_backup(&backups[0].name).unwrap(), before);
        assert_eq!(store.load().unwrap(), doc);
    }

    #[test]
    fn save_rotates_to_retention_limit() {
        let dir = tempdir().unwrap();
        let store = DocumentStore::open(dir.path(), 10).unwrap();
        let mut doc = store.load().unwrap();

        for i in 0..15 {
            doc.config.insert("i".into(), Value::from(i));
            store.save(&doc).unwrap();
        }

        let backups = store.list_backups().unwrap();
        assert_eq!(backups.len(), 10);
        // The newest backup holds the state written by the 14th save.
        let newest = store.read_backup(&backups[0].name).unwrap();
        assert_eq!(newest.config.get("i"), Some(&Value::from(13)));
    }

    #[test]
    fn record_names_follow_map_keys() {
        let dir = tempdir().unwrap();
        let store = DocumentStore::open(dir.path(), DEFAULT_MAX_BACKUPS).unwrap();
        fs::write(
            store.document_path(),
            r#"{"prompts":{"greet":{"content":"hi","version":3}},"config":{}}"#,
        )
        .unwrap();

        let doc = store.load().unwrap();
        let greet = &doc.prompts["greet"];
        assert_eq!(greet.name, "greet");
        assert_eq!(greet.version, 3);
        assert!(greet.tags.is_empty());
    }

    #[test]
    fn failed_write_is_reported() {
        let dir = tempdir().unwrap();
        let store = DocumentStore::open(dir.path(), DEFAULT_MAX_BACKUPS).unwrap();
        store.load().unwrap();
        // A directory in place of the temp file makes the write fail.
        fs::create_dir(dir.path().join("prompts.json.tmp")).unwrap();

        let err = store.save(&Document::default()).unwrap_err();
        assert!(matches!(err, StoreError::Write { .. }));
    }

    #[test]
    fn null_fields_read_as_defaults() {
        let dir = tempdir().unwrap();
        let store = DocumentStore::open(dir.path(), DEFAULT_MAX_BACKUPS).unwrap();
        let raw = r#"{"prompts":{
            "keep":{"content":"hello","tags":["a"],"version":4},
            "odd":{"content":"x","tags":null,"variables":null,"created":null,"version":null}
        },"config":null}"#;
        fs::write(store.document_path(), raw).unwrap();

        let doc = store.load().unwrap();

        assert_eq!(doc.prompts["keep"].version, 4);
        assert!(doc.prompts["keep"].tags.contains("a"));
        assert!(doc.prompts["odd"].tags.is_empty());
        assert!(doc.prompts["odd"].variables.is_empty());
        assert_eq!(doc.prompts["odd"].version, 0);
        assert!(doc.config.is_empty());
        // Loading never rewrites a readable document.
        assert_eq!(fs::read_to_string(store.document_path()).unwrap(), raw);
    }

    #[test]
    fn numeric_string_version_is_accepted() {
        let dir = tempdir().unwrap();
        let store = DocumentStore::open(dir.path(), DEFAULT_MAX_BACKUPS).unwrap();
        fs::write(
            store.document_path(),
            r#"{"prompts":{"a":{"content":"x","version":"3"}}}"#,
        )
        .unwrap();

        assert_eq!(store.load().unwrap().prompts["a"].version, 3);
    }

    #[test]
    fn null_prompts_section_reads_as_empty() {
        let dir = tempdir().unwrap();
        let store = DocumentStore::open(dir.path(), DEFAULT_MAX_BACKUPS).unwrap();
        fs::write(
            store.document_path(),
            r#"{"prompts":null,"config":{"theme":"dark"}}"#,
        )
        .unwrap();

        let doc = store.load().unwrap();
        assert!(doc.prompts.is_empty());
        assert_eq!(doc.config.get("theme"), Some(&Value::from("dark")));
        assert!(store.list_backups().unwrap().is_empty());
    }

    #[test]
    fn undecodable_record_is_skipped_not_fatal() {
        let dir = tempdir().unwrap();
        let store = DocumentStore::open(dir.path(), DEFAULT_MAX_BACKUPS).unwrap();
        fs::write(
            store.document_path(),
            r#"{"prompts":{"keep":{"content":"hello"},"bad":{"content":5},"worse":"text"}}"#,
        )
        .unwrap();

        let doc = store.load().unwrap();
        let names: Vec<&str> = doc.prompts.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["keep"]);
    }

    #[test]
    fn unknown_record_fields_survive_a_save() {
        let dir = tempdir().unwrap();
        let store = DocumentStore::open(dir.path(), DEFAULT_MAX_BACKUPS).unwrap();
        fs::write(
            store.document_path(),
            r#"{"prompts":{"a":{"content":"x","version":1,"author":"ada"}}}"#,
        )
        .unwrap();

        let doc = store.load().unwrap();
        assert_eq!(doc.prompts["a"].extra.get("author"), Some(&Value::from("ada")));
        store.save(&doc).unwrap();

        let raw: Value =
            serde_json::from_str(&fs::read_to_string(store.document_path()).unwrap()).unwrap();
        assert_eq!(raw["prompts"]["a"]["author"], "ada");
        assert_eq!(raw["prompts"]["a"]["content"], "x");
    }

    #[test]
    fn corrupt_document_is_backed_up_before_reset() {
        let dir = tempdir().unwrap();
        let store = DocumentStore::open(dir.path(), DEFAULT_MAX_BACKUPS).unwrap();
        fs::write(store.document_path(), "invalid json").unwrap();

        store.load().unwrap();

        let backups = store.list_backups().unwrap();
        assert_eq!(backups.len(), 1);
        assert_eq!(fs::read_to_string(&backups[0].path).unwrap(), "invalid json");
    }

    #[test]
    fn non_object_document_is_reset() {
        let dir = tempdir().unwrap();
        let store = DocumentStore::open(dir.path(), DEFAULT_MAX_BACKUPS).unwrap();
        fs::write(store.document_path(), "[1, 2]").unwrap();

        let doc = store.load().unwrap();
        assert!(doc.config.contains_key("createdAt"));
        assert_eq!(store.list_backups().unwrap().len(), 1);
    }

    #[test]
    fn backup_failure_does_not_block_save() {
        let dir = tempdir().unwrap();
        let store = DocumentStore::open(dir.path(), DEFAULT_MAX_BACKUPS).unwrap();
        store.load().unwrap();
        // A plain file where the backup directory should be.
        fs::remove_dir_all(store.backup_dir()).unwrap();
        fs::write(store.backup_dir(), "not a directory").unwrap();

        let mut doc = store.load().unwrap();
        doc.prompts.insert("a".into(), record("a", "kept"));
        store.save(&doc).unwrap();

        assert_eq!(store.load().unwrap().prompts["a"].content, "kept");
        assert_eq!(
            fs::read_to_string(store.backup_dir()).unwrap(),
            "not a directory"
        );
    }
}
