//! The main entry point for reading and writing prompts.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::{debug, info};

use super::error::StoreError;
use crate::core::backup::BackupInfo;
use crate::core::storage::{Document, DocumentStore, PromptRecord};

/// Fields supplied by the caller when creating or replacing a prompt.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PromptFields {
    pub content: String,
    pub tags: Vec<String>,
    pub variables: Vec<String>,
}

impl PromptFields {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_variables<I, S>(mut self, variables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.variables = variables.into_iter().map(Into::into).collect();
        self
    }
}

/// Record-level access to the prompts document.
///
/// Every mutation is a whole-document read-modify-write that goes through
/// [`DocumentStore::save`], so each one leaves a backup behind. Within a
/// process, mutations are serialized by a single write lock; separate
/// processes still race with last-writer-wins semantics.
///
/// ```no_run
/// use cuecli::{PromptFields, PromptStore};
///
/// let store = PromptStore::open("/tmp/cuecli".as_ref(), 10)?;
/// let record = store.set("greeting", PromptFields::new("Hello {{NAME}}").with_variables(["NAME"]))?;
/// assert_eq!(record.version, 1);
/// # Ok::<(), cuecli::StoreError>(())
/// ```
pub struct PromptStore {
    documents: DocumentStore,
    write_lock: Mutex<()>,
}

impl PromptStore {
    /// Opens the store rooted at `base_dir`, keeping at most `max_backups`.
    pub fn open(base_dir: &Path, max_backups: usize) -> Result<Self, StoreError> {
        Ok(Self::new(DocumentStore::open(base_dir, max_backups)?))
    }

    pub fn new(documents: DocumentStore) -> Self {
        Self {
            documents,
            write_lock: Mutex::new(()),
        }
    }

    pub fn documents(&self) -> &DocumentStore {
        &self.documents
    }

    /// Returns the named prompt, or `None` if there is none.
    pub fn get(&self, name: &str) -> Result<Option<PromptRecord>, StoreError> {
        let mut doc = self.documents.load()?;
        Ok(doc.prompts.remove(name))
    }

    pub fn exists(&self, name: &str) -> Result<bool, StoreError> {
        Ok(self.documents.load()?.prompts.contains_key(name))
    }

    /// Creates or replaces a prompt and returns the stored record.
    ///
    /// Content, tags and variables are replaced wholesale. `created` is kept
    /// from an existing record and `version` is bumped by one; a new record
    /// starts at version 1.
    pub fn set(&self, name: &str, fields: PromptFields) -> Result<PromptRecord, StoreError> {
        validate(name, &fields)?;

        let _guard = self.write_lock.lock();
        let mut doc = self.documents.load()?;
        let record = upsert(&mut doc, name, fields, Utc::now());
        self.documents.save(&doc)?;

        info!(name, version = record.version, "saved prompt");
        Ok(record)
    }

    /// Applies several [`set`](Self::set)s with one load and one save.
    /// Nothing is written if any entry is invalid.
    pub fn set_many(
        &self,
        entries: Vec<(String, PromptFields)>,
    ) -> Result<Vec<PromptRecord>, StoreError> {
        for (name, fields) in &entries {
            validate(name, fields)?;
        }
        if entries.is_empty() {
            return Ok(Vec::new());
        }

        let _guard = self.write_lock.lock();
        let mut doc = self.documents.load()?;
        let now = Utc::now();
        let records: Vec<PromptRecord> = entries
            .into_iter()
            .map(|(name, fields)| upsert(&mut doc, &name, fields, now))
            .collect();
        self.documents.save(&doc)?;

        info!(count = records.len(), "saved prompts");
        Ok(records)
    }

    /// Removes a prompt. Returns `false` (and writes nothing) if it did not
    /// exist.
    pub fn delete(&self, name: &str) -> Result<bool, StoreError> {
        let _guard = self.write_lock.lock();
        let mut doc = self.documents.load()?;
        if doc.prompts.remove(name).is_none() {
            return Ok(false);
        }
        self.documents.save(&doc)?;
        info!(name, "deleted prompt");
        Ok(true)
    }

    pub fn list_all(&self) -> Result<BTreeMap<String, PromptRecord>, StoreError> {
        Ok(self.documents.load()?.prompts)
    }

    /// Prompts carrying at least one of `tags`. An empty set matches all.
    pub fn list_by_tags(
        &self,
        tags: &BTreeSet<String>,
    ) -> Result<BTreeMap<String, PromptRecord>, StoreError> {
        let prompts = self.list_all()?;
        if tags.is_empty() {
            return Ok(prompts);
        }
        Ok(prompts
            .into_iter()
            .filter(|(_, record)| !record.tags.is_disjoint(tags))
            .collect())
    }

    /// The document's free-form settings.
    pub fn config(&self) -> Result<Map<String, Value>, StoreError> {
        Ok(self.documents.load()?.config)
    }

    /// Shallow-merges `updates` into the settings and returns the result.
    pub fn update_config(&self, updates: Map<String, Value>) -> Result<Map<String, Value>, StoreError> {
        let _guard = self.write_lock.lock();
        let mut doc = self.documents.load()?;
        doc.config.extend(updates);
        self.documents.save(&doc)?;
        Ok(doc.config)
    }

    /// Backups, newest first.
    pub fn list_backups(&self) -> Result<Vec<BackupInfo>, StoreError> {
        self.documents.list_backups()
    }

    /// Replaces the document with the named backup. The current document
    /// is itself backed up first, so a restore can be undone.
    pub fn restore_backup(&self, name: &str) -> Result<Document, StoreError> {
        let _guard = self.write_lock.lock();
        let doc = self.documents.read_backup(name)?;
        self.documents.save(&doc)?;
        info!(backup = name, prompts = doc.prompts.len(), "restored backup");
        Ok(doc)
    }
}

fn validate(name: &str, fields: &PromptFields) -> Result<(), StoreError> {
    if name.trim().is_empty() {
        return Err(StoreError::InvalidInput(
            "Prompt name cannot be empty".to_string(),
        ));
    }
    if fields.content.trim().is_empty() {
        return Err(StoreError::InvalidInput(format!(
            "Content for '{}' cannot be empty",
            name
        )));
    }
    Ok(())
}

fn upsert(doc: &mut Document, name: &str, fields: PromptFields, now: DateTime<Utc>) -> PromptRecord {
    let (created, version, extra) = match doc.prompts.get(name) {
        Some(existing) => (existing.created, existing.version + 1, existing.extra.clone()),
        None => (now, 1, Map::new()),
    };
    debug!(name, version, "writing prompt record");

    let record = PromptRecord {
        name: name.to_string(),
        content: fields.content,
        tags: normalize_tags(fields.tags),
        variables: fields.variables,
        created,
        modified: now,
        version,
        extra,
    };
    doc.prompts.insert(name.to_string(), record.clone());
    record
}

fn normalize_tags(tags: Vec<String>) -> BTreeSet<String> {
    tags.iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
