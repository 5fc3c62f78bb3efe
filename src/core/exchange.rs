//! Export packages and import planning.
//!
//! An export is a JSON envelope around a name→record map. Imports accept
//! either that envelope or a bare map, and resolve name clashes with an
//! [`ImportStrategy`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;

use super::storage::PromptRecord;
use super::template::extract_variables;
use crate::api::{PromptFields, StoreError};

pub const PACKAGE_VERSION: &str = "1.0.0";
pub const PACKAGE_SOURCE: &str = "cuecli";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportMetadata {
    pub count: usize,
    pub tags: BTreeSet<String>,
}

/// The full export envelope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportPackage {
    pub version: String,
    pub exported: DateTime<Utc>,
    pub source: String,
    pub prompts: BTreeMap<String, PromptRecord>,
    pub metadata: ExportMetadata,
}

impl ExportPackage {
    pub fn new(prompts: BTreeMap<String, PromptRecord>) -> Self {
        let tags = prompts
            .values()
            .flat_map(|p| p.tags.iter().cloned())
            .collect();
        Self {
            version: PACKAGE_VERSION.to_string(),
            exported: Utc::now(),
            source: PACKAGE_SOURCE.to_string(),
            metadata: ExportMetadata {
                count: prompts.len(),
                tags,
            },
            prompts,
        }
    }

    /// A human-readable rendering with one section per prompt.
    pub fn to_markdown(&self) -> String {
        let mut md = String::from("# Exported Prompts\n\n");
        let tags = self.metadata.tags.iter().cloned().collect::<Vec<_>>();
        let _ = writeln!(md, "**Exported:** {}", self.exported.to_rfc3339());
        let _ = writeln!(md, "**Count:** {}", self.metadata.count);
        let _ = writeln!(md, "**Tags:** {}\n", tags.join(", "));
        md.push_str("---\n\n");

        for (name, prompt) in &self.prompts {
            let _ = writeln!(md, "## {}\n", name);
            if !prompt.tags.is_empty() {
                let tags = prompt.tags.iter().cloned().collect::<Vec<_>>();
                let _ = writeln!(md, "**Tags:** {}\n", tags.join(", "));
            }
            if !prompt.variables.is_empty() {
                let _ = writeln!(md, "**Variables:** {}\n", prompt.variables.join(", "));
            }
            let _ = writeln!(md, "```\n{}\n```\n", prompt.content);
            let _ = writeln!(md, "*Created: {}*", prompt.created.to_rfc3339());
            let _ = writeln!(md, "*Modified: {}*", prompt.modified.to_rfc3339());
            md.push_str("\n---\n\n");
        }
        md
    }
}

/// Reads an import file body: a full [`ExportPackage`] or a bare
/// name→record map.
pub fn parse_import(json: &str) -> Result<BTreeMap<String, PromptRecord>, StoreError> {
    let value: Value = serde_json::from_str(json)
        .map_err(|e| StoreError::InvalidInput(format!("Invalid JSON format: {}", e)))?;

    let prompts = match value {
        Value::Object(mut map) if map.contains_key("prompts") && map.contains_key("version") => {
            map.remove("prompts").unwrap_or_default()
        }
        Value::Object(map) => Value::Object(map),
        _ => {
            return Err(StoreError::InvalidInput(
                "Unrecognized import format".to_string(),
            ))
        }
    };

    let mut records: BTreeMap<String, PromptRecord> = serde_json::from_value(prompts)
        .map_err(|e| StoreError::InvalidInput(format!("Unrecognized import format: {}", e)))?;
    for (name, record) in records.iter_mut() {
        record.name = name.clone();
    }
    Ok(records)
}

/// What to do with an incoming prompt whose name already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImportStrategy {
    /// Keep the existing prompt.
    #[default]
    Skip,
    /// Take incoming fields, union the tags.
    Merge,
    /// Replace the existing prompt.
    Overwrite,
}

impl ImportStrategy {
    pub fn describe(self) -> &'static str {
        match self {
            ImportStrategy::Skip => "Skip existing",
            ImportStrategy::Merge => "Merge with existing",
            ImportStrategy::Overwrite => "Overwrite existing",
        }
    }
}

/// The writes an import will perform, plus counters for reporting.
#[derive(Debug, Default)]
pub struct ImportPlan {
    pub writes: Vec<(String, PromptFields)>,
    pub imported: Vec<String>,
    pub merged: Vec<String>,
    pub skipped: Vec<String>,
    /// Entries with no usable content.
    pub rejected: Vec<String>,
}

/// Decides, per incoming prompt, whether and how it is written.
pub fn plan_import(
    existing: &BTreeMap<String, PromptRecord>,
    incoming: BTreeMap<String, PromptRecord>,
    strategy: ImportStrategy,
) -> ImportPlan {
    let mut plan = ImportPlan::default();

    for (name, record) in incoming {
        let current = existing.get(&name);
        let fields = match (current, strategy) {
            (Some(_), ImportStrategy::Skip) => {
                plan.skipped.push(name);
                continue;
            }
            (Some(current), ImportStrategy::Merge) => merge_fields(current, record),
            _ => import_fields(record),
        };

        if name.trim().is_empty() || fields.content.trim().is_empty() {
            plan.rejected.push(name);
            continue;
        }

        if current.is_some() && strategy == ImportStrategy::Merge {
            plan.merged.push(name.clone());
        } else {
            plan.imported.push(name.clone());
        }
        plan.writes.push((name, fields));
    }
    plan
}

fn import_fields(record: PromptRecord) -> PromptFields {
    let variables = if record.variables.is_empty() {
        extract_variables(&record.content)
    } else {
        record.variables
    };
    PromptFields {
        content: record.content,
        tags: record.tags.into_iter().collect(),
        variables,
    }
}

fn merge_fields(current: &PromptRecord, incoming: PromptRecord) -> PromptFields {
    let content = if incoming.content.trim().is_empty() {
        current.content.clone()
    } else {
        incoming.content
    };
    let variables = if incoming.variables.is_empty() {
        extract_variables(&content)
    } else {
        incoming.variables
    };
    let tags = current.tags.union(&incoming.tags).cloned().collect();
    PromptFields {
        content,
        tags,
        variables,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(content: &str, tags: &[&str]) -> PromptRecord {
        let now = Utc::now();
        PromptRecord {
            name: String::new(),
            content: content.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            variables: Vec::new(),
            created: now,
            modified: now,
            version: 1,
            extra: Default::default(),
        }
    }

    #[test]
    fn package_collects_tags_and_count() {
        let mut prompts = BTreeMap::new();
        prompts.insert("a".to_string(), record("x", &["code", "review"]));
        prompts.insert("b".to_string(), record("y", &["code", "test"]));

        let package = ExportPackage::new(prompts);
        assert_eq!(package.metadata.count, 2);
        assert_eq!(
            package.metadata.tags.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["code", "review", "test"]
        );

        let json = serde_json::to_value(&package).unwrap();
        assert_eq!(json["version"], "1.0.0");
        assert_eq!(json["source"], "cuecli");
        assert_eq!(json["prompts"]["a"]["content"], "x");
    }

    #[test]
    fn markdown_has_a_section_per_prompt() {
        let mut prompts = BTreeMap::new();
        prompts.insert("greet".to_string(), record("Hello {{NAME}}", &["demo"]));
        let md = ExportPackage::new(prompts).to_markdown();

        assert!(md.starts_with("# Exported Prompts\n"));
        assert!(md.contains("## greet\n"));
        assert!(md.contains("```\nHello {{NAME}}\n```"));
        assert!(md.contains("**Tags:** demo"));
    }

    #[test]
    fn parses_full_package_and_bare_map() {
        let mut prompts = BTreeMap::new();
        prompts.insert("a".to_string(), record("x", &[]));
        let package = serde_json::to_string(&ExportPackage::new(prompts)).unwrap();

        let from_package = parse_import(&package).unwrap();
        assert_eq!(from_package["a"].content, "x");
        assert_eq!(from_package["a"].name, "a");

        let bare = parse_import(r#"{"b": {"content": "y", "tags": ["t"]}}"#).unwrap();
        assert_eq!(bare["b"].content, "y");
        assert!(bare["b"].tags.contains("t"));
    }

    #[test]
    fn rejects_non_object_import() {
        assert!(matches!(
            parse_import("[1, 2]"),
            Err(StoreError::InvalidInput(_))
        ));
        assert!(matches!(
            parse_import("not json"),
            Err(StoreError::InvalidInput(_))
        ));
    }

    #[test]
    fn skip_keeps_existing_prompts() {
        let existing = BTreeMap::from([("a".to_string(), record("old", &[]))]);
        let incoming = BTreeMap::from([
            ("a".to_string(), record("new", &[])),
            ("b".to_string(), record("Hi ${WHO}", &[])),
        ]);

        let plan = plan_import(&existing, incoming, ImportStrategy::Skip);
        assert_eq!(plan.skipped, vec!["a"]);
        assert_eq!(plan.imported, vec!["b"]);
        assert_eq!(plan.writes.len(), 1);
        assert_eq!(plan.writes[0].1.variables, vec!["WHO"]);
    }

    #[test]
    fn merge_unions_tags() {
        let existing = BTreeMap::from([("a".to_string(), record("old", &["x"]))]);
        let incoming = BTreeMap::from([("a".to_string(), record("new", &["y"]))]);

        let plan = plan_import(&existing, incoming, ImportStrategy::Merge);
        assert_eq!(plan.merged, vec!["a"]);
        let fields = &plan.writes[0].1;
        assert_eq!(fields.content, "new");
        assert_eq!(fields.tags, vec!["x", "y"]);
    }

    #[test]
    fn overwrite_replaces_and_empty_content_is_rejected() {
        let existing = BTreeMap::from([("a".to_string(), record("old", &["x"]))]);
        let incoming = BTreeMap::from([
            ("a".to_string(), record("new", &[])),
            ("empty".to_string(), record("  ", &[])),
        ]);

        let plan = plan_import(&existing, incoming, ImportStrategy::Overwrite);
        assert_eq!(plan.imported, vec!["a"]);
        assert_eq!(plan.rejected, vec!["empty"]);
        assert!(plan.writes[0].1.tags.is_empty());
    }
}
