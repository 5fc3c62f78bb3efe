use cuecli::core::exchange::{parse_import, plan_import, ExportPackage, ImportStrategy};
use cuecli::core::template::extract_variables;
use cuecli::sanitize::Category;
use cuecli::{PromptFields, PromptStore, Sanitizer, StoreError};
use std::collections::BTreeSet;
use std::fs;
use tempfile::tempdir;

#[test]
fn prompts_survive_reopening_the_store() {
    let dir = tempdir().unwrap();
    {
        let store = PromptStore::open(dir.path(), 10).unwrap();
        let content = "Review {{FILE}} for ${LANG} issues";
        store
            .set(
                "review",
                PromptFields::new(content)
                    .with_tags(["code"])
                    .with_variables(extract_variables(content)),
            )
            .unwrap();
    }

    let store = PromptStore::open(dir.path(), 10).unwrap();
    let review = store.get("review").unwrap().unwrap();
    assert_eq!(review.version, 1);
    assert_eq!(review.variables, vec!["FILE", "LANG"]);
    assert!(review.tags.contains("code"));

    let raw: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("prompts.json")).unwrap())
            .unwrap();
    assert_eq!(raw["prompts"]["review"]["name"], "review");
    assert_eq!(raw["prompts"]["review"]["version"], 1);
    assert!(raw["config"]["createdAt"].is_string());
}

#[test]
fn backups_are_capped_at_the_retention_limit() {
    let dir = tempdir().unwrap();
    let store = PromptStore::open(dir.path(), 10).unwrap();

    for i in 0..13 {
        store
            .set("a", PromptFields::new(format!("revision {i}")))
            .unwrap();
    }

    let backups = store.list_backups().unwrap();
    assert_eq!(backups.len(), 10);
    let on_disk = fs::read_dir(dir.path().join("backups")).unwrap().count();
    assert_eq!(on_disk, 10);

    // The newest backup is the state just before the last write.
    store.restore_backup(&backups[0].name).unwrap();
    let a = store.get("a").unwrap().unwrap();
    assert_eq!(a.content, "revision 11");
    assert_eq!(a.version, 12);
}

#[test]
fn export_sanitizes_and_import_round_trips() {
    let source_dir = tempdir().unwrap();
    let source = PromptStore::open(source_dir.path(), 10).unwrap();
    source
        .set(
            "deploy",
            PromptFields::new("ssh in with password: hunter2 then run the script")
                .with_tags(["ops"]),
        )
        .unwrap();
    source
        .set("summary", PromptFields::new("Summarize {{TEXT}}").with_variables(["TEXT"]))
        .unwrap();

    let mut sanitizer = Sanitizer::new().unwrap();
    let mut prompts = source.list_all().unwrap();
    for prompt in prompts.values_mut() {
        prompt.content = sanitizer.sanitize(&prompt.content);
    }
    let package = serde_json::to_string_pretty(&ExportPackage::new(prompts)).unwrap();
    assert!(!package.contains("hunter2"));

    let target_dir = tempdir().unwrap();
    let target = PromptStore::open(target_dir.path(), 10).unwrap();
    let incoming = parse_import(&package).unwrap();
    let plan = plan_import(&target.list_all().unwrap(), incoming, ImportStrategy::Skip);
    target.set_many(plan.writes).unwrap();

    let imported = target.list_all().unwrap();
    assert_eq!(imported.len(), 2);
    assert_eq!(imported["summary"].variables, vec!["TEXT"]);
    assert_eq!(imported["summary"].version, 1);
    assert_eq!(
        imported["deploy"].content.chars().count(),
        "ssh in with password: hunter2 then run the script".chars().count()
    );

    let ops = target
        .list_by_tags(&BTreeSet::from(["ops".to_string()]))
        .unwrap();
    assert_eq!(ops.len(), 1);
}

#[test]
fn sanitizer_options_come_from_configuration() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("config.toml"),
        "[sanitizer]\nenabled = [\"emails\"]\npreserve_structure = false\nreplace_with = \"<hidden>\"\n",
    )
    .unwrap();

    let config = cuecli::core::config::load_app_config(dir.path()).unwrap();
    let options = config.sanitizer.to_options().unwrap();
    assert_eq!(options.enabled, BTreeSet::from([Category::Emails]));

    let mut sanitizer = Sanitizer::with_options(options).unwrap();
    assert_eq!(
        sanitizer.sanitize("write to ops@example.com, password: x"),
        "write to <hidden>, password: x"
    );
}

#[test]
fn invalid_names_never_reach_the_document() {
    let dir = tempdir().unwrap();
    let store = PromptStore::open(dir.path(), 10).unwrap();

    let err = store.set("", PromptFields::new("content")).unwrap_err();
    assert!(matches!(err, StoreError::InvalidInput(_)));
    assert!(store.list_all().unwrap().is_empty());
}
