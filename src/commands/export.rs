use crate::cli::ExportFormat;
use crate::core::context::AppCtx;
use crate::core::exchange::ExportPackage;
use crate::core::storage::PromptRecord;
use crate::sanitize::Sanitizer;
use crate::ui;
use console::style;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Export prompts to a file or stdout, sanitized unless `--raw`.
pub fn run(
    ctx: &mut AppCtx,
    output: Option<&Path>,
    format: ExportFormat,
    names: &[String],
    raw: bool,
    force: bool,
) -> Result<(), String> {
    let all = ctx.store.list_all().map_err(|e| e.to_string())?;
    let mut selected: BTreeMap<String, PromptRecord> = if names.is_empty() {
        all
    } else {
        let mut picked = BTreeMap::new();
        for name in names {
            match all.get(name) {
                Some(record) => {
                    picked.insert(name.clone(), record.clone());
                }
                None => eprintln!(
                    "{} {}",
                    style("•").yellow().bold(),
                    style(format!("Prompt '{}' not found, skipped", name)).yellow()
                ),
            }
        }
        picked
    };

    if selected.is_empty() {
        return Err("No prompts to export".to_string());
    }

    if raw {
        let sensitive = selected
            .values()
            .any(|p| ctx.sanitizer.has_sensitive_data(&p.content));
        if sensitive {
            eprintln!(
                "{}",
                style("WARNING: Exporting with sensitive data intact").red().bold()
            );
        }
    } else {
        let sanitized = sanitize_prompts(&mut ctx.sanitizer, &mut selected);
        if sanitized > 0 {
            eprintln!(
                "{}",
                style(format!(
                    "Sanitized sensitive data in {} prompt(s) for safety",
                    sanitized
                ))
                .yellow()
            );
            eprintln!("{}", style("  Use --raw to export without sanitization").dim());
        }
    }

    let package = ExportPackage::new(selected);
    let body = match format {
        ExportFormat::Json => serde_json::to_string_pretty(&package)
            .map_err(|e| format!("Serialize error: {}", e))?,
        ExportFormat::Markdown => package.to_markdown(),
        ExportFormat::Yaml => {
            serde_yaml::to_string(&package).map_err(|e| format!("Serialize error: {}", e))?
        }
        ExportFormat::Minimal => serde_json::to_string_pretty(&package.prompts)
            .map_err(|e| format!("Serialize error: {}", e))?,
    };

    let Some(path) = output else {
        println!("{}", body);
        return Ok(());
    };

    if path.exists() && !force {
        let overwrite = ui::confirm(
            ctx.assume_yes,
            &format!("{} exists. Overwrite?", path.display()),
            false,
        )?;
        if !overwrite {
            println!("{}", style("Cancelled").dim());
            return Ok(());
        }
    }
    fs::write(path, body).map_err(|e| format!("Unable to write {}: {}", path.display(), e))?;
    println!(
        "{} Exported {} prompt(s) to {}",
        style("•").green().bold(),
        package.metadata.count,
        path.display()
    );
    Ok(())
}

/// Redacts every prompt in place. Returns how many changed.
fn sanitize_prompts(sanitizer: &mut Sanitizer, prompts: &mut BTreeMap<String, PromptRecord>) -> usize {
    let mut changed = 0;
    for prompt in prompts.values_mut() {
        let sanitized = sanitizer.sanitize(&prompt.content);
        if sanitizer.stats().total_redacted > 0 {
            prompt.content = sanitized;
            changed += 1;
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(content: &str) -> PromptRecord {
        PromptRecord {
            name: String::new(),
            content: content.to_string(),
            tags: Default::default(),
            variables: Vec::new(),
            created: Utc::now(),
            modified: Utc::now(),
            version: 1,
            extra: Default::default(),
        }
    }

    #[test]
    fn only_prompts_with_findings_are_rewritten() {
        let mut sanitizer = Sanitizer::new().unwrap();
        let mut prompts = BTreeMap::from([
            ("clean".to_string(), record("Summarize this")),
            ("secret".to_string(), record("password: hunter2")),
        ]);

        assert_eq!(sanitize_prompts(&mut sanitizer, &mut prompts), 1);
        assert_eq!(prompts["clean"].content, "Summarize this");
        assert!(!prompts["secret"].content.contains("hunter2"));
    }

    #[test]
    fn custom_rules_apply_on_export() {
        let mut sanitizer = Sanitizer::new().unwrap();
        sanitizer.add_custom_pattern(r"emp-\d{6}").unwrap();
        let mut prompts = BTreeMap::from([("ticket".to_string(), record("ask EMP-123456"))]);

        assert_eq!(sanitize_prompts(&mut sanitizer, &mut prompts), 1);
        assert!(!prompts["ticket"].content.contains("123456"));
    }
}
