use crate::api::PromptFields;
use crate::core::context::AppCtx;
use crate::core::template::extract_variables;
use console::style;
use std::fs;
use std::io::Write;
use std::process::Command;
use tracing::debug;

/// Edit a prompt's content in an external editor and save a new version
/// if it changed.
pub fn run(ctx: &AppCtx, name: &str, editor: Option<&str>) -> Result<(), String> {
    let prompt = ctx
        .store
        .get(name)
        .map_err(|e| e.to_string())?
        .ok_or_else(|| format!("Prompt '{}' not found", name))?;

    let editor = editor
        .map(str::to_string)
        .unwrap_or_else(|| ctx.config.editor());
    let mut parts =
        shell_words::split(&editor).map_err(|e| format!("Invalid editor command: {}", e))?;
    if parts.is_empty() {
        return Err("Editor command is empty".to_string());
    }
    let program = parts.remove(0);

    let mut tmp = tempfile::Builder::new()
        .prefix("cuecli-edit-")
        .suffix(".md")
        .tempfile()
        .map_err(|e| format!("Unable to create temp file: {}", e))?;
    tmp.write_all(prompt.content.as_bytes())
        .and_then(|_| tmp.flush())
        .map_err(|e| format!("Unable to write temp file: {}", e))?;

    debug!(editor = %program, file = %tmp.path().display(), "opening editor");
    let status = Command::new(&program)
        .args(&parts)
        .arg(tmp.path())
        .status()
        .map_err(|e| format!("Unable to start editor '{}': {}", program, e))?;
    if !status.success() {
        return Err(format!("Editor exited with {}", status));
    }

    let edited = fs::read_to_string(tmp.path())
        .map_err(|e| format!("Unable to read edited content: {}", e))?;
    if edited == prompt.content {
        println!("{}", style("No changes made").dim());
        return Ok(());
    }

    let fields = PromptFields {
        variables: extract_variables(&edited),
        tags: prompt.tags.into_iter().collect(),
        content: edited,
    };
    let saved = ctx.store.set(name, fields).map_err(|e| e.to_string())?;
    println!(
        "{} Prompt '{}' updated (v{})",
        style("•").green().bold(),
        style(name).yellow(),
        saved.version
    );
    Ok(())
}
