use super::clipboard;
use crate::api::PromptFields;
use crate::core::context::AppCtx;
use crate::core::template::extract_variables;
use crate::ui;
use console::style;
use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::Path;

/// Save a prompt from a file, the clipboard or stdin.
pub fn run(
    ctx: &AppCtx,
    name: &str,
    from_file: Option<&Path>,
    from_clipboard: bool,
    tags: &[String],
    force: bool,
) -> Result<(), String> {
    if !force && ctx.store.exists(name).map_err(|e| e.to_string())? {
        let overwrite = ui::confirm(
            ctx.assume_yes,
            &format!("Prompt '{}' already exists. Overwrite?", name),
            false,
        )?;
        if !overwrite {
            println!("{}", style("Cancelled").dim());
            return Ok(());
        }
    }

    let content = if let Some(path) = from_file {
        println!("{}", style(format!("Reading from {}...", path.display())).dim());
        fs::read_to_string(path)
            .map_err(|e| format!("Unable to read {}: {}", path.display(), e))?
    } else if from_clipboard {
        println!("{}", style("Reading from clipboard...").dim());
        clipboard::read()?
    } else {
        read_stdin()?
    };

    if content.trim().is_empty() {
        return Err("Prompt content cannot be empty".to_string());
    }

    let size = content.chars().count();
    let variables = extract_variables(&content);
    let saved = ctx
        .store
        .set(
            name,
            PromptFields {
                content,
                tags: tags.to_vec(),
                variables,
            },
        )
        .map_err(|e| e.to_string())?;

    println!(
        "{} Prompt '{}' saved",
        style("•").green().bold(),
        style(name).yellow()
    );
    if !saved.tags.is_empty() {
        let tags: Vec<&str> = saved.tags.iter().map(String::as_str).collect();
        println!("  {} {}", style("Tags:").dim(), tags.join(", "));
    }
    if !saved.variables.is_empty() {
        println!(
            "  {} {}",
            style("Variables detected:").dim(),
            saved.variables.join(", ")
        );
    }
    println!("  {}", style(format!("Version: {}", saved.version)).dim());
    println!("  {}", style(format!("Size: {} characters", size)).dim());
    Ok(())
}

fn read_stdin() -> Result<String, String> {
    let mut stdin = io::stdin();
    if stdin.is_terminal() {
        println!(
            "{}",
            style("Enter prompt content (Ctrl+D when done):").dim()
        );
    }
    let mut buf = String::new();
    stdin
        .read_to_string(&mut buf)
        .map_err(|e| format!("Unable to read stdin: {}", e))?;
    Ok(buf.trim().to_string())
}
