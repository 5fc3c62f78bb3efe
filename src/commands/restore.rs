use crate::core::context::AppCtx;
use crate::ui;
use console::style;

/// Replace the prompts document with a backup. The current document is
/// backed up first.
pub fn run(ctx: &AppCtx, backup: &str) -> Result<(), String> {
    let prompt = format!(
        "Restore all prompts from {}? The current state is backed up first.",
        backup
    );
    if !ui::confirm(ctx.assume_yes, &prompt, false)? {
        println!("{}", style("Cancelled").dim());
        return Ok(());
    }

    let doc = ctx
        .store
        .restore_backup(backup)
        .map_err(|e| e.to_string())?;
    println!(
        "{} restored {} ({} prompts)",
        style("•").green().bold(),
        backup,
        doc.prompts.len()
    );
    Ok(())
}
