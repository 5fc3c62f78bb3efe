use crate::core::context::AppCtx;
use crate::core::exchange::{parse_import, plan_import, ImportStrategy};
use crate::ui;
use console::style;
use std::fs;
use std::path::Path;

/// Import prompts from an export package or a bare name→prompt map.
pub fn run(ctx: &AppCtx, file: &Path, strategy: ImportStrategy) -> Result<(), String> {
    let body = fs::read_to_string(file)
        .map_err(|e| format!("Unable to read {}: {}", file.display(), e))?;
    let incoming = parse_import(&body).map_err(|e| e.to_string())?;
    if incoming.is_empty() {
        println!("{}", style("Nothing to import").yellow());
        return Ok(());
    }

    let existing = ctx.store.list_all().map_err(|e| e.to_string())?;
    let conflicts = incoming
        .keys()
        .filter(|name| existing.contains_key(*name))
        .count();

    println!("{}", style("Import").bold());
    println!("  {} {}", style("Source:  ").dim(), file.display());
    println!("  {} {} prompt(s)", style("Prompts: ").dim(), incoming.len());
    println!("  {} {}", style("Strategy:").dim(), strategy.describe());
    if conflicts > 0 {
        println!(
            "  {} {} existing prompt(s)",
            style("Conflicts:").dim(),
            conflicts
        );
    }
    if !ui::confirm(ctx.assume_yes, "Proceed with import?", true)? {
        println!("{}", style("Cancelled").dim());
        return Ok(());
    }

    let plan = plan_import(&existing, incoming, strategy);
    ctx.store
        .set_many(plan.writes)
        .map_err(|e| e.to_string())?;

    println!("{} Import complete", style("•").green().bold());
    if !plan.imported.is_empty() {
        println!("  {}", style(format!("{} prompt(s) imported", plan.imported.len())).green());
    }
    if !plan.merged.is_empty() {
        println!("  {}", style(format!("{} prompt(s) merged", plan.merged.len())).blue());
    }
    if !plan.skipped.is_empty() {
        println!("  {}", style(format!("{} prompt(s) skipped", plan.skipped.len())).yellow());
        println!(
            "{}",
            style("  Use --overwrite to replace or --merge to combine existing prompts").dim()
        );
    }
    if !plan.rejected.is_empty() {
        println!(
            "  {} {}",
            style("Rejected (no content):").red(),
            plan.rejected.join(", ")
        );
    }
    Ok(())
}
