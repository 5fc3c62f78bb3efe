use crate::core::context::AppCtx;
use chrono::Local;
use console::style;

/// List document backups, newest first.
pub fn run(ctx: &AppCtx) -> Result<(), String> {
    let backups = ctx.store.list_backups().map_err(|e| e.to_string())?;

    if backups.is_empty() {
        println!("{}", style("No backups").yellow());
        return Ok(());
    }

    println!("{}", style("Backups (newest first):").green().bold());
    for b in backups {
        println!(
            "  {} {}  {}  {}",
            style("•").green(),
            b.name,
            style(b.modified.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")).dim(),
            style(format!("{} bytes", b.size)).dim()
        );
    }
    println!(
        "{}",
        style("Use `cuecli restore <name>` to restore one").dim()
    );
    Ok(())
}
