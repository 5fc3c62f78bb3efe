use crate::core::context::AppCtx;
use crate::ui;
use console::style;

/// Delete a prompt after confirmation.
pub fn run(ctx: &AppCtx, name: &str) -> Result<(), String> {
    if !ctx.store.exists(name).map_err(|e| e.to_string())? {
        return Err(format!("Prompt '{}' not found", name));
    }
    if !ui::confirm(ctx.assume_yes, &format!("Delete prompt '{}'?", name), false)? {
        println!("{}", style("Cancelled").dim());
        return Ok(());
    }

    ctx.store.delete(name).map_err(|e| e.to_string())?;
    println!("{} prompt {} deleted", style("•").green().bold(), name);
    Ok(())
}
