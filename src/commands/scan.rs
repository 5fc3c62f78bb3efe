use crate::core::context::AppCtx;
use crate::ui;
use console::style;

/// Report what sanitization would find and redact in a prompt.
pub fn run(ctx: &mut AppCtx, name: &str, json: bool) -> Result<(), String> {
    let prompt = ctx
        .store
        .get(name)
        .map_err(|e| e.to_string())?
        .ok_or_else(|| format!("Prompt '{}' not found", name))?;

    let report = ctx.sanitizer.create_report(&prompt.content);

    if json {
        let out = serde_json::to_string_pretty(&report)
            .map_err(|e| format!("Serialize error: {}", e))?;
        println!("{}", out);
        return Ok(());
    }

    println!("{}", style(format!("Scan of '{}'", name)).bold());
    println!(
        "  {} {} chars, {} lines",
        style("Size:").dim(),
        report.original.length,
        report.original.lines
    );
    if report.findings.is_empty() {
        println!("{}", style("No sensitive data found").green());
        return Ok(());
    }

    println!("{}", style("Findings:").yellow().bold());
    ui::print_findings(&report.findings);
    println!(
        "{}",
        style(format!(
            "Sanitizing would redact {} item(s):",
            report.stats.total_redacted
        ))
        .yellow()
    );
    ui::print_stats(&report.stats);
    Ok(())
}
