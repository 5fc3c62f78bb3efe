//! Preview-then-confirm execution of prompt content as a shell command.

use crate::ui;
use console::style;
use std::process::Command;
use tracing::debug;

const PREVIEW_LINES: usize = 8;
const PREVIEW_WIDTH: usize = 56;

/// Shows the prompt, asks for confirmation and runs it through the shell.
///
/// The confirmation is always interactive; `--yes` does not apply to
/// running arbitrary commands.
pub fn present_and_run(name: &str, content: &str) -> Result<(), String> {
    let lines = content.split('\n').count();
    let chars = content.chars().count();

    println!();
    println!("{}", style("PROMPT READY FOR EXECUTION").bold());
    println!("  {} {}", style("Name:   ").dim(), style(name).yellow().bold());
    println!(
        "  {} {}",
        style("Metrics:").dim(),
        style(format!("{} lines • {} chars", lines, chars)).dim()
    );
    println!("  {}", style(format!("┌─ Preview {}┐", "─".repeat(47))).blue());
    for line in smart_preview(content, PREVIEW_LINES) {
        println!(
            "  {} {:<width$} {}",
            style("│").blue(),
            ui::truncate_line(&line, PREVIEW_WIDTH),
            style("│").blue(),
            width = PREVIEW_WIDTH
        );
    }
    println!("  {}", style(format!("└{}┘", "─".repeat(58))).blue());
    println!();

    if !ui::confirm(false, "Execute prompt?", false)? {
        println!("{}", style("Not executed").dim());
        return Ok(());
    }

    debug!(name, "executing prompt through the shell");
    let status = shell_command(content)
        .status()
        .map_err(|e| format!("Execution failed: {}", e))?;

    match status.code() {
        Some(0) => println!("{} Execution completed", style("•").green().bold()),
        Some(code) => println!("{} Exit code: {}", style("•").yellow().bold(), code),
        None => println!("{} Terminated by signal", style("•").yellow().bold()),
    }
    Ok(())
}

#[cfg(windows)]
fn shell_command(content: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(content);
    cmd
}

#[cfg(not(windows))]
fn shell_command(content: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(content);
    cmd
}

/// Non-empty lines; long content shows the first four and the last three
/// around a marker line.
pub fn smart_preview(content: &str, max_lines: usize) -> Vec<String> {
    let lines: Vec<&str> = content.lines().filter(|l| !l.trim().is_empty()).collect();
    if lines.len() <= max_lines.max(7) {
        return lines.into_iter().map(str::to_string).collect();
    }
    let mut preview: Vec<String> = lines[..4].iter().map(|l| l.to_string()).collect();
    preview.push(format!("   ... {} more lines ...", lines.len() - 7));
    preview.extend(lines[lines.len() - 3..].iter().map(|l| l.to_string()));
    preview
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_content_is_shown_whole() {
        assert_eq!(smart_preview("a\n\nb\n", 8), vec!["a", "b"]);
    }

    #[test]
    fn long_content_keeps_head_and_tail() {
        let content: Vec<String> = (1..=12).map(|i| format!("line {i}")).collect();
        let preview = smart_preview(&content.join("\n"), 8);

        assert_eq!(preview.len(), 8);
        assert_eq!(preview[0], "line 1");
        assert_eq!(preview[3], "line 4");
        assert!(preview[4].contains("5 more lines"));
        assert_eq!(preview[7], "line 12");
    }
}
