//! Shared terminal helpers for commands.

use console::style;
use dialoguer::theme::ColorfulTheme;
use dialoguer::Confirm;

use crate::sanitize::{Finding, SanitizationStats};

pub fn theme() -> ColorfulTheme {
    ColorfulTheme::default()
}

/// Asks a yes/no question. Returns `true` straight away when confirmations
/// are disabled.
pub fn confirm(assume_yes: bool, prompt: &str, default: bool) -> Result<bool, String> {
    if assume_yes {
        return Ok(true);
    }
    Confirm::with_theme(&theme())
        .with_prompt(prompt)
        .default(default)
        .interact()
        .map_err(|e| format!("Prompt error: {}", e))
}

pub fn print_findings(findings: &[Finding]) {
    for f in findings {
        println!(
            "  {} {}: {} occurrence(s)",
            style("-").yellow(),
            style(f.category).yellow(),
            f.count
        );
        for sample in &f.samples {
            println!("      {}", style(sample).dim());
        }
    }
}

pub fn print_stats(stats: &SanitizationStats) {
    for (category, count) in &stats.by_type {
        println!("  {} {}: {}", style("-").dim(), category, count);
    }
}

/// Cuts a line to `max` characters, marking the cut with `...`.
pub fn truncate_line(line: &str, max: usize) -> String {
    if line.chars().count() <= max {
        return line.to_string();
    }
    let kept: String = line.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_line_counts_characters() {
        assert_eq!(truncate_line("short", 10), "short");
        assert_eq!(truncate_line("ééééééé", 5), "éé...");
    }
}
