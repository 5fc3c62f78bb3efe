use super::{clipboard, execute};
use crate::cli::OutputFormat;
use crate::core::context::AppCtx;
use crate::core::template::{parse_variables, substitute_variables};
use crate::sanitize::Sanitizer;
use crate::ui;
use base64::{engine::general_purpose, Engine as _};
use chrono::Utc;
use console::style;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

/// Flags of the `get` command.
#[derive(Debug, Default)]
pub struct GetOptions {
    pub vars: Vec<String>,
    pub raw: bool,
    pub scan_only: bool,
    pub stdout: bool,
    pub file: Option<PathBuf>,
    pub append: Option<PathBuf>,
    pub preview: bool,
    pub lines: usize,
    pub output: Option<OutputFormat>,
    pub execute: bool,
}

/// Retrieve a prompt, sanitized unless `--raw`, and deliver it.
///
/// Status notices go to stderr so stdout carries only the prompt.
pub fn run(ctx: &mut AppCtx, name: &str, opts: &GetOptions) -> Result<(), String> {
    let prompt = ctx
        .store
        .get(name)
        .map_err(|e| e.to_string())?
        .ok_or_else(|| {
            format!(
                "Prompt '{}' not found. Run `cuecli list` to see available prompts",
                name
            )
        })?;

    let mut content = prompt.content;
    if !opts.vars.is_empty() {
        let vars = parse_variables(&opts.vars).map_err(|e| e.to_string())?;
        content = substitute_variables(&content, &vars);
    }

    let findings = ctx.sanitizer.scan(&content);

    if opts.scan_only {
        if findings.is_empty() {
            println!("{}", style("No sensitive data found").green());
        } else {
            println!("{}", style("Sensitive data found:").yellow().bold());
            ui::print_findings(&findings);
        }
        return Ok(());
    }

    if opts.raw {
        if !findings.is_empty() {
            eprintln!(
                "{}",
                style("WARNING: Output contains sensitive data").red().bold()
            );
            for f in &findings {
                eprintln!("  - {}: {} occurrence(s)", f.category, f.count);
            }
        }
    } else {
        content = redact(&mut ctx.sanitizer, &content);
    }

    if opts.execute {
        return execute::present_and_run(name, &content);
    }

    if let Some(format) = opts.output {
        println!("{}", render_output(format, name, &content)?);
    } else if opts.stdout {
        println!("{}", content);
    } else if let Some(path) = &opts.file {
        fs::write(path, &content)
            .map_err(|e| format!("Unable to write {}: {}", path.display(), e))?;
        println!("{} Saved to {}", style("•").green().bold(), path.display());
    } else if let Some(path) = &opts.append {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| format!("Unable to open {}: {}", path.display(), e))?;
        write!(file, "\n{}", content)
            .map_err(|e| format!("Unable to write {}: {}", path.display(), e))?;
        println!("{} Appended to {}", style("•").green().bold(), path.display());
    } else if opts.preview {
        print_preview(name, &content, opts.lines);
    } else {
        match clipboard::write(&content) {
            Ok(()) => println!(
                "{} '{}' copied to clipboard ({} lines • {} chars)",
                style("•").green().bold(),
                name,
                content.split('\n').count(),
                content.chars().count()
            ),
            Err(e) => {
                eprintln!("{} {}", style("•").yellow().bold(), e);
                println!("{}", content);
            }
        }
    }
    Ok(())
}

/// Sanitizes `content`, reporting on stderr when anything was redacted.
fn redact(sanitizer: &mut Sanitizer, content: &str) -> String {
    let sanitized = sanitizer.sanitize(content);
    let stats = sanitizer.stats();
    if stats.total_redacted > 0 {
        eprintln!(
            "{}",
            style(format!(
                "Sanitized {} sensitive item(s) for safety",
                stats.total_redacted
            ))
            .yellow()
        );
        for (category, count) in &stats.by_type {
            eprintln!("  - {}: {}", category, count);
        }
        eprintln!("{}", style("  Use --raw to bypass sanitization").dim());
    }
    sanitized
}

fn print_preview(name: &str, content: &str, max_lines: usize) {
    let lines: Vec<&str> = content.split('\n').collect();
    println!("{}", style(format!("Preview of '{}':", name)).cyan());
    println!("{}", style("─".repeat(50)).dim());
    for (i, line) in lines.iter().take(max_lines).enumerate() {
        println!("{} {}", style(format!("{:>3} │", i + 1)).dim(), line);
    }
    if lines.len() > max_lines {
        println!(
            "{}",
            style(format!("... ({} more lines)", lines.len() - max_lines)).dim()
        );
    }
    println!("{}", style("─".repeat(50)).dim());
}

/// Formats prompt content for `--output`.
pub fn render_output(format: OutputFormat, name: &str, content: &str) -> Result<String, String> {
    let now = Utc::now().to_rfc3339();
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(&serde_json::json!({
            "name": name,
            "content": content,
            "timestamp": now,
        }))
        .map_err(|e| format!("Serialize error: {}", e))?,
        OutputFormat::Markdown => format!("# {}\n\n{}", name, content),
        OutputFormat::Html => format!(
            "<!DOCTYPE html>\n<html>\n<head>\n  <title>{title}</title>\n  <meta charset=\"utf-8\">\n</head>\n<body>\n  <h1>{title}</h1>\n  <pre>{body}</pre>\n  <footer><small>Generated by cuecli at {now}</small></footer>\n</body>\n</html>",
            title = escape_html(name),
            body = escape_html(content),
            now = now,
        ),
        OutputFormat::Base64 => general_purpose::STANDARD.encode(content),
    })
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_rules_are_applied_without_builtin_findings() {
        let mut sanitizer = Sanitizer::new().unwrap();
        sanitizer.add_custom_pattern(r"emp-\d{6}").unwrap();

        let out = redact(&mut sanitizer, "escalate to EMP-123456");

        assert!(!out.contains("123456"));
        assert_eq!(out.chars().count(), "escalate to EMP-123456".chars().count());
        assert_eq!(redact(&mut sanitizer, "nothing here"), "nothing here");
    }

    #[test]
    fn base64_output() {
        let out = render_output(OutputFormat::Base64, "n", "hello").unwrap();
        assert_eq!(out, "aGVsbG8=");
    }

    #[test]
    fn json_output_carries_name_and_content() {
        let out = render_output(OutputFormat::Json, "greet", "Hi").unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["name"], "greet");
        assert_eq!(value["content"], "Hi");
    }

    #[test]
    fn html_output_is_escaped() {
        let out = render_output(OutputFormat::Html, "a<b", "<script>'x' & \"y\"</script>").unwrap();
        assert!(out.contains("<title>a&lt;b</title>"));
        assert!(out.contains("&lt;script&gt;&#039;x&#039; &amp; &quot;y&quot;&lt;/script&gt;"));
    }

    #[test]
    fn markdown_output_has_heading() {
        assert_eq!(
            render_output(OutputFormat::Markdown, "n", "body").unwrap(),
            "# n\n\nbody"
        );
    }
}
