use crate::core::context::AppCtx;
use chrono::{DateTime, Utc};
use console::style;
use std::collections::BTreeSet;

const PREVIEW_CHARS: usize = 50;

/// List saved prompts, optionally filtered by tag.
pub fn run(ctx: &AppCtx, tags: &[String], json: bool) -> Result<(), String> {
    let filter: BTreeSet<String> = tags
        .iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();
    let prompts = ctx
        .store
        .list_by_tags(&filter)
        .map_err(|e| e.to_string())?;

    if json {
        let out = serde_json::to_string_pretty(&prompts)
            .map_err(|e| format!("Serialize error: {}", e))?;
        println!("{}", out);
        return Ok(());
    }

    if prompts.is_empty() {
        if filter.is_empty() {
            println!("{}", style("No prompts found").yellow());
            println!(
                "{}",
                style("Run `cuecli add <name>` to create your first prompt").dim()
            );
        } else {
            println!("{}", style("No prompts found with the specified tags").yellow());
        }
        return Ok(());
    }

    let count = prompts.len();
    println!(
        "{}",
        style(format!(
            "Found {} prompt{}:",
            count,
            if count == 1 { "" } else { "s" }
        ))
        .green()
        .bold()
    );

    let now = Utc::now();
    for (name, prompt) in &prompts {
        println!(
            "  {} {} {}",
            style("•").green(),
            style(name).yellow(),
            style(format!("v{}", prompt.version)).dim()
        );

        let first_line = prompt.content.lines().next().unwrap_or("");
        let preview: String = first_line.chars().take(PREVIEW_CHARS).collect();
        let ellipsis = if prompt.content.chars().count() > PREVIEW_CHARS
            || prompt.content.contains('\n')
        {
            "..."
        } else {
            ""
        };
        println!("    {}", style(format!("{}{}", preview, ellipsis)).dim());

        if !prompt.tags.is_empty() {
            let tags: Vec<&str> = prompt.tags.iter().map(String::as_str).collect();
            println!("    {} {}", style("Tags:").dim(), style(tags.join(", ")).blue());
        }
        if !prompt.variables.is_empty() {
            println!(
                "    {} {}",
                style("Variables:").dim(),
                style(prompt.variables.join(", ")).magenta()
            );
        }
        println!(
            "    {}",
            style(format!("Modified: {}", relative_time(prompt.modified, now))).dim()
        );
    }
    Ok(())
}

/// Coarse "N units ago" description.
fn relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(then);
    let plural = |n: i64, unit: &str| format!("{} {}{} ago", n, unit, if n == 1 { "" } else { "s" });

    if elapsed.num_days() > 0 {
        plural(elapsed.num_days(), "day")
    } else if elapsed.num_hours() > 0 {
        plural(elapsed.num_hours(), "hour")
    } else if elapsed.num_minutes() > 0 {
        plural(elapsed.num_minutes(), "minute")
    } else {
        "just now".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn relative_time_picks_largest_unit() {
        let now = Utc::now();
        assert_eq!(relative_time(now, now), "just now");
        assert_eq!(relative_time(now - Duration::minutes(1), now), "1 minute ago");
        assert_eq!(relative_time(now - Duration::hours(5), now), "5 hours ago");
        assert_eq!(relative_time(now - Duration::days(2), now), "2 days ago");
    }
}
