use crate::core::config::config_path;
use crate::core::context::AppCtx;
use console::style;
use serde_json::{Map, Value};

/// Show all settings, show one, or set one.
pub fn run(ctx: &AppCtx, key: Option<&str>, value: Option<&str>) -> Result<(), String> {
    match (key, value) {
        (None, _) => {
            let config = ctx.store.config().map_err(|e| e.to_string())?;
            println!("{}", style("Document settings:").green().bold());
            for (k, v) in &config {
                println!("  {} {} = {}", style("•").green(), style(k).yellow(), v);
            }
            println!(
                "{} {}",
                style("Application settings file:").dim(),
                config_path(&ctx.base_dir).display()
            );
            Ok(())
        }
        (Some(key), None) => {
            let config = ctx.store.config().map_err(|e| e.to_string())?;
            let value = config
                .get(key)
                .ok_or_else(|| format!("No setting named '{}'", key))?;
            println!("{}", value);
            Ok(())
        }
        (Some(key), Some(raw)) => {
            let mut updates = Map::new();
            updates.insert(key.to_string(), parse_value(raw));
            let config = ctx
                .store
                .update_config(updates)
                .map_err(|e| e.to_string())?;
            println!(
                "{} {} = {}",
                style("•").green().bold(),
                key,
                config.get(key).cloned().unwrap_or(Value::Null)
            );
            Ok(())
        }
    }
}

/// JSON literals are stored as typed values, anything else as a string.
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
