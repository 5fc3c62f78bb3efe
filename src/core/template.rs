//! `{{NAME}}` and `${NAME}` placeholders in prompt content.

use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::sync::OnceLock;

use crate::api::StoreError;

static MUSTACHE: OnceLock<Regex> = OnceLock::new();
static DOLLAR: OnceLock<Regex> = OnceLock::new();

fn mustache() -> &'static Regex {
    MUSTACHE.get_or_init(|| Regex::new(r"\{\{([^}]+)\}\}").expect("static pattern"))
}

fn dollar() -> &'static Regex {
    DOLLAR.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("static pattern"))
}

/// Placeholder names in first-seen order, `{{..}}` forms before `${..}`.
pub fn extract_variables(content: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for re in [mustache(), dollar()] {
        for caps in re.captures_iter(content) {
            let name = caps[1].trim();
            if !name.is_empty() && !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
    }
    names
}

/// Parses `KEY=VALUE` assignments. Splits on the first `=`.
pub fn parse_variables<S: AsRef<str>>(
    assignments: &[S],
) -> Result<BTreeMap<String, String>, StoreError> {
    let mut vars = BTreeMap::new();
    for raw in assignments {
        let raw = raw.as_ref();
        let (key, value) = raw.split_once('=').ok_or_else(|| {
            StoreError::InvalidInput(format!("Invalid variable '{}', expected KEY=VALUE", raw))
        })?;
        let key = key.trim();
        if key.is_empty() {
            return Err(StoreError::InvalidInput(format!(
                "Invalid variable '{}', name is empty",
                raw
            )));
        }
        vars.insert(key.to_string(), value.trim().to_string());
    }
    Ok(vars)
}

/// Replaces known placeholders. Unknown ones are left as written.
pub fn substitute_variables(content: &str, vars: &BTreeMap<String, String>) -> String {
    if vars.is_empty() {
        return content.to_string();
    }
    let replace = |caps: &Captures| match vars.get(caps[1].trim()) {
        Some(value) => value.clone(),
        None => caps[0].to_string(),
    };
    let first = mustache().replace_all(content, replace);
    dollar().replace_all(&first, replace).into_owned()
}
