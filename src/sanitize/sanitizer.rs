//! Scanning and redaction over the compiled [`PatternRegistry`].

use chrono::{DateTime, Utc};
use regex::{Captures, Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::iter;
use tracing::debug;

use super::patterns::{Category, PatternRegistry};
use super::SanitizerError;

/// Replacement token used unless configured otherwise.
pub const DEFAULT_REPLACEMENT: &str = "[REDACTED]";
/// Filler used to pad the token in structure-preserving mode.
pub const DEFAULT_FILL_CHAR: char = '*';

const MAX_SAMPLES: usize = 3;
const SAMPLE_PREFIX_CHARS: usize = 10;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// How matches are detected and replaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanitizerOptions {
    pub replace_with: String,
    pub fill_char: char,
    pub enabled: BTreeSet<Category>,
    /// Pad (or cut) the replacement to the match length so the text keeps
    /// its shape. When false every match collapses to `replace_with`.
    pub preserve_structure: bool,
}

impl Default for SanitizerOptions {
    fn default() -> Self {
        Self {
            replace_with: DEFAULT_REPLACEMENT.to_string(),
            fill_char: DEFAULT_FILL_CHAR,
            enabled: Category::DEFAULT_ENABLED.into_iter().collect(),
            preserve_structure: true,
        }
    }
}

/// Partial options for [`Sanitizer::configure`]; `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct SanitizerUpdate {
    pub replace_with: Option<String>,
    pub fill_char: Option<char>,
    pub enabled: Option<BTreeSet<Category>>,
    pub preserve_structure: Option<bool>,
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Matches of one category found by [`Sanitizer::scan`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub category: Category,
    pub count: usize,
    /// At most three truncated samples; never a full match.
    pub samples: Vec<String>,
}

/// Counters for the most recent [`Sanitizer::sanitize`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SanitizationStats {
    pub total_redacted: usize,
    pub by_type: BTreeMap<Category, usize>,
}

impl SanitizationStats {
    fn record(&mut self, category: Category, count: usize) {
        self.total_redacted += count;
        *self.by_type.entry(category).or_insert(0) += count;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextMetrics {
    /// Length in characters.
    pub length: usize,
    pub lines: usize,
}

impl TextMetrics {
    fn of(text: &str) -> Self {
        Self {
            length: text.chars().count(),
            lines: text.split('\n').count(),
        }
    }
}

/// Before/after summary produced by [`Sanitizer::create_report`].
#[derive(Debug, Clone, Serialize)]
pub struct SanitizationReport {
    pub original: TextMetrics,
    pub sanitized: TextMetrics,
    pub findings: Vec<Finding>,
    pub stats: SanitizationStats,
    pub timestamp: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Sanitizer
// ---------------------------------------------------------------------------

/// Detects and redacts sensitive spans in text.
///
/// Inputs are never modified: [`scan`](Self::scan) is a pure read, and
/// [`sanitize`](Self::sanitize) returns a redacted copy and is the only
/// call that touches [`stats`](Self::stats).
///
/// # Example
///
/// ```rust
/// use cuecli::sanitize::{Category, Sanitizer};
///
/// let mut sanitizer = Sanitizer::new().unwrap();
/// let text = "token: abcdEFGH12345678901234567890XY";
///
/// let findings = sanitizer.scan(text);
/// assert_eq!(findings[0].category, Category::ApiKeys);
///
/// let clean = sanitizer.sanitize(text);
/// assert_eq!(clean.len(), text.len());
/// assert!(clean.starts_with("[REDACTED]**"));
/// ```
#[derive(Debug, Clone)]
pub struct Sanitizer {
    registry: PatternRegistry,
    custom: Vec<Regex>,
    options: SanitizerOptions,
    stats: SanitizationStats,
}

impl Sanitizer {
    /// Builds a sanitizer with the default options.
    pub fn new() -> Result<Self, SanitizerError> {
        Self::with_options(SanitizerOptions::default())
    }

    pub fn with_options(options: SanitizerOptions) -> Result<Self, SanitizerError> {
        Ok(Self {
            registry: PatternRegistry::builtin()?,
            custom: Vec::new(),
            options,
            stats: SanitizationStats::default(),
        })
    }

    pub fn options(&self) -> &SanitizerOptions {
        &self.options
    }

    /// Merges `update` into the current options. Affects later calls only.
    pub fn configure(&mut self, update: SanitizerUpdate) {
        if let Some(replace_with) = update.replace_with {
            self.options.replace_with = replace_with;
        }
        if let Some(fill_char) = update.fill_char {
            self.options.fill_char = fill_char;
        }
        if let Some(enabled) = update.enabled {
            self.options.enabled = enabled;
        }
        if let Some(preserve_structure) = update.preserve_structure {
            self.options.preserve_structure = preserve_structure;
        }
    }

    /// Adds a case-insensitive custom rule, applied by `sanitize` after
    /// the built-in categories and counted under [`Category::Custom`].
    pub fn add_custom_pattern(&mut self, pattern: &str) -> Result<(), SanitizerError> {
        let regex = RegexBuilder::new(pattern).case_insensitive(true).build()?;
        self.custom.push(regex);
        Ok(())
    }

    /// Adds a precompiled custom rule.
    pub fn add_custom_regex(&mut self, regex: Regex) {
        self.custom.push(regex);
    }

    /// Counters from the last `sanitize` call.
    pub fn stats(&self) -> &SanitizationStats {
        &self.stats
    }

    /// Reports matches of every enabled category, one [`Finding`] per
    /// category that matched. Does not touch the stats.
    pub fn scan(&self, text: &str) -> Vec<Finding> {
        let mut findings = Vec::new();
        for &category in &self.options.enabled {
            let mut count = 0;
            let mut samples = Vec::new();
            for rule in self.registry.rules_for(category) {
                for m in rule.regex.find_iter(text) {
                    count += 1;
                    if samples.len() < MAX_SAMPLES {
                        samples.push(sample(m.as_str()));
                    }
                }
            }
            if count > 0 {
                findings.push(Finding {
                    category,
                    count,
                    samples,
                });
            }
        }
        findings
    }

    /// True if any enabled category matches.
    pub fn has_sensitive_data(&self, text: &str) -> bool {
        self.options.enabled.iter().any(|&category| {
            self.registry
                .rules_for(category)
                .any(|rule| rule.regex.is_match(text))
        })
    }

    /// Returns a redacted copy of `text` and replaces the stats with the
    /// counts from this call.
    ///
    /// Rules run one after another over the progressively redacted text:
    /// enabled categories in declaration order, then custom rules.
    pub fn sanitize(&mut self, text: &str) -> String {
        let mut stats = SanitizationStats::default();
        let mut sanitized = text.to_string();

        for &category in &self.options.enabled {
            for rule in self.registry.rules_for(category) {
                let (next, count) = self.replace_all(&rule.regex, &sanitized);
                if count > 0 {
                    debug!(category = %category, rule = rule.name, count, "redacted matches");
                    stats.record(category, count);
                    sanitized = next;
                }
            }
        }

        for regex in &self.custom {
            let (next, count) = self.replace_all(regex, &sanitized);
            if count > 0 {
                debug!(category = %Category::Custom, count, "redacted matches");
                stats.record(Category::Custom, count);
                sanitized = next;
            }
        }

        self.stats = stats;
        sanitized
    }

    /// Scans, then sanitizes, and summarises both.
    pub fn create_report(&mut self, text: &str) -> SanitizationReport {
        let findings = self.scan(text);
        let sanitized = self.sanitize(text);
        SanitizationReport {
            original: TextMetrics::of(text),
            sanitized: TextMetrics::of(&sanitized),
            findings,
            stats: self.stats.clone(),
            timestamp: Utc::now(),
        }
    }

    fn replace_all(&self, regex: &Regex, text: &str) -> (String, usize) {
        let mut count = 0;
        let replaced = regex.replace_all(text, |caps: &Captures| {
            count += 1;
            self.replacement_for(&caps[0])
        });
        (replaced.into_owned(), count)
    }

    /// In structure-preserving mode the token is padded with the fill
    /// character to the match length, or cut short for shorter matches.
    fn replacement_for(&self, matched: &str) -> String {
        if !self.options.preserve_structure {
            return self.options.replace_with.clone();
        }
        let len = matched.chars().count();
        self.options
            .replace_with
            .chars()
            .chain(iter::repeat(self.options.fill_char))
            .take(len)
            .collect()
    }
}

impl Default for Sanitizer {
    /// # Panics
    ///
    /// Panics if the built-in pattern library fails to compile.
    fn default() -> Self {
        Self::new().expect("built-in patterns must compile")
    }
}

/// First characters of a match plus its length. Short matches keep at
/// most half their characters so a sample is never the whole secret.
fn sample(matched: &str) -> String {
    let len = matched.chars().count();
    let keep = if len > SAMPLE_PREFIX_CHARS {
        SAMPLE_PREFIX_CHARS
    } else {
        len / 2
    };
    let prefix: String = matched.chars().take(keep).collect();
    format!("{prefix}...[{len} chars]")
}
