//! Sensitive-data pattern library.
//!
//! A static catalogue of regex rules, each tagged with the [`Category`] it
//! detects. [`PatternRegistry`] compiles the catalogue once and hands out
//! the rules of a category in declaration order.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::SanitizerError;

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// Class of sensitive data a rule targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    /// API keys and bearer/access tokens.
    ApiKeys,
    /// AWS access key ids and secret access keys.
    Aws,
    /// URLs with embedded `user:password@` credentials.
    Urls,
    /// Plain email addresses. Noisy, off by default.
    Emails,
    /// Sixteen-digit card-shaped numbers.
    CreditCards,
    /// PEM private key blocks.
    SshKeys,
    /// `NAME=value` shell assignments. Noisy, off by default.
    EnvVars,
    /// `password: ...` style key/value pairs.
    Passwords,
    /// Reserved for caller-supplied rules; has no built-in rules.
    Custom,
}

impl Category {
    /// Every category that ships with built-in rules.
    pub const BUILTIN: [Category; 8] = [
        Category::ApiKeys,
        Category::Aws,
        Category::Urls,
        Category::Emails,
        Category::CreditCards,
        Category::SshKeys,
        Category::EnvVars,
        Category::Passwords,
    ];

    /// Categories enabled unless configured otherwise.
    pub const DEFAULT_ENABLED: [Category; 5] = [
        Category::ApiKeys,
        Category::Aws,
        Category::Urls,
        Category::SshKeys,
        Category::Passwords,
    ];

    /// Stable identifier used in configuration, stats and reports.
    pub fn id(self) -> &'static str {
        match self {
            Category::ApiKeys => "apiKeys",
            Category::Aws => "aws",
            Category::Urls => "urls",
            Category::Emails => "emails",
            Category::CreditCards => "creditCards",
            Category::SshKeys => "sshKeys",
            Category::EnvVars => "envVars",
            Category::Passwords => "passwords",
            Category::Custom => "custom",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Category {
    type Err = SanitizerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::BUILTIN
            .into_iter()
            .chain([Category::Custom])
            .find(|c| c.id() == s)
            .ok_or_else(|| SanitizerError::UnknownCategory(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Rule catalogue
// ---------------------------------------------------------------------------

/// A single detection rule.
pub struct PatternRule {
    /// Short identifier used in debug logs.
    pub name: &'static str,
    pub category: Category,
    pub pattern: &'static str,
}

/// The built-in rule library, grouped by category.
pub static RULES: &[PatternRule] = &[
    // ---- API keys and tokens ---------------------------------------------
    PatternRule {
        name: "sk_key",
        category: Category::ApiKeys,
        pattern: r"(?i)sk-[a-z0-9]{32,}",
    },
    PatternRule {
        name: "api_key_assignment",
        category: Category::ApiKeys,
        pattern: r#"(?i)api[_-]?key[\s:=]+['"]?([a-z0-9_-]{20,})['"]?"#,
    },
    PatternRule {
        name: "token_assignment",
        category: Category::ApiKeys,
        pattern: r#"(?i)token[\s:=]+['"]?([a-z0-9_-]{20,})['"]?"#,
    },
    PatternRule {
        name: "bearer",
        category: Category::ApiKeys,
        pattern: r"(?i)bearer\s+[a-z0-9._-]+",
    },
    // ---- AWS -------------------------------------------------------------
    PatternRule {
        name: "aws_access_key_id",
        category: Category::Aws,
        pattern: r"(?i)AKIA[0-9A-Z]{16}",
    },
    PatternRule {
        name: "aws_secret_access_key",
        category: Category::Aws,
        pattern: r#"(?i)aws[_-]?secret[_-]?access[_-]?key[\s:=]+['"]?([a-z0-9/+=]{40})['"]?"#,
    },
    // ---- URLs with credentials -------------------------------------------
    PatternRule {
        name: "url_credentials",
        category: Category::Urls,
        pattern: r"(?i)https?://[^\s:/@]+:[^\s@/]+@\S+",
    },
    // ---- Email -----------------------------------------------------------
    PatternRule {
        name: "email",
        category: Category::Emails,
        pattern: r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}",
    },
    // ---- Credit cards ----------------------------------------------------
    PatternRule {
        name: "card_number",
        category: Category::CreditCards,
        pattern: r"\b(?:\d{4}[\s-]?){3}\d{4}\b",
    },
    // ---- Private keys ----------------------------------------------------
    PatternRule {
        name: "pem_private_key",
        category: Category::SshKeys,
        pattern: r"(?i)-----BEGIN (?:RSA |DSA |EC |OPENSSH )?PRIVATE KEY-----[\s\S]*?-----END (?:RSA |DSA |EC |OPENSSH )?PRIVATE KEY-----",
    },
    // ---- Environment assignments -----------------------------------------
    PatternRule {
        name: "env_assignment",
        category: Category::EnvVars,
        pattern: r"(?:export\s+)?[A-Z_]{2,}=\S+",
    },
    // ---- Passwords -------------------------------------------------------
    PatternRule {
        name: "password",
        category: Category::Passwords,
        pattern: r#"(?i)password[\s:=]+['"]?[^\s'"]+['"]?"#,
    },
    PatternRule {
        name: "pwd",
        category: Category::Passwords,
        pattern: r#"(?i)pwd[\s:=]+['"]?[^\s'"]+['"]?"#,
    },
    PatternRule {
        name: "pass",
        category: Category::Passwords,
        pattern: r#"(?i)pass[\s:=]+['"]?[^\s'"]+['"]?"#,
    },
];

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// A compiled rule.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub name: &'static str,
    pub category: Category,
    pub regex: Regex,
}

/// Immutable table of compiled rules, in [`RULES`] order.
#[derive(Debug, Clone)]
pub struct PatternRegistry {
    rules: Vec<CompiledRule>,
}

impl PatternRegistry {
    /// Compiles the built-in catalogue.
    pub fn builtin() -> Result<Self, SanitizerError> {
        let rules = RULES
            .iter()
            .map(|r| -> Result<CompiledRule, SanitizerError> {
                Ok(CompiledRule {
                    name: r.name,
                    category: r.category,
                    regex: Regex::new(r.pattern)?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    /// Rules of one category, in declaration order.
    pub fn rules_for(&self, category: Category) -> impl Iterator<Item = &CompiledRule> {
        self.rules.iter().filter(move |r| r.category == category)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
