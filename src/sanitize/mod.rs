//! Sensitive-data detection and redaction.
//!
//! The module is organised around two layers:
//!
//! 1. **[`patterns`]**: static catalogue of regex rules grouped by
//!    [`Category`], compiled into a [`PatternRegistry`].
//! 2. **[`sanitizer`]**: [`Sanitizer`] scans text into [`Finding`]s and
//!    produces redacted copies, keeping [`SanitizationStats`] for the most
//!    recent redaction.
//!
//! ## Quick start
//!
//! ```rust
//! use cuecli::sanitize::Sanitizer;
//!
//! let mut sanitizer = Sanitizer::new().unwrap();
//! let clean = sanitizer.sanitize("password: hunter2");
//! assert!(!clean.contains("hunter2"));
//! assert_eq!(sanitizer.stats().total_redacted, 1);
//! ```
//!
//! Detection is best-effort and pattern-based; it is not a security boundary.

pub mod patterns;
pub mod sanitizer;

pub use patterns::{Category, PatternRegistry, PatternRule, RULES};
pub use sanitizer::{
    Finding, SanitizationReport, SanitizationStats, Sanitizer, SanitizerOptions,
    SanitizerUpdate, TextMetrics,
};

/// Errors raised while building or configuring a [`Sanitizer`].
#[derive(Debug, thiserror::Error)]
pub enum SanitizerError {
    #[error("failed to compile regex pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("unknown sanitizer category '{0}'")]
    UnknownCategory(String),
}
