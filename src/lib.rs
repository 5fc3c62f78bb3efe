pub mod api;
pub mod cli;
pub mod commands;
pub mod core;
pub mod sanitize;
pub mod ui;

pub use api::{PromptFields, PromptStore, StoreError};
pub use crate::core::storage::{Document, PromptRecord};
pub use sanitize::{Sanitizer, SanitizerError};
