//! Library API: the prompt repository and its error type.

mod error;
mod store;

pub use error::StoreError;
pub use store::{PromptFields, PromptStore};
