pub mod backup;
pub mod config;
pub mod context;
pub mod exchange;
pub mod storage;
pub mod template;
pub mod utils;
