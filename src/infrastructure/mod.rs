//! Infrastructure layer - External concerns
//! 
//! This layer contains:
//! - Config: Configuration loading
//! - Storage: Hash store backends (memory, SQLite)
//! - Adapters: Platform integrations (console)

pub mod config;
pub mod storage;
pub mod adapters;
