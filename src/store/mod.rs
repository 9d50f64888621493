// src/store/mod.rs
//! Locally persisted credentials and settings.

pub mod config;
pub mod storage;

pub use config::{watch, ChangeSource, ConfigChange, ConfigStore, Subscription};
pub use storage::{FileStorage, MemoryStorage, Storage};

/// Storage key holding the whole configuration blob.
pub const CONFIG_KEY: &str = "ai-social-creator-config";

pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const LINKEDIN_CLIENT_ID: &str = "LINKEDIN_CLIENT_ID";
pub const LINKEDIN_CLIENT_SECRET: &str = "LINKEDIN_CLIENT_SECRET";
pub const LINKEDIN_TOKEN: &str = "LINKEDIN_TOKEN";
