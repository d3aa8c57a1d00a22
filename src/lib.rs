// src/lib.rs

pub mod c_api;
pub mod config;
pub mod core;
pub mod error;
pub mod etymology;
pub mod persistence;
pub mod protocol;
pub mod store;

pub use crate::config::EngineConfig;
pub use crate::core::engine::{ConscriptEngine, SpellingMode};
pub use crate::error::{LexiconError, Result};
