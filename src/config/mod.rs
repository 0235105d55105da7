//! Configuration module for Fedha
//!
//! This module provides configuration management including:
//! - Platform path resolution
//! - User settings persistence

pub mod paths;
pub mod settings;

pub use paths::FedhaPaths;
pub use settings::{AuthSettings, Settings};
