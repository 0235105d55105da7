//! FedhaSmart - Terminal-based personal finance tracker
//!
//! This library provides the core functionality for the `fedha` command:
//! expenses, income, monthly budgets, savings goals, a dashboard, and a
//! user profile, all scoped to whoever is signed in through either of two
//! identity providers (e-mail/password or SMS one-time code).
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Core data models (expenses, budgets, goals, identities, etc.)
//! - `storage`: JSON file tables with an insert change feed
//! - `audit`: Audit logging system
//! - `auth`: Identity providers and the merged signed-in user
//! - `services`: Business logic layer
//! - `reports`: Dashboard aggregation
//! - `export`: CSV, JSON and YAML export
//! - `display`: Terminal formatting
//! - `cli`: Command handlers
//!
//! # Example
//!
//! ```rust,ignore
//! use fedha::config::{paths::FedhaPaths, settings::Settings};
//! use fedha::storage::Storage;
//!
//! let paths = FedhaPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! let storage = Storage::new(paths)?;
//! storage.load_all()?;
//! ```

pub mod audit;
pub mod auth;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod models;
pub mod reports;
pub mod services;
pub mod storage;

pub use error::{FedhaError, FedhaResult};
