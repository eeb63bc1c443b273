//! REST CRUD service for a `users` table with liveness/readiness probes.
//!
//! The service establishes database connectivity with a bounded retry loop
//! before binding the HTTP listener, then maps each CRUD route onto a single
//! parameterized SQL statement with a uniform error-to-status translation.
//! If the database never comes up the listener binds anyway and individual
//! queries fail with 500s; nothing after startup is fatal to the process.
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types and HTTP response mapping
//! - [`db`]: Connection pool, bootstrap sequencer, and user queries
//! - [`api`]: HTTP routes and handlers
//! - [`metrics`]: Prometheus counters
//! - [`utils`]: Utility functions

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod metrics;
pub mod utils;

pub use config::Config;
pub use error::{Result, ServiceError};
