//! Market API - marketplace administration backend
//!
//! Accounts sign in with one-time SMS codes; admins and shop owners manage
//! regions, shops, categories, brands and products over a JSON API.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Core business entities and logic
//! - **services**: Application use cases and business logic
//! - **infra**: Infrastructure concerns (database, cache, file storage)
//! - **api**: HTTP handlers, middleware, and routes
//! - **jobs**: Background SMS delivery
//! - **types**: Shared types (pagination, responses)
//! - **utils**: Utility functions and helpers
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server
//! cargo run -- serve
//!
//! # Run migrations
//! cargo run -- migrate up
//!
//! # Deliver queued SMS
//! cargo run -- jobs work
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod jobs;
pub mod services;
pub mod types;
pub mod utils;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use config::Config;
pub use domain::{AccountKind, Seller, User, UserRole};
pub use errors::{AppError, AppResult};
pub use infra::Cache;
