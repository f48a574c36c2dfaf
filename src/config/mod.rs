//! Configuration management for evaluation loggers.
//!
//! This module provides configuration loading through TOML files and
//! environment variable overrides, optionally seeded from a `.env` file.
//!
//! # Example
//!
//! ```no_run
//! use evallog::config::ConfigurationLoader;
//! use std::path::Path;
//!
//! let loader = ConfigurationLoader::new(Some(Path::new("config/eval.toml"))).unwrap();
//! let loggers = loader.logging().build_loggers();
//! println!("Writing to {:?}", loggers.output_dirs());
//! ```

pub mod config;
pub mod environment;

// Re-export main types for convenience
pub use self::config::{Configuration, ConfigurationLoader, LoggingConfig};
pub use self::environment::EnvironmentLoader;
