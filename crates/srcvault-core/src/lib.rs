//! # srcvault-core
//!
//! Core configuration and utilities for srcvault.
//!
//! This crate provides shared functionality used across all srcvault crates:
//!
//! - **Configuration**: Loading, validation, and persistence of `srcvault.json5`
//! - **Paths**: Resolution of the fragment file, registry file, and vault home
//! - **Secrets**: A zeroizing string type for passkeys and fragments

pub mod config;
pub mod env;
pub mod error;
pub mod paths;
pub mod secret;

// Re-exports for convenience
pub use config::{TreePolicy, VaultConfig};
pub use error::ConfigError;
pub use secret::SecretString;
