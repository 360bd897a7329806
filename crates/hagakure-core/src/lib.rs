//! Hagakure Core - Domain models, errors, and configuration
//!
//! This crate contains the shared domain types for the Hagakure context store.

pub mod config;
pub mod error;
pub mod models;

pub use error::{ErrorKind, HagakureError, Result};
