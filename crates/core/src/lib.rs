//! Pantry Core - Shared domain library.
//!
//! This crate provides the types used across all Pantry components:
//! - `api` - The recipe-sharing REST API
//! - `cli` - Command-line tools for migrations and reference data
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and validated user input
//! - [`shopping`] - Shopping list aggregation and text rendering

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod shopping;
pub mod types;

pub use shopping::{AggregatedLine, IngredientLine};
pub use types::*;
