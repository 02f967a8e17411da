//! Quail Common - Core types shared across all crates
//!
//! This crate provides the foundational types used throughout Quail:
//! - `ValueType`: the logical type system the binder computes with
//! - `Value`: runtime representation of literal values
//! - `Error`: unified error types

pub mod error;
pub mod types;
pub mod value;

pub use error::{Error, Result};
pub use types::ValueType;
pub use value::Value;
