//! Core abstractions for financial-crew
//!
//! This crate defines the types shared by the crew runtime, the tool
//! framework and the application shell.

pub mod context;
pub mod error;

pub use context::Context;
pub use error::{Error, Result};
