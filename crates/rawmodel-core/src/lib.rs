//! rawmodel core library
//!
//! This crate provides the math types, error handling and logging setup
//! shared by the scene model, the exporter and the command-line tool.

pub mod error;
pub mod logging;
pub mod types;

pub use error::{Error, Result, ResultExt};
pub use types::*;
