//! Logging utilities.
//!
//! This module centralizes logger initialization. Library code logs through
//! the `log` facade only; binaries call [`init_logging`] once.

mod init;

pub use init::{init_logging, LoggingConfig};
