//! System-level modules
//!
//! This module contains system-level functionality:
//! - Logging initialization
//! - Shutdown signal handling

pub mod logging;
pub mod signal;
