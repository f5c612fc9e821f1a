//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the loader:
//! - Color math types
//! - Logging utilities

pub mod math;
pub mod logging;
