//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the engine:
//! - Math types and operations
//! - Fixed-width bit sets
//! - Time management
//! - Logging utilities

pub mod bits;
pub mod math;
pub mod time;
pub mod logging;
