//! Core application modules
//!
//! This module contains configuration, constants, logging, and the upstream
//! provider abstraction.

pub mod config;
pub mod constants;
pub mod logging;
pub mod provider;
pub mod providers;
