//! API data models
//!
//! This module contains the relay's inbound types and the Gemini wire types.

pub mod gemini;
pub mod relay;
