//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the media session core:
//! - Logging and tracing infrastructure
//! - Session configuration
//! - Event bus system
//!
//! ## Overview
//!
//! This crate contains the runtime utilities the other core crates depend on.
//! It establishes the logging conventions and the event broadcasting mechanism
//! through which controllers and UIs observe the session.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
