//! Workspace facade crate.
//!
//! This crate exposes the feature flags that map onto the individual
//! workspace crates (`core-service`, `bridge-desktop`). Host applications can
//! depend on `media-session-workspace` and get the session orchestrator plus
//! the in-process bridges without wiring each crate individually.

#[cfg(feature = "desktop-shims")]
pub use bridge_desktop;
#[cfg(feature = "desktop-shims")]
pub use core_service;
