//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the playback session
//! core:
//! - Logging and tracing infrastructure
//! - Event bus system
//!
//! ## Overview
//!
//! This crate contains the runtime utilities the session core depends on.
//! It establishes the logging conventions and the event broadcasting
//! mechanism through which sessions report state transitions and non-fatal
//! persistence warnings to the hosting surface.

pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
