//! Shared utilities for the Izakaya chat application.
//!
//! Cross-cutting concerns used by every package: logging setup and
//! wall-clock timestamp helpers.

pub mod logger;
pub mod time;
