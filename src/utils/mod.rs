//! Internal utilities.

pub mod config;
