//! Command-line interface for tffocus.

pub mod args;
pub mod commands;
