//! tffocus - Pomodoro and Time Free Focus timer
//!
//! This crate provides the session timing engine behind the `tffocus`
//! command-line interface: a Work/Rest state machine driven by a single
//! tokio loop, fixed and randomized duration policies, distraction capture,
//! and JSON persistence of session history and settings.

#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod error;
pub mod features;
pub mod output;
pub mod storage;
pub mod tui;

pub use cli::args::{Cli, Commands, OutputFormat};
pub use error::FocusError;
pub use features::focus::FocusSessionManager;
