//! Configuration management for tffocus.
//!
//! This module handles locating the data directory and loading `config.yaml`.

mod paths;
mod settings;

pub use paths::{Paths, HOME_ENV};
pub use settings::{ColorSetting, Config, GeneralConfig, NotificationConfig, TimerConfig};
