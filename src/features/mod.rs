//! Feature modules for tffocus.

pub mod focus;
