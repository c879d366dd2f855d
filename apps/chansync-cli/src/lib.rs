//! chansync CLI library
//!
//! Configuration loading, logging setup, report rendering and the command
//! implementations behind the `chansync` binary.

pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
