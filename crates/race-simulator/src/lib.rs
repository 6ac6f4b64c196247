//! # Race Simulator
//!
//! Synthetic result generator and I/O helpers for the race analytics engine.
//!
//! ## Features
//!
//! - Reproducible seasons from a seed
//! - JSON fixtures for loading and dumping result sets
//! - Environment-based configuration for the `race-analyzer` binary

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod fixture;
pub mod season;

pub use config::{Config, LogFormat};
pub use error::{Result, SimulatorError};
pub use fixture::{read_results, write_results};
pub use season::{SeasonSimulator, SimulatorConfig};
