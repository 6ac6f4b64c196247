//! # Race Analytics
//!
//! Performance analytics engine for historical motor-racing results.
//! Everything here is a pure function over an immutable [`ResultSet`];
//! rendering and data loading live with the caller.
//!
//! ## Pipeline
//!
//! - Season filtering over an inclusive year window
//! - Per-entity aggregation (drivers or constructors)
//! - Weighted performance scoring (basic, team-adjusted, contribution-adjusted)
//! - Deterministic ranking into a leaderboard
//! - Per-season breakdowns and report generation
//!
//! [`ResultSet`]: race_domain::ResultSet

#![forbid(unsafe_code)]
#![warn(clippy::all, missing_docs)]

pub mod aggregate;
pub mod engine;
pub mod error;
pub mod filter;
pub mod queries;
pub mod ranking;
pub mod reports;
pub mod scoring;

pub use aggregate::{StatsById, aggregate};
pub use engine::{AnalysisKind, AnalysisRequest, AnalyticsEngine, Leaderboard};
pub use error::{AnalyticsError, Result};
pub use filter::{filter_seasons, filter_window};
pub use ranking::{RankMetric, rank, top_n};
pub use reports::LeaderboardReport;
pub use scoring::{ScoringMode, TeamContext, TeamSummary, score, score_entities};
