//! Analytics engine: the filter → aggregate → score → rank pipeline.

use crate::aggregate::{StatsById, aggregate};
use crate::error::{AnalyticsError, Result};
use crate::filter::filter_window;
use crate::queries::{self, SeasonChampion};
use crate::ranking::{RankMetric, rank, top_n};
use crate::scoring::{ScoringMode, TeamContext, score_entities};
use race_domain::{EntityKind, EntityStats, ResultSet, ScoredEntity, SeasonWindow};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info};

/// Predefined analyses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnalysisKind {
    /// Drivers ranked by total points
    Drivers,
    /// Constructors ranked by total points
    Constructors,
    /// Drivers ranked by the team-adjusted performance score
    TeamAdjustedDrivers,
    /// Drivers ranked by the contribution-adjusted performance score
    ContributionAdjustedDrivers,
}

impl AnalysisKind {
    /// Entity kind the analysis groups by.
    #[must_use]
    pub const fn entity_kind(&self) -> EntityKind {
        match self {
            Self::Constructors => EntityKind::Constructor,
            _ => EntityKind::Driver,
        }
    }

    /// Scoring formula applied.
    #[must_use]
    pub const fn scoring_mode(&self) -> ScoringMode {
        match self {
            Self::Drivers | Self::Constructors => ScoringMode::Basic,
            Self::TeamAdjustedDrivers => ScoringMode::TeamAdjusted,
            Self::ContributionAdjustedDrivers => ScoringMode::ContributionAdjusted,
        }
    }

    /// Metric used when the request does not name one.
    #[must_use]
    pub const fn default_metric(&self) -> RankMetric {
        match self {
            Self::Drivers | Self::Constructors => RankMetric::TotalPoints,
            Self::TeamAdjustedDrivers | Self::ContributionAdjustedDrivers => {
                RankMetric::PerformanceScore
            }
        }
    }

    /// Stable string form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Drivers => "drivers",
            Self::Constructors => "constructors",
            Self::TeamAdjustedDrivers => "team-adjusted",
            Self::ContributionAdjustedDrivers => "contribution-adjusted",
        }
    }

    /// Human-readable title.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::Drivers => "Driver Analysis",
            Self::Constructors => "Constructor Analysis",
            Self::TeamAdjustedDrivers => "Team-Adjusted Driver Ranking",
            Self::ContributionAdjustedDrivers => "Contribution-Adjusted Driver Ranking",
        }
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalysisKind {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "drivers" => Ok(Self::Drivers),
            "constructors" | "teams" => Ok(Self::Constructors),
            "team-adjusted" | "enhanced" => Ok(Self::TeamAdjustedDrivers),
            "contribution-adjusted" | "best" => Ok(Self::ContributionAdjustedDrivers),
            other => Err(AnalyticsError::InvalidParameter(format!(
                "unknown analysis: {other}"
            ))),
        }
    }
}

/// Parameters of one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisRequest {
    /// Which analysis to run
    pub kind: AnalysisKind,
    /// Seasons to include
    pub window: SeasonWindow,
    /// Sort metric, defaults to the analysis' own
    pub metric: Option<RankMetric>,
    /// Leaderboard length limit
    pub top_n: Option<usize>,
}

impl AnalysisRequest {
    /// Request with default metric and no limit.
    #[must_use]
    pub const fn new(kind: AnalysisKind, window: SeasonWindow) -> Self {
        Self {
            kind,
            window,
            metric: None,
            top_n: None,
        }
    }

    /// Override the sort metric.
    #[must_use]
    pub const fn with_metric(mut self, metric: RankMetric) -> Self {
        self.metric = Some(metric);
        self
    }

    /// Keep only the first `k` entries.
    #[must_use]
    pub const fn with_top_n(mut self, k: usize) -> Self {
        self.top_n = Some(k);
        self
    }

    /// Effective sort metric.
    #[must_use]
    pub const fn metric(&self) -> RankMetric {
        match self.metric {
            Some(metric) => metric,
            None => self.kind.default_metric(),
        }
    }
}

/// Ranked output of one analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Leaderboard {
    /// Analysis that produced it
    pub analysis: AnalysisKind,
    /// Seasons covered
    pub window: SeasonWindow,
    /// Scoring formula used
    pub scoring: ScoringMode,
    /// Sort metric used
    pub metric: RankMetric,
    /// Ranked entries, rank 1 first
    pub entries: Vec<ScoredEntity>,
}

/// Pipeline façade over a loaded result set.
///
/// Holds the set behind an [`Arc`] so callers can load once and share the
/// same data across engines and calls. The engine keeps no other state.
#[derive(Debug, Clone)]
pub struct AnalyticsEngine {
    results: Arc<ResultSet>,
}

impl AnalyticsEngine {
    /// Create an engine over already loaded results.
    pub fn new(results: impl Into<Arc<ResultSet>>) -> Self {
        let results = results.into();
        info!(
            records = results.len(),
            seasons = results.seasons().len(),
            "Analytics engine ready"
        );
        Self { results }
    }

    /// Underlying result set.
    #[must_use]
    pub fn results(&self) -> &ResultSet {
        &self.results
    }

    /// Run one analysis end to end.
    pub fn run(&self, request: &AnalysisRequest) -> Result<Leaderboard> {
        let kind = request.kind;
        let mode = kind.scoring_mode();
        let metric = request.metric();

        let filtered = filter_window(&self.results, &request.window);
        let stats = aggregate(&filtered, kind.entity_kind());
        let team = if mode.requires_team_context() {
            Some(team_context_for(&filtered)?)
        } else {
            None
        };

        let scored = score_entities(&filtered, stats, mode, team.as_ref())?;
        let mut entries = rank(scored, metric);
        if let Some(k) = request.top_n {
            entries = top_n(entries, k)?;
        }

        debug!(
            analysis = %kind,
            window = %request.window,
            metric = %metric,
            entries = entries.len(),
            "Analysis complete"
        );

        Ok(Leaderboard {
            analysis: kind,
            window: request.window,
            scoring: mode,
            metric,
            entries,
        })
    }

    /// Raw statistics for every entity in the window, ordered by id.
    #[must_use]
    pub fn entity_stats(&self, window: &SeasonWindow, kind: EntityKind) -> Vec<EntityStats> {
        let filtered = filter_window(&self.results, window);
        let mut stats: Vec<EntityStats> = aggregate(&filtered, kind).into_values().collect();
        stats.sort_unstable_by_key(|s| s.entity_id);
        stats
    }

    /// Constructor summaries for the window.
    pub fn team_context(&self, window: &SeasonWindow) -> Result<TeamContext> {
        team_context_for(&filter_window(&self.results, window))
    }

    /// Season-by-season most-wins entities within the window.
    pub fn season_champions(
        &self,
        window: &SeasonWindow,
        kind: EntityKind,
    ) -> Result<Vec<SeasonChampion>> {
        queries::season_champions(&filter_window(&self.results, window), kind)
    }
}

fn team_context_for(results: &ResultSet) -> Result<TeamContext> {
    let constructors: StatsById = aggregate(results, EntityKind::Constructor);
    TeamContext::from_constructor_stats(&constructors)
}
