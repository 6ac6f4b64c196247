//! Report generation for leaderboards.
//!
//! Reports are returned as strings; writing them anywhere is the caller's job.

use crate::engine::{AnalysisKind, AnalysisRequest, AnalyticsEngine, Leaderboard};
use crate::error::Result;
use crate::ranking::RankMetric;
use crate::scoring::ScoringMode;
use race_domain::{ResultSet, ScoredEntity, SeasonWindow};
use serde::Serialize;
use std::fmt::Write;

/// Leaderboard entry with race names resolved.
#[derive(Debug, Clone, Serialize)]
pub struct ReportEntry {
    /// Scored entity
    #[serde(flatten)]
    pub entity: ScoredEntity,
    /// Names of the races won, in race id order
    pub winning_race_names: Vec<String>,
}

/// Renderable leaderboard.
#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardReport {
    /// RFC 3339 generation time
    pub generated_at: String,
    /// Report title
    pub title: String,
    /// Analysis that produced the leaderboard
    pub analysis: AnalysisKind,
    /// Scoring formula used
    pub scoring: ScoringMode,
    /// Seasons covered
    pub window: SeasonWindow,
    /// Sort metric used
    pub metric: RankMetric,
    /// Ranked entries
    pub entries: Vec<ReportEntry>,
}

impl LeaderboardReport {
    /// Build a report, resolving race names from `results`.
    #[must_use]
    pub fn from_leaderboard(leaderboard: Leaderboard, results: &ResultSet) -> Self {
        let entries = leaderboard
            .entries
            .into_iter()
            .map(|entity| {
                let winning_race_names = entity
                    .stats
                    .winning_races
                    .iter()
                    .map(|&race| {
                        results
                            .race_name(race)
                            .map_or_else(|| format!("Race {race}"), str::to_string)
                    })
                    .collect();
                ReportEntry {
                    entity,
                    winning_race_names,
                }
            })
            .collect();

        Self {
            generated_at: chrono::Utc::now().to_rfc3339(),
            title: format!("{} ({})", leaderboard.analysis.title(), leaderboard.window),
            analysis: leaderboard.analysis,
            scoring: leaderboard.scoring,
            window: leaderboard.window,
            metric: leaderboard.metric,
            entries,
        }
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Markdown document with one table row per entry.
    #[must_use]
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();
        let _ = writeln!(md, "# {}\n", self.title);
        let _ = writeln!(md, "**Generated:** {}\n", self.generated_at);
        let _ = writeln!(
            md,
            "**Seasons:** {} | **Scoring:** {} | **Sorted by:** {}\n",
            self.window, self.scoring, self.metric
        );

        if self.entries.is_empty() {
            md.push_str("_No results in this season window._\n");
            return md;
        }

        let columns = Column::for_analysis(self.analysis);
        md.push_str("| Rank | Name |");
        for column in columns {
            let _ = write!(md, " {} |", column.header());
        }
        md.push_str("\n|------|------|");
        for _ in columns {
            md.push_str("------|");
        }
        md.push('\n');

        for entry in &self.entries {
            let _ = write!(md, "| {} | {} |", entry.entity.rank, entry.entity.name);
            for column in columns {
                let _ = write!(md, " {} |", column.cell(entry));
            }
            md.push('\n');
        }
        md.push('\n');

        md
    }
}

/// Table columns shown per analysis.
#[derive(Debug, Clone, Copy)]
enum Column {
    Points,
    Wins,
    Podiums,
    Races,
    WinRate,
    AveragePoints,
    BestFinish,
    TopFiveRate,
    AverageGrid,
    PositionsGained,
    TeamCompetitiveness,
    PointsContribution,
    WinsContribution,
    Score,
    RacesWon,
}

impl Column {
    const fn for_analysis(kind: AnalysisKind) -> &'static [Self] {
        match kind {
            AnalysisKind::Drivers => &[
                Self::Points,
                Self::Wins,
                Self::Races,
                Self::WinRate,
                Self::AveragePoints,
                Self::BestFinish,
                Self::TopFiveRate,
                Self::Score,
                Self::RacesWon,
            ],
            AnalysisKind::Constructors => &[
                Self::Points,
                Self::Wins,
                Self::Podiums,
                Self::Races,
                Self::AveragePoints,
                Self::BestFinish,
                Self::Score,
            ],
            AnalysisKind::TeamAdjustedDrivers => &[
                Self::Points,
                Self::Wins,
                Self::Races,
                Self::WinRate,
                Self::AveragePoints,
                Self::PositionsGained,
                Self::TeamCompetitiveness,
                Self::Score,
            ],
            AnalysisKind::ContributionAdjustedDrivers => &[
                Self::Points,
                Self::Wins,
                Self::Podiums,
                Self::Races,
                Self::AverageGrid,
                Self::PositionsGained,
                Self::PointsContribution,
                Self::WinsContribution,
                Self::Score,
            ],
        }
    }

    const fn header(self) -> &'static str {
        match self {
            Self::Points => "Points",
            Self::Wins => "Wins",
            Self::Podiums => "Podiums",
            Self::Races => "Races",
            Self::WinRate => "Win %",
            Self::AveragePoints => "Pts/Race",
            Self::BestFinish => "Best",
            Self::TopFiveRate => "Top 5 %",
            Self::AverageGrid => "Avg Grid",
            Self::PositionsGained => "Pos. Gained",
            Self::TeamCompetitiveness => "Team Comp.",
            Self::PointsContribution => "% Team Pts",
            Self::WinsContribution => "% Team Wins",
            Self::Score => "Score",
            Self::RacesWon => "Races Won",
        }
    }

    fn cell(self, entry: &ReportEntry) -> String {
        let entity = &entry.entity;
        let stats = &entity.stats;
        match self {
            Self::Points => format!("{:.1}", stats.total_points),
            Self::Wins => stats.total_wins.to_string(),
            Self::Podiums => stats.total_podiums.to_string(),
            Self::Races => stats.races_entered.to_string(),
            Self::WinRate => format!("{:.2}%", stats.win_rate_pct),
            Self::AveragePoints => format!("{:.2}", stats.average_points_per_race),
            Self::BestFinish => stats
                .best_finish_position
                .map_or_else(|| "N/A".to_string(), |p| p.to_string()),
            Self::TopFiveRate => format!("{:.2}%", stats.top_five_rate_pct),
            Self::AverageGrid => optional(stats.average_grid_position, ""),
            Self::PositionsGained => format!("{:+.2}", stats.positions_gained_average),
            Self::TeamCompetitiveness => optional(entity.team_competitiveness, ""),
            Self::PointsContribution => optional(entity.points_contribution_pct, "%"),
            Self::WinsContribution => optional(entity.wins_contribution_pct, "%"),
            Self::Score => format!("{:.2}", entity.performance_score),
            Self::RacesWon => entry.winning_race_names.join(", "),
        }
    }
}

fn optional(value: Option<f64>, suffix: &str) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("{v:.2}{suffix}"))
}

impl AnalyticsEngine {
    /// Run an analysis and wrap the leaderboard in a report.
    pub fn generate_report(&self, request: &AnalysisRequest) -> Result<LeaderboardReport> {
        let leaderboard = self.run(request)?;
        Ok(LeaderboardReport::from_leaderboard(leaderboard, self.results()))
    }

    /// Generate report as JSON string.
    pub fn generate_report_json(&self, request: &AnalysisRequest) -> Result<String> {
        self.generate_report(request)?.to_json()
    }

    /// Generate Markdown report.
    pub fn generate_report_markdown(&self, request: &AnalysisRequest) -> Result<String> {
        Ok(self.generate_report(request)?.to_markdown())
    }
}
