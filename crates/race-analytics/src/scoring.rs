//! Weighted performance scoring.
//!
//! One engine, three closed formulas selected by [`ScoringMode`]. Each
//! formula is a pure function of the entity's statistics and, for the
//! adjusted modes, the summary of the constructor the driver raced for.

use crate::aggregate::StatsById;
use crate::error::{AnalyticsError, Result};
use race_domain::{ConstructorId, EntityId, EntityKind, EntityStats, ResultSet, ScoredEntity};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Scoring formula applied to aggregated statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScoringMode {
    /// `0.5·points + 30·wins + 10·avgPoints + 100/bestFinish`
    Basic,
    /// Drivers only: adds positions gained and the team's competitiveness
    TeamAdjusted,
    /// Drivers only: rewards podiums and the driver's share of team points
    ContributionAdjusted,
}

impl ScoringMode {
    /// Stable string form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::TeamAdjusted => "team-adjusted",
            Self::ContributionAdjusted => "contribution-adjusted",
        }
    }

    /// Whether the mode reads a [`TeamContext`].
    #[must_use]
    pub const fn requires_team_context(&self) -> bool {
        matches!(self, Self::TeamAdjusted | Self::ContributionAdjusted)
    }
}

impl fmt::Display for ScoringMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScoringMode {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "basic" => Ok(Self::Basic),
            "team-adjusted" | "team" => Ok(Self::TeamAdjusted),
            "contribution-adjusted" | "contribution" => Ok(Self::ContributionAdjusted),
            other => Err(AnalyticsError::InvalidParameter(format!(
                "unknown scoring mode: {other}"
            ))),
        }
    }
}

// =============================================================================
// TEAM CONTEXT
// =============================================================================

/// Constructor-level totals used by the adjusted driver formulas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TeamSummary {
    /// Constructor the summary belongs to
    pub constructor_id: ConstructorId,
    /// Points scored by all of the constructor's cars
    pub total_points: f64,
    /// Wins by all of the constructor's cars
    pub total_wins: u32,
    /// Points per distinct race entered
    pub average_points_per_race: f64,
    /// `0.5·points + 30·wins + 10·avgPoints`
    pub competitiveness: f64,
}

impl TeamSummary {
    /// Summarize constructor statistics.
    #[must_use]
    pub fn from_stats(stats: &EntityStats) -> Self {
        Self {
            constructor_id: ConstructorId(stats.entity_id.0),
            total_points: stats.total_points,
            total_wins: stats.total_wins,
            average_points_per_race: stats.average_points_per_race,
            competitiveness: competitiveness(
                stats.total_points,
                stats.total_wins,
                stats.average_points_per_race,
            ),
        }
    }
}

/// Team competitiveness of a constructor.
#[must_use]
pub fn competitiveness(total_points: f64, total_wins: u32, average_points_per_race: f64) -> f64 {
    0.5 * total_points + 30.0 * f64::from(total_wins) + 10.0 * average_points_per_race
}

/// Per-constructor summaries, built from constructor aggregation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamContext {
    teams: HashMap<ConstructorId, TeamSummary>,
}

impl TeamContext {
    /// Build a context from statistics aggregated by constructor.
    pub fn from_constructor_stats(stats: &StatsById) -> Result<Self> {
        let teams = stats
            .values()
            .map(|s| {
                if s.kind == EntityKind::Constructor {
                    let summary = TeamSummary::from_stats(s);
                    Ok((summary.constructor_id, summary))
                } else {
                    Err(AnalyticsError::InvalidParameter(format!(
                        "team context needs constructor statistics, got {} {}",
                        s.kind, s.entity_id
                    )))
                }
            })
            .collect::<Result<HashMap<_, _>>>()?;
        Ok(Self { teams })
    }

    /// Summary for one constructor.
    #[must_use]
    pub fn get(&self, id: ConstructorId) -> Option<&TeamSummary> {
        self.teams.get(&id)
    }

    /// Number of constructors covered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.teams.len()
    }

    /// Whether no constructor is covered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }
}

impl FromIterator<TeamSummary> for TeamContext {
    fn from_iter<I: IntoIterator<Item = TeamSummary>>(iter: I) -> Self {
        Self {
            teams: iter.into_iter().map(|t| (t.constructor_id, t)).collect(),
        }
    }
}

// =============================================================================
// FORMULAS
// =============================================================================

/// Driver's share of the team's points and wins, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    /// `100·points / teamPoints`, 0 when the team scored nothing
    pub points_pct: f64,
    /// `100·wins / teamWins`, 0 when the team won nothing
    pub wins_pct: f64,
}

/// Share of `team` produced by `stats`.
#[must_use]
pub fn contribution(stats: &EntityStats, team: &TeamSummary) -> Contribution {
    let points_pct = if team.total_points > 0.0 {
        100.0 * stats.total_points / team.total_points
    } else {
        0.0
    };
    let wins_pct = if team.total_wins > 0 {
        100.0 * f64::from(stats.total_wins) / f64::from(team.total_wins)
    } else {
        0.0
    };
    Contribution {
        points_pct,
        wins_pct,
    }
}

/// Basic score. The reciprocal best-finish term is 0 for an entity that was
/// never classified.
#[must_use]
pub fn basic_score(stats: &EntityStats) -> f64 {
    let best_finish_term = stats
        .best_finish_position
        .filter(|&p| p > 0)
        .map_or(0.0, |best| 100.0 / f64::from(best));

    0.5 * stats.total_points
        + 30.0 * f64::from(stats.total_wins)
        + 10.0 * stats.average_points_per_race
        + best_finish_term
}

/// Driver score adjusted by the competitiveness of the driver's team.
#[must_use]
pub fn team_adjusted_score(stats: &EntityStats, team: &TeamSummary) -> f64 {
    0.5 * stats.total_points
        + 30.0 * f64::from(stats.total_wins)
        + 10.0 * stats.average_points_per_race
        + 5.0 * stats.positions_gained_average
        + 0.2 * team.competitiveness
}

/// Driver score adjusted by the driver's share of team points.
#[must_use]
pub fn contribution_adjusted_score(stats: &EntityStats, share: &Contribution) -> f64 {
    0.6 * stats.total_points
        + 30.0 * f64::from(stats.total_wins)
        + 10.0 * f64::from(stats.total_podiums)
        + 5.0 * stats.positions_gained_average
        + 0.2 * share.points_pct
}

// =============================================================================
// ENGINE
// =============================================================================

/// Score plus the context values that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Evaluation {
    score: f64,
    team_competitiveness: Option<f64>,
    contribution: Option<Contribution>,
}

fn evaluate(stats: &EntityStats, mode: ScoringMode, team: Option<&TeamContext>) -> Result<Evaluation> {
    Ok(match mode {
        ScoringMode::Basic => Evaluation {
            score: basic_score(stats),
            team_competitiveness: None,
            contribution: None,
        },
        ScoringMode::TeamAdjusted => {
            let summary = team_summary(stats, mode, team)?;
            Evaluation {
                score: team_adjusted_score(stats, summary),
                team_competitiveness: Some(summary.competitiveness),
                contribution: None,
            }
        }
        ScoringMode::ContributionAdjusted => {
            let share = contribution(stats, team_summary(stats, mode, team)?);
            Evaluation {
                score: contribution_adjusted_score(stats, &share),
                team_competitiveness: None,
                contribution: Some(share),
            }
        }
    })
}

/// Summary of the constructor a driver raced for.
fn team_summary<'a>(
    stats: &EntityStats,
    mode: ScoringMode,
    team: Option<&'a TeamContext>,
) -> Result<&'a TeamSummary> {
    if stats.kind != EntityKind::Driver {
        return Err(AnalyticsError::InvalidParameter(format!(
            "{mode} scoring applies to drivers only, got {} {}",
            stats.kind, stats.entity_id
        )));
    }

    let context = team.ok_or_else(|| {
        AnalyticsError::MissingContext(format!("{mode} scoring requires a team context"))
    })?;
    let constructor = stats.primary_constructor.ok_or_else(|| {
        AnalyticsError::MissingContext(format!("driver {} has no constructor", stats.entity_id))
    })?;
    context.get(constructor).ok_or_else(|| {
        AnalyticsError::MissingContext(format!(
            "no team summary for constructor {constructor} (driver {})",
            stats.entity_id
        ))
    })
}

/// Entity ids in ascending order, so the first failure reported is stable.
fn sorted_ids(stats: &StatsById) -> Vec<EntityId> {
    let mut ids: Vec<EntityId> = stats.keys().copied().collect();
    ids.sort_unstable();
    ids
}

/// Score every entity with `mode`.
///
/// The adjusted modes fail with [`AnalyticsError::MissingContext`] unless
/// `team` covers the constructor of every driver.
pub fn score(
    stats: &StatsById,
    mode: ScoringMode,
    team: Option<&TeamContext>,
) -> Result<HashMap<EntityId, f64>> {
    sorted_ids(stats)
        .into_iter()
        .map(|id| -> Result<(EntityId, f64)> {
            Ok((id, evaluate(&stats[&id], mode, team)?.score))
        })
        .collect()
}

/// Score every entity and attach its display name and context values.
///
/// Output is ordered by ascending entity id; the caller ranks it.
pub fn score_entities(
    results: &ResultSet,
    stats: StatsById,
    mode: ScoringMode,
    team: Option<&TeamContext>,
) -> Result<Vec<ScoredEntity>> {
    let mut ordered: Vec<EntityStats> = stats.into_values().collect();
    ordered.sort_unstable_by_key(|s| s.entity_id);

    let scored = ordered
        .into_iter()
        .map(|entity_stats| -> Result<ScoredEntity> {
            let evaluation = evaluate(&entity_stats, mode, team)?;
            let name = results
                .entity_name(entity_stats.kind, entity_stats.entity_id)?
                .to_string();

            let mut entity = ScoredEntity::new(name, entity_stats, evaluation.score);
            entity.team_competitiveness = evaluation.team_competitiveness;
            entity.points_contribution_pct = evaluation.contribution.map(|c| c.points_pct);
            entity.wins_contribution_pct = evaluation.contribution.map(|c| c.wins_pct);
            Ok(entity)
        })
        .collect::<Result<Vec<_>>>()?;

    debug!(mode = %mode, entities = scored.len(), "Scored entities");
    Ok(scored)
}
