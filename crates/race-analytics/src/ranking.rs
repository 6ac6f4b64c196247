//! Leaderboard ranking.
//!
//! Entities are ordered by `(metric desc, entity id asc)`, so equal metric
//! values always resolve the same way regardless of aggregation order.

use crate::error::{AnalyticsError, Result};
use race_domain::ScoredEntity;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Field a leaderboard is sorted by. Every metric sorts descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RankMetric {
    /// Weighted performance score
    PerformanceScore,
    /// Sum of points
    TotalPoints,
    /// Number of wins
    TotalWins,
    /// Number of podium finishes
    TotalPodiums,
    /// Races entered
    RacesEntered,
    /// Points per race entered
    AveragePointsPerRace,
    /// Wins per race entered, in percent
    WinRate,
    /// Average places gained from grid to finish
    PositionsGained,
    /// Average classified position.
    ///
    /// Sorted descending like every metric, so the entity with the worst
    /// (highest) average finish ranks first. Use it for back-of-field views.
    AverageFinish,
}

impl RankMetric {
    /// All metrics, in display order.
    pub const ALL: [Self; 9] = [
        Self::PerformanceScore,
        Self::TotalPoints,
        Self::TotalWins,
        Self::TotalPodiums,
        Self::RacesEntered,
        Self::AveragePointsPerRace,
        Self::WinRate,
        Self::PositionsGained,
        Self::AverageFinish,
    ];

    /// Stable string form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PerformanceScore => "score",
            Self::TotalPoints => "points",
            Self::TotalWins => "wins",
            Self::TotalPodiums => "podiums",
            Self::RacesEntered => "races",
            Self::AveragePointsPerRace => "avg-points",
            Self::WinRate => "win-rate",
            Self::PositionsGained => "positions-gained",
            Self::AverageFinish => "avg-finish",
        }
    }

    /// Value of this metric for `entity`.
    #[must_use]
    pub fn value(&self, entity: &ScoredEntity) -> f64 {
        let stats = &entity.stats;
        match self {
            Self::PerformanceScore => entity.performance_score,
            Self::TotalPoints => stats.total_points,
            Self::TotalWins => f64::from(stats.total_wins),
            Self::TotalPodiums => f64::from(stats.total_podiums),
            Self::RacesEntered => f64::from(stats.races_entered),
            Self::AveragePointsPerRace => stats.average_points_per_race,
            Self::WinRate => stats.win_rate_pct,
            Self::PositionsGained => stats.positions_gained_average,
            Self::AverageFinish => stats.average_finish_position,
        }
    }

    fn compare(self, a: &ScoredEntity, b: &ScoredEntity) -> Ordering {
        self.value(b)
            .total_cmp(&self.value(a))
            .then_with(|| a.entity_id().cmp(&b.entity_id()))
    }
}

impl fmt::Display for RankMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RankMetric {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self> {
        let needle = s.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == needle)
            .ok_or_else(|| AnalyticsError::InvalidParameter(format!("unknown rank metric: {s}")))
    }
}

/// Sort `entities` descending by `metric` and assign 1-based ranks.
#[must_use]
pub fn rank(mut entities: Vec<ScoredEntity>, metric: RankMetric) -> Vec<ScoredEntity> {
    entities.sort_by(|a, b| metric.compare(a, b));
    for (position, entity) in entities.iter_mut().enumerate() {
        entity.rank = u32::try_from(position + 1).unwrap_or(u32::MAX);
    }
    entities
}

/// Keep the first `k` entries of a ranked leaderboard.
pub fn top_n(mut ranked: Vec<ScoredEntity>, k: usize) -> Result<Vec<ScoredEntity>> {
    if k == 0 {
        return Err(AnalyticsError::InvalidParameter(
            "top_n must be greater than 0".to_string(),
        ));
    }
    ranked.truncate(k);
    Ok(ranked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use race_domain::{EntityId, EntityKind, EntityStats};

    fn entity(id: u32, points: f64, score: f64) -> ScoredEntity {
        let stats = EntityStats {
            total_points: points,
            best_finish_position: Some(1),
            ..EntityStats::empty(EntityId(id), EntityKind::Driver)
        };
        ScoredEntity::new(format!("Driver {id}"), stats, score)
    }

    fn ids(entities: &[ScoredEntity]) -> Vec<u32> {
        entities.iter().map(|e| e.entity_id().0).collect()
    }

    #[test]
    fn test_rank_descending() {
        let ranked = rank(
            vec![entity(1, 10.0, 5.0), entity(2, 30.0, 1.0), entity(3, 20.0, 9.0)],
            RankMetric::TotalPoints,
        );
        assert_eq!(ids(&ranked), vec![2, 3, 1]);
        assert_eq!(
            ranked.iter().map(|e| e.rank).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );

        let by_score = rank(ranked, RankMetric::PerformanceScore);
        assert_eq!(ids(&by_score), vec![3, 1, 2]);
    }

    #[test]
    fn test_ties_break_by_entity_id() {
        let ranked = rank(
            vec![
                entity(9, 10.0, 0.0),
                entity(4, 10.0, 0.0),
                entity(7, 12.0, 0.0),
                entity(1, 10.0, 0.0),
            ],
            RankMetric::TotalPoints,
        );
        assert_eq!(ids(&ranked), vec![7, 1, 4, 9]);
    }

    #[test]
    fn test_top_n() {
        let ranked = rank(
            vec![entity(1, 1.0, 0.0), entity(2, 2.0, 0.0), entity(3, 3.0, 0.0)],
            RankMetric::TotalPoints,
        );
        assert_eq!(ids(&top_n(ranked.clone(), 2).unwrap()), vec![3, 2]);
        assert_eq!(top_n(ranked.clone(), 10).unwrap().len(), 3);
        assert!(top_n(ranked, 0).is_err());
    }

    #[test]
    fn test_average_finish_puts_worst_first() {
        let with_finish = |id: u32, average: f64| {
            let mut e = entity(id, 0.0, 0.0);
            e.stats.average_finish_position = average;
            e
        };
        let ranked = rank(
            vec![with_finish(1, 2.5), with_finish(2, 14.0), with_finish(3, 7.0)],
            RankMetric::AverageFinish,
        );
        assert_eq!(ids(&ranked), vec![2, 3, 1]);
    }

    #[test]
    fn test_empty_leaderboard() {
        assert!(rank(Vec::new(), RankMetric::PerformanceScore).is_empty());
    }

    #[test]
    fn test_metric_from_str() {
        for metric in RankMetric::ALL {
            assert_eq!(metric.as_str().parse::<RankMetric>().unwrap(), metric);
        }
        assert_eq!("POINTS".parse::<RankMetric>().unwrap(), RankMetric::TotalPoints);
        assert!("laps".parse::<RankMetric>().is_err());
    }
}
