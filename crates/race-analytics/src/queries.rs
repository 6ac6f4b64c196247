//! Per-season breakdowns.
//!
//! Plain grouping by championship year; no smoothing across seasons.

use crate::error::Result;
use race_domain::{EntityId, EntityKind, ResultSet};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};

/// Entity with the most wins in one season.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonChampion {
    /// Championship year
    pub year: i32,
    /// Winning entity
    pub entity_id: EntityId,
    /// Driver or constructor
    pub kind: EntityKind,
    /// Display name
    pub name: String,
    /// Wins that season
    pub wins: u32,
    /// Points that season
    pub points: f64,
}

/// Points per entity, per season.
#[must_use]
pub fn points_by_season(
    results: &ResultSet,
    kind: EntityKind,
) -> BTreeMap<i32, BTreeMap<EntityId, f64>> {
    let mut seasons: BTreeMap<i32, BTreeMap<EntityId, f64>> = BTreeMap::new();
    for record in results.iter() {
        *seasons
            .entry(record.year)
            .or_default()
            .entry(record.entity_id(kind))
            .or_insert(0.0) += record.points;
    }
    seasons
}

/// Mean season points of the entities that took part in each season.
#[must_use]
pub fn average_points_by_season(results: &ResultSet, kind: EntityKind) -> BTreeMap<i32, f64> {
    points_by_season(results, kind)
        .into_iter()
        .map(|(year, entities)| (year, entities.values().mean()))
        .collect()
}

/// Entity with the most wins in each season.
///
/// Ties go to more points, then the lower id. Seasons without a win are
/// skipped.
pub fn season_champions(results: &ResultSet, kind: EntityKind) -> Result<Vec<SeasonChampion>> {
    let mut tallies: BTreeMap<i32, HashMap<EntityId, (u32, f64)>> = BTreeMap::new();
    for record in results.iter() {
        let tally = tallies
            .entry(record.year)
            .or_default()
            .entry(record.entity_id(kind))
            .or_insert((0, 0.0));
        tally.0 += u32::from(record.is_win());
        tally.1 += record.points;
    }

    let mut champions = Vec::new();
    for (year, entities) in tallies {
        let best = entities.into_iter().max_by(|(a_id, a), (b_id, b)| {
            a.0.cmp(&b.0)
                .then_with(|| a.1.total_cmp(&b.1))
                .then_with(|| Reverse(a_id).cmp(&Reverse(b_id)))
        });

        if let Some((entity_id, (wins, points))) = best.filter(|(_, (wins, _))| *wins > 0) {
            champions.push(SeasonChampion {
                year,
                entity_id,
                kind,
                name: results.entity_name(kind, entity_id)?.to_string(),
                wins,
                points,
            });
        }
    }
    Ok(champions)
}
