//! Per-entity aggregation of race results.
//!
//! Records are partitioned by driver or constructor id and every group is
//! reduced independently. All statistics are order-independent except
//! `primary_constructor`, which follows result-set order.

use race_domain::{EntityId, EntityKind, EntityStats, RaceId, ResultRecord, ResultSet};
use statrs::statistics::Statistics;
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::{debug, warn};

/// Aggregated statistics keyed by entity id. Key order carries no meaning.
pub type StatsById = HashMap<EntityId, EntityStats>;

/// Group `results` by `group_by` and compute statistics for every entity.
#[must_use]
pub fn aggregate(results: &ResultSet, group_by: EntityKind) -> StatsById {
    let mut groups: HashMap<EntityId, Vec<&ResultRecord>> = HashMap::new();
    for record in results.iter() {
        groups
            .entry(record.entity_id(group_by))
            .or_default()
            .push(record);
    }

    let stats: StatsById = groups
        .into_iter()
        .map(|(id, records)| (id, summarize(id, group_by, &records)))
        .collect();

    debug!(
        kind = %group_by,
        entities = stats.len(),
        records = results.len(),
        "Aggregated entity statistics"
    );
    stats
}

/// Reduce one entity's records to its statistics.
fn summarize(entity_id: EntityId, kind: EntityKind, records: &[&ResultRecord]) -> EntityStats {
    let Some(first) = records.first() else {
        return EntityStats::empty(entity_id, kind);
    };

    let total_points: f64 = records.iter().map(|r| r.points).sum();
    let total_wins = count(records, ResultRecord::is_win);
    let total_podiums = count(records, ResultRecord::is_podium);
    let top_fives = count(records, ResultRecord::is_top_five);

    // A constructor fielding two cars in one race still entered it once.
    let races_entered = match kind {
        EntityKind::Driver => to_u32(records.len()),
        EntityKind::Constructor => {
            to_u32(records.iter().map(|r| r.race_id).collect::<HashSet<_>>().len())
        }
    };

    let average_finish_position = records.iter().map(|r| f64::from(r.position_order)).mean();

    let grids: Vec<f64> = records
        .iter()
        .filter_map(|r| r.grid_position.map(f64::from))
        .collect();

    // gained = avg grid - avg finish, so the exposed averages always agree
    let (average_grid_position, positions_gained_average) = if grids.is_empty() {
        warn!(
            kind = %kind,
            entity = %entity_id,
            "No grid positions recorded, positions gained defaults to 0"
        );
        (None, 0.0)
    } else {
        let average_grid = grids.iter().mean();
        (Some(average_grid), average_grid - average_finish_position)
    };

    let winning_races: BTreeSet<RaceId> = records
        .iter()
        .filter(|r| r.is_win())
        .map(|r| r.race_id)
        .collect();

    EntityStats {
        entity_id,
        kind,
        total_points,
        total_wins,
        total_podiums,
        races_entered,
        average_points_per_race: per_race(total_points, races_entered),
        win_rate_pct: 100.0 * per_race(f64::from(total_wins), races_entered),
        top_five_rate_pct: 100.0 * f64::from(top_fives) / f64::from(to_u32(records.len())),
        best_finish_position: records
            .iter()
            .map(|r| r.position_order)
            .filter(|&p| p >= 1)
            .min(),
        average_grid_position,
        average_finish_position,
        positions_gained_average,
        primary_constructor: match kind {
            EntityKind::Driver => Some(first.constructor_id),
            EntityKind::Constructor => None,
        },
        winning_races: winning_races.into_iter().collect(),
    }
}

fn count(records: &[&ResultRecord], predicate: fn(&ResultRecord) -> bool) -> u32 {
    to_u32(records.iter().filter(|r| predicate(r)).count())
}

/// `total / races`, defined as 0 when no races were entered.
pub(crate) fn per_race(total: f64, races: u32) -> f64 {
    if races == 0 {
        0.0
    } else {
        total / f64::from(races)
    }
}

fn to_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use race_domain::{ConstructorId, DriverId};

    fn record(
        driver: u32,
        constructor: u32,
        race: u32,
        points: f64,
        position: u32,
        grid: Option<u32>,
    ) -> ResultRecord {
        ResultRecord {
            driver_id: DriverId(driver),
            constructor_id: ConstructorId(constructor),
            race_id: RaceId(race),
            year: 2023,
            points,
            position_order: position,
            grid_position: grid,
        }
    }

    fn result_set(records: Vec<ResultRecord>) -> ResultSet {
        let drivers = records
            .iter()
            .map(|r| (r.driver_id, format!("Driver {}", r.driver_id)))
            .collect();
        let constructors = records
            .iter()
            .map(|r| (r.constructor_id, format!("Team {}", r.constructor_id)))
            .collect();
        ResultSet::new(records, drivers, constructors).unwrap()
    }

    #[test]
    fn test_driver_scenario() {
        let results = result_set(vec![
            record(1, 10, 100, 25.0, 1, Some(1)),
            record(1, 10, 101, 18.0, 2, Some(3)),
            record(2, 11, 100, 0.0, 15, Some(5)),
        ]);
        let stats = aggregate(&results, EntityKind::Driver);
        assert_eq!(stats.len(), 2);

        let d1 = &stats[&EntityId(1)];
        assert!((d1.total_points - 43.0).abs() < f64::EPSILON);
        assert_eq!(d1.total_wins, 1);
        assert_eq!(d1.total_podiums, 2);
        assert_eq!(d1.races_entered, 2);
        assert!((d1.average_points_per_race - 21.5).abs() < f64::EPSILON);
        assert_eq!(d1.best_finish_position, Some(1));
        assert_eq!(d1.average_grid_position, Some(2.0));
        assert!((d1.average_finish_position - 1.5).abs() < f64::EPSILON);
        assert!((d1.positions_gained_average - 0.5).abs() < f64::EPSILON);
        assert!((d1.win_rate_pct - 50.0).abs() < f64::EPSILON);
        assert_eq!(d1.primary_constructor, Some(ConstructorId(10)));
        assert_eq!(d1.winning_races, vec![RaceId(100)]);

        let d2 = &stats[&EntityId(2)];
        assert!(d2.total_points.abs() < f64::EPSILON);
        assert_eq!(d2.total_wins, 0);
        assert_eq!(d2.races_entered, 1);
        assert_eq!(d2.best_finish_position, Some(15));
        assert!((d2.positions_gained_average - -10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_constructor_counts_distinct_races() {
        let results = result_set(vec![
            record(1, 10, 500, 25.0, 1, Some(2)),
            record(2, 10, 500, 18.0, 2, Some(1)),
            record(1, 10, 501, 15.0, 3, Some(1)),
        ]);
        let stats = aggregate(&results, EntityKind::Constructor);
        let team = &stats[&EntityId(10)];

        assert_eq!(team.races_entered, 2);
        assert_eq!(team.total_wins, 1);
        assert_eq!(team.total_podiums, 3);
        assert!((team.average_points_per_race - 29.0).abs() < f64::EPSILON);
        assert!(team.primary_constructor.is_none());
    }

    #[test]
    fn test_single_race_two_cars() {
        let results = result_set(vec![
            record(1, 10, 500, 10.0, 4, Some(4)),
            record(2, 10, 500, 8.0, 5, Some(6)),
        ]);
        let stats = aggregate(&results, EntityKind::Constructor);
        assert_eq!(stats[&EntityId(10)].races_entered, 1);
    }

    #[test]
    fn test_missing_grid_data() {
        let results = result_set(vec![
            record(1, 10, 1, 0.0, 12, None),
            record(1, 10, 2, 0.0, 8, Some(10)),
            record(2, 11, 1, 0.0, 20, None),
        ]);
        let stats = aggregate(&results, EntityKind::Driver);

        let partial = &stats[&EntityId(1)];
        assert_eq!(partial.average_grid_position, Some(10.0));
        assert!((partial.average_finish_position - 10.0).abs() < f64::EPSILON);
        assert!(partial.positions_gained_average.abs() < f64::EPSILON);
        assert!(
            (partial.positions_gained_average
                - (partial.average_grid_position.unwrap() - partial.average_finish_position))
                .abs()
                < f64::EPSILON
        );

        let none = &stats[&EntityId(2)];
        assert_eq!(none.average_grid_position, None);
        assert!(none.positions_gained_average.abs() < f64::EPSILON);
    }

    #[test]
    fn test_non_finish_sentinel() {
        let results = result_set(vec![
            record(1, 10, 1, 25.0, 1, Some(1)),
            record(2, 11, 1, 0.0, 0, Some(4)),
            record(2, 11, 2, 15.0, 3, Some(2)),
            record(3, 11, 2, 0.0, 0, None),
        ]);
        let stats = aggregate(&results, EntityKind::Driver);

        let mixed = &stats[&EntityId(2)];
        assert_eq!(mixed.best_finish_position, Some(3));
        assert_eq!(mixed.total_podiums, 1);
        assert_eq!(mixed.races_entered, 2);

        let never_classified = &stats[&EntityId(3)];
        assert_eq!(never_classified.best_finish_position, None);
        assert_eq!(never_classified.total_podiums, 0);
    }

    #[test]
    fn test_top_five_rate() {
        let results = result_set(vec![
            record(1, 10, 1, 10.0, 5, Some(5)),
            record(1, 10, 2, 0.0, 6, Some(5)),
            record(1, 10, 3, 12.0, 4, Some(5)),
            record(1, 10, 4, 0.0, 19, Some(5)),
        ]);
        let stats = aggregate(&results, EntityKind::Driver);
        assert!((stats[&EntityId(1)].top_five_rate_pct - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_result_set() {
        let results = result_set(vec![]);
        assert!(aggregate(&results, EntityKind::Driver).is_empty());
    }

    #[test]
    fn test_per_race_zero_races() {
        assert!(per_race(42.0, 0).abs() < f64::EPSILON);
        assert!((per_race(42.0, 4) - 10.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_summarize_empty_group() {
        let stats = summarize(EntityId(3), EntityKind::Driver, &[]);
        assert_eq!(stats, EntityStats::empty(EntityId(3), EntityKind::Driver));
        assert!(stats.average_points_per_race.abs() < f64::EPSILON);
    }
}
