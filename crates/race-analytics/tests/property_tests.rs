//! Property-based tests for the analytics pipeline
//!
//! - Aggregate invariants hold for every entity
//! - Ranking is a total order and deterministic
//! - Run with ProptestConfig::with_cases(100)

use proptest::prelude::*;
use race_analytics::{
    AnalysisKind, AnalysisRequest, AnalyticsEngine, RankMetric, ScoringMode, aggregate,
    filter_window, rank, score_entities,
};
use race_domain::{
    ConstructorId, DriverId, EntityKind, RaceId, ResultRecord, ResultSet, SeasonWindow,
};
use std::collections::HashMap;

const POINTS: [f64; 10] = [25.0, 18.0, 15.0, 12.0, 10.0, 8.0, 6.0, 4.0, 2.0, 1.0];
const DRIVERS: u32 = 6;

// ============================================================================
// Generators
// ============================================================================

/// Driver `d` always races for constructor `10 + d / 2`.
const fn constructor_of(driver: u32) -> u32 {
    10 + driver / 2
}

/// One race: year, finishing order of all drivers, whether grid data exists.
fn arb_race() -> impl Strategy<Value = (i32, Vec<u32>, bool)> {
    (
        2018i32..=2024,
        Just((0..DRIVERS).collect::<Vec<_>>()).prop_shuffle(),
        any::<bool>(),
    )
}

fn arb_results() -> impl Strategy<Value = ResultSet> {
    proptest::collection::vec(arb_race(), 0..25).prop_map(|races| {
        let mut records = Vec::new();
        for (index, (year, order, has_grid)) in races.into_iter().enumerate() {
            let race_id = RaceId(u32::try_from(index).unwrap() + 1);
            for (slot, driver) in order.into_iter().enumerate() {
                let position = u32::try_from(slot).unwrap() + 1;
                records.push(ResultRecord {
                    driver_id: DriverId(driver),
                    constructor_id: ConstructorId(constructor_of(driver)),
                    race_id,
                    year,
                    points: POINTS.get(slot).copied().unwrap_or(0.0),
                    position_order: position,
                    grid_position: has_grid.then_some(driver + 1),
                });
            }
        }
        let drivers: HashMap<_, _> = (0..DRIVERS)
            .map(|d| (DriverId(d), format!("Driver {d}")))
            .collect();
        let constructors: HashMap<_, _> = (0..DRIVERS)
            .map(|d| {
                let c = constructor_of(d);
                (ConstructorId(c), format!("Team {c}"))
            })
            .collect();
        ResultSet::new(records, drivers, constructors).unwrap()
    })
}

fn arb_window() -> impl Strategy<Value = SeasonWindow> {
    (2017i32..=2025, 0i32..4)
        .prop_map(|(min, span)| SeasonWindow::new(min, min + span).unwrap())
}

fn arb_kind() -> impl Strategy<Value = EntityKind> {
    prop_oneof![Just(EntityKind::Driver), Just(EntityKind::Constructor)]
}

fn arb_analysis() -> impl Strategy<Value = AnalysisKind> {
    prop_oneof![
        Just(AnalysisKind::Drivers),
        Just(AnalysisKind::Constructors),
        Just(AnalysisKind::TeamAdjustedDrivers),
        Just(AnalysisKind::ContributionAdjustedDrivers),
    ]
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: filtering keeps exactly the in-window records, in order
    #[test]
    fn prop_filter_keeps_exactly_window(results in arb_results(), window in arb_window()) {
        let filtered = filter_window(&results, &window);
        let expected: Vec<ResultRecord> = results
            .iter()
            .filter(|r| window.contains(r.year))
            .copied()
            .collect();
        prop_assert_eq!(filtered.records(), expected.as_slice());
    }

    /// Property: wins <= races, podiums >= wins, averages are consistent
    #[test]
    fn prop_aggregate_invariants(results in arb_results(), kind in arb_kind()) {
        let stats = aggregate(&results, kind);
        for entity in stats.values() {
            prop_assert!(entity.races_entered > 0);
            prop_assert!(entity.total_wins <= entity.races_entered);
            prop_assert!(entity.total_podiums >= entity.total_wins);
            prop_assert!(entity.total_points >= 0.0);
            let average = entity.total_points / f64::from(entity.races_entered);
            prop_assert!((entity.average_points_per_race - average).abs() < 1e-9);
            prop_assert!((0.0..=100.0).contains(&entity.win_rate_pct));
            prop_assert!(entity.best_finish_position.is_some_and(|p| p >= 1));
        }
    }

    /// Property: driver and constructor totals account for the same points
    #[test]
    fn prop_points_are_conserved(results in arb_results()) {
        let total: f64 = results.iter().map(|r| r.points).sum();
        let by_driver: f64 = aggregate(&results, EntityKind::Driver)
            .values()
            .map(|s| s.total_points)
            .sum();
        let by_constructor: f64 = aggregate(&results, EntityKind::Constructor)
            .values()
            .map(|s| s.total_points)
            .sum();
        prop_assert!((total - by_driver).abs() < 1e-6);
        prop_assert!((total - by_constructor).abs() < 1e-6);
    }

    /// Property: ranked output is sorted descending with ids ascending on ties
    #[test]
    fn prop_rank_is_total_order(results in arb_results(), kind in arb_kind()) {
        let stats = aggregate(&results, kind);
        let count = stats.len();
        let scored = score_entities(&results, stats, ScoringMode::Basic, None).unwrap();

        for metric in RankMetric::ALL {
            let ranked = rank(scored.clone(), metric);
            prop_assert_eq!(ranked.len(), count);
            for (index, pair) in ranked.windows(2).enumerate() {
                let (a, b) = (metric.value(&pair[0]), metric.value(&pair[1]));
                prop_assert!(a >= b, "{} not descending at {}", metric, index);
                if a.total_cmp(&b).is_eq() {
                    prop_assert!(pair[0].entity_id() < pair[1].entity_id());
                }
            }
            for (index, entity) in ranked.iter().enumerate() {
                prop_assert_eq!(entity.rank as usize, index + 1);
            }
        }
    }

    /// Property: the same request over the same data yields the same leaderboard
    #[test]
    fn prop_run_is_idempotent(
        results in arb_results(),
        window in arb_window(),
        analysis in arb_analysis(),
    ) {
        let engine = AnalyticsEngine::new(results);
        let request = AnalysisRequest::new(analysis, window);
        let first = engine.run(&request).unwrap();
        let second = engine.run(&request).unwrap();
        prop_assert_eq!(first, second);
    }

    /// Property: top-n returns min(k, n) leading entries
    #[test]
    fn prop_top_n_is_prefix(results in arb_results(), k in 1usize..10) {
        let engine = AnalyticsEngine::new(results);
        let window = SeasonWindow::new(2018, 2024).unwrap();
        let full = engine
            .run(&AnalysisRequest::new(AnalysisKind::Drivers, window))
            .unwrap();
        let limited = engine
            .run(&AnalysisRequest::new(AnalysisKind::Drivers, window).with_top_n(k))
            .unwrap();
        prop_assert_eq!(limited.entries.len(), k.min(full.entries.len()));
        prop_assert_eq!(&full.entries[..limited.entries.len()], limited.entries.as_slice());
    }

    /// Property: driver shares of their team lie within 0..=100 percent
    #[test]
    fn prop_contribution_shares_bounded(results in arb_results(), window in arb_window()) {
        let engine = AnalyticsEngine::new(results);
        let board = engine
            .run(&AnalysisRequest::new(AnalysisKind::ContributionAdjustedDrivers, window))
            .unwrap();
        for entry in &board.entries {
            let points = entry.points_contribution_pct.unwrap();
            let wins = entry.wins_contribution_pct.unwrap();
            prop_assert!((0.0..=100.0 + 1e-9).contains(&points));
            prop_assert!((0.0..=100.0 + 1e-9).contains(&wins));
        }
    }
}
