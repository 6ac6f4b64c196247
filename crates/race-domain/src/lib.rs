//! # Race Performance Analytics - Domain Model
//!
//! Core identifiers, result records and computed statistics for historical
//! motor-racing analysis. These types are the single source of truth across
//! all layers: analytics, reporting and the simulator/CLI.
//!
//! A [`ResultSet`] is loaded once by an outside collaborator and then handed,
//! immutably, to every analysis call.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Driver identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DriverId(pub u32);

/// Constructor (team) identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConstructorId(pub u32);

/// Race identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RaceId(pub u32);

/// Grouping key of an aggregated entity, either a driver or a constructor id.
///
/// Ordered so that leaderboards can break ties by ascending id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub u32);

impl From<DriverId> for EntityId {
    fn from(id: DriverId) -> Self {
        Self(id.0)
    }
}

impl From<ConstructorId> for EntityId {
    fn from(id: ConstructorId) -> Self {
        Self(id.0)
    }
}

impl fmt::Display for DriverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ConstructorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for RaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// ENUMS
// =============================================================================

/// Kind of entity being ranked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityKind {
    Driver,
    Constructor,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Driver => "DRIVER",
            Self::Constructor => "CONSTRUCTOR",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// RECORDS
// =============================================================================

/// One driver's result in one race, already joined with the race's year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub driver_id: DriverId,
    pub constructor_id: ConstructorId,
    pub race_id: RaceId,
    pub year: i32,
    pub points: f64,
    /// 1-based classified order; non-finishers are ordered after finishers
    pub position_order: u32,
    /// 1-based starting slot, `None` when the start position is unknown
    pub grid_position: Option<u32>,
}

impl ResultRecord {
    /// Grouping key of this record for the given entity kind.
    #[must_use]
    pub fn entity_id(&self, kind: EntityKind) -> EntityId {
        match kind {
            EntityKind::Driver => self.driver_id.into(),
            EntityKind::Constructor => self.constructor_id.into(),
        }
    }

    /// Map a raw dataset grid value to an optional slot (0 means pit-lane / unknown).
    #[must_use]
    pub const fn grid_from_raw(raw: u32) -> Option<u32> {
        if raw == 0 { None } else { Some(raw) }
    }

    #[must_use]
    pub const fn is_win(&self) -> bool {
        self.position_order == 1
    }

    #[must_use]
    pub const fn is_podium(&self) -> bool {
        self.position_order >= 1 && self.position_order <= 3
    }

    #[must_use]
    pub const fn is_top_five(&self) -> bool {
        self.position_order >= 1 && self.position_order <= 5
    }
}

// =============================================================================
// SEASON WINDOW
// =============================================================================

/// Inclusive range of championship years
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SeasonWindow {
    year_min: i32,
    year_max: i32,
}

impl SeasonWindow {
    /// Build a window, rejecting inverted bounds.
    pub fn new(year_min: i32, year_max: i32) -> Result<Self, DomainError> {
        if year_min > year_max {
            return Err(DomainError::InvalidRange { year_min, year_max });
        }
        Ok(Self { year_min, year_max })
    }

    /// Window covering exactly one season.
    #[must_use]
    pub const fn single(year: i32) -> Self {
        Self {
            year_min: year,
            year_max: year,
        }
    }

    #[must_use]
    pub const fn year_min(&self) -> i32 {
        self.year_min
    }

    #[must_use]
    pub const fn year_max(&self) -> i32 {
        self.year_max
    }

    #[must_use]
    pub const fn contains(&self, year: i32) -> bool {
        self.year_min <= year && year <= self.year_max
    }
}

impl fmt::Display for SeasonWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.year_min == self.year_max {
            write!(f, "{}", self.year_min)
        } else {
            write!(f, "{}-{}", self.year_min, self.year_max)
        }
    }
}

// =============================================================================
// RESULT SET
// =============================================================================

/// Name lookups joined onto a result set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct NameTables {
    drivers: HashMap<DriverId, String>,
    constructors: HashMap<ConstructorId, String>,
    races: HashMap<RaceId, String>,
}

/// Ordered, immutable table of race results plus its name side tables.
///
/// Every driver and constructor referenced by a record is guaranteed to
/// have a name entry. Filtered subsets share the name tables of their parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ResultSetData", into = "ResultSetData")]
pub struct ResultSet {
    records: Vec<ResultRecord>,
    names: Arc<NameTables>,
}

/// Flat, serializable shape of a [`ResultSet`], used for fixtures and dumps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSetData {
    pub records: Vec<ResultRecord>,
    pub drivers: HashMap<DriverId, String>,
    pub constructors: HashMap<ConstructorId, String>,
    #[serde(default)]
    pub races: HashMap<RaceId, String>,
}

impl ResultSet {
    /// Build a result set, verifying that every referenced id has a name.
    pub fn new(
        records: Vec<ResultRecord>,
        drivers: HashMap<DriverId, String>,
        constructors: HashMap<ConstructorId, String>,
    ) -> Result<Self, DomainError> {
        for record in &records {
            if !drivers.contains_key(&record.driver_id) {
                return Err(DomainError::UnknownEntity {
                    kind: EntityKind::Driver,
                    id: record.driver_id.0,
                });
            }
            if !constructors.contains_key(&record.constructor_id) {
                return Err(DomainError::UnknownEntity {
                    kind: EntityKind::Constructor,
                    id: record.constructor_id.0,
                });
            }
        }

        Ok(Self {
            records,
            names: Arc::new(NameTables {
                drivers,
                constructors,
                races: HashMap::new(),
            }),
        })
    }

    /// Attach race names, used to list the races an entity won.
    #[must_use]
    pub fn with_race_names(mut self, races: HashMap<RaceId, String>) -> Self {
        Arc::make_mut(&mut self.names).races = races;
        self
    }

    #[must_use]
    pub fn records(&self) -> &[ResultRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResultRecord> {
        self.records.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Subsequence of records matching `keep`, in original order.
    #[must_use]
    pub fn subset<F>(&self, mut keep: F) -> Self
    where
        F: FnMut(&ResultRecord) -> bool,
    {
        Self {
            records: self.records.iter().filter(|r| keep(r)).copied().collect(),
            names: Arc::clone(&self.names),
        }
    }

    /// Distinct championship years present, ascending.
    #[must_use]
    pub fn seasons(&self) -> BTreeSet<i32> {
        self.records.iter().map(|r| r.year).collect()
    }

    pub fn driver_name(&self, id: DriverId) -> Result<&str, DomainError> {
        self.names
            .drivers
            .get(&id)
            .map(String::as_str)
            .ok_or(DomainError::UnknownEntity {
                kind: EntityKind::Driver,
                id: id.0,
            })
    }

    pub fn constructor_name(&self, id: ConstructorId) -> Result<&str, DomainError> {
        self.names
            .constructors
            .get(&id)
            .map(String::as_str)
            .ok_or(DomainError::UnknownEntity {
                kind: EntityKind::Constructor,
                id: id.0,
            })
    }

    /// Display name of an aggregated entity.
    pub fn entity_name(&self, kind: EntityKind, id: EntityId) -> Result<&str, DomainError> {
        match kind {
            EntityKind::Driver => self.driver_name(DriverId(id.0)),
            EntityKind::Constructor => self.constructor_name(ConstructorId(id.0)),
        }
    }

    /// Race name, if the loader supplied one.
    #[must_use]
    pub fn race_name(&self, id: RaceId) -> Option<&str> {
        self.names.races.get(&id).map(String::as_str)
    }
}

impl TryFrom<ResultSetData> for ResultSet {
    type Error = DomainError;

    fn try_from(data: ResultSetData) -> Result<Self, Self::Error> {
        Ok(Self::new(data.records, data.drivers, data.constructors)?.with_race_names(data.races))
    }
}

impl From<ResultSet> for ResultSetData {
    fn from(set: ResultSet) -> Self {
        let names = Arc::unwrap_or_clone(set.names);
        Self {
            records: set.records,
            drivers: names.drivers,
            constructors: names.constructors,
            races: names.races,
        }
    }
}

// =============================================================================
// COMPUTED STATISTICS
// =============================================================================

/// Aggregate statistics of one entity over a result set.
///
/// Always derived fresh by aggregation; never updated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityStats {
    pub entity_id: EntityId,
    pub kind: EntityKind,

    // Totals
    pub total_points: f64,
    pub total_wins: u32,
    pub total_podiums: u32,
    pub races_entered: u32,

    // Rates & averages
    pub average_points_per_race: f64,
    pub win_rate_pct: f64,
    pub top_five_rate_pct: f64,
    pub best_finish_position: Option<u32>,
    pub average_grid_position: Option<f64>,
    pub average_finish_position: f64,
    pub positions_gained_average: f64,

    // Context
    /// Constructor of the driver's first result; `None` for constructors
    pub primary_constructor: Option<ConstructorId>,
    pub winning_races: Vec<RaceId>,
}

impl EntityStats {
    /// Statistics of an entity with no recorded races.
    #[must_use]
    pub const fn empty(entity_id: EntityId, kind: EntityKind) -> Self {
        Self {
            entity_id,
            kind,
            total_points: 0.0,
            total_wins: 0,
            total_podiums: 0,
            races_entered: 0,
            average_points_per_race: 0.0,
            win_rate_pct: 0.0,
            top_five_rate_pct: 0.0,
            best_finish_position: None,
            average_grid_position: None,
            average_finish_position: 0.0,
            positions_gained_average: 0.0,
            primary_constructor: None,
            winning_races: Vec::new(),
        }
    }
}

/// Entity statistics together with its display name and performance score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredEntity {
    pub name: String,
    pub stats: EntityStats,
    pub performance_score: f64,
    /// 1-based leaderboard position, 0 until ranked
    #[serde(default)]
    pub rank: u32,
    pub team_competitiveness: Option<f64>,
    pub points_contribution_pct: Option<f64>,
    pub wins_contribution_pct: Option<f64>,
}

impl ScoredEntity {
    #[must_use]
    pub fn new(name: impl Into<String>, stats: EntityStats, performance_score: f64) -> Self {
        Self {
            name: name.into(),
            stats,
            performance_score,
            rank: 0,
            team_competitiveness: None,
            points_contribution_pct: None,
            wins_contribution_pct: None,
        }
    }

    #[must_use]
    pub const fn entity_id(&self) -> EntityId {
        self.stats.entity_id
    }
}

// =============================================================================
// ERRORS
// =============================================================================

/// Domain-level errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    #[error("Unknown entity: {kind} with id {id} has no name entry")]
    UnknownEntity { kind: EntityKind, id: u32 },

    #[error("Invalid season range: {year_min} > {year_max}")]
    InvalidRange { year_min: i32, year_max: i32 },
}
