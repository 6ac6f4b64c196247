//! Synthetic season generation.
//!
//! Every constructor fields two drivers for the whole run. A race is decided
//! by latent pace (car pace for the season plus driver skill) with Gaussian
//! noise on top; qualifying uses the same pace with half the noise.

use crate::error::{Result, SimulatorError};
use fake::Fake;
use fake::faker::company::en::CompanyName;
use fake::faker::name::en::LastName;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use race_domain::{
    ConstructorId, DriverId, RaceId, ResultRecord, ResultSet, SeasonWindow,
};
use std::collections::HashMap;
use tracing::{debug, info};

/// Points for finishing positions 1 to 10.
pub const POINTS: [f64; 10] = [25.0, 18.0, 15.0, 12.0, 10.0, 8.0, 6.0, 4.0, 2.0, 1.0];

const GRANDS_PRIX: [&str; 20] = [
    "Bahrain",
    "Saudi Arabian",
    "Australian",
    "Japanese",
    "Chinese",
    "Miami",
    "Emilia Romagna",
    "Monaco",
    "Canadian",
    "Spanish",
    "Austrian",
    "British",
    "Hungarian",
    "Belgian",
    "Dutch",
    "Italian",
    "Singapore",
    "United States",
    "Brazilian",
    "Abu Dhabi",
];

/// Simulation parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatorConfig {
    /// Number of constructors, each with two drivers
    pub teams: u32,
    /// Races held every season
    pub races_per_season: usize,
    /// Standard deviation of the per-race performance noise
    pub noise_std_dev: f64,
    /// Probability that a car does not finish
    pub retirement_rate: f64,
    /// Probability that a starting position is unrecorded
    pub missing_grid_rate: f64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            teams: 10,
            races_per_season: 22,
            noise_std_dev: 1.0,
            retirement_rate: 0.05,
            missing_grid_rate: 0.02,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Entrant {
    driver: DriverId,
    constructor: ConstructorId,
    team: usize,
    skill: f64,
}

#[derive(Debug, Clone, Copy)]
struct Run {
    entrant: Entrant,
    qualifying: f64,
    race: f64,
    finished: bool,
    grid: Option<u32>,
}

/// Seeded generator of complete result sets.
pub struct SeasonSimulator {
    config: SimulatorConfig,
    rng: StdRng,
    noise: Normal<f64>,
}

impl SeasonSimulator {
    /// Create a simulator; the same seed and config always produce the same data.
    pub fn new(seed: u64, config: SimulatorConfig) -> Result<Self> {
        for (name, rate) in [
            ("retirement_rate", config.retirement_rate),
            ("missing_grid_rate", config.missing_grid_rate),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(SimulatorError::InvalidConfig(format!(
                    "{name} must be within 0..=1, got {rate}"
                )));
            }
        }
        if !(config.noise_std_dev.is_finite() && config.noise_std_dev >= 0.0) {
            return Err(SimulatorError::InvalidConfig(format!(
                "noise_std_dev must be finite and non-negative, got {}",
                config.noise_std_dev
            )));
        }
        let noise = Normal::new(0.0, config.noise_std_dev)?;

        Ok(Self {
            config,
            rng: StdRng::seed_from_u64(seed),
            noise,
        })
    }

    /// Simulator with default parameters.
    pub fn with_seed(seed: u64) -> Result<Self> {
        Self::new(seed, SimulatorConfig::default())
    }

    /// Generate every race of every season in `seasons`.
    pub fn simulate(&mut self, seasons: &SeasonWindow) -> Result<ResultSet> {
        let mut drivers = HashMap::new();
        let mut constructors = HashMap::new();
        let mut entrants = Vec::new();
        let mut car_base = Vec::new();

        for team in 0..self.config.teams {
            let constructor = ConstructorId(team + 1);
            let name: String = CompanyName().fake_with_rng(&mut self.rng);
            constructors.insert(constructor, name);

            let index = car_base.len();
            car_base.push(self.rng.gen_range(0.0..3.0));
            for seat in 1..=2 {
                let driver = DriverId(team * 2 + seat);
                let surname: String = LastName().fake_with_rng(&mut self.rng);
                drivers.insert(driver, surname);
                entrants.push(Entrant {
                    driver,
                    constructor,
                    team: index,
                    skill: self.rng.gen_range(0.0..1.5),
                });
            }
        }

        let mut records = Vec::new();
        let mut races = HashMap::new();
        let mut next_race = 1;

        for year in seasons.year_min()..=seasons.year_max() {
            let car_pace: Vec<f64> = car_base
                .iter()
                .map(|base| base + self.rng.gen_range(-0.5..0.5))
                .collect();

            for grand_prix in GRANDS_PRIX.iter().cycle().take(self.config.races_per_season) {
                let race = RaceId(next_race);
                next_race += 1;
                races.insert(race, format!("{year} {grand_prix} Grand Prix"));
                records.extend(self.run_race(race, year, &entrants, &car_pace));
            }
            debug!(year, races = self.config.races_per_season, "Simulated season");
        }

        info!(
            seasons = %seasons,
            teams = self.config.teams,
            records = records.len(),
            "Simulation complete"
        );

        Ok(ResultSet::new(records, drivers, constructors)?.with_race_names(races))
    }

    fn run_race(
        &mut self,
        race: RaceId,
        year: i32,
        entrants: &[Entrant],
        car_pace: &[f64],
    ) -> Vec<ResultRecord> {
        let mut runs: Vec<Run> = entrants
            .iter()
            .map(|&entrant| {
                let pace = car_pace[entrant.team] + entrant.skill;
                Run {
                    entrant,
                    qualifying: pace + 0.5 * self.noise.sample(&mut self.rng),
                    race: pace + self.noise.sample(&mut self.rng),
                    finished: !self.rng.gen_bool(self.config.retirement_rate),
                    grid: None,
                }
            })
            .collect();

        runs.sort_by(|a, b| b.qualifying.total_cmp(&a.qualifying));
        for (slot, run) in runs.iter_mut().enumerate() {
            if !self.rng.gen_bool(self.config.missing_grid_rate) {
                run.grid = Some(position(slot));
            }
        }

        // Finishers first, then retirements, each by race pace
        runs.sort_by(|a, b| {
            b.finished
                .cmp(&a.finished)
                .then_with(|| b.race.total_cmp(&a.race))
        });

        runs.iter()
            .enumerate()
            .map(|(slot, run)| ResultRecord {
                driver_id: run.entrant.driver,
                constructor_id: run.entrant.constructor,
                race_id: race,
                year,
                points: if run.finished {
                    POINTS.get(slot).copied().unwrap_or(0.0)
                } else {
                    0.0
                },
                position_order: position(slot),
                grid_position: run.grid,
            })
            .collect()
    }
}

fn position(slot: usize) -> u32 {
    u32::try_from(slot + 1).unwrap_or(u32::MAX)
}
