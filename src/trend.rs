// Seasonal price simulation
//
// There is no observed seasonal data; each record's base price is jittered by
// an independent uniform factor per season. The output is a display aid only.

use crate::catalog::FruitRecord;
use rand::rngs::{StdRng, ThreadRng};
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Lower and upper bound of the seasonal multiplier
pub const VARIATION_RANGE: (f64, f64) = (0.8, 1.2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Season {
    Spring,
    Summer,
    Fall,
    Winter,
}

impl Season {
    pub const ALL: [Season; 4] = [Season::Spring, Season::Summer, Season::Fall, Season::Winter];

    pub fn label(&self) -> &'static str {
        match self {
            Season::Spring => "봄",
            Season::Summer => "여름",
            Season::Fall => "가을",
            Season::Winter => "겨울",
        }
    }

    /// Season of a calendar month (1-12). Out-of-range months count as winter.
    pub fn from_month(month: u32) -> Self {
        match month {
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            9..=11 => Season::Fall,
            _ => Season::Winter,
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonalSample {
    pub name: String,
    pub kind: String,
    pub season: Season,
    pub simulated_price: f64,
    pub base_price: f64,
}

/// One sample per record per season, in season order. A missing base price
/// simulates as 0 and is dropped later by the price > 0 filter.
pub fn simulate_seasonal_prices<R: Rng>(
    records: &[FruitRecord],
    rng: &mut R,
) -> Vec<SeasonalSample> {
    let (low, high) = VARIATION_RANGE;
    let mut samples = Vec::with_capacity(records.len() * Season::ALL.len());

    for record in records {
        let base_price = record.price().unwrap_or(0.0);
        for season in Season::ALL {
            let variation = rng.random_range(low..=high);
            samples.push(SeasonalSample {
                name: record.name.clone(),
                kind: record.kind.clone(),
                season,
                simulated_price: base_price * variation,
                base_price,
            });
        }
    }

    debug!(records = records.len(), samples = samples.len(), "simulated seasonal prices");
    samples
}

// ============================================================================
// SIMULATOR
// ============================================================================

enum Source {
    Thread(ThreadRng),
    Seeded(StdRng),
}

/// Owns the randomness source for a run of simulations.
/// Unseeded runs are not reproducible; seeded runs are.
pub struct TrendSimulator {
    source: Source,
}

impl TrendSimulator {
    pub fn new() -> Self {
        TrendSimulator {
            source: Source::Thread(rand::rng()),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        TrendSimulator {
            source: Source::Seeded(StdRng::seed_from_u64(seed)),
        }
    }

    /// Seeded when a seed is configured, thread RNG otherwise
    pub fn from_config(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::with_seed(seed),
            None => Self::new(),
        }
    }

    pub fn simulate(&mut self, records: &[FruitRecord]) -> Vec<SeasonalSample> {
        match &mut self.source {
            Source::Thread(rng) => simulate_seasonal_prices(records, rng),
            Source::Seeded(rng) => simulate_seasonal_prices(records, rng),
        }
    }
}

impl Default for TrendSimulator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Vec<FruitRecord> {
        vec![
            FruitRecord::new("사과", "홍로", Some(1000.0)),
            FruitRecord::new("배", "신고", Some(1000.0)),
        ]
    }

    #[test]
    fn test_simulated_prices_stay_in_band() {
        let mut sim = TrendSimulator::new();
        for _ in 0..50 {
            for sample in sim.simulate(&records()) {
                assert!(
                    (800.0..=1200.0).contains(&sample.simulated_price),
                    "{} out of band",
                    sample.simulated_price
                );
                assert_eq!(sample.base_price, 1000.0);
            }
        }
    }

    #[test]
    fn test_one_sample_per_record_and_season() {
        let samples = TrendSimulator::with_seed(7).simulate(&records());
        assert_eq!(samples.len(), 8);

        let seasons: Vec<Season> = samples.iter().take(4).map(|s| s.season).collect();
        assert_eq!(seasons, Season::ALL.to_vec());
        assert!(samples[..4].iter().all(|s| s.name == "사과"));
        assert!(samples[4..].iter().all(|s| s.name == "배"));
    }

    #[test]
    fn test_same_seed_same_series() {
        let a = TrendSimulator::with_seed(42).simulate(&records());
        let b = TrendSimulator::with_seed(42).simulate(&records());
        assert_eq!(a, b);
    }

    #[test]
    fn test_missing_base_price_simulates_zero() {
        let unpriced = vec![FruitRecord::new("수박", "일반", None)];
        let samples = TrendSimulator::with_seed(1).simulate(&unpriced);
        assert_eq!(samples.len(), 4);
        assert!(samples.iter().all(|s| s.simulated_price == 0.0));
    }

    #[test]
    fn test_season_from_month() {
        assert_eq!(Season::from_month(4), Season::Spring);
        assert_eq!(Season::from_month(7), Season::Summer);
        assert_eq!(Season::from_month(10), Season::Fall);
        assert_eq!(Season::from_month(1), Season::Winter);
        assert_eq!(Season::from_month(12), Season::Winter);
    }
}
