#![allow(dead_code)]

use chrono::{Days, NaiveDate};
use mcfolio::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, StandardNormal};

/// Annual drift of the three synthetic assets.
pub const MU: [f64; 3] = [0.08, 0.10, 0.12];
/// Annual volatility of the three synthetic assets.
pub const SIGMA: [f64; 3] = [0.15, 0.20, 0.25];
pub const RHO_AB: f64 = 0.5;

pub fn first_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2015, 1, 2).unwrap()
}

pub fn allocations() -> Vec<AssetAllocation> {
    vec![
        AssetAllocation::new(1, "AAA", 0.5),
        AssetAllocation::new(2, "BBB", 0.3),
        AssetAllocation::new(3, "CCC", 0.2),
    ]
}

/// Weekly log-returns for assets 1, 2 and 3 with corr(1, 2) = 0.5 and asset 3
/// independent, on `weeks` consecutive Fridays.
pub fn weekly_source(weeks: usize, seed: u64) -> InMemoryReturnSource {
    let mut rng = StdRng::seed_from_u64(seed);
    let dt = 1.0 / 52.0_f64;
    let loading = (1.0 - RHO_AB * RHO_AB).sqrt();
    let mut source = InMemoryReturnSource::default();

    for week in 0..weeks {
        let date = first_date() + Days::new(7 * week as u64);
        let z1: f64 = StandardNormal.sample(&mut rng);
        let z2: f64 = StandardNormal.sample(&mut rng);
        let z3: f64 = StandardNormal.sample(&mut rng);
        let shocks = [z1, RHO_AB * z1 + loading * z2, z3];
        for (i, z) in shocks.iter().enumerate() {
            let r = MU[i] * dt + SIGMA[i] * dt.sqrt() * z;
            source.push(ReturnObservation::new(i as i32 + 1, date, r));
        }
    }
    source
}

pub fn request(iterations: usize, duration: usize, seed: u64) -> SimulationRequest {
    SimulationRequest::new(allocations(), iterations, duration, seed)
}
