//! Random placeholder figures for the simulated workflows.
//!
//! None of these numbers come from a model; they only keep the dashboard
//! looking alive.

use std::fmt;

use rand::Rng;

/// Projected savings range shown on the train page, `low-(low+7)%`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SavingsRange {
    pub low: u8,
}

impl SavingsRange {
    pub const WIDTH: u8 = 7;

    /// Low bound uniform in `[10, 25)`.
    pub fn random(rng: &mut impl Rng) -> Self {
        Self {
            low: rng.gen_range(10..25),
        }
    }

    pub fn high(self) -> u8 {
        self.low + Self::WIDTH
    }
}

impl fmt::Display for SavingsRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}%", self.low, self.high())
    }
}

/// Training progress uniform in `[0, 100)`.
pub fn random_progress(rng: &mut impl Rng) -> u8 {
    rng.gen_range(0..100)
}

/// Savings added by one optimization tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickGain {
    /// 1..=5 kWh.
    pub kwh: u64,
    /// 1..=2 dollars.
    pub money: u64,
}

impl TickGain {
    pub fn random(rng: &mut impl Rng) -> Self {
        Self {
            kwh: rng.gen_range(1..=5),
            money: rng.gen_range(1..=2),
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn savings_range_stays_in_bounds() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..500 {
            let range = SavingsRange::random(&mut rng);
            assert!((10..25).contains(&range.low));
            assert_eq!(range.high(), range.low + 7);
        }
    }

    #[test]
    fn savings_range_label() {
        assert_eq!(SavingsRange { low: 12 }.to_string(), "12-19%");
    }

    #[test]
    fn progress_and_gains_stay_in_bounds() {
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..500 {
            assert!(random_progress(&mut rng) < 100);
            let gain = TickGain::random(&mut rng);
            assert!((1..=5).contains(&gain.kwh));
            assert!((1..=2).contains(&gain.money));
        }
    }
}
