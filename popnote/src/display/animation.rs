//! Exponential reveal/hide timing.

use std::time::Duration;

/// Growth factor between consecutive animation rounds.
pub const DELTA: f64 = 1.333;

/// Interval between animation ticks.
pub const TICK: Duration = Duration::from_millis(33);

/// How one popup's display time is spent.
///
/// An eighth of the total goes to revealing, an eighth to hiding and the
/// remaining three quarters to being fully shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationPlan {
    rounds: u32,
    anim_time: Duration,
    shown_time: Duration,
    total: Duration,
}

impl AnimationPlan {
    pub fn new(total: Duration) -> Self {
        let anim_time = total / 8;
        let shown_time = total * 3 / 4;
        let rounds = (anim_time.as_secs_f64() / TICK.as_secs_f64()).round().max(1.0) as u32;
        Self {
            rounds,
            anim_time,
            shown_time,
            total,
        }
    }

    /// Number of animation rounds, at least one.
    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    pub fn anim_time(&self) -> Duration {
        self.anim_time
    }

    pub fn shown_time(&self) -> Duration {
        self.shown_time
    }

    pub fn total(&self) -> Duration {
        self.total
    }

    /// Revealed extent of a `full`-pixel edge at `round`, within `1..=full`.
    pub fn extent(&self, full: u32, round: i32) -> u32 {
        let full = full.max(1);
        let scaled = f64::from(full) / DELTA.powi(self.rounds as i32) * DELTA.powi(round);
        (scaled.round() as i64).clamp(1, i64::from(full)) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_split() {
        let plan = AnimationPlan::new(Duration::from_secs(8));
        assert_eq!(plan.anim_time(), Duration::from_secs(1));
        assert_eq!(plan.shown_time(), Duration::from_secs(6));
        assert_eq!(plan.rounds(), 30);
    }

    #[test]
    fn at_least_one_round() {
        assert_eq!(AnimationPlan::new(Duration::from_millis(100)).rounds(), 1);
        assert_eq!(AnimationPlan::new(Duration::ZERO).rounds(), 1);
        assert_eq!(AnimationPlan::new(Duration::from_secs(1)).rounds(), 4);
    }

    #[test]
    fn extent_grows_monotonically() {
        for secs in [1u64, 3, 5, 8, 30] {
            let plan = AnimationPlan::new(Duration::from_secs(secs));
            let r = plan.rounds() as i32;
            for full in [1u32, 2, 16, 140, 600] {
                let first = plan.extent(full, 0);
                let expected = (f64::from(full) / DELTA.powi(r)).round().max(1.0) as u32;
                assert_eq!(first, expected.min(full));

                let last = plan.extent(full, r - 1);
                assert!(f64::from(last) >= (f64::from(full) / DELTA).floor());
                assert!(last <= full);

                let mut previous = 0;
                for round in 0..r {
                    let e = plan.extent(full, round);
                    assert!(e >= previous, "secs={secs} full={full} round={round}");
                    assert!(e >= 1);
                    previous = e;
                }
            }
        }
    }

    #[test]
    fn extent_is_clamped() {
        let plan = AnimationPlan::new(Duration::from_secs(5));
        assert_eq!(plan.extent(100, -3), 1);
        assert_eq!(plan.extent(100, 1000), 100);
        assert_eq!(plan.extent(0, 0), 1);
    }
}
