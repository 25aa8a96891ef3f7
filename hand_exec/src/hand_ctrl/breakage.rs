//! Finger breakage monitor
//!
//! A finger whose joints carry an excessive wrench for `latch_count` consecutive cycles is
//! broken for good: the monitor latches and the hand releases position control of both joints.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use hand_if::eqpt::hand::JointWrench;
use serde::Serialize;

use super::BreakageLimits;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Consecutive over limit counter of one finger's joint pair.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct BreakageMonitor {
    counter: u32,
    broken: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl BreakageMonitor {
    /// Update the monitor with this cycle's wrenches.
    ///
    /// Returns true only on the cycle the finger breaks, the caller shall then disable the
    /// position control of the finger's joints.
    pub fn update(
        &mut self,
        proximal: &JointWrench,
        distal: &JointWrench,
        limits: &BreakageLimits
    ) -> bool {
        // Once past the latch count nothing is evaluated any more
        if self.counter < limits.latch_count {
            if Self::is_over_limit(proximal, distal, limits) {
                self.counter += 1;
            }
            else {
                self.counter = 0;
            }
        }

        if self.counter == limits.latch_count {
            self.broken = true;
            self.counter += 1;
            return true;
        }

        false
    }

    /// True if any of the joint wrench components is above its limit.
    pub fn is_over_limit(
        proximal: &JointWrench,
        distal: &JointWrench,
        limits: &BreakageLimits
    ) -> bool {
        proximal.force_n > limits.proximal_force_n
            || proximal.torque_nm > limits.proximal_torque_nm
            || distal.force_n > limits.distal_force_n
            || distal.torque_nm > limits.distal_torque_nm
    }

    pub fn counter(&self) -> u32 {
        self.counter
    }

    pub fn is_broken(&self) -> bool {
        self.broken
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn wrench(force_n: f64, torque_nm: f64) -> JointWrench {
        JointWrench { force_n, torque_nm }
    }

    #[test]
    fn test_each_limit_counts() {
        let limits = BreakageLimits::default();
        let ok = wrench(1.0, 1.0);

        assert!(BreakageMonitor::is_over_limit(&wrench(40.1, 0.0), &ok, &limits));
        assert!(BreakageMonitor::is_over_limit(&wrench(0.0, 8.1), &ok, &limits));
        assert!(BreakageMonitor::is_over_limit(&ok, &wrench(40.1, 0.0), &limits));
        assert!(BreakageMonitor::is_over_limit(&ok, &wrench(0.0, 6.1), &limits));
        assert!(!BreakageMonitor::is_over_limit(&wrench(40.0, 8.0), &wrench(40.0, 6.0), &limits));
    }

    #[test]
    fn test_counter_resets() {
        let limits = BreakageLimits::default();
        let mut monitor = BreakageMonitor::default();
        let high = wrench(50.0, 0.0);
        let low = wrench(0.0, 0.0);

        for i in 1..=99 {
            assert!(!monitor.update(&high, &low, &limits));
            assert_eq!(monitor.counter(), i);
        }

        assert!(!monitor.update(&low, &low, &limits));
        assert_eq!(monitor.counter(), 0);
        assert!(!monitor.is_broken());
    }

    #[test]
    fn test_latches_once() {
        let limits = BreakageLimits {
            latch_count: 5,
            ..Default::default()
        };
        let mut monitor = BreakageMonitor::default();
        let high = wrench(0.0, 7.0);
        let low = wrench(0.0, 0.0);

        let events: Vec<bool> = (0..5).map(|_| monitor.update(&low, &high, &limits)).collect();
        assert_eq!(events, vec![false, false, false, false, true]);
        assert!(monitor.is_broken());
        assert_eq!(monitor.counter(), 6);

        // Later readings change nothing
        assert!(!monitor.update(&low, &low, &limits));
        assert!(!monitor.update(&high, &high, &limits));
        assert!(monitor.is_broken());
        assert_eq!(monitor.counter(), 6);
    }
}
