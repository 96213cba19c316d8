use ductus_verify::{Origin, Score};
use serde::Serialize;

/// Accumulated decision outcomes at one fixed threshold.
///
/// A prediction at or above the threshold is treated as a forgery call.
/// Rates over an empty class are NaN rather than zero so that a
/// single-label comparison set reports as undefined instead of perfect.
#[derive(Debug, Clone, Serialize)]
pub struct ThresholdBucket {
    threshold: f64,
    genuine_count: u64,
    forgery_count: u64,
    false_acceptance: u64,
    false_rejection: u64,
}

impl ThresholdBucket {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            genuine_count: 0,
            forgery_count: 0,
            false_acceptance: 0,
            false_rejection: 0,
        }
    }

    pub fn record(&mut self, expected: Origin, prediction: Score) {
        match expected {
            Origin::Genuine => {
                self.genuine_count += 1;
                if prediction.value() >= self.threshold {
                    self.false_rejection += 1;
                }
            }
            Origin::Forged => {
                self.forgery_count += 1;
                if prediction.value() < self.threshold {
                    self.false_acceptance += 1;
                }
            }
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn genuine_count(&self) -> u64 {
        self.genuine_count
    }

    pub fn forgery_count(&self) -> u64 {
        self.forgery_count
    }

    pub fn false_acceptance(&self) -> u64 {
        self.false_acceptance
    }

    pub fn false_rejection(&self) -> u64 {
        self.false_rejection
    }

    /// False acceptance rate, NaN when no forgeries were recorded.
    pub fn far(&self) -> f64 {
        self.false_acceptance as f64 / self.forgery_count as f64
    }

    /// False rejection rate, NaN when no genuine entries were recorded.
    pub fn frr(&self) -> f64 {
        self.false_rejection as f64 / self.genuine_count as f64
    }

    /// Average error rate, NaN when either class is empty.
    pub fn aer(&self) -> f64 {
        (self.far() + self.frr()) / 2.0
    }
}
