//! Preprocessing pipeline applied to traces before distance computation.
//!
//! Transforms are pure trace-to-trace rewrites. A [`ConditionalSequence`]
//! checks the signature's `preprocessed` flag so a pipeline is idempotent
//! even when signatures flow through several verifiers.

use tracing::debug;

use crate::signature::Signature;

/// A single in-place trace transform.
pub trait Transform: Send + Sync {
    /// Rewrite the coordinate/pressure channels of `signature`.
    fn apply(&self, signature: &mut Signature);

    /// Name used in diagnostics.
    fn name(&self) -> &'static str;
}

/// An ordered transform sequence that skips already-preprocessed traces.
pub struct ConditionalSequence {
    transforms: Vec<Box<dyn Transform>>,
}

impl ConditionalSequence {
    /// Build a sequence from explicit transforms.
    #[must_use]
    pub fn new(transforms: Vec<Box<dyn Transform>>) -> Self {
        Self { transforms }
    }

    /// The standard normalization used by all verifier strategies:
    /// scale each channel to unit range, then translate to its
    /// center of gravity.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(vec![Box::new(ScaleToUnit), Box::new(TranslateToCog)])
    }

    /// Run the sequence over `signature` unless it already ran.
    ///
    /// Sets the `preprocessed` flag afterwards, making repeated calls
    /// no-ops.
    pub fn run(&self, signature: &mut Signature) {
        if signature.preprocessed {
            debug!(id = %signature.id(), "skipping already-preprocessed trace");
            return;
        }
        for transform in &self.transforms {
            transform.apply(signature);
        }
        signature.preprocessed = true;
    }
}

fn for_each_channel(signature: &mut Signature, f: impl Fn(&mut Vec<f64>)) {
    f(&mut signature.x);
    f(&mut signature.y);
    if let Some(pressure) = signature.pressure.as_mut() {
        f(pressure);
    }
}

/// Scales every channel into `[0, 1]`.
///
/// A constant channel collapses to all zeros.
pub struct ScaleToUnit;

impl Transform for ScaleToUnit {
    fn apply(&self, signature: &mut Signature) {
        for_each_channel(signature, |channel| {
            let min = channel.iter().copied().fold(f64::INFINITY, f64::min);
            let max = channel.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let range = max - min;
            if range > 0.0 {
                for v in channel.iter_mut() {
                    *v = (*v - min) / range;
                }
            } else {
                channel.fill(0.0);
            }
        });
    }

    fn name(&self) -> &'static str {
        "scale_to_unit"
    }
}

/// Translates every channel so its mean becomes zero.
pub struct TranslateToCog;

impl Transform for TranslateToCog {
    fn apply(&self, signature: &mut Signature) {
        for_each_channel(signature, |channel| {
            let mean = channel.iter().sum::<f64>() / channel.len() as f64;
            for v in channel.iter_mut() {
                *v -= mean;
            }
        });
    }

    fn name(&self) -> &'static str {
        "translate_to_cog"
    }
}
