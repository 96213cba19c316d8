//! Signature verification: signer models and classifier strategies.
//!
//! Consumes elastic distances from `ductus-dtw` and turns reference
//! signatures into immutable [`SignerModel`]s that score questioned
//! signatures. Models are built once at training time and are safe to
//! share across concurrent test calls.

mod classifier;
mod error;
mod minmax;
mod model;
mod neighbors;
mod pipeline;
mod score;
mod signature;
mod single;
mod stats;

pub use classifier::Classifier;
pub use error::VerifyError;
pub use minmax::MinMaxClassifier;
pub use model::{SignerModel, ThresholdTriple};
pub use neighbors::NeighborsClassifier;
pub use pipeline::{ConditionalSequence, ScaleToUnit, Transform, TranslateToCog};
pub use score::Score;
pub use signature::{Channel, InputDevice, Origin, Signature, SignatureId, SignerId};
pub use single::SingleReferenceClassifier;
pub use stats::{
    StatisticsClassifier, StatisticsKey, StatisticsTable, TrainingStatistics,
};
