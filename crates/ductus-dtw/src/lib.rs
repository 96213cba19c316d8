//! Multivariate elastic distance computation.
//!
//! Pure math library with zero I/O. Provides dynamic time warping distance
//! between variable-length multichannel feature sequences, pairwise
//! distance matrices, and nearest-neighbor selection over a matrix.

mod dtw;
mod error;
mod matrix;
mod neighbors;
mod pair;
mod series;

pub use dtw::{Dtw, StepCost};
pub use error::DtwError;
pub use matrix::DistanceMatrix;
pub use neighbors::{Neighbor, Neighborhood, nearest_neighbors};
pub use pair::PairDistance;
pub use series::{FeatureMatrix, FeatureMatrixView};
