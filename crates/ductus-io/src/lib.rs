//! Input and output for signature verification runs.
//!
//! Covers trace loading from CSV files, comparison lists, persisted
//! neighborhoods and training statistics, and result writers for
//! predictions, comparison tables, benchmark curves and run summaries.

mod comparisons;
mod error;
mod neighborhood;
mod results;
mod stats_store;
mod trace;

pub use comparisons::ComparisonReader;
pub use error::IoError;
pub use neighborhood::{NeighborhoodStore, SignatureNeighborhood};
pub use results::{ResultWriter, RunName};
pub use stats_store::StatisticsStore;
pub use trace::TraceReader;
