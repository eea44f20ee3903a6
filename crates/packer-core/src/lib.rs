//! Evolutionary two-dimensional bin packing.
//!
//! A fixed catalog of items (rectangles, circles and right triangles, each
//! with a bounding box, an optional price and a rotation permission) is
//! packed into a fixed catalog of rectangular bins. A genetic search over
//! packing orders and rotations drives a deterministic first-fit placer and
//! keeps the arrangement that leaves the least area and value unpacked.

pub mod config;
pub mod optimizer;
pub mod types;

pub use config::{FitnessPolicy, SearchConfig};
pub use optimizer::codec::{Codec, Genotype};
pub use optimizer::evolution::{
    Evaluator, Evolution, GenerationStats, GeneticOperators, Scored, StandardOperators,
};
pub use optimizer::fitness::{cost, score};
pub use optimizer::placement::{pack, pack_with_preset_rotations};
pub use optimizer::{tally_by_shape, Optimizer, SearchOutcome};
pub use types::*;
