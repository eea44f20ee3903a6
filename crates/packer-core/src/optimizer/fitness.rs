use crate::config::FitnessPolicy;
use crate::types::PackingResult;

/// Scalar cost of a packing result under the given policy. Never negative.
///
/// With the weighted policy, unplaced area dominates, unplaced value refines
/// it, and wastage only breaks ties between otherwise equal layouts.
pub fn cost(result: &PackingResult, policy: &FitnessPolicy) -> f64 {
    match *policy {
        FitnessPolicy::Weighted {
            value_divisor,
            wastage_weight,
        } => {
            result.unpacked_area()
                + result.unpacked_value() / value_divisor
                + result.wastage() * wastage_weight
        }
        FitnessPolicy::WastagePenalty { unplaced_penalty } => {
            result.wastage() + unplaced_penalty * result.unplaced.len() as f64
        }
    }
}

/// Fitness in (0, 1], higher is better.
pub fn score(result: &PackingResult, policy: &FitnessPolicy) -> f64 {
    1.0 / (1.0 + cost(result, policy))
}
