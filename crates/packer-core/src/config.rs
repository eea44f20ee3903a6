use serde::{Deserialize, Serialize};

use crate::types::{PackerError, Result};

/// How a packing result is turned into a cost. Lower cost means higher fitness.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum FitnessPolicy {
    /// `unpacked_area + unpacked_value / value_divisor + wastage * wastage_weight`
    Weighted {
        #[serde(default = "default_value_divisor")]
        value_divisor: f64,
        #[serde(default = "default_wastage_weight")]
        wastage_weight: f64,
    },
    /// `wastage + unplaced_penalty * unplaced_items`
    WastagePenalty {
        #[serde(default = "default_unplaced_penalty")]
        unplaced_penalty: f64,
    },
}

fn default_value_divisor() -> f64 {
    10.0
}

fn default_wastage_weight() -> f64 {
    0.01
}

fn default_unplaced_penalty() -> f64 {
    1000.0
}

impl Default for FitnessPolicy {
    fn default() -> Self {
        FitnessPolicy::Weighted {
            value_divisor: default_value_divisor(),
            wastage_weight: default_wastage_weight(),
        }
    }
}

/// Knobs of the evolutionary search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Number of genotypes per generation
    pub population_size: usize,
    /// Generation budget
    pub generations: u32,
    /// Individuals sampled per tournament; smaller keeps more diversity
    pub tournament_size: usize,
    /// Probability that two parents are recombined instead of copied
    pub crossover_rate: f64,
    /// Probability that an offspring is mutated
    pub mutation_rate: f64,
    /// Seed for the PRNG. If undefined, the search is seeded from OS entropy
    pub seed: Option<u64>,
    /// Log population statistics every this many generations (0 disables)
    pub log_interval: u32,
    pub fitness: FitnessPolicy,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            population_size: 300,
            generations: 100,
            tournament_size: 3,
            crossover_rate: 0.7,
            mutation_rate: 0.3,
            seed: None,
            log_interval: 10,
            fitness: FitnessPolicy::default(),
        }
    }
}

impl SearchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population_size = size;
        self
    }

    pub fn with_generations(mut self, generations: u32) -> Self {
        self.generations = generations;
        self
    }

    pub fn with_tournament_size(mut self, size: usize) -> Self {
        self.tournament_size = size;
        self
    }

    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate;
        self
    }

    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_fitness(mut self, fitness: FitnessPolicy) -> Self {
        self.fitness = fitness;
        self
    }

    /// Rejects knob values the driver cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.population_size < 2 {
            return Err(PackerError::InvalidInput(format!(
                "Population size must be at least 2, got {}",
                self.population_size
            )));
        }

        if self.tournament_size == 0 {
            return Err(PackerError::InvalidInput(
                "Tournament size must be at least 1".to_string(),
            ));
        }

        for (name, rate) in [
            ("Crossover", self.crossover_rate),
            ("Mutation", self.mutation_rate),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(PackerError::InvalidInput(format!(
                    "{name} rate must lie in [0, 1], got {rate}"
                )));
            }
        }

        match self.fitness {
            FitnessPolicy::Weighted {
                value_divisor,
                wastage_weight,
            } => {
                if value_divisor <= 0.0 || !value_divisor.is_finite() {
                    return Err(PackerError::InvalidInput(format!(
                        "Value divisor must be positive, got {value_divisor}"
                    )));
                }
                if wastage_weight < 0.0 || !wastage_weight.is_finite() {
                    return Err(PackerError::InvalidInput(format!(
                        "Wastage weight must be non-negative, got {wastage_weight}"
                    )));
                }
            }
            FitnessPolicy::WastagePenalty { unplaced_penalty } => {
                if unplaced_penalty < 0.0 || !unplaced_penalty.is_finite() {
                    return Err(PackerError::InvalidInput(format!(
                        "Unplaced penalty must be non-negative, got {unplaced_penalty}"
                    )));
                }
            }
        }

        Ok(())
    }
}
