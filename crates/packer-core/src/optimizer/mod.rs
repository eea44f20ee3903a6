use crate::config::SearchConfig;
use crate::types::*;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

pub mod codec;
pub mod evolution;
pub mod fitness;
pub mod placement;
mod summary;
#[cfg(test)]
mod tests;

use codec::{Codec, Genotype};
use evolution::{Evaluator, Evolution, GenerationStats, GeneticOperators, StandardOperators};

pub use summary::tally_by_shape;

/// Searches for the packing order and rotations that minimize leftover
/// value and wasted bin space.
pub struct Optimizer {
    items: Vec<Item>,
    bins: Vec<Bin>,
    config: SearchConfig,
    cancelled: Arc<AtomicBool>,
}

/// Everything a finished search reports.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// Packing of the best individual ever seen
    pub result: PackingResult,
    pub best_fitness: f64,
    /// Generations bred after the initial population
    pub generations: u32,
    /// Whether the run stopped early on request
    pub cancelled: bool,
    /// Statistics of the initial population followed by one entry per generation
    pub history: Vec<GenerationStats>,
}

impl Optimizer {
    /// Validates the catalogs and configuration and builds a new optimizer.
    pub fn new(items: Vec<Item>, bins: Vec<Bin>, config: SearchConfig) -> Result<Self> {
        config.validate()?;
        validate_bins(&bins)?;
        validate_items(&items, &bins)?;

        Ok(Self {
            items,
            bins,
            config,
            cancelled: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Expands catalog quantities into individual items and builds an optimizer.
    pub fn from_request(request: PackingRequest) -> Result<Self> {
        let items = expand_items(&request.items)?;
        Self::new(items, request.bins, request.search)
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn bins(&self) -> &[Bin] {
        &self.bins
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Returns a handle that stops the search after the current generation.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        self.cancelled.clone()
    }

    /// Scores a single externally supplied genotype.
    pub fn evaluate(&self, genotype: &Genotype) -> Result<f64> {
        self.evaluator().evaluate(genotype)
    }

    /// Runs the search and returns the final packing.
    pub fn run(&self) -> PackingResult {
        self.search().result
    }

    /// Runs the search with the standard operators.
    pub fn search(&self) -> SearchOutcome {
        self.search_with(StandardOperators::new(self.config.tournament_size))
    }

    /// Runs the search with caller-supplied genetic operators.
    pub fn search_with<O: GeneticOperators>(&self, operators: O) -> SearchOutcome {
        let evaluator = self.evaluator();

        if self.items.is_empty() {
            let result = PackingResult::empty(&self.bins);
            let best_fitness = fitness::score(&result, &self.config.fitness);
            info!("No items to pack");
            return SearchOutcome {
                result,
                best_fitness,
                generations: 0,
                cancelled: false,
                history: Vec::new(),
            };
        }

        info!(
            items = self.items.len(),
            bins = self.bins.len(),
            population = self.config.population_size,
            generations = self.config.generations,
            "Starting evolutionary search"
        );

        let rng = match self.config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };

        let mut evolution = Evolution::new(evaluator, operators, self.config, rng);
        let mut history = vec![evolution.stats()];
        let mut cancelled = false;

        while !evolution.is_finished() {
            if self.cancelled.load(Ordering::Relaxed) {
                warn!(
                    generation = evolution.generation(),
                    "Search cancelled before the generation budget was spent"
                );
                cancelled = true;
                break;
            }

            evolution.step();
            let stats = evolution.stats();

            let interval = self.config.log_interval;
            if interval > 0 && stats.generation % interval == 0 {
                info!(
                    "Generation {}: best = {:.6} | worst = {:.6} | avg = {:.6}",
                    stats.generation, stats.best, stats.worst, stats.average
                );
            }

            history.push(stats);
        }

        let generations = evolution.generation();
        let best = evolution.into_best();
        let result = evaluator.pack_checked(&best.genotype);

        info!(
            fitness = best.fitness,
            placed = result.placed_count(),
            unplaced = result.unplaced.len(),
            "Search finished"
        );

        SearchOutcome {
            result,
            best_fitness: best.fitness,
            generations,
            cancelled,
            history,
        }
    }

    fn evaluator(&self) -> Evaluator<'_> {
        Evaluator::new(Codec::new(&self.items), &self.bins, self.config.fitness)
    }
}

/// Duplicates catalog lines according to their requested quantity.
fn expand_items(specs: &[ItemSpec]) -> Result<Vec<Item>> {
    let mut expanded = Vec::new();
    for spec in specs {
        if spec.quantity == 0 {
            return Err(PackerError::InvalidInput(format!(
                "Item '{}' has zero quantity",
                spec.id
            )));
        }

        for i in 0..spec.quantity {
            expanded.push(Item {
                id: if spec.quantity > 1 {
                    format!("{}_{}", spec.id, i + 1)
                } else {
                    spec.id.clone()
                },
                shape: spec.shape,
                width: spec.width,
                height: spec.height,
                can_rotate: spec.can_rotate,
                price: spec.price,
                rotation: Rotation::Deg0,
            });
        }
    }
    Ok(expanded)
}

fn validate_bins(bins: &[Bin]) -> Result<()> {
    if bins.is_empty() {
        return Err(PackerError::NoBins);
    }

    let mut ids = HashSet::new();
    for bin in bins {
        if !ids.insert(bin.id) {
            return Err(PackerError::InvalidInput(format!(
                "Bin id {} is used more than once",
                bin.id
            )));
        }
    }

    Ok(())
}

fn validate_items(items: &[Item], bins: &[Bin]) -> Result<()> {
    let mut ids = HashSet::new();
    let usable: Vec<&Bin> = bins.iter().filter(|bin| bin.is_usable()).collect();

    for item in items {
        if !ids.insert(item.id.as_str()) {
            return Err(PackerError::InvalidInput(format!(
                "Item id '{}' is used more than once",
                item.id
            )));
        }

        if item.width == 0 || item.height == 0 {
            return Err(PackerError::InvalidInput(format!(
                "Item '{}' has a zero dimension",
                item.id
            )));
        }

        if !item.price.is_finite() || item.price < 0.0 {
            return Err(PackerError::InvalidInput(format!(
                "Item '{}' has invalid price {}",
                item.id, item.price
            )));
        }

        // Zero-area bins take nothing; with only those the run is degenerate, not invalid
        if !usable.is_empty() && usable.iter().all(|bin| is_oversized(item, bin)) {
            return Err(PackerError::OversizedItem {
                item: item.id.clone(),
                width: item.width,
                height: item.height,
            });
        }
    }

    Ok(())
}

/// Larger than the bin in both dimensions in every orientation the item may take.
fn is_oversized(item: &Item, bin: &Bin) -> bool {
    let larger = |w: u32, h: u32| w > bin.width && h > bin.height;
    larger(item.width, item.height) && (!item.can_rotate || larger(item.height, item.width))
}
