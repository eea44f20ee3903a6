//! Generational evolutionary search over packing orders and rotations.
//!
//! The run is an explicit state machine owned by one [`Evolution`]: a scored
//! population, a generation counter and the best individual seen so far.
//! [`Evolution::new`] creates and scores the initial population,
//! [`Evolution::step`] breeds and scores one generation, and
//! [`Evolution::into_best`] hands back the best-ever individual once the
//! population is no longer needed.

use rand::rngs::SmallRng;
use rand::seq::index;
use rand::Rng;
use rayon::prelude::*;

use super::codec::{Codec, Genotype};
use super::fitness;
use super::placement::pack_with_preset_rotations;
use crate::config::{FitnessPolicy, SearchConfig};
use crate::types::{Bin, PackingResult, Result};

/// A genotype together with its fitness.
#[derive(Debug, Clone, PartialEq)]
pub struct Scored {
    pub genotype: Genotype,
    pub fitness: f64,
}

/// Selection, recombination and mutation used to breed a generation.
pub trait GeneticOperators {
    /// Picks one parent from a fully scored population.
    fn select<'p, R: Rng>(&self, population: &'p [Scored], rng: &mut R) -> &'p Scored;

    /// Recombines two parents into one child. Must yield a valid permutation.
    fn crossover<R: Rng>(&self, first: &Genotype, second: &Genotype, rng: &mut R) -> Genotype;

    /// Perturbs a child in place. Must keep the permutation valid.
    fn mutate<R: Rng>(&self, genotype: &mut Genotype, rng: &mut R);
}

/// Tournament selection, order crossover and swap / rotation-resample mutation.
#[derive(Debug, Clone, Copy)]
pub struct StandardOperators {
    pub tournament_size: usize,
}

impl StandardOperators {
    pub fn new(tournament_size: usize) -> Self {
        Self { tournament_size }
    }

    /// Order crossover (OX) on the permutation: a slice of `first` is kept in
    /// place, the remaining positions are filled with the missing indices in
    /// the order they appear in `second`.
    fn order_crossover<R: Rng>(first: &[usize], second: &[usize], rng: &mut R) -> Vec<usize> {
        let n = first.len();
        if n < 2 {
            return first.to_vec();
        }

        let (mut p1, mut p2) = (rng.random_range(0..n), rng.random_range(0..n));
        if p1 > p2 {
            std::mem::swap(&mut p1, &mut p2);
        }

        let mut child = vec![usize::MAX; n];
        let mut used = vec![false; n];
        for i in p1..=p2 {
            child[i] = first[i];
            used[first[i]] = true;
        }

        let mut donors = (0..n)
            .map(|i| second[(p2 + 1 + i) % n])
            .filter(|gene| !used[*gene]);
        for i in 0..n {
            let idx = (p2 + 1 + i) % n;
            if child[idx] == usize::MAX {
                if let Some(gene) = donors.next() {
                    child[idx] = gene;
                }
            }
        }

        child
    }
}

impl GeneticOperators for StandardOperators {
    /// Samples `tournament_size` distinct contestants; ties go to the first one sampled.
    fn select<'p, R: Rng>(&self, population: &'p [Scored], rng: &mut R) -> &'p Scored {
        let k = self.tournament_size.clamp(1, population.len());
        let winner = index::sample(rng, population.len(), k)
            .iter()
            .reduce(|best, challenger| {
                if population[challenger].fitness > population[best].fitness {
                    challenger
                } else {
                    best
                }
            })
            .unwrap_or(0);

        &population[winner]
    }

    fn crossover<R: Rng>(&self, first: &Genotype, second: &Genotype, rng: &mut R) -> Genotype {
        let order = Self::order_crossover(&first.order, &second.order, rng);
        let rotations = first
            .rotations
            .iter()
            .zip(&second.rotations)
            .map(|(a, b)| if rng.random_bool(0.5) { *a } else { *b })
            .collect();

        Genotype { order, rotations }
    }

    fn mutate<R: Rng>(&self, genotype: &mut Genotype, rng: &mut R) {
        let n = genotype.len();
        if n == 0 {
            return;
        }

        if n >= 2 && rng.random_bool(0.5) {
            let i = rng.random_range(0..n);
            let j = (i + rng.random_range(1..n)) % n;
            genotype.order.swap(i, j);
        } else {
            let i = rng.random_range(0..n);
            genotype.rotations[i] = rng.random_range(0..4);
        }
    }
}

/// Decodes, packs and scores genotypes. Holds no mutable state, so one
/// evaluator is shared by every worker thread.
#[derive(Debug, Clone, Copy)]
pub struct Evaluator<'a> {
    codec: Codec<'a>,
    bins: &'a [Bin],
    policy: FitnessPolicy,
}

impl<'a> Evaluator<'a> {
    pub fn new(codec: Codec<'a>, bins: &'a [Bin], policy: FitnessPolicy) -> Self {
        Self {
            codec,
            bins,
            policy,
        }
    }

    pub fn codec(&self) -> &Codec<'a> {
        &self.codec
    }

    /// Checks a genotype against the catalog and packs its phenotype.
    pub fn pack(&self, genotype: &Genotype) -> Result<PackingResult> {
        genotype.check(self.codec.items().len())?;
        Ok(self.pack_checked(genotype))
    }

    /// Checks a genotype against the catalog and scores it.
    pub fn evaluate(&self, genotype: &Genotype) -> Result<f64> {
        genotype.check(self.codec.items().len())?;
        Ok(self.score_checked(genotype))
    }

    /// Packs a genotype already known to be valid for this catalog.
    pub(crate) fn pack_checked(&self, genotype: &Genotype) -> PackingResult {
        pack_with_preset_rotations(&self.codec.decode_checked(genotype), self.bins)
    }

    fn score_checked(&self, genotype: &Genotype) -> f64 {
        fitness::score(&self.pack_checked(genotype), &self.policy)
    }

    /// Scores a whole generation of valid genotypes in parallel; output order
    /// matches input order.
    pub(crate) fn evaluate_all(&self, genotypes: Vec<Genotype>) -> Vec<Scored> {
        genotypes
            .into_par_iter()
            .map(|genotype| Scored {
                fitness: self.score_checked(&genotype),
                genotype,
            })
            .collect()
    }
}

/// Fitness distribution of one generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationStats {
    pub generation: u32,
    pub best: f64,
    pub worst: f64,
    pub average: f64,
    /// Best fitness seen in this or any earlier generation
    pub best_ever: f64,
}

/// State of one evolutionary run.
pub struct Evolution<'a, O: GeneticOperators> {
    evaluator: Evaluator<'a>,
    operators: O,
    config: SearchConfig,
    rng: SmallRng,
    population: Vec<Scored>,
    generation: u32,
    best: Scored,
}

impl<'a, O: GeneticOperators> Evolution<'a, O> {
    /// Generates and scores `population_size` random genotypes.
    pub fn new(evaluator: Evaluator<'a>, operators: O, config: SearchConfig, mut rng: SmallRng) -> Self {
        let size = config.population_size.max(1);
        let genotypes = (0..size)
            .map(|_| evaluator.codec().random_genotype(&mut rng))
            .collect();
        let population = evaluator.evaluate_all(genotypes);
        let best = fittest(&population).clone();

        Self {
            evaluator,
            operators,
            config,
            rng,
            population,
            generation: 0,
            best,
        }
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn population(&self) -> &[Scored] {
        &self.population
    }

    /// Best individual seen since the run started.
    pub fn best(&self) -> &Scored {
        &self.best
    }

    pub fn is_finished(&self) -> bool {
        self.generation >= self.config.generations
    }

    /// Breeds, scores and installs the next generation. The best-ever
    /// individual is carried over unchanged.
    pub fn step(&mut self) {
        let size = self.population.len();
        let item_count = self.evaluator.codec().items().len();
        let mut offspring = Vec::with_capacity(size.saturating_sub(1));

        while offspring.len() + 1 < size {
            let first = self.operators.select(&self.population, &mut self.rng);
            let second = self.operators.select(&self.population, &mut self.rng);

            let mut child = if self.rng.random_bool(self.config.crossover_rate) {
                self.operators
                    .crossover(&first.genotype, &second.genotype, &mut self.rng)
            } else {
                first.genotype.clone()
            };

            if self.rng.random_bool(self.config.mutation_rate) {
                self.operators.mutate(&mut child, &mut self.rng);
            }

            // Custom operators may break the permutation
            if let Err(err) = child.check(item_count) {
                tracing::warn!(
                    generation = self.generation + 1,
                    %err,
                    "discarding malformed offspring"
                );
                child = first.genotype.clone();
            }

            offspring.push(child);
        }

        let mut next = Vec::with_capacity(size);
        next.push(self.best.clone());
        next.extend(self.evaluator.evaluate_all(offspring));
        self.population = next;
        self.generation += 1;

        let challenger = fittest(&self.population);
        if challenger.fitness > self.best.fitness {
            tracing::debug!(
                generation = self.generation,
                fitness = challenger.fitness,
                "new best individual"
            );
            self.best = challenger.clone();
        }
    }

    pub fn stats(&self) -> GenerationStats {
        let fitnesses = self.population.iter().map(|s| s.fitness);
        let best = fitnesses.clone().fold(f64::NEG_INFINITY, f64::max);
        let worst = fitnesses.clone().fold(f64::INFINITY, f64::min);
        let average = fitnesses.sum::<f64>() / self.population.len().max(1) as f64;

        GenerationStats {
            generation: self.generation,
            best,
            worst,
            average,
            best_ever: self.best.fitness,
        }
    }

    /// Ends the run, dropping the population.
    pub fn into_best(self) -> Scored {
        self.best
    }
}

/// The population is never empty; ties go to the earliest individual.
fn fittest(population: &[Scored]) -> &Scored {
    let mut best = &population[0];
    for candidate in &population[1..] {
        if candidate.fitness > best.fitness {
            best = candidate;
        }
    }
    best
}
