use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::{HashMap, HashSet};

use crate::types::*;

/// Search-space encoding of one candidate.
///
/// `order` is a permutation of item indices giving the packing order.
/// `rotations[i]` is the rotation gene of the item packed at position `i`;
/// any value is accepted and reduced modulo four quarter turns.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Genotype {
    pub(crate) order: Vec<usize>,
    pub(crate) rotations: Vec<usize>,
}

impl Genotype {
    /// Builds a genotype, rejecting anything that is not a permutation.
    pub fn new(order: Vec<usize>, rotations: Vec<usize>) -> Result<Self> {
        let genotype = Self { order, rotations };
        genotype.check(genotype.order.len())?;
        Ok(genotype)
    }

    /// Splits the flat form: N order genes followed by N rotation genes.
    pub fn from_genes(genes: &[usize]) -> Result<Self> {
        if genes.len() % 2 != 0 {
            return Err(PackerError::MalformedGenotype(format!(
                "expected an even number of genes, got {}",
                genes.len()
            )));
        }

        let (order, rotations) = genes.split_at(genes.len() / 2);
        Self::new(order.to_vec(), rotations.to_vec())
    }

    /// Uniformly random permutation with uniformly random rotation genes.
    pub fn random<R: Rng + ?Sized>(len: usize, rng: &mut R) -> Self {
        let mut order: Vec<usize> = (0..len).collect();
        order.shuffle(rng);

        let rotations = (0..len).map(|_| rng.random_range(0..4)).collect();

        Self { order, rotations }
    }

    pub fn order(&self) -> &[usize] {
        &self.order
    }

    pub fn rotations(&self) -> &[usize] {
        &self.rotations
    }

    /// The flat form accepted by [`Genotype::from_genes`].
    pub fn genes(&self) -> Vec<usize> {
        self.order.iter().chain(&self.rotations).copied().collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Verifies that this is a valid encoding for `item_count` items.
    pub fn check(&self, item_count: usize) -> Result<()> {
        if self.order.len() != item_count || self.rotations.len() != item_count {
            return Err(PackerError::MalformedGenotype(format!(
                "expected {} order and rotation genes, got {} and {}",
                item_count,
                self.order.len(),
                self.rotations.len()
            )));
        }

        let mut seen = vec![false; item_count];
        for &index in &self.order {
            if index >= item_count {
                return Err(PackerError::MalformedGenotype(format!(
                    "item index {index} out of range for {item_count} items"
                )));
            }
            if seen[index] {
                return Err(PackerError::MalformedGenotype(format!(
                    "item index {index} appears more than once"
                )));
            }
            seen[index] = true;
        }

        Ok(())
    }
}

/// Maps genotypes to the oriented item sequence the placer consumes, and back.
#[derive(Debug, Clone, Copy)]
pub struct Codec<'a> {
    items: &'a [Item],
}

impl<'a> Codec<'a> {
    pub fn new(items: &'a [Item]) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &'a [Item] {
        self.items
    }

    pub fn random_genotype<R: Rng + ?Sized>(&self, rng: &mut R) -> Genotype {
        Genotype::random(self.items.len(), rng)
    }

    /// Decodes a genotype after checking it. Invalid encodings are rejected,
    /// never repaired.
    pub fn decode(&self, genotype: &Genotype) -> Result<Vec<Item>> {
        genotype.check(self.items.len())?;
        Ok(self.decode_checked(genotype))
    }

    /// Decodes a genotype already known to be valid for this catalog.
    /// Items that may not rotate always come out at 0 degrees.
    pub(crate) fn decode_checked(&self, genotype: &Genotype) -> Vec<Item> {
        genotype
            .order
            .iter()
            .zip(&genotype.rotations)
            .map(|(&index, &gene)| {
                let item = &self.items[index];
                let rotation = if item.can_rotate {
                    Rotation::from_gene(gene)
                } else {
                    Rotation::Deg0
                };
                item.with_rotation(rotation)
            })
            .collect()
    }

    /// Encodes an oriented sequence of catalog items, matched by id.
    pub fn encode(&self, sequence: &[Item]) -> Result<Genotype> {
        let index_by_id: HashMap<&str, usize> = self
            .items
            .iter()
            .enumerate()
            .map(|(idx, item)| (item.id.as_str(), idx))
            .collect();

        let mut order = Vec::with_capacity(sequence.len());
        let mut rotations = Vec::with_capacity(sequence.len());
        let mut seen = HashSet::new();

        for item in sequence {
            let index = *index_by_id.get(item.id.as_str()).ok_or_else(|| {
                PackerError::MalformedGenotype(format!("unknown item '{}'", item.id))
            })?;
            if !seen.insert(index) {
                return Err(PackerError::MalformedGenotype(format!(
                    "item '{}' appears more than once",
                    item.id
                )));
            }
            order.push(index);
            rotations.push(item.rotation.quarter_turns());
        }

        let genotype = Genotype { order, rotations };
        genotype.check(self.items.len())?;
        Ok(genotype)
    }
}
