//! Heritable trait tags

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::core::config::SimConfig;
use crate::core::random::RandomSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Gene {
    /// Moves two cells per step
    Agile,
    /// Halves old-age decline
    Longevity,
    /// Halves sickness damage
    Resistant,
    /// Extra fight damage
    Strong,
    /// Extra research output
    Clever,
}

impl Gene {
    pub const ALL: [Gene; 5] = [Gene::Agile, Gene::Longevity, Gene::Resistant, Gene::Strong, Gene::Clever];
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Genome {
    genes: BTreeSet<Gene>,
}

impl Genome {
    pub fn new(genes: impl IntoIterator<Item = Gene>) -> Self {
        Self { genes: genes.into_iter().collect() }
    }

    pub fn has(&self, gene: Gene) -> bool {
        self.genes.contains(&gene)
    }

    pub fn insert(&mut self, gene: Gene) {
        self.genes.insert(gene);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Gene> {
        self.genes.iter()
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    /// Child genome: union of both parents, each gene kept with
    /// `gene_keep_chance`, then possibly one random mutation.
    pub fn inherit(a: &Genome, b: &Genome, rng: &mut dyn RandomSource, config: &SimConfig) -> Genome {
        let pool: BTreeSet<Gene> = a.genes.union(&b.genes).copied().collect();
        let mut child: BTreeSet<Gene> = pool
            .into_iter()
            .filter(|_| rng.chance(config.gene_keep_chance))
            .collect();

        if rng.chance(config.gene_mutation_chance) {
            child.insert(Gene::ALL[rng.below(Gene::ALL.len())]);
        }

        Genome { genes: child }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::random::ScriptedRandom;

    #[test]
    fn test_inherit_keeps_only_parent_genes_without_mutation() {
        let config = SimConfig::default();
        let a = Genome::new([Gene::Agile, Gene::Strong]);
        let b = Genome::new([Gene::Strong, Gene::Clever]);
        // union = {Agile, Strong, Clever}; keep, drop, keep; no mutation
        let mut rng = ScriptedRandom::new([0.1, 0.9, 0.2, 0.99]);
        let child = Genome::inherit(&a, &b, &mut rng, &config);
        assert_eq!(child, Genome::new([Gene::Agile, Gene::Clever]));
    }

    #[test]
    fn test_inherit_can_mutate() {
        let config = SimConfig::default();
        let a = Genome::default();
        let b = Genome::default();
        // empty pool, mutation roll passes, index 0.5 * 5 = 2 -> Resistant
        let mut rng = ScriptedRandom::new([0.0, 0.5]);
        let child = Genome::inherit(&a, &b, &mut rng, &config);
        assert!(child.has(Gene::Resistant));
        assert_eq!(child.len(), 1);
    }
}
