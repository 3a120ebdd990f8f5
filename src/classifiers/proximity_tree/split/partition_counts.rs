use crate::error::TreeError;
use rand::Rng;
use rand::seq::SliceRandom;
use std::cmp::Reverse;
use std::collections::BTreeMap;

/// How often instances of one class have been routed to each partition.
///
/// `order` yields partitions by descending count; partitions with equal counts
/// sit in random order.
#[derive(Debug, Clone)]
pub struct PartitionCounts {
    counts: Vec<usize>,
    by_count: BTreeMap<Reverse<usize>, Vec<usize>>,
}

impl PartitionCounts {
    pub fn new<R: Rng + ?Sized>(num_partitions: usize, rng: &mut R) -> Self {
        let mut order: Vec<usize> = (0..num_partitions).collect();
        order.shuffle(rng);
        let mut by_count = BTreeMap::new();
        if !order.is_empty() {
            by_count.insert(Reverse(0), order);
        }
        Self {
            counts: vec![0; num_partitions],
            by_count,
        }
    }

    pub fn count(&self, partition: usize) -> Option<usize> {
        self.counts.get(partition).copied()
    }

    pub fn order(&self) -> Vec<usize> {
        self.by_count.values().flatten().copied().collect()
    }

    pub fn increment<R: Rng + ?Sized>(
        &mut self,
        partition: usize,
        rng: &mut R,
    ) -> Result<(), TreeError> {
        let old = self.count(partition).ok_or_else(|| {
            TreeError::Invariant(format!("partition {partition} has no count entry"))
        })?;
        let bucket = self.by_count.get_mut(&Reverse(old)).ok_or_else(|| {
            TreeError::Invariant(format!("no partitions recorded with count {old}"))
        })?;
        let position = bucket.iter().position(|&p| p == partition).ok_or_else(|| {
            TreeError::Invariant(format!(
                "partition {partition} missing from the count {old} bucket"
            ))
        })?;
        bucket.remove(position);
        if bucket.is_empty() {
            self.by_count.remove(&Reverse(old));
        }

        self.counts[partition] = old + 1;
        let bucket = self.by_count.entry(Reverse(old + 1)).or_default();
        let at = rng.random_range(0..=bucket.len());
        bucket.insert(at, partition);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn initial_order_is_a_permutation() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let counts = PartitionCounts::new(5, &mut rng);
        let mut order = counts.order();
        order.sort_unstable();
        assert_eq!(order, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn most_popular_partition_comes_first() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut counts = PartitionCounts::new(4, &mut rng);
        counts.increment(2, &mut rng).unwrap();
        counts.increment(2, &mut rng).unwrap();
        counts.increment(1, &mut rng).unwrap();
        let order = counts.order();
        assert_eq!(&order[..2], &[2, 1]);
        assert_eq!(counts.count(2), Some(2));
        assert_eq!(counts.count(0), Some(0));
    }

    #[test]
    fn unknown_partition_is_an_invariant_error() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut counts = PartitionCounts::new(2, &mut rng);
        assert!(matches!(
            counts.increment(9, &mut rng),
            Err(TreeError::Invariant(_))
        ));
    }
}
