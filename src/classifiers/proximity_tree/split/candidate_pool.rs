use rand::Rng;
use std::cmp::Ordering;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy)]
struct ScoreKey(f64);

impl PartialEq for ScoreKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ScoreKey {}

impl PartialOrd for ScoreKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScoreKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Candidates keyed by score, highest first; equal scores pop in random order.
#[derive(Debug, Clone, Default)]
pub struct CandidatePool {
    entries: BTreeMap<ScoreKey, Vec<usize>>,
    len: usize,
}

impl CandidatePool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn insert(&mut self, candidate: usize, score: f64) {
        self.entries.entry(ScoreKey(score)).or_default().push(candidate);
        self.len += 1;
    }

    /// Removes a uniformly random candidate among those with the top score.
    pub fn pop_best<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<(usize, f64)> {
        let mut top = self.entries.last_entry()?;
        let score = top.key().0;
        let bucket = top.get_mut();
        let candidate = bucket.swap_remove(rng.random_range(0..bucket.len()));
        if bucket.is_empty() {
            top.remove();
        }
        self.len -= 1;
        Some((candidate, score))
    }

    /// Keeps only the candidates for which `keep(candidate, score)` holds and
    /// returns the ones dropped.
    pub fn retain<F>(&mut self, mut keep: F) -> Vec<usize>
    where
        F: FnMut(usize, f64) -> bool,
    {
        let mut dropped = Vec::new();
        self.entries.retain(|key, bucket| {
            bucket.retain(|&c| {
                let kept = keep(c, key.0);
                if !kept {
                    dropped.push(c);
                }
                kept
            });
            !bucket.is_empty()
        });
        self.len -= dropped.len();
        dropped
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.entries
            .iter()
            .flat_map(|(key, bucket)| bucket.iter().map(move |&c| (c, key.0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn pops_highest_score_first() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut pool = CandidatePool::new();
        pool.insert(0, 0.1);
        pool.insert(1, 0.7);
        pool.insert(2, -0.3);
        assert_eq!(pool.pop_best(&mut rng), Some((1, 0.7)));
        assert_eq!(pool.pop_best(&mut rng), Some((0, 0.1)));
        assert_eq!(pool.pop_best(&mut rng), Some((2, -0.3)));
        assert_eq!(pool.pop_best(&mut rng), None);
        assert!(pool.is_empty());
    }

    #[test]
    fn ties_pop_in_random_order() {
        let mut firsts = [0usize; 3];
        for seed in 0..60 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut pool = CandidatePool::new();
            for c in 0..3 {
                pool.insert(c, 0.5);
            }
            let (first, _) = pool.pop_best(&mut rng).unwrap();
            firsts[first] += 1;
        }
        assert!(firsts.iter().all(|&n| n > 0));
    }

    #[test]
    fn retain_reports_dropped_candidates() {
        let mut pool = CandidatePool::new();
        pool.insert(0, 0.2);
        pool.insert(1, 0.4);
        pool.insert(2, 0.9);
        let mut dropped = pool.retain(|_, score| score > 0.3);
        dropped.sort_unstable();
        assert_eq!(dropped, vec![0]);
        assert_eq!(pool.len(), 2);
        let mut left: Vec<usize> = pool.iter().map(|(c, _)| c).collect();
        left.sort_unstable();
        assert_eq!(left, vec![1, 2]);
    }
}
