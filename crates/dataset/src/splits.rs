//! Shuffling and two-stage train/validation/test partitioning.

use crate::types::ImageRecord;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Fraction held out of training by the first split.
pub const DEFAULT_TEST_FRACTION: f64 = 0.3;
/// Fraction held out by the second split of the held-out pool, matching the
/// upstream trainer's default.
pub const DEFAULT_RESPLIT_FRACTION: f64 = 0.1;

/// The three disjoint partitions of a shuffled dataset.
#[derive(Debug, Clone, Default)]
pub struct DatasetSplits {
    pub train: Vec<ImageRecord>,
    pub validation: Vec<ImageRecord>,
    pub test: Vec<ImageRecord>,
}

impl DatasetSplits {
    pub fn total(&self) -> usize {
        self.train.len() + self.validation.len() + self.test.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Shuffle records in place with a seeded or OS-seeded RNG.
pub fn shuffle_records(records: &mut [ImageRecord], seed: Option<u64>) {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    };
    records.shuffle(&mut rng);
}

/// Split off `round(len * fraction)` records from the tail as the held-out
/// set. Call after shuffling; the order is preserved within each half.
pub fn split_once(mut records: Vec<ImageRecord>, fraction: f64) -> (Vec<ImageRecord>, Vec<ImageRecord>) {
    let held = ((records.len() as f64) * fraction).round() as usize;
    let split_at = records.len() - held.min(records.len());
    let held_out = records.split_off(split_at);
    (records, held_out)
}

/// Two-stage partition: `test_fraction` is held out first, then the held-out
/// pool is split again with [`DEFAULT_RESPLIT_FRACTION`]. Validation and test
/// are therefore both carved from the same pool, and the final test set is a
/// much smaller fraction than `test_fraction` suggests.
pub fn partition(records: Vec<ImageRecord>, test_fraction: f64) -> DatasetSplits {
    let (train, pool) = split_once(records, test_fraction);
    let (validation, test) = split_once(pool, DEFAULT_RESPLIT_FRACTION);
    DatasetSplits {
        train,
        validation,
        test,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::path::PathBuf;

    fn records(n: usize) -> Vec<ImageRecord> {
        (0..n)
            .map(|i| ImageRecord {
                path: PathBuf::from(format!("img_{i:03}.jpg")),
                label: if i % 2 == 0 { "cat" } else { "dog" }.to_string(),
            })
            .collect()
    }

    #[test]
    fn shuffle_with_seed_is_reproducible() {
        let mut a = records(10);
        let mut b = records(10);
        shuffle_records(&mut a, Some(42));
        shuffle_records(&mut b, Some(42));
        assert_eq!(a, b);

        let sorted: HashSet<_> = records(10).into_iter().map(|r| r.path).collect();
        let shuffled: HashSet<_> = a.into_iter().map(|r| r.path).collect();
        assert_eq!(sorted, shuffled);
    }

    #[test]
    fn split_once_rounds_held_out_count() {
        let (kept, held) = split_once(records(20), 0.3);
        assert_eq!(kept.len(), 14);
        assert_eq!(held.len(), 6);

        let (kept, held) = split_once(records(0), 0.3);
        assert!(kept.is_empty());
        assert!(held.is_empty());
    }

    #[test]
    fn partition_is_disjoint_and_exhaustive() {
        let splits = partition(records(20), DEFAULT_TEST_FRACTION);
        assert_eq!(splits.train.len(), 14);
        assert_eq!(splits.validation.len(), 5);
        assert_eq!(splits.test.len(), 1);

        let mut seen = HashSet::new();
        for rec in splits
            .train
            .iter()
            .chain(&splits.validation)
            .chain(&splits.test)
        {
            assert!(seen.insert(rec.path.clone()), "duplicate {:?}", rec.path);
        }
        assert_eq!(seen.len(), 20);
    }

    #[test]
    fn tiny_datasets_partition_without_panicking() {
        let splits = partition(records(2), DEFAULT_TEST_FRACTION);
        assert_eq!(splits.total(), 2);
        assert_eq!(splits.train.len(), 1);
    }
}
