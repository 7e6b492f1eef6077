//! Training-partition class balancing.
//!
//! Every positive row is kept; negatives are downsampled without
//! replacement to a fixed multiple of the positive count and the combined
//! set is shuffled. Only the training partition is ever passed here.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::seq::index;

use sews_model::{Corpus, LabeledRow, ShortfallPolicy};

use crate::error::{PipelineError, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BalanceReport {
    pub positives: usize,
    pub negatives_available: usize,
    pub negatives_requested: usize,
    pub negatives_kept: usize,
    /// Fewer negatives existed than requested and all of them were kept.
    pub clamped: bool,
}

#[derive(Debug, Clone)]
pub struct BalancedSet {
    pub rows: Corpus,
    pub report: BalanceReport,
}

/// Keeps all positives plus `ratio * positives` sampled negatives.
///
/// Under [`ShortfallPolicy::Clamp`] a shortfall keeps every negative and
/// logs a warning; under [`ShortfallPolicy::Fail`] it is
/// [`PipelineError::InsufficientSamples`].
pub fn balance_training(
    training: &Corpus,
    ratio: usize,
    shortfall: ShortfallPolicy,
    seed: u64,
) -> Result<BalancedSet> {
    let (positives, negatives): (Vec<&LabeledRow>, Vec<&LabeledRow>) =
        training.rows().iter().partition(|row| row.is_positive());

    let requested = positives.len().saturating_mul(ratio);
    let available = negatives.len();
    let clamped = requested > available;
    if clamped {
        match shortfall {
            ShortfallPolicy::Fail => {
                return Err(PipelineError::InsufficientSamples {
                    requested,
                    available,
                });
            }
            ShortfallPolicy::Clamp => {
                tracing::warn!(
                    requested,
                    available,
                    "not enough negative rows; keeping all of them"
                );
            }
        }
    }
    let keep = requested.min(available);

    let mut rng = StdRng::seed_from_u64(seed);
    let mut rows: Vec<LabeledRow> = Vec::with_capacity(positives.len() + keep);
    rows.extend(positives.iter().map(|row| (*row).clone()));
    rows.extend(
        index::sample(&mut rng, available, keep)
            .into_iter()
            .map(|i| negatives[i].clone()),
    );
    rows.shuffle(&mut rng);

    let report = BalanceReport {
        positives: positives.len(),
        negatives_available: available,
        negatives_requested: requested,
        negatives_kept: keep,
        clamped,
    };
    Ok(BalancedSet {
        rows: Corpus::new(rows),
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sews_model::{FEATURE_COUNT, PatientId};

    fn corpus(positives: usize, negatives: usize) -> Corpus {
        let id = PatientId::new("P1").unwrap();
        (0..positives + negatives)
            .map(|hour| {
                let target = u8::from(hour < positives);
                LabeledRow::new(id.clone(), hour, [hour as f64; FEATURE_COUNT], target)
            })
            .collect()
    }

    #[test]
    fn downsamples_negatives_to_ratio() {
        let balanced = balance_training(&corpus(10, 100), 3, ShortfallPolicy::Clamp, 42).unwrap();
        let counts = balanced.rows.class_counts();
        assert_eq!(counts.positive, 10);
        assert_eq!(counts.negative, 30);
        assert!(!balanced.report.clamped);
        assert_eq!(balanced.report.negatives_requested, 30);
    }

    #[test]
    fn clamps_when_negatives_run_short() {
        let balanced = balance_training(&corpus(100, 50), 3, ShortfallPolicy::Clamp, 42).unwrap();
        let counts = balanced.rows.class_counts();
        assert_eq!(counts.positive, 100);
        assert_eq!(counts.negative, 50);
        assert!(balanced.report.clamped);
        assert_eq!(balanced.report.negatives_requested, 300);
    }

    #[test]
    fn fail_policy_reports_shortfall() {
        let err = balance_training(&corpus(100, 50), 3, ShortfallPolicy::Fail, 42).unwrap_err();
        match err {
            PipelineError::InsufficientSamples {
                requested,
                available,
            } => {
                assert_eq!(requested, 300);
                assert_eq!(available, 50);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn sampling_never_duplicates_rows() {
        let balanced = balance_training(&corpus(5, 40), 3, ShortfallPolicy::Clamp, 7).unwrap();
        let mut hours: Vec<usize> = balanced.rows.rows().iter().map(|row| row.hour).collect();
        hours.sort_unstable();
        hours.dedup();
        assert_eq!(hours.len(), 20);
    }

    #[test]
    fn output_is_shuffled_and_reproducible() {
        let a = balance_training(&corpus(20, 60), 3, ShortfallPolicy::Clamp, 42).unwrap();
        let b = balance_training(&corpus(20, 60), 3, ShortfallPolicy::Clamp, 42).unwrap();
        assert_eq!(a.rows, b.rows);
        let targets: Vec<u8> = a.rows.rows().iter().map(|row| row.target).collect();
        let mut sorted = targets.clone();
        sorted.sort_unstable_by(|x, y| y.cmp(x));
        assert_ne!(targets, sorted);
    }

    #[test]
    fn no_positives_keeps_nothing() {
        let balanced = balance_training(&corpus(0, 10), 3, ShortfallPolicy::Fail, 42).unwrap();
        assert!(balanced.rows.is_empty());
    }
}
