//! Patient-level train/holdout partitioning.
//!
//! Identifiers are partitioned first and rows follow their patient, so no
//! patient's hours can appear on both sides.

use std::collections::BTreeSet;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use sews_model::{Corpus, PatientId, PipelineOptions};

use crate::error::{PipelineError, Result};

/// Disjoint train and test identifier sets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatientSplit {
    pub train: BTreeSet<PatientId>,
    pub test: BTreeSet<PatientId>,
}

/// Number of holdout patients for `patients` identifiers.
fn holdout_size(patients: usize, fraction: f64) -> usize {
    if patients < 2 {
        return 0;
    }
    let wanted = (patients as f64 * fraction).ceil() as usize;
    wanted.clamp(1, patients - 1)
}

/// Randomly partitions `patients` with a fixed seed.
///
/// The identifiers are visited in sorted order before shuffling, so the
/// result depends only on the identifier set, the fraction and the seed.
pub fn split_patients(
    patients: &BTreeSet<PatientId>,
    test_fraction: f64,
    seed: u64,
) -> Result<PatientSplit> {
    if patients.is_empty() {
        return Err(PipelineError::NoPatients);
    }

    let mut order: Vec<&PatientId> = patients.iter().collect();
    let mut rng = StdRng::seed_from_u64(seed);
    order.shuffle(&mut rng);

    let test_count = holdout_size(order.len(), test_fraction);
    let (test, train) = order.split_at(test_count);
    Ok(PatientSplit {
        train: train.iter().map(|id| (*id).clone()).collect(),
        test: test.iter().map(|id| (*id).clone()).collect(),
    })
}

/// A corpus materialized on both sides of a patient split.
#[derive(Debug, Clone)]
pub struct SplitCorpus {
    pub split: PatientSplit,
    pub training: Corpus,
    pub holdout: Corpus,
}

pub fn split_corpus(corpus: &Corpus, options: &PipelineOptions) -> Result<SplitCorpus> {
    let split = split_patients(&corpus.patients(), options.test_fraction, options.seed)?;
    let training = corpus.select_patients(&split.train);
    let holdout = corpus.select_patients(&split.test);
    tracing::debug!(
        train_patients = split.train.len(),
        test_patients = split.test.len(),
        train_rows = training.len(),
        test_rows = holdout.len(),
        "split corpus by patient"
    );
    Ok(SplitCorpus {
        split,
        training,
        holdout,
    })
}
