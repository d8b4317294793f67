// Training set: every pair once as-is (label 1) and once with a foreign utterance (label 0).

use indicatif::ProgressBar;
use log::info;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use crate::candidates::CandidatePool;
use crate::error::{preview, DatasetError, Result};
use crate::partition::Pool;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabeledRow {
    #[serde(rename = "Context")]
    pub context: String,
    #[serde(rename = "Utterance")]
    pub utterance: String,
    #[serde(rename = "Label")]
    pub label: u8,
}

/// Build the labeled training rows for `pool`.
///
/// Output holds `2 * pool.len()` rows: the correct pairs, then the incorrect
/// pairs, shuffled together once all of them exist. An incorrect pair keeps
/// the row's context and takes the utterance of a uniformly drawn row with a
/// different context. Fails with `EmptyCandidateSet`, naming the row's
/// position in the pair file, if some row has no such row in the pool.
pub fn make_train_set<R: Rng + ?Sized>(
    pool: &Pool,
    rng: &mut R,
    bar: &ProgressBar,
) -> Result<Vec<LabeledRow>> {
    let candidates = CandidatePool::new(&pool.rows);
    info!(
        "Sampling negatives for {} training rows ({} distinct contexts)",
        pool.len(),
        candidates.context_count()
    );

    let mut combined: Vec<LabeledRow> = pool
        .rows
        .iter()
        .map(|row| LabeledRow {
            context: row.context.clone(),
            utterance: row.utterance.clone(),
            label: 1,
        })
        .collect();
    combined.reserve(pool.len());

    for (i, row) in pool.rows.iter().enumerate() {
        let donor = candidates
            .draw_one(i, rng)
            .ok_or_else(|| DatasetError::EmptyCandidateSet {
                row: pool.origins[i],
                context: preview(&row.context),
            })?;
        combined.push(LabeledRow {
            context: row.context.clone(),
            utterance: donor.utterance.clone(),
            label: 0,
        });
        bar.inc(1);
    }
    bar.finish_and_clear();

    combined.shuffle(rng);
    Ok(combined)
}
