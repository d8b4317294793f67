// Test / validation sets: each pair plus N utterances taken from rows of other contexts.

use indicatif::ProgressBar;
use log::info;
use rand::Rng;

use crate::candidates::CandidatePool;
use crate::error::{preview, DatasetError, Result};
use crate::partition::Pool;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalRow {
    pub context: String,
    pub utterance: String,
    pub distractors: Vec<String>,
}

impl EvalRow {
    /// Fields in column order: context, utterance, distractor_0..n-1.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        [self.context.as_str(), self.utterance.as_str()]
            .into_iter()
            .chain(self.distractors.iter().map(String::as_str))
    }
}

/// Build one evaluation row per pool row, in pool order.
///
/// Distractors are `num_distractors` distinct rows with a context different
/// from the row's own, drawn uniformly without replacement and kept in draw
/// order. Used for both the test and the validation pool. A row with too few
/// such rows fails with `InsufficientCandidates` naming its pair-file row.
pub fn make_eval_set<R: Rng + ?Sized>(
    pool: &Pool,
    num_distractors: usize,
    rng: &mut R,
    bar: &ProgressBar,
) -> Result<Vec<EvalRow>> {
    let candidates = CandidatePool::new(&pool.rows);
    info!(
        "Sampling {} distractors for {} rows ({} distinct contexts)",
        num_distractors,
        pool.len(),
        candidates.context_count()
    );

    let mut out = Vec::with_capacity(pool.len());
    for (i, row) in pool.rows.iter().enumerate() {
        let picks = candidates
            .draw_distinct(i, num_distractors, rng)
            .ok_or_else(|| DatasetError::InsufficientCandidates {
                row: pool.origins[i],
                context: preview(&row.context),
                available: candidates.candidate_count(i),
                requested: num_distractors,
            })?;
        out.push(EvalRow {
            context: row.context.clone(),
            utterance: row.utterance.clone(),
            distractors: picks.into_iter().map(|p| p.utterance.clone()).collect(),
        });
        bar.inc(1);
    }
    bar.finish_and_clear();

    Ok(out)
}
