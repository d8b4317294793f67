//! Context-exclusion candidate pool.
//!
//! For a row `r` the candidates are every row of the pool whose context
//! differs byte-for-byte from `r.context`. The pool keeps row indices grouped
//! by context, so the candidates of `r` are the grouped order with `r`'s own
//! group cut out, and the k-th candidate is found without scanning the pool.
//!
//! The pool borrows the rows immutably; samplers write their output into a
//! separate collection, so nothing drawn for one row changes the candidates
//! of the next.

use std::collections::HashMap;

use rand::seq::index;
use rand::Rng;

use crate::record::PairRow;

pub struct CandidatePool<'a> {
    rows: &'a [PairRow],
    // row indices, rows with equal context contiguous
    order: Vec<usize>,
    // (start, len) of each context group inside `order`
    spans: Vec<(usize, usize)>,
    group_of: Vec<usize>,
}

impl<'a> CandidatePool<'a> {
    pub fn new(rows: &'a [PairRow]) -> Self {
        // group ids follow first appearance so the layout is deterministic
        let mut ids: HashMap<&'a str, usize> = HashMap::new();
        let mut groups: Vec<Vec<usize>> = Vec::new();
        let mut group_of = Vec::with_capacity(rows.len());

        for (i, row) in rows.iter().enumerate() {
            let id = *ids.entry(row.context.as_str()).or_insert_with(|| {
                groups.push(Vec::new());
                groups.len() - 1
            });
            groups[id].push(i);
            group_of.push(id);
        }

        let mut order = Vec::with_capacity(rows.len());
        let mut spans = Vec::with_capacity(groups.len());
        for members in groups {
            spans.push((order.len(), members.len()));
            order.extend(members);
        }

        Self {
            rows,
            order,
            spans,
            group_of,
        }
    }

    /// Number of distinct contexts in the pool.
    pub fn context_count(&self) -> usize {
        self.spans.len()
    }

    /// How many rows have a context different from row `row`.
    pub fn candidate_count(&self, row: usize) -> usize {
        let (_, len) = self.spans[self.group_of[row]];
        self.rows.len() - len
    }

    // k-th candidate of `row`, k < candidate_count(row)
    fn candidate_at(&self, row: usize, k: usize) -> usize {
        let (start, len) = self.spans[self.group_of[row]];
        if k < start {
            self.order[k]
        } else {
            self.order[k + len]
        }
    }

    /// One candidate drawn uniformly, or `None` when every row shares the
    /// context of `row`.
    pub fn draw_one<R: Rng + ?Sized>(&self, row: usize, rng: &mut R) -> Option<&'a PairRow> {
        let count = self.candidate_count(row);
        if count == 0 {
            return None;
        }
        let k = rng.gen_range(0..count);
        Some(&self.rows[self.candidate_at(row, k)])
    }

    /// `amount` distinct candidates drawn uniformly without replacement, in
    /// draw order, or `None` when fewer than `amount` exist.
    pub fn draw_distinct<R: Rng + ?Sized>(
        &self,
        row: usize,
        amount: usize,
        rng: &mut R,
    ) -> Option<Vec<&'a PairRow>> {
        let count = self.candidate_count(row);
        if count < amount {
            return None;
        }
        let picked = index::sample(rng, count, amount)
            .into_iter()
            .map(|k| &self.rows[self.candidate_at(row, k)])
            .collect();
        Some(picked)
    }
}
