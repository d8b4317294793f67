// Shuffle + four-way split: quarters 0,1 -> train, 2 -> test, 3 -> valid.

use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::record::PairRow;

const QUARTERS: usize = 4;

/// Rows of one split together with where each came from.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Pool {
    pub rows: Vec<PairRow>,
    /// 1-based data-row number of `rows[i]` in the pair file (header excluded).
    pub origins: Vec<usize>,
}

impl Pool {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Rows in file order, numbered from 1.
impl From<Vec<PairRow>> for Pool {
    fn from(rows: Vec<PairRow>) -> Self {
        let origins = (1..=rows.len()).collect();
        Self { rows, origins }
    }
}

impl FromIterator<(usize, PairRow)> for Pool {
    fn from_iter<I: IntoIterator<Item = (usize, PairRow)>>(iter: I) -> Self {
        let (origins, rows) = iter.into_iter().unzip();
        Self { rows, origins }
    }
}

#[derive(Debug, Default)]
pub struct Partition {
    pub train: Pool,
    pub test: Pool,
    pub valid: Pool,
}

impl Partition {
    pub fn total(&self) -> usize {
        self.train.len() + self.test.len() + self.valid.len()
    }
}

/// Sizes of `parts` contiguous blocks over `total` items.
/// The first `total % parts` blocks carry one extra item.
pub fn balanced_sizes(total: usize, parts: usize) -> Vec<usize> {
    let base = total / parts;
    let extra = total % parts;
    (0..parts)
        .map(|i| if i < extra { base + 1 } else { base })
        .collect()
}

/// Uniformly permute `rows` and cut them into the three pools. Each row keeps
/// its 1-based position in `rows` as its origin.
pub fn partition<R: Rng + ?Sized>(rows: Vec<PairRow>, rng: &mut R) -> Partition {
    let mut numbered: Vec<(usize, PairRow)> =
        rows.into_iter().enumerate().map(|(i, r)| (i + 1, r)).collect();
    numbered.shuffle(rng);

    let sizes = balanced_sizes(numbered.len(), QUARTERS);
    debug!("Quarter sizes: {:?}", sizes);

    // split_off from the back keeps the front blocks in place
    let valid = numbered.split_off(numbered.len() - sizes[3]);
    let test = numbered.split_off(numbered.len() - sizes[2]);

    Partition {
        train: numbered.into_iter().collect(),
        test: test.into_iter().collect(),
        valid: valid.into_iter().collect(),
    }
}
