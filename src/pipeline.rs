//! The two stages of the tool.
//!
//! `process_raw_export` turns a raw post/comment export into a pair file;
//! `generate_data_sets` turns a pair file into the train/test/valid files.
//! Each stage writes its outputs to temporary files and only moves them into
//! place once all of its reading and sampling has succeeded.

use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use rand::Rng;

use crate::config::{
    distractor_headers, DatasetConfig, CONTEXT_HEADER, LABEL_HEADER, UTTERANCE_HEADER,
};
use crate::distractor::{make_eval_set, EvalRow};
use crate::error::Result;
use crate::io::{read_pairs, PendingFile, RawLines, TsvOutput};
use crate::negative::{make_train_set, LabeledRow};
use crate::partition::partition;
use crate::record::{parse_line, PairRow};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub lines: usize,
    pub posts_without_comments: usize,
    pub pairs: usize,
    pub output: PathBuf,
}

/// Flatten a raw export into `Context\tUtterance` rows, one per comment.
pub fn process_raw_export(input: &Path, output: &Path) -> Result<ExportSummary> {
    info!("Processing raw export {}", input.display());

    let raw = RawLines::open(input)?;
    let mut out = TsvOutput::create(output, &[CONTEXT_HEADER, UTTERANCE_HEADER])?;
    let mut lines = 0usize;
    let mut posts_without_comments = 0usize;

    for item in raw {
        let (line_no, line) = item?;
        let record = parse_line(&line, line_no)?;
        lines += 1;
        if record.comments.is_empty() {
            posts_without_comments += 1;
            continue;
        }
        for pair in record.flatten() {
            out.serialize(&pair)?;
        }
    }

    let pairs = out.rows();
    let output = out.finish()?.persist()?;
    if posts_without_comments > 0 {
        warn!("{posts_without_comments} posts had no comments and were skipped");
    }
    info!("Wrote {pairs} pairs from {lines} records to {}", output.display());

    Ok(ExportSummary {
        lines,
        posts_without_comments,
        pairs,
        output,
    })
}

/// In-memory result of partitioning and sampling.
#[derive(Debug, Default)]
pub struct DataSets {
    pub train: Vec<LabeledRow>,
    pub test: Vec<EvalRow>,
    pub valid: Vec<EvalRow>,
}

/// Partition `rows` and run the samplers, drawing from `rng` in a fixed order:
/// shuffle, training negatives, test distractors, validation distractors.
pub fn build_data_sets<R: Rng + ?Sized>(
    rows: Vec<PairRow>,
    num_distractors: usize,
    rng: &mut R,
) -> Result<DataSets> {
    let pools = partition(rows, rng);
    info!(
        "Partitioned {} rows: train={} test={} valid={}",
        pools.total(),
        pools.train.len(),
        pools.test.len(),
        pools.valid.len()
    );

    let train = make_train_set(&pools.train, rng, &sampling_bar(pools.train.len(), "train"))?;
    let test = make_eval_set(
        &pools.test,
        num_distractors,
        rng,
        &sampling_bar(pools.test.len(), "test"),
    )?;
    let valid = make_eval_set(
        &pools.valid,
        num_distractors,
        rng,
        &sampling_bar(pools.valid.len(), "valid"),
    )?;

    Ok(DataSets { train, test, valid })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSetSummary {
    pub seed: u64,
    pub input_rows: usize,
    pub train_rows: usize,
    pub test_rows: usize,
    pub valid_rows: usize,
    pub outputs: Vec<PathBuf>,
}

/// Read a pair file and write the three data set files under
/// `cfg.output_dir`.
///
/// A failure while reading, sampling or writing leaves every existing output
/// untouched. The three finished files are then renamed into place one after
/// another, so an error in a later rename (disk full, permissions) can leave
/// the earlier files already replaced; the error names the file that failed.
pub fn generate_data_sets(input: &Path, cfg: &DatasetConfig) -> Result<DataSetSummary> {
    cfg.validate()?;
    let seed = cfg.effective_seed();
    info!("Generating data sets from {} (seed {seed})", input.display());

    let rows = read_pairs(input)?;
    let input_rows = rows.len();
    info!("Loaded {input_rows} pairs");

    let mut rng = DatasetConfig::rng(seed);
    let sets = build_data_sets(rows, cfg.num_distractors, &mut rng)?;

    let pending = [
        write_train(&cfg.train_path(), &sets.train)?,
        write_eval(&cfg.test_path(), &sets.test, cfg.num_distractors)?,
        write_eval(&cfg.valid_path(), &sets.valid, cfg.num_distractors)?,
    ];
    let (train_rows, test_rows, valid_rows) =
        (pending[0].rows(), pending[1].rows(), pending[2].rows());

    let mut outputs = Vec::with_capacity(pending.len());
    for file in pending {
        let path = file.persist()?;
        info!("Wrote {}", path.display());
        outputs.push(path);
    }

    Ok(DataSetSummary {
        seed,
        input_rows,
        train_rows,
        test_rows,
        valid_rows,
        outputs,
    })
}

fn write_train(path: &Path, rows: &[LabeledRow]) -> Result<PendingFile> {
    let mut out = TsvOutput::create(path, &[CONTEXT_HEADER, UTTERANCE_HEADER, LABEL_HEADER])?;
    for row in rows {
        out.serialize(row)?;
    }
    out.finish()
}

fn write_eval(path: &Path, rows: &[EvalRow], num_distractors: usize) -> Result<PendingFile> {
    let mut header = vec![CONTEXT_HEADER.to_string(), UTTERANCE_HEADER.to_string()];
    header.extend(distractor_headers(num_distractors));

    let mut out = TsvOutput::create(path, header.as_slice())?;
    for row in rows {
        out.write_fields(row.fields())?;
    }
    out.finish()
}

fn sampling_bar(len: usize, label: &'static str) -> ProgressBar {
    let bar = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::with_template(
        "{spinner:.green} {msg:>5} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
    ) {
        bar.set_style(style);
    }
    bar.set_message(label);
    bar
}
