//! Build a retrieval-dialogue dataset from a raw post/comment export.
//!
//! Stage one flattens each post and its comments into (context, utterance)
//! pairs. Stage two shuffles the pairs into train/test/valid pools (2:1:1),
//! adds one negative per training pair and N distractors per test or
//! validation pair, never borrowing an utterance from a row that shares the
//! pair's context.

pub mod candidates;
pub mod config;
pub mod distractor;
pub mod error;
pub mod io;
pub mod logging;
pub mod negative;
pub mod partition;
pub mod pipeline;
pub mod record;

pub use config::DatasetConfig;
pub use distractor::EvalRow;
pub use error::{DatasetError, Result};
pub use negative::LabeledRow;
pub use pipeline::{generate_data_sets, process_raw_export, DataSetSummary, ExportSummary};
pub use record::{PairRow, PostRecord};
