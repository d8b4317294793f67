use std::collections::{HashMap, HashSet};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use flate2::write::GzEncoder;
use flate2::Compression;

use prepare_fb_data::{
    generate_data_sets, process_raw_export, DatasetConfig, DatasetError, PairRow,
};

fn raw_export(posts: usize, comments_per_post: usize) -> String {
    let mut out = String::new();
    for p in 0..posts {
        out.push_str(&format!("{}\tpost number {p}  ", p * 3));
        for c in 0..comments_per_post {
            out.push_str(&format!("\t{c}\tpost {p} reply {c}"));
        }
        out.push('\n');
    }
    out
}

fn write_gz(path: &Path, text: &str) {
    let mut enc = GzEncoder::new(File::create(path).unwrap(), Compression::default());
    enc.write_all(text.as_bytes()).unwrap();
    enc.finish().unwrap();
}

fn read_tsv(path: &Path) -> (Vec<String>, Vec<Vec<String>>) {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .from_path(path)
        .unwrap();
    let header = reader
        .headers()
        .unwrap()
        .iter()
        .map(str::to_string)
        .collect();
    let rows = reader
        .records()
        .map(|r| r.unwrap().iter().map(str::to_string).collect())
        .collect();
    (header, rows)
}

fn config(dir: &Path, seed: u64) -> DatasetConfig {
    DatasetConfig {
        seed: Some(seed),
        ..DatasetConfig::default()
    }
    .with_output_dir(dir)
}

#[test]
fn raw_export_flattens_one_row_per_comment() {
    let dir = tempfile::tempdir().unwrap();
    let raw = dir.path().join("raw.txt.gz");
    let mut text = raw_export(4, 3);
    text.push_str("9\tnobody answered\n");
    write_gz(&raw, &text);

    let out = dir.path().join("pairs.csv");
    let summary = process_raw_export(&raw, &out).unwrap();
    assert_eq!(summary.lines, 5);
    assert_eq!(summary.posts_without_comments, 1);
    assert_eq!(summary.pairs, 12);

    let (header, rows) = read_tsv(&out);
    assert_eq!(header, ["Context", "Utterance"]);
    assert_eq!(rows.len(), 12);
    assert_eq!(rows[0], ["post number 0", "post 0 reply 0"]);
    assert_eq!(rows[11], ["post number 3", "post 3 reply 2"]);
}

#[test]
fn plain_text_export_is_accepted() {
    let dir = tempfile::tempdir().unwrap();
    let raw = dir.path().join("raw.txt");
    fs::write(&raw, raw_export(2, 2)).unwrap();

    let out = dir.path().join("pairs.csv");
    assert_eq!(process_raw_export(&raw, &out).unwrap().pairs, 4);
}

#[test]
fn malformed_line_aborts_without_output() {
    let dir = tempfile::tempdir().unwrap();
    let raw = dir.path().join("raw.txt");
    fs::write(&raw, "1\tok post\t0\treply\n2\tbroken\t5\n").unwrap();

    let out = dir.path().join("pairs.csv");
    let err = process_raw_export(&raw, &out).unwrap_err();
    assert!(matches!(err, DatasetError::MalformedRecord { line: 2, .. }));
    assert!(!out.exists());
}

#[test]
fn missing_raw_export_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = process_raw_export(&dir.path().join("nope.gz"), &dir.path().join("out.csv"))
        .unwrap_err();
    assert!(matches!(err, DatasetError::Io { .. }));
}

#[test]
fn both_stages_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let raw = dir.path().join("raw.txt.gz");
    write_gz(&raw, &raw_export(25, 4));
    let pairs = dir.path().join("pairs.csv");
    process_raw_export(&raw, &pairs).unwrap();

    let out_dir = dir.path().join("data");
    let summary = generate_data_sets(&pairs, &config(&out_dir, 2024)).unwrap();
    // 100 pairs -> 25 per quarter
    assert_eq!(summary.seed, 2024);
    assert_eq!(summary.input_rows, 100);
    assert_eq!(summary.train_rows, 100);
    assert_eq!(summary.test_rows, 25);
    assert_eq!(summary.valid_rows, 25);

    let context_of: HashMap<String, String> = (0..25)
        .flat_map(|p| (0..4).map(move |c| (format!("post {p} reply {c}"), format!("post number {p}"))))
        .collect();

    let (header, train) = read_tsv(&out_dir.join("train_set.csv"));
    assert_eq!(header, ["Context", "Utterance", "Label"]);
    assert_eq!(train.iter().filter(|r| r[2] == "1").count(), 50);
    assert_eq!(train.iter().filter(|r| r[2] == "0").count(), 50);
    for row in &train {
        let same = context_of[&row[1]] == row[0];
        assert_eq!(same, row[2] == "1");
    }

    for name in ["test_set.csv", "valid_set.csv"] {
        let (header, rows) = read_tsv(&out_dir.join(name));
        assert_eq!(
            header,
            ["Context", "Utterance", "Distractor_0", "Distractor_1", "Distractor_2"]
        );
        assert_eq!(rows.len(), 25);
        for row in &rows {
            assert_eq!(context_of[&row[1]], row[0]);
            let distractors: HashSet<&String> = row[2..].iter().collect();
            assert_eq!(distractors.len(), 3);
            assert!(row[2..].iter().all(|d| context_of[d] != row[0]));
        }
    }
}

#[test]
fn pools_are_disjoint_across_files() {
    let dir = tempfile::tempdir().unwrap();
    let pairs = dir.path().join("pairs.csv");
    let mut text = String::from("Context\tUtterance\n");
    for i in 0..37 {
        text.push_str(&format!("ctx {}\tutt {i}\n", i % 9));
    }
    fs::write(&pairs, text).unwrap();

    let out_dir = dir.path().join("out");
    generate_data_sets(&pairs, &config(&out_dir, 5)).unwrap();

    let (_, train) = read_tsv(&out_dir.join("train_set.csv"));
    let (_, test) = read_tsv(&out_dir.join("test_set.csv"));
    let (_, valid) = read_tsv(&out_dir.join("valid_set.csv"));

    let train_pos: HashSet<String> = train
        .iter()
        .filter(|r| r[2] == "1")
        .map(|r| r[1].clone())
        .collect();
    let test_pos: HashSet<String> = test.iter().map(|r| r[1].clone()).collect();
    let valid_pos: HashSet<String> = valid.iter().map(|r| r[1].clone()).collect();

    // 37 = 10 + 9 + 9 + 9
    assert_eq!(train_pos.len(), 19);
    assert_eq!(test_pos.len(), 9);
    assert_eq!(valid_pos.len(), 9);
    assert!(train_pos.is_disjoint(&test_pos));
    assert!(train_pos.is_disjoint(&valid_pos));
    assert!(test_pos.is_disjoint(&valid_pos));
}

#[test]
fn same_seed_writes_identical_files() {
    let dir = tempfile::tempdir().unwrap();
    let raw = dir.path().join("raw.txt");
    fs::write(&raw, raw_export(12, 3)).unwrap();
    let pairs = dir.path().join("pairs.csv");
    process_raw_export(&raw, &pairs).unwrap();

    let a = dir.path().join("a");
    let b = dir.path().join("b");
    generate_data_sets(&pairs, &config(&a, 31)).unwrap();
    generate_data_sets(&pairs, &config(&b, 31)).unwrap();
    for name in ["train_set.csv", "test_set.csv", "valid_set.csv"] {
        assert_eq!(
            fs::read(a.join(name)).unwrap(),
            fs::read(b.join(name)).unwrap()
        );
    }
}

#[test]
fn single_post_dataset_fails_and_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let raw = dir.path().join("raw.txt");
    fs::write(&raw, raw_export(1, 12)).unwrap();
    let pairs = dir.path().join("pairs.csv");
    process_raw_export(&raw, &pairs).unwrap();

    let out_dir = dir.path().join("data");
    let err = generate_data_sets(&pairs, &config(&out_dir, 1)).unwrap_err();
    assert!(matches!(err, DatasetError::EmptyCandidateSet { .. }));
    for name in ["train_set.csv", "test_set.csv", "valid_set.csv"] {
        assert!(!out_dir.join(name).exists());
    }
}

#[test]
fn too_few_contexts_for_distractors_fails() {
    let dir = tempfile::tempdir().unwrap();
    let pairs = dir.path().join("pairs.csv");
    // eight rows: each eval pool holds two, so one foreign row at most
    let mut text = String::from("Context\tUtterance\n");
    for i in 0..8 {
        text.push_str(&format!("ctx {i}\tutt {i}\n"));
    }
    fs::write(&pairs, text).unwrap();

    let err = generate_data_sets(&pairs, &config(&dir.path().join("out"), 3)).unwrap_err();
    assert!(matches!(
        err,
        DatasetError::InsufficientCandidates { requested: 3, .. }
    ));
}

#[test]
fn zero_distractors_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = DatasetConfig {
        num_distractors: 0,
        ..config(dir.path(), 0)
    };
    let err = generate_data_sets(&dir.path().join("pairs.csv"), &cfg).unwrap_err();
    assert!(matches!(err, DatasetError::InvalidConfig(_)));
}

#[test]
fn text_with_tabs_and_quotes_survives_both_stages() {
    let dir = tempfile::tempdir().unwrap();
    let pairs = dir.path().join("pairs.csv");
    let rows: Vec<PairRow> = (0..16)
        .map(|i| PairRow::new(format!("say \"hi\" {i}"), format!("a\tb {i}")))
        .collect();
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(&pairs)
        .unwrap();
    for row in &rows {
        wtr.serialize(row).unwrap();
    }
    wtr.flush().unwrap();

    let out_dir = dir.path().join("out");
    let summary = generate_data_sets(&pairs, &config(&out_dir, 9)).unwrap();
    assert_eq!(summary.input_rows, 16);

    let (_, train) = read_tsv(&out_dir.join("train_set.csv"));
    assert_eq!(train.len(), 16);
    assert!(train.iter().all(|r| r.len() == 3 && r[1].contains('\t')));
}
