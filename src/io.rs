// File plumbing: gz/plain raw export in, tab-delimited files in and out.

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use flate2::read::MultiGzDecoder;
use log::debug;
use serde::Serialize;
use tempfile::NamedTempFile;

use crate::error::{DatasetError, Result};
use crate::record::PairRow;

const DELIMITER: u8 = b'\t';

fn is_gzip(path: &Path) -> bool {
    path.extension().map(|e| e == "gz").unwrap_or(false)
}

/// Open a raw export, decompressing when the name ends in `.gz`.
pub fn open_raw_export(path: &Path) -> Result<Box<dyn BufRead>> {
    let file = File::open(path).map_err(|e| DatasetError::io(path, e))?;
    if is_gzip(path) {
        debug!("Reading {} as gzip", path.display());
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Numbered (1-based), strictly UTF-8 decoded lines without their terminator.
pub struct RawLines<'p> {
    reader: Box<dyn BufRead>,
    path: &'p Path,
    line_no: usize,
    buf: Vec<u8>,
}

impl<'p> RawLines<'p> {
    pub fn open(path: &'p Path) -> Result<Self> {
        Ok(Self::new(open_raw_export(path)?, path))
    }

    pub fn new(reader: Box<dyn BufRead>, path: &'p Path) -> Self {
        Self {
            reader,
            path,
            line_no: 0,
            buf: Vec::new(),
        }
    }
}

impl Iterator for RawLines<'_> {
    type Item = Result<(usize, String)>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => None,
            Ok(_) => {
                self.line_no += 1;
                if self.buf.last() == Some(&b'\n') {
                    self.buf.pop();
                    if self.buf.last() == Some(&b'\r') {
                        self.buf.pop();
                    }
                }
                let line = match String::from_utf8(std::mem::take(&mut self.buf)) {
                    Ok(line) => line,
                    Err(_) => {
                        return Some(Err(DatasetError::Encoding {
                            path: self.path.to_path_buf(),
                            line: self.line_no,
                        }))
                    }
                };
                Some(Ok((self.line_no, line)))
            }
            Err(e) => Some(Err(DatasetError::io(self.path, e))),
        }
    }
}

/// Load a processed pair file. The header row is skipped.
pub fn read_pairs(path: &Path) -> Result<Vec<PairRow>> {
    let file = File::open(path).map_err(|e| DatasetError::io(path, e))?;
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(DELIMITER)
        .has_headers(true)
        .from_reader(BufReader::new(file));

    let mut rows = Vec::new();
    for (i, result) in reader.deserialize::<PairRow>().enumerate() {
        match result {
            Ok(row) => rows.push(row),
            Err(e) if matches!(e.kind(), csv::ErrorKind::Io(_)) => {
                return Err(DatasetError::csv(path, e));
            }
            Err(e) => return Err(DatasetError::MalformedRow { row: i + 1, source: e }),
        }
    }
    Ok(rows)
}

/// A tab-delimited output written to a temporary file next to its target.
/// Nothing appears at the target path until the file is persisted.
pub struct TsvOutput {
    path: PathBuf,
    writer: csv::Writer<NamedTempFile>,
    rows: usize,
}

impl TsvOutput {
    pub fn create<S: AsRef<str>>(path: &Path, header: &[S]) -> Result<Self> {
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(|e| DatasetError::io(dir, e))?;
        let tmp = NamedTempFile::new_in(dir).map_err(|e| DatasetError::io(dir, e))?;

        let mut writer = csv::WriterBuilder::new()
            .delimiter(DELIMITER)
            .has_headers(false)
            .from_writer(tmp);
        writer
            .write_record(header.iter().map(|h| h.as_ref()))
            .map_err(|e| DatasetError::csv(path, e))?;

        Ok(Self {
            path: path.to_path_buf(),
            writer,
            rows: 0,
        })
    }

    pub fn serialize<T: Serialize>(&mut self, row: &T) -> Result<()> {
        self.writer
            .serialize(row)
            .map_err(|e| DatasetError::csv(&self.path, e))?;
        self.rows += 1;
        Ok(())
    }

    pub fn write_fields<'a, I>(&mut self, fields: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.writer
            .write_record(fields)
            .map_err(|e| DatasetError::csv(&self.path, e))?;
        self.rows += 1;
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Flush everything to the temporary file; the target is still untouched.
    pub fn finish(self) -> Result<PendingFile> {
        let Self { path, writer, rows } = self;
        let tmp = writer.into_inner().map_err(|e| {
            let err = e.error();
            DatasetError::io(&path, io::Error::new(err.kind(), err.to_string()))
        })?;
        Ok(PendingFile { path, tmp, rows })
    }
}

/// A completely written output waiting to be moved into place.
pub struct PendingFile {
    path: PathBuf,
    tmp: NamedTempFile,
    rows: usize,
}

impl PendingFile {
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Atomically rename onto the target path.
    pub fn persist(self) -> Result<PathBuf> {
        let Self { path, tmp, .. } = self;
        tmp.persist(&path)
            .map_err(|e| DatasetError::io(&path, e.error))?;
        debug!("Persisted {}", path.display());
        Ok(path)
    }
}
