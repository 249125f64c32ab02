//! Catalog ingestion: read a delimited file into a [`CatalogIndex`].
//!
//! The file is header-first and comma-delimited. Fields may be wrapped in
//! double quotes, with `""` for a literal quote. Blank lines are skipped.
//! Each data row becomes one [`RawRecord`] keyed by header column.
//!
//! Rows are fed to an [`IndexBuilder`], so the configured
//! [`LoadPolicy`] decides whether a malformed row aborts the load or is
//! skipped. I/O errors always abort.

use anyhow::{bail, Context, Result};
use neo_search_core::models::columns;
use neo_search_core::{
    CatalogError, CatalogIndex, IndexBuilder, LoadPolicy, LoadReport, RawRecord,
};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::progress::{LoadProgressEvent, LoadProgressReporter};

/// Emit a progress event every this many records.
const PROGRESS_INTERVAL: usize = 10_000;

/// One parsed data row, or the reason it could not be split.
pub type Row = neo_search_core::Result<RawRecord>;

/// Streaming reader that yields one [`Row`] per data line.
pub struct CsvRecords<R: BufRead> {
    reader: R,
    header: Vec<String>,
    line_buf: String,
    line_no: usize,
}

impl<R: BufRead> CsvRecords<R> {
    /// Read the header line and prepare to stream rows.
    pub fn new(mut reader: R) -> Result<Self> {
        let mut line = String::new();
        let mut line_no = 0;
        loop {
            line.clear();
            if reader.read_line(&mut line)? == 0 {
                bail!("catalog file is empty (no header line)");
            }
            line_no += 1;
            if !line.trim().is_empty() {
                break;
            }
        }

        let header_line = line.trim_start_matches('\u{feff}');
        let header: Vec<String> = split_line(header_line)
            .map_err(|_| anyhow::anyhow!("malformed header line: {}", header_line.trim()))?
            .into_iter()
            .map(|h| h.trim().to_string())
            .collect();

        Ok(Self {
            reader,
            header,
            line_buf: String::with_capacity(512),
            line_no,
        })
    }

    /// Required columns the header does not have.
    pub fn missing_columns(&self) -> Vec<&'static str> {
        columns::REQUIRED
            .iter()
            .copied()
            .filter(|c| !self.header.iter().any(|h| h == c))
            .collect()
    }

    fn parse_row(&self, line: &str) -> Row {
        let fields = split_line(line).map_err(|_| CatalogError::InvalidFormat {
            field: format!("line {}", self.line_no),
            value: line.to_string(),
        })?;
        if fields.len() != self.header.len() {
            return Err(CatalogError::InvalidFormat {
                field: format!(
                    "line {} ({} fields, header has {})",
                    self.line_no,
                    fields.len(),
                    self.header.len()
                ),
                value: line.to_string(),
            });
        }
        Ok(self.header.iter().cloned().zip(fields).collect())
    }
}

impl<R: BufRead> Iterator for CsvRecords<R> {
    type Item = std::io::Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.line_buf.clear();
            match self.reader.read_line(&mut self.line_buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => return Some(Err(e)),
            }
            self.line_no += 1;
            let line = self.line_buf.trim_end_matches(['\r', '\n']);
            if line.trim().is_empty() {
                continue;
            }
            return Some(Ok(self.parse_row(line)));
        }
    }
}

/// Split one line into fields. Fails on an unterminated quote.
fn split_line(line: &str) -> std::result::Result<Vec<String>, ()> {
    let line = line.trim_end_matches(['\r', '\n']);
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match (c, in_quotes) {
            ('"', true) => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            ('"', false) if field.is_empty() => in_quotes = true,
            (',', false) => fields.push(std::mem::take(&mut field)),
            (c, _) => field.push(c),
        }
    }

    if in_quotes {
        return Err(());
    }
    fields.push(field);
    Ok(fields)
}

/// Load the catalog at `path` into an index under `policy`.
pub fn load_catalog(
    path: &Path,
    policy: LoadPolicy,
    progress: &dyn LoadProgressReporter,
) -> Result<(CatalogIndex, LoadReport)> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open catalog file: {}", path.display()))?;
    let records = CsvRecords::new(BufReader::new(file))
        .with_context(|| format!("Failed to read catalog header: {}", path.display()))?;

    let missing = records.missing_columns();
    if !missing.is_empty() {
        bail!(
            "catalog {} is missing required column(s): {}",
            path.display(),
            missing.join(", ")
        );
    }

    progress.report(LoadProgressEvent::Reading {
        path: path.display().to_string(),
    });

    let index = build_index(records, policy, progress)
        .with_context(|| format!("Failed to load catalog: {}", path.display()))?;
    Ok(index)
}

/// Feed every row of `records` through an [`IndexBuilder`].
pub fn build_index<R: BufRead>(
    records: CsvRecords<R>,
    policy: LoadPolicy,
    progress: &dyn LoadProgressReporter,
) -> Result<(CatalogIndex, LoadReport)> {
    let mut builder = IndexBuilder::new(policy);
    for row in records {
        builder.push(row?)?;
        if builder.position() % PROGRESS_INTERVAL == 0 {
            progress.report(LoadProgressEvent::Indexing {
                records: builder.position(),
            });
        }
    }

    let (index, report) = builder.finish();
    progress.report(LoadProgressEvent::Done {
        entries: index.len(),
        events: index.event_count(),
        skipped: report.skipped.len(),
    });
    if !report.skipped.is_empty() {
        tracing::warn!(
            skipped = report.skipped.len(),
            loaded = report.loaded,
            "some catalog records were malformed and skipped"
        );
    }
    Ok((index, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NoProgress;
    use std::io::Cursor;

    const HEADER: &str = "id,neo_reference_id,name,estimated_diameter_min_kilometers,is_potentially_hazardous_asteroid,miss_distance_kilometers,close_approach_date";

    fn reader(body: &str) -> CsvRecords<Cursor<String>> {
        CsvRecords::new(Cursor::new(format!("{}\n{}", HEADER, body))).unwrap()
    }

    #[test]
    fn test_split_plain() {
        assert_eq!(split_line("a,b,,c").unwrap(), vec!["a", "b", "", "c"]);
    }

    #[test]
    fn test_split_quoted() {
        assert_eq!(
            split_line(r#"1,"(2019 AB), x","say ""hi""""#).unwrap(),
            vec!["1", "(2019 AB), x", r#"say "hi""#]
        );
    }

    #[test]
    fn test_split_unterminated_quote() {
        assert!(split_line(r#"1,"open"#).is_err());
    }

    #[test]
    fn test_rows_keyed_by_header() {
        let mut rows = reader("2000433,2000433,433 Eros,10.0,False,26729521.1,2020-01-01\n");
        let row = rows.next().unwrap().unwrap().unwrap();
        assert_eq!(row["name"], "433 Eros");
        assert_eq!(row["close_approach_date"], "2020-01-01");
        assert!(rows.next().is_none());
    }

    #[test]
    fn test_blank_lines_and_crlf() {
        let rows: Vec<_> = reader("\r\n1,1,A,0.1,False,10,2020-01-01\r\n\n2,2,B,0.2,True,20,2020-01-02\r\n")
            .map(|r| r.unwrap().unwrap())
            .collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1]["close_approach_date"], "2020-01-02");
    }

    #[test]
    fn test_wrong_field_count_is_row_error() {
        let mut rows = reader("1,1,A,0.1\n");
        let err = rows.next().unwrap().unwrap().unwrap_err();
        assert!(matches!(err, CatalogError::InvalidFormat { .. }));
    }

    #[test]
    fn test_missing_columns_reported() {
        let rows = CsvRecords::new(Cursor::new("id,name\n".to_string())).unwrap();
        let missing = rows.missing_columns();
        assert!(missing.contains(&"miss_distance_kilometers"));
        assert!(!missing.contains(&"name"));
    }

    #[test]
    fn test_empty_file_errors() {
        assert!(CsvRecords::new(Cursor::new(String::new())).is_err());
    }

    #[test]
    fn test_build_abort_policy() {
        let rows = reader(
            "1,1,A,0.1,False,10,2020-01-01\n2,2,B,wide,False,20,2020-01-01\n3,3,C,0.3,False,30,2020-01-01\n",
        );
        let err = build_index(rows, LoadPolicy::Abort, &NoProgress).unwrap_err();
        assert!(err.to_string().contains("record 2"), "got: {}", err);
    }

    #[test]
    fn test_build_skip_policy() {
        let rows = reader(
            "1,1,A,0.1,False,10,2020-01-01\n2,2,B,wide,False,20,2020-01-01\n3,3\n4,4,D,0.3,False,30,2020-01-01\n",
        );
        let (index, report) = build_index(rows, LoadPolicy::Skip, &NoProgress).unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(report.loaded, 2);
        let skipped: Vec<usize> = report.skipped.iter().map(|e| e.record).collect();
        assert_eq!(skipped, vec![2, 3]);
    }
}
