//! Normalization of raw accepted-loans rows into the internal table contract.
//!
//! Every row that survives has a binary `target`; rows whose `loan_status` is
//! in progress or unknown are dropped here, and `loan_status` itself never
//! reaches the output so it cannot leak into the features.

use std::borrow::Cow;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use csv::{ByteRecord, ReaderBuilder};
use loan_structs::{
    FieldRule, ISSUE_DATE_COLUMN, ISSUE_MONTH_COLUMN, LoanLabel, RAW_FIELDS, STATUS_COLUMN,
    TARGET_COLUMN,
};
use tracing::{debug, info, warn};

use crate::raw::{find_accepted_file, open_raw};
use crate::{Column, LoaderError, Table};

/// Minimum share of labeled rows whose issue date must parse.
pub const MIN_DATE_PARSE_RATE: f64 = 0.95;

/// Log a progress line every this many raw rows.
const PROGRESS_EVERY_ROWS: usize = 200_000;

/// Cell values read as missing, matching the usual CSV NA conventions.
const NA_TOKENS: [&str; 11] = [
    "", "NA", "N/A", "n/a", "NULL", "null", "NaN", "nan", "None", "<NA>", "#N/A",
];

/// Row accounting for one normalization run.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoadSummary {
    /// Data rows read from the file.
    pub raw_rows: usize,
    /// Rows dropped because the status is neither good nor bad.
    pub unlabeled_rows: usize,
    /// Rows with a good or bad status.
    pub labeled_rows: usize,
    /// Labeled rows dropped because the issue date did not parse.
    pub unparsed_dates: usize,
    /// Rows written to the normalized table.
    pub kept_rows: usize,
}

impl LoadSummary {
    /// Share of labeled rows with a parseable issue date.
    #[must_use]
    pub fn date_parse_rate(&self) -> f64 {
        if self.labeled_rows == 0 {
            1.0
        } else {
            self.kept_rows as f64 / self.labeled_rows as f64
        }
    }
}

/// A normalized table and where it came from.
#[derive(Debug, Clone)]
pub struct NormalizedDataset {
    pub source: PathBuf,
    pub table: Table,
    pub summary: LoadSummary,
}

/// Returns true if the trimmed cell is one of the NA tokens.
#[must_use]
pub fn is_missing(value: &str) -> bool {
    NA_TOKENS.contains(&value.trim())
}

/// Best-effort numeric parse; anything unparseable is missing.
#[must_use]
pub fn parse_numeric(value: &str) -> Option<f64> {
    let value = value.trim();
    if is_missing(value) {
        return None;
    }
    value.parse::<f64>().ok().filter(|x| !x.is_nan())
}

/// Parses a percentage such as `"13.56%"` into `13.56`.
#[must_use]
pub fn parse_percent(value: &str) -> Option<f64> {
    parse_numeric(&value.replace('%', ""))
}

/// Extracts integer months from text such as `" 36 months"`.
///
/// The first run of ASCII digits is used.
#[must_use]
pub fn parse_term(value: &str) -> Option<i64> {
    let start = value.find(|c: char| c.is_ascii_digit())?;
    let digits: &str = value.get(start..)?;
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits.get(..end)?.parse().ok()
}

/// Trimmed text, or missing for NA tokens.
#[must_use]
pub fn parse_categorical(value: &str) -> Option<String> {
    let value = value.trim();
    (!is_missing(value)).then(|| value.to_string())
}

/// Parses an issue date such as `"Dec-2015"` to the first of the month.
#[must_use]
pub fn parse_issue_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if is_missing(value) {
        return None;
    }
    NaiveDate::parse_from_str(&format!("01-{value}"), "%d-%b-%Y").ok()
}

/// `YYYY-MM` bucket of a date.
#[must_use]
pub fn issue_month(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

/// Growing output column for one raw field.
enum FieldBuilder {
    Date(Vec<Option<NaiveDate>>),
    Float(Vec<Option<f64>>),
    Int(Vec<Option<i64>>),
    Text(Vec<Option<String>>),
}

struct FieldSlot {
    name: &'static str,
    rule: FieldRule,
    index: usize,
    builder: FieldBuilder,
}

impl FieldSlot {
    fn new(name: &'static str, rule: FieldRule, index: usize) -> Self {
        let builder = match rule {
            FieldRule::IssueDate => FieldBuilder::Date(Vec::new()),
            FieldRule::Numeric | FieldRule::Percent => FieldBuilder::Float(Vec::new()),
            FieldRule::Term => FieldBuilder::Int(Vec::new()),
            FieldRule::Categorical | FieldRule::Status => FieldBuilder::Text(Vec::new()),
        };

        Self {
            name,
            rule,
            index,
            builder,
        }
    }

    fn push(&mut self, value: &str) {
        match (&mut self.builder, self.rule) {
            (FieldBuilder::Date(v), _) => v.push(parse_issue_date(value)),
            (FieldBuilder::Float(v), FieldRule::Percent) => v.push(parse_percent(value)),
            (FieldBuilder::Float(v), _) => v.push(parse_numeric(value)),
            (FieldBuilder::Int(v), _) => v.push(parse_term(value)),
            (FieldBuilder::Text(v), _) => v.push(parse_categorical(value)),
        }
    }

    fn finish(self) -> Column {
        match self.builder {
            FieldBuilder::Date(v) => Column::Date(v),
            FieldBuilder::Float(v) => Column::Float64(v),
            FieldBuilder::Int(v) => Column::Int64(v),
            FieldBuilder::Text(v) => Column::Utf8(v),
        }
    }
}

fn cell(record: &ByteRecord, index: usize) -> Cow<'_, str> {
    record
        .get(index)
        .map(String::from_utf8_lossy)
        .unwrap_or_default()
}

fn header_index(headers: &ByteRecord, name: &str) -> Result<usize, LoaderError> {
    headers
        .iter()
        .position(|h| h == name.as_bytes())
        .ok_or_else(|| LoaderError::MissingColumn(name.to_string()))
}

/// Normalizes raw CSV rows from any reader.
///
/// Output row order follows input order, so the same input always yields
/// the same table.
///
/// # Errors
///
/// Returns an error if a required column is missing from the header, the
/// CSV is malformed, or fewer than [`MIN_DATE_PARSE_RATE`] of labeled rows
/// have a parseable issue date.
pub fn normalize_reader<R: Read>(reader: R) -> Result<(Table, LoadSummary), LoaderError> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader.byte_headers()?.clone();
    let status_index = header_index(&headers, STATUS_COLUMN)?;

    let mut slots = RAW_FIELDS
        .iter()
        .filter(|field| field.rule != FieldRule::Status)
        .map(|field| Ok(FieldSlot::new(field.name, field.rule, header_index(&headers, field.name)?)))
        .collect::<Result<Vec<_>, LoaderError>>()?;

    let date_index = header_index(&headers, ISSUE_DATE_COLUMN)?;

    let mut months = Vec::new();
    let mut targets = Vec::new();
    let mut summary = LoadSummary::default();
    let mut record = ByteRecord::new();

    while csv_reader.read_byte_record(&mut record)? {
        summary.raw_rows += 1;
        if summary.raw_rows % PROGRESS_EVERY_ROWS == 0 {
            debug!(rows = summary.raw_rows, kept = summary.kept_rows, "Normalizing raw rows");
        }

        let Some(target) = LoanLabel::from_status(&cell(&record, status_index)).target() else {
            summary.unlabeled_rows += 1;
            continue;
        };
        summary.labeled_rows += 1;

        let Some(issued) = parse_issue_date(&cell(&record, date_index)) else {
            summary.unparsed_dates += 1;
            continue;
        };

        for slot in &mut slots {
            slot.push(&cell(&record, slot.index));
        }
        months.push(Some(issue_month(issued)));
        targets.push(Some(target));
        summary.kept_rows += 1;
    }

    let rate = summary.date_parse_rate();
    if rate < MIN_DATE_PARSE_RATE {
        return Err(LoaderError::DateParseRate {
            column: ISSUE_DATE_COLUMN.to_string(),
            rate,
            parsed: summary.kept_rows,
            total: summary.labeled_rows,
        });
    }

    if summary.labeled_rows == 0 {
        warn!(raw_rows = summary.raw_rows, "No labeled rows found in raw file");
    }

    let mut table = Table::new();
    for slot in slots {
        let name = slot.name;
        table.push_column(name, slot.finish())?;
    }
    table.push_column(ISSUE_MONTH_COLUMN, Column::Utf8(months))?;
    table.push_column(TARGET_COLUMN, Column::Int64(targets))?;

    Ok((table, summary))
}

/// Loads the raw accepted-loans file from `raw_dir` and normalizes it.
///
/// # Errors
///
/// Returns an error if no raw file exists or normalization fails.
pub fn load_and_normalize(raw_dir: &Path) -> Result<NormalizedDataset, LoaderError> {
    let source = find_accepted_file(raw_dir)?;
    info!(path = %source.display(), "Reading raw accepted loans");

    let (table, summary) = normalize_reader(open_raw(&source)?)?;

    info!(
        raw_rows = summary.raw_rows,
        unlabeled_rows = summary.unlabeled_rows,
        unparsed_dates = summary.unparsed_dates,
        kept_rows = summary.kept_rows,
        date_parse_rate = summary.date_parse_rate(),
        "Normalized raw rows"
    );

    Ok(NormalizedDataset {
        source,
        table,
        summary,
    })
}
