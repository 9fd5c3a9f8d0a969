//! In-memory columnar table and its Parquet representation.

use std::fs::File;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, AsArray, Date32Array, Float64Array, Int64Array, StringArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Date32Type, Field, Float64Type, Int64Type, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Datelike, NaiveDate};
use parquet::arrow::ArrowWriter;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use tracing::debug;

use crate::LoaderError;

/// Days between 0001-01-01 and 1970-01-01 in the proleptic Gregorian calendar.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// A single typed column with nullable cells.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Float64(Vec<Option<f64>>),
    Int64(Vec<Option<i64>>),
    Utf8(Vec<Option<String>>),
    Date(Vec<Option<NaiveDate>>),
}

impl Column {
    /// Number of cells.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Float64(v) => v.len(),
            Self::Int64(v) => v.len(),
            Self::Utf8(v) => v.len(),
            Self::Date(v) => v.len(),
        }
    }

    /// Returns true if the column has no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if the cell at `row` is missing.
    #[must_use]
    pub fn is_null(&self, row: usize) -> bool {
        match self {
            Self::Float64(v) => v.get(row).is_none_or(Option::is_none),
            Self::Int64(v) => v.get(row).is_none_or(Option::is_none),
            Self::Utf8(v) => v.get(row).is_none_or(Option::is_none),
            Self::Date(v) => v.get(row).is_none_or(Option::is_none),
        }
    }

    /// Number of missing cells.
    #[must_use]
    pub fn null_count(&self) -> usize {
        (0..self.len()).filter(|&row| self.is_null(row)).count()
    }

    /// Whether the column holds numbers that pass through encoding unchanged.
    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        matches!(self, Self::Float64(_) | Self::Int64(_))
    }

    /// Renders the cell at `row` as text, `None` if missing.
    #[must_use]
    pub fn display_value(&self, row: usize) -> Option<String> {
        match self {
            Self::Float64(v) => v.get(row).copied().flatten().map(|x| x.to_string()),
            Self::Int64(v) => v.get(row).copied().flatten().map(|x| x.to_string()),
            Self::Utf8(v) => v.get(row).cloned().flatten(),
            Self::Date(v) => v.get(row).copied().flatten().map(|d| d.to_string()),
        }
    }

    fn hash_cell<H: Hasher>(&self, row: usize, state: &mut H) {
        match self {
            Self::Float64(v) => v.get(row).copied().flatten().map(f64::to_bits).hash(state),
            Self::Int64(v) => v.get(row).copied().flatten().hash(state),
            Self::Utf8(v) => v.get(row).and_then(Option::as_deref).hash(state),
            Self::Date(v) => v.get(row).copied().flatten().hash(state),
        }
    }

    fn cells_equal(&self, a: usize, b: usize) -> bool {
        match self {
            Self::Float64(v) => {
                v.get(a).copied().flatten().map(f64::to_bits)
                    == v.get(b).copied().flatten().map(f64::to_bits)
            }
            Self::Int64(v) => v.get(a) == v.get(b),
            Self::Utf8(v) => v.get(a) == v.get(b),
            Self::Date(v) => v.get(a) == v.get(b),
        }
    }

    fn data_type(&self) -> DataType {
        match self {
            Self::Float64(_) => DataType::Float64,
            Self::Int64(_) => DataType::Int64,
            Self::Utf8(_) => DataType::Utf8,
            Self::Date(_) => DataType::Date32,
        }
    }

    fn to_arrow(&self) -> ArrayRef {
        match self {
            Self::Float64(v) => Arc::new(Float64Array::from(v.clone())),
            Self::Int64(v) => Arc::new(Int64Array::from(v.clone())),
            Self::Utf8(v) => Arc::new(StringArray::from(v.clone())),
            Self::Date(v) => Arc::new(Date32Array::from(
                v.iter()
                    .map(|d| d.map(|d| d.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE))
                    .collect::<Vec<_>>(),
            )),
        }
    }

    fn empty_like(data_type: &DataType) -> Option<Self> {
        match data_type {
            DataType::Float64 => Some(Self::Float64(Vec::new())),
            DataType::Int64 => Some(Self::Int64(Vec::new())),
            DataType::Utf8 => Some(Self::Utf8(Vec::new())),
            DataType::Date32 => Some(Self::Date(Vec::new())),
            _ => None,
        }
    }

    fn extend_from_arrow(&mut self, array: &ArrayRef) -> Result<(), LoaderError> {
        match self {
            Self::Float64(v) => {
                let array = cast(array, &DataType::Float64)?;
                v.extend(array.as_primitive::<Float64Type>().iter());
            }
            Self::Int64(v) => {
                let array = cast(array, &DataType::Int64)?;
                v.extend(array.as_primitive::<Int64Type>().iter());
            }
            Self::Utf8(v) => {
                let array = cast(array, &DataType::Utf8)?;
                v.extend(array.as_string::<i32>().iter().map(|s| s.map(str::to_string)));
            }
            Self::Date(v) => {
                let array = cast(array, &DataType::Date32)?;
                v.extend(
                    array
                        .as_primitive::<Date32Type>()
                        .iter()
                        .map(|d| {
                            d.and_then(|d| {
                                NaiveDate::from_num_days_from_ce_opt(d + UNIX_EPOCH_DAYS_FROM_CE)
                            })
                        }),
                );
            }
        }
        Ok(())
    }
}

/// Maps a stored Arrow type onto the column kind it is read back as.
fn canonical_type(data_type: &DataType) -> Option<DataType> {
    match data_type {
        DataType::Float16 | DataType::Float32 | DataType::Float64 => Some(DataType::Float64),
        DataType::Boolean
        | DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64 => Some(DataType::Int64),
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View | DataType::Dictionary(_, _) => {
            Some(DataType::Utf8)
        }
        DataType::Date32 | DataType::Date64 | DataType::Timestamp(_, _) => Some(DataType::Date32),
        _ => None,
    }
}

/// Named, equally sized columns in a fixed order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    names: Vec<String>,
    columns: Vec<Column>,
}

impl Table {
    /// Creates an empty table.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            names: Vec::new(),
            columns: Vec::new(),
        }
    }

    /// Appends a column.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is already taken or the length differs
    /// from the existing columns.
    pub fn push_column(&mut self, name: impl Into<String>, column: Column) -> Result<(), LoaderError> {
        let name = name.into();

        if self.names.contains(&name) {
            return Err(LoaderError::DuplicateColumn(name));
        }

        if let Some(first) = self.columns.first()
            && first.len() != column.len()
        {
            return Err(LoaderError::ColumnLength {
                name,
                actual: column.len(),
                expected: first.len(),
            });
        }

        self.names.push(name);
        self.columns.push(column);
        Ok(())
    }

    /// Number of rows.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    /// Number of columns.
    #[must_use]
    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    /// Column names in order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Looks up a column by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.names
            .iter()
            .position(|n| n == name)
            .and_then(|idx| self.columns.get(idx))
    }

    /// Iterates `(name, column)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.names.iter().map(String::as_str).zip(&self.columns)
    }

    /// Hash of every cell of a row, consistent with [`Self::rows_equal`].
    #[must_use]
    pub fn row_hash(&self, row: usize) -> u64 {
        let mut hasher = DefaultHasher::new();
        for column in &self.columns {
            column.hash_cell(row, &mut hasher);
        }
        hasher.finish()
    }

    /// Full-row equality, treating two missing cells as equal.
    #[must_use]
    pub fn rows_equal(&self, a: usize, b: usize) -> bool {
        self.columns.iter().all(|column| column.cells_equal(a, b))
    }

    fn to_record_batch(&self) -> Result<RecordBatch, LoaderError> {
        let fields: Vec<Field> = self
            .iter()
            .map(|(name, column)| Field::new(name, column.data_type(), true))
            .collect();
        let arrays: Vec<ArrayRef> = self.columns.iter().map(Column::to_arrow).collect();

        Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?)
    }
}

/// Writes the table to a Parquet file, creating parent directories.
///
/// The writer properties are fixed so that identical tables produce
/// byte-identical files.
///
/// # Errors
///
/// Returns an error if the file cannot be created or encoded.
pub fn write_parquet(table: &Table, path: &Path) -> Result<(), LoaderError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(LoaderError::io(parent))?;
    }

    let batch = table.to_record_batch()?;
    let file = File::create(path).map_err(LoaderError::io(path))?;

    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .set_created_by(String::from("credit_decisioning loan_data"))
        .build();

    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))?;
    writer.write(&batch)?;
    writer.close()?;

    debug!(path = %path.display(), rows = table.n_rows(), "Wrote parquet table");

    Ok(())
}

/// Reads a Parquet file into a table.
///
/// Numeric columns are widened to `Float64`/`Int64`, text to `Utf8` and
/// dates to day precision.
///
/// # Errors
///
/// Returns [`LoaderError::ProcessedNotFound`] if the file does not exist, or
/// an error if it cannot be decoded.
pub fn read_parquet(path: &Path) -> Result<Table, LoaderError> {
    if !path.exists() {
        return Err(LoaderError::ProcessedNotFound(path.to_path_buf()));
    }

    let file = File::open(path).map_err(LoaderError::io(path))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let schema = Arc::clone(builder.schema());

    let mut columns = schema
        .fields()
        .iter()
        .map(|field| {
            canonical_type(field.data_type())
                .and_then(|data_type| Column::empty_like(&data_type))
                .ok_or_else(|| LoaderError::UnsupportedColumnType {
                    name: field.name().clone(),
                    data_type: field.data_type().to_string(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    for batch in builder.build()? {
        let batch = batch?;
        for (column, array) in columns.iter_mut().zip(batch.columns()) {
            column.extend_from_arrow(array)?;
        }
    }

    let mut table = Table::new();
    for (field, column) in schema.fields().iter().zip(columns) {
        table.push_column(field.name().clone(), column)?;
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> Table {
        let mut table = Table::new();
        table
            .push_column("amount", Column::Float64(vec![Some(1.5), None, Some(1.5)]))
            .expect("push amount");
        table
            .push_column("term", Column::Int64(vec![Some(36), Some(60), Some(36)]))
            .expect("push term");
        table
            .push_column(
                "grade",
                Column::Utf8(vec![Some("A".to_string()), None, Some("A".to_string())]),
            )
            .expect("push grade");
        table
            .push_column(
                "issued",
                Column::Date(vec![
                    NaiveDate::from_ymd_opt(2015, 12, 1),
                    NaiveDate::from_ymd_opt(1969, 7, 1),
                    NaiveDate::from_ymd_opt(2015, 12, 1),
                ]),
            )
            .expect("push issued");
        table
    }

    #[test]
    fn test_push_column_rejects_mismatched_length() {
        let mut table = sample_table();
        let result = table.push_column("short", Column::Int64(vec![Some(1)]));
        assert!(matches!(result, Err(LoaderError::ColumnLength { .. })));
    }

    #[test]
    fn test_push_column_rejects_duplicate_name() {
        let mut table = sample_table();
        let result = table.push_column("term", Column::Int64(vec![None, None, None]));
        assert!(matches!(result, Err(LoaderError::DuplicateColumn(_))));
    }

    #[test]
    fn test_row_equality_and_hash() {
        let table = sample_table();
        assert!(table.rows_equal(0, 2));
        assert!(!table.rows_equal(0, 1));
        assert_eq!(table.row_hash(0), table.row_hash(2));
    }

    #[test]
    fn test_parquet_roundtrip_preserves_types_and_nulls() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("table.parquet");
        let table = sample_table();

        write_parquet(&table, &path).expect("write");
        let loaded = read_parquet(&path).expect("read");

        assert_eq!(loaded, table);
    }

    #[test]
    fn test_read_missing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let result = read_parquet(&dir.path().join("absent.parquet"));
        assert!(matches!(result, Err(LoaderError::ProcessedNotFound(_))));
    }

    #[test]
    fn test_null_count_and_display() {
        let table = sample_table();
        let amount = table.column("amount").expect("amount column");
        assert_eq!(amount.null_count(), 1);
        assert_eq!(amount.display_value(0).as_deref(), Some("1.5"));
        assert_eq!(amount.display_value(1), None);
        assert!(amount.is_numeric());
        assert!(!table.column("grade").expect("grade").is_numeric());
    }
}
