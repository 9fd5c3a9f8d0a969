use crate::EncodeError;

/// Column-major numeric feature matrix. Missing numeric values are NaN.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureMatrix {
    names: Vec<String>,
    columns: Vec<Vec<f64>>,
    n_rows: usize,
}

impl FeatureMatrix {
    /// Creates an empty matrix with a fixed row count.
    #[must_use]
    pub const fn with_rows(n_rows: usize) -> Self {
        Self {
            names: Vec::new(),
            columns: Vec::new(),
            n_rows,
        }
    }

    /// Builds a matrix from named columns.
    ///
    /// # Errors
    ///
    /// Returns an error if a column length differs from `n_rows`.
    pub fn from_columns(
        n_rows: usize,
        columns: impl IntoIterator<Item = (String, Vec<f64>)>,
    ) -> Result<Self, EncodeError> {
        let mut matrix = Self::with_rows(n_rows);
        for (name, values) in columns {
            matrix.push_column(name, values)?;
        }
        Ok(matrix)
    }

    /// Appends a column.
    ///
    /// # Errors
    ///
    /// Returns an error if the column length differs from the row count.
    pub fn push_column(&mut self, name: String, values: Vec<f64>) -> Result<(), EncodeError> {
        if values.len() != self.n_rows {
            return Err(EncodeError::ColumnLength {
                name,
                actual: values.len(),
                expected: self.n_rows,
            });
        }
        self.names.push(name);
        self.columns.push(values);
        Ok(())
    }

    #[must_use]
    pub const fn n_rows(&self) -> usize {
        self.n_rows
    }

    #[must_use]
    pub fn n_features(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Values of one feature across all rows.
    #[must_use]
    pub fn column(&self, feature: usize) -> &[f64] {
        self.columns.get(feature).map_or(&[], Vec::as_slice)
    }

    /// Copies one row into `out`, reusing its allocation.
    pub fn row_into(&self, row: usize, out: &mut Vec<f64>) {
        out.clear();
        out.extend(
            self.columns
                .iter()
                .map(|column| column.get(row).copied().unwrap_or(f64::NAN)),
        );
    }

    /// Keeps only the given rows, in the given order.
    #[must_use]
    pub fn select_rows(&self, rows: &[usize]) -> Self {
        let columns = self
            .columns
            .iter()
            .map(|column| {
                rows.iter()
                    .map(|&row| column.get(row).copied().unwrap_or(f64::NAN))
                    .collect()
            })
            .collect();

        Self {
            names: self.names.clone(),
            columns,
            n_rows: rows.len(),
        }
    }
}
