use anyhow::Result;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq)]
enum ColType {
    Numeric,
    String,
}

/// Column store every report table is rendered through.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    headers: Vec<String>,
    col_types: Vec<ColType>,
    numerics: Vec<Vec<f64>>,
    strings: Vec<Vec<String>>,
    col_to_numeric: Vec<Option<usize>>,
    col_to_string: Vec<Option<usize>>,
    len: usize,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_numeric(mut self, header: &str, column: Vec<f64>) -> Result<Self> {
        self.check_len(column.len())?;
        self.headers.push(header.to_string());
        self.col_types.push(ColType::Numeric);
        self.col_to_numeric.push(Some(self.numerics.len()));
        self.col_to_string.push(None);
        self.numerics.push(column);
        Ok(self)
    }

    pub fn with_strings(mut self, header: &str, column: Vec<String>) -> Result<Self> {
        self.check_len(column.len())?;
        self.headers.push(header.to_string());
        self.col_types.push(ColType::String);
        self.col_to_numeric.push(None);
        self.col_to_string.push(Some(self.strings.len()));
        self.strings.push(column);
        Ok(self)
    }

    fn check_len(&mut self, len: usize) -> Result<(), TableError> {
        if self.headers.is_empty() {
            self.len = len;
            Ok(())
        } else if self.len != len {
            Err(TableError::ColumnLength {
                expected: self.len,
                found: len,
            })
        } else {
            Ok(())
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn numeric(&self, column: &str) -> Result<&[f64]> {
        let i = self
            .headers
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| TableError::ColumnNotFound(column.to_string()))?;
        match self.col_to_numeric[i] {
            Some(n) => Ok(&self.numerics[n]),
            None => Err(TableError::ColumnNotNumeric(column.to_string()).into()),
        }
    }

    pub fn strings(&self, column: &str) -> Result<&[String]> {
        let i = self
            .headers
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| TableError::ColumnNotFound(column.to_string()))?;
        match self.col_to_string[i] {
            Some(s) => Ok(&self.strings[s]),
            None => Err(TableError::ColumnNotString(column.to_string()).into()),
        }
    }

    fn cell(&self, row: usize, col: usize, precision: Option<usize>) -> String {
        // col_types and col_to_X are pushed together
        match self.col_types[col] {
            ColType::Numeric => {
                let value = self.numerics[self.col_to_numeric[col].unwrap_or_default()][row];
                match precision {
                    Some(p) => format!("{:.*}", p, value),
                    None => value.to_string(),
                }
            }
            ColType::String => {
                self.strings[self.col_to_string[col].unwrap_or_default()][row].clone()
            }
        }
    }

    pub fn to_csv(&self, delimiter: &str) -> String {
        let mut lines = Vec::with_capacity(self.len + 1);
        lines.push(self.headers.join(delimiter));
        for i in 0..self.len {
            let line: Vec<String> = (0..self.headers.len())
                .map(|j| self.cell(i, j, None))
                .collect();
            lines.push(line.join(delimiter));
        }
        lines.join("\n")
    }

    /// Right aligned columns for printing, numerics at fixed precision.
    pub fn to_text(&self, precision: usize) -> String {
        let mut rows: Vec<Vec<String>> = Vec::with_capacity(self.len + 1);
        rows.push(self.headers.clone());
        for i in 0..self.len {
            rows.push(
                (0..self.headers.len())
                    .map(|j| self.cell(i, j, Some(precision)))
                    .collect(),
            );
        }
        let widths: Vec<usize> = (0..self.headers.len())
            .map(|j| rows.iter().map(|r| r[j].len()).max().unwrap_or(0))
            .collect();
        rows.iter()
            .map(|r| {
                r.iter()
                    .zip(widths.iter())
                    .map(|(cell, w)| format!("{:>w$}", cell, w = w))
                    .collect::<Vec<String>>()
                    .join("  ")
            })
            .collect::<Vec<String>>()
            .join("\n")
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TableError {
    #[error("column {0} not found")]
    ColumnNotFound(String),
    #[error("column {0} is not numeric")]
    ColumnNotNumeric(String),
    #[error("column {0} is not a string column")]
    ColumnNotString(String),
    #[error("column has {found} rows, table has {expected}")]
    ColumnLength { expected: usize, found: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Table {
        Table::new()
            .with_strings("class", vec!["a".into(), "b".into()])
            .unwrap()
            .with_numeric("x", vec![1.5, -2.0])
            .unwrap()
    }

    #[test]
    fn test_to_csv() {
        let result = table().to_csv(",");

        assert_eq!(result, "class,x\na,1.5\nb,-2");
    }

    #[test]
    fn test_to_text() {
        let result = table().to_text(2);

        let expected = "class      x\n    a   1.50\n    b  -2.00";
        assert_eq!(result, expected);
    }

    #[test]
    fn test_column_lookup() {
        let table = table();

        assert_eq!(table.numeric("x").unwrap(), &[1.5, -2.0]);
        assert_eq!(table.strings("class").unwrap(), &["a".to_string(), "b".to_string()]);

        let err: Option<TableError> = table.numeric("class").err().map(|e| e.downcast().unwrap());
        assert_eq!(err, Some(TableError::ColumnNotNumeric("class".into())));
        let err: Option<TableError> = table.numeric("y").err().map(|e| e.downcast().unwrap());
        assert_eq!(err, Some(TableError::ColumnNotFound("y".into())));
    }

    #[test]
    fn test_column_length_mismatch() {
        let err: Option<TableError> = table()
            .with_numeric("y", vec![1.0])
            .err()
            .map(|e| e.downcast().unwrap());

        assert_eq!(
            err,
            Some(TableError::ColumnLength {
                expected: 2,
                found: 1
            })
        );
    }
}
