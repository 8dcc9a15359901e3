use std::io::Read;

use anyhow::{Context, Result};
use log::{debug, warn};
use thiserror::Error;

use crate::{agg::AggNumBuilder, linalg::Matrix, table::Table, util::sorted_insert};

pub const IRIS_FEATURES: [&str; 4] = ["sepal_len", "sepal_wid", "petal_len", "petal_wid"];

#[derive(Debug, Clone, PartialEq)]
pub struct CsvFormat {
    pub delimiter: u8,
    /// First row holds column names.
    pub has_headers: bool,
}

impl Default for CsvFormat {
    fn default() -> Self {
        Self {
            delimiter: b',',
            has_headers: false,
        }
    }
}

/// Samples of numeric features, each with a label. The label is the last
/// column of the source file.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub feature_names: Vec<String>,
    pub features: Matrix,
    pub labels: Vec<String>,
}

impl Dataset {
    pub fn from_csv<R: Read>(reader: R, format: &CsvFormat) -> Result<Self> {
        let context = "Parsing CSV to Dataset";
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(format.delimiter)
            .has_headers(format.has_headers)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Option<Vec<String>> = if format.has_headers {
            let headers = csv_reader.headers().context(context)?;
            Some(headers.iter().map(|h| h.to_string()).collect())
        } else {
            None
        };

        let mut width: Option<usize> = headers.as_ref().map(|h| h.len());
        let mut elements = Vec::new();
        let mut labels = Vec::new();
        for record in csv_reader.records() {
            let record = record.context(context)?;
            let line = record.position().map(|p| p.line() as usize).unwrap_or(0);
            if record.iter().all(|field| field.is_empty()) {
                warn!("dropping empty row on line {}", line);
                continue;
            }

            let expected = *width.get_or_insert(record.len());
            if expected < 2 {
                return Err(DatasetError::TooFewColumns(expected)).context(context);
            }
            if record.len() != expected {
                return Err(DatasetError::LineSizeConflict(line)).context(context);
            }

            for (col, field) in record.iter().take(expected - 1).enumerate() {
                let value = field
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or(DatasetError::NotNumeric { line, col })
                    .context(context)?;
                elements.push(value);
            }
            labels.push(record[expected - 1].to_string());
        }

        let width = match width {
            Some(w) if !labels.is_empty() => w,
            _ => return Err(DatasetError::NoData).context(context),
        };
        let feature_names = match headers {
            Some(h) => h[..width - 1].to_vec(),
            None if width - 1 == IRIS_FEATURES.len() => {
                IRIS_FEATURES.iter().map(|f| f.to_string()).collect()
            }
            None => (0..width - 1).map(|i| format!("feature_{}", i)).collect(),
        };
        let features = Matrix::new(elements, labels.len(), width - 1)?;
        debug!(
            "loaded {} samples with features {:?}",
            labels.len(),
            feature_names
        );

        Ok(Self {
            feature_names,
            features,
            labels,
        })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn feature_count(&self) -> usize {
        self.feature_names.len()
    }

    pub fn feature_index(&self, name: &str) -> Result<usize> {
        self.feature_names
            .iter()
            .position(|f| f == name)
            .ok_or_else(|| DatasetError::FeatureNotFound(name.to_string()).into())
    }

    pub fn column(&self, i: usize) -> Result<Vec<f64>> {
        Ok(self.features.get_col(i)?)
    }

    /// Distinct labels, in first seen order or sorted.
    pub fn groups(&self, sort: bool) -> Vec<String> {
        let mut groups: Vec<&str> = Vec::new();
        for label in &self.labels {
            if groups.contains(&label.as_str()) {
                continue;
            }
            if sort {
                sorted_insert(&mut groups, label.as_str());
            } else {
                groups.push(label);
            }
        }
        groups.into_iter().map(|g| g.to_string()).collect()
    }

    /// Feature `i` of the samples labelled `group`.
    pub fn group_column(&self, group: &str, i: usize) -> Result<Vec<f64>> {
        let column = self.column(i)?;
        let values: Vec<f64> = column
            .into_iter()
            .zip(self.labels.iter())
            .filter(|(_, label)| *label == group)
            .map(|(value, _)| value)
            .collect();
        if values.is_empty() {
            return Err(DatasetError::GroupNotFound(group.to_string()).into());
        }
        Ok(values)
    }

    /// The last `n` samples, features and label.
    pub fn tail(&self, n: usize) -> Result<Table> {
        let start = self.len().saturating_sub(n);
        let mut table = Table::new().with_numeric(
            "",
            (start..self.len()).map(|i| i as f64).collect(),
        )?;
        for (i, name) in self.feature_names.iter().enumerate() {
            table = table.with_numeric(name, self.column(i)?[start..].to_vec())?;
        }
        table.with_strings("class", self.labels[start..].to_vec())
    }

    /// min, max, mean, count and stddev of every feature, optionally per
    /// label.
    pub fn describe(&self, group_by_label: bool) -> Result<Table> {
        let groups: Vec<Option<String>> = if group_by_label {
            self.groups(false).into_iter().map(Some).collect()
        } else {
            vec![None]
        };

        let mut features = Vec::new();
        let mut labels = Vec::new();
        let mut aggs = Vec::new();
        for (i, name) in self.feature_names.iter().enumerate() {
            for group in &groups {
                let column = match group {
                    Some(g) => self.group_column(g, i)?,
                    None => self.column(i)?,
                };
                let mut builder = AggNumBuilder::new();
                column.iter().for_each(|v| builder.add_val(*v));
                aggs.push(builder.build()?);
                features.push(name.clone());
                labels.push(group.clone().unwrap_or_default());
            }
        }

        let mut table = Table::new().with_strings("feature", features)?;
        if group_by_label {
            table = table.with_strings("class", labels)?;
        }
        table
            .with_numeric("min", aggs.iter().map(|a| a.min).collect())?
            .with_numeric("max", aggs.iter().map(|a| a.max).collect())?
            .with_numeric("mean", aggs.iter().map(|a| a.mean).collect())?
            .with_numeric("count", aggs.iter().map(|a| a.count as f64).collect())?
            .with_numeric("stddev", aggs.iter().map(|a| a.stddev).collect())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DatasetError {
    #[error("no data rows")]
    NoData,
    #[error("need a label and at least one feature, found {0} columns")]
    TooFewColumns(usize),
    #[error("wrong number of columns on line {0}")]
    LineSizeConflict(usize),
    #[error("non numeric value on line {line}, column {col}")]
    NotNumeric { line: usize, col: usize },
    #[error("feature {0} not found")]
    FeatureNotFound(String),
    #[error("no samples labelled {0}")]
    GroupNotFound(String),
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    const SAMPLE: &str = "5.1,3.5,1.4,0.2,Iris-setosa
4.9,3.0,1.4,0.2,Iris-setosa
7.0,3.2,4.7,1.4,Iris-versicolor
6.3,3.3,6.0,2.5,Iris-virginica
,,,,
";

    fn parse_err(data: &str, format: &CsvFormat) -> Option<DatasetError> {
        Dataset::from_csv(data.as_bytes(), format)
            .err()
            .map(|e| e.downcast().unwrap())
    }

    #[test]
    fn test_from_csv_drops_empty_rows() {
        let dataset = Dataset::from_csv(SAMPLE.as_bytes(), &CsvFormat::default()).unwrap();

        assert_eq!(dataset.len(), 4);
        assert_eq!(dataset.feature_names, IRIS_FEATURES.to_vec());
        assert_eq!(dataset.features.row(2).unwrap(), &[7.0, 3.2, 4.7, 1.4]);
        assert_eq!(dataset.labels[3], "Iris-virginica");
    }

    #[test]
    fn test_from_csv_with_headers() {
        let data = "a;b;kind\n1;2;x\n3;4;y\n";
        let format = CsvFormat {
            delimiter: b';',
            has_headers: true,
        };

        let dataset = Dataset::from_csv(data.as_bytes(), &format).unwrap();

        assert_eq!(dataset.feature_names, vec!["a", "b"]);
        assert_eq!(dataset.column(1).unwrap(), vec![2.0, 4.0]);
    }

    #[test]
    fn test_generic_feature_names() {
        let data = "1,2,x\n3,4,y\n";

        let dataset = Dataset::from_csv(data.as_bytes(), &CsvFormat::default()).unwrap();

        assert_eq!(dataset.feature_names, vec!["feature_0", "feature_1"]);
    }

    #[test]
    fn test_line_size_conflict() {
        let data = "1,2,x\n3,4,5,y\n";

        let err = parse_err(data, &CsvFormat::default());

        assert_eq!(err, Some(DatasetError::LineSizeConflict(2)));
    }

    #[test]
    fn test_not_numeric() {
        let data = "1,2,x\n3,four,y\n";

        let err = parse_err(data, &CsvFormat::default());

        assert_eq!(err, Some(DatasetError::NotNumeric { line: 2, col: 1 }));

        let err = parse_err("NaN,1,a\n2,3,b\n", &CsvFormat::default());
        assert_eq!(err, Some(DatasetError::NotNumeric { line: 1, col: 0 }));

        let err = parse_err("1,2,a\n3,inf,b\n", &CsvFormat::default());
        assert_eq!(err, Some(DatasetError::NotNumeric { line: 2, col: 1 }));

        let err = parse_err("1,2,a\n-infinity,4,b\n", &CsvFormat::default());
        assert_eq!(err, Some(DatasetError::NotNumeric { line: 2, col: 0 }));
    }

    #[test]
    fn test_no_data() {
        assert_eq!(parse_err("", &CsvFormat::default()), Some(DatasetError::NoData));
        assert_eq!(parse_err(",,\n", &CsvFormat::default()), Some(DatasetError::NoData));
    }

    #[test]
    fn test_groups() {
        let data = "1,b\n2,a\n3,b\n4,c\n";
        let dataset = Dataset::from_csv(data.as_bytes(), &CsvFormat::default()).unwrap();

        assert_eq!(dataset.groups(false), vec!["b", "a", "c"]);
        assert_eq!(dataset.groups(true), vec!["a", "b", "c"]);
        assert_eq!(dataset.group_column("b", 0).unwrap(), vec![1.0, 3.0]);

        let err: Option<DatasetError> = dataset
            .group_column("d", 0)
            .err()
            .map(|e| e.downcast().unwrap());
        assert_eq!(err, Some(DatasetError::GroupNotFound("d".into())));
    }

    #[test]
    fn test_tail() {
        let dataset = Dataset::from_csv(SAMPLE.as_bytes(), &CsvFormat::default()).unwrap();

        let tail = dataset.tail(2).unwrap();

        assert_eq!(tail.len(), 2);
        assert_eq!(tail.numeric("").unwrap(), &[2.0, 3.0]);
        assert_eq!(tail.numeric("petal_len").unwrap(), &[4.7, 6.0]);
    }

    #[test]
    fn test_describe() {
        let data = "1,10,a\n3,10,a\n5,20,b\n";
        let dataset = Dataset::from_csv(data.as_bytes(), &CsvFormat::default()).unwrap();

        let all = dataset.describe(false).unwrap();
        assert_eq!(all.len(), 2);
        let mean = all.numeric("mean").unwrap();
        assert_abs_diff_eq!(mean[0], 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(mean[1], 40.0 / 3.0, epsilon = 1e-12);

        let grouped = dataset.describe(true).unwrap();
        assert_eq!(grouped.len(), 4);
        assert_eq!(grouped.strings("class").unwrap()[1], "b");
        assert_eq!(grouped.numeric("count").unwrap(), &[2.0, 1.0, 2.0, 1.0]);
        assert_abs_diff_eq!(grouped.numeric("stddev").unwrap()[0], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_bundled_iris() {
        let data = include_str!("../../data/iris.data");

        let dataset = Dataset::from_csv(data.as_bytes(), &CsvFormat::default()).unwrap();

        assert_eq!(dataset.len(), 150);
        assert_eq!(dataset.feature_count(), 4);
        assert_eq!(
            dataset.groups(false),
            vec!["Iris-setosa", "Iris-versicolor", "Iris-virginica"]
        );
    }
}
