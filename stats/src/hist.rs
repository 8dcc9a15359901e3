use anyhow::Result;
use thiserror::Error;

use crate::{dataset::Dataset, table::Table};

/// Upper bound on the number of buckets a single histogram may allocate.
pub const MAX_BUCKETS: usize = 10_000;

/// Fixed width histogram. Bucket `i` is centred on `min + i * width`;
/// values outside `[min, max]` are clamped into the end buckets.
#[derive(Debug, PartialEq)]
pub struct Hist {
    pub buckets: Vec<f64>,
    pub counts: Vec<f64>,
    pub len: usize,
}

impl Hist {
    pub fn new(column: &[f64], width: f64, min: Option<f64>, max: Option<f64>) -> Result<Self> {
        if width.is_nan() || width.is_infinite() || width <= 0.0 {
            return Err(HistError::InvalidWidth(width).into());
        }
        if column.is_empty() {
            return Ok(Hist {
                buckets: Vec::new(),
                counts: Vec::new(),
                len: 0,
            });
        }

        let (auto_min, auto_max) = min_max(column);
        let min = min.unwrap_or(auto_min);
        let max = max.unwrap_or(auto_max);
        if min > max {
            return Err(HistError::InvalidRange { min, max }.into());
        }
        let buckets = bucket_starts(min, max, width)?;
        let mut counts = vec![0.0; buckets.len()];
        for n in column {
            counts[bucket_index(*n, min, max, width)] += 1.0;
        }

        Ok(Self {
            len: buckets.len(),
            buckets,
            counts,
        })
    }
}

/// Histograms of one feature, one count series per label over shared
/// buckets, for overlaying the classes.
#[derive(Debug, PartialEq)]
pub struct GroupedHist {
    pub feature: String,
    pub buckets: Vec<f64>,
    pub groups: Vec<String>,
    /// `counts[g][b]` samples of `groups[g]` in bucket `b`.
    pub counts: Vec<Vec<f64>>,
}

impl GroupedHist {
    pub fn new(dataset: &Dataset, feature: &str, width: f64) -> Result<Self> {
        let i = dataset.feature_index(feature)?;
        let column = dataset.column(i)?;
        let (min, max) = min_max(&column);

        let mut buckets = Vec::new();
        let mut groups = Vec::new();
        let mut counts = Vec::new();
        for group in dataset.groups(false) {
            let hist = Hist::new(&dataset.group_column(&group, i)?, width, Some(min), Some(max))?;
            buckets = hist.buckets;
            counts.push(hist.counts);
            groups.push(group);
        }

        Ok(Self {
            feature: feature.to_string(),
            buckets,
            groups,
            counts,
        })
    }

    pub fn to_table(&self) -> Result<Table> {
        let mut table = Table::new().with_numeric(&self.feature, self.buckets.clone())?;
        for (group, counts) in self.groups.iter().zip(self.counts.iter()) {
            table = table.with_numeric(group, counts.clone())?;
        }
        Ok(table)
    }
}

fn min_max(column: &[f64]) -> (f64, f64) {
    column
        .iter()
        .fold((f64::MAX, f64::MIN), |(min, max), n| (min.min(*n), max.max(*n)))
}

fn bucket_starts(min: f64, max: f64, width: f64) -> Result<Vec<f64>, HistError> {
    let steps = ((max - min) / width).ceil();
    if steps.is_nan() || steps >= MAX_BUCKETS as f64 {
        return Err(HistError::TooManyBuckets { min, max, width });
    }
    let steps = steps as usize;
    Ok((0..steps + 1).map(|i| i as f64 * width + min).collect())
}

fn bucket_index(n: f64, min: f64, max: f64, width: f64) -> usize {
    let n = n.clamp(min, max);
    ((n - min) / width + 0.5).floor() as usize
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum HistError {
    #[error("bucket width must be positive, got {0}")]
    InvalidWidth(f64),
    #[error("min {min} is larger than max {max}")]
    InvalidRange { min: f64, max: f64 },
    #[error("width {width} over [{min}, {max}] needs more than {} buckets", MAX_BUCKETS)]
    TooManyBuckets { min: f64, max: f64, width: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::CsvFormat;

    #[test]
    fn test_hist_given_min_max() {
        let column = vec![-1.0, 2.0, 2.1, 4.0];

        let hist = Hist::new(&column, 1.0, Some(-2.0), Some(2.0)).unwrap();

        let expected = Hist {
            buckets: vec![-2.0, -1.0, 0.0, 1.0, 2.0],
            counts: vec![0.0, 1.0, 0.0, 0.0, 3.0],
            len: 5,
        };
        assert_eq!(hist, expected);
    }

    #[test]
    fn test_hist_no_min_max() {
        let column = vec![-1.0, 2.0, 2.1, 4.0];

        let hist = Hist::new(&column, 2.0, None, None).unwrap();

        let expected = Hist {
            buckets: vec![-1.0, 1.0, 3.0, 5.0],
            counts: vec![1.0, 0.0, 2.0, 1.0],
            len: 4,
        };
        assert_eq!(hist, expected);
    }

    #[test]
    fn test_hist_bad_width() {
        for width in [0.0, -1.0, f64::NAN] {
            let err = Hist::new(&[1.0], width, None, None).unwrap_err();
            assert!(err.downcast_ref::<HistError>().is_some());
        }
    }

    #[test]
    fn test_hist_too_many_buckets() {
        let err: Option<HistError> = Hist::new(&[1.0, 6.9], 1e-12, None, None)
            .err()
            .map(|e| e.downcast().unwrap());
        assert_eq!(
            err,
            Some(HistError::TooManyBuckets {
                min: 1.0,
                max: 6.9,
                width: 1e-12
            })
        );

        let hist = Hist::new(&[0.0, 1.0], 1.0 / 8192.0, None, None).unwrap();
        assert_eq!(hist.len, 8193);
    }

    #[test]
    fn test_grouped_hist() {
        let data = "1.0,a\n2.0,b\n3.0,a\n3.0,b\n";
        let dataset = Dataset::from_csv(data.as_bytes(), &CsvFormat::default()).unwrap();

        let hist = GroupedHist::new(&dataset, "feature_0", 1.0).unwrap();

        assert_eq!(hist.buckets, vec![1.0, 2.0, 3.0]);
        assert_eq!(hist.groups, vec!["a", "b"]);
        assert_eq!(hist.counts, vec![vec![1.0, 0.0, 1.0], vec![0.0, 1.0, 1.0]]);

        let table = hist.to_table().unwrap();
        assert_eq!(table.to_csv(","), "feature_0,a,b\n1,1,0\n2,0,1\n3,1,1");
    }

    #[test]
    fn test_grouped_hist_unknown_feature() {
        let data = "1.0,a\n2.0,b\n";
        let dataset = Dataset::from_csv(data.as_bytes(), &CsvFormat::default()).unwrap();

        assert!(GroupedHist::new(&dataset, "petal_len", 1.0).is_err());
    }
}
