use anyhow::{Context, Result};
use log::debug;
use thiserror::Error;

use crate::linalg::{is_degenerate_spread, Matrix, MatrixError};

/// Column wise z-score scaling. The standard deviation is the population
/// one (divided by n), so a transformed column has mean 0 and population
/// standard deviation exactly 1.
#[derive(Debug, Clone, PartialEq)]
pub struct Standardizer {
    means: Vec<f64>,
    stddevs: Vec<f64>,
}

impl Standardizer {
    pub fn fit(data: &Matrix) -> Result<Self> {
        if data.height() == 0 || data.width() == 0 {
            return Err(StandardizeError::Empty.into());
        }

        let means = data.mean_row();
        let mut stddevs = vec![0.0; data.width()];
        for row in data.rows() {
            for (j, value) in row.iter().enumerate() {
                let diff = value - means[j];
                stddevs[j] += diff * diff;
            }
        }
        let scales = data.max_abs_row();
        for (j, s) in stddevs.iter_mut().enumerate() {
            *s = (*s / data.height() as f64).sqrt();
            if is_degenerate_spread(*s, scales[j]) {
                return Err(StandardizeError::ZeroVariance(j).into());
            }
        }
        debug!("standardizer means {:?} stddevs {:?}", means, stddevs);

        Ok(Self { means, stddevs })
    }

    pub fn transform(&self, data: &Matrix) -> Result<Matrix> {
        if data.width() != self.means.len() {
            return Err(MatrixError::SizeMismatch).context("Standardize matrix");
        }
        let mut result = data.sub_row(&self.means)?;
        for i in 0..result.height() {
            for j in 0..result.width() {
                let value = result.get_unchecked(i, j) / self.stddevs[j];
                result.set_unchecked(i, j, value);
            }
        }
        Ok(result)
    }

    pub fn fit_transform(data: &Matrix) -> Result<(Self, Matrix)> {
        let standardizer = Self::fit(data)?;
        let result = standardizer.transform(data)?;
        Ok((standardizer, result))
    }

    pub fn means(&self) -> &[f64] {
        &self.means
    }

    pub fn stddevs(&self) -> &[f64] {
        &self.stddevs
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum StandardizeError {
    #[error("cannot standardize an empty matrix")]
    Empty,
    #[error("column {0} has zero variance")]
    ZeroVariance(usize),
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn column_mean_std(column: &[f64]) -> (f64, f64) {
        let n = column.len() as f64;
        let mean = column.iter().sum::<f64>() / n;
        let var = column.iter().map(|a| (a - mean) * (a - mean)).sum::<f64>() / n;
        (mean, var.sqrt())
    }

    #[test]
    fn test_standardize_one_to_five() {
        let data = Matrix::new(vec![1.0, 2.0, 3.0, 4.0, 5.0], 5, 1).unwrap();

        let (standardizer, result) = Standardizer::fit_transform(&data).unwrap();

        assert_eq!(standardizer.means(), &[3.0]);
        assert_abs_diff_eq!(standardizer.stddevs()[0], 2.0_f64.sqrt(), epsilon = 1e-12);
        let (mean, std) = column_mean_std(&result.get_col(0).unwrap());
        assert_abs_diff_eq!(mean, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(std, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(result.get_unchecked(0, 0), -2.0 / 2.0_f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_standardize_every_column() {
        let data = Matrix::new(vec![
            1.0, 100.0, -3.0,
            2.0, 250.0, -1.0,
            4.0, 175.0, 8.0,
            8.0, 90.0, 2.5,
        ], 4, 3).unwrap();

        let (_, result) = Standardizer::fit_transform(&data).unwrap();

        assert_eq!(result.height(), 4);
        assert_eq!(result.width(), 3);
        for j in 0..3 {
            let (mean, std) = column_mean_std(&result.get_col(j).unwrap());
            assert_abs_diff_eq!(mean, 0.0, epsilon = 1e-12);
            assert_abs_diff_eq!(std, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_zero_variance_column_is_rejected() {
        let data = Matrix::new(vec![
            1.0, 5.0,
            2.0, 5.0,
            3.0, 5.0,
        ], 3, 2).unwrap();

        let err: Option<StandardizeError> = Standardizer::fit(&data)
            .err()
            .map(|e| e.downcast().unwrap());
        assert_eq!(err, Some(StandardizeError::ZeroVariance(1)));
    }

    #[test]
    fn test_constant_column_with_rounding_is_rejected() {
        let data = Matrix::new(vec![
            1.0, 0.1,
            2.0, 0.1,
            3.0, 0.1,
        ], 3, 2).unwrap();

        let err: Option<StandardizeError> = Standardizer::fit(&data)
            .err()
            .map(|e| e.downcast().unwrap());
        assert_eq!(err, Some(StandardizeError::ZeroVariance(1)));
    }

    #[test]
    fn test_tiny_spread_is_kept() {
        let data = Matrix::new(vec![1e-20, 2e-20, 3e-20], 3, 1).unwrap();

        let (_, result) = Standardizer::fit_transform(&data).unwrap();

        let (mean, std) = column_mean_std(&result.get_col(0).unwrap());
        assert_abs_diff_eq!(mean, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(std, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_empty_is_rejected() {
        let err: Option<StandardizeError> = Standardizer::fit(&Matrix::zeros(0, 4))
            .err()
            .map(|e| e.downcast().unwrap());
        assert_eq!(err, Some(StandardizeError::Empty));
    }

    #[test]
    fn test_transform_width_mismatch() {
        let data = Matrix::new(vec![1.0, 2.0, 3.0], 3, 1).unwrap();
        let standardizer = Standardizer::fit(&data).unwrap();

        let err = standardizer.transform(&Matrix::zeros(3, 2)).unwrap_err();
        assert_eq!(err.downcast_ref::<MatrixError>(), Some(&MatrixError::SizeMismatch));
    }
}
