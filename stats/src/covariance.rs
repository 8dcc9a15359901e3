use anyhow::{Context, Result};
use thiserror::Error;

use crate::linalg::{is_degenerate_spread, Matrix, SquareMatrix};

/// Sample covariance of the columns of `data`, using the unbiased (n - 1)
/// estimator.
pub fn covariance(data: &Matrix) -> Result<SquareMatrix> {
    if data.height() < 2 {
        return Err(CovarianceError::TooFewSamples(data.height()).into());
    }
    let centered = data.sub_row(&data.mean_row())?;
    let cov = centered
        .transpose()
        .mul(&centered)
        .context("Covariance")?
        .scalar_mul(1.0 / (data.height() - 1) as f64);
    Ok(cov.try_into()?)
}

/// Pearson correlation: the covariance divided by the outer product of the
/// column standard deviations.
pub fn correlation(data: &Matrix) -> Result<SquareMatrix> {
    let cov: Matrix = covariance(data)?.into();
    let n = cov.width();
    let stddevs: Vec<f64> = (0..n).map(|i| cov.get_unchecked(i, i).sqrt()).collect();
    let scales = data.max_abs_row();
    if let Some(i) = (0..n).find(|&i| is_degenerate_spread(stddevs[i], scales[i])) {
        return Err(CovarianceError::ZeroVariance(i).into());
    }

    let mut corr = cov;
    for i in 0..n {
        for j in 0..n {
            let value = corr.get_unchecked(i, j) / (stddevs[i] * stddevs[j]);
            corr.set_unchecked(i, j, value);
        }
        // exact ones on the diagonal, whatever the rounding
        corr.set_unchecked(i, i, 1.0);
    }
    Ok(corr.try_into()?)
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CovarianceError {
    #[error("need at least 2 samples, got {0}")]
    TooFewSamples(usize),
    #[error("column {0} has zero variance")]
    ZeroVariance(usize),
}
