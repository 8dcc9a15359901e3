//! Principal component analysis by eigen decomposition of the covariance
//! or correlation matrix of standardized data.

use std::{fmt::Display, str::FromStr};

use anyhow::{Context, Result};
use log::{debug, info};
use nalgebra::DMatrix;
use thiserror::Error;

use crate::{
    covariance::{correlation, covariance, CovarianceError},
    linalg::{norm, Matrix, MatrixError, SquareMatrix},
    standardize::Standardizer,
};

pub const UNIT_NORM_TOLERANCE: f64 = 1e-6;

/// Which matrix of the standardized data gets decomposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Basis {
    #[default]
    Covariance,
    Correlation,
}

impl Basis {
    pub fn matrix(&self, data: &Matrix) -> Result<SquareMatrix> {
        match self {
            Basis::Covariance => covariance(data),
            Basis::Correlation => correlation(data),
        }
    }
}

impl Display for Basis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Basis::Covariance => write!(f, "covariance"),
            Basis::Correlation => write!(f, "correlation"),
        }
    }
}

impl FromStr for Basis {
    type Err = PcaError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "covariance" | "cov" => Ok(Basis::Covariance),
            "correlation" | "corr" => Ok(Basis::Correlation),
            _ => Err(PcaError::UnknownBasis(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PcaConfig {
    /// Number of components kept in the projection.
    pub components: usize,
    pub basis: Basis,
}

impl Default for PcaConfig {
    fn default() -> Self {
        Self {
            components: 2,
            basis: Basis::Covariance,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Eigenpair {
    pub value: f64,
    pub vector: Vec<f64>,
}

/// Percent of the total variance per ranked component, and the running sum.
#[derive(Debug, Clone, PartialEq)]
pub struct ExplainedVariance {
    pub individual: Vec<f64>,
    pub cumulative: Vec<f64>,
}

/// Eigenpairs of `matrix`, in the order the solver returns them.
pub fn eigenpairs(matrix: &SquareMatrix) -> Result<Vec<Eigenpair>> {
    let eigen = matrix.eigen().context("Eigen decomposition")?;
    let mut pairs = Vec::with_capacity(eigen.values.len());
    for (i, value) in eigen.values.iter().enumerate() {
        pairs.push(Eigenpair {
            value: *value,
            vector: eigen.vectors.get_col(i)?,
        });
    }
    Ok(pairs)
}

/// Sort by descending eigenvalue magnitude. The sort is stable: pairs
/// with the same magnitude stay in solver order.
pub fn rank(mut pairs: Vec<Eigenpair>) -> Vec<Eigenpair> {
    pairs.sort_by(|a, b| b.value.abs().total_cmp(&a.value.abs()));
    pairs
}

pub fn check_unit_norm(pairs: &[Eigenpair], tolerance: f64) -> Result<()> {
    for (i, pair) in pairs.iter().enumerate() {
        let length = norm(&pair.vector);
        if (length - 1.0).abs() > tolerance {
            return Err(PcaError::NotUnitNorm {
                index: i,
                norm: length,
            }
            .into());
        }
    }
    Ok(())
}

pub fn explained_variance(pairs: &[Eigenpair]) -> ExplainedVariance {
    let total: f64 = pairs.iter().map(|p| p.value).sum();
    let individual: Vec<f64> = pairs.iter().map(|p| p.value / total * 100.0).collect();
    let cumulative = individual
        .iter()
        .scan(0.0, |acc, v| {
            *acc += v;
            Some(*acc)
        })
        .collect();
    ExplainedVariance {
        individual,
        cumulative,
    }
}

/// The m x k matrix W whose columns are the eigenvectors of the first `k`
/// pairs.
pub fn projection_matrix(pairs: &[Eigenpair], k: usize) -> Result<Matrix> {
    if k == 0 || k > pairs.len() {
        return Err(PcaError::InvalidComponents {
            requested: k,
            available: pairs.len(),
        }
        .into());
    }
    let columns: Vec<Vec<f64>> = pairs[..k].iter().map(|p| p.vector.clone()).collect();
    Matrix::from_columns(&columns).context("Stack eigenvectors")
}

/// `Y = X W`
pub fn project(data: &Matrix, projection: &Matrix) -> Result<Matrix> {
    data.mul(projection).context("Project onto principal components")
}

/// Eigenvalues of the covariance matrix recovered from the singular values
/// of the (centered) data: `s^2 / (n - 1)`, in descending order.
pub fn svd_eigenvalues(data: &Matrix) -> Result<Vec<f64>> {
    if data.height() < 2 {
        return Err(CovarianceError::TooFewSamples(data.height()).into());
    }
    let centered = data.sub_row(&data.mean_row())?;
    let d: DMatrix<f64> = (&centered).into();
    let svd = d
        .try_svd(false, false, f64::EPSILON, 10_000)
        .ok_or(MatrixError::NoConvergence)?;
    let scale = (data.height() - 1) as f64;
    let mut values: Vec<f64> = svd.singular_values.iter().map(|s| s * s / scale).collect();
    values.sort_by(|a, b| b.total_cmp(a));
    Ok(values)
}

/// Every intermediate of one PCA run.
#[derive(Debug, Clone)]
pub struct Pca {
    pub config: PcaConfig,
    pub standardizer: Standardizer,
    pub standardized: Matrix,
    pub matrix: SquareMatrix,
    /// Ranked by descending eigenvalue magnitude.
    pub pairs: Vec<Eigenpair>,
    pub explained: ExplainedVariance,
    pub projection: Matrix,
    pub projected: Matrix,
}

impl Pca {
    pub fn fit(data: &Matrix, config: &PcaConfig) -> Result<Self> {
        if config.components == 0 || config.components > data.width() {
            return Err(PcaError::InvalidComponents {
                requested: config.components,
                available: data.width(),
            }
            .into());
        }

        let (standardizer, standardized) =
            Standardizer::fit_transform(data).context("Standardize features")?;
        let matrix = config.basis.matrix(&standardized)?;
        debug!("{} matrix\n{}", config.basis, matrix);

        let pairs = rank(eigenpairs(&matrix)?);
        check_unit_norm(&pairs, UNIT_NORM_TOLERANCE)?;
        let explained = explained_variance(&pairs);
        let projection = projection_matrix(&pairs, config.components)?;
        let projected = project(&standardized, &projection)?;
        info!(
            "projected {}x{} onto {} components of the {} matrix, {:.2}% of variance kept",
            data.height(),
            data.width(),
            config.components,
            config.basis,
            explained.cumulative[config.components - 1],
        );

        Ok(Self {
            config: config.clone(),
            standardizer,
            standardized,
            matrix,
            pairs,
            explained,
            projection,
            projected,
        })
    }

    /// Project new samples with the fitted scaling and components.
    pub fn transform(&self, data: &Matrix) -> Result<Matrix> {
        let standardized = self.standardizer.transform(data)?;
        project(&standardized, &self.projection)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PcaError {
    #[error("cannot keep {requested} components out of {available}")]
    InvalidComponents { requested: usize, available: usize },
    #[error("eigenvector {index} has norm {norm}, expected 1")]
    NotUnitNorm { index: usize, norm: f64 },
    #[error("unknown basis {0}, expected covariance or correlation")]
    UnknownBasis(String),
}
