use std::fmt::Display;

use anyhow::Result;
use log::debug;
use nalgebra::{DMatrix, SymmetricEigen};
use thiserror::Error;

/// Relative tolerance on `|a_ij - a_ji|` before a matrix is treated as
/// not symmetric.
pub const SYMMETRY_TOLERANCE: f64 = 1e-8;

/// A column whose standard deviation is below this fraction of its largest
/// magnitude is constant up to rounding.
pub const SPREAD_TOLERANCE: f64 = 1e-12;

const EIGEN_MAX_ITER: usize = 10_000;

#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    // Row major. Everything downstream of the dataset is f64 so there is
    // no point in being generic over the element type.
    elements: Vec<f64>,
    width: usize,
    height: usize,
}

impl Matrix {
    pub fn new(elements: Vec<f64>, height: usize, width: usize) -> Result<Self> {
        if elements.len() != width * height {
            return Err(MatrixError::SizeMismatch.into());
        }

        Ok(Self {
            elements,
            height,
            width,
        })
    }

    pub fn zeros(height: usize, width: usize) -> Self {
        Self {
            elements: vec![0.0; height * width],
            height,
            width,
        }
    }

    pub fn identity(n: usize) -> Self {
        let mut matrix = Self::zeros(n, n);
        for i in 0..n {
            matrix.set_unchecked(i, i, 1.0);
        }
        matrix
    }

    /// Stack equal length columns side by side.
    pub fn from_columns(columns: &[Vec<f64>]) -> Result<Self> {
        let height = match columns.first() {
            Some(c) => c.len(),
            None => return Ok(Self::zeros(0, 0)),
        };
        let mut matrix = Self::zeros(height, columns.len());
        for (i, column) in columns.iter().enumerate() {
            if column.len() != height {
                return Err(MatrixError::SizeMismatch.into());
            }
            matrix.set_col(i, column)?;
        }
        Ok(matrix)
    }

    pub fn mul(&self, matrix: &Matrix) -> Result<Matrix> {
        if self.width != matrix.height {
            return Err(MatrixError::SizeMismatch.into());
        }

        let mut elements: Vec<f64> = Vec::with_capacity(self.height * matrix.width);
        for ij in 0..self.height * matrix.width {
            let column = ij % matrix.width;
            let row = ij / matrix.width;
            let mut value = 0.0;
            for i in 0..self.width {
                value += self.get_unchecked(row, i) * matrix.get_unchecked(i, column);
            }
            elements.push(value);
        }
        Ok(Matrix {
            elements,
            width: matrix.width,
            height: self.height,
        })
    }

    pub fn scalar_mul(&self, value: f64) -> Self {
        self.map(|a| a * value)
    }

    pub fn map<F: Fn(f64) -> f64>(&self, f: F) -> Self {
        Self {
            elements: self.elements.iter().map(|a| f(*a)).collect(),
            width: self.width,
            height: self.height,
        }
    }

    pub fn get_unchecked(&self, row: usize, col: usize) -> f64 {
        self.elements[row * self.width + col]
    }

    pub fn set_unchecked(&mut self, row: usize, col: usize, value: f64) {
        self.elements[row * self.width + col] = value;
    }

    pub fn get_col(&self, i: usize) -> Result<Vec<f64>, MatrixError> {
        if i >= self.width {
            return Err(MatrixError::OutOfBounds);
        }
        Ok((0..self.height).map(|j| self.get_unchecked(j, i)).collect())
    }

    pub fn set_col(&mut self, i: usize, column: &[f64]) -> Result<(), MatrixError> {
        if i >= self.width {
            return Err(MatrixError::OutOfBounds);
        }
        if column.len() != self.height {
            return Err(MatrixError::SizeMismatch);
        }
        for (j, value) in column.iter().enumerate() {
            self.set_unchecked(j, i, *value);
        }
        Ok(())
    }

    pub fn row(&self, i: usize) -> Result<&[f64], MatrixError> {
        if i >= self.height {
            return Err(MatrixError::OutOfBounds);
        }
        Ok(&self.elements[i * self.width..(i + 1) * self.width])
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        // chunks panics on 0
        self.elements.chunks(self.width.max(1)).take(self.height)
    }

    pub fn transpose(&self) -> Matrix {
        let mut elements: Vec<f64> = Vec::with_capacity(self.elements.len());
        for i in 0..self.width {
            for j in 0..self.height {
                elements.push(self.get_unchecked(j, i));
            }
        }
        Matrix {
            elements,
            width: self.height,
            height: self.width,
        }
    }

    pub fn round(&self, places: i32) -> Self {
        let shift = 10.0_f64.powi(places);
        self.map(|a| (a * shift).round() / shift)
    }

    pub fn mean_row(&self) -> Vec<f64> {
        let mut elements = vec![0.0; self.width];
        for row in self.rows() {
            for (j, value) in row.iter().enumerate() {
                elements[j] += value;
            }
        }
        elements.iter().map(|a| a / self.height as f64).collect()
    }

    /// Largest absolute value of each column.
    pub fn max_abs_row(&self) -> Vec<f64> {
        let mut elements = vec![0.0_f64; self.width];
        for row in self.rows() {
            for (j, value) in row.iter().enumerate() {
                elements[j] = elements[j].max(value.abs());
            }
        }
        elements
    }

    /// Subtract `row` from every row.
    pub fn sub_row(&self, row: &[f64]) -> Result<Self> {
        if row.len() != self.width {
            return Err(MatrixError::SizeMismatch.into());
        }
        let elements = self
            .elements
            .iter()
            .enumerate()
            .map(|(i, a)| a - row[i % self.width])
            .collect();
        Ok(Self {
            elements,
            width: self.width,
            height: self.height,
        })
    }

    pub fn is_finite(&self) -> bool {
        self.elements.iter().all(|a| a.is_finite())
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }
}

impl From<&Matrix> for DMatrix<f64> {
    fn from(value: &Matrix) -> Self {
        DMatrix::from_row_slice(value.height, value.width, &value.elements)
    }
}

impl From<&DMatrix<f64>> for Matrix {
    fn from(value: &DMatrix<f64>) -> Self {
        let (height, width) = value.shape();
        let mut elements = Vec::with_capacity(height * width);
        for i in 0..height {
            for j in 0..width {
                elements.push(value[(i, j)]);
            }
        }
        Matrix {
            elements,
            width,
            height,
        }
    }
}

/// Prints like numpy: one bracketed row per line. The formatter precision
/// sets the number of decimals, 8 by default.
impl Display for Matrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let precision = f.precision().unwrap_or(8);
        let width = self
            .elements
            .iter()
            .map(|a| format!("{:.*}", precision, a).len())
            .max()
            .unwrap_or(0);
        write!(f, "[")?;
        for (i, row) in self.rows().enumerate() {
            if i > 0 {
                write!(f, "\n ")?;
            }
            write!(f, "[")?;
            for (j, value) in row.iter().enumerate() {
                if j > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{:>width$.precision$}", value)?;
            }
            write!(f, "]")?;
        }
        write!(f, "]")
    }
}

/// Eigen decomposition of a symmetric matrix. `vectors` holds one unit
/// length eigenvector per column, in the same order as `values`.
#[derive(Debug, Clone, PartialEq)]
pub struct Eigen {
    pub values: Vec<f64>,
    pub vectors: Matrix,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SquareMatrix {
    matrix: Matrix,
    n: usize,
}

impl SquareMatrix {
    pub fn n(&self) -> usize {
        self.n
    }

    pub fn matrix(&self) -> &Matrix {
        &self.matrix
    }

    /// Largest `|a_ij - a_ji|` over the matrix.
    pub fn asymmetry(&self) -> f64 {
        let mut max: f64 = 0.0;
        for i in 0..self.n {
            for j in i + 1..self.n {
                let diff = self.matrix.get_unchecked(i, j) - self.matrix.get_unchecked(j, i);
                max = max.max(diff.abs());
            }
        }
        max
    }

    pub fn is_symmetric(&self, tolerance: f64) -> bool {
        let scale = self
            .matrix
            .elements
            .iter()
            .fold(1.0_f64, |acc, a| acc.max(a.abs()));
        self.asymmetry() <= tolerance * scale
    }

    /// `(A + A^T) / 2`
    pub fn symmetrize(&self) -> SquareMatrix {
        let mut matrix = self.matrix.clone();
        for i in 0..self.n {
            for j in i + 1..self.n {
                let mean =
                    (self.matrix.get_unchecked(i, j) + self.matrix.get_unchecked(j, i)) / 2.0;
                matrix.set_unchecked(i, j, mean);
                matrix.set_unchecked(j, i, mean);
            }
        }
        SquareMatrix { matrix, n: self.n }
    }

    /// Eigenvalues and unit eigenvectors, computed by nalgebra's symmetric
    /// eigen solver. Rounding noise in the off diagonal is tolerated by
    /// solving for the symmetric part; anything further from symmetric
    /// than [`SYMMETRY_TOLERANCE`] is rejected.
    pub fn eigen(&self) -> Result<Eigen> {
        if !self.matrix.is_finite() {
            return Err(MatrixError::NotFinite.into());
        }
        if !self.is_symmetric(SYMMETRY_TOLERANCE) {
            return Err(MatrixError::NotSymmetric(self.asymmetry()).into());
        }

        let symmetric: DMatrix<f64> = (&self.symmetrize().matrix).into();
        let eigen = SymmetricEigen::try_new(symmetric, f64::EPSILON, EIGEN_MAX_ITER)
            .ok_or(MatrixError::NoConvergence)?;

        let mut vectors = Matrix::from(&eigen.eigenvectors);
        for i in 0..vectors.width() {
            let column = vectors.get_col(i)?;
            let length = norm(&column);
            if length == 0.0 {
                return Err(MatrixError::NoConvergence.into());
            }
            vectors.set_col(i, &scalar_mul(1.0 / length, &column))?;
        }
        let values: Vec<f64> = eigen.eigenvalues.iter().copied().collect();
        debug!("eigenvalues of {}x{} matrix: {:?}", self.n, self.n, values);

        Ok(Eigen { values, vectors })
    }
}

impl TryFrom<Matrix> for SquareMatrix {
    type Error = MatrixError;
    fn try_from(value: Matrix) -> std::result::Result<Self, Self::Error> {
        if value.height != value.width {
            Err(MatrixError::NotSquare)
        } else {
            Ok(SquareMatrix {
                n: value.width,
                matrix: value,
            })
        }
    }
}

impl From<SquareMatrix> for Matrix {
    fn from(value: SquareMatrix) -> Self {
        value.matrix
    }
}

impl Display for SquareMatrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.matrix, f)
    }
}

/// Whether a column with standard deviation `stddev` and largest magnitude
/// `scale` carries no spread beyond rounding error.
pub fn is_degenerate_spread(stddev: f64, scale: f64) -> bool {
    !stddev.is_finite() || stddev <= SPREAD_TOLERANCE * scale
}

pub fn norm(u: &[f64]) -> f64 {
    u.iter().fold(0.0, |acc, a| acc + a * a).sqrt()
}

pub fn scalar_mul(a: f64, u: &[f64]) -> Vec<f64> {
    u.iter().map(|b| a * b).collect()
}

pub fn round(u: &[f64], places: i32) -> Vec<f64> {
    let shift = 10.0_f64.powi(places);
    u.iter().map(|a| (a * shift).round() / shift).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum MatrixError {
    #[error("matrix dimensions do not match")]
    SizeMismatch,
    #[error("index out of bounds")]
    OutOfBounds,
    #[error("matrix is not square")]
    NotSquare,
    #[error("matrix is not symmetric (max asymmetry {0})")]
    NotSymmetric(f64),
    #[error("matrix contains NaN or infinite values")]
    NotFinite,
    #[error("eigen decomposition did not converge")]
    NoConvergence,
}
