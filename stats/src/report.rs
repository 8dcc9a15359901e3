//! The printed PCA walkthrough: every intermediate of the pipeline, from
//! the raw feature distributions to the projected samples.

use std::io::Write;

use anyhow::{Context, Result};
use log::info;

use crate::{
    covariance::{correlation, covariance},
    dataset::Dataset,
    hist::GroupedHist,
    linalg::{Matrix, SquareMatrix},
    pca::{check_unit_norm, eigenpairs, svd_eigenvalues, ExplainedVariance, Pca, PcaConfig, UNIT_NORM_TOLERANCE},
    standardize::Standardizer,
    style::Palette,
    table::Table,
};

const RULE: &str = "----------------------------------------------------";

#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub pca: PcaConfig,
    pub palette: Palette,
    /// Bucket width of the feature histograms, in feature units.
    pub hist_width: f64,
    /// Samples shown in the data preview.
    pub tail: usize,
    /// Decimals printed for matrices and tables.
    pub precision: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            pca: PcaConfig::default(),
            palette: Palette::iris(),
            hist_width: 0.25,
            tail: 5,
            precision: 8,
        }
    }
}

pub struct Walkthrough<'a> {
    dataset: &'a Dataset,
    config: ReportConfig,
}

impl<'a> Walkthrough<'a> {
    pub fn new(dataset: &'a Dataset, config: ReportConfig) -> Self {
        Self { dataset, config }
    }

    pub fn write<W: Write>(&self, out: &mut W) -> Result<()> {
        let p = self.config.precision;
        let features = &self.dataset.features;

        writeln!(out, "{}\n", self.dataset.tail(self.config.tail)?.to_text(p.min(2)))?;

        writeln!(out, "Distribution of the features per class")?;
        for feature in &self.dataset.feature_names {
            let hist = GroupedHist::new(self.dataset, feature, self.config.hist_width)
                .with_context(|| format!("Histogram of {}", feature))?;
            writeln!(out, "\n{}", hist.to_table()?.to_text(2))?;
        }

        let (_, standardized) = Standardizer::fit_transform(features)?;
        writeln!(out, "{}", RULE)?;
        writeln!(out, "Using standardized data")?;
        let cov = covariance(&standardized)?;
        writeln!(out, "\nCovariance matrix \n{:.*}", p, cov)?;
        write_eigen(out, &cov, p)?;
        writeln!(out, "{}", RULE)?;

        writeln!(out, "Eigendecomposition of the standardized data based on the correlation matrix:")?;
        write_eigen(out, &correlation(&standardized)?, p)?;
        writeln!(out, "{}", RULE)?;

        let raw_corr = correlation(features)?;
        writeln!(out, "Eigendecomposition of the raw data based on the correlation matrix:")?;
        writeln!(out, "\nCorrelation matrix \n{:.*}", p, raw_corr)?;
        write_eigen(out, &raw_corr, p)?;
        writeln!(out, "{}", RULE)?;

        let pca = Pca::fit(features, &self.config.pca)?;
        writeln!(
            out,
            "Covariance eigenvalues from the singular values of the standardized data \n{}",
            format_values(&svd_eigenvalues(&standardized)?, p),
        )?;
        check_unit_norm(&pca.pairs, UNIT_NORM_TOLERANCE)?;
        writeln!(out, "Everything ok!\n")?;

        writeln!(out, "Eigenvalues in descending order:")?;
        for pair in &pca.pairs {
            writeln!(out, "{:.*}", p, pair.value.abs())?;
        }

        writeln!(out, "\nExplained variance ({} matrix)", pca.config.basis)?;
        writeln!(out, "{}", explained_table(&pca.explained)?.to_text(2))?;

        writeln!(out, "\nMatrix W:\n{:.*}", p, pca.projection)?;

        writeln!(
            out,
            "\nSamples projected onto the first {} components",
            pca.config.components
        )?;
        writeln!(
            out,
            "{}",
            projection_table(self.dataset, &pca.projected, &self.config.palette)?.to_text(p.min(4))
        )?;
        info!("walkthrough written for {} samples", self.dataset.len());
        Ok(())
    }
}

fn write_eigen<W: Write>(out: &mut W, matrix: &SquareMatrix, precision: usize) -> Result<()> {
    let pairs = eigenpairs(matrix)?;
    let vectors: Vec<Vec<f64>> = pairs.iter().map(|p| p.vector.clone()).collect();
    let values: Vec<f64> = pairs.iter().map(|p| p.value).collect();
    writeln!(out, "\nEigenvectors \n{:.*}", precision, Matrix::from_columns(&vectors)?)?;
    writeln!(out, "\nEigenvalues \n{}", format_values(&values, precision))?;
    Ok(())
}

fn format_values(values: &[f64], precision: usize) -> String {
    let values: Vec<String> = values
        .iter()
        .map(|v| format!("{:.*}", precision, v))
        .collect();
    format!("[{}]", values.join(" "))
}

pub fn explained_table(explained: &ExplainedVariance) -> Result<Table> {
    let names = (1..=explained.individual.len())
        .map(|i| format!("PC {}", i))
        .collect();
    Table::new()
        .with_strings("component", names)?
        .with_numeric("explained %", explained.individual.clone())?
        .with_numeric("cumulative %", explained.cumulative.clone())
}

/// Projected coordinates with each sample's label and palette colour, ready
/// for a scatter plot.
pub fn projection_table(dataset: &Dataset, projected: &Matrix, palette: &Palette) -> Result<Table> {
    let mut table = Table::new();
    for i in 0..projected.width() {
        table = table.with_numeric(&format!("PC{}", i + 1), projected.get_col(i)?)?;
    }
    let colors = dataset
        .labels
        .iter()
        .map(|l| palette.color(l).map(|c| c.to_string()).unwrap_or_default())
        .collect();
    table
        .with_strings("class", dataset.labels.clone())?
        .with_strings("color", colors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{dataset::CsvFormat, style::Rgb};

    fn iris() -> Dataset {
        let data = include_str!("../../data/iris.data");
        Dataset::from_csv(data.as_bytes(), &CsvFormat::default()).unwrap()
    }

    #[test]
    fn test_walkthrough_sections() {
        let iris = iris();
        let walkthrough = Walkthrough::new(&iris, ReportConfig::default());

        let mut out = Vec::new();
        walkthrough.write(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        let sections = [
            "Distribution of the features per class",
            "Using standardized data",
            "Covariance matrix",
            "based on the correlation matrix",
            "Everything ok!",
            "Eigenvalues in descending order:",
            "Explained variance (covariance matrix)",
            "Matrix W:",
            "Samples projected onto the first 2 components",
        ];
        let mut last = 0;
        for section in sections {
            let at = text[last..]
                .find(section)
                .unwrap_or_else(|| panic!("missing {}", section));
            last += at;
        }
        assert!(text.contains("rgb(44, 160, 44)"));
    }

    #[test]
    fn test_projection_table() {
        let data = "1,2,a\n3,4,b\n";
        let dataset = Dataset::from_csv(data.as_bytes(), &CsvFormat::default()).unwrap();
        let projected = Matrix::new(vec![0.5, 1.5], 2, 1).unwrap();
        let palette = Palette::for_labels(&["a".to_string()]);

        let table = projection_table(&dataset, &projected, &palette).unwrap();

        assert_eq!(table.headers(), &["PC1", "class", "color"]);
        assert_eq!(table.numeric("PC1").unwrap(), &[0.5, 1.5]);
        let colors = table.strings("color").unwrap();
        assert_eq!(colors[0], Rgb(31, 119, 180).to_string());
        assert_eq!(colors[1], "");
    }

    #[test]
    fn test_explained_table() {
        let explained = ExplainedVariance {
            individual: vec![75.0, 25.0],
            cumulative: vec![75.0, 100.0],
        };

        let table = explained_table(&explained).unwrap();

        assert_eq!(
            table.to_csv(","),
            "component,explained %,cumulative %\nPC 1,75,75\nPC 2,25,100"
        );
    }
}
