use anyhow::Result;
use clap::{Args, ValueEnum};
use stats::{
    pca::{Basis, Pca, PcaConfig},
    report::projection_table,
    style::Palette,
};

use crate::util::InputArgs;

#[derive(Debug, ValueEnum, Clone, Copy, PartialEq)]
pub enum BasisArg {
    /// Covariance matrix of the standardized features
    Covariance,
    /// Correlation matrix of the standardized features
    Correlation,
}

impl From<BasisArg> for Basis {
    fn from(value: BasisArg) -> Self {
        match value {
            BasisArg::Covariance => Basis::Covariance,
            BasisArg::Correlation => Basis::Correlation,
        }
    }
}

/// Options shared by every command that runs the decomposition.
#[derive(Debug, Args)]
pub struct PcaOptions {
    /// Number of principal components to keep
    #[arg(short = 'k', long, default_value_t = 2)]
    pub components: usize,
    /// Matrix to decompose
    #[arg(value_enum, long, default_value_t = BasisArg::Covariance)]
    pub basis: BasisArg,
}

impl PcaOptions {
    pub fn config(&self) -> PcaConfig {
        PcaConfig {
            components: self.components,
            basis: self.basis.into(),
        }
    }
}

/// Principal component analysis
#[derive(Debug, Args)]
#[command(version, about, long_about = None)]
pub struct PcaArgs {
    #[command(flatten)]
    pub pca: PcaOptions,
    /// Output delimiter
    #[arg(long, default_value_t = String::from(","))]
    pub out_delim: String,
    #[command(flatten)]
    pub input: InputArgs,
}

pub fn pca_main(args: PcaArgs) -> Result<()> {
    let dataset = args.input.load()?;
    let pca = Pca::fit(&dataset.features, &args.pca.config())?;
    let palette = Palette::for_labels(&dataset.groups(false));
    let table = projection_table(&dataset, &pca.projected, &palette)?;
    println!("{}", table.to_csv(&args.out_delim));
    Ok(())
}
