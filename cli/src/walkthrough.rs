use std::io;

use anyhow::Result;
use clap::Args;
use stats::{
    report::{ReportConfig, Walkthrough},
    style::Palette,
};

use crate::{pca::PcaOptions, util::InputArgs};

/// Print every step of the analysis
#[derive(Debug, Args)]
#[command(version, about, long_about = None)]
pub struct WalkthroughArgs {
    #[command(flatten)]
    pca: PcaOptions,
    /// Decimals printed for matrices
    #[arg(short, long, default_value_t = 8)]
    precision: usize,
    /// Histogram bucket width
    #[arg(long, default_value_t = 0.25)]
    hist_width: f64,
    /// Number of samples in the data preview
    #[arg(long, default_value_t = 5)]
    tail: usize,
    #[command(flatten)]
    input: InputArgs,
}

pub fn walkthrough_main(args: WalkthroughArgs) -> Result<()> {
    let dataset = args.input.load()?;
    let groups = dataset.groups(false);
    let mut palette = Palette::iris();
    if !groups.iter().all(|g| palette.color(g).is_some()) {
        palette = Palette::for_labels(&groups);
    }
    let config = ReportConfig {
        pca: args.pca.config(),
        palette,
        hist_width: args.hist_width,
        tail: args.tail,
        precision: args.precision,
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    Walkthrough::new(&dataset, config).write(&mut out)
}
