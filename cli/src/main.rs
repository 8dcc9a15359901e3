mod describe;
mod hist;
mod pca;
mod util;
mod walkthrough;

use clap::{Parser, Subcommand};
use describe::DescribeArgs;
use hist::HistArgs;
use log::error;
use pca::PcaArgs;
use walkthrough::WalkthroughArgs;

/// PCA walkthrough of a labelled numeric dataset
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    tool: Tool,
}

#[derive(Subcommand, Debug)]
enum Tool {
    /// Print every step of the analysis
    Walkthrough(WalkthroughArgs),

    /// Principal component analysis
    #[command(name = "pca")]
    PCA(PcaArgs),

    /// Aggregate each feature
    Describe(DescribeArgs),

    /// Histogram of a feature per class
    Hist(HistArgs),
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let result = match cli.tool {
        Tool::Walkthrough(args) => walkthrough::walkthrough_main(args),
        Tool::PCA(args) => pca::pca_main(args),
        Tool::Describe(args) => describe::describe_main(args),
        Tool::Hist(args) => hist::hist_main(args),
    };
    if let Err(e) = result {
        error!("{:?}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
