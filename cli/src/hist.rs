use anyhow::Result;
use clap::Args;
use stats::hist::GroupedHist;

use crate::util::InputArgs;

/// Histogram of one feature, one count column per class
#[derive(Debug, Args)]
#[command(version, about, long_about = None)]
pub struct HistArgs {
    /// The feature to bucket
    #[arg(short, long)]
    column: String,
    /// The width of each histogram bucket
    #[arg(short, long, default_value_t = 0.25)]
    width: f64,
    /// Output delimiter
    #[arg(long, default_value_t = String::from(","))]
    out_delim: String,
    #[command(flatten)]
    input: InputArgs,
}

pub fn hist_main(args: HistArgs) -> Result<()> {
    let dataset = args.input.load()?;
    let hist = GroupedHist::new(&dataset, &args.column, args.width)?;
    println!("{}", hist.to_table()?.to_csv(&args.out_delim));
    Ok(())
}
