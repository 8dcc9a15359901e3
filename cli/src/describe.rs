use anyhow::Result;
use clap::Args;

use crate::util::InputArgs;

/// Per feature min, max, mean, count and standard deviation
#[derive(Debug, Args)]
#[command(version, about, long_about = None)]
pub struct DescribeArgs {
    /// One row per feature and class
    #[arg(short, long)]
    group_by_label: bool,
    /// Output delimiter
    #[arg(long, default_value_t = String::from(","))]
    out_delim: String,
    #[command(flatten)]
    input: InputArgs,
}

pub fn describe_main(args: DescribeArgs) -> Result<()> {
    let dataset = args.input.load()?;
    let table = dataset.describe(args.group_by_label)?;
    println!("{}", table.to_csv(&args.out_delim));
    Ok(())
}
