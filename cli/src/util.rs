use std::{
    fs::OpenOptions,
    io::{self, BufRead, BufReader},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use log::debug;
use stats::dataset::{CsvFormat, Dataset};
use thiserror::Error;

pub fn get_buff_reader(filename: &Option<PathBuf>) -> Result<Box<dyn BufRead>> {
    let reader: Box<dyn BufRead> = if let Some(filename) = filename {
        let file = OpenOptions::new()
            .read(true)
            .open(filename)
            .with_context(|| format!("Could not read file {}", filename.to_string_lossy()))?;

        Box::new(BufReader::new(file))
    } else {
        let stdin = io::stdin();
        Box::new(BufReader::new(stdin))
    };
    Ok(reader)
}

#[derive(Debug, ValueEnum, Clone, Copy, PartialEq)]
pub enum DataType {
    /// Comma separated values, the label in the last column
    #[value(alias = "data")]
    CSV,
}

impl DataType {
    pub fn from_filename(filename: &Path) -> Result<Self, DataTypeError> {
        filename
            .extension()
            .and_then(|e| e.to_str())
            .and_then(|e| DataType::from_str(e, true).ok())
            .ok_or_else(|| {
                DataTypeError::CouldNotGetFromFileExt(filename.to_string_lossy().to_string())
            })
    }
}

#[derive(Debug, Error)]
pub enum DataTypeError {
    #[error("File extension couldn't be identified on {0}")]
    CouldNotGetFromFileExt(String),
    #[error("No file provided. --datatype must be specified")]
    NoFile,
    #[error("Delimiter {0:?} is not a single byte character")]
    Delimiter(char),
}

/// Where the samples come from and how they are laid out.
#[derive(Debug, Args)]
pub struct InputArgs {
    /// The format of the file
    #[arg(value_enum, long)]
    pub datatype: Option<DataType>,
    /// CSV delimiter
    #[arg(long, default_value_t = ',')]
    pub delimiter: char,
    /// The first row holds column names
    #[arg(long)]
    pub header: bool,
    /// File containing data, read from stdin if absent
    pub filename: Option<PathBuf>,
}

impl InputArgs {
    pub fn load(&self) -> Result<Dataset> {
        let datatype = match (self.datatype, &self.filename) {
            (Some(d), _) => d,
            (None, Some(f)) => DataType::from_filename(f)?,
            (None, None) => return Err(DataTypeError::NoFile.into()),
        };
        if !self.delimiter.is_ascii() {
            return Err(DataTypeError::Delimiter(self.delimiter).into());
        }

        let reader = get_buff_reader(&self.filename)?;
        let dataset = match datatype {
            DataType::CSV => Dataset::from_csv(
                reader,
                &CsvFormat {
                    delimiter: self.delimiter as u8,
                    has_headers: self.header,
                },
            )?,
        };
        debug!(
            "read {} samples of {} features",
            dataset.len(),
            dataset.feature_count()
        );
        Ok(dataset)
    }
}
