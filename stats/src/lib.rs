pub mod agg;
pub mod covariance;
pub mod dataset;
pub mod hist;
pub mod linalg;
pub mod pca;
pub mod report;
pub mod standardize;
pub mod style;
pub mod table;
pub mod util;
