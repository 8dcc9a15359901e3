use anyhow::Result;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub struct AggNum {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub count: usize,
    /// Population standard deviation.
    pub stddev: f64,
}

/// Streaming summary of a numeric column. Mean and variance are
/// accumulated with Welford's update so long columns of similar values
/// don't lose precision.
#[derive(Debug, Clone, Default)]
pub struct AggNumBuilder {
    mean: f64,
    // sum of squared distances from the running mean
    m2: f64,
    len: usize,
    min: Option<f64>,
    max: Option<f64>,
}

impl AggNumBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_val(&mut self, val: f64) {
        self.len += 1;
        let delta = val - self.mean;
        self.mean += delta / self.len as f64;
        self.m2 += delta * (val - self.mean);

        self.min = Some(self.min.map_or(val, |m| m.min(val)));
        self.max = Some(self.max.map_or(val, |m| m.max(val)));
    }

    /// Merge another partial aggregate into this one.
    pub fn add(&mut self, agg: &AggNumBuilder) {
        if agg.len == 0 {
            return;
        }
        let len = self.len + agg.len;
        let delta = agg.mean - self.mean;
        self.mean += delta * agg.len as f64 / len as f64;
        self.m2 += agg.m2 + delta * delta * (self.len * agg.len) as f64 / len as f64;
        self.len = len;

        if let Some(val) = agg.min {
            self.min = Some(self.min.map_or(val, |m| m.min(val)));
        }
        if let Some(val) = agg.max {
            self.max = Some(self.max.map_or(val, |m| m.max(val)));
        }
    }

    pub fn build(&self) -> Result<AggNum> {
        let (min, max) = match (self.min, self.max) {
            (Some(min), Some(max)) => (min, max),
            _ => return Err(AggNumBuilderError::Empty.into()),
        };

        Ok(AggNum {
            mean: self.mean,
            min,
            max,
            count: self.len,
            stddev: (self.m2 / self.len as f64).sqrt(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum AggNumBuilderError {
    #[error("cannot aggregate an empty column")]
    Empty,
}
