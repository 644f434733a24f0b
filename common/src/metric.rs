use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{config::ConfigError, record::BenchRecord};

#[derive(Error, Debug, PartialEq)]
pub enum MetricError {
    #[error("zero denominator deriving {metric} for {label} at {x} threads")]
    ZeroDenominator {
        metric: &'static str,
        label: String,
        x: u32,
    },
    #[error("{label} at {x} threads has no secondary column for ratio")]
    MissingSecondary { label: String, x: u32 },
}

/// How the plotted value is derived from a [`BenchRecord`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Metric {
    /// `y / scale`
    Scaled { scale: f64 },
    /// `work / y / scale`, for rows that log elapsed seconds for a fixed amount of work
    Throughput { work: f64, scale: f64 },
    /// `(z / y) / scale`, for rows that log seconds and completed operations
    Ratio { scale: f64 },
}

impl Default for Metric {
    fn default() -> Self {
        Metric::Scaled { scale: 1.0 }
    }
}

impl Metric {
    pub fn name(&self) -> &'static str {
        match self {
            Metric::Scaled { .. } => "scaled",
            Metric::Throughput { .. } => "throughput",
            Metric::Ratio { .. } => "ratio",
        }
    }

    pub fn scale(&self) -> f64 {
        match *self {
            Metric::Scaled { scale }
            | Metric::Throughput { scale, .. }
            | Metric::Ratio { scale } => scale,
        }
    }

    pub fn apply(&self, record: &BenchRecord) -> Result<f64, MetricError> {
        let zero = || MetricError::ZeroDenominator {
            metric: self.name(),
            label: record.label.clone(),
            x: record.x,
        };
        match *self {
            Metric::Scaled { scale } => Ok(record.y / scale),
            Metric::Throughput { work, scale } => {
                if record.y == 0.0 {
                    return Err(zero());
                }
                Ok(work / scale / record.y)
            }
            Metric::Ratio { scale } => {
                let z = record.z.ok_or_else(|| MetricError::MissingSecondary {
                    label: record.label.clone(),
                    x: record.x,
                })?;
                if record.y == 0.0 {
                    return Err(zero());
                }
                Ok((z / record.y) / scale)
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = |name: &'static str, value: f64| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::InvalidMetric {
                    field: name,
                    value,
                })
            }
        };
        positive("scale", self.scale())?;
        if let Metric::Throughput { work, .. } = *self {
            positive("work", work)?;
        }
        Ok(())
    }
}
