use std::path::{Path, PathBuf};

use common::{
    DEFAULT_THREAD_TICKS,
    config::{ConfigError, Dataset, Settings},
    metric::Metric,
    plot::{Plot, ensure_dirs},
    series::{Series, SeriesSpec, collect_series, validate_specs},
    util::{auto_upper_bound, distinct_thread_counts, max_thread_count},
};
use csv::StringRecord;
use eyre::Result;
use serde::{Deserialize, Serialize};
use tokio::task::spawn_blocking;
use tracing::{debug, warn};

mod chart;

pub use chart::{LegendPosition, LineChart};

/// Line chart of one metric against the thread count, one line per series
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ThreadScaling {
    #[serde(default)]
    pub metric: Metric,
    pub series: Vec<SeriesSpec>,
    #[serde(default)]
    pub axes: Axes,
    pub title: Option<String>,
    pub legend: Option<LegendPosition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Axes {
    pub x_label: String,
    pub y_label: String,
    pub x_min: u32,
    pub x_max: Option<u32>,
    /// In plotted units, ie. after the metric is applied
    pub y_max: Option<f64>,
    pub x_ticks: Option<Vec<u32>>,
}

impl Default for Axes {
    fn default() -> Self {
        Self {
            x_label: "Threads".to_owned(),
            y_label: "Throughput (txn/sec)".to_owned(),
            x_min: 0,
            x_max: None,
            y_max: None,
            x_ticks: None,
        }
    }
}

/// Axis ranges after defaults were filled in from the data
#[derive(Debug, Clone, PartialEq)]
pub struct Bounds {
    pub x_min: f64,
    pub x_max: f64,
    pub y_max: f64,
    pub ticks: Vec<f64>,
}

impl Axes {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(x_max) = self.x_max
            && x_max <= self.x_min
        {
            return Err(ConfigError::InvalidAxis(format!(
                "x_max {x_max} must exceed x_min {}",
                self.x_min
            )));
        }
        if let Some(y_max) = self.y_max
            && !(y_max.is_finite() && y_max > 0.0)
        {
            return Err(ConfigError::InvalidAxis(format!(
                "y_max must be positive, got {y_max}"
            )));
        }
        let x_max = self.x_max.unwrap_or(u32::MAX);
        if let Some(tick) = self
            .x_ticks
            .iter()
            .flatten()
            .find(|&&t| t < self.x_min || t > x_max)
        {
            return Err(ConfigError::InvalidAxis(format!(
                "tick {tick} outside of [{}, {x_max}]",
                self.x_min
            )));
        }
        Ok(())
    }

    pub fn resolve(&self, series: &[Series]) -> Bounds {
        let x_max = self
            .x_max
            .or_else(|| max_thread_count(series).map(|x| x.saturating_add(2)))
            .unwrap_or(DEFAULT_THREAD_TICKS[DEFAULT_THREAD_TICKS.len() - 1] + 2)
            .max(self.x_min.saturating_add(1));

        let ticks = match &self.x_ticks {
            Some(ticks) => ticks.clone(),
            None => {
                let present = distinct_thread_counts(series);
                if present.is_empty() {
                    DEFAULT_THREAD_TICKS.to_vec()
                } else {
                    present
                }
            }
        };

        Bounds {
            x_min: f64::from(self.x_min),
            x_max: f64::from(x_max),
            y_max: self.y_max.unwrap_or_else(|| auto_upper_bound(series)),
            ticks: ticks
                .into_iter()
                .filter(|&t| t >= self.x_min && t <= x_max)
                .map(f64::from)
                .collect(),
        }
    }
}

#[async_trait::async_trait]
#[typetag::serde]
impl Plot for ThreadScaling {
    fn name(&self) -> &'static str {
        "ThreadScaling"
    }

    fn series(&self) -> &[SeriesSpec] {
        &self.series
    }

    fn validate(&self) -> Result<(), ConfigError> {
        validate_specs(&self.series)?;
        self.metric.validate()?;
        self.axes.validate()
    }

    async fn plot(
        &self,
        dataset: &Dataset,
        rows: &[StringRecord],
        plot_path: &Path,
        settings: &Settings,
    ) -> Result<Vec<PathBuf>> {
        let series = collect_series(rows, &self.series, &self.metric)?;
        for s in series.iter().filter(|s| s.points.is_empty()) {
            warn!("Series {} has no rows in {}", s.label, dataset.input_file());
        }

        let chart = self.chart(series, settings);
        debug!("Bounds for {}: {:?}", dataset.name, chart.bounds);

        ensure_dirs(&[plot_path.to_path_buf()]).await?;
        let filepath = plot_path.join(format!("{}.png", dataset.output_stem()));
        let target = filepath.clone();
        spawn_blocking(move || chart.render(&target)).await??;

        Ok(vec![filepath])
    }
}

impl ThreadScaling {
    pub fn chart(&self, series: Vec<Series>, settings: &Settings) -> LineChart {
        LineChart {
            bounds: self.axes.resolve(&series),
            series,
            x_label: self.axes.x_label.clone(),
            y_label: self.axes.y_label.clone(),
            title: self.title.clone(),
            legend: self.legend,
            width: settings.width(),
            height: settings.height(),
            font_size: settings.font_size(),
        }
    }
}
