use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::fs::read_to_string;

use crate::plot::Plot;

pub const DEFAULT_WIDTH: u32 = 1920;
pub const DEFAULT_HEIGHT: u32 = 1440;
pub const DEFAULT_FONT_SIZE: u32 = 40;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("dataset name must not be empty")]
    EmptyDatasetName,
    #[error("dataset {0} is defined more than once")]
    DuplicateDataset(String),
    #[error("plot selects no series")]
    NoSeries,
    #[error("series {0} is selected more than once")]
    DuplicateSeries(String),
    #[error("metric {field} must be positive and finite, got {value}")]
    InvalidMetric { field: &'static str, value: f64 },
    #[error("invalid axis: {0}")]
    InvalidAxis(String),
    #[error("image dimensions must be non-zero")]
    EmptyImage,
    #[error("dataset {dataset}: {source}")]
    Dataset {
        dataset: String,
        #[source]
        source: Box<ConfigError>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub name: String,
    #[serde(default)]
    pub settings: Settings,
    pub datasets: Vec<Dataset>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Directory holding the CSV logs, relative to the config file
    pub data_dir: Option<PathBuf>,
    /// Directory the plots are written to, relative to the config file
    pub plot_dir: Option<PathBuf>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub font_size: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    pub name: String,
    /// CSV file name, `<name>.csv` when absent
    pub input: Option<String>,
    /// Stem of every output file, `<name>` when absent
    pub output: Option<String>,
    pub plots: Option<Vec<Box<dyn Plot>>>,
}

impl Config {
    pub async fn load(path: &Path) -> Result<Self> {
        let text = read_to_string(path)
            .await
            .with_context(|| format!("Read config {}", path.display()))?;
        Self::from_yaml(&text).with_context(|| format!("Parse config {}", path.display()))
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yml::from_str(text)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.settings.width() == 0 || self.settings.height() == 0 {
            return Err(ConfigError::EmptyImage);
        }

        let mut names = HashSet::new();
        for dataset in &self.datasets {
            if dataset.name.trim().is_empty() {
                return Err(ConfigError::EmptyDatasetName);
            }
            if !names.insert(dataset.name.as_str()) {
                return Err(ConfigError::DuplicateDataset(dataset.name.clone()));
            }
            for plot in dataset.plots.iter().flatten() {
                plot.validate().map_err(|err| ConfigError::Dataset {
                    dataset: dataset.name.clone(),
                    source: Box::new(err),
                })?;
            }
        }
        Ok(())
    }

    pub fn dataset(&self, name: &str) -> Option<&Dataset> {
        self.datasets.iter().find(|x| x.name == name)
    }
}

impl Settings {
    /// Resolves the data directory against the directory of the config file
    pub fn data_dir(&self, base: &Path) -> PathBuf {
        base.join(self.data_dir.as_deref().unwrap_or(Path::new(".")))
    }

    pub fn plot_dir(&self, base: &Path) -> PathBuf {
        base.join(self.plot_dir.as_deref().unwrap_or(Path::new(".")))
    }

    pub fn width(&self) -> u32 {
        self.width.unwrap_or(DEFAULT_WIDTH)
    }

    pub fn height(&self) -> u32 {
        self.height.unwrap_or(DEFAULT_HEIGHT)
    }

    pub fn font_size(&self) -> u32 {
        self.font_size.unwrap_or(DEFAULT_FONT_SIZE)
    }
}

impl Dataset {
    pub fn input_file(&self) -> String {
        self.input
            .clone()
            .unwrap_or_else(|| format!("{}.csv", self.name))
    }

    pub fn output_stem(&self) -> &str {
        self.output.as_deref().unwrap_or(&self.name)
    }
}
