use core::fmt::Debug;
use std::path::{Path, PathBuf};

use csv::StringRecord;
use downcast_rs::{Downcast, impl_downcast};
use dyn_clone::{DynClone, clone_trait_object};
use eyre::{Context, Result};
use futures::future::join_all;
use tokio::fs::create_dir_all;
use tracing::debug;

use crate::{
    config::{ConfigError, Dataset, Settings},
    series::SeriesSpec,
};

#[typetag::serde(tag = "type")]
#[async_trait::async_trait]
pub trait Plot: Debug + DynClone + Downcast + Send + Sync {
    /// Name of the plot, for identification
    fn name(&self) -> &'static str;
    /// The series this plot reads from the dataset
    fn series(&self) -> &[SeriesSpec];
    /// Checks the plot settings before any data is read
    fn validate(&self) -> Result<(), ConfigError>;
    /// Plots the data
    ///
    /// Arguments:
    /// * `dataset` - The dataset entry from the config, names the output files
    /// * `rows` - Raw rows of the dataset CSV
    /// * `plot_path` - The directory outputs go to, ie. /plots
    /// * `settings` - The settings from the config
    ///
    /// Returns the files written.
    async fn plot(
        &self,
        dataset: &Dataset,
        rows: &[StringRecord],
        plot_path: &Path,
        settings: &Settings,
    ) -> Result<Vec<PathBuf>>;
}
clone_trait_object!(Plot);
impl_downcast!(Plot);

pub async fn ensure_dirs(dirs: &[PathBuf]) -> Result<()> {
    let create_jobs = dirs.iter().map(create_dir_all);
    for (res, dir) in join_all(create_jobs).await.into_iter().zip(dirs) {
        res.with_context(|| format!("Create {}", dir.display()))?;
    }
    Ok(())
}

/// Runs every plot of a dataset in order, stopping at the first failure
pub async fn plot(
    dataset: &Dataset,
    rows: &[StringRecord],
    plot_path: &Path,
    settings: &Settings,
) -> Result<Vec<PathBuf>> {
    let Some(plots) = &dataset.plots else {
        debug!("No plots for {}", dataset.name);
        return Ok(Vec::new());
    };

    let mut written = Vec::new();
    for plot in plots {
        let files = plot
            .plot(dataset, rows, plot_path, settings)
            .await
            .with_context(|| format!("Plot {} for {}", plot.name(), dataset.name))?;
        written.extend(files);
    }
    Ok(written)
}
