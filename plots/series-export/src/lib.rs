use std::{
    fs::File,
    path::{Path, PathBuf},
};

use common::{
    config::{ConfigError, Dataset, Settings},
    metric::Metric,
    plot::{Plot, ensure_dirs},
    series::{Series, SeriesSpec, collect_series, validate_specs},
};
use csv::StringRecord;
use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::task::spawn_blocking;
use tracing::debug;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl ExportFormat {
    fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

/// Writes the derived series next to the charts, under `plot_data/`
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct SeriesExport {
    #[serde(default)]
    pub metric: Metric,
    pub series: Vec<SeriesSpec>,
    #[serde(default)]
    pub format: ExportFormat,
}

#[async_trait::async_trait]
#[typetag::serde]
impl Plot for SeriesExport {
    fn name(&self) -> &'static str {
        "SeriesExport"
    }

    fn series(&self) -> &[SeriesSpec] {
        &self.series
    }

    fn validate(&self) -> Result<(), ConfigError> {
        validate_specs(&self.series)?;
        self.metric.validate()
    }

    async fn plot(
        &self,
        dataset: &Dataset,
        rows: &[StringRecord],
        plot_path: &Path,
        _settings: &Settings,
    ) -> Result<Vec<PathBuf>> {
        let series = collect_series(rows, &self.series, &self.metric)?;

        let plot_data_dir = plot_path.join("plot_data");
        ensure_dirs(std::slice::from_ref(&plot_data_dir)).await?;
        let filepath = plot_data_dir.join(format!(
            "{}.{}",
            dataset.output_stem(),
            self.format.extension()
        ));

        let format = self.format;
        let target = filepath.clone();
        spawn_blocking(move || write_series(&target, &series, format)).await??;
        debug!("Exported {} for {}", filepath.display(), dataset.name);

        Ok(vec![filepath])
    }
}

fn write_series(path: &Path, series: &[Series], format: ExportFormat) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Create {}", path.display()))?;
    match format {
        ExportFormat::Csv => {
            let mut writer = csv::Writer::from_writer(file);
            writer.write_record(["series", "threads", "value"])?;
            for s in series {
                for point in &s.points {
                    writer.write_record([
                        s.legend.clone(),
                        point.x.to_string(),
                        point.y.to_string(),
                    ])?;
                }
            }
            writer.flush()?;
        }
        ExportFormat::Json => serde_json::to_writer_pretty(file, series)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use common::{config::Config, record::parse_rows, series::Point};

    use super::*;

    fn dataset(name: &str) -> Dataset {
        Dataset {
            name: name.to_owned(),
            input: None,
            output: None,
            plots: None,
        }
    }

    fn export(format: ExportFormat) -> SeriesExport {
        SeriesExport {
            metric: Metric::Scaled { scale: 100.0 },
            series: vec![SeriesSpec {
                label: "qstm2048".to_owned(),
                legend: Some("QSTM-2k".to_owned()),
                marker: None,
            }],
            format,
        }
    }

    #[tokio::test]
    async fn writes_csv_rows() {
        let dir = tempfile::tempdir().unwrap();
        let rows = parse_rows("qstm2048,1,100.0\nother,1,999.0\nqstm2048,4,350\n").unwrap();

        let written = export(ExportFormat::Csv)
            .plot(&dataset("stack"), &rows, dir.path(), &Settings::default())
            .await
            .unwrap();

        let expected = dir.path().join("plot_data").join("stack.csv");
        assert_eq!(written, vec![expected.clone()]);
        let text = std::fs::read_to_string(expected).unwrap();
        assert_eq!(
            text,
            "series,threads,value\nQSTM-2k,1,1\nQSTM-2k,4,3.5\n"
        );
    }

    #[tokio::test]
    async fn writes_json_series() {
        let dir = tempfile::tempdir().unwrap();
        let rows = parse_rows("qstm2048,8,200\n").unwrap();

        let written = export(ExportFormat::Json)
            .plot(&dataset("queue"), &rows, dir.path(), &Settings::default())
            .await
            .unwrap();

        let data = std::fs::read_to_string(&written[0]).unwrap();
        let series: Vec<Series> = serde_json::from_str(&data).unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].legend, "QSTM-2k");
        assert_eq!(series[0].points, vec![Point { x: 8, y: 2.0 }]);
    }

    #[tokio::test]
    async fn bad_row_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let rows = parse_rows("qstm2048,1,oops\n").unwrap();

        let result = export(ExportFormat::Csv)
            .plot(&dataset("map"), &rows, dir.path(), &Settings::default())
            .await;

        assert!(result.is_err());
        assert!(!dir.path().join("plot_data").join("map.csv").exists());
    }

    #[test]
    fn loads_through_config() {
        let config = Config::from_yaml(
            "name: ido\ndatasets:\n  - name: map\n    plots:\n      - type: SeriesExport\n        series: [{ label: qstm128 }]\n        format: json\n",
        )
        .unwrap();
        let plots = config.datasets[0].plots.as_ref().unwrap();
        let export = plots[0].downcast_ref::<SeriesExport>().unwrap();
        assert_eq!(export.format, ExportFormat::Json);
        assert!(config.validate().is_ok());
    }
}
