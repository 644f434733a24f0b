use std::path::Path;

use common::{config::Config, plot::ensure_dirs, record::parse_rows};
use default_plots::PLOT_TYPES;
use eyre::{Context, Result, bail};
use futures::future::join_all;
use tokio::fs::read_to_string;
use tracing::{debug, info};

pub async fn list_datasets(config_file: &Path) -> Result<()> {
    let config = Config::load(config_file).await?;
    println!("{} (plot types: {})", config.name, PLOT_TYPES.join(", "));
    for dataset in &config.datasets {
        println!("{} <- {}", dataset.name, dataset.input_file());
        for plot in dataset.plots.iter().flatten() {
            let labels = plot
                .series()
                .iter()
                .map(|s| s.label.as_str())
                .collect::<Vec<_>>();
            println!("  {} [{}]", plot.name(), labels.join(", "));
        }
    }
    Ok(())
}

pub async fn plot(config_file: &Path, only: &[String]) -> Result<()> {
    let config = Config::load(config_file).await?;
    config.validate().context("Validate config")?;

    if let Some(name) = only.iter().find(|name| config.dataset(name).is_none()) {
        bail!("Unknown dataset {name} in {}", config_file.display());
    }

    let base = config_file.parent().unwrap_or(Path::new("."));
    let data_path = config.settings.data_dir(base);
    let plot_path = config.settings.plot_dir(base);
    ensure_dirs(std::slice::from_ref(&plot_path)).await?;

    let datasets = config
        .datasets
        .iter()
        .filter(|d| only.is_empty() || only.contains(&d.name))
        .collect::<Vec<_>>();
    debug!("Plotting {} datasets", datasets.len());

    let tables = join_all(datasets.into_iter().map(|dataset| {
        let csv_path = data_path.join(dataset.input_file());
        async move {
            let text = read_to_string(&csv_path)
                .await
                .with_context(|| format!("Read {}", csv_path.display()));
            (dataset, text)
        }
    }))
    .await;

    let mut written = 0;
    for (dataset, text) in tables {
        let rows =
            parse_rows(&text?).with_context(|| format!("Parse {}", dataset.input_file()))?;
        debug!("{}: {} rows", dataset.name, rows.len());

        for path in common::plot::plot(dataset, &rows, &plot_path, &config.settings).await? {
            println!("{}", path.display());
            written += 1;
        }
    }

    info!("Wrote {written} files for {}", config.name);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn shipped_configs_validate() {
        default_plots::init_plots();
        let configs = Path::new(env!("CARGO_MANIFEST_DIR")).join("../configs");
        for file in ["ido.yaml", "stamp.yaml"] {
            let config = Config::load(&configs.join(file)).await.unwrap();
            config.validate().unwrap();
        }
    }

    #[tokio::test]
    async fn exports_selected_dataset() {
        default_plots::init_plots();
        let dir = tempfile::tempdir().unwrap();
        let config_file = dir.path().join("plots.yaml");
        tokio::fs::write(
            &config_file,
            "name: ido\nsettings:\n  plot_dir: out\ndatasets:\n  - name: stack\n    plots:\n      - type: SeriesExport\n        metric: { kind: scaled, scale: 100 }\n        series: [{ label: qstm2048 }]\n  - name: list\n",
        )
        .await
        .unwrap();
        tokio::fs::write(dir.path().join("stack.csv"), "qstm2048,1,100.0\nother,1,999.0\n")
            .await
            .unwrap();

        // list.csv does not exist, so only stack may be read
        plot(&config_file, &["stack".to_owned()]).await.unwrap();

        let exported = std::fs::read_to_string(dir.path().join("out/plot_data/stack.csv")).unwrap();
        assert_eq!(exported, "series,threads,value\nqstm2048,1,1\n");
    }

    #[tokio::test]
    async fn unknown_dataset_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config_file = dir.path().join("plots.yaml");
        tokio::fs::write(&config_file, "name: ido\ndatasets:\n  - name: stack\n")
            .await
            .unwrap();

        let err = plot(&config_file, &["queue".to_owned()]).await.unwrap_err();
        assert!(err.to_string().contains("Unknown dataset queue"));
    }

    #[tokio::test]
    async fn missing_csv_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config_file = dir.path().join("plots.yaml");
        tokio::fs::write(&config_file, "name: ido\ndatasets:\n  - name: stack\n")
            .await
            .unwrap();

        let err = plot(&config_file, &[]).await.unwrap_err();
        assert!(format!("{err:#}").contains("stack.csv"));
    }
}
