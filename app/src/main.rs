use std::path::PathBuf;

use clap::{Parser, Subcommand};
use edgelist::ByteOrder;
use eyre::Result;
use tracing::error;
use tracing_subscriber::{
    EnvFilter,
    fmt::{layer, time::ChronoLocal},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

mod convert;
mod plot;

/// Workspace crates that log at the default level unless `--log` overrides them
const MODULES: &[&str] = &[
    "common",
    "edgelist",
    "thread_scaling",
    "series_export",
    "default_plots",
];

#[derive(Parser)]
#[command(version, about = "Benchmark charts and graph inputs for the STM artifact")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    #[arg(long, default_value_t = false)]
    no_progress: bool,
    #[arg(short, long)]
    log: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the datasets of a plot config
    Ls {
        #[arg(short, long, default_value = "plots.yaml")]
        config_file: PathBuf,
    },
    /// Render the plots of a config
    Plot {
        #[arg(short, long, default_value = "plots.yaml")]
        config_file: PathBuf,
        /// Only plot these datasets
        #[arg(short, long)]
        only: Vec<String>,
    },
    /// Convert text edge lists to binary
    Convert {
        /// Directory holding the edge lists
        #[arg(short, long, default_value = edgelist::DEFAULT_INPUT_DIR)]
        dir: PathBuf,
        /// File name pattern of the inputs
        #[arg(short, long, default_value = edgelist::DEFAULT_PATTERN)]
        pattern: String,
        /// Worker count, the number of CPUs by default
        #[arg(short, long)]
        jobs: Option<usize>,
        #[arg(short, long, default_value_t = ByteOrder::Native)]
        byte_order: ByteOrder,
    },
    /// Print the edges of a converted file
    Inspect {
        file: PathBuf,
        /// Number of edges to print
        #[arg(short = 'n', long, default_value_t = 10)]
        limit: usize,
        #[arg(short, long, default_value_t = ByteOrder::Native)]
        byte_order: ByteOrder,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let log_level = std::env::var("RUST_LOG").unwrap_or("warn".to_owned());
    let args = Cli::parse();
    let file_appender = tracing_appender::rolling::never(".", "log.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    let mut env_filter = EnvFilter::new(format!("qstm_tools={log_level}"));

    if !args.log.is_empty() {
        for log in &args.log {
            env_filter = env_filter.add_directive(log.parse()?);
        }
    }

    for module in MODULES {
        if !args.log.iter().any(|x| x.starts_with(module)) {
            env_filter = env_filter.add_directive(format!("{module}={log_level}").parse()?);
        }
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            layer()
                .with_timer(ChronoLocal::new("%v %k:%M:%S %z".to_owned()))
                .with_writer(std::io::stderr)
                .compact(),
        )
        .with(layer().with_ansi(false).with_writer(non_blocking))
        .init();

    default_plots::init_plots();

    match args.command {
        Commands::Ls { config_file } => plot::list_datasets(&config_file).await?,
        Commands::Plot { config_file, only } => {
            if let Err(err) = plot::plot(&config_file, &only).await {
                error!("{err:#?}");
                return Err(err);
            }
        }
        Commands::Convert {
            dir,
            pattern,
            jobs,
            byte_order,
        } => convert::convert(dir, &pattern, jobs, byte_order, args.no_progress).await?,
        Commands::Inspect {
            file,
            limit,
            byte_order,
        } => convert::inspect(&file, limit, byte_order).await?,
    };

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn convert_defaults() {
        let cli = Cli::try_parse_from(["qstm-tools", "convert"]).unwrap();
        let Commands::Convert {
            dir,
            pattern,
            jobs,
            byte_order,
        } = cli.command
        else {
            panic!("expected convert");
        };
        assert_eq!(dir, PathBuf::from("graph_data"));
        assert_eq!(pattern, edgelist::DEFAULT_PATTERN);
        assert_eq!(jobs, None);
        assert_eq!(byte_order, ByteOrder::Native);
    }

    #[test]
    fn parses_global_flags_and_plot_filter() {
        let cli = Cli::try_parse_from([
            "qstm-tools",
            "--no-progress",
            "-l",
            "common=debug",
            "plot",
            "-c",
            "ido.yaml",
            "-o",
            "stack",
            "-o",
            "map",
        ])
        .unwrap();
        assert!(cli.no_progress);
        assert_eq!(cli.log, vec!["common=debug"]);
        let Commands::Plot { config_file, only } = cli.command else {
            panic!("expected plot");
        };
        assert_eq!(config_file, PathBuf::from("ido.yaml"));
        assert_eq!(only, vec!["stack", "map"]);
    }

    #[test]
    fn rejects_unknown_byte_order() {
        assert!(Cli::try_parse_from(["qstm-tools", "inspect", "a.bin", "-b", "middle"]).is_err());
    }
}
