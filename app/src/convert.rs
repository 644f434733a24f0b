use std::path::{Path, PathBuf};

use edgelist::{ByteOrder, convert_all, decode_edges, discover_inputs};
use eyre::{Context, Result, bail};
use indicatif::{ProgressBar, ProgressStyle};
use regex::Regex;
use tokio::{fs::read, task::spawn_blocking};
use tracing::{error, info, warn};

pub async fn convert(
    dir: PathBuf,
    pattern: &str,
    jobs: Option<usize>,
    order: ByteOrder,
    no_progress: bool,
) -> Result<()> {
    let pattern =
        Regex::new(pattern).with_context(|| format!("Invalid input pattern {pattern}"))?;
    let search_dir = dir.clone();
    let inputs = spawn_blocking(move || discover_inputs(&search_dir, &pattern)).await??;
    if inputs.is_empty() {
        warn!("No edge lists to convert in {}", dir.display());
        return Ok(());
    }

    let bar = if no_progress {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(inputs.len() as u64)
    };
    bar.set_style(ProgressStyle::with_template(
        "[{elapsed_precise}] {wide_bar} {pos}/{len} {msg}",
    )?);

    let progress = bar.clone();
    let outcomes = spawn_blocking(move || {
        convert_all(&inputs, jobs, order, |outcome| {
            if let Some(name) = outcome.job.input.file_name() {
                progress.set_message(name.to_string_lossy().into_owned());
            }
            progress.inc(1);
        })
    })
    .await??;
    bar.finish_and_clear();

    let mut failed = 0;
    let mut edges = 0;
    for outcome in &outcomes {
        match &outcome.result {
            Ok(report) => {
                edges += report.edges;
                info!(
                    "{} -> {} ({} edges)",
                    report.input.display(),
                    report.output.display(),
                    report.edges
                );
            }
            Err(err) => {
                failed += 1;
                error!("{err}");
            }
        }
    }

    if failed > 0 {
        bail!("{failed} of {} edge lists failed to convert", outcomes.len());
    }
    println!(
        "Converted {} edge lists ({edges} edges) in {}",
        outcomes.len(),
        dir.display()
    );
    Ok(())
}

pub async fn inspect(file: &Path, limit: usize, order: ByteOrder) -> Result<()> {
    let bytes = read(file)
        .await
        .with_context(|| format!("Read {}", file.display()))?;
    let edges = decode_edges(&bytes, order).with_context(|| format!("Decode {}", file.display()))?;

    println!("{}: {} edges, {order} byte order", file.display(), edges.len());
    for edge in edges.iter().take(limit) {
        println!("{}\t{}", edge.src, edge.dst);
    }
    Ok(())
}
