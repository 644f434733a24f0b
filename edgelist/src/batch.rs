use std::{
    fs,
    path::{Path, PathBuf},
};

use rayon::{
    ThreadPoolBuilder,
    iter::{IntoParallelRefIterator, ParallelIterator},
};
use regex::Regex;
use tracing::debug;

use crate::{
    EdgeListError,
    codec::{ByteOrder, encode_edges, parse_edges},
};

pub const DEFAULT_INPUT_DIR: &str = "graph_data";
pub const DEFAULT_PATTERN: &str = r"^orkut-edge-list_[0-9]+\.txt$";

/// One input file and the binary file it becomes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertJob {
    pub input: PathBuf,
    pub output: PathBuf,
}

impl ConvertJob {
    /// Output goes beside the input with a `.bin` extension
    pub fn for_input(input: impl Into<PathBuf>) -> Self {
        let input = input.into();
        let output = input.with_extension("bin");
        Self { input, output }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub edges: usize,
    pub bytes: usize,
}

#[derive(Debug)]
pub struct JobOutcome {
    pub job: ConvertJob,
    pub result: Result<ConvertReport, EdgeListError>,
}

/// Finds the regular files in `dir` whose name matches `pattern`, sorted by name
pub fn discover_inputs(dir: &Path, pattern: &Regex) -> Result<Vec<ConvertJob>, EdgeListError> {
    let mut jobs = Vec::new();
    for entry in fs::read_dir(dir).map_err(EdgeListError::io(dir))? {
        let entry = entry.map_err(EdgeListError::io(dir))?;
        let file_type = entry.file_type().map_err(EdgeListError::io(entry.path()))?;
        if !file_type.is_file() {
            continue;
        }
        let name = entry.file_name();
        if name.to_str().is_some_and(|name| pattern.is_match(name)) {
            jobs.push(ConvertJob::for_input(entry.path()));
        } else {
            debug!("Ignoring {}", entry.path().display());
        }
    }
    jobs.sort_by(|a, b| a.input.cmp(&b.input));
    Ok(jobs)
}

/// Converts one file. Nothing is written unless every line parses.
pub fn convert_file(job: &ConvertJob, order: ByteOrder) -> Result<ConvertReport, EdgeListError> {
    let data = fs::read(&job.input).map_err(EdgeListError::io(&job.input))?;
    let edges = parse_edges(&data).map_err(|source| EdgeListError::Parse {
        path: job.input.clone(),
        source,
    })?;
    let bytes = encode_edges(&edges, order);
    fs::write(&job.output, &bytes).map_err(EdgeListError::io(&job.output))?;

    debug!(
        "Converted {} -> {} ({} edges)",
        job.input.display(),
        job.output.display(),
        edges.len()
    );
    Ok(ConvertReport {
        input: job.input.clone(),
        output: job.output.clone(),
        edges: edges.len(),
        bytes: bytes.len(),
    })
}

/// Converts every job on a pool of `threads` workers, the CPU count by default.
///
/// Files are independent and finish in any order. `on_done` is called from the
/// worker as each job finishes. Every job's result is returned, a failed file
/// does not stop the others. Only building the pool fails the call itself.
pub fn convert_all<F>(
    jobs: &[ConvertJob],
    threads: Option<usize>,
    order: ByteOrder,
    on_done: F,
) -> Result<Vec<JobOutcome>, EdgeListError>
where
    F: Fn(&JobOutcome) + Sync,
{
    let threads = threads
        .filter(|&n| n > 0)
        .unwrap_or_else(num_cpus::get)
        .min(jobs.len().max(1));
    debug!("Converting {} files on {threads} workers", jobs.len());

    let pool = ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("edgelist-{i}"))
        .build()?;

    Ok(pool.install(|| {
        jobs.par_iter()
            .map(|job| {
                let outcome = JobOutcome {
                    job: job.clone(),
                    result: convert_file(job, order),
                };
                on_done(&outcome);
                outcome
            })
            .collect()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_replaces_extension() {
        let job = ConvertJob::for_input("graph_data/orkut-edge-list_3.txt");
        assert_eq!(job.output, PathBuf::from("graph_data/orkut-edge-list_3.bin"));
    }

    #[test]
    fn default_pattern_matches_whole_name() {
        let pattern = Regex::new(DEFAULT_PATTERN).unwrap();
        assert!(pattern.is_match("orkut-edge-list_0.txt"));
        assert!(pattern.is_match("orkut-edge-list_128.txt"));
        assert!(!pattern.is_match("orkut-edge-list_.txt"));
        assert!(!pattern.is_match("orkut-edge-list_1.txt.bak"));
        assert!(!pattern.is_match("orkut-edge-list_1xtxt"));
        assert!(!pattern.is_match("orkut-edge-list_1.bin"));
    }
}
