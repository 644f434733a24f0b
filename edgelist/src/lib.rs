//! Text edge lists (`<src>\t<dst>` per line) to headerless binary pairs of
//! 32-bit integers, converted one file per worker.

use std::path::PathBuf;

use thiserror::Error;

mod batch;
mod codec;

pub use batch::{
    ConvertJob, ConvertReport, DEFAULT_INPUT_DIR, DEFAULT_PATTERN, JobOutcome, convert_all,
    convert_file, discover_inputs,
};
pub use codec::{
    ByteOrder, Edge, LineError, ParseError, RECORD_SIZE, decode_edges, encode_edges, parse_edges,
    parse_line,
};

#[derive(Error, Debug)]
pub enum EdgeListError {
    #[error("{}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("binary edge data has {0} bytes, not a multiple of 8")]
    TruncatedRecord(usize),
    #[error("unknown byte order {0:?}, expected native, little or big")]
    UnknownByteOrder(String),
    #[error("Creation of worker pool failed: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

impl EdgeListError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| EdgeListError::Io { path, source }
    }
}
