use std::{fmt, str::FromStr, sync::LazyLock};

use atoi::FromRadix10Checked;
use regex::bytes::Regex;
use thiserror::Error;

use crate::EdgeListError;

/// Bytes per encoded edge, two 32-bit integers
pub const RECORD_SIZE: usize = 8;

static EDGE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]+)\t([0-9]+)").expect("edge line pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge {
    pub src: u32,
    pub dst: u32,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    /// Byte order of the machine running the conversion
    #[default]
    Native,
    Little,
    Big,
}

impl ByteOrder {
    pub fn encode(self, value: u32) -> [u8; 4] {
        match self {
            ByteOrder::Native => value.to_ne_bytes(),
            ByteOrder::Little => value.to_le_bytes(),
            ByteOrder::Big => value.to_be_bytes(),
        }
    }

    pub fn decode(self, bytes: [u8; 4]) -> u32 {
        match self {
            ByteOrder::Native => u32::from_ne_bytes(bytes),
            ByteOrder::Little => u32::from_le_bytes(bytes),
            ByteOrder::Big => u32::from_be_bytes(bytes),
        }
    }
}

impl FromStr for ByteOrder {
    type Err = EdgeListError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "native" => Ok(ByteOrder::Native),
            "little" | "le" => Ok(ByteOrder::Little),
            "big" | "be" => Ok(ByteOrder::Big),
            _ => Err(EdgeListError::UnknownByteOrder(s.to_owned())),
        }
    }
}

impl fmt::Display for ByteOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ByteOrder::Native => write!(f, "native"),
            ByteOrder::Little => write!(f, "little"),
            ByteOrder::Big => write!(f, "big"),
        }
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum LineError {
    #[error("expected `<src>\\t<dst>`, got {0:?}")]
    Malformed(String),
    #[error("{0} does not fit in 32 bits")]
    Overflow(String),
}

#[derive(Error, Debug, PartialEq)]
pub enum ParseError {
    #[error("input is empty")]
    Empty,
    #[error("line {line}: {source}")]
    Line {
        line: usize,
        #[source]
        source: LineError,
    },
}

/// Parses the leading `<src>\t<dst>` of a line, anything after it is ignored
pub fn parse_line(line: &[u8]) -> Result<Edge, LineError> {
    let caps = EDGE_LINE
        .captures(line)
        .ok_or_else(|| LineError::Malformed(String::from_utf8_lossy(line).into_owned()))?;
    let number = |idx: usize| {
        let digits = &caps[idx];
        match u32::from_radix_10_checked(digits) {
            (Some(value), used) if used == digits.len() => Ok(value),
            _ => Err(LineError::Overflow(
                String::from_utf8_lossy(digits).into_owned(),
            )),
        }
    };
    Ok(Edge {
        src: number(1)?,
        dst: number(2)?,
    })
}

/// Parses every line of an edge list, in order.
///
/// A trailing newline does not start another line. Input without any line is
/// rejected, so an empty file never turns into an empty binary.
pub fn parse_edges(data: &[u8]) -> Result<Vec<Edge>, ParseError> {
    if data.is_empty() {
        return Err(ParseError::Empty);
    }
    let data = data.strip_suffix(b"\n").unwrap_or(data);

    data.split(|&b| b == b'\n')
        .enumerate()
        .map(|(i, line)| {
            parse_line(line).map_err(|source| ParseError::Line {
                line: i + 1,
                source,
            })
        })
        .collect()
}

pub fn encode_edges(edges: &[Edge], order: ByteOrder) -> Vec<u8> {
    let mut out = Vec::with_capacity(edges.len() * RECORD_SIZE);
    for edge in edges {
        out.extend_from_slice(&order.encode(edge.src));
        out.extend_from_slice(&order.encode(edge.dst));
    }
    out
}

pub fn decode_edges(bytes: &[u8], order: ByteOrder) -> Result<Vec<Edge>, EdgeListError> {
    if bytes.len() % RECORD_SIZE != 0 {
        return Err(EdgeListError::TruncatedRecord(bytes.len()));
    }
    Ok(bytes
        .chunks_exact(RECORD_SIZE)
        .map(|record| {
            let (src, dst) = record.split_at(4);
            Edge {
                src: order.decode([src[0], src[1], src[2], src[3]]),
                dst: order.decode([dst[0], dst[1], dst[2], dst[3]]),
            }
        })
        .collect())
}
