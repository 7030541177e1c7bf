use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Instant;
use tracing::debug;

use crate::container::{artifact_to_string, read_artifact};
use crate::error::{ChefError, Result};
use crate::mime;
use crate::pipeline::Codec;
use crate::stats::ProcessingStats;
use crate::store::FileStore;

pub const ARTIFACT_EXT: &str = "emoji";

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Encode,
    Decode,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::Encode => "encode",
            Operation::Decode => "decode",
        })
    }
}

impl FromStr for Operation {
    type Err = ChefError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "encode" => Ok(Operation::Encode),
            "decode" => Ok(Operation::Decode),
            other => Err(ChefError::Configuration(format!("unknown operation: {other}"))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileJob {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub operation: Operation,
}

impl FileJob {
    pub fn new(input_path: impl Into<PathBuf>, output_path: impl Into<PathBuf>, op: Operation) -> Self {
        Self {
            input_path: input_path.into(),
            output_path: output_path.into(),
            operation: op,
        }
    }

    /// Output lands in `out_dir`: `x.txt` encodes to `x.txt.emoji`, which
    /// decodes back to `x.txt`. Decode inputs without the suffix become
    /// `decoded_<name>`.
    pub fn into_dir(input: &Path, out_dir: &Path, op: Operation) -> Self {
        let name = input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "unnamed".to_string());
        let out_name = match op {
            Operation::Encode => format!("{name}.{ARTIFACT_EXT}"),
            Operation::Decode => match name.strip_suffix(&format!(".{ARTIFACT_EXT}")) {
                Some(stem) if !stem.is_empty() => stem.to_string(),
                _ => format!("decoded_{name}"),
            },
        };
        Self::new(input, out_dir.join(out_name), op)
    }
}

pub fn jobs_for(inputs: &[PathBuf], out_dir: &Path, op: Operation) -> Vec<FileJob> {
    inputs
        .iter()
        .map(|p| FileJob::into_dir(p, out_dir, op))
        .collect()
}

/// Runs one job to completion on the calling thread.
pub fn run_job(job: &FileJob, codec: &Codec, store: &dyn FileStore) -> Result<ProcessingStats> {
    match job.operation {
        Operation::Encode => encode_file(codec, store, &job.input_path, &job.output_path),
        Operation::Decode => decode_file(codec, store, &job.input_path, &job.output_path)
            .map(|(stats, _)| stats),
    }
}

pub fn encode_file(
    codec: &Codec,
    store: &dyn FileStore,
    input: &Path,
    output: &Path,
) -> Result<ProcessingStats> {
    let started = Instant::now();
    let data = store.read_all(input)?;
    let payload = codec.encode(&data, Some(mime::guess(input)))?;
    let text = artifact_to_string(&payload)?;
    store.write_all(output, text.as_bytes())?;
    debug!(input = %input.display(), output = %output.display(), "encoded file");
    Ok(ProcessingStats::new(
        data.len() as u64,
        text.len() as u64,
        started.elapsed(),
    ))
}

/// Returns the stats and the mime type recorded at encode time.
pub fn decode_file(
    codec: &Codec,
    store: &dyn FileStore,
    input: &Path,
    output: &Path,
) -> Result<(ProcessingStats, Option<String>)> {
    let started = Instant::now();
    let (raw_len, data, mime_type) = decode_artifact_file(codec, store, input)?;
    store.write_all(output, &data)?;
    debug!(input = %input.display(), output = %output.display(), "decoded file");
    let stats = ProcessingStats::new(raw_len, data.len() as u64, started.elapsed());
    Ok((stats, mime_type))
}

/// Reads and decodes an artifact without writing anything.
pub fn decode_artifact_file(
    codec: &Codec,
    store: &dyn FileStore,
    input: &Path,
) -> Result<(u64, Vec<u8>, Option<String>)> {
    let raw = store.read_all(input)?;
    let payload = read_artifact(raw.as_slice())?;
    let (data, mime_type) = codec.decode(&payload)?;
    Ok((raw.len() as u64, data, mime_type))
}
