use std::{
    num::ParseIntError,
    path::PathBuf,
    process::ExitStatus,
    str::Utf8Error,
};
use thiserror::Error;

pub type PgxResult<T> = std::result::Result<T, PgxError>;

#[derive(Debug, Error)]
pub enum PgxError {
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Htslib(#[from] rust_htslib::errors::Error),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Utf8(#[from] Utf8Error),
    #[error(transparent)]
    ParseInt(#[from] ParseIntError),
    #[error("Failed to launch `{program}`: {source}")]
    CommandSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Command [ {command} ] exited with {status}: {}", stderr.trim())]
    CommandFailed {
        command: String,
        status: ExitStatus,
        stderr: String,
    },
    #[error("File already exists. Delete it if you want to proceed: {}", path.display())]
    FileExists { path: PathBuf },
    #[error("Invalid download URL (no file name in path): {url}")]
    InvalidUrl { url: String },
    #[error(
        "Reference index file not found: {}. Create it using 'samtools faidx {}'",
        fai_path.display(),
        reference_path.display()
    )]
    MissingReferenceIndex {
        fai_path: PathBuf,
        reference_path: PathBuf,
    },
    #[error("The CHROM column does not comply with either 'chr##' or '##' format: {contig}")]
    UnrecognizedChromosome { contig: String },
    #[error("No variant records found in {}", path.display())]
    EmptyVcf { path: PathBuf },
    #[error("Samples not present in {}: {}", path.display(), samples.join(", "))]
    UnknownSamples { path: PathBuf, samples: Vec<String> },
}

impl PgxError {
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}

#[macro_export]
macro_rules! pgx_error {
    ($($arg:tt)*) => {
        $crate::error::PgxError::message(format!($($arg)*))
    };
}
