use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("Chart is missing the [{0}] section")]
    MissingSection(&'static str),

    #[error("Invalid chart resolution: {0}")]
    InvalidResolution(String),

    #[error("Invalid tempo at tick {tick}: {value}")]
    InvalidTempo { tick: u64, value: String },

    #[error("No chart candidate for '{song_id}' contains [Song] and [SyncTrack]")]
    NoValidCandidate { song_id: String },

    #[error("Failed to read chart file: {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Chart request failed: {url}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Chart request returned HTTP {status}: {url}")]
    HttpStatus { url: String, status: u16 },
}
