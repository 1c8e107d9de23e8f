use std::path::{Path, PathBuf};

use log::debug;
use reqwest::blocking::Client;
use reqwest::header::CACHE_CONTROL;

use crate::ChartError;

/// Somewhere chart files can be fetched from.
/// Implementations: DirSource (local song folders), HttpSource (web server).
pub trait ChartSource: Send + Sync {
    /// Fetch the text of `file_name` inside the folder of `song_id`.
    fn fetch(&self, song_id: &str, file_name: &str) -> Result<String, ChartError>;
}

/// Decode chart bytes as UTF-8, honoring a byte order mark.
pub fn decode_chart_bytes(bytes: &[u8]) -> String {
    let (text, encoding, had_errors) = encoding_rs::UTF_8.decode(bytes);
    if had_errors {
        debug!("Chart contained invalid {} sequences", encoding.name());
    }
    text.into_owned()
}

/// Reads charts from `<root>/<song_id>/<file_name>`.
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn song_dir(&self, song_id: &str) -> PathBuf {
        self.root.join(song_id)
    }
}

impl ChartSource for DirSource {
    fn fetch(&self, song_id: &str, file_name: &str) -> Result<String, ChartError> {
        let path = self.song_dir(song_id).join(file_name);
        let bytes = std::fs::read(&path).map_err(|source| ChartError::FileRead {
            path: path.clone(),
            source,
        })?;
        Ok(decode_chart_bytes(&bytes))
    }
}

/// Fetches charts from `<base_url>/songs/<song_id>/<file_name>`.
pub struct HttpSource {
    base_url: String,
    client: Client,
}

impl HttpSource {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ChartError> {
        let base_url = base_url.into();
        let client = Client::builder()
            .build()
            .map_err(|source| ChartError::Http {
                url: base_url.clone(),
                source,
            })?;
        Ok(Self { base_url, client })
    }

    pub fn url_for(&self, song_id: &str, file_name: &str) -> String {
        format!(
            "{}/songs/{}/{}",
            self.base_url.trim_end_matches('/'),
            song_id,
            file_name
        )
    }
}

impl ChartSource for HttpSource {
    fn fetch(&self, song_id: &str, file_name: &str) -> Result<String, ChartError> {
        let url = self.url_for(song_id, file_name);
        let response = self
            .client
            .get(&url)
            .header(CACHE_CONTROL, "no-cache")
            .send()
            .map_err(|source| ChartError::Http {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChartError::HttpStatus {
                url,
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().map_err(|source| ChartError::Http {
            url: url.clone(),
            source,
        })?;
        Ok(decode_chart_bytes(&bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_strips_bom() {
        let bytes = b"\xEF\xBB\xBF[Song]";
        assert_eq!(decode_chart_bytes(bytes), "[Song]");
    }

    #[test]
    fn http_url_layout() {
        let source = HttpSource::new("http://localhost:5173/").unwrap();
        assert_eq!(
            source.url_for("neon", "chart.chart"),
            "http://localhost:5173/songs/neon/chart.chart"
        );
    }

    #[test]
    fn dir_source_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = DirSource::new(dir.path());
        let err = source.fetch("missing", "chart.chart").unwrap_err();
        assert!(matches!(err, ChartError::FileRead { .. }));
    }

    #[test]
    fn dir_source_reads_song_folder() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("neon")).unwrap();
        std::fs::write(dir.path().join("neon").join("notes.chart"), "[Song]").unwrap();
        let source = DirSource::new(dir.path());
        assert_eq!(source.fetch("neon", "notes.chart").unwrap(), "[Song]");
    }
}
