pub mod inspect;
pub mod settings;
pub mod simulate;

use anyhow::Result;
use beatbox_chart::{ChartLoader, DirSource, HttpSource};
use log::info;

pub use inspect::InspectArgs;
pub use settings::SettingsArgs;
pub use simulate::SimulateArgs;

use crate::settings::Settings;

/// Chart loader for the configured source: the web server when a base URL
/// is set, the local songs folder otherwise.
pub fn chart_loader(settings: &Settings) -> Result<ChartLoader> {
    match &settings.chart_base_url {
        Some(base_url) => {
            info!("Fetching charts from {base_url}");
            Ok(ChartLoader::from_source(HttpSource::new(base_url.clone())?))
        }
        None => {
            info!("Reading charts from {}", settings.songs_root.display());
            Ok(ChartLoader::from_source(DirSource::new(&settings.songs_root)))
        }
    }
}
