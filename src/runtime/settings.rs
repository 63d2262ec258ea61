use log::{debug, warn};

use crate::config;

/// Load settings, falling back to defaults when the file or environment is unusable.
pub fn load_settings() -> config::Settings {
    let loaded = config::Settings::load()
        .map_err(|e| format!("failed to load config: {e}"))
        .and_then(|s| match s.validate() {
            Ok(()) => Ok(s),
            Err(msg) => Err(format!("invalid config: {msg}")),
        });

    match loaded {
        Ok(s) => {
            debug!("settings loaded: {s:?}");
            s
        }
        Err(msg) => {
            warn!("{msg}; using defaults");
            config::Settings::default()
        }
    }
}
