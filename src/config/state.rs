// Application state module
// Owns the single process-wide settings value

use tokio::sync::RwLock;

use super::types::Config;
use crate::settings::Settings;

/// Shared application state, passed to handlers behind an `Arc`.
///
/// The settings value is the only shared mutable resource in the process.
/// Readers take the shared lock, writers the exclusive lock, so a reader
/// never observes a partially applied update.
pub struct AppState {
    pub config: Config,
    pub settings: RwLock<Settings>,
}

impl AppState {
    /// Create state with the hard-coded default settings
    pub fn new(config: Config) -> Self {
        Self {
            config,
            settings: RwLock::new(Settings::default()),
        }
    }
}
