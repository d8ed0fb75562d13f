//! Application state management.

use leap_core::{Config, LocalProbe, Resolver, StoreOptions, WeightedPathStore};
use tracing::debug;

/// Shared application state.
pub struct App {
    /// Configuration
    pub config: Config,

    /// The weighted directory database
    pub store: WeightedPathStore,

    /// Filesystem probe
    pub probe: LocalProbe,
}

impl App {
    /// Create a new application instance, loading the database.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let options = StoreOptions::from_config(&config)?;
        let store = WeightedPathStore::open(options);
        let probe = LocalProbe::new();

        debug!(
            data_file = %store.data_file().display(),
            entries = store.len(),
            "Application initialized"
        );

        Ok(App {
            config,
            store,
            probe,
        })
    }

    /// Build a resolver over the current database contents.
    pub fn resolver(&self) -> anyhow::Result<Resolver<'_>> {
        let resolver = Resolver::new(
            self.store.entries_by_weight(),
            &self.config.matching,
            &self.probe,
        )?;
        Ok(resolver)
    }

    /// The working directory as the store records it.
    pub fn current_dir(&self) -> anyhow::Result<String> {
        use leap_core::PathProbe;

        self.probe
            .current_dir()
            .ok_or_else(|| anyhow::anyhow!("Cannot determine the current directory"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_in(temp: &TempDir) -> Config {
        let mut config = Config::default();
        config.general.data_file = Some(temp.path().join("leap.txt"));
        config.general.home = Some(temp.path().join("home"));
        config
    }

    #[test]
    fn test_app_round_trip() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("work");
        std::fs::create_dir(&target).unwrap();
        let target = std::fs::canonicalize(&target).unwrap();
        let target = target.to_string_lossy().to_string();

        let mut app = App::new(config_in(&temp)).unwrap();
        assert!(app.store.is_empty());
        app.store.add(&target, 10.0);

        let app = App::new(config_in(&temp)).unwrap();
        assert_eq!(app.store.weight(&target), 10.0);
        assert_eq!(app.resolver().unwrap().jump(&["work"]), Some(target));
    }

    #[test]
    fn test_home_is_ignored() {
        let temp = TempDir::new().unwrap();
        let mut app = App::new(config_in(&temp)).unwrap();
        let home = temp.path().join("home").to_string_lossy().to_string();
        assert!(app.store.add(&home, 10.0).is_none());
    }
}
