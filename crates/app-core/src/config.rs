//! Thread-safe configuration with optional hot reloading.

use std::path::{Path, PathBuf};
use std::sync::{mpsc, Arc, RwLock};
use std::thread;
use std::time::Duration;

use config::{Config as RawConfig, File};
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load or parse configuration file")]
    Load(#[from] config::ConfigError),

    #[error("Failed to initialize file watcher")]
    Watch(#[from] notify::Error),

    #[error("Configuration lock was poisoned, indicating a panic in another thread")]
    LockPoisoned,
}

/// Shared configuration handle. Reads go through an `RwLock` so a background
/// reload never tears a value mid-read.
#[derive(Debug)]
pub struct Config {
    inner: Arc<RwLock<RawConfig>>,
    // Dropping the watcher stops the reload thread.
    _watcher: Option<RecommendedWatcher>,
}

impl Config {
    pub fn builder<P: AsRef<Path>>(path: P) -> ConfigBuilder {
        ConfigBuilder::new(path.as_ref().to_path_buf())
    }

    #[cfg(feature = "testing")]
    pub fn builder_test() -> test_utils::TestConfigBuilder {
        test_utils::TestConfigBuilder::new()
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T, ConfigError> {
        let guard = self.inner.read().map_err(|_| ConfigError::LockPoisoned)?;
        guard.get(key).map_err(ConfigError::from)
    }
}

pub struct ConfigBuilder {
    path: PathBuf,
    watch: bool,
    watch_interval: Duration,
}

impl ConfigBuilder {
    fn new(path: PathBuf) -> Self {
        Self { path, watch: false, watch_interval: Duration::from_secs(2) }
    }

    /// Enables reloading whenever the file changes on disk.
    pub fn watch(mut self) -> Self {
        self.watch = true;
        self
    }

    pub fn watch_interval(mut self, interval: Duration) -> Self {
        self.watch_interval = interval;
        self
    }

    pub fn build(self) -> Result<Config, ConfigError> {
        let raw = Self::load(&self.path)?;
        let shared = Arc::new(RwLock::new(raw));
        let mut watcher = None;

        if self.watch {
            let path = self.path.clone();
            let target = Arc::clone(&shared);
            let (tx, rx) = mpsc::channel();

            let mut w = RecommendedWatcher::new(tx, notify::Config::default().with_poll_interval(self.watch_interval))?;
            w.watch(&self.path, RecursiveMode::NonRecursive)?;

            thread::spawn(move || {
                tracing::info!("Watching configuration file: {}", path.to_string_lossy());
                while let Ok(event) = rx.recv() {
                    match event {
                        Ok(Event { kind: notify::EventKind::Modify(_), .. }) => match Self::load(&path) {
                            Ok(fresh) => {
                                if let Ok(mut guard) = target.write() {
                                    *guard = fresh;
                                    tracing::info!("Configuration reloaded");
                                } else {
                                    tracing::error!("Failed to acquire write lock for config reload");
                                }
                            },
                            Err(e) => tracing::error!("Failed to reload configuration: {e}"),
                        },
                        Err(e) => tracing::error!("File watcher error: {e:?}"),
                        _ => {},
                    }
                }
            });
            watcher = Some(w);
        }

        Ok(Config { inner: shared, _watcher: watcher })
    }

    fn load(path: &Path) -> Result<RawConfig, config::ConfigError> {
        RawConfig::builder().add_source(File::from(path).required(true)).build()
    }
}

#[cfg(feature = "testing")]
pub mod test_utils {
    use std::collections::HashMap;

    use config::Value;

    use super::*;

    /// Builds a `Config` from in-memory key/value overrides, for tests that
    /// should not touch the filesystem.
    #[derive(Default)]
    pub struct TestConfigBuilder {
        values: HashMap<String, Value>,
    }

    impl TestConfigBuilder {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with<T: Into<Value>>(mut self, key: &str, value: T) -> Self {
            self.values.insert(key.to_string(), value.into());
            self
        }

        pub fn build(self) -> Config {
            let mut builder = RawConfig::builder();
            for (key, value) in self.values {
                builder = builder.set_override(key, value).expect("invalid test config override");
            }
            let raw = builder.build().expect("failed to build test config");

            Config { inner: Arc::new(RwLock::new(raw)), _watcher: None }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut temp = tempfile::Builder::new()
            .suffix(".yaml")
            .tempfile()
            .expect("Failed to create temp file");
        temp.write_all(content.as_bytes()).expect("Failed to write temp config");
        temp.flush().expect("Failed to flush temp config");
        temp
    }

    #[test]
    fn test_basic_get() {
        let temp = create_temp_config(
            r#"
            server:
                address: "0.0.0.0:3000"
                timeout_secs: 30
            "#,
        );
        let config = Config::builder(temp.path()).build().expect("Failed to build config");

        let address: String = config.get("server.address").expect("Failed to get address");
        let timeout: u64 = config.get("server.timeout_secs").expect("Failed to get timeout");

        assert_eq!(address, "0.0.0.0:3000");
        assert_eq!(timeout, 30);
    }

    #[test]
    fn test_missing_key() {
        let temp = create_temp_config("session:\n  ttl_secs: 60\n");
        let config = Config::builder(temp.path()).build().expect("Failed to build config");

        assert!(config.get::<String>("session.secret").is_err());
    }

    #[test]
    fn test_nonexistent_file() {
        let result = Config::builder("/nonexistent/config.yaml").build();

        assert!(matches!(result, Err(ConfigError::Load(_))));
    }

    #[test]
    fn test_auto_reload() {
        let temp = create_temp_config("session:\n  ttl_secs: 60\n");
        let config = Config::builder(temp.path())
            .watch()
            .watch_interval(Duration::from_millis(100))
            .build()
            .expect("Failed to build config with watch");

        assert_eq!(config.get::<u64>("session.ttl_secs").unwrap(), 60);

        fs::write(temp.path(), "session:\n  ttl_secs: 120\n").expect("Failed to rewrite config");
        thread::sleep(Duration::from_millis(500));

        assert_eq!(config.get::<u64>("session.ttl_secs").unwrap(), 120);
    }
}
